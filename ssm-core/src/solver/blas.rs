//! Library-call recursion kernel
//!
//! Issues every matrix-vector product as a gemv-style call with scale and
//! accumulate parameters, fusing the add into the destination buffer:
//! the output column is seeded with D·u and C·x is accumulated onto it;
//! the next state is seeded with A·x and B·u is accumulated onto it.
//! One scratch state vector per call, no intermediates per step.
//!
//! Building downstream with ndarray's `blas` feature routes these calls to a
//! system BLAS without source changes here.

use crate::model::{Element, Realization};
use ndarray::linalg::general_mat_vec_mul;
use ndarray::{Array1, Array2, ArrayView2};

pub(crate) fn run<T: Element>(
    realization: &Realization<T>,
    state: &mut Array1<T>,
    input: ArrayView2<'_, T>,
    output: &mut Array2<T>,
) {
    let one = T::one();
    let zero = T::zero();
    let mut next = Array1::<T>::zeros(realization.n_states());

    for i in 0..input.ncols() {
        let u = input.column(i);

        let mut y = output.column_mut(i);
        general_mat_vec_mul(one, &realization.d, &u, zero, &mut y);
        general_mat_vec_mul(one, &realization.c, &*state, one, &mut y);

        general_mat_vec_mul(one, &realization.a, &*state, zero, &mut next);
        general_mat_vec_mul(one, &realization.b, &u, one, &mut next);
        std::mem::swap(state, &mut next);
    }
}
