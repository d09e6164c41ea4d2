//! Naive recursion kernel
//!
//! Computes every matrix-vector product with straightforward dot products.
//! Establishes correctness; every other backend must agree with it up to
//! floating-point rounding.

use crate::model::{Element, Realization};
use ndarray::{Array1, Array2, ArrayView2};

pub(crate) fn run<T: Element>(
    realization: &Realization<T>,
    state: &mut Array1<T>,
    input: ArrayView2<'_, T>,
    output: &mut Array2<T>,
) {
    let n = realization.n_states();
    let m = realization.n_inputs();
    let p = realization.n_outputs();

    let mut next = Array1::<T>::zeros(n);
    for i in 0..input.ncols() {
        let u = input.column(i);

        // y[:, i] = C·x + D·u[:, i]
        let mut y = output.column_mut(i);
        for row in 0..p {
            let mut acc = T::zero();
            for k in 0..n {
                acc += realization.c[[row, k]] * state[k];
            }
            for k in 0..m {
                acc += realization.d[[row, k]] * u[k];
            }
            y[row] = acc;
        }

        // x = A·x + B·u[:, i]
        for row in 0..n {
            let mut acc = T::zero();
            for k in 0..n {
                acc += realization.a[[row, k]] * state[k];
            }
            for k in 0..m {
                acc += realization.b[[row, k]] * u[k];
            }
            next[row] = acc;
        }
        std::mem::swap(state, &mut next);
    }
}
