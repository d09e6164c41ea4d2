//! Layout-specialized recursion kernels
//!
//! The same recursion lowered to tight loops over raw contiguous slices,
//! monomorphized per element type and specialized per storage order so the
//! innermost loop always walks memory contiguously. Primary performance path.

use crate::model::{Element, Layout, Realization};
use ndarray::{Array1, Array2, ArrayView2};

/// Run the recursion over `input`, which must already be contiguous in the
/// model's layout (the dispatcher adapts it beforehand).
pub(crate) fn run<T: Element>(
    realization: &Realization<T>,
    state: &mut Array1<T>,
    input: ArrayView2<'_, T>,
    output: &mut Array2<T>,
    layout: Layout,
) {
    let n = realization.n_states();
    let m = realization.n_inputs();
    let p = realization.n_outputs();
    let t = input.ncols();

    let a = slice_of(&realization.a);
    let b = slice_of(&realization.b);
    let c = slice_of(&realization.c);
    let d = slice_of(&realization.d);
    let u = input
        .as_slice_memory_order()
        .expect("input adapted to contiguous layout");
    let out = output
        .as_slice_memory_order_mut()
        .expect("output buffer is contiguous");
    let x = state
        .as_slice_mut()
        .expect("state vector is contiguous");
    let mut next = vec![T::zero(); n];

    match layout {
        Layout::RowMajor => run_row_major(n, m, p, t, a, b, c, d, x, &mut next, u, out),
        Layout::ColMajor => run_col_major(n, m, p, t, a, b, c, d, x, &mut next, u, out),
    }
}

fn slice_of<T: Element>(matrix: &Array2<T>) -> &[T] {
    matrix
        .as_slice_memory_order()
        .expect("matrix storage is contiguous")
}

/// Row-major: matrix rows are contiguous, so each output element is one
/// contiguous dot product. Sample columns of `u`/`out` are strided by `t`.
#[allow(clippy::too_many_arguments)]
fn run_row_major<T: Element>(
    n: usize,
    m: usize,
    p: usize,
    t: usize,
    a: &[T],
    b: &[T],
    c: &[T],
    d: &[T],
    x: &mut [T],
    next: &mut [T],
    u: &[T],
    out: &mut [T],
) {
    for i in 0..t {
        for row in 0..p {
            let mut acc = T::zero();
            for (k, &v) in c[row * n..(row + 1) * n].iter().enumerate() {
                acc += v * x[k];
            }
            for (k, &v) in d[row * m..(row + 1) * m].iter().enumerate() {
                acc += v * u[k * t + i];
            }
            out[row * t + i] = acc;
        }
        for row in 0..n {
            let mut acc = T::zero();
            for (k, &v) in a[row * n..(row + 1) * n].iter().enumerate() {
                acc += v * x[k];
            }
            for (k, &v) in b[row * m..(row + 1) * m].iter().enumerate() {
                acc += v * u[k * t + i];
            }
            next[row] = acc;
        }
        x.copy_from_slice(next);
    }
}

/// Column-major: matrix columns are contiguous, so products accumulate
/// column by column. Sample columns of `u`/`out` are themselves contiguous.
#[allow(clippy::too_many_arguments)]
fn run_col_major<T: Element>(
    n: usize,
    m: usize,
    p: usize,
    t: usize,
    a: &[T],
    b: &[T],
    c: &[T],
    d: &[T],
    x: &mut [T],
    next: &mut [T],
    u: &[T],
    out: &mut [T],
) {
    for i in 0..t {
        let ucol = &u[i * m..(i + 1) * m];
        let ycol = &mut out[i * p..(i + 1) * p];

        // ycol starts zeroed (freshly allocated output buffer).
        for k in 0..n {
            let xk = x[k];
            for (row, &v) in c[k * p..(k + 1) * p].iter().enumerate() {
                ycol[row] += v * xk;
            }
        }
        for k in 0..m {
            let uk = ucol[k];
            for (row, &v) in d[k * p..(k + 1) * p].iter().enumerate() {
                ycol[row] += v * uk;
            }
        }

        next.fill(T::zero());
        for k in 0..n {
            let xk = x[k];
            for (row, &v) in a[k * n..(k + 1) * n].iter().enumerate() {
                next[row] += v * xk;
            }
        }
        for k in 0..m {
            let uk = ucol[k];
            for (row, &v) in b[k * n..(k + 1) * n].iter().enumerate() {
                next[row] += v * uk;
            }
        }
        x.copy_from_slice(next);
    }
}
