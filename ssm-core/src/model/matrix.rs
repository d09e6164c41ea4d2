//! Dynamically typed matrices and vectors at the construction boundary
//!
//! Callers hand matrices over in either precision; the model resolves a
//! common element type and layout once and converts everything up front.

use super::dtype::{Dtype, Layout};
use ndarray::{Array1, Array2, NdFloat, ShapeBuilder};

/// An owned 2-D array in either precision.
#[derive(Debug, Clone, PartialEq)]
pub enum Matrix {
    F32(Array2<f32>),
    F64(Array2<f64>),
}

impl Matrix {
    pub fn dtype(&self) -> Dtype {
        match self {
            Matrix::F32(_) => Dtype::F32,
            Matrix::F64(_) => Dtype::F64,
        }
    }

    /// (rows, columns)
    pub fn shape(&self) -> (usize, usize) {
        match self {
            Matrix::F32(a) => a.dim(),
            Matrix::F64(a) => a.dim(),
        }
    }
}

impl From<Array2<f32>> for Matrix {
    fn from(a: Array2<f32>) -> Self {
        Matrix::F32(a)
    }
}

impl From<Array2<f64>> for Matrix {
    fn from(a: Array2<f64>) -> Self {
        Matrix::F64(a)
    }
}

/// An owned 1-D array in either precision (state vectors).
#[derive(Debug, Clone, PartialEq)]
pub enum Vector {
    F32(Array1<f32>),
    F64(Array1<f64>),
}

impl Vector {
    pub fn dtype(&self) -> Dtype {
        match self {
            Vector::F32(_) => Dtype::F32,
            Vector::F64(_) => Dtype::F64,
        }
    }

    pub fn len(&self) -> usize {
        match self {
            Vector::F32(v) => v.len(),
            Vector::F64(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl From<Array1<f32>> for Vector {
    fn from(v: Array1<f32>) -> Self {
        Vector::F32(v)
    }
}

impl From<Array1<f64>> for Vector {
    fn from(v: Array1<f64>) -> Self {
        Vector::F64(v)
    }
}

impl From<Vec<f32>> for Vector {
    fn from(v: Vec<f32>) -> Self {
        Vector::F32(Array1::from_vec(v))
    }
}

impl From<Vec<f64>> for Vector {
    fn from(v: Vec<f64>) -> Self {
        Vector::F64(Array1::from_vec(v))
    }
}

/// Re-store `m` contiguously in the requested layout, copying only when the
/// current storage order does not already match.
pub(crate) fn to_layout<T: NdFloat>(m: Array2<T>, layout: Layout) -> Array2<T> {
    match layout {
        Layout::RowMajor => {
            if m.is_standard_layout() {
                m
            } else {
                m.as_standard_layout().into_owned()
            }
        }
        Layout::ColMajor => {
            if m.t().is_standard_layout() {
                m
            } else {
                let mut out = Array2::zeros(m.raw_dim().f());
                out.assign(&m);
                out
            }
        }
    }
}

/// Zeroed 2-D array stored in the requested layout.
pub(crate) fn zeros_with_layout<T: NdFloat>(shape: (usize, usize), layout: Layout) -> Array2<T> {
    match layout {
        Layout::RowMajor => Array2::zeros(shape),
        Layout::ColMajor => Array2::zeros(shape.f()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn test_matrix_shape_and_dtype() {
        let m = Matrix::from(array![[1.0_f64, 2.0], [3.0, 4.0], [5.0, 6.0]]);
        assert_eq!(m.shape(), (3, 2));
        assert_eq!(m.dtype(), Dtype::F64);

        let m = Matrix::from(array![[1.0_f32, 2.0]]);
        assert_eq!(m.shape(), (1, 2));
        assert_eq!(m.dtype(), Dtype::F32);
    }

    #[test]
    fn test_to_layout_preserves_values() {
        let m = array![[1.0_f64, 2.0, 3.0], [4.0, 5.0, 6.0]];

        let col = to_layout(m.clone(), Layout::ColMajor);
        assert!(col.t().is_standard_layout());
        assert_eq!(col, m);

        let row = to_layout(col, Layout::RowMajor);
        assert!(row.is_standard_layout());
        assert_eq!(row, m);
    }

    #[test]
    fn test_to_layout_noop_when_matching() {
        let m = array![[1.0_f64, 2.0], [3.0, 4.0]];
        let row = to_layout(m.clone(), Layout::RowMajor);
        assert_eq!(row, m);
    }

    #[test]
    fn test_zeros_with_layout() {
        let z = zeros_with_layout::<f32>((3, 4), Layout::ColMajor);
        assert_eq!(z.dim(), (3, 4));
        assert!(z.t().is_standard_layout());
        assert!(z.iter().all(|&v| v == 0.0));
    }
}
