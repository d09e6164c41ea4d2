//! Element trait bridging the dynamically typed boundary to generic kernels
//!
//! Validation and conversion happen once against the `Matrix`/`Vector`/
//! `SampleData` enums; everything past that point is written once, generically
//! over the two recognized element types.

use super::dtype::{Dtype, Layout};
use super::matrix::{to_layout, Matrix, Vector};
use crate::signal::SampleData;
use ndarray::{Array1, Array2, NdFloat};

pub(crate) trait Element: NdFloat {
    const DTYPE: Dtype;

    /// Convert a boundary matrix into this element type and layout.
    fn cast_matrix(m: &Matrix, layout: Layout) -> Array2<Self>;

    /// Convert a boundary vector into this element type.
    fn cast_vector(v: &Vector) -> Array1<Self>;

    /// Borrow sample data if (and only if) it is stored in this element type.
    fn samples(data: &SampleData) -> Option<&Array2<Self>>;

    /// Wrap an output buffer back into dynamically typed sample data.
    fn samples_from(data: Array2<Self>) -> SampleData;
}

impl Element for f32 {
    const DTYPE: Dtype = Dtype::F32;

    fn cast_matrix(m: &Matrix, layout: Layout) -> Array2<f32> {
        match m {
            Matrix::F32(a) => to_layout(a.clone(), layout),
            Matrix::F64(a) => to_layout(a.mapv(|v| v as f32), layout),
        }
    }

    fn cast_vector(v: &Vector) -> Array1<f32> {
        match v {
            Vector::F32(a) => a.clone(),
            Vector::F64(a) => a.mapv(|v| v as f32),
        }
    }

    fn samples(data: &SampleData) -> Option<&Array2<f32>> {
        match data {
            SampleData::F32(a) => Some(a),
            SampleData::F64(_) => None,
        }
    }

    fn samples_from(data: Array2<f32>) -> SampleData {
        SampleData::F32(data)
    }
}

impl Element for f64 {
    const DTYPE: Dtype = Dtype::F64;

    fn cast_matrix(m: &Matrix, layout: Layout) -> Array2<f64> {
        match m {
            Matrix::F32(a) => to_layout(a.mapv(f64::from), layout),
            Matrix::F64(a) => to_layout(a.clone(), layout),
        }
    }

    fn cast_vector(v: &Vector) -> Array1<f64> {
        match v {
            Vector::F32(a) => a.mapv(f64::from),
            Vector::F64(a) => a.clone(),
        }
    }

    fn samples(data: &SampleData) -> Option<&Array2<f64>> {
        match data {
            SampleData::F32(_) => None,
            SampleData::F64(a) => Some(a),
        }
    }

    fn samples_from(data: Array2<f64>) -> SampleData {
        SampleData::F64(data)
    }
}
