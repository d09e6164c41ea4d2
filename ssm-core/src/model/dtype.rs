//! Element type and memory layout policy
//!
//! Both are fixed once at model construction and shared by all four matrices
//! and the state vector for the lifetime of a model.

use crate::error::SsmError;
use std::fmt;
use std::str::FromStr;

/// Numeric element type of a model or signal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dtype {
    /// Single precision (32-bit float)
    F32,
    /// Double precision (64-bit float)
    F64,
}

impl Dtype {
    /// Common type of two operands: the widest one wins.
    pub fn promote(self, other: Dtype) -> Dtype {
        if self == Dtype::F64 || other == Dtype::F64 {
            Dtype::F64
        } else {
            Dtype::F32
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Dtype::F32 => "f32",
            Dtype::F64 => "f64",
        }
    }
}

impl fmt::Display for Dtype {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Dtype {
    type Err = SsmError;

    fn from_str(s: &str) -> Result<Self, SsmError> {
        match s {
            "f32" | "float32" => Ok(Dtype::F32),
            "f64" | "float64" => Ok(Dtype::F64),
            other => Err(SsmError::UnsupportedDtype(other.to_string())),
        }
    }
}

/// Memory layout of matrix storage.
///
/// Layout-sensitive solvers walk the matrices contiguously; correctness does
/// not depend on it, only the access pattern.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Layout {
    /// Rows are contiguous (C order)
    RowMajor,
    /// Columns are contiguous (Fortran order)
    #[default]
    ColMajor,
}

impl Layout {
    pub fn name(&self) -> &'static str {
        match self {
            Layout::RowMajor => "row-major",
            Layout::ColMajor => "column-major",
        }
    }
}

impl fmt::Display for Layout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Layout {
    type Err = SsmError;

    fn from_str(s: &str) -> Result<Self, SsmError> {
        match s {
            "row-major" => Ok(Layout::RowMajor),
            "column-major" => Ok(Layout::ColMajor),
            other => Err(SsmError::UnsupportedLayout(other.to_string())),
        }
    }
}
