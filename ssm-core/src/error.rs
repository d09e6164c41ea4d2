//! Error types for model construction and processing
//!
//! Every failure is detected at construction or at the start of a processing
//! call, never partway through a recursion, so a failed call leaves the
//! model's state untouched.

use crate::model::Dtype;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum SsmError {
    /// Matrix dimensions are inconsistent with the rest of the realization.
    #[error("matrix {name} must have shape {expected}, got {found}")]
    ShapeMismatch {
        name: &'static str,
        expected: String,
        found: String,
    },

    /// Memory layout name other than "row-major" or "column-major".
    #[error("unsupported memory layout '{0}' (expected 'row-major' or 'column-major')")]
    UnsupportedLayout(String),

    /// Element type outside the single/double precision family.
    #[error("unsupported element type '{0}' (expected 'f32' or 'f64')")]
    UnsupportedDtype(String),

    /// Backend name that does not match any known solver.
    #[error("unknown solver backend '{0}'")]
    UnsupportedBackend(String),

    /// Mixed-precision processing is rejected, never silently coerced.
    #[error("signal element type {found} does not match model element type {expected}")]
    DtypeMismatch { expected: Dtype, found: Dtype },

    /// State vector used before being set.
    #[error("state vector not initialized; call initialize_state() before processing")]
    NotInitialized,

    /// Input signal channel count disagrees with the realization's input count.
    #[error("input signal has {found} channels, expected {expected}")]
    DimensionMismatch { expected: usize, found: usize },
}

pub type Result<T> = std::result::Result<T, SsmError>;
