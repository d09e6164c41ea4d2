//! State-space model: realization ownership, validation, state lifecycle

mod dtype;
mod element;
mod matrix;
mod state_space;

pub use dtype::{Dtype, Layout};
pub use matrix::{Matrix, Vector};
pub use state_space::{ModelConfig, StateSpaceModel};

pub(crate) use element::Element;
pub(crate) use matrix::to_layout;
pub(crate) use state_space::Realization;
