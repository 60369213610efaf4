mod scalar_types;
mod vector_types;

pub use scalar_types::*;
pub use vector_types::*;

/// Gradient axis, used to pick a single channel out of a sample sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    X,
    Y,
    Z,
}
