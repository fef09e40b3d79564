use thiserror::Error;

use crate::grid::Position;

/// Misuse of the lighting engine. None of these are transient; they point at the call
/// that handed in the bad input.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum LightingError {
    #[error("resistance grid has no cells")]
    EmptyGrid,
    #[error("grid is {}x{}, expected {}x{}", found.0, found.1, expected.0, expected.1)]
    DimensionMismatch {
        expected: (usize, usize),
        found: (usize, usize),
    },
    #[error("position {position} is outside the {width}x{height} grid")]
    OutOfBounds {
        position: Position,
        width: usize,
        height: usize,
    },
}
