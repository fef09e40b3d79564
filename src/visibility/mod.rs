//! Layer 1: Visibility (pure geometry)
//!
//! Everything the lighting layer knows about occlusion goes through
//! [`VisibilityService`]: a falloff-weighted field of view from a point, and a binary
//! line-of-sight map. Two implementations are provided.

pub mod diffuse;
pub mod shadowcast;

pub use diffuse::Diffuse;
pub use shadowcast::Shadowcast;

use crate::grid::{Grid, Position};

/// Distance metric that shapes a field of view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Radius {
    /// Euclidean distance.
    #[default]
    Circle,
    /// Chebyshev distance.
    Square,
    /// Manhattan distance.
    Diamond,
}

impl Radius {
    pub fn radius(self, dx: f64, dy: f64) -> f64 {
        let (dx, dy) = (dx.abs(), dy.abs());
        match self {
            Radius::Circle => (dx * dx + dy * dy).sqrt(),
            Radius::Square => dx.max(dy),
            Radius::Diamond => dx + dy,
        }
    }

    /// Length of one diagonal step under this metric.
    pub fn diagonal_step(self) -> f64 {
        match self {
            Radius::Circle => std::f64::consts::SQRT_2,
            Radius::Square => 1.0,
            Radius::Diamond => 2.0,
        }
    }
}

/// Occlusion queries against a resistance grid (0.0 = clear, 1.0 = opaque).
///
/// Implementations write into caller-owned buffers so per-frame calls don't allocate.
/// Output buffers must match the resistance grid's dimensions, and results must be
/// deterministic for identical inputs.
pub trait VisibilityService {
    /// Fill `light` with visibility strength in `[0, 1]` from `origin`, fading to zero at
    /// `radius` under `shape`. Cells beyond `radius` are zero; `origin` itself is always 1.0.
    fn fov(&self, resistance: &Grid<f64>, light: &mut Grid<f64>, origin: Position, radius: f64, shape: Radius);

    /// Fill `los` with 1.0 for every cell visible from `origin` at any distance, 0.0 elsewhere.
    fn los(&self, resistance: &Grid<f64>, los: &mut Grid<f64>, origin: Position);
}

#[inline]
pub(crate) fn blocks_light(resistance: f64) -> bool {
    resistance >= 1.0
}
