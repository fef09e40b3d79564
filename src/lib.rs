//! Colored, animated lighting for 2D grid maps.
//!
//! Lights ([`Radiance`]) are registered by cell, lit through a [`VisibilityService`], and
//! blended into per-cell strength and tint that a renderer applies to its background
//! colors with [`Lighting::draw`].

pub mod color;
pub mod error;
pub mod grid;
pub mod interactive;
pub mod lighting;
pub mod radiance;
pub mod region;
pub mod registry;
pub mod render;
pub mod visibility;


// Re-export public API
pub use color::Color;
pub use error::LightingError;
pub use grid::{Grid, Position, grid_to_string};
pub use lighting::{LightLayer, Lighting, LightingConfig};
pub use radiance::{Radiance, light_time};
pub use region::Region;
pub use registry::LightRegistry;
pub use render::{save_ppm, save_ppm_with_walls};
pub use visibility::{Diffuse, Radius, Shadowcast, VisibilityService};
