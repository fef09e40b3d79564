//! Interactive visualization module for real-time lighting testing

mod scene;
mod viewer;

pub use scene::{demo_scene, Scene};
pub use viewer::{InteractiveViewer, ViewerConfig};
