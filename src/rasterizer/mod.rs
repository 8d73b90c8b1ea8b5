//! CPU triangle rasterizer
//!
//! Features:
//! - Left-handed perspective projection with a free-look camera
//! - Edge-function coverage with a per-pixel depth buffer
//! - Perspective-correct attribute interpolation
//! - Lambert / Phong shading with tangent-space normal maps

mod math;
mod types;
mod camera;
mod shading;
mod render;

pub use math::*;
pub use types::*;
pub use camera::*;
pub use shading::*;
pub use render::*;

/// Default window/framebuffer dimensions
pub const WIDTH: usize = 640;
pub const HEIGHT: usize = 480;
