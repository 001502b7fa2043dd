//! rasterizr: CPU-emulated fixed-function 3D rasterization pipeline
//!
//! - Input assembly, vertex and geometry shading
//! - Quad-based triangle scan conversion with multisampling and wireframe
//! - Perspective-correct attribute interpolation
//! - Per-sample depth testing into resolvable render targets

pub mod color;
pub mod device;
pub mod error;
pub mod math;
pub mod pipeline;
pub mod scene;
pub mod shaders;

pub use device::Device;
pub use error::{RasterError, Result};
pub use math::{Vec2, Vec4};
