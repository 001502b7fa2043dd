//! Pipeline stages, in execution order:
//! input assembly, vertex shading, geometry shading, rasterization,
//! pixel shading, output merge.

pub mod geometry_shader;
pub mod input_assembler;
pub mod interpolation;
pub mod output_merger;
pub mod pixel_shader;
pub mod primitive;
pub mod rasterizer;
pub mod shader;
pub mod vertex_shader;
