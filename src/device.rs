//! Device: owns the stages and runs one draw call at a time

use log::debug;

use crate::error::{RasterError, Result};
use crate::math::Vec4;
use crate::pipeline::geometry_shader::GeometryShaderStage;
use crate::pipeline::input_assembler::{InputAssemblerStage, VertexRecord};
use crate::pipeline::output_merger::OutputMergerStage;
use crate::pipeline::pixel_shader::{Pixel, PixelShaderStage};
use crate::pipeline::primitive::{Primitive, ShadedVertex};
use crate::pipeline::rasterizer::{FragmentQuad, RasterizerStage, Viewport};
use crate::pipeline::shader::build_register_mappings;
use crate::pipeline::vertex_shader::VertexShaderStage;

/// Software device.
///
/// Each stage consumes the previous stage's complete output before the next
/// one starts. Not meant for concurrent draws: there is a single rasterizer
/// and the targets are mutated in place.
pub struct Device {
    pub input_assembler: InputAssemblerStage,
    pub vertex_shader: VertexShaderStage,
    pub geometry_shader: GeometryShaderStage,
    pub rasterizer: RasterizerStage,
    pub pixel_shader: PixelShaderStage,
    pub output_merger: OutputMergerStage,

    input_assembler_outputs: Vec<VertexRecord>,
    vertex_shader_outputs: Vec<ShadedVertex>,
    geometry_shader_outputs: Vec<Primitive>,
    rasterizer_outputs: Vec<FragmentQuad>,
    pixel_shader_outputs: Vec<Pixel>,
}

impl Device {
    /// Device with a `width` x `height` target storing `sample_count`
    /// samples per pixel and a viewport covering it
    pub fn new(width: usize, height: usize, sample_count: u32) -> Self {
        Self {
            input_assembler: InputAssemblerStage::default(),
            vertex_shader: VertexShaderStage::default(),
            geometry_shader: GeometryShaderStage::default(),
            rasterizer: RasterizerStage::new(Viewport::new(width as f32, height as f32)),
            pixel_shader: PixelShaderStage::default(),
            output_merger: OutputMergerStage::new(width, height, sample_count),
            input_assembler_outputs: Vec::new(),
            vertex_shader_outputs: Vec::new(),
            geometry_shader_outputs: Vec::new(),
            rasterizer_outputs: Vec::new(),
            pixel_shader_outputs: Vec::new(),
        }
    }

    pub fn clear_render_target(&mut self, color: Vec4) {
        self.output_merger.clear_render_target(color);
    }

    pub fn clear_depth_buffer(&mut self, depth: f32) {
        self.output_merger.clear_depth_buffer(depth);
    }

    /// Run the bound pipeline once. The only effects are writes to the
    /// render target and depth buffer.
    pub fn draw(&mut self) -> Result<()> {
        self.input_assembler_outputs.clear();
        self.vertex_shader_outputs.clear();
        self.geometry_shader_outputs.clear();
        self.rasterizer_outputs.clear();
        self.pixel_shader_outputs.clear();

        self.prepare_rasterizer()?;

        self.input_assembler.run(&mut self.input_assembler_outputs)?;
        self.vertex_shader
            .run(&self.input_assembler_outputs, &mut self.vertex_shader_outputs)?;
        self.geometry_shader
            .run(&self.vertex_shader_outputs, &mut self.geometry_shader_outputs);
        self.rasterizer
            .run(&self.geometry_shader_outputs, &mut self.rasterizer_outputs);
        self.pixel_shader
            .run(&self.rasterizer_outputs, &mut self.pixel_shader_outputs)?;
        self.output_merger.run(&self.pixel_shader_outputs);

        debug!(
            "draw: {} vertices, {} primitives, {} quads, {} pixels",
            self.vertex_shader_outputs.len(),
            self.geometry_shader_outputs.len(),
            self.rasterizer_outputs.len(),
            self.pixel_shader_outputs.len()
        );
        Ok(())
    }

    /// Resolve the pixel shader's input layout against whichever stage feeds
    /// it, and check the rasterizer's sample count against the target
    fn prepare_rasterizer(&mut self) -> Result<()> {
        let vertex_shader = self.vertex_shader.shader().ok_or(RasterError::MissingShader("vertex"))?;
        let pixel_shader = self.pixel_shader.shader().ok_or(RasterError::MissingShader("pixel"))?;
        let outputs = self.geometry_shader.output_signature(vertex_shader.output_signature());
        let mappings = build_register_mappings(pixel_shader.input_signature(), outputs)?;

        let expected = self.rasterizer.state().samples_per_pixel();
        let found = self.output_merger.render_target.sample_count();
        if expected != found {
            return Err(RasterError::SampleCountMismatch { expected, found });
        }

        self.rasterizer.set_register_mappings(mappings);
        Ok(())
    }
}
