//! Built-in vertex color shaders
//!
//! Vertex records are `[position, color]`. The position is taken as clip
//! space already (no transform), the color is forwarded as `COLOR0`.

use crate::math::Vec4;
use crate::pipeline::pixel_shader::PixelShaderInput;
use crate::pipeline::primitive::ShadedVertex;
use crate::pipeline::shader::{PixelShader, Semantic, VertexShader};

pub const POSITION_REGISTER: usize = 0;
pub const COLOR_REGISTER: usize = 1;

fn color_signature() -> Vec<Semantic> {
    vec![Semantic::new("COLOR", 0)]
}

pub struct ColorVertexShader {
    signature: Vec<Semantic>,
}

impl ColorVertexShader {
    pub fn new() -> Self {
        Self { signature: color_signature() }
    }
}

impl Default for ColorVertexShader {
    fn default() -> Self {
        Self::new()
    }
}

impl VertexShader for ColorVertexShader {
    fn output_signature(&self) -> &[Semantic] {
        &self.signature
    }

    fn execute(&self, input: &[Vec4]) -> ShadedVertex {
        let position = input.get(POSITION_REGISTER).copied().unwrap_or(Vec4::new(0.0, 0.0, 0.0, 1.0));
        let color = input.get(COLOR_REGISTER).copied().unwrap_or(Vec4::ONE);
        ShadedVertex::new(position, vec![color])
    }
}

/// Outputs the interpolated `COLOR0`; fully transparent fragments are discarded
pub struct ColorPixelShader {
    signature: Vec<Semantic>,
}

impl ColorPixelShader {
    pub fn new() -> Self {
        Self { signature: color_signature() }
    }
}

impl Default for ColorPixelShader {
    fn default() -> Self {
        Self::new()
    }
}

impl PixelShader for ColorPixelShader {
    fn input_signature(&self) -> &[Semantic] {
        &self.signature
    }

    fn execute(&self, input: &PixelShaderInput<'_>) -> Option<Vec4> {
        let color = input.input(0);
        if color.w <= 0.0 {
            return None;
        }
        Some(color)
    }
}
