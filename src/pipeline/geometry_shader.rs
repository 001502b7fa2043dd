//! Geometry shader stage
//!
//! Groups shaded vertices into triangles and, if a geometry shader is bound,
//! lets it replace each triangle with whatever it emits.

use super::primitive::{Primitive, ShadedVertex};
use super::shader::{GeometryShader, Semantic};

#[derive(Default)]
pub struct GeometryShaderStage {
    shader: Option<Box<dyn GeometryShader>>,
}

impl GeometryShaderStage {
    pub fn set_shader(&mut self, shader: Option<Box<dyn GeometryShader>>) {
        self.shader = shader;
    }

    /// Output signature seen by the pixel shader: the geometry shader's if
    /// one is bound, otherwise the vertex shader's
    pub fn output_signature<'a>(&'a self, vertex_outputs: &'a [Semantic]) -> &'a [Semantic] {
        match &self.shader {
            Some(shader) => shader.output_signature(),
            None => vertex_outputs,
        }
    }

    pub fn run(&self, inputs: &[ShadedVertex], outputs: &mut Vec<Primitive>) {
        for triangle in inputs.chunks_exact(3) {
            let primitive = Primitive::new(triangle[0].clone(), triangle[1].clone(), triangle[2].clone());
            match &self.shader {
                Some(shader) => shader.execute(&primitive, outputs),
                None => outputs.push(primitive),
            }
        }
    }
}
