use crate::error::{RasterError, Result};

use super::input_assembler::VertexRecord;
use super::primitive::ShadedVertex;
use super::shader::VertexShader;

#[derive(Default)]
pub struct VertexShaderStage {
    shader: Option<Box<dyn VertexShader>>,
}

impl VertexShaderStage {
    pub fn set_shader(&mut self, shader: Option<Box<dyn VertexShader>>) {
        self.shader = shader;
    }

    pub fn shader(&self) -> Option<&dyn VertexShader> {
        self.shader.as_deref()
    }

    pub fn run(&self, inputs: &[VertexRecord], outputs: &mut Vec<ShadedVertex>) -> Result<()> {
        let shader = self.shader.as_deref().ok_or(RasterError::MissingShader("vertex"))?;
        outputs.extend(inputs.iter().map(|record| shader.execute(record)));
        Ok(())
    }
}
