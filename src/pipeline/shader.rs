//! Shader capability interfaces
//!
//! A shader is just a callable from an input record to an output record.
//! Attribute layout is resolved once per draw by matching semantics between
//! the producing stage's output signature and the pixel shader's input
//! signature, see [`build_register_mappings`].

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{RasterError, Result};
use crate::math::Vec4;

use super::pixel_shader::PixelShaderInput;
use super::primitive::{Primitive, ShadedVertex};

/// Name + index tagging a shader register, e.g. `COLOR0`
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Semantic {
    pub name: String,
    pub index: u32,
}

impl Semantic {
    pub fn new(name: impl Into<String>, index: u32) -> Self {
        Self { name: name.into(), index }
    }
}

impl fmt::Display for Semantic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.name, self.index)
    }
}

pub trait VertexShader {
    /// Semantic of each output register, by register number
    fn output_signature(&self) -> &[Semantic];

    /// Shade one vertex; `input` holds the vertex buffer record's registers
    fn execute(&self, input: &[Vec4]) -> ShadedVertex;
}

pub trait GeometryShader {
    fn output_signature(&self) -> &[Semantic];

    /// Emit zero or more triangles for one input triangle
    fn execute(&self, primitive: &Primitive, stream: &mut Vec<Primitive>);
}

pub trait PixelShader {
    /// Semantic of each input register, by register number
    fn input_signature(&self) -> &[Semantic];

    /// Color for one fragment, or `None` to discard it
    fn execute(&self, input: &PixelShaderInput<'_>) -> Option<Vec4>;
}

/// For each pixel shader input, the index of the producer output register
/// with the same semantic
pub fn build_register_mappings(inputs: &[Semantic], outputs: &[Semantic]) -> Result<Vec<usize>> {
    inputs
        .iter()
        .map(|input| {
            outputs
                .iter()
                .position(|output| output == input)
                .ok_or_else(|| RasterError::MissingRegisterMapping { semantic: input.to_string() })
        })
        .collect()
}

/// Vertex shader backed by a closure
pub struct FnVertexShader<F> {
    signature: Vec<Semantic>,
    f: F,
}

impl<F> FnVertexShader<F>
where
    F: Fn(&[Vec4]) -> ShadedVertex,
{
    pub fn new(signature: Vec<Semantic>, f: F) -> Self {
        Self { signature, f }
    }
}

impl<F> VertexShader for FnVertexShader<F>
where
    F: Fn(&[Vec4]) -> ShadedVertex,
{
    fn output_signature(&self) -> &[Semantic] {
        &self.signature
    }

    fn execute(&self, input: &[Vec4]) -> ShadedVertex {
        (self.f)(input)
    }
}

/// Geometry shader backed by a closure
pub struct FnGeometryShader<F> {
    signature: Vec<Semantic>,
    f: F,
}

impl<F> FnGeometryShader<F>
where
    F: Fn(&Primitive, &mut Vec<Primitive>),
{
    pub fn new(signature: Vec<Semantic>, f: F) -> Self {
        Self { signature, f }
    }
}

impl<F> GeometryShader for FnGeometryShader<F>
where
    F: Fn(&Primitive, &mut Vec<Primitive>),
{
    fn output_signature(&self) -> &[Semantic] {
        &self.signature
    }

    fn execute(&self, primitive: &Primitive, stream: &mut Vec<Primitive>) {
        (self.f)(primitive, stream)
    }
}

/// Pixel shader backed by a closure
pub struct FnPixelShader<F> {
    signature: Vec<Semantic>,
    f: F,
}

impl<F> FnPixelShader<F>
where
    F: Fn(&PixelShaderInput<'_>) -> Option<Vec4>,
{
    pub fn new(signature: Vec<Semantic>, f: F) -> Self {
        Self { signature, f }
    }
}

impl<F> PixelShader for FnPixelShader<F>
where
    F: Fn(&PixelShaderInput<'_>) -> Option<Vec4>,
{
    fn input_signature(&self) -> &[Semantic] {
        &self.signature
    }

    fn execute(&self, input: &PixelShaderInput<'_>) -> Option<Vec4> {
        (self.f)(input)
    }
}
