//! Pixel shader stage
//!
//! Works a quad at a time so shaders can take screen-space derivatives of
//! their inputs from the neighbouring fragments.

use log::trace;

use crate::error::{RasterError, Result};
use crate::math::Vec4;

use super::rasterizer::{Fragment, FragmentQuad, FragmentQuadLocation, Samples};
use super::shader::PixelShader;

/// What a pixel shader sees for one fragment
pub struct PixelShaderInput<'a> {
    pub x: i32,
    pub y: i32,
    fragment: &'a Fragment,
    quad: &'a FragmentQuad,
}

impl<'a> PixelShaderInput<'a> {
    pub fn new(fragment: &'a Fragment, quad: &'a FragmentQuad) -> Self {
        Self {
            x: fragment.x,
            y: fragment.y,
            fragment,
            quad,
        }
    }

    /// Interpolated value of an input register
    pub fn input(&self, register: usize) -> Vec4 {
        read(self.fragment, register)
    }

    /// Rate of change along x, taken within this fragment's row of the quad
    pub fn ddx(&self, register: usize) -> Vec4 {
        let (left, right) = match self.fragment.quad_location {
            FragmentQuadLocation::TopLeft | FragmentQuadLocation::TopRight => {
                (self.quad.top_left(), self.quad.top_right())
            }
            FragmentQuadLocation::BottomLeft | FragmentQuadLocation::BottomRight => {
                (self.quad.bottom_left(), self.quad.bottom_right())
            }
        };
        read(right, register) - read(left, register)
    }

    /// Rate of change along y, taken within this fragment's column of the quad
    pub fn ddy(&self, register: usize) -> Vec4 {
        let (top, bottom) = match self.fragment.quad_location {
            FragmentQuadLocation::TopLeft | FragmentQuadLocation::BottomLeft => {
                (self.quad.top_left(), self.quad.bottom_left())
            }
            FragmentQuadLocation::TopRight | FragmentQuadLocation::BottomRight => {
                (self.quad.top_right(), self.quad.bottom_right())
            }
        };
        read(bottom, register) - read(top, register)
    }

    pub fn samples(&self) -> &Samples {
        &self.fragment.samples
    }
}

fn read(fragment: &Fragment, register: usize) -> Vec4 {
    fragment.data.get(register).copied().unwrap_or_default()
}

/// Shaded fragment headed for the output merger
#[derive(Debug, Clone, PartialEq)]
pub struct Pixel {
    pub x: i32,
    pub y: i32,
    pub color: Vec4,
    pub samples: Samples,
}

#[derive(Default)]
pub struct PixelShaderStage {
    shader: Option<Box<dyn PixelShader>>,
}

impl PixelShaderStage {
    pub fn set_shader(&mut self, shader: Option<Box<dyn PixelShader>>) {
        self.shader = shader;
    }

    pub fn shader(&self) -> Option<&dyn PixelShader> {
        self.shader.as_deref()
    }

    /// Shade the covered fragments of every quad. Uncovered fragments only
    /// serve as derivative neighbours and produce no pixel.
    pub fn run(&self, inputs: &[FragmentQuad], outputs: &mut Vec<Pixel>) -> Result<()> {
        let shader = self.shader.as_deref().ok_or(RasterError::MissingShader("pixel"))?;

        let mut discarded = 0usize;
        for quad in inputs {
            for fragment in quad.fragments.iter().filter(|f| f.is_covered()) {
                match shader.execute(&PixelShaderInput::new(fragment, quad)) {
                    Some(color) => outputs.push(Pixel {
                        x: fragment.x,
                        y: fragment.y,
                        color,
                        samples: fragment.samples,
                    }),
                    None => discarded += 1,
                }
            }
        }

        trace!("pixel shader: {} pixels, {} discarded", outputs.len(), discarded);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::shader::{FnPixelShader, Semantic};

    fn quad_with_ramp() -> FragmentQuad {
        // Register 0 holds (x * 2, y * 3); only the top-left fragment is covered
        let mut quad = FragmentQuad::new(2, 4);
        for fragment in quad.fragments.iter_mut() {
            fragment.data = vec![Vec4::new(fragment.x as f32 * 2.0, fragment.y as f32 * 3.0, 0.0, 1.0)];
        }
        quad.fragments[0].samples.any_covered = true;
        quad.fragments[0].samples.slots[0].covered = true;
        quad
    }

    #[test]
    fn test_derivatives() {
        let quad = quad_with_ramp();
        for fragment in &quad.fragments {
            let input = PixelShaderInput::new(fragment, &quad);
            assert_eq!(input.ddx(0), Vec4::new(2.0, 0.0, 0.0, 0.0));
            assert_eq!(input.ddy(0), Vec4::new(0.0, 3.0, 0.0, 0.0));
        }
    }

    #[test]
    fn test_only_covered_fragments_shaded() {
        let mut stage = PixelShaderStage::default();
        stage.set_shader(Some(Box::new(FnPixelShader::new(
            vec![Semantic::new("COLOR", 0)],
            |input: &PixelShaderInput<'_>| Some(input.ddx(0)),
        ))));

        let mut pixels = Vec::new();
        stage.run(&[quad_with_ramp()], &mut pixels).unwrap();
        assert_eq!(pixels.len(), 1);
        assert_eq!((pixels[0].x, pixels[0].y), (2, 4));
        assert_eq!(pixels[0].color, Vec4::new(2.0, 0.0, 0.0, 0.0));
    }

    #[test]
    fn test_discard() {
        let mut stage = PixelShaderStage::default();
        stage.set_shader(Some(Box::new(FnPixelShader::new(vec![], |_: &PixelShaderInput<'_>| None))));
        let mut pixels = Vec::new();
        stage.run(&[quad_with_ramp()], &mut pixels).unwrap();
        assert!(pixels.is_empty());
    }

    #[test]
    fn test_missing_shader() {
        let stage = PixelShaderStage::default();
        assert_eq!(stage.run(&[], &mut Vec::new()), Err(RasterError::MissingShader("pixel")));
    }
}
