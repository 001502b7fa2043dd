//! Output merger: depth test and write-through to the bound targets

mod depth_stencil;
mod targets;

pub use depth_stencil::*;
pub use targets::*;

use log::trace;

use crate::error::{RasterError, Result};
use crate::math::Vec4;

use super::pixel_shader::Pixel;

#[derive(Debug, Clone)]
pub struct OutputMergerStage {
    depth_stencil_state: DepthStencilState,
    pub render_target: RenderTarget,
    pub depth_buffer: DepthBuffer,
}

impl OutputMergerStage {
    pub fn new(width: usize, height: usize, sample_count: u32) -> Self {
        Self {
            depth_stencil_state: DepthStencilState::default(),
            render_target: RenderTarget::new(width, height, sample_count),
            depth_buffer: DepthBuffer::new(width, height, sample_count),
        }
    }

    pub fn set_depth_stencil_state(&mut self, state: DepthStencilState) {
        self.depth_stencil_state = state;
    }

    pub fn depth_stencil_state(&self) -> &DepthStencilState {
        &self.depth_stencil_state
    }

    /// Replace both targets; they must agree on size and sample count
    pub fn set_targets(&mut self, render_target: RenderTarget, depth_buffer: DepthBuffer) -> Result<()> {
        let target = (render_target.width, render_target.height);
        let depth = (depth_buffer.width, depth_buffer.height);
        if target != depth {
            return Err(RasterError::TargetSizeMismatch { target, depth });
        }
        if render_target.sample_count() != depth_buffer.sample_count() {
            return Err(RasterError::SampleCountMismatch {
                expected: render_target.sample_count(),
                found: depth_buffer.sample_count(),
            });
        }
        self.render_target = render_target;
        self.depth_buffer = depth_buffer;
        Ok(())
    }

    pub fn clear_render_target(&mut self, color: Vec4) {
        self.render_target.clear(color);
    }

    pub fn clear_depth_buffer(&mut self, depth: f32) {
        self.depth_buffer.clear(depth);
    }

    /// Depth test every covered sample and write color and depth where it
    /// passes. Pixels outside the targets are dropped.
    pub fn run(&mut self, inputs: &[Pixel]) {
        let mut written = 0usize;
        let mut rejected = 0usize;

        for pixel in inputs {
            if pixel.x < 0 || pixel.y < 0 {
                continue;
            }
            let (x, y) = (pixel.x as usize, pixel.y as usize);

            for (index, sample) in pixel.samples.covered() {
                let Some(current) = self.depth_buffer.get(x, y, index) else {
                    continue;
                };
                if !self.depth_stencil_state.depth_test_passes(sample.depth, current) {
                    rejected += 1;
                    continue;
                }
                self.depth_buffer.set(x, y, index, sample.depth);
                self.render_target.set_sample(x, y, index, pixel.color);
                written += 1;
            }
        }

        trace!("output merger: {} samples written, {} failed depth", written, rejected);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::rasterizer::{Sample, Samples};

    fn pixel(x: i32, y: i32, depth: f32, color: Vec4) -> Pixel {
        let mut samples = Samples::default();
        samples.slots[0] = Sample { covered: true, depth };
        samples.any_covered = true;
        Pixel { x, y, color, samples }
    }

    #[test]
    fn test_nearer_fragment_wins() {
        let mut om = OutputMergerStage::new(2, 2, 1);
        om.clear_depth_buffer(1.0);
        let red = Vec4::new(1.0, 0.0, 0.0, 1.0);
        let blue = Vec4::new(0.0, 0.0, 1.0, 1.0);

        om.run(&[pixel(0, 0, 0.5, red), pixel(0, 0, 0.7, blue)]);
        assert_eq!(om.render_target.get_sample(0, 0, 0), Some(red));
        assert_eq!(om.depth_buffer.get(0, 0, 0), Some(0.5));

        om.run(&[pixel(0, 0, 0.2, blue)]);
        assert_eq!(om.render_target.get_sample(0, 0, 0), Some(blue));
    }

    #[test]
    fn test_disabled_depth_always_overwrites() {
        let mut om = OutputMergerStage::new(1, 1, 1);
        om.set_depth_stencil_state(DepthStencilState::new(DepthStencilStateDescription {
            depth_enabled: false,
            depth_comparison: ComparisonFunc::Never,
        }));
        om.clear_depth_buffer(0.0);
        om.run(&[pixel(0, 0, 0.9, Vec4::ONE)]);
        assert_eq!(om.render_target.get_sample(0, 0, 0), Some(Vec4::ONE));
        assert_eq!(om.depth_buffer.get(0, 0, 0), Some(0.9));
    }

    #[test]
    fn test_off_target_pixels_ignored() {
        let mut om = OutputMergerStage::new(2, 2, 1);
        om.run(&[pixel(-1, 0, 0.1, Vec4::ONE), pixel(2, 1, 0.1, Vec4::ONE)]);
        assert_eq!(om.render_target.resolve(), vec![0; 16]);
    }

    #[test]
    fn test_per_sample_writes() {
        let mut om = OutputMergerStage::new(1, 1, 4);
        let mut p = pixel(0, 0, 0.5, Vec4::ONE);
        p.samples.slots[2] = Sample { covered: true, depth: 0.5 };
        om.run(&[p]);
        assert_eq!(om.render_target.get_sample(0, 0, 0), Some(Vec4::ONE));
        assert_eq!(om.render_target.get_sample(0, 0, 1), Some(Vec4::ZERO));
        assert_eq!(om.render_target.get_sample(0, 0, 2), Some(Vec4::ONE));
        assert_eq!(om.depth_buffer.get(0, 0, 3), Some(1.0));
    }

    #[test]
    fn test_set_targets_mismatch() {
        let mut om = OutputMergerStage::new(1, 1, 1);
        let err = om.set_targets(RenderTarget::new(2, 2, 1), DepthBuffer::new(2, 3, 1));
        assert_eq!(err, Err(RasterError::TargetSizeMismatch { target: (2, 2), depth: (2, 3) }));
    }
}
