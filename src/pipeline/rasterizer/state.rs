//! Rasterizer configuration

use serde::{Deserialize, Serialize};

use crate::error::{RasterError, Result};
use crate::math::Vec2;

use super::fragment::MAX_SAMPLES;

/// Fill mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FillMode {
    Wireframe = 2,
    Solid = 3,
}

impl TryFrom<u32> for FillMode {
    type Error = RasterError;

    fn try_from(value: u32) -> Result<Self> {
        match value {
            2 => Ok(FillMode::Wireframe),
            3 => Ok(FillMode::Solid),
            other => Err(RasterError::UnsupportedFillMode(other)),
        }
    }
}

/// Which faces to discard before scan conversion
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CullMode {
    None,
    Front,
    Back,
}

/// Rasterizer settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RasterizerStateDescription {
    pub fill_mode: FillMode,
    pub cull_mode: CullMode,
    /// Counter-clockwise (in screen space) triangles are front faces
    pub front_counter_clockwise: bool,
    pub multisample_enabled: bool,
    /// Samples per fragment when multisampling (0..=4)
    pub multisample_count: u32,
    /// Perspective-correct attribute interpolation (false = affine)
    pub perspective_correct: bool,
}

impl Default for RasterizerStateDescription {
    fn default() -> Self {
        Self {
            fill_mode: FillMode::Solid,
            cull_mode: CullMode::None,
            front_counter_clockwise: false,
            multisample_enabled: false,
            multisample_count: 1,
            perspective_correct: true,
        }
    }
}

/// Validated, immutable rasterizer configuration
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RasterizerState {
    description: RasterizerStateDescription,
}

impl RasterizerState {
    pub fn new(description: RasterizerStateDescription) -> Result<Self> {
        if description.multisample_count as usize > MAX_SAMPLES {
            return Err(RasterError::UnsupportedSampleCount(description.multisample_count));
        }
        Ok(Self { description })
    }

    pub fn description(&self) -> &RasterizerStateDescription {
        &self.description
    }

    /// Sample slots written per pixel by this configuration
    pub fn samples_per_pixel(&self) -> u32 {
        if self.description.multisample_enabled {
            self.description.multisample_count.max(1)
        } else {
            1
        }
    }
}

/// Maps normalized device coordinates onto the render target
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    pub top_left_x: f32,
    pub top_left_y: f32,
    pub width: f32,
    pub height: f32,
    pub min_depth: f32,
    pub max_depth: f32,
}

impl Viewport {
    pub fn new(width: f32, height: f32) -> Self {
        Self {
            top_left_x: 0.0,
            top_left_y: 0.0,
            width,
            height,
            min_depth: 0.0,
            max_depth: 1.0,
        }
    }
}

// Offsets from the pixel center in 1/16 pixel units, one table per sample count.
const PATTERN_1: [(i8, i8); 1] = [(0, 0)];
const PATTERN_2: [(i8, i8); 2] = [(4, 4), (-4, -4)];
const PATTERN_4: [(i8, i8); 4] = [(-2, -6), (6, -2), (-6, 2), (2, 6)];

/// Sub-pixel position of a multisample.
///
/// One sample sits at the pixel center, two samples use the diagonal pair,
/// three and four samples use the rotated-grid pattern (three takes its first
/// three entries).
pub fn sample_position(x: i32, y: i32, sample_index: usize, sample_count: u32) -> Vec2 {
    let pattern: &[(i8, i8)] = match sample_count {
        0 | 1 => &PATTERN_1,
        2 => &PATTERN_2,
        _ => &PATTERN_4,
    };
    let (dx, dy) = pattern[sample_index % pattern.len()];
    Vec2::new(
        x as f32 + 0.5 + dx as f32 / 16.0,
        y as f32 + 0.5 + dy as f32 / 16.0,
    )
}
