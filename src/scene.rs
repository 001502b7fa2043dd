//! RON scene files
//!
//! A scene fixes the target size, clear values, pipeline states and a list
//! of draws. Every draw uses the built-in vertex color shaders.

use std::fs;
use std::path::Path;

use log::{debug, info};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::device::Device;
use crate::error::RasterError;
use crate::math::Vec4;
use crate::pipeline::input_assembler::PrimitiveTopology;
use crate::pipeline::output_merger::{DepthStencilState, DepthStencilStateDescription};
use crate::pipeline::rasterizer::{RasterizerState, RasterizerStateDescription};
use crate::shaders::{ColorPixelShader, ColorVertexShader};

#[derive(Debug, Error)]
pub enum SceneError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("parse error: {0}")]
    Parse(#[from] ron::error::SpannedError),
    #[error("serialize error: {0}")]
    Serialize(#[from] ron::Error),
    #[error("image error: {0}")]
    Image(#[from] image::ImageError),
    #[error("render error: {0}")]
    Raster(#[from] RasterError),
    #[error("scene is {width}x{height}, the viewer shows at most {max}x{max}")]
    TooLargeForViewer { width: usize, height: usize, max: usize },
}

/// Clip-space position plus color
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SceneVertex {
    pub position: Vec4,
    pub color: Vec4,
}

impl SceneVertex {
    pub fn new(position: Vec4, color: Vec4) -> Self {
        Self { position, color }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DrawCall {
    #[serde(default)]
    pub topology: PrimitiveTopology,
    pub vertices: Vec<SceneVertex>,
    #[serde(default)]
    pub indices: Option<Vec<u32>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Scene {
    pub width: usize,
    pub height: usize,
    #[serde(default = "default_clear_color")]
    pub clear_color: Vec4,
    #[serde(default = "default_clear_depth")]
    pub clear_depth: f32,
    #[serde(default)]
    pub rasterizer: RasterizerStateDescription,
    #[serde(default)]
    pub depth_stencil: DepthStencilStateDescription,
    pub draws: Vec<DrawCall>,
}

fn default_clear_color() -> Vec4 {
    Vec4::new(0.0, 0.0, 0.0, 1.0)
}

fn default_clear_depth() -> f32 {
    1.0
}

impl Scene {
    /// Overlapping triangles at different depths, used when no scene file is given
    pub fn demo() -> Self {
        let red = Vec4::new(1.0, 0.0, 0.0, 1.0);
        let green = Vec4::new(0.0, 1.0, 0.0, 1.0);
        let blue = Vec4::new(0.0, 0.0, 1.0, 1.0);
        let slate = Vec4::new(0.35, 0.45, 0.6, 1.0);

        let front = DrawCall {
            topology: PrimitiveTopology::TriangleList,
            vertices: vec![
                SceneVertex::new(Vec4::new(0.0, 0.8, 0.3, 1.0), red),
                SceneVertex::new(Vec4::new(0.7, -0.6, 0.3, 1.0), green),
                SceneVertex::new(Vec4::new(-0.7, -0.6, 0.3, 1.0), blue),
            ],
            indices: None,
        };

        // Drawn second but further away, so the triangle occludes it
        let back = DrawCall {
            topology: PrimitiveTopology::TriangleList,
            vertices: vec![
                SceneVertex::new(Vec4::new(-0.9, 0.4, 0.6, 1.0), slate),
                SceneVertex::new(Vec4::new(0.2, 0.4, 0.6, 1.0), slate),
                SceneVertex::new(Vec4::new(0.2, -0.9, 0.6, 1.0), slate),
                SceneVertex::new(Vec4::new(-0.9, -0.9, 0.6, 1.0), slate),
            ],
            indices: Some(vec![0, 1, 2, 0, 2, 3]),
        };

        Self {
            width: 320,
            height: 240,
            clear_color: Vec4::new(0.1, 0.1, 0.12, 1.0),
            clear_depth: default_clear_depth(),
            rasterizer: RasterizerStateDescription::default(),
            depth_stencil: DepthStencilStateDescription::default(),
            draws: vec![front, back],
        }
    }

    /// Build a device for this scene and run every draw on it
    pub fn render(&self) -> Result<Device, SceneError> {
        let state = RasterizerState::new(self.rasterizer.clone())?;
        let mut device = Device::new(self.width, self.height, state.samples_per_pixel());
        device.rasterizer.set_state(state);
        device
            .output_merger
            .set_depth_stencil_state(DepthStencilState::new(self.depth_stencil.clone()));
        device.vertex_shader.set_shader(Some(Box::new(ColorVertexShader::new())));
        device.pixel_shader.set_shader(Some(Box::new(ColorPixelShader::new())));

        device.clear_render_target(self.clear_color);
        device.clear_depth_buffer(self.clear_depth);

        for (index, draw) in self.draws.iter().enumerate() {
            debug!("scene: draw {} ({} vertices)", index, draw.vertices.len());
            device.input_assembler.set_topology(draw.topology);
            device
                .input_assembler
                .set_vertex_buffer(draw.vertices.iter().map(|v| vec![v.position, v.color]).collect());
            device.input_assembler.set_index_buffer(draw.indices.clone());
            device.draw()?;
        }

        info!("rendered {}x{} scene, {} draws", self.width, self.height, self.draws.len());
        Ok(device)
    }

    /// Target size as texture dimensions; scenes past `u16::MAX` on either
    /// axis can only be exported headless
    pub fn viewer_size(&self) -> Result<(u16, u16), SceneError> {
        match (u16::try_from(self.width), u16::try_from(self.height)) {
            (Ok(width), Ok(height)) => Ok((width, height)),
            _ => Err(SceneError::TooLargeForViewer {
                width: self.width,
                height: self.height,
                max: u16::MAX as usize,
            }),
        }
    }

    /// Render and write the resolved image as a PNG
    pub fn render_to_png<P: AsRef<Path>>(&self, path: P) -> Result<(), SceneError> {
        let device = self.render()?;
        device.output_merger.render_target.save_png(path)?;
        Ok(())
    }
}

/// Load a scene from a RON file
pub fn load_scene<P: AsRef<Path>>(path: P) -> Result<Scene, SceneError> {
    let contents = fs::read_to_string(path)?;
    load_scene_from_str(&contents)
}

/// Save a scene to a RON file
pub fn save_scene<P: AsRef<Path>>(scene: &Scene, path: P) -> Result<(), SceneError> {
    let config = ron::ser::PrettyConfig::new()
        .depth_limit(4)
        .indentor("  ".to_string());

    let contents = ron::ser::to_string_pretty(scene, config)?;
    fs::write(path, contents)?;
    Ok(())
}

/// Load a scene from a RON string (embedded scenes, tests)
pub fn load_scene_from_str(s: &str) -> Result<Scene, SceneError> {
    Ok(ron::from_str(s)?)
}
