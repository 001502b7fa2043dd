//! Render target and depth buffer with per-sample storage

use std::path::Path;

use crate::color::Color;
use crate::math::Vec4;

/// Color buffer holding `sample_count` slots per pixel
#[derive(Debug, Clone)]
pub struct RenderTarget {
    pub width: usize,
    pub height: usize,
    sample_count: u32,
    samples: Vec<Vec4>,
}

impl RenderTarget {
    pub fn new(width: usize, height: usize, sample_count: u32) -> Self {
        let sample_count = sample_count.max(1);
        Self {
            width,
            height,
            sample_count,
            samples: vec![Vec4::ZERO; width * height * sample_count as usize],
        }
    }

    pub fn sample_count(&self) -> u32 {
        self.sample_count
    }

    pub fn clear(&mut self, color: Vec4) {
        self.samples.fill(color);
    }

    fn index(&self, x: usize, y: usize, sample: usize) -> Option<usize> {
        if x < self.width && y < self.height && sample < self.sample_count as usize {
            Some((y * self.width + x) * self.sample_count as usize + sample)
        } else {
            None
        }
    }

    pub fn get_sample(&self, x: usize, y: usize, sample: usize) -> Option<Vec4> {
        self.index(x, y, sample).map(|i| self.samples[i])
    }

    pub fn set_sample(&mut self, x: usize, y: usize, sample: usize, color: Vec4) {
        if let Some(i) = self.index(x, y, sample) {
            self.samples[i] = color;
        }
    }

    /// Average of a pixel's samples
    pub fn resolve_pixel(&self, x: usize, y: usize) -> Option<Vec4> {
        let first = self.index(x, y, 0)?;
        let slots = &self.samples[first..first + self.sample_count as usize];
        let sum = slots.iter().fold(Vec4::ZERO, |acc, &c| acc + c);
        Some(sum * (1.0 / self.sample_count as f32))
    }

    /// Resolve every pixel to RGBA8, 4 bytes per pixel, row-major
    pub fn resolve(&self) -> Vec<u8> {
        let mut pixels = Vec::with_capacity(self.width * self.height * 4);
        for y in 0..self.height {
            for x in 0..self.width {
                let color = self.resolve_pixel(x, y).unwrap_or_default();
                pixels.extend_from_slice(&Color::from_vec4(color).to_bytes());
            }
        }
        pixels
    }

    pub fn to_image(&self) -> image::RgbaImage {
        // resolve() always yields width * height * 4 bytes
        image::RgbaImage::from_raw(self.width as u32, self.height as u32, self.resolve())
            .unwrap_or_else(|| image::RgbaImage::new(self.width as u32, self.height as u32))
    }

    /// Write the resolved image as a PNG
    pub fn save_png<P: AsRef<Path>>(&self, path: P) -> Result<(), image::ImageError> {
        self.to_image().save_with_format(path, image::ImageFormat::Png)
    }
}

/// Depth buffer matching a render target's layout
#[derive(Debug, Clone)]
pub struct DepthBuffer {
    pub width: usize,
    pub height: usize,
    sample_count: u32,
    depths: Vec<f32>,
}

impl DepthBuffer {
    pub fn new(width: usize, height: usize, sample_count: u32) -> Self {
        let sample_count = sample_count.max(1);
        Self {
            width,
            height,
            sample_count,
            depths: vec![1.0; width * height * sample_count as usize],
        }
    }

    pub fn sample_count(&self) -> u32 {
        self.sample_count
    }

    pub fn clear(&mut self, depth: f32) {
        self.depths.fill(depth);
    }

    fn index(&self, x: usize, y: usize, sample: usize) -> Option<usize> {
        if x < self.width && y < self.height && sample < self.sample_count as usize {
            Some((y * self.width + x) * self.sample_count as usize + sample)
        } else {
            None
        }
    }

    pub fn get(&self, x: usize, y: usize, sample: usize) -> Option<f32> {
        self.index(x, y, sample).map(|i| self.depths[i])
    }

    pub fn set(&mut self, x: usize, y: usize, sample: usize, depth: f32) {
        if let Some(i) = self.index(x, y, sample) {
            self.depths[i] = depth;
        }
    }
}
