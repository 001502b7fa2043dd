//! Rasterizer stage
//!
//! Maps clip-space triangles onto the viewport, drops culled faces, and feeds
//! the rest through the triangle scan converter.

mod barycentric;
mod fragment;
mod state;
mod triangle;

pub use barycentric::*;
pub use fragment::*;
pub use state::*;
pub use triangle::*;

use log::trace;

use super::primitive::{Primitive, ShadedVertex};

/// Per-device rasterizer: one instance, reconfigured between draws
#[derive(Debug, Clone)]
pub struct RasterizerStage {
    rasterizer: TriangleRasterizer,
    viewport: Viewport,
}

impl RasterizerStage {
    pub fn new(viewport: Viewport) -> Self {
        Self {
            rasterizer: TriangleRasterizer::default(),
            viewport,
        }
    }

    pub fn set_state(&mut self, state: RasterizerState) {
        self.rasterizer.set_state(state);
    }

    pub fn state(&self) -> &RasterizerState {
        self.rasterizer.state()
    }

    pub fn set_viewport(&mut self, viewport: Viewport) {
        self.viewport = viewport;
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    pub fn set_register_mappings(&mut self, register_mappings: Vec<usize>) {
        self.rasterizer.set_register_mappings(register_mappings);
    }

    /// Rasterize every primitive, appending covered quads in submission order
    pub fn run(&mut self, inputs: &[Primitive], outputs: &mut Vec<FragmentQuad>) {
        self.rasterizer.set_scissor(Some(viewport_bounds(&self.viewport)));

        for (index, primitive) in inputs.iter().enumerate() {
            let screen = to_screen_space(primitive, &self.viewport);
            if should_cull(&screen, self.state().description()) {
                trace!("rasterizer: culled primitive {}", index);
                continue;
            }

            let before = outputs.len();
            outputs.extend(self.rasterizer.rasterize_primitive(screen));
            trace!("rasterizer: primitive {} produced {} quads", index, outputs.len() - before);
        }
    }
}

impl Default for RasterizerStage {
    fn default() -> Self {
        Self::new(Viewport::new(0.0, 0.0))
    }
}

/// Perspective divide and viewport transform.
///
/// x and y become pixel coordinates (y grows downward), z is mapped into
/// the viewport depth range, and w keeps the clip-space w for
/// perspective-correct interpolation.
pub fn to_screen_space(primitive: &Primitive, viewport: &Viewport) -> Primitive {
    let map = |vertex: &ShadedVertex| {
        let p = vertex.position;
        let inv_w = 1.0 / p.w;
        let (nx, ny, nz) = (p.x * inv_w, p.y * inv_w, p.z * inv_w);

        let mut out = vertex.clone();
        out.position.x = viewport.top_left_x + (nx + 1.0) * 0.5 * viewport.width;
        out.position.y = viewport.top_left_y + (1.0 - ny) * 0.5 * viewport.height;
        out.position.z = viewport.min_depth + nz * (viewport.max_depth - viewport.min_depth);
        out
    };

    let [v0, v1, v2] = &primitive.vertices;
    Primitive::new(map(v0), map(v1), map(v2))
}

fn viewport_bounds(viewport: &Viewport) -> PixelBounds {
    PixelBounds {
        min_x: viewport.top_left_x.floor() as i32,
        min_y: viewport.top_left_y.floor() as i32,
        max_x: (viewport.top_left_x + viewport.width).ceil() as i32 - 1,
        max_y: (viewport.top_left_y + viewport.height).ceil() as i32 - 1,
    }
}

/// Whether a screen-space triangle faces away according to the cull mode
fn should_cull(screen: &Primitive, desc: &RasterizerStateDescription) -> bool {
    let area = screen.signed_area();
    let is_front = if desc.front_counter_clockwise { area > 0.0 } else { area < 0.0 };

    match desc.cull_mode {
        CullMode::None => false,
        CullMode::Front => is_front,
        CullMode::Back => !is_front,
    }
}
