//! Shaded vertices and the triangles assembled from them

use crate::math::Vec4;

/// A vertex after vertex (or geometry) shading
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ShadedVertex {
    /// Homogeneous position. Clip space leaving the shaders; screen space
    /// (x, y in pixels, z depth, w clip-space w) once the rasterizer stage
    /// has applied the viewport.
    pub position: Vec4,
    /// Output registers, indexed by register number
    pub data: Vec<Vec4>,
}

impl ShadedVertex {
    pub fn new(position: Vec4, data: Vec<Vec4>) -> Self {
        Self { position, data }
    }
}

/// One triangle
#[derive(Debug, Clone, PartialEq)]
pub struct Primitive {
    pub vertices: [ShadedVertex; 3],
}

impl Primitive {
    pub fn new(v0: ShadedVertex, v1: ShadedVertex, v2: ShadedVertex) -> Self {
        Self { vertices: [v0, v1, v2] }
    }

    /// Twice the signed screen-space area; positive when counter-clockwise
    /// on a y-down target
    pub fn signed_area(&self) -> f32 {
        let [v0, v1, v2] = &self.vertices;
        let (p0, p1, p2) = (v0.position, v1.position, v2.position);
        (p2.x - p0.x) * (p1.y - p0.y) - (p1.x - p0.x) * (p2.y - p0.y)
    }
}
