//! Input assembly: vertex and index buffers to triangle-list vertex order

use serde::{Deserialize, Serialize};

use crate::error::{RasterError, Result};
use crate::math::Vec4;

/// One vertex buffer entry: the vertex shader's input registers
pub type VertexRecord = Vec<Vec4>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum PrimitiveTopology {
    #[default]
    TriangleList,
    TriangleStrip,
}

#[derive(Debug, Clone, Default)]
pub struct InputAssemblerStage {
    topology: PrimitiveTopology,
    vertices: Vec<VertexRecord>,
    indices: Option<Vec<u32>>,
}

impl InputAssemblerStage {
    pub fn set_topology(&mut self, topology: PrimitiveTopology) {
        self.topology = topology;
    }

    pub fn set_vertex_buffer(&mut self, vertices: Vec<VertexRecord>) {
        self.vertices = vertices;
    }

    pub fn set_index_buffer(&mut self, indices: Option<Vec<u32>>) {
        self.indices = indices;
    }

    /// Emit vertex records three per triangle, in primitive order.
    /// Incomplete trailing triangles are dropped.
    pub fn run(&self, outputs: &mut Vec<VertexRecord>) -> Result<()> {
        let indices: Vec<u32> = match &self.indices {
            Some(indices) => indices.clone(),
            None => (0..self.vertices.len() as u32).collect(),
        };

        if let Some(&index) = indices.iter().find(|&&i| i as usize >= self.vertices.len()) {
            return Err(RasterError::IndexOutOfRange { index, len: self.vertices.len() });
        }

        let triangles = expand_topology(&indices, self.topology);
        outputs.extend(
            triangles
                .iter()
                .flatten()
                .map(|&i| self.vertices[i as usize].clone()),
        );
        Ok(())
    }
}

/// Index triples for a topology
pub fn expand_topology(indices: &[u32], topology: PrimitiveTopology) -> Vec<[u32; 3]> {
    match topology {
        PrimitiveTopology::TriangleList => indices
            .chunks_exact(3)
            .map(|c| [c[0], c[1], c[2]])
            .collect(),
        PrimitiveTopology::TriangleStrip => {
            if indices.len() < 3 {
                return Vec::new();
            }
            (0..indices.len() - 2)
                .map(|i| {
                    if i % 2 == 0 {
                        [indices[i], indices[i + 1], indices[i + 2]]
                    } else {
                        // swap winding
                        [indices[i], indices[i + 2], indices[i + 1]]
                    }
                })
                .collect()
        }
    }
}
