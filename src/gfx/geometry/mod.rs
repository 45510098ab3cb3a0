//! # Procedural Geometry Generation
//!
//! Primitive shapes used by the scene models, generated in code so the
//! cactus, skybox and debug gizmos do not depend on model files.
//!
//! All shapes are Y-up with counter-clockwise front faces.
//!
//! ```
//! use caldera::gfx::geometry::{generate_cylinder, generate_sphere};
//!
//! let trunk = generate_cylinder(1.0, 1.0, 16);
//! let cap = generate_sphere(16, 8);
//! assert_eq!(trunk.triangle_count(), 4 * 16);
//! assert_eq!(cap.vertex_count(), 17 * 9);
//! ```

pub mod primitives;

pub use primitives::*;

use crate::gfx::scene::Vertex3D;

/// Indexed geometry with per-vertex attributes
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GeometryData {
    pub vertices: Vec<[f32; 3]>,
    pub tex_coords: Vec<[f32; 2]>,
    pub normals: Vec<[f32; 3]>,
    /// Triangle indices, counter-clockwise
    pub indices: Vec<u32>,
}

impl GeometryData {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    /// Interleaved vertex buffer and index buffer for the backend
    pub fn to_vertices(&self) -> (Vec<Vertex3D>, Vec<u32>) {
        let vertices = self
            .vertices
            .iter()
            .enumerate()
            .map(|(i, &position)| Vertex3D {
                position,
                normal: self.normals.get(i).copied().unwrap_or([0.0, 1.0, 0.0]),
                tex_coords: self.tex_coords.get(i).copied().unwrap_or_default(),
            })
            .collect();

        (vertices, self.indices.clone())
    }
}
