use cgmath::{InnerSpace, Matrix4, Vector3};

use super::backend::{DepthMode, DrawCall, Primitive, RenderBackend};
use super::geometry::GeometryData;
use super::scene::{Drawable, Vertex3D};
use super::uniforms::{UniformValue, Uniforms};
use crate::error::{CalderaError, Result};

/// Vertex buffer plus the state needed to draw it
#[derive(Debug, Clone, PartialEq)]
pub struct Mesh {
    pub label: String,
    vertices: Vec<Vertex3D>,
    indices: Option<Vec<u32>>,
    pub primitive: Primitive,
    pub depth: DepthMode,
    /// Uniforms overriding the inherited ones for this mesh only
    pub uniforms: Uniforms,
}

impl Mesh {
    /// Unindexed triangle mesh
    pub fn new(label: &str, vertices: Vec<Vertex3D>) -> Self {
        Self {
            label: label.to_string(),
            vertices,
            indices: None,
            primitive: Primitive::Triangles,
            depth: DepthMode::Less,
            uniforms: Uniforms::new(),
        }
    }

    pub fn indexed(label: &str, vertices: Vec<Vertex3D>, indices: Vec<u32>) -> Self {
        let mut mesh = Self::new(label, vertices);
        mesh.indices = Some(indices);
        mesh
    }

    /// Mesh from flat `x, y, z` position and normal arrays, as OBJ loaders
    /// produce them
    pub fn from_flat(label: &str, positions: &[f32], normals: &[f32], indices: Vec<u32>) -> Self {
        let vertices = positions
            .chunks_exact(3)
            .zip(normals.chunks_exact(3))
            .map(|(p, n)| Vertex3D::new([p[0], p[1], p[2]], [n[0], n[1], n[2]]))
            .collect();
        Self::indexed(label, vertices, indices)
    }

    /// Unrolled triangle soup as stored in a terrain asset
    pub fn from_terrain(label: &str, positions: &[[f32; 3]], normals: &[[f32; 3]]) -> Result<Self> {
        if positions.len() != normals.len() {
            return Err(CalderaError::ShapeMismatch {
                name: "normals",
                expected: positions.len(),
                actual: normals.len(),
            });
        }
        let vertices = positions
            .iter()
            .zip(normals)
            .map(|(&p, &n)| Vertex3D::new(p, n))
            .collect();
        Ok(Self::new(label, vertices))
    }

    pub fn from_geometry(label: &str, geometry: &GeometryData) -> Self {
        let (vertices, indices) = geometry.to_vertices();
        Self::indexed(label, vertices, indices)
    }

    /// Builder pattern: set the primitive mode
    pub fn with_primitive(mut self, primitive: Primitive) -> Self {
        self.primitive = primitive;
        self
    }

    pub fn with_depth(mut self, depth: DepthMode) -> Self {
        self.depth = depth;
        self
    }

    pub fn with_uniform(mut self, name: &str, value: impl Into<UniformValue>) -> Self {
        self.uniforms.set(name, value);
        self
    }

    /// Builder pattern: planar texture coordinates, one repeat every `tile`
    /// units along x and z
    pub fn with_planar_uv(mut self, tile: f32) -> Self {
        for v in &mut self.vertices {
            *v = v.with_planar_uv(tile);
        }
        self
    }

    pub fn vertices(&self) -> &[Vertex3D] {
        &self.vertices
    }

    pub fn indices(&self) -> Option<&[u32]> {
        self.indices.as_deref()
    }

    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    /// Smooth per-vertex normals for meshes that ship without any.
    ///
    /// Each vertex gets the normalized average of the face normals of the
    /// triangles using it; unused vertices keep a zero normal.
    pub fn calculate_face_normals(positions: &[f32], indices: &[u32]) -> Vec<f32> {
        let position = |i: usize| {
            Vector3::new(positions[i * 3], positions[i * 3 + 1], positions[i * 3 + 2])
        };
        let mut sums = vec![Vector3::new(0.0f32, 0.0, 0.0); positions.len() / 3];

        for triangle in indices.chunks_exact(3) {
            let [i0, i1, i2] = [triangle[0], triangle[1], triangle[2]].map(|i| i as usize);
            let (v0, v1, v2) = (position(i0), position(i1), position(i2));
            let face_normal = (v1 - v0).cross(v2 - v0);
            for i in [i0, i1, i2] {
                sums[i] += face_normal;
            }
        }

        sums.into_iter()
            .flat_map(|n| {
                let n = if n.magnitude2() > 0.0 { n.normalize() } else { n };
                [n.x, n.y, n.z]
            })
            .collect()
    }
}

impl Drawable for Mesh {
    fn draw(
        &self,
        backend: &mut dyn RenderBackend,
        transform: &Matrix4<f32>,
        uniforms: &Uniforms,
    ) {
        let uniforms = uniforms.overridden_by(&self.uniforms);
        backend.draw(DrawCall {
            label: &self.label,
            transform: *transform,
            uniforms: &uniforms,
            vertices: &self.vertices,
            indices: self.indices.as_deref(),
            primitive: self.primitive,
            depth: self.depth,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gfx::backend::RecordingBackend;
    use crate::gfx::geometry::generate_plane;
    use cgmath::SquareMatrix;

    #[test]
    fn test_face_normals_of_ccw_triangle_point_up() {
        // counter-clockwise seen from +y
        let positions = [0.0, 0.0, 0.0, 0.0, 0.0, 1.0, 1.0, 0.0, 0.0, 5.0, 5.0, 5.0];
        let normals = Mesh::calculate_face_normals(&positions, &[0, 1, 2]);
        assert_eq!(normals.len(), positions.len());
        assert_eq!(&normals[0..3], &[0.0, 1.0, 0.0]);
        assert_eq!(&normals[6..9], &[0.0, 1.0, 0.0]);
        // unreferenced vertex
        assert_eq!(&normals[9..12], &[0.0, 0.0, 0.0]);
    }

    #[test]
    fn test_from_flat_pairs_attributes() {
        let mesh = Mesh::from_flat(
            "tri",
            &[0.0, 1.0, 2.0, 3.0, 4.0, 5.0],
            &[0.0, 1.0, 0.0, 1.0, 0.0, 0.0],
            vec![0, 1, 0],
        );
        assert_eq!(mesh.vertex_count(), 2);
        assert_eq!(mesh.vertices()[1].position, [3.0, 4.0, 5.0]);
        assert_eq!(mesh.vertices()[1].normal, [1.0, 0.0, 0.0]);
        assert_eq!(mesh.indices(), Some(&[0, 1, 0][..]));
    }

    #[test]
    fn test_from_terrain_checks_lengths() {
        let positions = [[0.0, 0.0, 0.0]; 6];
        assert!(Mesh::from_terrain("ground", &positions, &[[0.0, 1.0, 0.0]; 6]).is_ok());
        assert!(matches!(
            Mesh::from_terrain("ground", &positions, &[[0.0, 1.0, 0.0]; 5]),
            Err(CalderaError::ShapeMismatch { expected: 6, actual: 5, .. })
        ));
    }

    #[test]
    fn test_draw_merges_own_uniforms() {
        let mesh = Mesh::from_geometry("plane", &generate_plane(1.0, 1.0, 1, 1.0))
            .with_uniform("k_d", [0.1, 0.2, 0.3])
            .with_primitive(Primitive::Lines);
        let inherited = Uniforms::new().with("k_d", [1.0, 1.0, 1.0]).with("s", 8.0f32);

        let mut backend = RecordingBackend::new();
        mesh.draw(&mut backend, &Matrix4::identity(), &inherited);

        let draw = &backend.draws[0];
        assert_eq!(draw.label, "plane");
        assert_eq!(draw.primitive, Primitive::Lines);
        assert_eq!(draw.element_count, 6);
        assert_eq!(draw.vertex_bytes, 4 * Vertex3D::STRIDE);
        assert_eq!(draw.uniforms.get("k_d"), Some(&UniformValue::Vec3([0.1, 0.2, 0.3])));
        assert_eq!(draw.uniforms.get("s"), Some(&UniformValue::Float(8.0)));
    }
}
