//! Height grid to triangle soup
//!
//! Each grid cell becomes a quad split into two counter-clockwise triangles:
//!
//! ```text
//! 1---2
//! | / |
//! 3---4
//! ```
//!
//! top-left `1-3-2` and bottom-right `2-3-4`. Geometry is fully unrolled, with
//! no index buffer.

use super::grid::HeightGrid;

/// Parallel position and normal arrays
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TerrainMesh {
    pub vertices: Vec<[f32; 3]>,
    pub normals: Vec<[f32; 3]>,
}

impl TerrainMesh {
    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    pub fn triangle_count(&self) -> usize {
        self.vertices.len() / 3
    }

    fn push_quad(&mut self, corners: [[f32; 3]; 4], normals: [[f32; 3]; 4]) {
        let [v1, v2, v3, v4] = corners;
        let [n1, n2, n3, n4] = normals;
        self.vertices.extend([v1, v3, v2, v2, v3, v4]);
        self.normals.extend([n1, n3, n2, n2, n3, n4]);
    }
}

/// Normalized `(∂h/∂x, 1, ∂h/∂z)` at a grid vertex
fn vertex_normal(grid: &HeightGrid, x: usize, z: usize) -> [f32; 3] {
    let (dx, dz) = grid.gradient(x, z);
    let n = [dx, 1.0, dz];
    let length = (n[0] * n[0] + n[1] * n[1] + n[2] * n[2]).sqrt();
    [n[0] / length, n[1] / length, n[2] / length]
}

/// Triangulates the terrain surface.
///
/// Cells `(x, z)` for `x, z` in `0..dim - 2` are emitted, giving
/// `6 · (dim − 2)²` vertices for a square grid.
pub fn to_mesh(grid: &HeightGrid) -> TerrainMesh {
    let cells_x = grid.width().saturating_sub(2);
    let cells_z = grid.depth().saturating_sub(2);

    let mut mesh = TerrainMesh {
        vertices: Vec::with_capacity(6 * cells_x * cells_z),
        normals: Vec::with_capacity(6 * cells_x * cells_z),
    };

    for x in 0..cells_x {
        for z in 0..cells_z {
            let corner = |cx: usize, cz: usize| [cx as f32, grid.get(cx, cz), cz as f32];
            let corners = [
                corner(x, z),
                corner(x + 1, z),
                corner(x, z + 1),
                corner(x + 1, z + 1),
            ];
            let normals = [
                vertex_normal(grid, x, z),
                vertex_normal(grid, x + 1, z),
                vertex_normal(grid, x, z + 1),
                vertex_normal(grid, x + 1, z + 1),
            ];
            mesh.push_quad(corners, normals);
        }
    }
    mesh
}

/// Flat quads at `lava_height` over every lava cell, normals straight up
pub fn lava_mesh(cells: &[(usize, usize)], lava_height: f32) -> TerrainMesh {
    const UP: [f32; 3] = [0.0, 1.0, 0.0];

    let mut mesh = TerrainMesh {
        vertices: Vec::with_capacity(6 * cells.len()),
        normals: Vec::with_capacity(6 * cells.len()),
    };
    for &(x, z) in cells {
        let (x, z) = (x as f32, z as f32);
        mesh.push_quad(
            [
                [x, lava_height, z],
                [x + 1.0, lava_height, z],
                [x, lava_height, z + 1.0],
                [x + 1.0, lava_height, z + 1.0],
            ],
            [UP; 4],
        );
    }
    mesh
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::terrain::noise::fractal2d;
    use rand::{rngs::StdRng, SeedableRng};

    fn cross(a: [f32; 3], b: [f32; 3]) -> [f32; 3] {
        [
            a[1] * b[2] - a[2] * b[1],
            a[2] * b[0] - a[0] * b[2],
            a[0] * b[1] - a[1] * b[0],
        ]
    }

    fn sub(a: [f32; 3], b: [f32; 3]) -> [f32; 3] {
        [a[0] - b[0], a[1] - b[1], a[2] - b[2]]
    }

    #[test]
    fn test_vertex_count_and_unit_normals() {
        let mut grid = fractal2d((40, 40), (2, 2), 3, 0.5, &mut StdRng::seed_from_u64(1));
        grid.scale(15.0);
        let mesh = to_mesh(&grid);

        assert_eq!(mesh.vertex_count(), 6 * 38 * 38);
        assert_eq!(mesh.normals.len(), mesh.vertices.len());
        for n in &mesh.normals {
            let length = (n[0] * n[0] + n[1] * n[1] + n[2] * n[2]).sqrt();
            assert!((length - 1.0).abs() < 1e-5);
        }
    }

    #[test]
    fn test_flat_grid_faces_up() {
        let mesh = to_mesh(&HeightGrid::new(5, 5));
        // Triangles wind so their face normal points along +y
        for tri in mesh.vertices.chunks(3) {
            let n = cross(sub(tri[1], tri[0]), sub(tri[2], tri[0]));
            assert!(n[1] > 0.0);
        }
        assert!(mesh.normals.iter().all(|n| *n == [0.0, 1.0, 0.0]));
    }

    #[test]
    fn test_quad_corner_order() {
        let grid = HeightGrid::from_data((0..9).map(|i| i as f32).collect(), 3, 3).unwrap();
        let mesh = to_mesh(&grid);

        assert_eq!(
            mesh.vertices,
            vec![
                [0.0, 0.0, 0.0],
                [0.0, 1.0, 1.0],
                [1.0, 3.0, 0.0],
                [1.0, 3.0, 0.0],
                [0.0, 1.0, 1.0],
                [1.0, 4.0, 1.0],
            ]
        );
    }

    #[test]
    fn test_normals_follow_height_gradient() {
        // h = x: unit slope along +x, flat along z
        let grid = HeightGrid::from_data((0..16).map(|i| (i / 4) as f32).collect(), 4, 4).unwrap();
        let mesh = to_mesh(&grid);
        let diagonal = std::f32::consts::FRAC_1_SQRT_2;
        for n in &mesh.normals {
            assert!((n[0] - diagonal).abs() < 1e-6);
            assert!((n[1] - diagonal).abs() < 1e-6);
            assert_eq!(n[2], 0.0);
        }
    }

    #[test]
    fn test_lava_mesh_is_flat() {
        let mesh = lava_mesh(&[(3, 4), (3, 5)], 12.5);
        assert_eq!(mesh.vertex_count(), 12);
        assert!(mesh.vertices.iter().all(|v| v[1] == 12.5));
        assert!(mesh.normals.iter().all(|n| *n == [0.0, 1.0, 0.0]));
        assert_eq!(mesh.vertices[0], [3.0, 12.5, 4.0]);
        assert_eq!(mesh.vertices[5], [4.0, 12.5, 5.0]);
    }
}
