//! Scene assembly for the volcano viewer.
//!
//! [`Viewer`] owns the root of the scene graph and the camera; every frame it
//! hands the graph the camera matrices as `view` and `projection` uniforms.
//! [`TerrainScene`] turns a loaded terrain asset into drawables centred on the
//! origin and places other objects on its surface.

use std::path::Path;
use std::rc::Rc;

use cgmath::Matrix4;
use log::{info, warn};

use crate::error::{CalderaError, Result};
use crate::gfx::backend::RenderBackend;
use crate::gfx::camera::OrbitCamera;
use crate::gfx::geometry::generate_plane;
use crate::gfx::loader::DIFFUSE_MAP;
use crate::gfx::object::Mesh;
use crate::gfx::scene::{Child, Drawable, Node};
use crate::gfx::texture::{TextureFilter, Textured, WrapMode};
use crate::gfx::transform::{identity, translate};
use crate::gfx::uniforms::{UniformValue, Uniforms};
use crate::terrain::{HeightGrid, TerrainAsset};

/// Default light direction shared by every Phong mesh
pub const LIGHT_DIR: [f32; 3] = [0.0, -1.0, 0.0];

/// World units per repeat of the ground texture
const GROUND_UV_TILE: f32 = 8.0;

/// Colour of the lava surface
const LAVA_COLOR: [f32; 3] = [1.0, 0.27, 0.0];

pub struct Viewer {
    pub root: Node,
    pub camera: OrbitCamera,
}

impl Viewer {
    pub fn new(camera: OrbitCamera) -> Self {
        let root = Node::new().named("scene").with_uniform("light_dir", LIGHT_DIR);
        Self { root, camera }
    }

    /// Appends top-level children, drawn in insertion order
    pub fn add<I, C>(&mut self, children: I)
    where
        I: IntoIterator<Item = C>,
        C: Into<Child>,
    {
        self.root.add(children);
    }

    /// Uniforms every draw of the current frame inherits
    pub fn frame_uniforms(&self) -> Uniforms {
        Uniforms::new()
            .with("view", self.camera.view_matrix())
            .with("projection", self.camera.projection_matrix())
    }

    /// Draws the whole scene once
    pub fn render(&self, backend: &mut dyn RenderBackend) {
        self.root.draw(backend, &identity(), &self.frame_uniforms());
    }
}

/// Terrain drawables plus what is needed to put objects on the surface.
///
/// The grid is shifted so its middle cell sits at the origin, half a unit
/// below `y = 0`.
pub struct TerrainScene {
    grid: HeightGrid,
    shift_x: i64,
    shift_z: i64,
    height_at_center: f32,
    ground: Rc<dyn Drawable>,
    lava: Option<Rc<dyn Drawable>>,
}

impl TerrainScene {
    /// Builds the ground mesh, textured with `tex_file` when given, and the
    /// lava surface if the asset has one
    pub fn from_asset(asset: &TerrainAsset, tex_file: Option<&Path>) -> Result<Self> {
        let grid = asset.ground_grid.clone();
        let (width, depth) = grid.shape();
        if width < 2 || depth < 2 {
            return Err(CalderaError::GridTooSmall { width, depth });
        }
        let (shift_x, shift_z) = (width / 2, depth / 2);
        let height_at_center = grid.get(shift_x, shift_z) + 0.5;

        let ground = Mesh::from_terrain("terrain", &asset.ground_vertices, &asset.ground_normals)?
            .with_planar_uv(GROUND_UV_TILE);
        let ground: Rc<dyn Drawable> = match tex_file {
            Some(tex) => Rc::new(Textured::new(ground).with_texture_file(
                DIFFUSE_MAP,
                tex,
                WrapMode::Repeat,
                TextureFilter::MIPMAPPED,
            )),
            None => Rc::new(ground),
        };

        let lava = if asset.lava_vertices.is_empty() {
            None
        } else {
            let lava = Mesh::from_terrain("lava", &asset.lava_vertices, &asset.lava_normals)?
                .with_uniform("k_d", LAVA_COLOR)
                .with_uniform("k_a", LAVA_COLOR);
            Some(Rc::new(lava) as Rc<dyn Drawable>)
        };

        info!(
            "Terrain scene {width}x{depth}, centre height {:.2}",
            height_at_center
        );
        Ok(Self {
            grid,
            shift_x: shift_x as i64,
            shift_z: shift_z as i64,
            height_at_center,
            ground,
            lava,
        })
    }

    /// Transform moving the terrain's centre cell to the origin
    pub fn centering(&self) -> Matrix4<f32> {
        translate(
            -self.shift_x as f32,
            -self.height_at_center,
            -self.shift_z as f32,
        )
    }

    /// Node drawing ground then lava, centred
    pub fn node(&self) -> Node {
        let mut node =
            Node::with_children([self.ground.clone()], self.centering()).named("terrain");
        if let Some(lava) = &self.lava {
            node.add_drawable(lava.clone());
        }
        node
    }

    /// Inclusive `(x_min, x_max, z_min, z_max)` of valid placement coordinates
    pub fn bounds(&self) -> (i64, i64, i64, i64) {
        let (width, depth) = self.grid.shape();
        (
            -self.shift_x,
            width as i64 - 1 - self.shift_x,
            -self.shift_z,
            depth as i64 - 1 - self.shift_z,
        )
    }

    /// Surface height at scene coordinates `(x, z)`, clamped into bounds
    pub fn height_at(&self, x: i64, z: i64) -> f32 {
        let (x, z) = self.clamp(x, z);
        let gx = (x + self.shift_x) as usize;
        let gz = (z + self.shift_z) as usize;
        self.grid.get(gx, gz) - self.height_at_center
    }

    fn clamp(&self, x: i64, z: i64) -> (i64, i64) {
        let (x_min, x_max, z_min, z_max) = self.bounds();
        (x.clamp(x_min, x_max), z.clamp(z_min, z_max))
    }

    /// Puts `node` on the surface at scene coordinates `coords`.
    ///
    /// Coordinates are truncated to the grid; out-of-bounds ones are clamped
    /// with a warning. Returns the coordinates actually used.
    pub fn place(&self, node: &mut Node, coords: (f32, f32)) -> (i64, i64) {
        let (x, z) = (coords.0 as i64, coords.1 as i64);
        let (cx, cz) = self.clamp(x, z);
        if (cx, cz) != (x, z) {
            warn!("Placing object: coords ({x}, {z}) out of bounds, clamping to ({cx}, {cz})");
        }
        node.transform = translate(cx as f32, self.height_at(cx, cz), cz as f32);
        (cx, cz)
    }

    /// Height below which a fraction `q` of the terrain lies, in scene space
    pub fn quantile(&self, q: f32) -> f32 {
        self.grid.quantile(q) - self.height_at_center
    }

    /// Water surface: a quarter of the terrain lies below it
    pub fn water_level(&self) -> f32 {
        self.quantile(0.25)
    }

    /// Highest five percent of the terrain
    pub fn lava_level(&self) -> f32 {
        self.quantile(0.95)
    }

    pub fn grid(&self) -> &HeightGrid {
        &self.grid
    }
}

/// Flat grass ground of side `size` centred on the origin, just below `y = 0`.
///
/// Stands in for the terrain when no terrain archive is available.
pub fn grass_plane(size: f32, tex_file: Option<&Path>) -> Node {
    let geometry = generate_plane(size, size, 1, size / GROUND_UV_TILE);
    let plane = Mesh::from_geometry("grass", &geometry);
    let plane: Rc<dyn Drawable> = match tex_file {
        Some(tex) => Rc::new(Textured::new(plane).with_texture_file(
            DIFFUSE_MAP,
            tex,
            WrapMode::Repeat,
            TextureFilter::MIPMAPPED,
        )),
        None => Rc::new(plane),
    };
    Node::leaf(plane, translate(0.0, -0.5, 0.0)).named("grass")
}

/// Reads a matrix uniform, if present
pub fn matrix_uniform(uniforms: &Uniforms, name: &str) -> Option<Matrix4<f32>> {
    match uniforms.get(name) {
        Some(UniformValue::Mat4(m)) => Some(*m),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gfx::backend::RecordingBackend;
    use crate::terrain::mesh::{lava_mesh, to_mesh};
    use cgmath::Vector3;

    /// 5x5 ramp rising along x, with lava in one cell
    fn asset() -> TerrainAsset {
        let heights = (0..25).map(|i| (i / 5) as f32).collect();
        let grid = HeightGrid::from_data(heights, 5, 5).unwrap();
        let ground = to_mesh(&grid);
        let lava = lava_mesh(&[(1, 1)], 0.5);
        TerrainAsset {
            ground_vertices: ground.vertices,
            ground_normals: ground.normals,
            ground_grid: grid,
            lava_vertices: lava.vertices,
            lava_normals: lava.normals,
        }
    }

    #[test]
    fn test_terrain_is_centred() {
        let scene = TerrainScene::from_asset(&asset(), None).unwrap();
        // centre cell (2, 2) has height 2
        assert_eq!(scene.centering(), translate(-2.0, -2.5, -2.0));
        assert_eq!(scene.bounds(), (-2, 2, -2, 2));

        let mut backend = RecordingBackend::new();
        scene.node().draw(&mut backend, &identity(), &Uniforms::new());
        assert_eq!(backend.labels(), vec!["terrain", "lava"]);
        assert_eq!(backend.draws[1].uniforms.get("k_d"), Some(&UniformValue::Vec3(LAVA_COLOR)));
    }

    #[test]
    fn test_place_on_surface() {
        let scene = TerrainScene::from_asset(&asset(), None).unwrap();
        let mut node = Node::new();
        assert_eq!(scene.place(&mut node, (1.0, -1.0)), (1, -1));
        // grid x = 3 has height 3, minus the centre height 2.5
        assert_eq!(node.transform, translate(1.0, 0.5, -1.0));
    }

    #[test]
    fn test_place_clamps_out_of_bounds() {
        let scene = TerrainScene::from_asset(&asset(), None).unwrap();
        let mut node = Node::new();
        assert_eq!(scene.place(&mut node, (40.0, -9.0)), (2, -2));
        assert_eq!(node.transform, translate(2.0, 1.5, -2.0));
    }

    #[test]
    fn test_levels_from_quantiles() {
        let scene = TerrainScene::from_asset(&asset(), None).unwrap();
        assert!((scene.water_level() - (1.0 - 2.5)).abs() < 1e-6);
        assert!(scene.lava_level() > scene.water_level());
        assert_eq!(scene.quantile(1.0), 4.0 - 2.5);
    }

    #[test]
    fn test_grass_plane_sits_below_origin() {
        let mut backend = RecordingBackend::new();
        grass_plane(16.0, None).draw(&mut backend, &identity(), &Uniforms::new());

        let draw = &backend.draws[0];
        assert_eq!(draw.label, "grass");
        assert_eq!(draw.element_count, 6);
        assert_eq!(draw.transform, translate(0.0, -0.5, 0.0));
    }

    #[test]
    fn test_empty_grid_is_an_error() {
        let asset = TerrainAsset {
            ground_vertices: Vec::new(),
            ground_normals: Vec::new(),
            ground_grid: HeightGrid::new(0, 0),
            lava_vertices: Vec::new(),
            lava_normals: Vec::new(),
        };
        assert!(matches!(
            TerrainScene::from_asset(&asset, None),
            Err(CalderaError::GridTooSmall { width: 0, depth: 0 })
        ));
    }

    #[test]
    fn test_render_provides_camera_uniforms() {
        let camera = OrbitCamera::new(50.0, 0.4, 0.2, Vector3::new(0.0, 0.0, 0.0), 16.0 / 9.0);
        let mut viewer = Viewer::new(camera);
        let scene = TerrainScene::from_asset(&asset(), None).unwrap();
        viewer.add([scene.node()]);

        let mut backend = RecordingBackend::new();
        viewer.render(&mut backend);

        let draw = &backend.draws[0];
        assert_eq!(matrix_uniform(&draw.uniforms, "view"), Some(camera.view_matrix()));
        assert_eq!(
            matrix_uniform(&draw.uniforms, "projection"),
            Some(camera.projection_matrix())
        );
        assert_eq!(draw.uniforms.get("light_dir"), Some(&UniformValue::Vec3(LIGHT_DIR)));
        assert_eq!(draw.transform, scene.centering());
    }
}
