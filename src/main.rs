//! Headless volcano viewer.
//!
//! Assembles the full scene (terrain, skybox, models, cacti, robot arm and
//! smoke) and renders a few frames through [`LogBackend`], reporting the
//! per-frame statistics. Any extra command-line arguments are OBJ files
//! added to the scene.

use std::path::Path;
use std::rc::Rc;

use anyhow::{Context, Result};
use cgmath::{Vector3, Zero};
use env_logger::Env;
use log::{info, warn};

use caldera::gfx::camera::OrbitCamera;
use caldera::gfx::geometry::generate_cylinder;
use caldera::gfx::loader;
use caldera::gfx::scene::{Drawable, Node};
use caldera::gfx::transform::{identity, scale_uniform};
use caldera::gfx::{LogBackend, Mesh, Uniforms};
use caldera::models::{
    axis, ArmDimensions, BranchTree, CactusBuilder, CactusParts, RobotArm, Skybox, Smoke,
};
use caldera::terrain::TerrainAsset;
use caldera::viewer::{grass_plane, TerrainScene, Viewer, LIGHT_DIR};

const TERRAIN_FILE: &str = "assets/terrain.bin";
const GRASS_TEXTURE: &str = "assets/grass.png";
const CACTUS_TEXTURE: &str = "assets/cactus.png";
const SKYBOX_DIR: &str = "assets/skybox";
const GRASS_PLANE_SIZE: f32 = 64.0;
const FRAMES: u32 = 3;
const FRAME_TIME: f32 = 1.0 / 60.0;

/// Returns `path` if it names an existing file
fn existing(path: &str) -> Option<&Path> {
    Some(Path::new(path)).filter(|p| p.exists())
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();

    let camera = OrbitCamera::new(150.0, 0.5, 0.8, Vector3::zero(), 16.0 / 9.0);
    let mut viewer = Viewer::new(camera);
    let uniforms = Uniforms::new().with("light_dir", LIGHT_DIR);

    viewer.add(loader::load("assets/bunny.obj", &uniforms));
    for file in std::env::args().skip(1) {
        viewer.add(loader::load(&file, &uniforms));
    }

    // red = x = right, green = y = up, blue = z = forward
    viewer.add([Node::leaf(Rc::new(axis()), scale_uniform(5.0))]);

    match Skybox::load(SKYBOX_DIR) {
        Ok(skybox) => viewer.add([Rc::new(skybox) as Rc<dyn Drawable>]),
        Err(e) => warn!("Skipping skybox: {e}"),
    }

    let terrain = TerrainAsset::load_optional(TERRAIN_FILE)
        .with_context(|| format!("reading {TERRAIN_FILE}"))?
        .map(|asset| TerrainScene::from_asset(&asset, existing(GRASS_TEXTURE)))
        .transpose()
        .context("building terrain scene")?;

    let mut smoke = Smoke::new(500, 98);
    let mut vent = Vector3::zero();

    if let Some(terrain) = &terrain {
        viewer.add([terrain.node()]);
        info!(
            "Water level {:.2}, lava level {:.2}",
            terrain.water_level(),
            terrain.lava_level()
        );

        for mesh in loader::load("assets/cube.obj", &uniforms) {
            let mut node = Node::leaf(mesh, identity());
            terrain.place(&mut node, (2.0, 2.0));
            viewer.add([node]);
        }

        let parts = CactusParts::procedural(existing(CACTUS_TEXTURE));
        let mut builder = CactusBuilder::new(parts, 98);
        let trees = [
            BranchTree::new(vec![vec![0.0, 180.0], vec![0.0], vec![90.0]]),
            BranchTree::new(vec![vec![0.0]]),
            BranchTree::new(vec![]),
        ];
        for (i, tree) in trees.iter().enumerate() {
            let mut cactus = builder.cactus(tree, true, 1.4);
            let offset = 6.0 + 4.0 * i as f32;
            terrain.place(&mut cactus, (offset, -offset / 2.0));
            viewer.add([cactus]);
        }

        let cylinder: Rc<dyn Drawable> =
            Rc::new(Mesh::from_geometry("robot", &generate_cylinder(1.0, 1.0, 16)));
        let mut robot = RobotArm::new(cylinder, ArmDimensions::default());
        robot.set_joint(0, 30.0)?;
        robot.set_joint(1, 45.0)?;
        robot.set_joint(2, -60.0)?;
        let mut robot_node = Node::new().named("robot");
        terrain.place(&mut robot_node, (-6.0, 4.0));
        robot_node.add_drawable(Rc::new(robot));
        viewer.add([robot_node]);

        // smoke rises from the highest point of the rim
        let (cx, cz) = terrain.grid().argmax();
        let (x_min, _, z_min, _) = terrain.bounds();
        let (x, z) = (cx as i64 + x_min, cz as i64 + z_min);
        vent = Vector3::new(x as f32, terrain.height_at(x, z), z as f32);
    } else {
        viewer.add([grass_plane(GRASS_PLANE_SIZE, existing(GRASS_TEXTURE))]);
    }

    let mut backend = LogBackend::new();
    for frame in 0..FRAMES {
        smoke.respawn(vent, 20);
        smoke.update(FRAME_TIME);

        viewer.render(&mut backend);
        smoke.draw(&mut backend, &identity(), &viewer.frame_uniforms());

        let stats = backend.finish_frame();
        info!(
            "Frame {frame}: {} draw calls, {} texture binds, {} elements, {} vertex bytes",
            stats.draw_calls, stats.texture_binds, stats.elements, stats.vertex_bytes
        );
    }
    Ok(())
}
