//! # Terrain Generation
//!
//! Offline pipeline that builds the volcano terrain:
//!
//! 1. [`noise::fractal2d`] synthesizes a multi-octave Perlin height field
//! 2. [`crater::carve`] adds a crater with a flat lava hole
//! 3. [`mesh::to_mesh`] and [`mesh::lava_mesh`] unroll the result into
//!    triangles
//! 4. [`asset::TerrainAsset`] stores everything for the viewer
//!
//! ```no_run
//! use caldera::{config::TerrainConfig, terrain};
//!
//! let config = TerrainConfig::default();
//! let generated = terrain::generate(&config)?;
//! generated.to_asset().save(&config.output, config.overwrite)?;
//! # Ok::<(), caldera::error::CalderaError>(())
//! ```

pub mod asset;
pub mod crater;
pub mod grid;
pub mod mesh;
pub mod noise;

use log::info;
use rand::{rngs::StdRng, SeedableRng};

pub use asset::TerrainAsset;
pub use crater::{Crater, CraterSpec};
pub use grid::HeightGrid;
pub use mesh::TerrainMesh;

use crate::config::TerrainConfig;
use crate::error::Result;

/// Output of one pipeline run
#[derive(Debug, Clone)]
pub struct GeneratedTerrain {
    pub grid: HeightGrid,
    pub crater: Crater,
    pub ground: TerrainMesh,
    pub lava: TerrainMesh,
}

impl GeneratedTerrain {
    pub fn to_asset(&self) -> TerrainAsset {
        TerrainAsset {
            ground_vertices: self.ground.vertices.clone(),
            ground_normals: self.ground.normals.clone(),
            ground_grid: self.grid.clone(),
            lava_vertices: self.lava.vertices.clone(),
            lava_normals: self.lava.normals.clone(),
        }
    }
}

/// Runs the full pipeline for `config`.
///
/// The config is validated before any work starts.
pub fn generate(config: &TerrainConfig) -> Result<GeneratedTerrain> {
    config.validate()?;
    let spec = config.crater.spec();
    let mut rng = StdRng::seed_from_u64(config.seed);

    info!(
        "Generating {0}x{0} terrain (seed {1}, {2} octaves)",
        config.dim, config.seed, config.octaves
    );
    let mut grid = noise::fractal2d(
        (config.dim, config.dim),
        config.noise_res,
        config.octaves,
        config.persistence,
        &mut rng,
    );
    grid.scale(config.noise_amplitude);

    let crater = crater::carve(&mut grid, &spec)?;

    info!("Creating mesh...");
    let ground = mesh::to_mesh(&grid);
    let lava = mesh::lava_mesh(&crater.lava_cells, crater.lava_height);
    info!(
        "Terrain mesh: {} ground vertices, {} lava vertices",
        ground.vertex_count(),
        lava.vertex_count()
    );

    Ok(GeneratedTerrain {
        grid,
        crater,
        ground,
        lava,
    })
}
