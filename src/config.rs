//! Terrain generation settings
//!
//! Every knob of the batch generator lives in [`TerrainConfig`]. Defaults
//! reproduce the shipped volcano; a TOML file can override any subset of
//! fields, and the `generate_terrain` binary layers a few command-line flags
//! on top of that.
//!
//! ```toml
//! dim = 200
//! seed = 7
//!
//! [crater]
//! radius = 25.0
//! hole_radius = 8.0
//! ```

use std::path::{Path, PathBuf};

use log::info;
use serde::{Deserialize, Serialize};

use crate::error::{CalderaError, Result};
use crate::terrain::crater::CraterSpec;

/// Settings for one run of the terrain pipeline
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TerrainConfig {
    /// Side length of the square height grid
    pub dim: usize,
    /// Seed for every random draw of the pipeline
    pub seed: u64,
    /// Scale applied to the fractal noise sum
    pub noise_amplitude: f32,
    /// Lattice resolution of the first octave
    pub noise_res: (usize, usize),
    pub octaves: u32,
    pub persistence: f32,
    pub crater: CraterConfig,
    /// Where the terrain archive is written
    pub output: PathBuf,
    /// Replace an existing archive instead of refusing
    pub overwrite: bool,
}

/// Crater section of [`TerrainConfig`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CraterConfig {
    /// Forced crater center; `None` picks the highest point of the noise
    pub center: Option<[usize; 2]>,
    pub radius: f32,
    pub height: f32,
    pub hole_radius: f32,
    /// Carving half-width in multiples of `radius`
    pub window_multiplier: f32,
    /// Width of the annulus outside the hole sampled for the rim height
    pub rim_width: f32,
    /// Distance the lava surface sits below the sampled rim
    pub rim_margin: f32,
}

impl Default for TerrainConfig {
    fn default() -> Self {
        Self {
            dim: 300,
            seed: 98,
            noise_amplitude: 70.0,
            noise_res: (1, 1),
            octaves: 5,
            persistence: 0.3,
            crater: CraterConfig::default(),
            output: PathBuf::from("assets/terrain.bin"),
            overwrite: false,
        }
    }
}

impl Default for CraterConfig {
    fn default() -> Self {
        Self {
            center: None,
            radius: 30.0,
            height: 40.0,
            hole_radius: 10.0,
            window_multiplier: 4.0,
            rim_width: 5.0,
            rim_margin: 0.5,
        }
    }
}

impl CraterConfig {
    /// Converts the serialized section into the carving parameters
    pub fn spec(&self) -> CraterSpec {
        CraterSpec {
            center: self.center.map(|[x, z]| (x, z)),
            radius: self.radius,
            height: self.height,
            hole_radius: self.hole_radius,
            window_multiplier: self.window_multiplier,
            rim_width: self.rim_width,
            rim_margin: self.rim_margin,
        }
    }
}

impl TerrainConfig {
    /// Loads a config file; fields missing from the file keep their defaults
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| CalderaError::Asset {
            path: path.to_path_buf(),
            source,
        })?;
        let config: TerrainConfig = toml::from_str(&text)?;
        info!("Loaded terrain config from {}", path.display());
        Ok(config)
    }

    /// Rejects settings that would make the pipeline produce undefined output.
    ///
    /// Runs before any noise is generated.
    pub fn validate(&self) -> Result<()> {
        if self.dim < 3 {
            return Err(CalderaError::InvalidConfig(format!(
                "grid dimension must be at least 3, got {}",
                self.dim
            )));
        }
        if self.octaves == 0 {
            return Err(CalderaError::InvalidConfig(
                "at least one noise octave is required".into(),
            ));
        }
        if self.noise_res.0 == 0 || self.noise_res.1 == 0 {
            return Err(CalderaError::InvalidConfig(format!(
                "noise resolution must be positive, got {:?}",
                self.noise_res
            )));
        }
        // Each octave doubles the lattice; the last one must still fit the
        // power-of-two working buffer of the noise
        let limit = self.dim.next_power_of_two();
        let finest = 1usize.checked_shl(self.octaves - 1).and_then(|factor| {
            Some((
                self.noise_res.0.checked_mul(factor)?,
                self.noise_res.1.checked_mul(factor)?,
            ))
        });
        match finest {
            Some((rx, rz)) if rx <= limit && rz <= limit => {}
            _ => {
                return Err(CalderaError::InvalidConfig(format!(
                    "{} octaves from resolution {:?} exceed the {limit}-cell noise buffer",
                    self.octaves, self.noise_res
                )))
            }
        }
        if !self.persistence.is_finite() || !self.noise_amplitude.is_finite() {
            return Err(CalderaError::InvalidConfig(
                "persistence and noise amplitude must be finite".into(),
            ));
        }
        if let Some([x, z]) = self.crater.center {
            if x >= self.dim || z >= self.dim {
                return Err(CalderaError::InvalidConfig(format!(
                    "crater center ({x}, {z}) lies outside a {0}x{0} grid",
                    self.dim
                )));
            }
        }
        self.crater.spec().validate()
    }
}
