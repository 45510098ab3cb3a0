//! Terrain archive
//!
//! The generator's output is stored as an archive of named `f32` arrays:
//!
//! | name              | shape          |
//! |-------------------|----------------|
//! | `ground_vertices` | `n × 3`        |
//! | `ground_normals`  | `n × 3`        |
//! | `ground_grid`     | `dim × dim`    |
//! | `lava_vertices`   | `m × 3`        |
//! | `lava_normals`    | `m × 3`        |
//!
//! The viewer loads it at startup. The archive is produced by the
//! `generate_terrain` binary and the viewer copes with it being absent.

use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use log::{info, warn};
use serde::{Deserialize, Serialize};

use super::grid::HeightGrid;
use crate::error::{CalderaError, Result};

pub const GROUND_VERTICES: &str = "ground_vertices";
pub const GROUND_NORMALS: &str = "ground_normals";
pub const GROUND_GRID: &str = "ground_grid";
pub const LAVA_VERTICES: &str = "lava_vertices";
pub const LAVA_NORMALS: &str = "lava_normals";

/// One array of the archive
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct NamedArray {
    shape: Vec<usize>,
    data: Vec<f32>,
}

impl NamedArray {
    fn from_vectors(vectors: &[[f32; 3]]) -> Self {
        Self {
            shape: vec![vectors.len(), 3],
            data: bytemuck::cast_slice(vectors).to_vec(),
        }
    }

    fn from_grid(grid: &HeightGrid) -> Self {
        Self {
            shape: vec![grid.width(), grid.depth()],
            data: grid.heights().to_vec(),
        }
    }

    fn into_vectors(self, name: &'static str) -> Result<Vec<[f32; 3]>> {
        let expected = self.shape.iter().product::<usize>();
        if self.shape.len() != 2 || self.shape[1] != 3 || self.data.len() != expected {
            return Err(CalderaError::ShapeMismatch {
                name,
                expected,
                actual: self.data.len(),
            });
        }
        Ok(bytemuck::cast_slice(self.data.as_slice()).to_vec())
    }

    fn into_grid(self, name: &'static str) -> Result<HeightGrid> {
        let actual = self.data.len();
        match self.shape.as_slice() {
            &[width, depth] if width < 2 || depth < 2 => {
                Err(CalderaError::GridTooSmall { width, depth })
            }
            &[width, depth] => HeightGrid::from_data(self.data, width, depth).ok_or(
                CalderaError::ShapeMismatch {
                    name,
                    expected: width * depth,
                    actual,
                },
            ),
            _ => Err(CalderaError::ShapeMismatch {
                name,
                expected: self.shape.iter().product(),
                actual,
            }),
        }
    }
}

/// Everything the viewer needs from a generated terrain
#[derive(Debug, Clone, PartialEq)]
pub struct TerrainAsset {
    pub ground_vertices: Vec<[f32; 3]>,
    pub ground_normals: Vec<[f32; 3]>,
    /// Raw heights, kept for placing objects on the surface
    pub ground_grid: HeightGrid,
    pub lava_vertices: Vec<[f32; 3]>,
    pub lava_normals: Vec<[f32; 3]>,
}

impl TerrainAsset {
    fn to_archive(&self) -> BTreeMap<String, NamedArray> {
        BTreeMap::from([
            (
                GROUND_VERTICES.to_string(),
                NamedArray::from_vectors(&self.ground_vertices),
            ),
            (
                GROUND_NORMALS.to_string(),
                NamedArray::from_vectors(&self.ground_normals),
            ),
            (GROUND_GRID.to_string(), NamedArray::from_grid(&self.ground_grid)),
            (
                LAVA_VERTICES.to_string(),
                NamedArray::from_vectors(&self.lava_vertices),
            ),
            (
                LAVA_NORMALS.to_string(),
                NamedArray::from_vectors(&self.lava_normals),
            ),
        ])
    }

    fn from_archive(mut archive: BTreeMap<String, NamedArray>) -> Result<Self> {
        let mut take = |name: &'static str| {
            archive
                .remove(name)
                .ok_or(CalderaError::MissingArray(name))
        };
        Ok(Self {
            ground_vertices: take(GROUND_VERTICES)?.into_vectors(GROUND_VERTICES)?,
            ground_normals: take(GROUND_NORMALS)?.into_vectors(GROUND_NORMALS)?,
            ground_grid: take(GROUND_GRID)?.into_grid(GROUND_GRID)?,
            lava_vertices: take(LAVA_VERTICES)?.into_vectors(LAVA_VERTICES)?,
            lava_normals: take(LAVA_NORMALS)?.into_vectors(LAVA_NORMALS)?,
        })
    }

    /// Writes the archive to `path`.
    ///
    /// An existing file is left untouched unless `overwrite` is set.
    pub fn save(&self, path: impl AsRef<Path>, overwrite: bool) -> Result<()> {
        let path = path.as_ref();
        if path.exists() && !overwrite {
            warn!("File already exists ({}), not overwriting", path.display());
            return Err(CalderaError::OutputExists(path.to_path_buf()));
        }
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }

        // Written next to the target and renamed, so a failed write never
        // leaves a truncated archive behind
        let mut partial = path.as_os_str().to_owned();
        partial.push(".partial");
        let partial = PathBuf::from(partial);

        let written = File::create(&partial).map_err(CalderaError::from).and_then(|file| {
            let mut writer = BufWriter::new(file);
            bincode::serialize_into(&mut writer, &self.to_archive())?;
            writer.flush()?;
            Ok(())
        });
        if let Err(e) = written.and_then(|()| Ok(std::fs::rename(&partial, path)?)) {
            let _ = std::fs::remove_file(&partial);
            return Err(e);
        }
        info!("Saved terrain to {}", path.display());
        Ok(())
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|source| CalderaError::Asset {
            path: path.to_path_buf(),
            source,
        })?;
        let archive: BTreeMap<String, NamedArray> =
            bincode::deserialize_from(BufReader::new(file))?;
        let asset = Self::from_archive(archive)?;
        info!(
            "Loaded terrain {}x{} ({} ground vertices, {} lava vertices)",
            asset.ground_grid.width(),
            asset.ground_grid.depth(),
            asset.ground_vertices.len(),
            asset.lava_vertices.len()
        );
        Ok(asset)
    }

    /// Like [`load`](Self::load) but a missing file is `Ok(None)`
    pub fn load_optional(path: impl AsRef<Path>) -> Result<Option<Self>> {
        let path = path.as_ref();
        if !path.exists() {
            warn!(
                "Terrain file {} not found, run generate_terrain first",
                path.display()
            );
            return Ok(None);
        }
        Self::load(path).map(Some)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scratch_path(name: &str) -> PathBuf {
        std::env::temp_dir()
            .join(format!("caldera-asset-{}-{}", std::process::id(), name))
            .join("terrain.bin")
    }

    fn sample_asset() -> TerrainAsset {
        TerrainAsset {
            ground_vertices: vec![[0.0, 1.0, 0.0], [1.0, 2.0, 0.0], [0.0, 3.0, 1.0]],
            ground_normals: vec![[0.0, 1.0, 0.0]; 3],
            ground_grid: HeightGrid::from_data(vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0], 2, 3).unwrap(),
            lava_vertices: vec![[4.0, 0.5, 4.0]],
            lava_normals: vec![[0.0, 1.0, 0.0]],
        }
    }

    #[test]
    fn test_save_then_load() {
        let path = scratch_path("roundtrip");
        let asset = sample_asset();
        asset.save(&path, true).unwrap();

        let loaded = TerrainAsset::load(&path).unwrap();
        assert_eq!(loaded, asset);
        assert_eq!(loaded.ground_grid.get(1, 2), 6.0);

        let _ = std::fs::remove_dir_all(path.parent().unwrap());
    }

    #[test]
    fn test_existing_file_is_preserved() {
        let path = scratch_path("preserve");
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(&path, b"keep me").unwrap();

        let err = sample_asset().save(&path, false).unwrap_err();
        assert!(matches!(err, CalderaError::OutputExists(_)));
        assert_eq!(std::fs::read(&path).unwrap(), b"keep me");

        let _ = std::fs::remove_dir_all(path.parent().unwrap());
    }

    #[test]
    fn test_failed_save_leaves_no_partial_archive() {
        let path = scratch_path("failed");
        // A directory in the way makes the final rename fail
        std::fs::create_dir_all(&path).unwrap();
        let partial = path.with_file_name("terrain.bin.partial");

        assert!(sample_asset().save(&path, true).is_err());
        assert!(path.is_dir());
        assert!(!partial.exists());

        std::fs::remove_dir_all(&path).unwrap();
        sample_asset().save(&path, false).unwrap();
        assert!(!partial.exists());
        assert_eq!(TerrainAsset::load(&path).unwrap(), sample_asset());

        let _ = std::fs::remove_dir_all(path.parent().unwrap());
    }

    #[test]
    fn test_missing_file_is_tolerated() {
        let path = scratch_path("absent");
        assert!(TerrainAsset::load_optional(&path).unwrap().is_none());
        assert!(matches!(
            TerrainAsset::load(&path),
            Err(CalderaError::Asset { .. })
        ));
    }

    #[test]
    fn test_missing_array_reported() {
        let mut archive = sample_asset().to_archive();
        archive.remove(LAVA_NORMALS);
        assert!(matches!(
            TerrainAsset::from_archive(archive),
            Err(CalderaError::MissingArray(LAVA_NORMALS))
        ));
    }

    #[test]
    fn test_degenerate_grid_rejected() {
        for (width, depth) in [(0, 0), (1, 5), (4, 1)] {
            let mut archive = sample_asset().to_archive();
            archive.insert(
                GROUND_GRID.to_string(),
                NamedArray {
                    shape: vec![width, depth],
                    data: vec![0.0; width * depth],
                },
            );
            assert!(matches!(
                TerrainAsset::from_archive(archive),
                Err(CalderaError::GridTooSmall { .. })
            ));
        }
    }

    #[test]
    fn test_bad_vector_shape_reported() {
        let mut archive = sample_asset().to_archive();
        archive.insert(
            GROUND_NORMALS.to_string(),
            NamedArray {
                shape: vec![2, 3],
                data: vec![0.0; 5],
            },
        );
        assert!(matches!(
            TerrainAsset::from_archive(archive),
            Err(CalderaError::ShapeMismatch { .. })
        ));
    }
}
