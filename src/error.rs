//! Error types shared by the terrain generator and the scene loaders.

use std::path::PathBuf;

use thiserror::Error;

/// Result alias used throughout the library
pub type Result<T> = std::result::Result<T, CalderaError>;

#[derive(Debug, Error)]
pub enum CalderaError {
    /// Crater parameters that cannot produce a well-defined profile
    #[error("invalid crater parameters: {0}")]
    InvalidCrater(String),

    /// Any other generator knob out of range
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// Generation refused to replace an existing artifact
    #[error("output already exists at {0} (pass overwrite to replace it)")]
    OutputExists(PathBuf),

    #[error("terrain archive is missing array '{0}'")]
    MissingArray(&'static str),

    #[error("array '{name}' has {actual} elements, expected {expected}")]
    ShapeMismatch {
        name: &'static str,
        expected: usize,
        actual: usize,
    },

    #[error("height grid is {width}x{depth}, at least 2x2 is required")]
    GridTooSmall { width: usize, depth: usize },

    #[error("unable to read asset {path}: {source}")]
    Asset {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("terrain archive error: {0}")]
    Archive(#[from] bincode::Error),

    #[error("config parse error: {0}")]
    ConfigParse(#[from] toml::de::Error),

    #[error("OBJ load error: {0}")]
    Obj(#[from] tobj::LoadError),
}
