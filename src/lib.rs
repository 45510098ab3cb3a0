//! Caldera
//!
//! Volcano scene toolkit: an offline generator for cratered Perlin terrain
//! ([`terrain`]) and an API-independent scene-graph renderer core ([`gfx`])
//! with the models ([`models`]) and scene assembly ([`viewer`]) built on it.

pub mod config;
pub mod error;
pub mod gfx;
pub mod models;
pub mod terrain;
pub mod viewer;

// Re-export main types for convenience
pub use config::TerrainConfig;
pub use error::{CalderaError, Result};
pub use viewer::{TerrainScene, Viewer};
