//! # Graphics Module
//!
//! Scene-graph renderer core. Everything here is independent of a graphics
//! API: drawing a scene produces [`backend::DrawCall`]s on a
//! [`backend::RenderBackend`], which owns shaders, buffers and the window.
//!
//! ## Architecture Overview
//!
//! - **Scene graph** ([`scene`]) - transform/uniform nodes and the [`scene::Drawable`] trait
//! - **Meshes** ([`object`], [`geometry`], [`loader`]) - vertex buffers from code or OBJ files
//! - **Materials and textures** ([`material`], [`texture`]) - Phong uniforms and sampler bindings
//! - **Camera** ([`camera`]) - orbit camera producing view and projection matrices

pub mod backend;
pub mod camera;
pub mod geometry;
pub mod loader;
pub mod material;
pub mod object;
pub mod scene;
pub mod texture;
pub mod transform;
pub mod uniforms;

// Re-export commonly used types
pub use backend::{LogBackend, RecordingBackend, RenderBackend};
pub use camera::OrbitCamera;
pub use object::Mesh;
pub use scene::{Drawable, Node};
pub use uniforms::Uniforms;
