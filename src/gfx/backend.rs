//! Rendering backend seam
//!
//! The scene graph never talks to a graphics API directly. Traversal hands
//! every leaf a [`RenderBackend`] and the leaf issues [`DrawCall`]s on it:
//! a transform, the merged uniforms and a vertex buffer. Shader compilation,
//! buffer upload and window management stay on the backend side.
//!
//! Two backends ship with the crate: [`RecordingBackend`] keeps every call for
//! inspection, [`LogBackend`] only counts calls and logs them at `trace`.

use std::path::PathBuf;

use cgmath::Matrix4;
use log::trace;

use super::scene::vertex::Vertex3D;
use super::texture::Texture;
use super::uniforms::Uniforms;

/// How the vertex stream is assembled
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Primitive {
    #[default]
    Triangles,
    Lines,
    Points,
}

/// Depth test configuration of a draw
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DepthMode {
    /// Regular depth test with depth writes
    #[default]
    Less,
    /// Pass at equal depth and leave the depth buffer untouched (skybox)
    LessEqualNoWrite,
}

/// One draw issued by a leaf of the scene graph
#[derive(Debug, Clone, Copy)]
pub struct DrawCall<'a> {
    pub label: &'a str,
    /// Model-to-world transform
    pub transform: Matrix4<f32>,
    pub uniforms: &'a Uniforms,
    pub vertices: &'a [Vertex3D],
    /// `None` draws the vertices unindexed
    pub indices: Option<&'a [u32]>,
    pub primitive: Primitive,
    pub depth: DepthMode,
}

impl DrawCall<'_> {
    /// Number of vertices the draw processes
    pub fn element_count(&self) -> usize {
        self.indices.map_or(self.vertices.len(), <[u32]>::len)
    }

    /// Vertex data as uploaded to the GPU
    pub fn vertex_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(self.vertices)
    }
}

/// Sink for draw calls
pub trait RenderBackend {
    /// Binds `texture` to texture unit `unit` for the next draw
    fn bind_texture(&mut self, unit: u32, texture: &Texture);

    fn draw(&mut self, call: DrawCall<'_>);
}

/// Owned copy of a [`DrawCall`]
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedDraw {
    pub label: String,
    pub transform: Matrix4<f32>,
    pub uniforms: Uniforms,
    pub vertex_count: usize,
    pub element_count: usize,
    pub vertex_bytes: usize,
    pub primitive: Primitive,
    pub depth: DepthMode,
    /// Textures bound since the previous draw, by unit
    pub textures: Vec<(u32, PathBuf)>,
}

/// Backend that keeps every draw, in order
#[derive(Debug, Default)]
pub struct RecordingBackend {
    pub draws: Vec<RecordedDraw>,
    pending_textures: Vec<(u32, PathBuf)>,
}

impl RecordingBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn labels(&self) -> Vec<&str> {
        self.draws.iter().map(|d| d.label.as_str()).collect()
    }

    /// Draws whose label matches `label`
    pub fn find<'a>(&'a self, label: &'a str) -> impl Iterator<Item = &'a RecordedDraw> + 'a {
        self.draws.iter().filter(move |d| d.label == label)
    }

    pub fn total_elements(&self) -> usize {
        self.draws.iter().map(|d| d.element_count).sum()
    }

    pub fn clear(&mut self) {
        self.draws.clear();
        self.pending_textures.clear();
    }
}

impl RenderBackend for RecordingBackend {
    fn bind_texture(&mut self, unit: u32, texture: &Texture) {
        let path = texture.paths().first().cloned().unwrap_or_default();
        self.pending_textures.push((unit, path));
    }

    fn draw(&mut self, call: DrawCall<'_>) {
        self.draws.push(RecordedDraw {
            label: call.label.to_string(),
            transform: call.transform,
            uniforms: call.uniforms.clone(),
            vertex_count: call.vertices.len(),
            element_count: call.element_count(),
            vertex_bytes: call.vertex_bytes().len(),
            primitive: call.primitive,
            depth: call.depth,
            textures: std::mem::take(&mut self.pending_textures),
        });
    }
}

/// Per-frame totals reported by [`LogBackend`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FrameStatistics {
    pub draw_calls: u32,
    pub texture_binds: u32,
    pub elements: u64,
    pub vertex_bytes: u64,
}

/// Headless backend: logs each call and tallies statistics
#[derive(Debug, Default)]
pub struct LogBackend {
    stats: FrameStatistics,
}

impl LogBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the totals gathered so far and starts a new frame
    pub fn finish_frame(&mut self) -> FrameStatistics {
        std::mem::take(&mut self.stats)
    }
}

impl RenderBackend for LogBackend {
    fn bind_texture(&mut self, unit: u32, texture: &Texture) {
        trace!("bind texture unit {unit}: {:?}", texture.paths());
        self.stats.texture_binds += 1;
    }

    fn draw(&mut self, call: DrawCall<'_>) {
        trace!(
            "draw '{}' {:?}: {} elements, {} uniforms",
            call.label,
            call.primitive,
            call.element_count(),
            call.uniforms.len()
        );
        self.stats.draw_calls += 1;
        self.stats.elements += call.element_count() as u64;
        self.stats.vertex_bytes += call.vertex_bytes().len() as u64;
    }
}
