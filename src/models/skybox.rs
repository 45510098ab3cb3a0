use std::path::Path;

use cgmath::{Matrix4, SquareMatrix};

use crate::error::Result;
use crate::gfx::backend::{DepthMode, DrawCall, Primitive, RenderBackend};
use crate::gfx::geometry::SKYBOX_CUBE;
use crate::gfx::scene::{Drawable, Vertex3D};
use crate::gfx::texture::Texture;
use crate::gfx::transform::strip_translation;
use crate::gfx::uniforms::{UniformValue, Uniforms};

/// Sampler the skybox shader reads the cube map from
pub const SKYBOX_SAMPLER: &str = "skybox";

/// Cube-mapped background.
///
/// Drawn around the camera: the model transform is ignored and the `view`
/// uniform loses its translation. Depth testing passes at the far plane
/// without writing, so everything else draws over it.
pub struct Skybox {
    vertices: Vec<Vertex3D>,
    texture: Texture,
}

impl Skybox {
    pub fn new(texture: Texture) -> Self {
        let vertices = SKYBOX_CUBE
            .iter()
            .map(|&p| Vertex3D::new(p, [0.0, 0.0, 0.0]))
            .collect();
        Self { vertices, texture }
    }

    /// Skybox from the six face images in `dir`
    pub fn load(dir: impl AsRef<Path>) -> Result<Self> {
        Texture::cube_map(dir).map(Self::new)
    }

    pub fn texture(&self) -> &Texture {
        &self.texture
    }
}

impl Drawable for Skybox {
    fn draw(
        &self,
        backend: &mut dyn RenderBackend,
        _transform: &Matrix4<f32>,
        uniforms: &Uniforms,
    ) {
        let mut uniforms = uniforms.clone();
        if let Some(&UniformValue::Mat4(view)) = uniforms.get("view") {
            uniforms.set("view", strip_translation(&view));
        }
        uniforms.set(SKYBOX_SAMPLER, UniformValue::Sampler(0));

        backend.bind_texture(0, &self.texture);
        backend.draw(DrawCall {
            label: "skybox",
            transform: Matrix4::identity(),
            uniforms: &uniforms,
            vertices: &self.vertices,
            indices: None,
            primitive: Primitive::Triangles,
            depth: DepthMode::LessEqualNoWrite,
        });
    }
}
