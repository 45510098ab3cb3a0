//! Texture handles and the texturing decorator.
//!
//! Image decoding and upload belong to the rendering backend. A [`Texture`]
//! only records where its pixels live and how they are sampled; the file is
//! checked for readability when the handle is created.

use std::fs::File;
use std::path::{Path, PathBuf};

use cgmath::Matrix4;
use log::{info, warn};

use super::backend::RenderBackend;
use super::scene::Drawable;
use super::uniforms::{UniformValue, Uniforms};
use crate::error::{CalderaError, Result};

/// Cube-map face files, in the order the backend uploads them
pub const CUBE_FACES: [&str; 6] = [
    "left.jpg",
    "right.jpg",
    "top.jpg",
    "bottom.jpg",
    "front.jpg",
    "back.jpg",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextureKind {
    TwoD,
    CubeMap,
}

/// Texture coordinate wrapping
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WrapMode {
    #[default]
    Repeat,
    MirroredRepeat,
    ClampToBorder,
    ClampToEdge,
}

impl WrapMode {
    /// Next mode in the interactive toggle cycle
    pub fn next(self) -> Self {
        match self {
            WrapMode::Repeat => WrapMode::MirroredRepeat,
            WrapMode::MirroredRepeat => WrapMode::ClampToBorder,
            WrapMode::ClampToBorder => WrapMode::ClampToEdge,
            WrapMode::ClampToEdge => WrapMode::Repeat,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterMode {
    Nearest,
    Linear,
    LinearMipmapLinear,
}

/// Magnification and minification filters
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TextureFilter {
    pub mag: FilterMode,
    pub min: FilterMode,
}

impl TextureFilter {
    pub const NEAREST: Self = Self::new(FilterMode::Nearest, FilterMode::Nearest);
    pub const LINEAR: Self = Self::new(FilterMode::Linear, FilterMode::Linear);
    pub const MIPMAPPED: Self = Self::new(FilterMode::Linear, FilterMode::LinearMipmapLinear);

    pub const fn new(mag: FilterMode, min: FilterMode) -> Self {
        Self { mag, min }
    }

    /// Cycles nearest -> linear -> mipmapped -> nearest
    pub fn next(self) -> Self {
        if self == Self::NEAREST {
            Self::LINEAR
        } else if self == Self::LINEAR {
            Self::MIPMAPPED
        } else {
            Self::NEAREST
        }
    }
}

impl Default for TextureFilter {
    fn default() -> Self {
        Self::MIPMAPPED
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Texture {
    paths: Vec<PathBuf>,
    pub kind: TextureKind,
    pub wrap: WrapMode,
    pub filter: TextureFilter,
}

impl Texture {
    /// 2D texture from a single image file
    pub fn load(path: impl AsRef<Path>, wrap: WrapMode, filter: TextureFilter) -> Result<Self> {
        let path = path.as_ref();
        check_readable(path)?;
        info!("Loaded texture {} (wrap={wrap:?} filter={filter:?})", path.display());
        Ok(Self {
            paths: vec![path.to_path_buf()],
            kind: TextureKind::TwoD,
            wrap,
            filter,
        })
    }

    /// Cube map from the six [`CUBE_FACES`] files in `dir`
    pub fn cube_map(dir: impl AsRef<Path>) -> Result<Self> {
        let dir = dir.as_ref();
        let paths = CUBE_FACES
            .iter()
            .map(|face| {
                let path = dir.join(face);
                check_readable(&path).map(|_| path)
            })
            .collect::<Result<Vec<_>>>()?;
        info!("Loaded cube map from {}", dir.display());
        Ok(Self {
            paths,
            kind: TextureKind::CubeMap,
            wrap: WrapMode::ClampToEdge,
            filter: TextureFilter::LINEAR,
        })
    }

    /// Source files, one per face for cube maps
    pub fn paths(&self) -> &[PathBuf] {
        &self.paths
    }

    pub fn cycle_wrap(&mut self) {
        self.wrap = self.wrap.next();
    }

    pub fn cycle_filter(&mut self) {
        self.filter = self.filter.next();
    }
}

fn check_readable(path: &Path) -> Result<()> {
    File::open(path).map(drop).map_err(|source| CalderaError::Asset {
        path: path.to_path_buf(),
        source,
    })
}

/// Drawable decorator binding textures before delegating.
///
/// Texture `i` is bound to unit `i` and its sampler uniform is set to `i`.
pub struct Textured<D> {
    pub drawable: D,
    textures: Vec<(String, Texture)>,
}

impl<D: Drawable> Textured<D> {
    pub fn new(drawable: D) -> Self {
        Self {
            drawable,
            textures: Vec::new(),
        }
    }

    /// Builder pattern: bind `texture` to the sampler `name`
    pub fn with_texture(mut self, name: &str, texture: Texture) -> Self {
        self.set_texture(name, texture);
        self
    }

    /// Builder pattern: load `path` for the sampler `name`.
    ///
    /// An unreadable file is logged and skipped; the drawable still renders
    /// untextured.
    pub fn with_texture_file(
        self,
        name: &str,
        path: impl AsRef<Path>,
        wrap: WrapMode,
        filter: TextureFilter,
    ) -> Self {
        match Texture::load(path, wrap, filter) {
            Ok(texture) => self.with_texture(name, texture),
            Err(e) => {
                warn!("Skipping texture '{name}': {e}");
                self
            }
        }
    }

    /// Adds a texture or replaces the one bound to `name`, keeping its unit
    pub fn set_texture(&mut self, name: &str, texture: Texture) {
        match self.textures.iter_mut().find(|(n, _)| n == name) {
            Some(slot) => slot.1 = texture,
            None => self.textures.push((name.to_string(), texture)),
        }
    }

    pub fn texture(&self, name: &str) -> Option<&Texture> {
        self.textures.iter().find(|(n, _)| n == name).map(|(_, t)| t)
    }

    pub fn texture_count(&self) -> usize {
        self.textures.len()
    }

    /// Advances the wrap mode of every texture
    pub fn cycle_wrap(&mut self) {
        self.textures.iter_mut().for_each(|(_, t)| t.cycle_wrap());
    }

    /// Advances the filter mode of every texture
    pub fn cycle_filter(&mut self) {
        self.textures.iter_mut().for_each(|(_, t)| t.cycle_filter());
    }
}

impl<D: Drawable> Drawable for Textured<D> {
    fn draw(
        &self,
        backend: &mut dyn RenderBackend,
        transform: &Matrix4<f32>,
        uniforms: &Uniforms,
    ) {
        if self.textures.is_empty() {
            return self.drawable.draw(backend, transform, uniforms);
        }
        let mut uniforms = uniforms.clone();
        for (unit, (name, texture)) in (0u32..).zip(&self.textures) {
            backend.bind_texture(unit, texture);
            uniforms.set(name, UniformValue::Sampler(unit));
        }
        self.drawable.draw(backend, transform, &uniforms);
    }
}
