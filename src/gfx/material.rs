//! Phong materials.
//!
//! Materials are plain uniform sets: `k_a`, `k_d`, `k_s`, `s` and `alpha`.
//! [`MaterialLibrary`] keeps the materials of loaded MTL files by name and
//! falls back to a default for meshes that reference none.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use super::uniforms::Uniforms;

/// Material identifier, the MTL material name
pub type MaterialId = String;

#[derive(Debug, Clone, PartialEq)]
pub struct Material {
    pub name: String,
    pub k_a: [f32; 3],
    pub k_d: [f32; 3],
    pub k_s: [f32; 3],
    /// Specular exponent
    pub shininess: f32,
    pub alpha: f32,
    /// Diffuse texture, resolved against the MTL file's directory
    pub diffuse_map: Option<PathBuf>,
}

impl Default for Material {
    fn default() -> Self {
        Self {
            name: "default".to_string(),
            k_a: [0.0, 0.0, 0.0],
            k_d: [0.7, 0.7, 0.7],
            k_s: [0.2, 0.2, 0.2],
            shininess: 16.0,
            alpha: 1.0,
            diffuse_map: None,
        }
    }
}

impl Material {
    pub fn new(name: &str, k_d: [f32; 3]) -> Self {
        Self {
            name: name.to_string(),
            k_d,
            ..Default::default()
        }
    }

    /// Converts a tobj material; missing MTL entries keep the defaults
    pub fn from_mtl(mtl: &tobj::Material, base_dir: &Path, index: usize) -> Self {
        let defaults = Self::default();
        let name = if mtl.name.is_empty() {
            format!("material_{index}")
        } else {
            mtl.name.clone()
        };

        Self {
            name,
            k_a: mtl.ambient.unwrap_or(defaults.k_a),
            k_d: mtl.diffuse.unwrap_or(defaults.k_d),
            k_s: mtl.specular.unwrap_or(defaults.k_s),
            shininess: mtl.shininess.unwrap_or(defaults.shininess),
            alpha: mtl.dissolve.unwrap_or(defaults.alpha),
            diffuse_map: mtl
                .diffuse_texture
                .as_ref()
                .filter(|t| !t.is_empty())
                .map(|t| base_dir.join(t)),
        }
    }

    /// Uniforms the Phong shader reads
    pub fn to_uniforms(&self) -> Uniforms {
        Uniforms::new()
            .with("k_a", self.k_a)
            .with("k_d", self.k_d)
            .with("k_s", self.k_s)
            .with("s", self.shininess)
            .with("alpha", self.alpha)
    }
}

/// Materials by name with a default fallback
#[derive(Debug, Clone)]
pub struct MaterialLibrary {
    materials: HashMap<MaterialId, Material>,
    default_material: Material,
}

impl Default for MaterialLibrary {
    fn default() -> Self {
        Self::new()
    }
}

impl MaterialLibrary {
    pub fn new() -> Self {
        Self {
            materials: HashMap::new(),
            default_material: Material::default(),
        }
    }

    /// Adds a material, keeping an existing one with the same name
    pub fn add_material(&mut self, material: Material) {
        self.materials.entry(material.name.clone()).or_insert(material);
    }

    pub fn get_material(&self, id: &str) -> Option<&Material> {
        self.materials.get(id)
    }

    pub fn default_material(&self) -> &Material {
        &self.default_material
    }

    /// Material for a mesh, falling back to the default one
    pub fn material_for(&self, id: Option<&str>) -> &Material {
        id.and_then(|id| self.get_material(id))
            .unwrap_or(&self.default_material)
    }

    pub fn len(&self) -> usize {
        self.materials.len()
    }

    pub fn is_empty(&self) -> bool {
        self.materials.is_empty()
    }
}
