//! OBJ/MTL loading into scene drawables.

use std::path::Path;
use std::rc::Rc;

use log::{debug, info, warn};

use crate::error::Result;

use super::material::{Material, MaterialLibrary};
use super::object::Mesh;
use super::scene::{Drawable, Vertex3D};
use super::texture::{TextureFilter, Textured, WrapMode};
use super::uniforms::Uniforms;

/// Sampler name the Phong shader reads diffuse textures from
pub const DIFFUSE_MAP: &str = "diffuse_map";

/// Loads every object of an OBJ file as a drawable.
///
/// Material colours become `k_a`, `k_d`, `k_s`, `s` and `alpha` uniforms;
/// entries of `uniforms` take precedence over them. Meshes whose material has
/// a diffuse texture are wrapped in [`Textured`].
///
/// A file that cannot be loaded is logged and yields no drawables.
pub fn load(path: impl AsRef<Path>, uniforms: &Uniforms) -> Vec<Rc<dyn Drawable>> {
    load_with_texture(path, None, uniforms)
}

/// Like [`load`], with `tex_file` replacing any MTL diffuse texture
pub fn load_with_texture(
    path: impl AsRef<Path>,
    tex_file: Option<&Path>,
    uniforms: &Uniforms,
) -> Vec<Rc<dyn Drawable>> {
    let path = path.as_ref();
    try_load_with_texture(path, tex_file, uniforms).unwrap_or_else(|e| {
        warn!("Unable to load {}: {e}", path.display());
        Vec::new()
    })
}

/// Fallible form of [`load_with_texture`]: an unreadable or malformed OBJ
/// file is returned as [`CalderaError::Obj`](crate::error::CalderaError::Obj)
pub fn try_load_with_texture(
    path: impl AsRef<Path>,
    tex_file: Option<&Path>,
    uniforms: &Uniforms,
) -> Result<Vec<Rc<dyn Drawable>>> {
    let path = path.as_ref();
    let (models, materials) = tobj::load_obj(
        path,
        &tobj::LoadOptions {
            triangulate: true,
            single_index: true,
            ..Default::default()
        },
    )?;

    let materials = materials.unwrap_or_else(|e| {
        debug!("No materials for {}: {e}", path.display());
        Vec::new()
    });

    let base_dir = path.parent().unwrap_or(Path::new("."));
    let mut library = MaterialLibrary::new();
    let material_ids: Vec<String> = materials
        .iter()
        .enumerate()
        .map(|(i, mtl)| {
            let material = Material::from_mtl(mtl, base_dir, i);
            let name = material.name.clone();
            library.add_material(material);
            name
        })
        .collect();

    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();

    let drawables: Vec<Rc<dyn Drawable>> = models
        .iter()
        .map(|model| {
            let material = library.material_for(
                model
                    .mesh
                    .material_id
                    .and_then(|id| material_ids.get(id))
                    .map(String::as_str),
            );
            let label = if model.name.is_empty() { &stem } else { &model.name };
            let mut mesh = mesh_from_obj(label, &model.mesh);
            mesh.uniforms = material.to_uniforms().overridden_by(uniforms);

            match tex_file.map(Path::to_path_buf).or_else(|| material.diffuse_map.clone()) {
                Some(texture) => Rc::new(Textured::new(mesh).with_texture_file(
                    DIFFUSE_MAP,
                    texture,
                    WrapMode::Repeat,
                    TextureFilter::MIPMAPPED,
                )) as Rc<dyn Drawable>,
                None => Rc::new(mesh) as Rc<dyn Drawable>,
            }
        })
        .collect();

    info!(
        "Loaded {} meshes and {} materials from {}",
        drawables.len(),
        library.len(),
        path.display()
    );
    Ok(drawables)
}

fn mesh_from_obj(label: &str, mesh: &tobj::Mesh) -> Mesh {
    let normals = if !mesh.normals.is_empty() && mesh.normals.len() == mesh.positions.len() {
        mesh.normals.clone()
    } else {
        Mesh::calculate_face_normals(&mesh.positions, &mesh.indices)
    };
    let has_uv = mesh.texcoords.len() / 2 == mesh.positions.len() / 3;

    let vertices = mesh
        .positions
        .chunks_exact(3)
        .zip(normals.chunks_exact(3))
        .enumerate()
        .map(|(i, (p, n))| Vertex3D {
            position: [p[0], p[1], p[2]],
            normal: [n[0], n[1], n[2]],
            tex_coords: if has_uv {
                [mesh.texcoords[i * 2], mesh.texcoords[i * 2 + 1]]
            } else {
                [0.0, 0.0]
            },
        })
        .collect();

    Mesh::indexed(label, vertices, mesh.indices.clone())
}
