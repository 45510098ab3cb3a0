//! # Vertex Data Structures
//!
//! GPU-compatible vertex format shared by every mesh in the scene.

/// A 3D vertex with position, normal and texture coordinates.
///
/// # Memory Layout
///
/// The `#[repr(C)]` attribute ensures the struct has a C-compatible memory
/// layout, so a `&[Vertex3D]` can be handed to the rendering backend as raw
/// bytes with [`bytemuck::cast_slice`].
///
/// # Examples
///
/// ```
/// use caldera::gfx::scene::vertex::Vertex3D;
///
/// let vertex = Vertex3D {
///     position: [0.0, 1.0, 0.0],
///     normal: [0.0, 1.0, 0.0],
///     tex_coords: [0.0, 0.0],
/// };
/// assert_eq!(bytemuck::bytes_of(&vertex).len(), Vertex3D::STRIDE);
/// ```
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct Vertex3D {
    /// 3D position coordinates [x, y, z]
    pub position: [f32; 3],
    /// 3D normal vector [nx, ny, nz] for lighting calculations
    pub normal: [f32; 3],
    /// Texture coordinates [u, v]
    pub tex_coords: [f32; 2],
}

impl Vertex3D {
    /// Size of one vertex in bytes
    pub const STRIDE: usize = std::mem::size_of::<Vertex3D>();

    pub fn new(position: [f32; 3], normal: [f32; 3]) -> Self {
        Self {
            position,
            normal,
            tex_coords: [0.0, 0.0],
        }
    }

    /// Planar texture coordinates from the x/z position, one texture repeat
    /// every `tile` world units
    pub fn with_planar_uv(mut self, tile: f32) -> Self {
        self.tex_coords = [self.position[0] / tile, self.position[2] / tile];
        self
    }
}
