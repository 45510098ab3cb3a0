use crate::gfx::backend::Primitive;
use crate::gfx::geometry::{AXIS_COLORS, AXIS_POSITIONS};
use crate::gfx::object::Mesh;
use crate::gfx::scene::Vertex3D;

/// Debug gizmo: red x, green y and blue z unit segments drawn as lines.
///
/// The colour travels in the normal slot of the vertices; the axis shader
/// reads it from there.
pub fn axis() -> Mesh {
    let vertices = AXIS_POSITIONS
        .iter()
        .zip(AXIS_COLORS)
        .map(|(&position, color)| Vertex3D::new(position, color))
        .collect();
    Mesh::new("axis", vertices).with_primitive(Primitive::Lines)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gfx::backend::RecordingBackend;
    use crate::gfx::scene::Drawable;
    use crate::gfx::transform::scale_uniform;
    use crate::gfx::uniforms::Uniforms;

    #[test]
    fn test_axis_draws_three_lines() {
        let mut backend = RecordingBackend::new();
        axis().draw(&mut backend, &scale_uniform(5.0), &Uniforms::new());

        let draw = &backend.draws[0];
        assert_eq!(draw.primitive, Primitive::Lines);
        assert_eq!(draw.element_count, 6);
        assert_eq!(draw.transform, scale_uniform(5.0));
    }
}
