//! Matrix helpers for building scene transforms.
//!
//! All matrices are column-major `cgmath` matrices applied to column vectors,
//! so `a * b` applies `b` first.

use cgmath::{
    perspective as cg_perspective, Deg, InnerSpace, Matrix4, Point3, SquareMatrix, Vector3,
};

pub fn identity() -> Matrix4<f32> {
    Matrix4::identity()
}

pub fn translate(x: f32, y: f32, z: f32) -> Matrix4<f32> {
    Matrix4::from_translation(Vector3::new(x, y, z))
}

pub fn scale(x: f32, y: f32, z: f32) -> Matrix4<f32> {
    Matrix4::from_nonuniform_scale(x, y, z)
}

pub fn scale_uniform(s: f32) -> Matrix4<f32> {
    Matrix4::from_scale(s)
}

/// Rotation of `angle` around `axis`, which need not be normalized
pub fn rotate(axis: Vector3<f32>, angle: Deg<f32>) -> Matrix4<f32> {
    Matrix4::from_axis_angle(axis.normalize(), angle)
}

/// Right-handed view matrix
pub fn look_at(eye: Point3<f32>, target: Point3<f32>, up: Vector3<f32>) -> Matrix4<f32> {
    Matrix4::look_at_rh(eye, target, up)
}

/// OpenGL-style perspective projection
pub fn perspective(fovy: Deg<f32>, aspect: f32, near: f32, far: f32) -> Matrix4<f32> {
    cg_perspective(fovy, aspect, near, far)
}

/// `view` with its translation removed, for geometry that follows the camera
pub fn strip_translation(view: &Matrix4<f32>) -> Matrix4<f32> {
    let mut m = *view;
    m.w.x = 0.0;
    m.w.y = 0.0;
    m.w.z = 0.0;
    m
}

#[cfg(test)]
mod tests {
    use super::*;
    use cgmath::{Transform, Vector4};

    #[test]
    fn test_composition_applies_right_first() {
        let m = translate(1.0, 0.0, 0.0) * scale_uniform(2.0);
        let p = m.transform_point(Point3::new(1.0, 1.0, 1.0));
        assert_eq!(p, Point3::new(3.0, 2.0, 2.0));
    }

    #[test]
    fn test_rotate_about_z() {
        let m = rotate(Vector3::new(0.0, 0.0, 2.0), Deg(90.0));
        let v = m * Vector4::new(1.0, 0.0, 0.0, 0.0);
        assert!((v.y - 1.0).abs() < 1e-6);
        assert!(v.x.abs() < 1e-6);
    }

    #[test]
    fn test_strip_translation() {
        let view = look_at(
            Point3::new(3.0, 4.0, 5.0),
            Point3::new(0.0, 0.0, 0.0),
            Vector3::unit_y(),
        );
        let stripped = strip_translation(&view);
        assert_eq!(stripped.w, Vector4::new(0.0, 0.0, 0.0, 1.0));
        assert_eq!(stripped.x, view.x);
    }

    #[test]
    fn test_perspective_maps_near_plane() {
        let p = perspective(Deg(90.0), 1.0, 1.0, 100.0);
        let clip = p * Vector4::new(0.0, 0.0, -1.0, 1.0);
        assert!((clip.z / clip.w + 1.0).abs() < 1e-5);
    }
}
