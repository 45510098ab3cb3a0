//! # Primitive Shape Generation
//!
//! Indexed shapes come with normals and texture coordinates. The skybox cube
//! and the axis gizmo are plain unrolled vertex lists.

use super::GeometryData;
use std::f32::consts::PI;

/// Cube from -1 to 1 on every axis as 36 unrolled vertices, faces wound to be
/// seen from the inside
#[rustfmt::skip]
pub const SKYBOX_CUBE: [[f32; 3]; 36] = [
    [-1.0,  1.0, -1.0], [-1.0, -1.0, -1.0], [ 1.0, -1.0, -1.0],
    [ 1.0, -1.0, -1.0], [ 1.0,  1.0, -1.0], [-1.0,  1.0, -1.0],

    [-1.0, -1.0,  1.0], [-1.0, -1.0, -1.0], [-1.0,  1.0, -1.0],
    [-1.0,  1.0, -1.0], [-1.0,  1.0,  1.0], [-1.0, -1.0,  1.0],

    [ 1.0, -1.0, -1.0], [ 1.0, -1.0,  1.0], [ 1.0,  1.0,  1.0],
    [ 1.0,  1.0,  1.0], [ 1.0,  1.0, -1.0], [ 1.0, -1.0, -1.0],

    [-1.0, -1.0,  1.0], [-1.0,  1.0,  1.0], [ 1.0,  1.0,  1.0],
    [ 1.0,  1.0,  1.0], [ 1.0, -1.0,  1.0], [-1.0, -1.0,  1.0],

    [-1.0,  1.0, -1.0], [ 1.0,  1.0, -1.0], [ 1.0,  1.0,  1.0],
    [ 1.0,  1.0,  1.0], [-1.0,  1.0,  1.0], [-1.0,  1.0, -1.0],

    [-1.0, -1.0, -1.0], [-1.0, -1.0,  1.0], [ 1.0, -1.0, -1.0],
    [ 1.0, -1.0, -1.0], [-1.0, -1.0,  1.0], [ 1.0, -1.0,  1.0],
];

/// Three unit line segments from the origin along x, y and z
pub const AXIS_POSITIONS: [[f32; 3]; 6] = [
    [0.0, 0.0, 0.0],
    [1.0, 0.0, 0.0],
    [0.0, 0.0, 0.0],
    [0.0, 1.0, 0.0],
    [0.0, 0.0, 0.0],
    [0.0, 0.0, 1.0],
];

/// Red, green and blue for the x, y and z segments
pub const AXIS_COLORS: [[f32; 3]; 6] = [
    [1.0, 0.0, 0.0],
    [1.0, 0.0, 0.0],
    [0.0, 1.0, 0.0],
    [0.0, 1.0, 0.0],
    [0.0, 0.0, 1.0],
    [0.0, 0.0, 1.0],
];

/// UV sphere of radius 1 centered at the origin
///
/// # Arguments
/// * `longitude_segments` - Segments around the y axis, at least 3
/// * `latitude_segments` - Segments from pole to pole, at least 2
pub fn generate_sphere(longitude_segments: u32, latitude_segments: u32) -> GeometryData {
    let mut data = GeometryData::new();
    let long_segs = longitude_segments.max(3);
    let lat_segs = latitude_segments.max(2);

    for lat in 0..=lat_segs {
        let theta = lat as f32 * PI / lat_segs as f32;
        for long in 0..=long_segs {
            let phi = long as f32 * 2.0 * PI / long_segs as f32;
            let p = [theta.sin() * phi.cos(), theta.cos(), theta.sin() * phi.sin()];
            data.vertices.push(p);
            data.normals.push(p);
            data.tex_coords.push([
                long as f32 / long_segs as f32,
                lat as f32 / lat_segs as f32,
            ]);
        }
    }

    for lat in 0..lat_segs {
        for long in 0..long_segs {
            let first = lat * (long_segs + 1) + long;
            let below = first + long_segs + 1;
            data.indices.extend_from_slice(&[first, first + 1, below]);
            data.indices.extend_from_slice(&[below, first + 1, below + 1]);
        }
    }

    data
}

/// Flat plane in the XZ plane, centered at the origin, facing +y
///
/// Texture coordinates run from 0 to `uv_repeat` across the plane.
pub fn generate_plane(width: f32, depth: f32, segments: u32, uv_repeat: f32) -> GeometryData {
    let mut data = GeometryData::new();
    let segs = segments.max(1);

    for row in 0..=segs {
        let v = row as f32 / segs as f32;
        for col in 0..=segs {
            let u = col as f32 / segs as f32;
            data.vertices.push([(u - 0.5) * width, 0.0, (v - 0.5) * depth]);
            data.normals.push([0.0, 1.0, 0.0]);
            data.tex_coords.push([u * uv_repeat, v * uv_repeat]);
        }
    }

    for row in 0..segs {
        for col in 0..segs {
            let i = row * (segs + 1) + col;
            let next_row = i + segs + 1;
            data.indices.extend_from_slice(&[i, next_row, i + 1]);
            data.indices.extend_from_slice(&[next_row, next_row + 1, i + 1]);
        }
    }

    data
}

/// Closed cylinder around the y axis from `y = 0` to `y = height`.
///
/// Scaling by `(w, l, w)` gives a branch of width `w` and length `l` growing
/// from its parent's joint.
pub fn generate_cylinder(radius: f32, height: f32, segments: u32) -> GeometryData {
    let mut data = GeometryData::new();
    let segs = segments.max(3);

    for i in 0..=segs {
        let angle = i as f32 * 2.0 * PI / segs as f32;
        let (sin_a, cos_a) = angle.sin_cos();
        let (x, z) = (radius * cos_a, radius * sin_a);
        let u = i as f32 / segs as f32;

        data.vertices.push([x, 0.0, z]);
        data.normals.push([cos_a, 0.0, sin_a]);
        data.tex_coords.push([u, 0.0]);

        data.vertices.push([x, height, z]);
        data.normals.push([cos_a, 0.0, sin_a]);
        data.tex_coords.push([u, 1.0]);
    }

    for i in 0..segs {
        let bottom = i * 2;
        let top = bottom + 1;
        let bottom_next = bottom + 2;
        let top_next = bottom + 3;
        data.indices.extend_from_slice(&[bottom, top, bottom_next]);
        data.indices.extend_from_slice(&[top, top_next, bottom_next]);
    }

    // caps get their own rim vertices so their normals stay axial
    for (y, normal_y) in [(0.0, -1.0), (height, 1.0)] {
        let center = data.vertices.len() as u32;
        data.vertices.push([0.0, y, 0.0]);
        data.normals.push([0.0, normal_y, 0.0]);
        data.tex_coords.push([0.5, 0.5]);

        for i in 0..=segs {
            let angle = i as f32 * 2.0 * PI / segs as f32;
            let (sin_a, cos_a) = angle.sin_cos();
            data.vertices.push([radius * cos_a, y, radius * sin_a]);
            data.normals.push([0.0, normal_y, 0.0]);
            data.tex_coords.push([0.5 + 0.5 * cos_a, 0.5 + 0.5 * sin_a]);
        }

        for i in 0..segs {
            let current = center + 1 + i;
            let next = current + 1;
            if normal_y > 0.0 {
                data.indices.extend_from_slice(&[center, next, current]);
            } else {
                data.indices.extend_from_slice(&[center, current, next]);
            }
        }
    }

    data
}
