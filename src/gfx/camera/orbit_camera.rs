use cgmath::*;

use crate::gfx::transform;

/// Camera orbiting a target point, Y up.
///
/// `pitch` and `yaw` are in radians; the eye sits `distance` away from the
/// target along the direction they describe.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OrbitCamera {
    pub distance: f32,
    pub pitch: f32,
    pub yaw: f32,
    pub eye: Vector3<f32>,
    pub target: Vector3<f32>,
    pub up: Vector3<f32>,
    pub bounds: OrbitCameraBounds,
    pub aspect: f32,
    pub fovy: Deg<f32>,
    pub znear: f32,
    pub zfar: f32,
}

impl OrbitCamera {
    pub fn new(distance: f32, pitch: f32, yaw: f32, target: Vector3<f32>, aspect: f32) -> Self {
        let mut camera = Self {
            distance,
            pitch,
            yaw,
            eye: Vector3::zero(), // set by update()
            target,
            up: Vector3::unit_y(),
            bounds: OrbitCameraBounds::default(),
            aspect,
            fovy: Deg(45.0),
            znear: 0.1,
            zfar: 1000.0,
        };
        camera.update();
        camera
    }

    pub fn set_distance(&mut self, distance: f32) {
        self.distance = distance.clamp(
            self.bounds.min_distance.unwrap_or(f32::EPSILON),
            self.bounds.max_distance.unwrap_or(f32::MAX),
        );
        self.update();
    }

    /// Zoom step proportional to the log of the current distance
    pub fn add_distance(&mut self, delta: f32) {
        let corrected_zoom = f32::log10(self.distance.max(1.0 + f32::EPSILON)) * delta;
        self.set_distance(self.distance + corrected_zoom);
    }

    pub fn set_pitch(&mut self, pitch: f32) {
        self.pitch = pitch.clamp(self.bounds.min_pitch, self.bounds.max_pitch);
        self.update();
    }

    pub fn add_pitch(&mut self, delta: f32) {
        self.set_pitch(self.pitch + delta);
    }

    pub fn set_yaw(&mut self, yaw: f32) {
        let mut bounded_yaw = yaw;
        if let Some(min_yaw) = self.bounds.min_yaw {
            bounded_yaw = bounded_yaw.max(min_yaw);
        }
        if let Some(max_yaw) = self.bounds.max_yaw {
            bounded_yaw = bounded_yaw.min(max_yaw);
        }
        self.yaw = bounded_yaw;
        self.update();
    }

    pub fn add_yaw(&mut self, delta: f32) {
        self.set_yaw(self.yaw + delta);
    }

    /// Moves eye and target together in the view plane.
    /// `delta.0` is horizontal, `delta.1` vertical, both scaled by distance.
    pub fn pan(&mut self, delta: (f32, f32)) {
        let forward = (self.target - self.eye).normalize();
        let right = forward.cross(self.up).normalize();
        let up = right.cross(forward).normalize();

        let pan_scale = self.distance * 0.1;
        let movement = right * delta.0 * pan_scale + up * delta.1 * pan_scale;

        self.eye += movement;
        self.target += movement;
    }

    pub fn resize_projection(&mut self, width: u32, height: u32) {
        if height > 0 {
            self.aspect = width as f32 / height as f32;
        }
    }

    pub fn view_matrix(&self) -> Matrix4<f32> {
        transform::look_at(Point3::from_vec(self.eye), Point3::from_vec(self.target), self.up)
    }

    pub fn projection_matrix(&self) -> Matrix4<f32> {
        transform::perspective(self.fovy, self.aspect, self.znear, self.zfar)
    }

    /// Recomputes the eye after `distance`, `pitch` or `yaw` changed
    fn update(&mut self) {
        self.eye =
            calculate_cartesian_eye_position(self.pitch, self.yaw, self.distance, self.target);
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OrbitCameraBounds {
    pub min_distance: Option<f32>,
    pub max_distance: Option<f32>,
    pub min_pitch: f32,
    pub max_pitch: f32,
    pub min_yaw: Option<f32>,
    pub max_yaw: Option<f32>,
}

impl Default for OrbitCameraBounds {
    fn default() -> Self {
        Self {
            min_distance: Some(1.0),
            max_distance: Some(800.0),
            min_pitch: -std::f32::consts::FRAC_PI_2 + 0.01,
            max_pitch: std::f32::consts::FRAC_PI_2 - 0.01,
            min_yaw: None,
            max_yaw: None,
        }
    }
}

fn calculate_cartesian_eye_position(
    pitch: f32,
    yaw: f32,
    distance: f32,
    target: Vector3<f32>,
) -> Vector3<f32> {
    Vector3::new(
        distance * yaw.sin() * pitch.cos(),
        distance * pitch.sin(),
        distance * yaw.cos() * pitch.cos(),
    ) + target
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_eye_orbits_target_at_distance() {
        let target = Vector3::new(1.0, 2.0, 3.0);
        let camera = OrbitCamera::new(10.0, 0.3, 1.2, target, 1.5);
        assert!(((camera.eye - target).magnitude() - 10.0).abs() < 1e-4);

        let front = OrbitCamera::new(5.0, 0.0, 0.0, Vector3::zero(), 1.0);
        assert!((front.eye - Vector3::new(0.0, 0.0, 5.0)).magnitude() < 1e-6);
    }

    #[test]
    fn test_view_puts_target_in_front() {
        let camera = OrbitCamera::new(20.0, 0.5, 0.7, Vector3::new(4.0, 0.0, -2.0), 1.0);
        let p = camera.view_matrix().transform_point(Point3::from_vec(camera.target));
        assert!(p.x.abs() < 1e-4 && p.y.abs() < 1e-4);
        assert!((p.z + 20.0).abs() < 1e-3);
    }

    #[test]
    fn test_bounds_clamp() {
        let mut camera = OrbitCamera::new(10.0, 0.0, 0.0, Vector3::zero(), 1.0);
        camera.set_pitch(10.0);
        assert_eq!(camera.pitch, camera.bounds.max_pitch);
        camera.set_distance(1e6);
        assert_eq!(camera.distance, 800.0);
        camera.set_distance(0.0);
        assert_eq!(camera.distance, 1.0);
    }

    #[test]
    fn test_pan_keeps_view_direction() {
        let mut camera = OrbitCamera::new(10.0, 0.2, 0.4, Vector3::zero(), 1.0);
        let before = camera.target - camera.eye;
        camera.pan((1.0, -0.5));
        assert!((camera.target - camera.eye - before).magnitude() < 1e-5);
        assert!(camera.target.magnitude() > 0.0);
    }
}
