pub mod orbit_camera;

pub use orbit_camera::{OrbitCamera, OrbitCameraBounds};
