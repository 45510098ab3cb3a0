use std::rc::Rc;

use cgmath::{Deg, Matrix4, Point3, Transform, Vector3};
use log::debug;

use crate::error::{CalderaError, Result};
use crate::gfx::backend::RenderBackend;
use crate::gfx::scene::{Drawable, Node};
use crate::gfx::transform::{identity, rotate, scale, translate};
use crate::gfx::uniforms::Uniforms;

/// Node names of the joints, from the base outwards
pub const JOINT_NAMES: [&str; 3] = ["robot_base", "robot_arm", "robot_forearm"];

/// Segment sizes of a [`RobotArm`]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ArmDimensions {
    pub base_height: f32,
    pub base_radius: f32,
    pub arm_length: f32,
    pub arm_radius: f32,
    pub forearm_length: f32,
    pub forearm_radius: f32,
}

impl Default for ArmDimensions {
    fn default() -> Self {
        Self {
            base_height: 0.5,
            base_radius: 1.0,
            arm_length: 2.0,
            arm_radius: 0.2,
            forearm_length: 1.5,
            forearm_radius: 0.15,
        }
    }
}

/// Three-joint arm: a base turning around y carrying an arm and a forearm
/// that bend around z. Each joint node holds the next one, so rotations
/// accumulate down the chain.
pub struct RobotArm {
    root: Node,
    dims: ArmDimensions,
    angles: [f32; 3],
}

impl RobotArm {
    /// Arm built from a cylinder spanning `y = 0..1` with unit radius
    pub fn new(cylinder: Rc<dyn Drawable>, dims: ArmDimensions) -> Self {
        let segment = |radius: f32, length: f32| {
            Node::leaf(cylinder.clone(), scale(radius, length, radius))
        };
        let joint_node = |index: usize, radius: f32, length: f32| {
            Node::with_children([segment(radius, length)], joint(&dims, index, 0.0))
                .named(JOINT_NAMES[index])
        };

        let forearm = joint_node(2, dims.forearm_radius, dims.forearm_length);

        let mut arm = joint_node(1, dims.arm_radius, dims.arm_length);
        arm.add_node(forearm);

        let mut base = joint_node(0, dims.base_radius, dims.base_height);
        base.add_node(arm);

        Self {
            root: base,
            dims,
            angles: [0.0; 3],
        }
    }

    /// Sets joint `index` (0 base, 1 arm, 2 forearm) to `degrees`
    pub fn set_joint(&mut self, index: usize, degrees: f32) -> Result<()> {
        let name = JOINT_NAMES.get(index).ok_or_else(|| {
            CalderaError::InvalidConfig(format!("robot arm has no joint {index}"))
        })?;
        let transform = joint(&self.dims, index, degrees);
        if let Some(node) = self.root.find_mut(name) {
            node.transform = transform;
        }
        self.angles[index] = degrees;
        debug!("Robot joint {name} set to {degrees} degrees");
        Ok(())
    }

    pub fn joint_angle(&self, index: usize) -> Option<f32> {
        self.angles.get(index).copied()
    }

    /// Tip of the forearm in the arm's model space
    pub fn tip(&self) -> Point3<f32> {
        let chain = (0..JOINT_NAMES.len())
            .map(|i| joint(&self.dims, i, self.angles[i]))
            .fold(identity(), |acc, m| acc * m);
        chain.transform_point(Point3::new(0.0, self.dims.forearm_length, 0.0))
    }

    pub fn node(&self) -> &Node {
        &self.root
    }

    pub fn node_mut(&mut self) -> &mut Node {
        &mut self.root
    }
}

/// Local transform of joint `index` at `degrees`
fn joint(dims: &ArmDimensions, index: usize, degrees: f32) -> Matrix4<f32> {
    match index {
        0 => rotate(Vector3::unit_y(), Deg(degrees)),
        1 => translate(0.0, dims.base_height, 0.0) * rotate(Vector3::unit_z(), Deg(degrees)),
        _ => translate(0.0, dims.arm_length, 0.0) * rotate(Vector3::unit_z(), Deg(degrees)),
    }
}

impl Drawable for RobotArm {
    fn draw(
        &self,
        backend: &mut dyn RenderBackend,
        transform: &Matrix4<f32>,
        uniforms: &Uniforms,
    ) {
        self.root.draw(backend, transform, uniforms);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gfx::backend::RecordingBackend;
    use crate::gfx::geometry::generate_cylinder;
    use crate::gfx::object::Mesh;
    use cgmath::{InnerSpace, SquareMatrix};

    fn arm() -> RobotArm {
        let cylinder = Rc::new(Mesh::from_geometry("segment", &generate_cylinder(1.0, 1.0, 8)));
        RobotArm::new(cylinder, ArmDimensions::default())
    }

    fn close(a: Point3<f32>, b: Point3<f32>) -> bool {
        (a - b).magnitude() < 1e-5
    }

    #[test]
    fn test_straight_arm_tip() {
        assert!(close(arm().tip(), Point3::new(0.0, 4.0, 0.0)));
    }

    #[test]
    fn test_joint_rotations_compose() {
        let mut robot = arm();
        robot.set_joint(1, 90.0).unwrap();
        assert!(close(robot.tip(), Point3::new(-3.5, 0.5, 0.0)));

        robot.set_joint(0, 90.0).unwrap();
        assert!(close(robot.tip(), Point3::new(0.0, 0.5, 3.5)));

        robot.set_joint(2, -90.0).unwrap();
        // forearm bends back up from the horizontal arm
        assert!(close(robot.tip(), Point3::new(0.0, 2.0, 2.0)));
    }

    #[test]
    fn test_drawn_forearm_matches_chain() {
        let mut robot = arm();
        robot.set_joint(0, 30.0).unwrap();
        robot.set_joint(1, 45.0).unwrap();
        robot.set_joint(2, 20.0).unwrap();

        let mut backend = RecordingBackend::new();
        robot.draw(&mut backend, &Matrix4::identity(), &Uniforms::new());
        assert_eq!(backend.draws.len(), 3);

        let forearm = backend.draws[2].transform;
        let tip = forearm.transform_point(Point3::new(0.0, 1.0, 0.0));
        assert!(close(tip, robot.tip()));
    }

    #[test]
    fn test_unknown_joint_is_rejected() {
        let mut robot = arm();
        assert!(matches!(robot.set_joint(3, 10.0), Err(CalderaError::InvalidConfig(_))));
        assert_eq!(robot.joint_angle(0), Some(0.0));
    }
}
