//! Scene content built on the [`gfx`](crate::gfx) scene graph: debug axis,
//! skybox, procedural cacti, a jointed robot arm and volcano smoke.

pub mod axis;
pub mod cactus;
pub mod robot_arm;
pub mod skybox;
pub mod smoke;

pub use axis::axis;
pub use cactus::{BranchTree, CactusBuilder, CactusParts};
pub use robot_arm::{ArmDimensions, RobotArm};
pub use skybox::Skybox;
pub use smoke::Smoke;
