//! Procedural cacti.
//!
//! A cactus is a trunk cylinder with a spherical cap plus recursive levels
//! of branches. Every level alternates between lying sideways and standing
//! up again, and shrinks by the factors of [`LEVEL_FACTORS`]. All cylinders
//! and caps of every cactus share the two drawables of one [`CactusParts`].

use std::path::Path;
use std::rc::Rc;

use cgmath::{Deg, Matrix4, Vector3};
use log::{debug, warn};
use rand::{rngs::StdRng, Rng, SeedableRng};

use crate::gfx::geometry::{generate_cylinder, generate_sphere};
use crate::gfx::loader::DIFFUSE_MAP;
use crate::gfx::object::Mesh;
use crate::gfx::scene::{Drawable, Node};
use crate::gfx::texture::{TextureFilter, Textured, WrapMode};
use crate::gfx::transform::{identity, rotate, scale, scale_uniform, translate};

/// Length and width of each level relative to the level above
pub const LEVEL_FACTORS: [(f32, f32); 4] = [(1.0, 0.4), (0.5, 0.6), (0.5, 0.8), (0.5, 0.8)];

/// Deepest branch level the coefficients allow
pub const MAX_BRANCH_LEVELS: usize = LEVEL_FACTORS.len() - 1;

/// Tilt between consecutive branch levels
const BRANCH_TILT: Deg<f32> = Deg(90.0);

/// Shared geometry for all cactus nodes.
///
/// `cylinder` must span `y = 0..1` with unit radius and `sphere` must be a
/// unit sphere; nodes scale them into place.
#[derive(Clone)]
pub struct CactusParts {
    pub cylinder: Rc<dyn Drawable>,
    pub sphere: Rc<dyn Drawable>,
}

impl CactusParts {
    pub fn new(cylinder: Rc<dyn Drawable>, sphere: Rc<dyn Drawable>) -> Self {
        Self { cylinder, sphere }
    }

    /// Generated cylinder and sphere, textured with `tex_file` when it exists
    pub fn procedural(tex_file: Option<&Path>) -> Self {
        let cylinder = Mesh::from_geometry("cactus_cylinder", &generate_cylinder(1.0, 1.0, 16));
        let sphere = Mesh::from_geometry("cactus_sphere", &generate_sphere(16, 8))
            .with_uniform("k_a", [0.2, 0.2, 0.2])
            .with_uniform("k_s", [0.1, 0.1, 0.1]);

        match tex_file {
            Some(tex) => Self::new(
                Rc::new(textured(cylinder, tex)),
                Rc::new(textured(sphere, tex)),
            ),
            None => Self::new(Rc::new(cylinder), Rc::new(sphere)),
        }
    }
}

fn textured(mesh: Mesh, tex_file: &Path) -> Textured<Mesh> {
    Textured::new(mesh).with_texture_file(
        DIFFUSE_MAP,
        tex_file,
        WrapMode::Repeat,
        TextureFilter::MIPMAPPED,
    )
}

/// Branch rotation angles around the parent axis, one list per level.
///
/// Every branch of level `n` sprouts one child per angle of level `n + 1`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BranchTree {
    levels: Vec<Vec<f32>>,
}

impl BranchTree {
    /// Keeps at most [`MAX_BRANCH_LEVELS`] levels
    pub fn new(mut levels: Vec<Vec<f32>>) -> Self {
        if levels.len() > MAX_BRANCH_LEVELS {
            warn!(
                "Cactus branch tree has {} levels, keeping {MAX_BRANCH_LEVELS}",
                levels.len()
            );
            levels.truncate(MAX_BRANCH_LEVELS);
        }
        Self { levels }
    }

    pub fn depth(&self) -> usize {
        self.levels.len()
    }

    pub fn angles(&self, level: usize) -> &[f32] {
        self.levels.get(level).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Number of branches the tree produces
    pub fn branch_count(&self) -> usize {
        self.levels
            .iter()
            .scan(1, |parents, angles| {
                *parents *= angles.len();
                Some(*parents)
            })
            .sum()
    }
}

/// Builds cactus node hierarchies from a shared set of parts
pub struct CactusBuilder {
    parts: CactusParts,
    /// Absolute (length, width) per level
    coefs: [(f32, f32); 4],
    rng: StdRng,
}

impl CactusBuilder {
    pub fn new(parts: CactusParts, seed: u64) -> Self {
        let mut coefs = LEVEL_FACTORS;
        for level in 1..coefs.len() {
            coefs[level].0 *= coefs[level - 1].0;
            coefs[level].1 *= coefs[level - 1].1;
        }
        Self {
            parts,
            coefs,
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Absolute branch length and width of `level`
    pub fn level_size(&self, level: usize) -> (f32, f32) {
        self.coefs[level.min(self.coefs.len() - 1)]
    }

    /// Cactus with the given branch tree.
    ///
    /// `randomize` drops each first-level branch by a random amount so the
    /// arms do not all start at the same height.
    pub fn cactus(&mut self, tree: &BranchTree, randomize: bool, trunk_height: f32) -> Node {
        let branches = self.branch_level(tree, 0, randomize);

        let (length, width) = self.coefs[0];
        let trunk_height = trunk_height * length;
        let trunk = Node::leaf(self.parts.cylinder.clone(), scale(width, trunk_height, width));
        let cap = Node::leaf(
            self.parts.sphere.clone(),
            translate(0.0, trunk_height, 0.0) * scale_uniform(width),
        );

        let mut root = Node::with_children([trunk, cap], identity()).named("cactus");
        root.add(branches);
        debug!("Built cactus with {} nodes", root.node_count());
        root
    }

    fn branch_level(&mut self, tree: &BranchTree, level: usize, randomize: bool) -> Vec<Node> {
        let (parent_length, _) = self.coefs[level];
        let (length, width) = self.coefs[level + 1];

        let mut branches = Vec::with_capacity(tree.angles(level).len());
        for &angle in tree.angles(level) {
            let transform = branch_joint(parent_length, angle, level);
            let arm = Node::leaf(self.parts.cylinder.clone(), scale(width, length, width));
            let cap = Node::leaf(
                self.parts.sphere.clone(),
                translate(0.0, length, 0.0) * scale_uniform(width),
            );
            let mut branch = Node::with_children([arm, cap], transform);

            if randomize && level == 0 {
                let drop = self.rng.random_range(0.1f32..0.7);
                branch.apply(translate(0.0, -drop, 0.0));
            }
            if level + 1 < tree.depth() {
                let children = self.branch_level(tree, level + 1, randomize);
                branch.add(children);
            }
            branches.push(branch);
        }
        branches
    }
}

/// Joint of a branch on its parent: turned `angle` degrees around the parent
/// axis, moved to the parent's tip, then tilted. Even levels lie down, odd
/// levels stand back up.
pub fn branch_joint(parent_length: f32, angle: f32, level: usize) -> Matrix4<f32> {
    let tilt = if level % 2 == 0 { BRANCH_TILT } else { -BRANCH_TILT };
    rotate(Vector3::unit_y(), Deg(angle))
        * translate(0.0, parent_length, 0.0)
        * rotate(Vector3::unit_z(), tilt)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gfx::backend::RecordingBackend;
    use crate::gfx::uniforms::Uniforms;
    use cgmath::{SquareMatrix, Transform, Point3};

    fn builder() -> CactusBuilder {
        CactusBuilder::new(CactusParts::procedural(None), 5)
    }

    #[test]
    fn test_level_sizes_are_cumulative() {
        let b = builder();
        assert_eq!(b.level_size(0), (1.0, 0.4));
        let (l1, w1) = b.level_size(1);
        assert!((l1 - 0.5).abs() < 1e-6 && (w1 - 0.24).abs() < 1e-6);
        let (l3, w3) = b.level_size(3);
        assert!((l3 - 0.125).abs() < 1e-6 && (w3 - 0.4 * 0.6 * 0.8 * 0.8).abs() < 1e-6);
    }

    #[test]
    fn test_node_count_follows_tree() {
        let tree = BranchTree::new(vec![vec![0.0, 180.0], vec![0.0], vec![90.0]]);
        assert_eq!(tree.branch_count(), 6);

        let cactus = builder().cactus(&tree, true, 1.4);
        // root, trunk, cap + arm node, cylinder and cap per branch
        assert_eq!(cactus.node_count(), 3 + 3 * 6);
    }

    #[test]
    fn test_parts_are_shared() {
        let parts = CactusParts::procedural(None);
        let mut b = CactusBuilder::new(parts.clone(), 1);
        let tree = BranchTree::new(vec![vec![0.0, 120.0, 240.0]]);
        let cactus = b.cactus(&tree, false, 1.4);

        let mut backend = RecordingBackend::new();
        cactus.draw(&mut backend, &Matrix4::identity(), &Uniforms::new());
        assert_eq!(backend.find("cactus_cylinder").count(), 4);
        assert_eq!(backend.find("cactus_sphere").count(), 4);
        // builder, test handle, four cylinder leaves
        assert_eq!(Rc::strong_count(&parts.cylinder), 6);
    }

    #[test]
    fn test_first_level_lies_sideways() {
        let tree = BranchTree::new(vec![vec![0.0]]);
        let cactus = builder().cactus(&tree, false, 1.4);

        let mut backend = RecordingBackend::new();
        cactus.draw(&mut backend, &Matrix4::identity(), &Uniforms::new());
        let arm = &backend.find("cactus_cylinder").nth(1).unwrap().transform;
        // arm cylinder axis is tilted onto -x at the joint height
        let base = arm.transform_point(Point3::new(0.0, 0.0, 0.0));
        let tip = arm.transform_point(Point3::new(0.0, 1.0, 0.0));
        assert!((base.y - 1.0).abs() < 1e-5);
        assert!((tip.y - 1.0).abs() < 1e-5);
        assert!((tip.x + 0.5).abs() < 1e-5);
        assert!(branch_joint(1.0, 0.0, 0).invert().is_some());
    }

    #[test]
    fn test_random_drop_is_seeded() {
        let tree = BranchTree::new(vec![vec![0.0, 90.0]]);
        let draw = |seed| {
            let mut b = CactusBuilder::new(CactusParts::procedural(None), seed);
            let mut backend = RecordingBackend::new();
            b.cactus(&tree, true, 1.4)
                .draw(&mut backend, &Matrix4::identity(), &Uniforms::new());
            backend.draws.iter().map(|d| d.transform).collect::<Vec<_>>()
        };
        assert_eq!(draw(3), draw(3));
        let dropped = draw(3)[2].transform_point(Point3::new(0.0, 0.0, 0.0)).y;
        assert!(dropped > 0.3 - 1e-5 && dropped < 0.9 + 1e-5);
    }

    #[test]
    fn test_tree_depth_is_capped() {
        let tree = BranchTree::new(vec![vec![0.0]; 5]);
        assert_eq!(tree.depth(), MAX_BRANCH_LEVELS);
        assert!(tree.angles(7).is_empty());
    }
}
