//! # Scene Graph Nodes
//!
//! A [`Node`] owns an ordered list of children, a local transform and a set of
//! uniforms. Drawing a node composes its transform onto the one inherited from
//! its parent, merges its uniforms over the inherited ones and draws every
//! child in insertion order with the result.
//!
//! Child nodes are owned exclusively, so the hierarchy is a tree. Leaf
//! geometry is held through `Rc<dyn Drawable>`, which lets several nodes draw
//! the same mesh (every cactus arm shares one cylinder) without copying it.

use std::rc::Rc;

use cgmath::{Matrix4, SquareMatrix};

use crate::gfx::backend::RenderBackend;
use crate::gfx::uniforms::{UniformValue, Uniforms};

/// Anything the scene graph can draw
pub trait Drawable {
    /// Issues draw calls for this object with the accumulated world
    /// `transform` and the merged `uniforms`
    fn draw(
        &self,
        backend: &mut dyn RenderBackend,
        transform: &Matrix4<f32>,
        uniforms: &Uniforms,
    );
}

/// A child slot of a [`Node`]
pub enum Child {
    Node(Node),
    Drawable(Rc<dyn Drawable>),
}

impl From<Node> for Child {
    fn from(node: Node) -> Self {
        Child::Node(node)
    }
}

impl From<Rc<dyn Drawable>> for Child {
    fn from(drawable: Rc<dyn Drawable>) -> Self {
        Child::Drawable(drawable)
    }
}

/// Transform-and-uniforms node of the scene graph
pub struct Node {
    pub name: String,
    pub transform: Matrix4<f32>,
    pub uniforms: Uniforms,
    children: Vec<Child>,
}

impl Default for Node {
    fn default() -> Self {
        Self::new()
    }
}

impl Node {
    /// Empty node with identity transform
    pub fn new() -> Self {
        Self {
            name: String::new(),
            transform: Matrix4::identity(),
            uniforms: Uniforms::new(),
            children: Vec::new(),
        }
    }

    /// Node drawing `children` with the given local transform
    pub fn with_children<I, C>(children: I, transform: Matrix4<f32>) -> Self
    where
        I: IntoIterator<Item = C>,
        C: Into<Child>,
    {
        let mut node = Self::new();
        node.transform = transform;
        node.children = children.into_iter().map(Into::into).collect();
        node
    }

    /// Node holding a single shared drawable
    pub fn leaf(drawable: Rc<dyn Drawable>, transform: Matrix4<f32>) -> Self {
        Self::with_children([Child::Drawable(drawable)], transform)
    }

    /// Builder pattern: set the node name
    pub fn named(mut self, name: &str) -> Self {
        self.name = name.to_string();
        self
    }

    /// Builder pattern: set a uniform inherited by the whole subtree
    pub fn with_uniform(mut self, name: &str, value: impl Into<UniformValue>) -> Self {
        self.uniforms.set(name, value);
        self
    }

    /// Appends children after the existing ones
    pub fn add<I, C>(&mut self, children: I)
    where
        I: IntoIterator<Item = C>,
        C: Into<Child>,
    {
        self.children.extend(children.into_iter().map(Into::into));
    }

    pub fn add_node(&mut self, node: Node) {
        self.children.push(Child::Node(node));
    }

    pub fn add_drawable(&mut self, drawable: Rc<dyn Drawable>) {
        self.children.push(Child::Drawable(drawable));
    }

    /// Applies `transform` outside the current local transform
    /// (`local = transform · local`).
    ///
    /// Must not be called while the graph is being drawn.
    pub fn apply(&mut self, transform: Matrix4<f32>) {
        self.transform = transform * self.transform;
    }

    pub fn children(&self) -> &[Child] {
        &self.children
    }

    pub fn children_mut(&mut self) -> &mut [Child] {
        &mut self.children
    }

    /// Direct child nodes, skipping drawables
    pub fn child_nodes(&self) -> impl Iterator<Item = &Node> {
        self.children.iter().filter_map(|c| match c {
            Child::Node(n) => Some(n),
            Child::Drawable(_) => None,
        })
    }

    pub fn child_nodes_mut(&mut self) -> impl Iterator<Item = &mut Node> {
        self.children.iter_mut().filter_map(|c| match c {
            Child::Node(n) => Some(n),
            Child::Drawable(_) => None,
        })
    }

    /// First node named `name` in this subtree, depth first
    pub fn find(&self, name: &str) -> Option<&Node> {
        if self.name == name {
            return Some(self);
        }
        self.child_nodes().find_map(|n| n.find(name))
    }

    pub fn find_mut(&mut self, name: &str) -> Option<&mut Node> {
        if self.name == name {
            return Some(self);
        }
        self.child_nodes_mut().find_map(|n| n.find_mut(name))
    }

    /// Number of nodes in this subtree, itself included
    pub fn node_count(&self) -> usize {
        1 + self.child_nodes().map(Node::node_count).sum::<usize>()
    }

    /// Draws the subtree.
    ///
    /// The effective transform is `parent · local`, the effective uniforms are
    /// the inherited ones overridden by this node's own.
    pub fn draw(
        &self,
        backend: &mut dyn RenderBackend,
        parent: &Matrix4<f32>,
        inherited: &Uniforms,
    ) {
        let transform = *parent * self.transform;
        let uniforms = inherited.overridden_by(&self.uniforms);
        for child in &self.children {
            match child {
                Child::Node(node) => node.draw(backend, &transform, &uniforms),
                Child::Drawable(drawable) => drawable.draw(backend, &transform, &uniforms),
            }
        }
    }
}

/// A node can itself be shared as a drawable part
impl Drawable for Node {
    fn draw(
        &self,
        backend: &mut dyn RenderBackend,
        transform: &Matrix4<f32>,
        uniforms: &Uniforms,
    ) {
        Node::draw(self, backend, transform, uniforms);
    }
}
