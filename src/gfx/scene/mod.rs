//! # Scene Graph
//!
//! Hierarchical scene description: [`Node`]s carry transforms and uniforms,
//! leaves implement [`Drawable`] and emit draw calls on a render backend.
//!
//! ```
//! use std::rc::Rc;
//! use caldera::gfx::backend::RecordingBackend;
//! use caldera::gfx::geometry::generate_sphere;
//! use caldera::gfx::object::Mesh;
//! use caldera::gfx::scene::{Drawable, Node};
//! use caldera::gfx::transform::{identity, translate};
//! use caldera::gfx::uniforms::Uniforms;
//!
//! let cap: Rc<dyn Drawable> = Rc::new(Mesh::from_geometry("cap", &generate_sphere(8, 4)));
//! let root = Node::with_children([Node::leaf(cap, translate(0.0, 1.0, 0.0))], identity());
//!
//! let mut backend = RecordingBackend::new();
//! root.draw(&mut backend, &identity(), &Uniforms::new());
//! assert_eq!(backend.labels(), vec!["cap"]);
//! ```

pub mod node;
pub mod vertex;

pub use node::{Child, Drawable, Node};
pub use vertex::Vertex3D;
