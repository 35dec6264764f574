//! # Scene Graph
//!
//! Transform hierarchy for everything placed in the world.
//!
//! - [`SceneNode`] - owns its children, optionally references a mesh, carries a light or an orbit animation
//! - [`ParticleSystem`] - transient sprite effects outside the hierarchy
//! - [`Vertex3D`] - interleaved vertex layout shared by every pipeline
//!
//! ```no_run
//! use cgmath::{Matrix4, Vector3};
//! use succuland::gfx::scene::SceneNode;
//!
//! let mut cactus = SceneNode::new("cactus", Matrix4::from_translation(Vector3::new(4.0, 1.0, -2.0)));
//! cactus.add_child(SceneNode::new("spot", Matrix4::from_translation(Vector3::new(0.0, 30.0, 0.0))));
//! ```

pub mod node;
pub mod particle;
pub mod vertex;

pub use node::{LightAttachment, OrbitAnimation, SceneNode};
pub use particle::{Particle, ParticleSystem};
pub use vertex::Vertex3D;
