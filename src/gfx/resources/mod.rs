// src/gfx/resources/mod.rs
//! GPU-facing resources
//!
//! Materials, uniform layouts and render target textures.

pub mod global_bindings;
pub mod material;
pub mod texture_resource;

pub use global_bindings::{DrawBindings, DrawUniform, FrameBindings, FrameUniform, MaterialConstants};
pub use material::{Material, MaterialId, MaterialLibrary, DEFAULT_MATERIAL};
pub use texture_resource::TextureResource;
