//! WGPU utility functions and helpers
//!
//! Small wrappers around buffers and bind groups used by the wgpu backend.

pub mod binding_builder;
pub mod binding_types;
pub mod uniform_buffer;

pub use binding_builder::{BindGroupBuilder, BindGroupLayoutBuilder, BindGroupLayoutWithDesc};
pub use uniform_buffer::{ArrayBuffer, DynamicUniformBuffer, UniformBuffer};
