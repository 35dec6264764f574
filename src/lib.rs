//! Succuland
//!
//! A procedural desert explored through a wgpu and winit window: a seeded
//! noise height field, cameras bounded by the terrain, a scene graph of cacti
//! and lights, and a bounded per-frame light registry.

pub mod app;
pub mod config;
pub mod error;
pub mod gfx;
pub mod input;
pub mod performance;
pub mod prelude;
pub mod schedule;
pub mod terrain;
pub mod wgpu_utils;
pub mod world;

pub use app::SuccuApp;
pub use error::{WorldError, WorldResult};
pub use world::World;
