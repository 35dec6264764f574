//! # Graphics Module
//!
//! Everything between the world model and the GPU.
//!
//! ## Architecture Overview
//!
//! - **Cameras** ([`camera`]) - navigation state machine, boundary volume, pointer handling
//! - **Geometry** ([`geometry`], [`mesh`]) - CPU-side mesh data and its sources
//! - **Lighting** ([`lighting`]) - light definitions and the per-frame registry
//! - **Scene graph** ([`scene`]) - node hierarchy, particles, vertex layout
//! - **Picking** ([`picking`]) - screen rays against bounding boxes
//! - **Fog** ([`fog`]) - animated distance fog parameters
//! - **Rendering** ([`rendering`], [`resources`]) - backend trait and its wgpu implementation
//!
//! The scene graph never touches wgpu directly: it emits
//! [`DrawRequest`](rendering::DrawRequest)s into a
//! [`RenderBackend`](rendering::RenderBackend).

pub mod camera;
pub mod fog;
pub mod geometry;
pub mod lighting;
pub mod mesh;
pub mod picking;
pub mod rendering;
pub mod resources;
pub mod scene;

pub use camera::{Camera, NavigationContext};
pub use rendering::{RenderBackend, WgpuBackend};
