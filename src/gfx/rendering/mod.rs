// src/gfx/rendering/mod.rs
//! Rendering
//!
//! The [`RenderBackend`] trait is the seam between the world and the GPU;
//! [`WgpuBackend`] implements it on top of wgpu.

pub mod backend;
pub mod pipeline_manager;
pub mod render_engine;

pub use backend::{DrawRequest, DrawStyle, FogState, FrameGlobals, RenderBackend};
pub use pipeline_manager::{PipelineConfig, PipelineManager};
pub use render_engine::{GpuMesh, WgpuBackend};
