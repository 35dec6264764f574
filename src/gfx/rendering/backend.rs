//! Rendering backend boundary
//!
//! The world produces geometry, transforms and light records; everything that
//! touches the GPU sits behind [`RenderBackend`]. A frame is:
//!
//! ```text
//! begin_frame -> upload_lights -> draw* -> present
//! ```
//!
//! Meshes are uploaded once, before the first frame, together with their
//! resolved material.

use cgmath::Matrix4;

use crate::{
    error::WorldResult,
    gfx::{
        lighting::GpuLight,
        mesh::{Mesh, MeshId},
        resources::material::Material,
    },
};

/// How a draw is shaded
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DrawStyle {
    /// Phong shading with the frame's lights and fog
    Lit,
    /// Flat colour, used for visible light sources
    Emissive,
    /// Blended sprite; `frame` selects the animation step
    Particle { frame: u32, alpha: f32 },
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DrawRequest {
    pub mesh: MeshId,
    pub model: Matrix4<f32>,
    pub view: Matrix4<f32>,
    pub projection: Matrix4<f32>,
    pub style: DrawStyle,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FogState {
    pub color: [f32; 3],
    pub density: f32,
    pub gradient: f32,
    pub visible: bool,
}

/// Per-frame values shared by every draw
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameGlobals {
    pub clear_color: [f32; 3],
    pub camera_position: [f32; 3],
    pub fog: FogState,
    /// Elapsed time, drives shader-side animation
    pub time: f32,
}

pub trait RenderBackend {
    fn upload_mesh(&mut self, id: MeshId, mesh: &Mesh, material: Option<&Material>) -> WorldResult<()>;

    fn begin_frame(&mut self, globals: &FrameGlobals) -> WorldResult<()>;

    /// Replaces the frame's light buffer; called once per frame before any draw
    fn upload_lights(&mut self, lights: &[GpuLight]) -> WorldResult<()>;

    fn draw(&mut self, request: DrawRequest) -> WorldResult<()>;

    fn present(&mut self) -> WorldResult<()>;
}
