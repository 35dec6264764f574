//! # Vertex Data Structures
//!
//! GPU-compatible vertex format shared by terrain, imported assets and
//! primitives. Attribute locations match `shader.wgsl`.

/// A 3D vertex with position, normal and texture coordinates.
///
/// The `#[repr(C)]` layout lets [`GeometryData::to_vertices`] output be cast
/// straight into a vertex buffer.
///
/// [`GeometryData::to_vertices`]: crate::gfx::geometry::GeometryData::to_vertices
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct Vertex3D {
    pub position: [f32; 3],
    pub normal: [f32; 3],
    pub tex_coords: [f32; 2],
}

impl Vertex3D {
    const ATTRIBUTES: [wgpu::VertexAttribute; 3] =
        wgpu::vertex_attr_array![0 => Float32x3, 1 => Float32x3, 2 => Float32x2];

    /// Returns the vertex buffer layout for wgpu rendering.
    ///
    /// - Attribute 0: position (Float32x3)
    /// - Attribute 1: normal (Float32x3)
    /// - Attribute 2: texture coordinates (Float32x2)
    pub fn desc() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<Vertex3D>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &Self::ATTRIBUTES,
        }
    }
}
