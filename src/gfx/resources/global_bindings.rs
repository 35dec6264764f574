//! Uniform layouts shared with `shader.wgsl`
//!
//! Group 0 holds per-frame state (camera, fog, light count) and the light
//! storage array. Group 1 holds one [`DrawUniform`] per draw request, bound at
//! a dynamic offset.

use cgmath::{Matrix, Matrix4, SquareMatrix};

use crate::{
    gfx::{
        lighting::GpuLight,
        rendering::backend::{DrawRequest, DrawStyle, FrameGlobals},
        resources::material::Material,
    },
    wgpu_utils::{
        binding_types, ArrayBuffer, BindGroupBuilder, BindGroupLayoutBuilder,
        BindGroupLayoutWithDesc, DynamicUniformBuffer, UniformBuffer,
    },
};

pub const STYLE_LIT: u32 = 0;
pub const STYLE_EMISSIVE: u32 = 1;
pub const STYLE_PARTICLE: u32 = 2;

/// MUST match `FrameUniform` in the shader
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct FrameUniform {
    pub camera_position: [f32; 3],
    pub light_count: u32,
    pub fog_color: [f32; 3],
    pub fog_density: f32,
    pub fog_gradient: f32,
    pub fog_visible: u32,
    pub time: f32,
    _padding: f32,
}

impl FrameUniform {
    pub fn new(globals: &FrameGlobals, light_count: usize) -> Self {
        Self {
            camera_position: globals.camera_position,
            light_count: light_count as u32,
            fog_color: globals.fog.color,
            fog_density: globals.fog.density,
            fog_gradient: globals.fog.gradient,
            fog_visible: globals.fog.visible as u32,
            time: globals.time,
            _padding: 0.0,
        }
    }
}

/// Material constants as the shader reads them
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct MaterialConstants {
    pub ambient: [f32; 4],
    pub diffuse: [f32; 4],
    /// `w` carries the shininess
    pub specular: [f32; 4],
}

impl From<&Material> for MaterialConstants {
    fn from(material: &Material) -> Self {
        let [ar, ag, ab] = material.ambient;
        let [dr, dg, db] = material.diffuse;
        let [sr, sg, sb] = material.specular;
        Self {
            ambient: [ar, ag, ab, 1.0],
            diffuse: [dr, dg, db, 1.0],
            specular: [sr, sg, sb, material.shininess],
        }
    }
}

/// MUST match `DrawUniform` in the shader. 256 bytes, one dynamic slot.
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct DrawUniform {
    pub model: [[f32; 4]; 4],
    pub view_proj: [[f32; 4]; 4],
    /// Inverse-transpose of `model`
    pub normal: [[f32; 4]; 4],
    pub ambient: [f32; 4],
    pub diffuse: [f32; 4],
    pub specular: [f32; 4],
    pub style: u32,
    pub frame: u32,
    pub alpha: f32,
    _padding: f32,
}

impl DrawUniform {
    pub fn new(request: &DrawRequest, material: &MaterialConstants) -> Self {
        let normal = request
            .model
            .invert()
            .map(|inverse| inverse.transpose())
            .unwrap_or_else(Matrix4::identity);
        let (style, frame, alpha) = match request.style {
            DrawStyle::Lit => (STYLE_LIT, 0, 1.0),
            DrawStyle::Emissive => (STYLE_EMISSIVE, 0, 1.0),
            DrawStyle::Particle { frame, alpha } => (STYLE_PARTICLE, frame, alpha),
        };

        Self {
            model: request.model.into(),
            view_proj: (request.projection * request.view).into(),
            normal: normal.into(),
            ambient: material.ambient,
            diffuse: material.diffuse,
            specular: material.specular,
            style,
            frame,
            alpha,
            _padding: 0.0,
        }
    }
}

/// Group 0: frame uniform plus the light array
pub struct FrameBindings {
    pub frame: UniformBuffer<FrameUniform>,
    pub lights: ArrayBuffer<GpuLight>,
    layout: BindGroupLayoutWithDesc,
    bind_group: wgpu::BindGroup,
}

impl FrameBindings {
    pub fn new(device: &wgpu::Device, light_capacity: usize) -> Self {
        let frame = UniformBuffer::new(device);
        let lights = ArrayBuffer::new(device, light_capacity);
        let layout = BindGroupLayoutBuilder::new()
            .next_binding_rendering(binding_types::uniform())
            .next_binding_fragment(binding_types::storage_buffer_read_only())
            .create(device, "Frame Bind Group Layout");
        let bind_group = BindGroupBuilder::new(&layout)
            .resource(frame.binding_resource())
            .resource(lights.binding_resource())
            .create(device, "Frame Bind Group");

        Self {
            frame,
            lights,
            layout,
            bind_group,
        }
    }

    pub fn layout(&self) -> &wgpu::BindGroupLayout {
        &self.layout.layout
    }

    pub fn bind_group(&self) -> &wgpu::BindGroup {
        &self.bind_group
    }
}

/// Group 1: per-draw uniforms
pub struct DrawBindings {
    pub uniforms: DynamicUniformBuffer<DrawUniform>,
    layout: BindGroupLayoutWithDesc,
    bind_group: wgpu::BindGroup,
}

impl DrawBindings {
    pub fn new(device: &wgpu::Device, initial_draws: usize) -> Self {
        let uniforms = DynamicUniformBuffer::new(device, initial_draws);
        let layout = BindGroupLayoutBuilder::new()
            .next_binding_rendering(binding_types::uniform_dynamic(
                std::mem::size_of::<DrawUniform>() as u64,
            ))
            .create(device, "Draw Bind Group Layout");
        let bind_group = Self::bind(device, &layout, &uniforms);

        Self {
            uniforms,
            layout,
            bind_group,
        }
    }

    fn bind(
        device: &wgpu::Device,
        layout: &BindGroupLayoutWithDesc,
        uniforms: &DynamicUniformBuffer<DrawUniform>,
    ) -> wgpu::BindGroup {
        BindGroupBuilder::new(layout)
            .resource(uniforms.binding_resource())
            .create(device, "Draw Bind Group")
    }

    /// Uploads staged draws, rebinding if the buffer grew
    pub fn flush(&mut self, device: &wgpu::Device, queue: &wgpu::Queue) {
        if self.uniforms.flush(device, queue) {
            self.bind_group = Self::bind(device, &self.layout, &self.uniforms);
        }
    }

    pub fn layout(&self) -> &wgpu::BindGroupLayout {
        &self.layout.layout
    }

    pub fn bind_group(&self) -> &wgpu::BindGroup {
        &self.bind_group
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gfx::{mesh::MeshId, rendering::backend::FogState};
    use cgmath::Vector3;

    #[test]
    fn test_uniform_sizes() {
        assert_eq!(std::mem::size_of::<FrameUniform>(), 48);
        assert_eq!(std::mem::size_of::<DrawUniform>(), 256);
    }

    #[test]
    fn test_frame_uniform_carries_light_count() {
        let globals = FrameGlobals {
            clear_color: [0.0; 3],
            camera_position: [1.0, 2.0, 3.0],
            fog: FogState {
                color: [0.5; 3],
                density: 0.02,
                gradient: 4.0,
                visible: true,
            },
            time: 2.5,
        };
        let uniform = FrameUniform::new(&globals, 7);
        assert_eq!(uniform.light_count, 7);
        assert_eq!(uniform.fog_visible, 1);
        assert_eq!(uniform.camera_position, [1.0, 2.0, 3.0]);
    }

    #[test]
    fn test_draw_uniform_normal_matrix_undoes_scale() {
        let request = DrawRequest {
            mesh: MeshId(0),
            model: Matrix4::from_translation(Vector3::new(5.0, 0.0, 0.0)) * Matrix4::from_scale(2.0),
            view: Matrix4::identity(),
            projection: Matrix4::identity(),
            style: DrawStyle::Particle {
                frame: 3,
                alpha: 0.5,
            },
        };
        let uniform = DrawUniform::new(&request, &MaterialConstants::from(&Material::default()));

        assert_eq!(uniform.style, STYLE_PARTICLE);
        assert_eq!(uniform.frame, 3);
        assert_eq!(uniform.normal[0][0], 0.5);
        assert_eq!(uniform.normal[1][1], 0.5);
        assert_eq!(uniform.model[3][0], 5.0);
        assert_eq!(uniform.specular[3], Material::default().shininess);
    }
}
