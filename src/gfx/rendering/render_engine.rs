//! wgpu implementation of [`RenderBackend`]
//!
//! One render pass per frame. Draw requests are staged while the world walks
//! its scene graph and recorded in [`present`](RenderBackend::present), once
//! every per-draw uniform has been uploaded in a single write.

use std::{collections::HashMap, ops::Range, sync::Arc};

use wgpu::util::DeviceExt;

use crate::{
    error::{WorldError, WorldResult},
    gfx::{
        geometry::Topology,
        lighting::GpuLight,
        mesh::{Mesh, MeshId},
        resources::{
            global_bindings::{DrawBindings, DrawUniform, FrameBindings, FrameUniform, MaterialConstants},
            material::Material,
            texture_resource::TextureResource,
        },
    },
};

use super::{
    backend::{DrawRequest, DrawStyle, FrameGlobals, RenderBackend},
    pipeline_manager::{PipelineConfig, PipelineManager},
};

const LIT_LIST: &str = "lit_list";
const LIT_STRIPS: &str = "lit_strips";
const PARTICLE: &str = "particle";

/// Initial per-frame draw slots; the buffer grows on demand
const INITIAL_DRAW_SLOTS: usize = 256;

/// Buffers of one uploaded mesh; dropping it releases them
pub struct GpuMesh {
    vertex_buffer: wgpu::Buffer,
    index_buffer: wgpu::Buffer,
    ranges: Vec<Range<u32>>,
    strips: bool,
    material: MaterialConstants,
}

impl GpuMesh {
    fn new(device: &wgpu::Device, id: MeshId, mesh: &Mesh, material: Option<&Material>) -> Self {
        let vertices = mesh.geometry.to_vertices();
        let vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(&format!("{} vertices ({:?})", mesh.label, id)),
            contents: bytemuck::cast_slice(&vertices),
            usage: wgpu::BufferUsages::VERTEX,
        });
        let index_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(&format!("{} indices ({:?})", mesh.label, id)),
            contents: bytemuck::cast_slice(&mesh.geometry.indices),
            usage: wgpu::BufferUsages::INDEX,
        });

        let material = material.cloned().unwrap_or_default();
        Self {
            vertex_buffer,
            index_buffer,
            ranges: mesh.geometry.draw_ranges(),
            strips: matches!(mesh.geometry.topology, Topology::TriangleStrips { .. }),
            material: MaterialConstants::from(&material),
        }
    }
}

struct StagedDraw {
    mesh: MeshId,
    offset: u32,
    pipeline: &'static str,
}

pub struct WgpuBackend {
    surface: wgpu::Surface<'static>,
    device: Arc<wgpu::Device>,
    queue: Arc<wgpu::Queue>,
    config: wgpu::SurfaceConfiguration,
    depth_texture: TextureResource,
    pipeline_manager: PipelineManager,
    frame_bindings: FrameBindings,
    draw_bindings: DrawBindings,
    meshes: HashMap<MeshId, GpuMesh>,

    globals: Option<FrameGlobals>,
    light_count: usize,
    staged: Vec<StagedDraw>,
}

impl WgpuBackend {
    /// Sets up the device, surface and pipelines for `window`.
    ///
    /// `light_capacity` sizes the light storage buffer and must match the
    /// world's light registry.
    pub async fn new(
        window: impl Into<wgpu::SurfaceTarget<'static>>,
        width: u32,
        height: u32,
        light_capacity: usize,
    ) -> WorldResult<Self> {
        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            ..Default::default()
        });
        let surface = instance
            .create_surface(window)
            .map_err(|e| WorldError::render(format!("cannot create surface: {e}")))?;

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::default(),
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .map_err(|e| WorldError::render(format!("no suitable adapter: {e}")))?;
        log::info!("using adapter {:?}", adapter.get_info().name);

        let (device, queue) = adapter
            .request_device(&wgpu::DeviceDescriptor {
                label: Some("Succuland Device"),
                required_features: wgpu::Features::default(),
                required_limits: wgpu::Limits::downlevel_defaults(),
                memory_hints: wgpu::MemoryHints::default(),
                trace: wgpu::Trace::Off,
            })
            .await
            .map_err(|e| WorldError::render(format!("cannot open device: {e}")))?;

        let surface_capabilities = surface.get_capabilities(&adapter);
        let format = surface_capabilities
            .formats
            .iter()
            .copied()
            .find(|f| f.is_srgb())
            .or_else(|| surface_capabilities.formats.first().copied())
            .ok_or_else(|| WorldError::render("surface reports no formats"))?;
        let alpha_mode = surface_capabilities
            .alpha_modes
            .first()
            .copied()
            .unwrap_or(wgpu::CompositeAlphaMode::Auto);

        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format,
            width: width.max(1),
            height: height.max(1),
            present_mode: wgpu::PresentMode::Fifo,
            alpha_mode,
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &config);

        let depth_texture = TextureResource::create_depth_texture(&device, &config, "depth_texture");
        let frame_bindings = FrameBindings::new(&device, light_capacity);
        let draw_bindings = DrawBindings::new(&device, INITIAL_DRAW_SLOTS);

        let device: Arc<wgpu::Device> = device.into();
        let queue: Arc<wgpu::Queue> = queue.into();
        let mut pipeline_manager = PipelineManager::new(device.clone());
        pipeline_manager.load_shader("world", include_str!("shader.wgsl"));

        let layouts = vec![
            frame_bindings.layout().clone(),
            draw_bindings.layout().clone(),
        ];
        let opaque = PipelineConfig::default()
            .with_shader("world")
            .with_cull_mode(None)
            .with_depth(TextureResource::DEPTH_FORMAT, true)
            .with_bind_group_layouts(layouts.clone())
            .with_color_targets(vec![Some(wgpu::ColorTargetState {
                format,
                blend: Some(wgpu::BlendState::REPLACE),
                write_mask: wgpu::ColorWrites::ALL,
            })]);

        pipeline_manager.register_pipeline(LIT_LIST, opaque.clone().with_label("LIT LIST"));
        pipeline_manager.register_pipeline(
            LIT_STRIPS,
            opaque
                .with_label("LIT STRIPS")
                .with_primitive_topology(wgpu::PrimitiveTopology::TriangleStrip),
        );
        pipeline_manager.register_pipeline(
            PARTICLE,
            PipelineConfig::default()
                .with_label("PARTICLE")
                .with_shader("world")
                .with_fragment_entry("fs_particle")
                .with_cull_mode(None)
                .with_depth(TextureResource::DEPTH_FORMAT, false)
                .with_bind_group_layouts(layouts)
                .with_color_targets(vec![Some(wgpu::ColorTargetState {
                    format,
                    blend: Some(wgpu::BlendState::ALPHA_BLENDING),
                    write_mask: wgpu::ColorWrites::ALL,
                })]),
        );
        pipeline_manager.create_all_pipelines()?;

        Ok(Self {
            surface,
            device,
            queue,
            config,
            depth_texture,
            pipeline_manager,
            frame_bindings,
            draw_bindings,
            meshes: HashMap::new(),
            globals: None,
            light_count: 0,
            staged: Vec::new(),
        })
    }

    /// Reconfigures the surface and depth buffer; zero sizes are ignored
    pub fn resize(&mut self, width: u32, height: u32) {
        if width == 0 || height == 0 {
            return;
        }

        self.config.width = width;
        self.config.height = height;
        self.surface.configure(&self.device, &self.config);
        self.depth_texture =
            TextureResource::create_depth_texture(&self.device, &self.config, "depth_texture");
    }

    pub fn surface_size(&self) -> (u32, u32) {
        (self.config.width, self.config.height)
    }

    fn acquire_frame(&mut self) -> WorldResult<Option<wgpu::SurfaceTexture>> {
        match self.surface.get_current_texture() {
            Ok(frame) => Ok(Some(frame)),
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                log::debug!("surface lost, reconfiguring");
                self.surface.configure(&self.device, &self.config);
                Ok(None)
            }
            Err(wgpu::SurfaceError::Timeout) => {
                log::warn!("surface timed out, skipping frame");
                Ok(None)
            }
            Err(e) => Err(WorldError::render(format!("cannot acquire frame: {e}"))),
        }
    }
}

impl RenderBackend for WgpuBackend {
    fn upload_mesh(&mut self, id: MeshId, mesh: &Mesh, material: Option<&Material>) -> WorldResult<()> {
        if mesh.geometry.indices.is_empty() {
            return Err(WorldError::render(format!("mesh '{}' has no indices", mesh.label)));
        }
        log::debug!(
            "uploading mesh '{}' ({} vertices, {} indices)",
            mesh.label,
            mesh.geometry.vertex_count(),
            mesh.geometry.index_count()
        );
        self.meshes.insert(id, GpuMesh::new(&self.device, id, mesh, material));
        Ok(())
    }

    fn begin_frame(&mut self, globals: &FrameGlobals) -> WorldResult<()> {
        self.globals = Some(*globals);
        self.light_count = 0;
        self.staged.clear();
        self.draw_bindings.uniforms.clear();
        Ok(())
    }

    fn upload_lights(&mut self, lights: &[GpuLight]) -> WorldResult<()> {
        self.frame_bindings.lights.write(&self.queue, lights)?;
        self.light_count = lights.len();
        Ok(())
    }

    fn draw(&mut self, request: DrawRequest) -> WorldResult<()> {
        let mesh = self
            .meshes
            .get(&request.mesh)
            .ok_or_else(|| WorldError::render(format!("{:?} was never uploaded", request.mesh)))?;

        let pipeline = match (request.style, mesh.strips) {
            (DrawStyle::Particle { .. }, _) => PARTICLE,
            (_, true) => LIT_STRIPS,
            (_, false) => LIT_LIST,
        };
        let offset = self
            .draw_bindings
            .uniforms
            .push(&DrawUniform::new(&request, &mesh.material));
        self.staged.push(StagedDraw {
            mesh: request.mesh,
            offset,
            pipeline,
        });
        Ok(())
    }

    fn present(&mut self) -> WorldResult<()> {
        let globals = self
            .globals
            .take()
            .ok_or_else(|| WorldError::render("present called without begin_frame"))?;

        self.frame_bindings
            .frame
            .update_content(&self.queue, FrameUniform::new(&globals, self.light_count));
        self.draw_bindings.flush(&self.device, &self.queue);

        let Some(surface_texture) = self.acquire_frame()? else {
            return Ok(());
        };
        let surface_view = surface_texture
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Frame Encoder"),
            });

        {
            let [r, g, b] = globals.clear_color.map(f64::from);
            let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("World Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &surface_view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color { r, g, b, a: 1.0 }),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &self.depth_texture.view,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                occlusion_query_set: None,
                timestamp_writes: None,
            });

            render_pass.set_bind_group(0, self.frame_bindings.bind_group(), &[]);

            let mut bound: Option<&'static str> = None;
            for draw in &self.staged {
                let Some(mesh) = self.meshes.get(&draw.mesh) else {
                    continue;
                };
                if bound != Some(draw.pipeline) {
                    let Some(pipeline) = self.pipeline_manager.get_pipeline(draw.pipeline) else {
                        log::error!("pipeline '{}' missing", draw.pipeline);
                        continue;
                    };
                    render_pass.set_pipeline(pipeline);
                    bound = Some(draw.pipeline);
                }

                render_pass.set_bind_group(1, self.draw_bindings.bind_group(), &[draw.offset]);
                render_pass.set_vertex_buffer(0, mesh.vertex_buffer.slice(..));
                render_pass.set_index_buffer(mesh.index_buffer.slice(..), wgpu::IndexFormat::Uint32);
                for range in &mesh.ranges {
                    render_pass.draw_indexed(range.clone(), 0, 0..1);
                }
            }
        }

        self.queue.submit(std::iter::once(encoder.finish()));
        surface_texture.present();
        Ok(())
    }
}
