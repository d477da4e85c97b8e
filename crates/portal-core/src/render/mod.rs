//! wgpu renderer for the diorama: baked and lamp meshes, the portal surface
//! and the additive firefly sprites, drawn in that order into one pass.

mod pipelines;
mod uniforms;

use anyhow::anyhow;
use glam::Vec3;
use wgpu::util::DeviceExt;

use crate::constants::BAKED_TINT;
use crate::fireflies::Firefly;
use crate::frame::{FrameSink, FrameState};
use crate::scene::{Material, SceneGraph};
use pipelines::{PipelineDesc, ADDITIVE};
use uniforms::{FireflyGpu, MeshGpu, PortalGpu};

struct GpuMesh {
    vertex_buffer: wgpu::Buffer,
    index_buffer: wgpu::Buffer,
    index_count: u32,
    material: Material,
}

struct UniformSlot {
    buffer: wgpu::Buffer,
    bind_group: wgpu::BindGroup,
}

pub struct Renderer<'w> {
    surface: wgpu::Surface<'w>,
    device: wgpu::Device,
    queue: wgpu::Queue,
    config: wgpu::SurfaceConfiguration,
    #[allow(dead_code)]
    depth_tex: wgpu::Texture,
    depth_view: wgpu::TextureView,
    mesh_pipeline: wgpu::RenderPipeline,
    portal_pipeline: wgpu::RenderPipeline,
    firefly_pipeline: wgpu::RenderPipeline,
    baked: UniformSlot,
    lamp: UniformSlot,
    portal: UniformSlot,
    flies: UniformSlot,
    quad_vb: wgpu::Buffer,
    firefly_vb: Option<(wgpu::Buffer, u32)>,
    meshes: Vec<GpuMesh>,
}

impl<'w> Renderer<'w> {
    /// Creates the device for `surface` and builds all pipelines. `width` and
    /// `height` are the backing-store size in device pixels.
    pub async fn new(
        instance: &wgpu::Instance,
        surface: wgpu::Surface<'w>,
        width: u32,
        height: u32,
    ) -> anyhow::Result<Self> {
        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::HighPerformance,
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .ok_or_else(|| anyhow!("No GPU adapter"))?;
        let (device, queue) = adapter
            .request_device(
                &wgpu::DeviceDescriptor {
                    required_features: wgpu::Features::empty(),
                    required_limits: wgpu::Limits::default(),
                    memory_hints: wgpu::MemoryHints::Performance,
                    label: None,
                },
                None,
            )
            .await
            .map_err(|e| anyhow!("request_device error: {e:?}"))?;

        let caps = surface.get_capabilities(&adapter);
        // Colours are stored as plain hex/255 values, so write them unconverted.
        let format = caps
            .formats
            .iter()
            .copied()
            .find(|f| !f.is_srgb())
            .or_else(|| caps.formats.first().copied())
            .ok_or_else(|| anyhow!("surface reports no formats"))?;
        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format,
            width: width.max(1),
            height: height.max(1),
            present_mode: wgpu::PresentMode::Fifo,
            alpha_mode: caps.alpha_modes[0],
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &config);
        let (depth_tex, depth_view) = pipelines::create_depth(&device, config.width, config.height);

        let layout = pipelines::uniform_layout(&device, "uniforms_bgl");
        let pl = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("pl"),
            bind_group_layouts: &[&layout],
            push_constant_ranges: &[],
        });

        let mesh_shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("mesh_shader"),
            source: wgpu::ShaderSource::Wgsl(crate::MESH_WGSL.into()),
        });
        let portal_source = format!("{}\n{}", crate::NOISE_WGSL, crate::PORTAL_WGSL);
        let portal_shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("portal_shader"),
            source: wgpu::ShaderSource::Wgsl(portal_source.into()),
        });
        let firefly_shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("firefly_shader"),
            source: wgpu::ShaderSource::Wgsl(crate::FIREFLIES_WGSL.into()),
        });

        let mesh_buffers = [pipelines::mesh_vertex_layout()];
        let mesh_pipeline = pipelines::make_pipeline(
            &device,
            &PipelineDesc {
                label: "mesh_pipeline",
                shader: &mesh_shader,
                layout: &pl,
                buffers: &mesh_buffers,
                format,
                blend: Some(wgpu::BlendState::REPLACE),
                depth_tested: true,
            },
        );
        let portal_pipeline = pipelines::make_pipeline(
            &device,
            &PipelineDesc {
                label: "portal_pipeline",
                shader: &portal_shader,
                layout: &pl,
                buffers: &mesh_buffers,
                format,
                blend: Some(wgpu::BlendState::REPLACE),
                depth_tested: true,
            },
        );
        let firefly_buffers = pipelines::firefly_vertex_layouts();
        let firefly_pipeline = pipelines::make_pipeline(
            &device,
            &PipelineDesc {
                label: "firefly_pipeline",
                shader: &firefly_shader,
                layout: &pl,
                buffers: &firefly_buffers,
                format,
                blend: Some(ADDITIVE),
                depth_tested: false,
            },
        );

        let slot = |label: &str, size: usize| {
            let (buffer, bind_group) = pipelines::uniform_binding(&device, label, &layout, size);
            UniformSlot { buffer, bind_group }
        };
        let baked = slot("baked_uniforms", std::mem::size_of::<MeshGpu>());
        let lamp = slot("lamp_uniforms", std::mem::size_of::<MeshGpu>());
        let portal = slot("portal_uniforms", std::mem::size_of::<PortalGpu>());
        let flies = slot("firefly_uniforms", std::mem::size_of::<FireflyGpu>());

        // Two triangles spanning [-0.5, 0.5]²
        let quad_vertices: [f32; 12] = [
            -0.5, -0.5, 0.5, -0.5, 0.5, 0.5, -0.5, -0.5, 0.5, 0.5, -0.5, 0.5,
        ];
        let quad_vb = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("quad_vb"),
            contents: bytemuck::cast_slice(&quad_vertices),
            usage: wgpu::BufferUsages::VERTEX,
        });

        log::info!("[gpu] surface {:?} {}x{}", format, config.width, config.height);
        Ok(Self {
            surface,
            device,
            queue,
            config,
            depth_tex,
            depth_view,
            mesh_pipeline,
            portal_pipeline,
            firefly_pipeline,
            baked,
            lamp,
            portal,
            flies,
            quad_vb,
            firefly_vb: None,
            meshes: Vec::new(),
        })
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        if width == 0 || height == 0 {
            return;
        }
        if width == self.config.width && height == self.config.height {
            return;
        }
        self.config.width = width;
        self.config.height = height;
        self.surface.configure(&self.device, &self.config);
        let (depth_tex, depth_view) = pipelines::create_depth(&self.device, width, height);
        self.depth_tex = depth_tex;
        self.depth_view = depth_view;
    }

    /// Reconfigures the surface at its current size, after `Lost`/`Outdated`.
    pub fn reconfigure(&mut self) {
        self.surface.configure(&self.device, &self.config);
    }

    pub fn upload_scene(&mut self, scene: &SceneGraph) {
        self.meshes = scene
            .nodes
            .iter()
            .filter(|n| !n.indices.is_empty())
            .map(|n| GpuMesh {
                vertex_buffer: self.device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                    label: Some(n.name.as_str()),
                    contents: bytemuck::cast_slice(&n.vertices),
                    usage: wgpu::BufferUsages::VERTEX,
                }),
                index_buffer: self.device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                    label: Some(n.name.as_str()),
                    contents: bytemuck::cast_slice(&n.indices),
                    usage: wgpu::BufferUsages::INDEX,
                }),
                index_count: n.indices.len() as u32,
                material: n.material,
            })
            .collect();
        log::info!("[gpu] uploaded {} meshes", self.meshes.len());
    }

    pub fn upload_fireflies(&mut self, flies: &[Firefly]) {
        if flies.is_empty() {
            self.firefly_vb = None;
            return;
        }
        let vb = self.device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("firefly_vb"),
            contents: bytemuck::cast_slice(flies),
            usage: wgpu::BufferUsages::VERTEX,
        });
        self.firefly_vb = Some((vb, flies.len() as u32));
    }

    fn write_uniforms(&self, frame: &FrameState) {
        let view = frame.camera.view_matrix();
        let proj = frame.camera.projection_matrix();
        let view_proj = proj * view;
        let model = frame.scene_transform.model_matrix();

        let baked = MeshGpu::new(view_proj, model, Vec3::from(BAKED_TINT), true);
        let lamp = MeshGpu::new(view_proj, model, frame.lamp_color, false);
        let portal = PortalGpu::new(view_proj, model, &frame.uniforms.portal);
        let flies = FireflyGpu::new(
            view,
            proj,
            [self.config.width as f32, self.config.height as f32],
            &frame.uniforms.fireflies,
        );
        self.queue
            .write_buffer(&self.baked.buffer, 0, bytemuck::bytes_of(&baked));
        self.queue
            .write_buffer(&self.lamp.buffer, 0, bytemuck::bytes_of(&lamp));
        self.queue
            .write_buffer(&self.portal.buffer, 0, bytemuck::bytes_of(&portal));
        self.queue
            .write_buffer(&self.flies.buffer, 0, bytemuck::bytes_of(&flies));
    }

    pub fn render(&mut self, frame: &FrameState) -> Result<(), wgpu::SurfaceError> {
        self.write_uniforms(frame);

        let output = self.surface.get_current_texture()?;
        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());
        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("encoder"),
            });
        {
            let c = frame.clear_color;
            let mut rpass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("scene_pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color {
                            r: c.x as f64,
                            g: c.y as f64,
                            b: c.z as f64,
                            a: 1.0,
                        }),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &self.depth_view,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                timestamp_writes: None,
                occlusion_query_set: None,
            });

            for mesh in &self.meshes {
                let (pipeline, slot) = match mesh.material {
                    Material::Baked => (&self.mesh_pipeline, &self.baked),
                    Material::LampLight => (&self.mesh_pipeline, &self.lamp),
                    Material::PortalLights => (&self.portal_pipeline, &self.portal),
                };
                rpass.set_pipeline(pipeline);
                rpass.set_bind_group(0, &slot.bind_group, &[]);
                rpass.set_vertex_buffer(0, mesh.vertex_buffer.slice(..));
                rpass.set_index_buffer(mesh.index_buffer.slice(..), wgpu::IndexFormat::Uint32);
                rpass.draw_indexed(0..mesh.index_count, 0, 0..1);
            }

            if let Some((vb, count)) = &self.firefly_vb {
                rpass.set_pipeline(&self.firefly_pipeline);
                rpass.set_bind_group(0, &self.flies.bind_group, &[]);
                rpass.set_vertex_buffer(0, self.quad_vb.slice(..));
                rpass.set_vertex_buffer(1, vb.slice(..));
                rpass.draw(0..6, 0..*count);
            }
        }
        self.queue.submit(Some(encoder.finish()));
        output.present();
        Ok(())
    }
}

impl FrameSink for Renderer<'_> {
    type Error = wgpu::SurfaceError;

    fn upload_scene(&mut self, scene: &SceneGraph) -> Result<(), Self::Error> {
        Renderer::upload_scene(self, scene);
        Ok(())
    }

    fn draw(&mut self, frame: &FrameState) -> Result<(), Self::Error> {
        self.render(frame)
    }
}
