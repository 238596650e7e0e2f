//! wgpu frame renderer.
//!
//! [`WgpuRenderer`] draws the list from [`collect_draw_list`] into an
//! offscreen color texture: opaque meshes first, then transparent meshes
//! back to front. The texture is published through a [`SharedTarget`] so a
//! UI layer (egui in the site viewer app) can show it.

pub mod gpu_resources;
pub mod mesh_cache;
pub mod pipeline;
pub mod uniforms;

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::Mutex;
use wgpu::util::DeviceExt;

use crate::camera::PerspectiveCamera;
use crate::frame::{DrawItem, FrameRenderer, collect_draw_list};
use crate::light::LightUniform;
use crate::scene::SceneGraph;

use gpu_resources::{
    create_color_texture, create_depth_texture, create_draw_bind_group, create_draw_bind_group_layout,
    create_draw_buffer, create_frame_bind_group, create_frame_bind_group_layout,
};
use mesh_cache::MeshCache;
use pipeline::{PipelineKey, create_mesh_pipeline};
use uniforms::{CameraUniform, DrawUniform, aligned_stride};

/// Color texture holding the most recent frame.
pub struct RenderTarget {
    pub view: Arc<wgpu::TextureView>,
    pub width: u32,
    pub height: u32,
}

/// Slot the renderer publishes its target into.
pub type SharedTarget = Arc<Mutex<Option<RenderTarget>>>;

struct FrameTextures {
    #[allow(dead_code)]
    color: wgpu::Texture,
    #[allow(dead_code)]
    depth: wgpu::Texture,
    depth_view: wgpu::TextureView,
    view: Arc<wgpu::TextureView>,
}

/// One resolved draw: pipeline, mesh and uniform slot.
struct PreparedDraw {
    key: PipelineKey,
    item: DrawItem,
    slot: u32,
}

/// Renders a [`SceneGraph`] with wgpu.
pub struct WgpuRenderer {
    device: Arc<wgpu::Device>,
    queue: Arc<wgpu::Queue>,
    format: wgpu::TextureFormat,

    shader: wgpu::ShaderModule,
    pipeline_layout: wgpu::PipelineLayout,
    pipelines: HashMap<PipelineKey, wgpu::RenderPipeline>,

    camera_buffer: wgpu::Buffer,
    light_buffer: wgpu::Buffer,
    frame_bind_group: wgpu::BindGroup,

    draw_layout: wgpu::BindGroupLayout,
    draw_stride: u64,
    draw_capacity: usize,
    draw_buffer: wgpu::Buffer,
    draw_bind_group: wgpu::BindGroup,

    meshes: MeshCache,
    textures: Option<FrameTextures>,
    target: SharedTarget,
    disposed: bool,
}

impl WgpuRenderer {
    pub fn new(device: Arc<wgpu::Device>, queue: Arc<wgpu::Queue>, format: wgpu::TextureFormat) -> Self {
        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Mesh Shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("../shaders/mesh.wgsl").into()),
        });

        let frame_layout = create_frame_bind_group_layout(&device);
        let draw_layout = create_draw_bind_group_layout(&device);
        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Mesh Pipeline Layout"),
            bind_group_layouts: &[&frame_layout, &draw_layout],
            push_constant_ranges: &[],
        });

        let camera_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Camera Buffer"),
            contents: bytemuck::cast_slice(&[CameraUniform::default()]),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });
        let light_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Light Buffer"),
            contents: bytemuck::cast_slice(&[LightUniform::from_lights(&[])]),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });
        let frame_bind_group = create_frame_bind_group(&device, &frame_layout, &camera_buffer, &light_buffer);

        let draw_stride = aligned_stride(
            std::mem::size_of::<DrawUniform>() as u64,
            u64::from(device.limits().min_uniform_buffer_offset_alignment),
        );
        let draw_capacity = 64;
        let draw_buffer = create_draw_buffer(&device, draw_stride, draw_capacity);
        let draw_bind_group = create_draw_bind_group(&device, &draw_layout, &draw_buffer);

        tracing::debug!(?format, draw_stride, "Created wgpu renderer");

        Self {
            device,
            queue,
            format,
            shader,
            pipeline_layout,
            pipelines: HashMap::new(),
            camera_buffer,
            light_buffer,
            frame_bind_group,
            draw_layout,
            draw_stride,
            draw_capacity,
            draw_buffer,
            draw_bind_group,
            meshes: MeshCache::new(),
            textures: None,
            target: Arc::new(Mutex::new(None)),
            disposed: false,
        }
    }

    /// Slot holding the color texture of the latest frame.
    pub fn target(&self) -> SharedTarget {
        self.target.clone()
    }

    pub fn format(&self) -> wgpu::TextureFormat {
        self.format
    }

    /// Number of meshes currently uploaded.
    pub fn cached_meshes(&self) -> usize {
        self.meshes.len()
    }

    fn ensure_draw_capacity(&mut self, count: usize) {
        if count <= self.draw_capacity {
            return;
        }
        let capacity = count.next_power_of_two();
        self.draw_buffer = create_draw_buffer(&self.device, self.draw_stride, capacity);
        self.draw_bind_group = create_draw_bind_group(&self.device, &self.draw_layout, &self.draw_buffer);
        self.draw_capacity = capacity;
        tracing::debug!(capacity, "Grew draw uniform buffer");
    }

    /// Resolves materials and meshes, uploads per-draw uniforms and builds
    /// any missing pipelines. Draws whose resources are gone are skipped.
    fn prepare(&mut self, scene: &SceneGraph, draws: &[DrawItem]) -> Vec<PreparedDraw> {
        self.meshes.prune(scene);
        self.meshes.prepare(&self.device, scene, draws.iter().map(|d| d.mesh));

        let mut prepared = Vec::with_capacity(draws.len());
        let mut uniforms = Vec::with_capacity(draws.len());
        for item in draws {
            let (Some(material), Some(mesh)) = (scene.material(item.material), self.meshes.get(item.mesh)) else {
                continue;
            };
            let key = PipelineKey::for_draw(item.pass, material, mesh.topology);
            uniforms.push(DrawUniform::new(item.model, material));
            prepared.push(PreparedDraw {
                key,
                item: *item,
                slot: prepared.len() as u32,
            });
        }

        self.ensure_draw_capacity(uniforms.len());
        let stride = self.draw_stride as usize;
        let mut bytes = vec![0u8; stride * uniforms.len()];
        for (chunk, uniform) in bytes.chunks_exact_mut(stride).zip(&uniforms) {
            chunk[..std::mem::size_of::<DrawUniform>()].copy_from_slice(bytemuck::bytes_of(uniform));
        }
        if !bytes.is_empty() {
            self.queue.write_buffer(&self.draw_buffer, 0, &bytes);
        }

        for draw in &prepared {
            if !self.pipelines.contains_key(&draw.key) {
                let pipeline =
                    create_mesh_pipeline(&self.device, &self.shader, &self.pipeline_layout, self.format, draw.key);
                self.pipelines.insert(draw.key, pipeline);
            }
        }
        prepared
    }

    fn publish_target(&mut self, width: u32, height: u32) {
        let (color, view) = create_color_texture(&self.device, self.format, width, height);
        let (depth, depth_view) = create_depth_texture(&self.device, width, height);
        let view = Arc::new(view);

        *self.target.lock() = Some(RenderTarget {
            view: view.clone(),
            width,
            height,
        });
        self.textures = Some(FrameTextures {
            color,
            depth,
            depth_view,
            view,
        });
    }
}

impl FrameRenderer for WgpuRenderer {
    fn render(&mut self, scene: &SceneGraph, camera: &PerspectiveCamera) {
        if self.disposed || self.textures.is_none() {
            return;
        }

        let draws = collect_draw_list(scene, camera);
        let prepared = self.prepare(scene, &draws);

        self.queue.write_buffer(
            &self.camera_buffer,
            0,
            bytemuck::cast_slice(&[CameraUniform::from_camera(camera)]),
        );
        self.queue.write_buffer(
            &self.light_buffer,
            0,
            bytemuck::cast_slice(&[LightUniform::from_lights(scene.lights())]),
        );

        let Some(textures) = self.textures.as_ref() else {
            return;
        };
        let [r, g, b, a] = scene.background();
        let mut encoder = self.device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("Scene Render Encoder"),
        });
        {
            let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Scene Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &textures.view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color {
                            r: f64::from(r),
                            g: f64::from(g),
                            b: f64::from(b),
                            a: f64::from(a),
                        }),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &textures.depth_view,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                timestamp_writes: None,
                occlusion_query_set: None,
            });

            pass.set_bind_group(0, &self.frame_bind_group, &[]);
            // Draw list order is already opaque first, transparent far to near
            for draw in &prepared {
                let (Some(pipeline), Some(mesh)) = (self.pipelines.get(&draw.key), self.meshes.get(draw.item.mesh))
                else {
                    continue;
                };
                let offset = (u64::from(draw.slot) * self.draw_stride) as u32;
                pass.set_pipeline(pipeline);
                pass.set_bind_group(1, &self.draw_bind_group, &[offset]);
                mesh.draw(&mut pass);
            }
        }
        self.queue.submit(std::iter::once(encoder.finish()));
        tracing::trace!(draws = prepared.len(), "Rendered frame");
    }

    fn resize(&mut self, width: u32, height: u32) {
        if self.disposed || width == 0 || height == 0 {
            return;
        }
        let unchanged = self
            .target
            .lock()
            .as_ref()
            .is_some_and(|t| t.width == width && t.height == height);
        if unchanged {
            return;
        }
        self.publish_target(width, height);
        tracing::debug!(width, height, "Resized render target");
    }

    fn dispose(&mut self) {
        if self.disposed {
            return;
        }
        self.disposed = true;
        self.meshes.clear();
        self.pipelines.clear();
        self.draw_buffer.destroy();
        self.camera_buffer.destroy();
        self.light_buffer.destroy();
        // The UI may still show the last frame; the texture is freed once it lets go
        self.textures = None;
        *self.target.lock() = None;
        tracing::debug!("Disposed wgpu renderer");
    }
}

impl Drop for WgpuRenderer {
    fn drop(&mut self) {
        self.dispose();
    }
}
