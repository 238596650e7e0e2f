//! Mesh pipeline variants.

use crate::frame::PassType;
use crate::resources::{Material, MeshVertex, Topology};

use super::gpu_resources::DEPTH_FORMAT;

impl MeshVertex {
    const ATTRIBUTES: [wgpu::VertexAttribute; 2] = wgpu::vertex_attr_array![0 => Float32x3, 1 => Float32x3];

    /// Vertex buffer layout: position (location 0) and normal (location 1).
    pub fn layout() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<MeshVertex>() as u64,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &Self::ATTRIBUTES,
        }
    }
}

/// Fixed-function state that differs between draws.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PipelineKey {
    pub topology: Topology,
    pub blend: bool,
    pub depth_write: bool,
    pub cull_back: bool,
}

impl PipelineKey {
    /// State for drawing a mesh of `topology` with `material` in `pass`.
    pub fn for_draw(pass: PassType, material: &Material, topology: Topology) -> Self {
        Self {
            topology,
            blend: pass == PassType::Transparent,
            depth_write: pass.writes_depth() && material.depth_write,
            cull_back: topology == Topology::TriangleList && !material.double_sided,
        }
    }

    fn label(&self) -> &'static str {
        match (self.topology, self.blend) {
            (Topology::LineList, _) => "Line Pipeline",
            (Topology::TriangleList, false) => "Opaque Mesh Pipeline",
            (Topology::TriangleList, true) => "Transparent Mesh Pipeline",
        }
    }
}

pub fn create_mesh_pipeline(
    device: &wgpu::Device,
    shader: &wgpu::ShaderModule,
    layout: &wgpu::PipelineLayout,
    format: wgpu::TextureFormat,
    key: PipelineKey,
) -> wgpu::RenderPipeline {
    device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
        label: Some(key.label()),
        layout: Some(layout),
        vertex: wgpu::VertexState {
            module: shader,
            entry_point: Some("vs_main"),
            buffers: &[MeshVertex::layout()],
            compilation_options: wgpu::PipelineCompilationOptions::default(),
        },
        fragment: Some(wgpu::FragmentState {
            module: shader,
            entry_point: Some("fs_main"),
            targets: &[Some(wgpu::ColorTargetState {
                format,
                blend: key.blend.then_some(wgpu::BlendState::ALPHA_BLENDING),
                write_mask: wgpu::ColorWrites::ALL,
            })],
            compilation_options: wgpu::PipelineCompilationOptions::default(),
        }),
        primitive: wgpu::PrimitiveState {
            topology: match key.topology {
                Topology::TriangleList => wgpu::PrimitiveTopology::TriangleList,
                Topology::LineList => wgpu::PrimitiveTopology::LineList,
            },
            front_face: wgpu::FrontFace::Ccw,
            cull_mode: key.cull_back.then_some(wgpu::Face::Back),
            ..Default::default()
        },
        depth_stencil: Some(wgpu::DepthStencilState {
            format: DEPTH_FORMAT,
            depth_write_enabled: key.depth_write,
            depth_compare: wgpu::CompareFunction::LessEqual,
            stencil: wgpu::StencilState::default(),
            bias: wgpu::DepthBiasState::default(),
        }),
        multisample: wgpu::MultisampleState::default(),
        multiview: None,
        cache: None,
    })
}
