//! Meshing renderer module for the voxel world.
//!
//! # Architecture
//!
//! The meshing renderer is responsible for:
//! 1. Creating and managing its own render pipeline
//! 2. Binding the frame's global uniform at group 0
//! 3. Recording one draw per scene object through [`CommandContext`]
//!
//! Per-object transforms reach the shader as a push constant block
//! ([`ObjectPushConstants`]), so the pipeline layout declares a 128-byte push
//! constant range visible to both stages.
//!
//! [`CommandContext`]: crate::engine_state::rendering::CommandContext

use wgpu::{BindGroup, BindGroupLayout, Device, RenderPass, RenderPipeline, TextureFormat};

use crate::{
    engine_state::{
        rendering::Vertex,
        voxels::world::{ObjectPushConstants, World},
    },
    error::ChunkError,
};

/// Size of the per-object push constant block in bytes.
pub const OBJECT_PUSH_CONSTANT_SIZE: u32 = std::mem::size_of::<ObjectPushConstants>() as u32;

/// Renders the scene's meshes.
pub struct MeshingRenderer {
    /// The WebGPU render pipeline for mesh rendering
    render_pipeline: RenderPipeline,
}

impl MeshingRenderer {
    /// Creates a new `MeshingRenderer` instance.
    ///
    /// # Arguments
    /// * `device` - The WebGPU device
    /// * `shader_string` - The WGSL shader source code
    /// * `texture_format` - The color target format
    /// * `global_bind_group_layout` - Layout of the per-frame uniform at group 0
    /// * `depth_stencil` - Optional depth stencil state
    pub fn new(
        device: &Device,
        shader_string: &str,
        texture_format: TextureFormat,
        global_bind_group_layout: &BindGroupLayout,
        depth_stencil: Option<wgpu::DepthStencilState>,
    ) -> Self {
        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Mesh Render Pipeline Layout"),
            bind_group_layouts: &[global_bind_group_layout],
            push_constant_ranges: &[wgpu::PushConstantRange {
                stages: wgpu::ShaderStages::VERTEX_FRAGMENT,
                range: 0..OBJECT_PUSH_CONSTANT_SIZE,
            }],
        });

        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Mesh Shader"),
            source: wgpu::ShaderSource::Wgsl(shader_string.into()),
        });

        let render_pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("Mesh Render Pipeline"),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: Some("vs_main"),
                compilation_options: Default::default(),
                buffers: &[Vertex::desc()],
            },
            fragment: Some(wgpu::FragmentState {
                module: &shader,
                entry_point: Some("fs_main"),
                compilation_options: Default::default(),
                targets: &[Some(wgpu::ColorTargetState {
                    format: texture_format,
                    blend: Some(wgpu::BlendState::REPLACE),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
            }),
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                strip_index_format: None,
                front_face: wgpu::FrontFace::Ccw,
                cull_mode: Some(wgpu::Face::Back),
                polygon_mode: wgpu::PolygonMode::Fill,
                unclipped_depth: false,
                conservative: false,
            },
            depth_stencil,
            multisample: Default::default(),
            multiview: None,
            cache: None,
        });

        Self { render_pipeline }
    }

    /// Records the pipeline, the frame's global bind group and every object's draw.
    ///
    /// # Errors
    /// The first chunk in the world that is not drawable.
    pub fn render(
        &self,
        render_pass: &mut RenderPass<'_>,
        global_bind_group: &BindGroup,
        world: &World<wgpu::Buffer>,
    ) -> Result<(), ChunkError> {
        render_pass.set_pipeline(&self.render_pipeline);
        render_pass.set_bind_group(0, global_bind_group, &[]);
        world.draw_all(render_pass)
    }
}
