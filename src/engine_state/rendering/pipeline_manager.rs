//! Manages the WebGPU render pipeline and associated rendering resources.
//!
//! # Architecture
//!
//! - `PipelineManager`: Owns the frame's shared resources and records the render pass
//! - `MeshingRenderer`: Owns the mesh pipeline and draws the scene
//! - `BindGroupState`: Per-frame global uniform buffers and bind groups
//!
//! # Resource Management
//!
//! The depth texture tracks the surface size and is recreated on resize. Uniform
//! buffers are allocated once, one per frame in flight.

use wgpu::{CommandEncoder, Device, Queue, SurfaceConfiguration, TextureFormat, TextureView};

use super::{bind_group_state::BindGroupState, meshing::MeshingRenderer, texture};
use crate::{
    engine_state::{camera_state::camera::GlobalUniform, voxels::world::World},
    error::ChunkError,
};

/// Debug label of the depth texture
const DEPTH_TEXTURE_LABEL: &str = "DEPTH TEXTURE";

/// Background color of the frame
const CLEAR_COLOR: wgpu::Color = wgpu::Color {
    r: 0.01,
    g: 0.01,
    b: 0.01,
    a: 1.0,
};

/// Coordinates the per-frame rendering resources and the render pass.
pub struct PipelineManager {
    /// Per-frame global uniforms and their bind groups
    pub bind_group_state: BindGroupState,
    /// Depth texture used for depth testing
    pub depth_texture: texture::Texture,
    /// Meshing renderer for voxel and static meshes
    pub meshing_renderer: MeshingRenderer,
}

impl PipelineManager {
    /// Creates a new `PipelineManager` instance.
    ///
    /// # Arguments
    /// * `device` - The WebGPU device
    /// * `config` - Surface configuration containing size
    /// * `texture_format` - The color target format
    /// * `shader_string` - The WGSL shader source code for mesh rendering
    pub fn new(
        device: &Device,
        config: &SurfaceConfiguration,
        texture_format: TextureFormat,
        shader_string: &str,
    ) -> Self {
        let bind_group_state = BindGroupState::new(device);
        let depth_texture =
            texture::Texture::create_depth_texture(device, config, DEPTH_TEXTURE_LABEL);

        let depth_stencil = Some(wgpu::DepthStencilState {
            format: texture::Texture::DEPTH_FORMAT,
            depth_write_enabled: true,
            depth_compare: wgpu::CompareFunction::Less,
            stencil: wgpu::StencilState::default(),
            bias: wgpu::DepthBiasState::default(),
        });

        let meshing_renderer = MeshingRenderer::new(
            device,
            shader_string,
            texture_format,
            bind_group_state.global_bind_group_layout(),
            depth_stencil,
        );

        Self {
            bind_group_state,
            depth_texture,
            meshing_renderer,
        }
    }

    /// Records one frame into `encoder`.
    ///
    /// Writes the frame's uniform, then clears color and depth and draws the world.
    ///
    /// # Arguments
    /// * `encoder` - The frame's command encoder
    /// * `queue` - The WebGPU queue, for the uniform write
    /// * `view` - The swap chain image view
    /// * `frame_index` - Selects the frame-in-flight uniform slot
    /// * `uniform` - This frame's global uniform
    /// * `world` - The scene to draw
    ///
    /// # Errors
    /// The first chunk in the world that is not drawable.
    pub fn render(
        &self,
        encoder: &mut CommandEncoder,
        queue: &Queue,
        view: &TextureView,
        frame_index: usize,
        uniform: &GlobalUniform,
        world: &World<wgpu::Buffer>,
    ) -> Result<(), ChunkError> {
        self.bind_group_state
            .write_global_uniform(queue, frame_index, uniform);

        let depth_stencil_attachment = Some(wgpu::RenderPassDepthStencilAttachment {
            view: &self.depth_texture.view,
            depth_ops: Some(wgpu::Operations {
                load: wgpu::LoadOp::Clear(1.0),
                store: wgpu::StoreOp::Store,
            }),
            stencil_ops: None,
        });
        let mut rpass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("World Render Pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Clear(CLEAR_COLOR),
                    store: wgpu::StoreOp::Store,
                },
            })],
            depth_stencil_attachment,
            ..Default::default()
        });

        self.meshing_renderer.render(
            &mut rpass,
            self.bind_group_state.global_bind_group(frame_index),
            world,
        )
    }

    /// Handles window resize events by recreating the depth texture.
    ///
    /// # Arguments
    /// * `device` - The WebGPU device
    /// * `config` - The new surface configuration containing the updated size
    pub fn resize(&mut self, device: &Device, config: &SurfaceConfiguration) {
        self.depth_texture =
            texture::Texture::create_depth_texture(device, config, DEPTH_TEXTURE_LABEL);
    }
}
