//! Rendering system for the voxel world.
//!
//! This module contains the render pipeline, per-frame bind groups, meshing and the
//! two seams between CPU-side geometry and the graphics backend:
//!
//! - [`GpuUploader`]: stages byte ranges into device-local buffers
//! - [`CommandContext`]: records bind and draw commands
//!
//! Both are implemented for wgpu (see [`crate::engine_state::buffer_state`] and the
//! `RenderPass` impl below). Chunks and static meshes only ever talk to these traits.

use wgpu::{IndexFormat, RenderPass, ShaderStages};

use crate::error::UploadError;

pub mod bind_group_state;
pub mod gpu_mesh;
pub mod meshing;
pub mod pipeline_manager;
pub mod texture;
mod vertex;

#[cfg(test)]
pub mod recording;

pub use gpu_mesh::GpuMesh;
pub use vertex::Vertex;

/// Destination usage of a device-local buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BufferUsage {
    /// Bound as a vertex buffer.
    Vertex,
    /// Bound as a 32-bit index buffer.
    Index,
}

/// Creates device buffers and fills them through host-visible staging buffers.
pub trait GpuUploader {
    /// Backend buffer handle.
    type Buffer;

    /// Creates a host-visible buffer holding `contents`, usable as a copy source.
    fn create_staging_buffer(
        &mut self,
        label: &str,
        contents: &[u8],
    ) -> Result<Self::Buffer, UploadError>;

    /// Creates an uninitialised device-local buffer usable as a copy destination.
    fn create_device_buffer(
        &mut self,
        label: &str,
        size: u64,
        usage: BufferUsage,
    ) -> Result<Self::Buffer, UploadError>;

    /// Copies `size` bytes from the start of `source` to the start of `destination`.
    fn copy_buffer(
        &mut self,
        source: &Self::Buffer,
        destination: &Self::Buffer,
        size: u64,
    ) -> Result<(), UploadError>;

    /// Stages `element_count` elements of `element_size` bytes into a new device buffer.
    ///
    /// The staging buffer is released once the copy has been issued.
    ///
    /// # Returns
    /// The device-local buffer
    fn upload_static(
        &mut self,
        label: &str,
        bytes: &[u8],
        element_size: usize,
        element_count: usize,
        usage: BufferUsage,
    ) -> Result<Self::Buffer, UploadError> {
        let size = (element_size * element_count) as u64;
        debug_assert_eq!(size, bytes.len() as u64);

        let staging = self.create_staging_buffer(label, bytes)?;
        let device = self.create_device_buffer(label, size, usage)?;
        self.copy_buffer(&staging, &device, size)?;
        Ok(device)
    }
}

/// Records GPU commands against buffers of type `B`.
pub trait CommandContext<B> {
    /// Binds a vertex buffer to `slot`, starting at byte `offset`.
    fn bind_vertex_buffer(&mut self, slot: u32, buffer: &B, offset: u64);

    /// Binds a 32-bit index buffer, starting at byte `offset`.
    fn bind_index_buffer(&mut self, buffer: &B, offset: u64);

    /// Sets the per-object push constant block.
    fn push_object_constants(&mut self, data: &[u8]);

    /// Draws `index_count` indices from the bound index buffer.
    fn issue_draw_indexed(&mut self, index_count: u32, instance_count: u32);

    /// Draws `vertex_count` vertices from the bound vertex buffer.
    fn issue_draw(&mut self, vertex_count: u32, instance_count: u32);
}

impl CommandContext<wgpu::Buffer> for RenderPass<'_> {
    fn bind_vertex_buffer(&mut self, slot: u32, buffer: &wgpu::Buffer, offset: u64) {
        self.set_vertex_buffer(slot, buffer.slice(offset..));
    }

    fn bind_index_buffer(&mut self, buffer: &wgpu::Buffer, offset: u64) {
        self.set_index_buffer(buffer.slice(offset..), IndexFormat::Uint32);
    }

    fn push_object_constants(&mut self, data: &[u8]) {
        self.set_push_constants(ShaderStages::VERTEX_FRAGMENT, 0, data);
    }

    fn issue_draw_indexed(&mut self, index_count: u32, instance_count: u32) {
        self.draw_indexed(0..index_count, 0, 0..instance_count);
    }

    fn issue_draw(&mut self, vertex_count: u32, instance_count: u32) {
        self.draw(0..vertex_count, 0..instance_count);
    }
}
