//! Device-resident mesh buffers.
//!
//! A [`GpuMesh`] is the uploaded form of a [`Mesh`]: a mandatory vertex buffer and an
//! optional index buffer. Meshes without indices are drawn non-indexed over their
//! whole vertex range.

use log::debug;

use super::{meshing::mesh::Mesh, BufferUsage, CommandContext, GpuUploader, Vertex};
use crate::error::ChunkError;

/// Minimum number of vertices needed to form a triangle.
pub const MIN_VERTEX_COUNT: usize = 3;

/// Uploaded vertex and index buffers of one mesh.
#[derive(Debug)]
pub struct GpuMesh<B> {
    vertex_buffer: B,
    vertex_count: u32,
    index_buffer: Option<B>,
    index_count: u32,
}

impl<B> GpuMesh<B> {
    /// Stages a mesh into device-local buffers.
    ///
    /// The vertex buffer is always created. The index buffer is created only when
    /// the mesh has indices.
    ///
    /// # Arguments
    /// * `uploader` - The backend performing the staging copies
    /// * `label` - Debug label prefix for the created buffers
    /// * `mesh` - The geometry to upload
    ///
    /// # Errors
    /// * [`ChunkError::InsufficientGeometry`] if the mesh has fewer than 3 vertices
    /// * [`ChunkError::UploadFailure`] if the backend fails
    pub fn upload<U>(uploader: &mut U, label: &str, mesh: &Mesh) -> Result<Self, ChunkError>
    where
        U: GpuUploader<Buffer = B>,
    {
        let vertex_count = mesh.vertex_count();
        if vertex_count < MIN_VERTEX_COUNT {
            return Err(ChunkError::InsufficientGeometry { vertex_count });
        }

        let vertex_buffer = uploader.upload_static(
            &format!("{label} vertices"),
            bytemuck::cast_slice(&mesh.vertices),
            std::mem::size_of::<Vertex>(),
            vertex_count,
            BufferUsage::Vertex,
        )?;

        let index_buffer = if mesh.indices.is_empty() {
            None
        } else {
            Some(uploader.upload_static(
                &format!("{label} indices"),
                bytemuck::cast_slice(&mesh.indices),
                std::mem::size_of::<u32>(),
                mesh.index_count(),
                BufferUsage::Index,
            )?)
        };

        debug!(
            "Uploaded '{}': {} vertices, {} indices",
            label,
            vertex_count,
            mesh.index_count()
        );

        Ok(Self {
            vertex_buffer,
            vertex_count: vertex_count as u32,
            index_buffer,
            index_count: mesh.index_count() as u32,
        })
    }

    /// Binds the vertex buffer at slot 0 and the index buffer if there is one.
    pub fn bind<C>(&self, context: &mut C)
    where
        C: CommandContext<B> + ?Sized,
    {
        context.bind_vertex_buffer(0, &self.vertex_buffer, 0);
        if let Some(index_buffer) = &self.index_buffer {
            context.bind_index_buffer(index_buffer, 0);
        }
    }

    /// Records one draw: indexed if an index buffer exists, otherwise over all vertices.
    pub fn draw<C>(&self, context: &mut C)
    where
        C: CommandContext<B> + ?Sized,
    {
        if self.is_indexed() {
            context.issue_draw_indexed(self.index_count, 1);
        } else {
            context.issue_draw(self.vertex_count, 1);
        }
    }

    /// Whether draws use the index buffer.
    pub fn is_indexed(&self) -> bool {
        self.index_buffer.is_some()
    }

    /// Number of uploaded vertices.
    #[cfg(test)]
    pub fn vertex_count(&self) -> u32 {
        self.vertex_count
    }

    /// Number of uploaded indices, zero when not indexed.
    #[cfg(test)]
    pub fn index_count(&self) -> u32 {
        self.index_count
    }
}
