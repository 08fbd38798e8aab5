//! A device-free backend that records uploads and commands, for tests.

use super::{BufferUsage, CommandContext, GpuUploader};
use crate::error::UploadError;

/// Handle to a recorded buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FakeBuffer {
    /// Creation order, starting at 0
    pub id: usize,
}

/// What a recorded buffer was created for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FakeBufferKind {
    /// Host-visible copy source
    Staging,
    /// Device-local copy destination
    Device(BufferUsage),
}

/// A recorded buffer and its bytes.
#[derive(Debug, Clone)]
pub struct FakeBufferRecord {
    /// Label given at creation
    pub label: String,
    /// Staging or device buffer
    pub kind: FakeBufferKind,
    /// Current contents
    pub contents: Vec<u8>,
}

/// Records every buffer and copy, and simulates copies in memory.
#[derive(Debug, Default)]
pub struct RecordingUploader {
    /// Every buffer created, indexed by [`FakeBuffer::id`]
    pub buffers: Vec<FakeBufferRecord>,
    /// Every copy as `(source, destination, size)`
    pub copies: Vec<(usize, usize, u64)>,
    failing_labels: Vec<String>,
    fail_copies: bool,
}

impl RecordingUploader {
    /// An uploader with no buffers.
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes device buffer creation fail for `label`.
    pub fn fail_buffer_creation_for(&mut self, label: &str) {
        self.failing_labels.push(label.to_owned());
    }

    /// Makes every copy fail.
    pub fn fail_copies(&mut self) {
        self.fail_copies = true;
    }

    /// Id of the device buffer created with `label`.
    pub fn device_buffer_id(&self, label: &str) -> Option<usize> {
        self.buffers.iter().position(|record| {
            record.label == label && matches!(record.kind, FakeBufferKind::Device(_))
        })
    }

    /// Contents of buffer `id`.
    pub fn contents(&self, id: usize) -> Option<&[u8]> {
        self.buffers.get(id).map(|record| record.contents.as_slice())
    }

    /// Number of device buffers created.
    pub fn device_buffer_count(&self) -> usize {
        self.buffers
            .iter()
            .filter(|record| matches!(record.kind, FakeBufferKind::Device(_)))
            .count()
    }

    fn push(&mut self, label: &str, kind: FakeBufferKind, contents: Vec<u8>) -> FakeBuffer {
        self.buffers.push(FakeBufferRecord {
            label: label.to_owned(),
            kind,
            contents,
        });
        FakeBuffer {
            id: self.buffers.len() - 1,
        }
    }
}

impl GpuUploader for RecordingUploader {
    type Buffer = FakeBuffer;

    fn create_staging_buffer(
        &mut self,
        label: &str,
        contents: &[u8],
    ) -> Result<FakeBuffer, UploadError> {
        Ok(self.push(label, FakeBufferKind::Staging, contents.to_vec()))
    }

    fn create_device_buffer(
        &mut self,
        label: &str,
        size: u64,
        usage: BufferUsage,
    ) -> Result<FakeBuffer, UploadError> {
        if self.failing_labels.iter().any(|failing| failing == label) {
            return Err(UploadError::BufferCreation {
                label: label.to_owned(),
                reason: "injected failure".to_owned(),
            });
        }
        Ok(self.push(label, FakeBufferKind::Device(usage), vec![0; size as usize]))
    }

    fn copy_buffer(
        &mut self,
        source: &FakeBuffer,
        destination: &FakeBuffer,
        size: u64,
    ) -> Result<(), UploadError> {
        if self.fail_copies {
            return Err(UploadError::BufferCopy {
                size,
                reason: "injected failure".to_owned(),
            });
        }
        let bytes = self.buffers[source.id].contents[..size as usize].to_vec();
        self.buffers[destination.id].contents[..size as usize].copy_from_slice(&bytes);
        self.copies.push((source.id, destination.id, size));
        Ok(())
    }
}

/// A command recorded by [`RecordingContext`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordedCommand {
    /// `bind_vertex_buffer`
    BindVertexBuffer {
        /// Vertex buffer slot
        slot: u32,
        /// Buffer id
        buffer: usize,
        /// Byte offset
        offset: u64,
    },
    /// `bind_index_buffer`
    BindIndexBuffer {
        /// Buffer id
        buffer: usize,
        /// Byte offset
        offset: u64,
    },
    /// `push_object_constants`
    PushConstants(Vec<u8>),
    /// `issue_draw_indexed`
    DrawIndexed {
        /// Index count
        index_count: u32,
        /// Instance count
        instance_count: u32,
    },
    /// `issue_draw`
    Draw {
        /// Vertex count
        vertex_count: u32,
        /// Instance count
        instance_count: u32,
    },
}

/// Records commands in issue order.
#[derive(Debug, Default)]
pub struct RecordingContext {
    /// Commands recorded so far
    pub commands: Vec<RecordedCommand>,
}

impl RecordingContext {
    /// An empty recording.
    pub fn new() -> Self {
        Self::default()
    }

    /// Only the draw commands, in order.
    pub fn draws(&self) -> Vec<&RecordedCommand> {
        self.commands
            .iter()
            .filter(|command| {
                matches!(
                    command,
                    RecordedCommand::Draw { .. } | RecordedCommand::DrawIndexed { .. }
                )
            })
            .collect()
    }
}

impl CommandContext<FakeBuffer> for RecordingContext {
    fn bind_vertex_buffer(&mut self, slot: u32, buffer: &FakeBuffer, offset: u64) {
        self.commands.push(RecordedCommand::BindVertexBuffer {
            slot,
            buffer: buffer.id,
            offset,
        });
    }

    fn bind_index_buffer(&mut self, buffer: &FakeBuffer, offset: u64) {
        self.commands.push(RecordedCommand::BindIndexBuffer {
            buffer: buffer.id,
            offset,
        });
    }

    fn push_object_constants(&mut self, data: &[u8]) {
        self.commands.push(RecordedCommand::PushConstants(data.to_vec()));
    }

    fn issue_draw_indexed(&mut self, index_count: u32, instance_count: u32) {
        self.commands.push(RecordedCommand::DrawIndexed {
            index_count,
            instance_count,
        });
    }

    fn issue_draw(&mut self, vertex_count: u32, instance_count: u32) {
        self.commands.push(RecordedCommand::Draw {
            vertex_count,
            instance_count,
        });
    }
}
