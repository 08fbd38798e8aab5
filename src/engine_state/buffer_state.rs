//! # Buffer State Module
//!
//! The wgpu implementation of [`GpuUploader`]: creates staging and device-local
//! buffers, records staging-to-device copies, and keeps allocation analytics.
//!
//! ## Architecture
//!
//! `BufferState` borrows the device and queue for the duration of world loading.
//! Every buffer creation and copy runs inside an out-of-memory and a validation
//! error scope, so device failures come back as [`UploadError`] values instead of
//! reaching wgpu's uncaptured error handler.
//!
//! ## Performance Considerations
//!
//! * Each copy is submitted on its own encoder; uploads only happen at load time
//! * Staging buffers are dropped as soon as their copy is submitted and are freed
//!   once the queue has consumed them

use std::collections::HashMap;

use log::debug;
use wgpu::{util::DeviceExt, Buffer, BufferUsages, Device, ErrorFilter, Queue};

use crate::{
    engine_state::rendering::{BufferUsage, GpuUploader},
    error::UploadError,
};

/// Analytics data for the buffers created under one label.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct BufferAnalytics {
    /// Device-local memory allocated in bytes
    pub allocated_memory: u64,
    /// Bytes staged for upload
    pub used_memory: u64,
    /// Number of staging writes
    pub times_written: u64,
}

/// Uploads static geometry through wgpu.
pub struct BufferState<'a> {
    device: &'a Device,
    queue: &'a Queue,
    buffer_analytics: HashMap<String, BufferAnalytics>,
    copied_bytes: u64,
}

impl<'a> BufferState<'a> {
    /// Creates an uploader over `device` and `queue`.
    pub fn new(device: &'a Device, queue: &'a Queue) -> Self {
        Self {
            device,
            queue,
            buffer_analytics: HashMap::new(),
            copied_bytes: 0,
        }
    }

    /// Analytics for one label.
    /// Gets the total device-local memory allocated across all buffers.
    pub fn get_total_allocated_memory(&self) -> u64 {
        self.buffer_analytics
            .values()
            .fold(0, |acc, analytics| acc + analytics.allocated_memory)
    }

    /// Gets the total bytes staged across all buffers.
    pub fn get_total_used_memory(&self) -> u64 {
        self.buffer_analytics
            .values()
            .fold(0, |acc, analytics| acc + analytics.used_memory)
    }

    /// Gets the total bytes copied to device-local buffers.
    pub fn get_total_copied_memory(&self) -> u64 {
        self.copied_bytes
    }

    /// Runs `operation` inside out-of-memory and validation error scopes.
    fn scoped<T>(
        &self,
        operation: impl FnOnce(&Device, &Queue) -> T,
    ) -> (T, Option<wgpu::Error>) {
        self.device.push_error_scope(ErrorFilter::OutOfMemory);
        self.device.push_error_scope(ErrorFilter::Validation);

        let value = operation(self.device, self.queue);

        let validation = pollster::block_on(self.device.pop_error_scope());
        let out_of_memory = pollster::block_on(self.device.pop_error_scope());
        (value, validation.or(out_of_memory))
    }
}

impl GpuUploader for BufferState<'_> {
    type Buffer = Buffer;

    fn create_staging_buffer(
        &mut self,
        label: &str,
        contents: &[u8],
    ) -> Result<Buffer, UploadError> {
        let (buffer, error) = self.scoped(|device, _| {
            device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some(&format!("{label} staging")),
                contents,
                usage: BufferUsages::COPY_SRC,
            })
        });
        if let Some(error) = error {
            return Err(UploadError::BufferCreation {
                label: label.to_owned(),
                reason: error.to_string(),
            });
        }

        let analytics = self.buffer_analytics.entry(label.to_owned()).or_default();
        analytics.used_memory += contents.len() as u64;
        analytics.times_written += 1;
        debug!(
            "Staged {} bytes for '{}' (write {})",
            contents.len(),
            label,
            analytics.times_written
        );
        Ok(buffer)
    }

    fn create_device_buffer(
        &mut self,
        label: &str,
        size: u64,
        usage: BufferUsage,
    ) -> Result<Buffer, UploadError> {
        let (buffer, error) = self.scoped(|device, _| {
            device.create_buffer(&wgpu::BufferDescriptor {
                label: Some(label),
                size,
                usage: device_usages(usage),
                mapped_at_creation: false,
            })
        });
        if let Some(error) = error {
            return Err(UploadError::BufferCreation {
                label: label.to_owned(),
                reason: error.to_string(),
            });
        }

        self.buffer_analytics
            .entry(label.to_owned())
            .or_default()
            .allocated_memory += size;
        debug!("Allocated {} bytes for '{}'", size, label);
        Ok(buffer)
    }

    fn copy_buffer(
        &mut self,
        source: &Buffer,
        destination: &Buffer,
        size: u64,
    ) -> Result<(), UploadError> {
        check_copy_alignment(size)?;

        let ((), error) = self.scoped(|device, queue| {
            let mut encoder = device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Staging Copy Encoder"),
            });
            encoder.copy_buffer_to_buffer(source, 0, destination, 0, size);
            queue.submit(std::iter::once(encoder.finish()));
        });
        if let Some(error) = error {
            return Err(UploadError::BufferCopy {
                size,
                reason: error.to_string(),
            });
        }

        self.copied_bytes += size;
        Ok(())
    }
}

/// wgpu usages for a device-local buffer.
pub fn device_usages(usage: BufferUsage) -> BufferUsages {
    match usage {
        BufferUsage::Vertex => BufferUsages::VERTEX | BufferUsages::COPY_DST,
        BufferUsage::Index => BufferUsages::INDEX | BufferUsages::COPY_DST,
    }
}

/// Buffer copies must be a multiple of [`wgpu::COPY_BUFFER_ALIGNMENT`] bytes.
pub fn check_copy_alignment(size: u64) -> Result<(), UploadError> {
    if size % wgpu::COPY_BUFFER_ALIGNMENT == 0 {
        Ok(())
    } else {
        Err(UploadError::MisalignedCopy {
            size,
            alignment: wgpu::COPY_BUFFER_ALIGNMENT,
        })
    }
}
