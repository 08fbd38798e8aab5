//! Manages the per-frame global uniform buffers and their bind groups.
//!
//! One uniform buffer and bind group exist per frame in flight. The frame index
//! selects which pair is written and bound, so a frame never overwrites a uniform
//! the GPU may still be reading for the previous frame.

use wgpu::{util::DeviceExt, BindGroup, BindGroupLayout, Buffer, Device, Queue};

use crate::engine_state::camera_state::camera::{GlobalUniform, MAX_FRAMES_IN_FLIGHT};

/// Label of the global uniform bind group layout
pub const GLOBAL_BIND_GROUP_LAYOUT: &str = "global_bind_group_layout";

/// One frame's uniform buffer and the bind group pointing at it.
struct FrameUniform {
    buffer: Buffer,
    bind_group: BindGroup,
}

/// Manages WebGPU bind groups and their layouts.
pub struct BindGroupState {
    global_bind_group_layout: BindGroupLayout,
    frames: Vec<FrameUniform>,
}

impl BindGroupState {
    /// Creates the global layout and one uniform buffer and bind group per frame in flight.
    ///
    /// # Arguments
    /// * `device` - The WebGPU device
    pub fn new(device: &Device) -> Self {
        let global_bind_group_layout =
            device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                entries: &[wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Uniform,
                        has_dynamic_offset: false,
                        min_binding_size: None,
                    },
                    count: None,
                }],
                label: Some(GLOBAL_BIND_GROUP_LAYOUT),
            });

        let frames = (0..MAX_FRAMES_IN_FLIGHT)
            .map(|frame| {
                let buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                    label: Some(&format!("global_uniform_buffer_{frame}")),
                    contents: bytemuck::bytes_of(&GlobalUniform::new()),
                    usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
                });
                let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
                    layout: &global_bind_group_layout,
                    entries: &[wgpu::BindGroupEntry {
                        binding: 0,
                        resource: buffer.as_entire_binding(),
                    }],
                    label: Some(&format!("global_bind_group_{frame}")),
                });
                FrameUniform { buffer, bind_group }
            })
            .collect();

        Self {
            global_bind_group_layout,
            frames,
        }
    }

    /// The layout of group 0.
    pub fn global_bind_group_layout(&self) -> &BindGroupLayout {
        &self.global_bind_group_layout
    }

    /// The bind group for `frame_index`.
    pub fn global_bind_group(&self, frame_index: usize) -> &BindGroup {
        &self.frames[frame_slot(frame_index)].bind_group
    }

    /// Writes `uniform` into the buffer for `frame_index`.
    pub fn write_global_uniform(&self, queue: &Queue, frame_index: usize, uniform: &GlobalUniform) {
        queue.write_buffer(
            &self.frames[frame_slot(frame_index)].buffer,
            0,
            bytemuck::bytes_of(uniform),
        );
    }
}

/// The uniform slot used by a frame.
pub fn frame_slot(frame_index: usize) -> usize {
    frame_index % MAX_FRAMES_IN_FLIGHT
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn frames_alternate_between_slots() {
        let slots: Vec<usize> = (0..5).map(frame_slot).collect();
        assert_eq!(slots, vec![0, 1, 0, 1, 0]);
    }
}
