//! # Engine State Module
//!
//! The core engine module that owns the GPU context, the scene and the frame loop.
//!
//! ## Key Components
//!
//! * `EngineState` - The main state container for the engine
//! * `buffer_state` - Uploads meshes into device-local buffers
//! * `camera_state` - Camera, keyboard controller and the per-frame uniform
//! * `rendering` - Render pipeline, bind groups, meshing and the command seam
//! * `voxels` - Voxel data, chunks, and the world loader
//!
//! ## Architecture
//!
//! `EngineState::new` loads the whole world synchronously before the first frame.
//! After that each frame is `update` (input and uniform) followed by `render`
//! (acquire, record, submit, present). The frame index cycles through the frames in
//! flight and selects which uniform buffer the frame writes.
//!
//! ## Frame Acquisition
//!
//! An outdated swap chain is reconfigured and the frame skipped. A suboptimal frame
//! is presented and the swap chain reconfigured afterwards. Every other acquisition
//! failure is fatal and returned to the caller.

use camera_state::{camera::MAX_FRAMES_IN_FLIGHT, CameraState};
use log::{info, warn};
use rendering::{
    meshing::mesh::{cube::AIR_COLOR, Mesh},
    pipeline_manager::PipelineManager,
};
use voxels::world::{Transform, World};
use wgpu::{Device, Queue, Surface, SurfaceConfiguration, SurfaceError};

use crate::{
    application_state::input_state::KeyboardState, error::RenderError, settings::EngineSettings,
};

pub mod buffer_state;
pub mod camera_state;
pub mod rendering;
pub mod voxels;

/// Name of the unit cube placed at the world origin
pub const ORIGIN_MARKER_NAME: &str = "origin marker";

/// What happened to a frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameOutcome {
    /// Drawn and presented.
    Presented,
    /// Presented, then the swap chain was reconfigured.
    PresentedSuboptimal,
    /// Not drawn; the swap chain was reconfigured.
    Skipped,
}

/// How the frame loop reacts to a frame acquisition failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SurfaceErrorAction {
    /// Reconfigure the surface and skip the frame.
    Reconfigure,
    /// Stop rendering.
    Fatal,
}

/// Maps a frame acquisition failure to the frame loop's reaction.
///
/// Only an outdated swap chain is recoverable.
pub fn classify_surface_error(error: &SurfaceError) -> SurfaceErrorAction {
    match error {
        SurfaceError::Outdated => SurfaceErrorAction::Reconfigure,
        _ => SurfaceErrorAction::Fatal,
    }
}

/// The main state container for the voxel world
///
/// Owns the surface, device and queue, the render resources, the camera and the
/// loaded world.
pub struct EngineState {
    surface: Surface<'static>,
    surface_config: SurfaceConfiguration,
    device: Device,
    queue: Queue,
    pipeline_manager: PipelineManager,
    /// Camera state managing position, orientation and movement
    pub camera_state: CameraState,
    /// The loaded scene
    pub world: World<wgpu::Buffer>,
    frame_index: usize,
}

impl EngineState {
    /// Creates the render resources and loads the world.
    ///
    /// # Arguments
    ///
    /// * `surface` - The configured rendering surface
    /// * `surface_config` - Configuration for the rendering surface
    /// * `device` - The GPU device
    /// * `queue` - The GPU command queue
    /// * `shader_string` - WGSL shader code for the mesh pipeline
    /// * `settings` - Engine settings
    ///
    /// # Errors
    ///
    /// [`RenderError::World`] if the world fails to load.
    pub fn new(
        surface: Surface<'static>,
        surface_config: SurfaceConfiguration,
        device: Device,
        queue: Queue,
        shader_string: &str,
        settings: &EngineSettings,
    ) -> Result<Self, RenderError> {
        let pipeline_manager = PipelineManager::new(
            &device,
            &surface_config,
            surface_config.format,
            shader_string,
        );
        let camera_state = CameraState::new(
            surface_config.width,
            surface_config.height,
            &settings.camera,
        );

        let world = Self::load_world(&device, &queue, settings)?;

        Ok(Self {
            surface,
            surface_config,
            device,
            queue,
            pipeline_manager,
            camera_state,
            world,
            frame_index: 0,
        })
    }

    fn load_world(
        device: &Device,
        queue: &Queue,
        settings: &EngineSettings,
    ) -> Result<World<wgpu::Buffer>, RenderError> {
        let mut uploader = buffer_state::BufferState::new(device, queue);
        let mut world = World::new();

        if settings.origin_marker {
            world.add_static_mesh(
                ORIGIN_MARKER_NAME,
                Mesh::unit_cube(AIR_COLOR),
                Transform::default(),
                &mut uploader,
            )?;
        }

        let report = world.load_chunk_grid(settings, &mut uploader)?;
        if world.is_empty() {
            warn!("World has nothing to draw ({} chunks skipped)", report.skipped.len());
        }
        info!(
            "World ready: {} objects, {} of {} chunks loaded, {} of {} device bytes used, {} bytes copied",
            world.len(),
            world.chunk_count(),
            settings.chunk_count(),
            uploader.get_total_used_memory(),
            uploader.get_total_allocated_memory(),
            uploader.get_total_copied_memory()
        );
        Ok(world)
    }

    /// Resizes the rendering surface when the window size changes
    ///
    /// Zero-sized windows (minimized) are ignored.
    pub fn resize_surface(&mut self, size: winit::dpi::PhysicalSize<u32>) {
        if size.width == 0 || size.height == 0 {
            return;
        }
        self.surface_config.width = size.width;
        self.surface_config.height = size.height;
        self.reconfigure_surface();
        self.camera_state.resize(size.width, size.height);
    }

    /// Applies input and advances the camera and clock.
    ///
    /// # Arguments
    ///
    /// * `dt` - The time elapsed since the last frame
    /// * `keys` - Currently held keys
    pub fn update(&mut self, dt: web_time::Duration, keys: &KeyboardState) {
        self.camera_state.update(dt, keys);
    }

    /// Renders the current frame
    ///
    /// # Errors
    ///
    /// * [`RenderError::FrameAcquisition`] for a non-recoverable acquisition failure
    /// * [`RenderError::Draw`] if an object in the world is not drawable
    pub fn render(&mut self) -> Result<FrameOutcome, RenderError> {
        let frame = match self.surface.get_current_texture() {
            Ok(frame) => frame,
            Err(err) => {
                return match classify_surface_error(&err) {
                    SurfaceErrorAction::Reconfigure => {
                        warn!("Swap chain {:?}, reconfiguring and skipping frame", err);
                        self.reconfigure_surface();
                        Ok(FrameOutcome::Skipped)
                    }
                    SurfaceErrorAction::Fatal => Err(RenderError::FrameAcquisition(err)),
                };
            }
        };
        let suboptimal = frame.suboptimal;

        let view = frame.texture.create_view(&Default::default());
        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Frame Encoder"),
            });
        self.pipeline_manager.render(
            &mut encoder,
            &self.queue,
            &view,
            self.frame_index,
            self.camera_state.uniform(),
            &self.world,
        )?;

        self.queue.submit(std::iter::once(encoder.finish()));
        frame.present();
        self.frame_index = (self.frame_index + 1) % MAX_FRAMES_IN_FLIGHT;

        if suboptimal {
            self.reconfigure_surface();
            Ok(FrameOutcome::PresentedSuboptimal)
        } else {
            Ok(FrameOutcome::Presented)
        }
    }

    fn reconfigure_surface(&mut self) {
        self.surface.configure(&self.device, &self.surface_config);
        self.pipeline_manager
            .resize(&self.device, &self.surface_config);
    }
}
