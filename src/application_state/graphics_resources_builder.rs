//! # Graphics Resources Builder
//!
//! This module creates the window and the WebGPU context the engine renders with.
//!
//! The main components are:
//! - `Graphics`: Holds all graphics-related resources
//! - `create_graphics`: Creates the window and surface, then the adapter and device
//!
//! The mesh pipeline passes per-object transforms as push constants, so the device
//! is requested with [`Features::PUSH_CONSTANTS`] and room for one object's
//! model and normal matrices.

use std::{future::Future, path::Path, sync::Arc};

use log::info;
use wgpu::{
    Adapter, CompositeAlphaMode, Device, Features, Instance, PresentMode, Queue, Surface,
    SurfaceConfiguration, TextureFormat,
};
use winit::{event_loop::ActiveEventLoop, window::Window};

use crate::{
    engine_state::rendering::meshing::OBJECT_PUSH_CONSTANT_SIZE, error::RenderError,
    settings::EngineSettings,
};

/// Contains all graphics-related resources required by the application.
#[allow(dead_code)]
pub struct Graphics {
    /// The window being rendered to
    pub window: Arc<Window>,
    /// The WebGPU instance
    pub instance: Instance,
    /// The window's configured surface
    pub surface: Surface<'static>,
    /// Its configuration
    pub surface_config: SurfaceConfiguration,
    /// The chosen adapter
    pub adapter: Adapter,
    /// The logical device
    pub device: Device,
    /// Its queue
    pub queue: Queue,
    /// WGSL source of the mesh shader
    pub shader_file_string: String,
}

/// Creates the window and graphics context, blocking until the device is ready.
pub fn build_graphics(
    event_loop: &ActiveEventLoop,
    settings: &EngineSettings,
) -> Result<Graphics, RenderError> {
    pollster::block_on(create_graphics(event_loop, settings)?)
}

/// Creates the window and surface, and returns a future resolving to the full context.
///
/// # Arguments
/// * `event_loop` - The active event loop used to create the window and surface
/// * `settings` - Supplies the window title and the shader path
///
/// # Errors
/// Window and surface creation fail immediately; adapter, device and shader
/// loading fail when the future resolves.
fn create_graphics(
    event_loop: &ActiveEventLoop,
    settings: &EngineSettings,
) -> Result<impl Future<Output = Result<Graphics, RenderError>> + 'static, RenderError> {
    let window_attrs = Window::default_attributes().with_title(settings.window_title.clone());
    let window = Arc::new(event_loop.create_window(window_attrs)?);

    // The instance is a handle to our GPU
    let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
        backends: wgpu::Backends::PRIMARY,
        flags: wgpu::InstanceFlags::empty(),
        backend_options: wgpu::BackendOptions::from_env_or_default(),
    });

    let surface = instance.create_surface(window.clone())?;
    let shader_path = settings.shader_path.clone();

    Ok(async move {
        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::default(),
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await?;
        info!("Using adapter {:?}", adapter.get_info());

        let required_limits = wgpu::Limits {
            max_push_constant_size: OBJECT_PUSH_CONSTANT_SIZE,
            ..wgpu::Limits::default()
        };

        let (device, queue) = adapter
            .request_device(&wgpu::DeviceDescriptor {
                required_features: Features::PUSH_CONSTANTS,
                required_limits,
                label: None,
                memory_hints: wgpu::MemoryHints::MemoryUsage,
                trace: wgpu::Trace::Off,
            })
            .await?;

        let size = window.inner_size();
        let surface_caps = surface.get_capabilities(&adapter);
        let surface_config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: choose_surface_format(&surface_caps.formats),
            width: size.width.max(1),
            height: size.height.max(1),
            present_mode: surface_caps
                .present_modes
                .first()
                .copied()
                .unwrap_or(PresentMode::Fifo),
            alpha_mode: surface_caps
                .alpha_modes
                .first()
                .copied()
                .unwrap_or(CompositeAlphaMode::Auto),
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };

        let shader_string = std::fs::read_to_string(Path::new(&shader_path)).map_err(|source| {
            RenderError::Shader {
                path: shader_path.clone(),
                source,
            }
        })?;

        surface.configure(&device, &surface_config);
        info!(
            "Surface configured: {}x{} {:?}",
            surface_config.width, surface_config.height, surface_config.format
        );

        Ok(Graphics {
            window,
            instance,
            surface,
            surface_config,
            adapter,
            device,
            queue,
            shader_file_string: shader_string,
        })
    })
}

/// Picks the first sRGB format, falling back to the first format offered.
pub fn choose_surface_format(formats: &[TextureFormat]) -> TextureFormat {
    formats
        .iter()
        .find(|format| format.is_srgb())
        .or_else(|| formats.first())
        .copied()
        .unwrap_or(TextureFormat::Bgra8UnormSrgb)
}
