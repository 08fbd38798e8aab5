#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]
#![warn(rustdoc::invalid_rust_codeblocks)]

//! # Voxel World
//!
//! A voxel terrain renderer built with Rust and WGPU.
//!
//! At startup a grid of chunks is generated from fractal noise, each chunk is meshed
//! one cube per voxel, and every mesh is uploaded to device-local memory. The render
//! loop then draws every chunk each frame under a single camera uniform.
//!
//! ## Key Modules
//!
//! * `application_state` - Window, graphics bootstrap and keyboard input
//! * `engine_state` - Voxels, meshing, uploads, the camera and the frame loop
//! * `settings` - JSON configuration
//! * `error` - Error types
//!
//! ## Usage
//!
//! ```ignore
//! fn main() {
//!     if let Err(err) = voxel_world::run() {
//!         eprintln!("{err}");
//!     }
//! }
//! ```
//!
//! The settings file is read from `$VOXEL_WORLD_SETTINGS`, or `voxel_world.json` in the
//! working directory, and may be absent.

use application_state::ApplicationState;
use log::info;
use winit::event_loop::EventLoop;

mod application_state;
mod engine_state;
pub mod error;
mod settings;

pub use error::RenderError;

/// Initializes logging, loads settings and runs the event loop until the window closes.
///
/// # Errors
///
/// Settings, graphics initialization, world loading and fatal frame errors.
pub fn run() -> Result<(), RenderError> {
    let mut log_builder = env_logger::Builder::new();
    log_builder
        .target(env_logger::Target::Stdout)
        .parse_env("RUST_LOG")
        .init();
    info!("Logger initialized");

    let settings = settings::EngineSettings::load()?;
    let event_loop = EventLoop::new()?;

    let mut state = ApplicationState::new(settings);
    event_loop.run_app(&mut state)?;

    match state.fatal_error.take() {
        Some(err) => Err(err),
        None => Ok(()),
    }
}
