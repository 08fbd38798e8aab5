//! # Camera State Management
//!
//! This module handles all camera-related functionality including:
//! - Camera position and orientation tracking
//! - View and projection matrix calculations
//! - Keyboard input processing for camera control
//! - The per-frame global uniform consumed by shaders
//!
//! ## Core Components
//! - `Camera`: The camera's position and orientation in 3D space
//! - `KeyboardMovementController`: Applies held keys to the camera
//! - `Projection`: The camera's projection matrix
//! - `GlobalUniform`: GPU representation of camera data and frame time

use camera::{Camera, FrameClock, GlobalUniform, KeyboardMovementController, Projection};
use web_time::Duration;

use crate::{application_state::input_state::KeyboardState, settings::CameraSettings};

pub mod camera;

/// Owns the camera, its controller and projection, and the uniform they produce.
#[derive(Debug, Clone)]
pub struct CameraState {
    /// The current camera position and orientation
    pub camera: Camera,
    /// The perspective projection
    pub projection: Projection,
    /// Handles keyboard movement
    pub controller: KeyboardMovementController,
    clock: FrameClock,
    uniform: GlobalUniform,
}

impl CameraState {
    /// Creates the camera state at the configured start pose.
    ///
    /// # Arguments
    /// * `width` - Initial viewport width in pixels
    /// * `height` - Initial viewport height in pixels
    /// * `settings` - Camera placement, projection and controller tuning
    pub fn new(width: u32, height: u32, settings: &CameraSettings) -> Self {
        let camera = Camera::from_settings(settings);
        let projection = Projection::from_settings(width, height, settings);
        let clock = FrameClock::default();

        let mut uniform = GlobalUniform::new();
        uniform.update(&camera, &projection, &clock);

        Self {
            camera,
            projection,
            controller: KeyboardMovementController::from_settings(settings),
            clock,
            uniform,
        }
    }

    /// Updates the projection's aspect ratio.
    pub fn resize(&mut self, width: u32, height: u32) {
        self.projection.resize(width, height);
    }

    /// Applies input, advances the clock and rebuilds the uniform.
    ///
    /// Called once per frame, before the uniform is written to the GPU.
    ///
    /// # Arguments
    /// * `dt` - Time elapsed since the last update
    /// * `keys` - Currently held keys
    ///
    /// # Returns
    /// The uniform for this frame
    pub fn update(&mut self, dt: Duration, keys: &KeyboardState) -> &GlobalUniform {
        self.controller.update(&mut self.camera, keys, dt);
        self.clock.tick(dt);
        self.uniform
            .update(&self.camera, &self.projection, &self.clock);
        &self.uniform
    }

    /// The uniform from the last update.
    pub fn uniform(&self) -> &GlobalUniform {
        &self.uniform
    }
}
