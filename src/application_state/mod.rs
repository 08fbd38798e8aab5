//! # Application State Management
//!
//! This module handles the application's state management, including:
//! - Window and graphics initialization
//! - Keyboard input
//! - Application lifecycle events
//!
//! Graphics are created on the first `resumed` event. Any fatal error after that
//! is logged, stored, and ends the event loop; [`crate::run`] returns it.

pub mod graphics_resources_builder;
pub mod input_state;

use std::sync::Arc;

use graphics_resources_builder::build_graphics;
use input_state::KeyboardState;
use log::{error, info, warn};

use winit::{
    application::ApplicationHandler,
    event::{ElementState, KeyEvent, WindowEvent},
    event_loop::ActiveEventLoop,
    keyboard::{KeyCode, PhysicalKey},
    window::{Window, WindowId},
};

use crate::{
    engine_state::{EngineState, FrameOutcome},
    error::RenderError,
    settings::EngineSettings,
};

/// The main application state container that manages the application's lifecycle.
pub struct ApplicationState {
    /// Settings the engine is created with
    pub settings: EngineSettings,
    /// The initialized application state, once graphics are up
    pub state: Option<InitializedApplicationState>,
    /// The error that stopped the event loop, if any
    pub fatal_error: Option<RenderError>,
}

/// Represents the fully initialized and running state of the application.
pub struct InitializedApplicationState {
    /// The core engine state
    pub engine_state: EngineState,
    /// Handle to the application window
    pub window: Arc<Window>,
    /// Held keys
    pub keyboard_state: KeyboardState,
    /// Timestamp of the last update for delta time calculations
    pub last_update_time: web_time::Instant,
}

impl ApplicationState {
    /// Creates an application that has not opened its window yet.
    pub fn new(settings: EngineSettings) -> Self {
        Self {
            settings,
            state: None,
            fatal_error: None,
        }
    }

    /// Builds the graphics context and the engine.
    fn initialize_application_state(
        &self,
        event_loop: &ActiveEventLoop,
    ) -> Result<InitializedApplicationState, RenderError> {
        let graphics = build_graphics(event_loop, &self.settings)?;
        let engine_state = EngineState::new(
            graphics.surface,
            graphics.surface_config,
            graphics.device,
            graphics.queue,
            &graphics.shader_file_string,
            &self.settings,
        )?;

        Ok(InitializedApplicationState {
            engine_state,
            window: graphics.window,
            keyboard_state: KeyboardState::new(),
            last_update_time: web_time::Instant::now(),
        })
    }

    /// Logs `err`, keeps it for the caller of the event loop, and exits.
    fn fail(&mut self, event_loop: &ActiveEventLoop, err: RenderError) {
        error!("Fatal error: {}", err);
        self.fatal_error = Some(err);
        event_loop.exit();
    }
}

impl ApplicationHandler for ApplicationState {
    /// Creates the window, graphics and world on first resume.
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.state.is_some() {
            return;
        }
        match self.initialize_application_state(event_loop) {
            Ok(state) => {
                info!("Application initialized");
                self.state = Some(state);
            }
            Err(err) => self.fail(event_loop, err),
        }
    }

    /// Handles window-related events such as resize, focus changes, and input events.
    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        let Some(state) = &mut self.state else {
            if matches!(event, WindowEvent::CloseRequested) {
                event_loop.exit();
            }
            return;
        };

        state.keyboard_state.intake_input(&event);

        match event {
            WindowEvent::Resized(size) => {
                state.engine_state.resize_surface(size);
            }
            WindowEvent::RedrawRequested => {
                let now = web_time::Instant::now();
                let dt = now - state.last_update_time;
                state.last_update_time = now;

                state.engine_state.update(dt, &state.keyboard_state);
                match state.engine_state.render() {
                    Ok(FrameOutcome::Skipped) => warn!("Frame skipped"),
                    Ok(_) => (),
                    Err(err) => self.fail(event_loop, err),
                }
            }
            WindowEvent::CloseRequested
            | WindowEvent::KeyboardInput {
                event:
                    KeyEvent {
                        state: ElementState::Pressed,
                        physical_key: PhysicalKey::Code(KeyCode::Escape),
                        ..
                    },
                ..
            } => event_loop.exit(),
            _ => (),
        }
    }

    /// Requests the next frame.
    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(state) = &self.state {
            state.window.request_redraw();
        }
    }
}
