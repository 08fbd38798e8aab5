//! # Input State
//!
//! Held-key tracking for the movement controller.
//!
//! Only the keys the camera controller reads are tracked. Key state is level based:
//! a key is held from its press event until its release event, or until the window
//! loses focus.

use std::collections::HashMap;

use winit::{
    event::{ElementState, KeyEvent, WindowEvent},
    keyboard::{KeyCode, PhysicalKey},
};

/// Keys read by the camera controller.
pub const TRACKED_KEYS: [KeyCode; 10] = [
    KeyCode::KeyW,
    KeyCode::KeyS,
    KeyCode::KeyA,
    KeyCode::KeyD,
    KeyCode::KeyE,
    KeyCode::KeyQ,
    KeyCode::ArrowLeft,
    KeyCode::ArrowRight,
    KeyCode::ArrowUp,
    KeyCode::ArrowDown,
];

/// Which tracked keys are currently held.
#[derive(Debug, Clone)]
pub struct KeyboardState {
    keys: HashMap<KeyCode, bool>,
}

impl Default for KeyboardState {
    fn default() -> Self {
        Self::new()
    }
}

impl KeyboardState {
    /// Creates a state with every tracked key released.
    pub fn new() -> Self {
        Self {
            keys: TRACKED_KEYS.iter().map(|key| (*key, false)).collect(),
        }
    }

    /// Processes a window event, updating held keys.
    ///
    /// # Returns
    /// `true` if the event changed a tracked key.
    pub fn intake_input(&mut self, event: &WindowEvent) -> bool {
        match event {
            WindowEvent::KeyboardInput {
                event:
                    KeyEvent {
                        physical_key: PhysicalKey::Code(key_code),
                        state,
                        ..
                    },
                ..
            } => self.set_key(*key_code, *state == ElementState::Pressed),
            WindowEvent::Focused(false) => {
                self.release_all();
                true
            }
            _ => false,
        }
    }

    /// Sets a key's held state. Untracked keys are ignored.
    ///
    /// # Returns
    /// `true` if `key` is tracked.
    pub fn set_key(&mut self, key: KeyCode, pressed: bool) -> bool {
        match self.keys.get_mut(&key) {
            Some(held) => {
                *held = pressed;
                true
            }
            None => false,
        }
    }

    /// Whether `key` is held.
    pub fn is_pressed(&self, key: KeyCode) -> bool {
        self.keys.get(&key).copied().unwrap_or(false)
    }

    /// `1.0` if only `positive` is held, `-1.0` if only `negative` is, `0.0` otherwise.
    pub fn axis(&self, positive: KeyCode, negative: KeyCode) -> f32 {
        let to_f32 = |held: bool| if held { 1.0 } else { 0.0 };
        to_f32(self.is_pressed(positive)) - to_f32(self.is_pressed(negative))
    }

    /// Whether any tracked key is held.
    #[cfg(test)]
    pub fn any_pressed(&self) -> bool {
        self.keys.values().any(|held| *held)
    }

    /// Releases every key.
    pub fn release_all(&mut self) {
        self.keys.values_mut().for_each(|held| *held = false);
    }
}
