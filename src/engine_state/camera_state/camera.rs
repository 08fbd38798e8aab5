//! # Camera Implementation
//!
//! This module contains the core camera implementation including:
//! - Camera representation and view matrix
//! - Projection matrix handling
//! - Keyboard movement controller
//! - The per-frame global uniform block
//!
//! ## Key Components
//! - `Camera`: Position plus yaw/pitch orientation in world space
//! - `Projection`: Perspective projection settings
//! - `KeyboardMovementController`: Applies held keys to the camera
//! - `GlobalUniform`: Packed data structure for GPU shaders
//! - `FrameClock`: The scaled elapsed-time accumulator

use cgmath::*;
use std::f32::consts::FRAC_PI_2;
use web_time::Duration;
use winit::keyboard::KeyCode;

use crate::{application_state::input_state::KeyboardState, settings::CameraSettings};

/// Transformation matrix to convert from OpenGL's coordinate system to WGPU's.
///
/// WGPU NDC depth ranges from 0 to 1 instead of -1 to 1. This matrix:
/// 1. Scales the Z coordinate from [-1, 1] to [-0.5, 0.5]
/// 2. Translates the Z coordinate from [-0.5, 0.5] to [0, 1]
#[rustfmt::skip]
pub const OPENGL_TO_WGPU_MATRIX: cgmath::Matrix4<f32> = cgmath::Matrix4::new(
    1.0, 0.0, 0.0, 0.0,
    0.0, 1.0, 0.0, 0.0,
    0.0, 0.0, 0.5, 0.0,
    0.0, 0.0, 0.5, 1.0,
);

/// Safe limit for pitch to prevent gimbal lock
pub const SAFE_FRAC_PI_2: f32 = FRAC_PI_2 - 0.0001;

/// Number of frames whose uniform buffers may be in use at once.
pub const MAX_FRAMES_IN_FLIGHT: usize = 2;

/// A first-person camera in 3D space.
#[derive(Debug, Clone, PartialEq)]
pub struct Camera {
    /// The camera's position in world space
    pub position: Point3<f32>,
    /// Horizontal rotation around Y; zero looks along +X
    pub yaw: Rad<f32>,
    /// Vertical rotation; positive looks up
    pub pitch: Rad<f32>,
}

impl Camera {
    /// Creates a new camera with the specified position and orientation.
    ///
    /// # Arguments
    /// * `position` - Initial position in world space
    /// * `yaw` - Initial yaw
    /// * `pitch` - Initial pitch, clamped short of straight up or down
    pub fn new<V: Into<Point3<f32>>, Y: Into<Rad<f32>>, P: Into<Rad<f32>>>(
        position: V,
        yaw: Y,
        pitch: P,
    ) -> Self {
        let mut camera = Self {
            position: position.into(),
            yaw: yaw.into(),
            pitch: pitch.into(),
        };
        camera.clamp_pitch();
        camera
    }

    /// Creates the camera at the configured start pose.
    pub fn from_settings(settings: &CameraSettings) -> Self {
        Self::new(
            Point3::from(settings.position),
            Deg(settings.yaw_degrees),
            Deg(settings.pitch_degrees),
        )
    }

    /// The normalized direction the camera is facing.
    pub fn forward(&self) -> Vector3<f32> {
        let (yaw_sin, yaw_cos) = self.yaw.0.sin_cos();
        let (pitch_sin, pitch_cos) = self.pitch.0.sin_cos();
        Vector3::new(pitch_cos * yaw_cos, pitch_sin, pitch_cos * yaw_sin).normalize()
    }

    /// Calculates the view matrix for this camera.
    ///
    /// # Returns
    /// A 4x4 matrix transforming world coordinates to view space
    pub fn calc_matrix(&self) -> Matrix4<f32> {
        Matrix4::look_to_rh(self.position, self.forward(), Vector3::unit_y())
    }

    fn clamp_pitch(&mut self) {
        if self.pitch < -Rad(SAFE_FRAC_PI_2) {
            self.pitch = -Rad(SAFE_FRAC_PI_2);
        } else if self.pitch > Rad(SAFE_FRAC_PI_2) {
            self.pitch = Rad(SAFE_FRAC_PI_2);
        }
    }
}

/// Represents a camera's projection matrix and related parameters.
#[derive(Debug, Clone, PartialEq)]
pub struct Projection {
    /// Aspect ratio (width / height)
    aspect: f32,
    /// Vertical field of view in radians
    fovy: Rad<f32>,
    /// Near clipping plane distance
    znear: f32,
    /// Far clipping plane distance
    zfar: f32,
}

impl Projection {
    /// Creates a new projection with the given parameters.
    ///
    /// # Arguments
    /// * `width` - Viewport width in pixels
    /// * `height` - Viewport height in pixels
    /// * `fovy` - Vertical field of view
    /// * `znear` - Near clipping plane distance
    /// * `zfar` - Far clipping plane distance
    pub fn new<F: Into<Rad<f32>>>(width: u32, height: u32, fovy: F, znear: f32, zfar: f32) -> Self {
        Self {
            aspect: aspect_ratio(width, height),
            fovy: fovy.into(),
            znear,
            zfar,
        }
    }

    /// Creates the configured projection for a viewport.
    pub fn from_settings(width: u32, height: u32, settings: &CameraSettings) -> Self {
        Self::new(
            width,
            height,
            Deg(settings.fov_degrees),
            settings.near,
            settings.far,
        )
    }

    /// Updates the projection's aspect ratio for viewport resizing.
    pub fn resize(&mut self, width: u32, height: u32) {
        self.aspect = aspect_ratio(width, height);
    }

    /// The current aspect ratio.
    #[cfg(test)]
    pub fn aspect(&self) -> f32 {
        self.aspect
    }

    /// Calculates the projection matrix, including the OpenGL to WGPU depth remap.
    pub fn calc_matrix(&self) -> Matrix4<f32> {
        OPENGL_TO_WGPU_MATRIX * perspective(self.fovy, self.aspect, self.znear, self.zfar)
    }
}

/// Minimized windows report a zero height.
fn aspect_ratio(width: u32, height: u32) -> f32 {
    width as f32 / height.max(1) as f32
}

/// Moves and turns a camera from held keys.
///
/// - `W`/`S` forward and back, `A`/`D` left and right, all in the XZ plane
/// - `E`/`Q` up and down along world Y
/// - Arrow keys turn: left/right change yaw, up/down change pitch
#[derive(Debug, Clone, PartialEq)]
pub struct KeyboardMovementController {
    /// Movement speed in world units per second
    pub move_speed: f32,
    /// Turn speed in radians per second
    pub look_speed: f32,
}

impl KeyboardMovementController {
    /// Creates a controller with the given speeds.
    pub fn new(move_speed: f32, look_speed: f32) -> Self {
        Self {
            move_speed,
            look_speed,
        }
    }

    /// Creates the configured controller.
    pub fn from_settings(settings: &CameraSettings) -> Self {
        Self::new(settings.move_speed, settings.look_speed)
    }

    /// Applies held keys to `camera` over `dt`.
    ///
    /// # Returns
    /// `true` if the camera moved or turned
    pub fn update(&self, camera: &mut Camera, keys: &KeyboardState, dt: Duration) -> bool {
        let dt = dt.as_secs_f32();

        let yaw_input = keys.axis(KeyCode::ArrowRight, KeyCode::ArrowLeft);
        let pitch_input = keys.axis(KeyCode::ArrowUp, KeyCode::ArrowDown);
        camera.yaw += Rad(yaw_input * self.look_speed * dt);
        camera.pitch += Rad(pitch_input * self.look_speed * dt);
        camera.clamp_pitch();

        let (yaw_sin, yaw_cos) = camera.yaw.0.sin_cos();
        let forward = Vector3::new(yaw_cos, 0.0, yaw_sin);
        let right = Vector3::new(-yaw_sin, 0.0, yaw_cos);

        let direction = forward * keys.axis(KeyCode::KeyW, KeyCode::KeyS)
            + right * keys.axis(KeyCode::KeyD, KeyCode::KeyA)
            + Vector3::unit_y() * keys.axis(KeyCode::KeyE, KeyCode::KeyQ);

        if direction.magnitude2() > f32::EPSILON {
            camera.position += direction.normalize() * self.move_speed * dt;
        }

        yaw_input != 0.0 || pitch_input != 0.0 || direction.magnitude2() > f32::EPSILON
    }
}

/// Accumulates scaled frame time for shader animation.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct FrameClock {
    elapsed: f32,
}

impl FrameClock {
    /// Advances the clock by a tenth of the frame time.
    pub fn tick(&mut self, frame_time: Duration) -> f32 {
        self.elapsed += frame_time.as_secs_f32() / 10.0;
        self.elapsed
    }

    /// The accumulated value.
    pub fn elapsed(&self) -> f32 {
        self.elapsed
    }
}

/// The per-frame uniform block shared by every draw. 272 bytes.
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct GlobalUniform {
    // We can't use cgmath with bytemuck directly so matrices are stored as 4x4 f32 arrays
    projection: [[f32; 4]; 4],
    inverse_projection: [[f32; 4]; 4],
    view: [[f32; 4]; 4],
    inverse_view: [[f32; 4]; 4],
    camera_position: [f32; 3],
    elapsed: f32,
}

impl Default for GlobalUniform {
    fn default() -> Self {
        Self::new()
    }
}

impl GlobalUniform {
    /// Creates a uniform with identity matrices at the origin.
    pub fn new() -> Self {
        Self {
            projection: Matrix4::identity().into(),
            inverse_projection: Matrix4::identity().into(),
            view: Matrix4::identity().into(),
            inverse_view: Matrix4::identity().into(),
            camera_position: [0.0; 3],
            elapsed: 0.0,
        }
    }

    /// Fills the uniform from the camera, projection and clock.
    ///
    /// Singular matrices leave their inverse as identity.
    pub fn update(&mut self, camera: &Camera, projection: &Projection, clock: &FrameClock) {
        let projection = projection.calc_matrix();
        let view = camera.calc_matrix();

        self.projection = projection.into();
        self.inverse_projection = projection.invert().unwrap_or_else(Matrix4::identity).into();
        self.view = view.into();
        self.inverse_view = view.invert().unwrap_or_else(Matrix4::identity).into();
        self.camera_position = camera.position.into();
        self.elapsed = clock.elapsed();
    }
}

#[cfg(test)]
impl GlobalUniform {
    /// The projection matrix.
    pub fn projection(&self) -> Matrix4<f32> {
        self.projection.into()
    }

    /// The inverse projection matrix.
    pub fn inverse_projection(&self) -> Matrix4<f32> {
        self.inverse_projection.into()
    }

    /// The view matrix.
    pub fn view(&self) -> Matrix4<f32> {
        self.view.into()
    }

    /// The inverse view matrix.
    pub fn inverse_view(&self) -> Matrix4<f32> {
        self.inverse_view.into()
    }

    /// The camera position in world space.
    pub fn camera_position(&self) -> [f32; 3] {
        self.camera_position
    }

    /// The frame clock value.
    pub fn elapsed(&self) -> f32 {
        self.elapsed
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;

    use super::*;

    fn level_camera() -> Camera {
        Camera::new(Point3::new(0.0, 0.0, 0.0), Deg(0.0), Deg(0.0))
    }

    #[test]
    fn zero_yaw_looks_along_x() {
        let forward = level_camera().forward();
        assert_relative_eq!(forward.x, 1.0, epsilon = 1e-6);
        assert_relative_eq!(forward.y, 0.0, epsilon = 1e-6);
        assert_relative_eq!(forward.z, 0.0, epsilon = 1e-6);
    }

    #[test]
    fn pitch_is_clamped() {
        let camera = Camera::new(Point3::new(0.0, 0.0, 0.0), Deg(0.0), Deg(120.0));
        assert_relative_eq!(camera.pitch.0, SAFE_FRAC_PI_2);
    }

    #[test]
    fn view_matrix_puts_forward_on_negative_z() {
        let camera = Camera::new(Point3::new(1.0, 2.0, 3.0), Deg(30.0), Deg(-10.0));
        let ahead = camera.position + camera.forward() * 5.0;
        let in_view = camera.calc_matrix().transform_point(ahead);
        assert_relative_eq!(in_view.x, 0.0, epsilon = 1e-4);
        assert_relative_eq!(in_view.y, 0.0, epsilon = 1e-4);
        assert_relative_eq!(in_view.z, -5.0, epsilon = 1e-4);
    }

    #[test]
    fn projection_maps_near_and_far_to_unit_depth() {
        let projection = Projection::new(800, 600, Deg(60.0), 0.1, 512.0);
        let near = projection
            .calc_matrix()
            .transform_point(Point3::new(0.0, 0.0, -0.1));
        let far = projection
            .calc_matrix()
            .transform_point(Point3::new(0.0, 0.0, -512.0));
        assert_relative_eq!(near.z, 0.0, epsilon = 1e-4);
        assert_relative_eq!(far.z, 1.0, epsilon = 1e-4);
    }

    #[test]
    fn zero_height_viewport_keeps_a_finite_aspect() {
        let mut projection = Projection::new(800, 600, Deg(60.0), 0.1, 512.0);
        projection.resize(640, 0);
        assert_relative_eq!(projection.aspect(), 640.0);
    }

    #[test]
    fn forward_key_moves_along_yaw() {
        let mut camera = Camera::new(Point3::new(0.0, 0.0, 0.0), Deg(90.0), Deg(-30.0));
        let controller = KeyboardMovementController::new(4.0, 1.0);
        let mut keys = KeyboardState::new();
        keys.set_key(KeyCode::KeyW, true);

        assert!(controller.update(&mut camera, &keys, Duration::from_millis(500)));
        assert_relative_eq!(camera.position.x, 0.0, epsilon = 1e-5);
        assert_relative_eq!(camera.position.y, 0.0, epsilon = 1e-5);
        assert_relative_eq!(camera.position.z, 2.0, epsilon = 1e-5);
    }

    #[test]
    fn diagonal_movement_is_not_faster() {
        let mut camera = level_camera();
        let controller = KeyboardMovementController::new(1.0, 1.0);
        let mut keys = KeyboardState::new();
        keys.set_key(KeyCode::KeyW, true);
        keys.set_key(KeyCode::KeyD, true);
        keys.set_key(KeyCode::KeyE, true);

        controller.update(&mut camera, &keys, Duration::from_secs(1));
        let travelled = camera.position.to_vec().magnitude();
        assert_relative_eq!(travelled, 1.0, epsilon = 1e-5);
        assert!(camera.position.y > 0.0);
    }

    #[test]
    fn arrow_keys_turn() {
        let mut camera = level_camera();
        let controller = KeyboardMovementController::new(1.0, 2.0);
        let mut keys = KeyboardState::new();
        keys.set_key(KeyCode::ArrowRight, true);
        keys.set_key(KeyCode::ArrowDown, true);

        controller.update(&mut camera, &keys, Duration::from_millis(250));
        assert_relative_eq!(camera.yaw.0, 0.5, epsilon = 1e-6);
        assert_relative_eq!(camera.pitch.0, -0.5, epsilon = 1e-6);
        assert_eq!(camera.position, Point3::new(0.0, 0.0, 0.0));
    }

    #[test]
    fn no_keys_no_change() {
        let mut camera = level_camera();
        let controller = KeyboardMovementController::new(1.0, 1.0);
        assert!(!controller.update(&mut camera, &KeyboardState::new(), Duration::from_secs(1)));
        assert_eq!(camera, level_camera());
    }

    #[test]
    fn frame_clock_advances_a_tenth_of_frame_time() {
        let mut clock = FrameClock::default();
        clock.tick(Duration::from_millis(500));
        clock.tick(Duration::from_millis(500));
        assert_relative_eq!(clock.elapsed(), 0.1, epsilon = 1e-6);
    }

    #[test]
    fn uniform_inverses_invert() {
        let camera = Camera::new(Point3::new(-24.0, 40.0, -24.0), Deg(45.0), Deg(-25.0));
        let projection = Projection::new(1280, 720, Deg(60.0), 0.1, 512.0);
        let mut uniform = GlobalUniform::new();
        uniform.update(&camera, &projection, &FrameClock::default());

        let view_identity = uniform.view() * uniform.inverse_view();
        let projection_identity = uniform.projection() * uniform.inverse_projection();
        for column in 0..4 {
            for row in 0..4 {
                let expected = if column == row { 1.0 } else { 0.0 };
                assert_relative_eq!(view_identity[column][row], expected, epsilon = 1e-4);
                assert_relative_eq!(projection_identity[column][row], expected, epsilon = 1e-4);
            }
        }
        assert_eq!(uniform.camera_position(), [-24.0, 40.0, -24.0]);
    }

    #[test]
    fn uniform_layout_matches_shader_block() {
        assert_eq!(std::mem::size_of::<GlobalUniform>(), 272);
    }
}
