//! # Error Types
//!
//! All errors that can occur while generating, meshing, uploading and drawing the voxel world.
//!
//! Generation and meshing errors are scoped to a single chunk and are returned to the
//! world loader, which decides whether to skip the chunk or abort. Device errors surface
//! as [`UploadError`] and are treated as fatal by the application shell.

use cgmath::Point3;
use thiserror::Error;

use crate::engine_state::voxels::chunk::ChunkState;

/// Errors raised by the GPU upload adapter.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum UploadError {
    /// The backend could not create a buffer (device out of memory, validation failure...).
    #[error("buffer creation failed for '{label}': {reason}")]
    BufferCreation {
        /// Debug label of the buffer being created.
        label: String,
        /// Backend-provided description of the failure.
        reason: String,
    },

    /// The staging-to-device copy failed.
    #[error("buffer copy of {size} bytes failed: {reason}")]
    BufferCopy {
        /// Number of bytes that were being copied.
        size: u64,
        /// Backend-provided description of the failure.
        reason: String,
    },

    /// The copy size is not a multiple of the backend's copy alignment.
    #[error("copy size {size} is not a multiple of {alignment}")]
    MisalignedCopy {
        /// Requested copy size in bytes.
        size: u64,
        /// Required alignment in bytes.
        alignment: u64,
    },
}

/// Errors raised by a chunk during its generate, mesh, upload and draw lifecycle.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ChunkError {
    /// The voxel field does not hold exactly `edge³` voxels.
    #[error("voxel field holds {actual} voxels, expected {expected}")]
    InvalidFieldSize {
        /// `edge³` for the chunk's edge length.
        expected: usize,
        /// The actual number of voxels in the field.
        actual: usize,
    },

    /// The mesh of the field would need vertex indices beyond `u32::MAX`.
    #[error("{voxel_count} voxels need more vertices than 32-bit indices can address")]
    TooManyVertices {
        /// Number of voxels in the field being meshed.
        voxel_count: usize,
    },

    /// Fewer than three vertices were produced, so no triangle can be formed.
    #[error("vertex buffer needs at least 3 vertices, mesh has {vertex_count}")]
    InsufficientGeometry {
        /// Number of vertices in the mesh that was about to be uploaded.
        vertex_count: usize,
    },

    /// The backend failed to create or fill a device buffer.
    #[error("upload failure: {0}")]
    UploadFailure(#[from] UploadError),

    /// `bind`/`draw` were called before the chunk reached the uploaded state.
    #[error("chunk is not drawable in state {state:?}")]
    NotReady {
        /// The state the chunk was in.
        state: ChunkState,
    },

    /// A lifecycle operation was invoked from a state that does not allow it.
    #[error("cannot {operation} a chunk in state {state:?}")]
    InvalidTransition {
        /// The state the chunk was in.
        state: ChunkState,
        /// The rejected operation.
        operation: &'static str,
    },
}

/// Errors raised while loading the world grid.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum WorldError {
    /// A chunk failed in a way the loader does not recover from.
    #[error("chunk at {position:?} failed to load: {source}")]
    Chunk {
        /// Grid coordinates of the failing chunk.
        position: Point3<i32>,
        /// The underlying chunk error.
        #[source]
        source: ChunkError,
    },

    /// A static scene mesh could not be uploaded.
    #[error("static mesh '{name}' failed to load: {source}")]
    StaticMesh {
        /// Name of the static mesh.
        name: String,
        /// The underlying error.
        #[source]
        source: ChunkError,
    },
}

/// Errors raised while reading engine settings.
#[derive(Error, Debug)]
pub enum SettingsError {
    /// The settings file exists but could not be read.
    #[error("could not read settings file '{path}': {source}")]
    Io {
        /// Path of the settings file.
        path: String,
        /// The I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The settings file is not valid JSON for [`crate::settings::EngineSettings`].
    #[error("could not parse settings file '{path}': {source}")]
    Parse {
        /// Path of the settings file.
        path: String,
        /// The JSON error.
        #[source]
        source: serde_json::Error,
    },
}

/// Fatal errors raised by the graphics bootstrap and the frame loop.
#[derive(Error, Debug)]
pub enum RenderError {
    /// The window could not be created.
    #[error("window creation failed: {0}")]
    Window(#[from] winit::error::OsError),

    /// The surface could not be created for the window.
    #[error("surface creation failed: {0}")]
    Surface(#[from] wgpu::CreateSurfaceError),

    /// No adapter is compatible with the surface.
    #[error("no compatible graphics adapter: {0}")]
    Adapter(#[from] wgpu::RequestAdapterError),

    /// The device could not be opened with the required features and limits.
    #[error("device request failed: {0}")]
    Device(#[from] wgpu::RequestDeviceError),

    /// The shader source could not be read.
    #[error("could not read shader '{path}': {source}")]
    Shader {
        /// Path of the shader file.
        path: String,
        /// The I/O error.
        #[source]
        source: std::io::Error,
    },

    /// Frame acquisition failed with a non-recoverable status.
    #[error("failed to acquire swap chain image: {0}")]
    FrameAcquisition(wgpu::SurfaceError),

    /// The world could not be loaded.
    #[error(transparent)]
    World(#[from] WorldError),

    /// A scene object could not be drawn.
    #[error("draw failed: {0}")]
    Draw(#[from] ChunkError),

    /// The settings file could not be loaded.
    #[error(transparent)]
    Settings(#[from] SettingsError),

    /// The event loop could not be created or exited with an error.
    #[error("event loop error: {0}")]
    EventLoop(#[from] winit::error::EventLoopError),
}
