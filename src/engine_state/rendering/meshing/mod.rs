//! Mesh generation and rendering for voxel chunks.
//!
//! # Architecture
//! - `mesh/`: Turns a voxel field into vertex and index arrays
//! - `MeshingRenderer`: Owns the render pipeline and records the scene's draws
//!
//! # Performance Considerations
//! - Every voxel emits a full cube, so meshes are large but trivially cheap to build
//! - One draw call per scene object

pub mod mesh;
mod renderer;

pub use renderer::*;
