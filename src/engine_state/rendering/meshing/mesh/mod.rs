//! Mesh generation for voxel rendering.
//!
//! This module converts voxel fields into GPU-friendly vertex and index lists.
//!
//! # Architecture
//! - [`Mesh`]: vertices and indices of one renderable object
//! - [`MeshLayout`]: how many vertices each voxel cube gets and how normals are assigned
//! - [`cube`]: the unit cube template every voxel is stamped from
//!
//! # Usage
//! ```ignore
//! use crate::engine_state::{
//!     rendering::meshing::mesh::{Mesh, MeshLayout},
//!     voxels::chunk::field::VoxelField,
//! };
//!
//! let field = VoxelField::checkerboard(4);
//! let mesh = Mesh::from_field(&field, MeshLayout::PerFace)?;
//! assert_eq!(mesh.index_count(), 36 * 64);
//! ```
//!
//! # Performance Considerations
//! - No faces are culled, so every voxel costs a full cube
//! - Buffers are reserved up front from the field length and layout

pub mod cube;
mod mesh;

pub use mesh::*;
