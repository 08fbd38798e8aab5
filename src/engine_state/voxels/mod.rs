//! # Voxel World
//!
//! Voxel data and the scene built from it.
//!
//! ## Architecture
//!
//! * **Voxel**: one byte per cell, a [`voxel::voxel_type::VoxelType`] tag
//! * **Chunk**: an `edge³` field of voxels with its mesh and device buffers
//! * **World**: the scene of chunks and static meshes, drawn in creation order
//!
//! ## Data Flow
//!
//! 1. The world loader creates a chunk per grid position
//! 2. Each chunk generates its field from terrain noise or a fixed pattern
//! 3. The field is meshed and the mesh uploaded
//! 4. Every frame the world pushes each object's transform and draws it

pub mod chunk;
pub mod voxel;
pub mod world;
