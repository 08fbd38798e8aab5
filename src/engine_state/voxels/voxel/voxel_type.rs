//! # Voxel Type Module
//!
//! This module defines the different kinds of voxels a chunk can hold and the
//! conversions between the rich enum and its compact in-memory representation.

use num_derive::FromPrimitive;

use super::VoxelTypeSize;

/// Enumerates all possible voxel types in the world.
///
/// The `FromPrimitive` derive allows conversion from the compact integer form stored
/// in a [`super::Voxel`]. New variants must be appended so stored values stay stable.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, FromPrimitive)]
pub enum VoxelType {
    /// Empty space. Still meshed, since faces are emitted for every voxel.
    AIR,

    /// Solid rock, the only type produced by terrain generation.
    STONE,

    /// Solid grass. Not produced by any generator yet.
    GRASS,
}

impl VoxelType {
    /// Converts a `VoxelTypeSize` to a `VoxelType`.
    ///
    /// # Arguments
    /// * `vtype` - The voxel type as a `VoxelTypeSize`
    ///
    /// # Returns
    /// The corresponding `VoxelType`, or `None` if the value is not a known variant.
    pub fn from_int(vtype: VoxelTypeSize) -> Option<Self> {
        num::FromPrimitive::from_u8(vtype)
    }

    /// Whether this voxel type is anything other than air.
    pub fn is_solid(&self) -> bool {
        *self != VoxelType::AIR
    }
}
