//! # Voxel Module
//!
//! This module provides the single-cell data type stored in a chunk's voxel field.
//! Positions are not stored; they are implied by the voxel's index in the field.

use voxel_type::VoxelType;

pub mod voxel_type;

/// The underlying integer type used to represent voxel types in memory.
pub type VoxelTypeSize = u8;

/// Represents a single voxel in a chunk.
///
/// # Memory Layout
/// The `#[repr(C)]` attribute keeps the layout stable so a field can be viewed as raw
/// bytes. The voxel type is stored as a compact `VoxelTypeSize`.
#[repr(C)]
#[derive(Copy, Clone, bytemuck::Pod, bytemuck::Zeroable, Debug, PartialEq, Eq)]
pub struct Voxel {
    /// The type of this voxel, encoded as a `VoxelTypeSize`.
    pub voxel_type: VoxelTypeSize,
}

impl Voxel {
    /// Creates a new voxel of the specified type.
    ///
    /// # Arguments
    /// * `voxel_type` - The type of voxel to create
    pub fn new(voxel_type: VoxelType) -> Self {
        Voxel {
            voxel_type: voxel_type as VoxelTypeSize,
        }
    }

    /// Decodes the stored type, if it is a known variant.
    pub fn get_type(&self) -> Option<VoxelType> {
        VoxelType::from_int(self.voxel_type)
    }

    /// Whether this voxel is anything other than air.
    ///
    /// Unknown encodings count as solid, since only air is exempt from the solid palette.
    pub fn is_solid(&self) -> bool {
        match self.get_type() {
            Some(voxel_type) => voxel_type.is_solid(),
            None => true,
        }
    }
}

impl Default for Voxel {
    fn default() -> Self {
        Voxel::new(VoxelType::AIR)
    }
}
