//! Mesh data structures and the naive voxel mesher.
//!
//! Every voxel of a field is emitted as a full cube, whatever its type and its
//! neighbours. Voxel `j` (its index in the field) owns a contiguous block of vertices
//! starting at `j * vertices_per_voxel`, and its 36 indices point only into that block.

use serde::{Deserialize, Serialize};

use super::cube::{voxel_color, CubeFace, CUBE_CORNERS, CUBE_INDICES, CUBE_NORMALS};
use crate::{
    engine_state::{rendering::Vertex, voxels::chunk::field::VoxelField},
    error::ChunkError,
};

/// Number of indices emitted per voxel, in every layout.
pub const INDICES_PER_VOXEL: usize = 36;

/// How cube vertices are laid out for each voxel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MeshLayout {
    /// Four vertices per face (24 per voxel), each carrying its face's normal.
    PerFace,
    /// The eight cube corners (8 per voxel) shared by all faces.
    ///
    /// Corner `c` is given the normal of face `c / 2`, so shading is only loosely
    /// related to the faces a corner belongs to.
    SharedCorners,
}

impl MeshLayout {
    /// Vertices emitted per voxel in this layout.
    pub fn vertices_per_voxel(&self) -> usize {
        match self {
            MeshLayout::PerFace => 24,
            MeshLayout::SharedCorners => 8,
        }
    }

    /// Number of vertices a mesh of `voxel_count` voxels holds in this layout.
    ///
    /// # Errors
    /// [`ChunkError::TooManyVertices`] if the count does not fit the `u32` index range.
    pub fn vertex_total(&self, voxel_count: usize) -> Result<u32, ChunkError> {
        voxel_count
            .checked_mul(self.vertices_per_voxel())
            .and_then(|total| u32::try_from(total).ok())
            .ok_or(ChunkError::TooManyVertices { voxel_count })
    }
}

/// CPU-side geometry of one renderable object.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Mesh {
    /// The vertex data
    pub vertices: Vec<Vertex>,
    /// Triangle list indices into `vertices`
    pub indices: Vec<u32>,
}

impl Mesh {
    /// Creates a new, empty mesh.
    pub fn new() -> Self {
        Mesh {
            vertices: Vec::new(),
            indices: Vec::new(),
        }
    }

    /// Builds a fresh mesh from a voxel field.
    ///
    /// # Errors
    /// See [`Mesh::build`].
    #[cfg(test)]
    pub fn from_field(field: &VoxelField, layout: MeshLayout) -> Result<Self, ChunkError> {
        let mut mesh = Mesh::new();
        mesh.build(field, layout)?;
        Ok(mesh)
    }

    /// Replaces this mesh's contents with the naive mesh of `field`.
    ///
    /// Vertices are emitted voxel by voxel in field order. A field with no voxels
    /// yields an empty mesh.
    ///
    /// # Arguments
    /// * `field` - The voxel field to mesh
    /// * `layout` - The per-voxel vertex layout
    ///
    /// # Errors
    /// * [`ChunkError::InvalidFieldSize`] if the field is non-empty and does not hold
    ///   exactly `edge³` voxels
    /// * [`ChunkError::TooManyVertices`] if the mesh could not be indexed with `u32`
    ///
    /// The mesh is left untouched on error.
    pub fn build(&mut self, field: &VoxelField, layout: MeshLayout) -> Result<(), ChunkError> {
        if !field.is_empty() && !field.is_well_formed() {
            return Err(ChunkError::InvalidFieldSize {
                expected: field.expected_len(),
                actual: field.len(),
            });
        }

        let vertex_total = layout.vertex_total(field.len())?;

        self.vertices.clear();
        self.indices.clear();
        self.vertices.reserve(vertex_total as usize);
        self.indices.reserve(field.len() * INDICES_PER_VOXEL);

        for (position, voxel) in field.iter() {
            let origin = [position.x as f32, position.y as f32, position.z as f32];
            let color = voxel_color(voxel.is_solid());
            match layout {
                MeshLayout::PerFace => self.push_cube_per_face(origin, color),
                MeshLayout::SharedCorners => self.push_cube_shared_corners(origin, color),
            }
        }

        Ok(())
    }

    /// A single unit cube at the origin, in the per-face layout.
    pub fn unit_cube(color: [f32; 3]) -> Self {
        let mut mesh = Mesh::new();
        mesh.push_cube_per_face([0.0, 0.0, 0.0], color);
        mesh
    }

    /// Number of vertices.
    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    /// Number of indices.
    pub fn index_count(&self) -> usize {
        self.indices.len()
    }

    /// Whether the mesh has no vertices.
    #[cfg(test)]
    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }

    fn push_cube_per_face(&mut self, origin: [f32; 3], color: [f32; 3]) {
        for face in CubeFace::ALL {
            // In range: `build` checks the total against `MeshLayout::vertex_total`.
            let base = self.vertices.len() as u32;
            let normal = face.normal();
            for corner in face.quad() {
                self.vertices.push(Vertex::new(
                    offset(origin, CUBE_CORNERS[corner as usize]),
                    color,
                    normal,
                ));
            }
            self.indices.extend([0u32, 1, 2, 0, 2, 3].iter().map(|i| base + i));
        }
    }

    fn push_cube_shared_corners(&mut self, origin: [f32; 3], color: [f32; 3]) {
        let base = self.vertices.len() as u32;
        for (corner, corner_offset) in CUBE_CORNERS.iter().enumerate() {
            self.vertices.push(Vertex::new(
                offset(origin, *corner_offset),
                color,
                CUBE_NORMALS[corner / 2],
            ));
        }
        self.indices.extend(CUBE_INDICES.iter().map(|i| base + i));
    }
}

fn offset(origin: [f32; 3], corner: [f32; 3]) -> [f32; 3] {
    [
        origin[0] + corner[0],
        origin[1] + corner[1],
        origin[2] + corner[2],
    ]
}
