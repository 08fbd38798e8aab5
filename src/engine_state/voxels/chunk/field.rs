//! # Voxel Field Module
//!
//! Dense storage for the voxels of a single chunk.
//!
//! ## Layout
//!
//! A field of edge length `S` stores exactly `S³` voxels in a flat vector, iterated
//! `y` outermost, then `z`, then `x` innermost:
//!
//! ```text
//! index = (y * S + z) * S + x
//! ```
//!
//! The mesh builder relies on this order, because a voxel's index in the field is
//! also the block number used to offset its vertices in the vertex buffer.

use cgmath::Point3;

use crate::engine_state::voxels::voxel::{voxel_type::VoxelType, Voxel};

/// A cube of `edge³` voxels in y→z→x order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VoxelField {
    edge: usize,
    voxels: Vec<Voxel>,
}

impl VoxelField {
    /// Builds a field by classifying every grid position in y→z→x order.
    ///
    /// # Arguments
    /// * `edge` - The edge length of the field
    /// * `classify` - Called once per position as `classify(x, y, z)`
    pub fn generate<F>(edge: usize, mut classify: F) -> Self
    where
        F: FnMut(usize, usize, usize) -> VoxelType,
    {
        let mut voxels = Vec::with_capacity(edge * edge * edge);
        for y in 0..edge {
            for z in 0..edge {
                for x in 0..edge {
                    voxels.push(Voxel::new(classify(x, y, z)));
                }
            }
        }

        Self { edge, voxels }
    }

    /// A field with no voxels at all. Meshing it produces no geometry.
    pub fn unallocated(edge: usize) -> Self {
        Self {
            edge,
            voxels: Vec::new(),
        }
    }

    /// A field of `edge³` voxels of the same type.
    pub fn uniform(edge: usize, voxel_type: VoxelType) -> Self {
        Self::generate(edge, |_, _, _| voxel_type)
    }

    /// A 3-D checkerboard of stone and air, with stone at the origin.
    pub fn checkerboard(edge: usize) -> Self {
        Self::generate(edge, |x, y, z| {
            if (x + y + z) % 2 == 0 {
                VoxelType::STONE
            } else {
                VoxelType::AIR
            }
        })
    }

    /// The number of voxels a well-formed field of this edge holds.
    pub fn expected_len(&self) -> usize {
        self.edge * self.edge * self.edge
    }

    /// The number of voxels actually stored.
    pub fn len(&self) -> usize {
        self.voxels.len()
    }

    /// Whether the field stores no voxels.
    pub fn is_empty(&self) -> bool {
        self.voxels.is_empty()
    }

    /// Whether the stored length matches `edge³`.
    pub fn is_well_formed(&self) -> bool {
        self.len() == self.expected_len()
    }

    /// Grid position of a flat index, for a field stored in y→z→x order.
    pub fn position_of(&self, index: usize) -> Point3<usize> {
        let x = index % self.edge;
        let z = (index / self.edge) % self.edge;
        let y = index / (self.edge * self.edge);
        Point3::new(x, y, z)
    }

    /// Iterates voxels together with their grid positions, in storage order.
    pub fn iter(&self) -> impl Iterator<Item = (Point3<usize>, &Voxel)> + '_ {
        self.voxels
            .iter()
            .enumerate()
            .map(move |(index, voxel)| (self.position_of(index), voxel))
    }
}

#[cfg(test)]
impl VoxelField {
    /// Wraps an existing voxel sequence without validating its length.
    ///
    /// Mesh building rejects fields whose length is not `edge³`.
    pub fn from_voxels(edge: usize, voxels: Vec<Voxel>) -> Self {
        Self { edge, voxels }
    }

    /// The flat voxel slice, in y→z→x order.
    pub fn voxels(&self) -> &[Voxel] {
        &self.voxels
    }

    /// Flat index of a grid position.
    pub fn index_of(&self, x: usize, y: usize, z: usize) -> usize {
        (y * self.edge + z) * self.edge + x
    }

    /// The voxel at a grid position, if the position is inside the stored data.
    pub fn get(&self, x: usize, y: usize, z: usize) -> Option<&Voxel> {
        if x >= self.edge || y >= self.edge || z >= self.edge {
            return None;
        }
        self.voxels.get(self.index_of(x, y, z))
    }

    /// Number of voxels that are not air.
    pub fn solid_count(&self) -> usize {
        self.voxels.iter().filter(|voxel| voxel.is_solid()).count()
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use test_case::test_case;

    use super::*;

    #[test_case(1 ; "single voxel")]
    #[test_case(2 ; "two")]
    #[test_case(5 ; "odd edge")]
    #[test_case(32 ; "full chunk")]
    fn generate_visits_every_position_once(edge: usize) {
        let mut visited = Vec::new();
        let field = VoxelField::generate(edge, |x, y, z| {
            visited.push(Point3::new(x, y, z));
            VoxelType::STONE
        });

        assert_eq!(field.len(), edge * edge * edge);
        assert!(field.is_well_formed());

        let unique: HashSet<_> = visited.iter().map(|p| (p.x, p.y, p.z)).collect();
        assert_eq!(unique.len(), edge * edge * edge);
        for (index, position) in visited.iter().enumerate() {
            assert_eq!(field.index_of(position.x, position.y, position.z), index);
            assert_eq!(field.position_of(index), *position);
        }
    }

    #[test]
    fn iteration_is_y_then_z_then_x() {
        let mut visited = Vec::new();
        VoxelField::generate(2, |x, y, z| {
            visited.push((x, y, z));
            VoxelType::AIR
        });

        assert_eq!(
            visited,
            vec![
                (0, 0, 0),
                (1, 0, 0),
                (0, 0, 1),
                (1, 0, 1),
                (0, 1, 0),
                (1, 1, 0),
                (0, 1, 1),
                (1, 1, 1),
            ]
        );
    }

    #[test]
    fn checkerboard_alternates_along_every_axis() {
        let field = VoxelField::checkerboard(4);
        for (position, voxel) in field.iter() {
            let expected = (position.x + position.y + position.z) % 2 == 0;
            assert_eq!(voxel.is_solid(), expected, "at {:?}", position);
        }
        assert_eq!(field.solid_count(), 32);
    }

    #[test]
    fn get_rejects_positions_outside_the_field() {
        let field = VoxelField::uniform(3, VoxelType::STONE);
        assert!(field.get(2, 2, 2).is_some());
        assert!(field.get(3, 0, 0).is_none());
        assert!(field.get(0, 3, 0).is_none());
        assert!(field.get(0, 0, 3).is_none());
    }

    #[test]
    fn malformed_field_is_reported() {
        let mut voxels = VoxelField::uniform(2, VoxelType::STONE).voxels().to_vec();
        voxels.pop();
        let field = VoxelField::from_voxels(2, voxels);
        assert!(!field.is_well_formed());
        assert_eq!(field.expected_len(), 8);
        assert_eq!(field.len(), 7);
    }
}
