//! The unit cube template every voxel is meshed from.
//!
//! Corners 0 to 3 walk counter-clockwise around the `z = 0` square and corners
//! 4 to 7 repeat the walk on the `z = 1` square:
//!
//! ```text
//!        7 ------- 6
//!       /|        /|
//!      3 ------- 2 |      y
//!      | 4 ------|-5      |  z
//!      |/        |/       | /
//!      0 ------- 1        |/___ x
//! ```

/// Corner offsets of the unit cube.
pub const CUBE_CORNERS: [[f32; 3]; 8] = [
    [0.0, 0.0, 0.0],
    [1.0, 0.0, 0.0],
    [1.0, 1.0, 0.0],
    [0.0, 1.0, 0.0],
    [0.0, 0.0, 1.0],
    [1.0, 0.0, 1.0],
    [1.0, 1.0, 1.0],
    [0.0, 1.0, 1.0],
];

/// Corner indices of the 12 cube triangles, six per face in [`CubeFace::ALL`] order.
#[rustfmt::skip]
pub const CUBE_INDICES: [u32; 36] = [
    1, 0, 3, 1, 3, 2, // north
    4, 5, 6, 4, 6, 7, // south
    5, 1, 2, 5, 2, 6, // east
    0, 4, 7, 0, 7, 3, // west
    2, 3, 7, 2, 7, 6, // top
    5, 4, 0, 5, 0, 1, // bottom
];

/// Face normals in [`CubeFace::ALL`] order.
pub const CUBE_NORMALS: [[f32; 3]; 6] = [
    [0.0, 0.0, -1.0],
    [0.0, 0.0, 1.0],
    [1.0, 0.0, 0.0],
    [-1.0, 0.0, 0.0],
    [0.0, 1.0, 0.0],
    [0.0, -1.0, 0.0],
];

/// Color of every vertex of a voxel that is not air.
pub const SOLID_COLOR: [f32; 3] = [0.4, 0.4, 0.4];

/// Color of every vertex of an air voxel.
pub const AIR_COLOR: [f32; 3] = [0.8, 0.2, 0.25];

/// The six faces of a cube.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum CubeFace {
    /// Facing negative Z
    NORTH = 0,
    /// Facing positive Z
    SOUTH = 1,
    /// Facing positive X
    EAST = 2,
    /// Facing negative X
    WEST = 3,
    /// Facing positive Y
    TOP = 4,
    /// Facing negative Y
    BOTTOM = 5,
}

impl CubeFace {
    /// All faces, in template order.
    pub const ALL: [CubeFace; 6] = [
        CubeFace::NORTH,
        CubeFace::SOUTH,
        CubeFace::EAST,
        CubeFace::WEST,
        CubeFace::TOP,
        CubeFace::BOTTOM,
    ];

    /// The six corner indices of this face's two triangles.
    pub fn indices(&self) -> [u32; 6] {
        let start = *self as usize * 6;
        let mut indices = [0; 6];
        indices.copy_from_slice(&CUBE_INDICES[start..start + 6]);
        indices
    }

    /// The four distinct corners of this face, in winding order.
    ///
    /// Each face's triangles are `a b c` and `a c d`, so the quad is `[a, b, c, d]`.
    pub fn quad(&self) -> [u32; 4] {
        let [a, b, c, _, _, d] = self.indices();
        [a, b, c, d]
    }

    /// The outward unit normal of this face.
    pub fn normal(&self) -> [f32; 3] {
        CUBE_NORMALS[*self as usize]
    }
}

/// Vertex color for a voxel, chosen only by whether it is air.
pub fn voxel_color(is_solid: bool) -> [f32; 3] {
    if is_solid {
        SOLID_COLOR
    } else {
        AIR_COLOR
    }
}
