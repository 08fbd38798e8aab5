//! # Chunk Generation Module
//!
//! Procedural generation of voxel fields.
//!
//! ## Terrain
//!
//! Terrain is a 2-D height field. For every column `(x, z)` a fractal simplex sample
//! is taken and turned into an integer threshold `n` in `[0, S]`:
//!
//! ```text
//! n = clamp(int(((sample * amplitude + 1) / 2) * S), 0, S)
//! ```
//!
//! A voxel at height `y` is stone when `y < n / 2` and air otherwise, so the terrain
//! never rises above half the chunk. The height field is sampled once per column,
//! since `y` is not an input to the noise.
//!
//! ## Sampling
//!
//! With [`TerrainSampling::ChunkLocal`] the noise is sampled at chunk-local
//! coordinates and every chunk carries the same terrain. [`TerrainSampling::WorldSpace`]
//! offsets the sample by the chunk's world position so terrain is continuous across chunks.

use cgmath::Point3;
use noise::{Fbm, MultiFractal, NoiseFn, Simplex};
use serde::{Deserialize, Serialize};

use super::field::VoxelField;
use crate::engine_state::voxels::voxel::voxel_type::VoxelType;

/// The method used to fill new chunks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GenerationMethod {
    /// Noise-driven height field.
    Terrain,
    /// Every voxel is stone.
    Solid,
    /// Every voxel is air.
    Empty,
    /// Alternating stone and air along all three axes.
    Checkerboard,
}

/// Where terrain noise is sampled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TerrainSampling {
    /// Chunk-local `(x, z)`. Every chunk generates the same pattern.
    ChunkLocal,
    /// Chunk-local `(x, z)` plus the chunk's world offset.
    WorldSpace,
}

/// Parameters of the fractal noise behind terrain generation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NoiseParameters {
    /// Seed for the simplex source.
    pub seed: u32,
    /// Frequency of the first octave, in cycles per voxel.
    pub frequency: f64,
    /// Scale applied to the raw sample before normalization.
    pub amplitude: f64,
    /// Frequency multiplier between octaves.
    pub lacunarity: f64,
    /// Amplitude multiplier between octaves.
    pub persistence: f64,
    /// Number of octaves.
    pub octaves: usize,
}

impl Default for NoiseParameters {
    fn default() -> Self {
        let lacunarity = 2.3;
        Self {
            seed: 0,
            frequency: 1.0 / 32.0,
            amplitude: 1.0,
            lacunarity,
            persistence: 1.0 / lacunarity,
            octaves: 4,
        }
    }
}

/// Maps a raw noise sample to the integer column threshold `n ∈ [0, edge]`.
///
/// Samples outside `[-1, 1]` are clamped through the integer range.
pub fn column_threshold(sample: f64, edge: usize) -> usize {
    let scaled = ((sample + 1.0) / 2.0) * edge as f64;
    (scaled as i64).clamp(0, edge as i64) as usize
}

/// Classifies a voxel at height `y` in a column with threshold `n`.
pub fn classify_height(y: usize, threshold: usize) -> VoxelType {
    if (y as f64) < threshold as f64 / 2.0 {
        VoxelType::STONE
    } else {
        VoxelType::AIR
    }
}

/// Produces voxel fields for chunks.
///
/// The generator holds no mutable state, so one instance can fill any number of
/// chunks and each field depends only on the chunk position and the parameters.
pub struct ChunkGenerator {
    method: GenerationMethod,
    sampling: TerrainSampling,
    noise: Fbm<Simplex>,
    amplitude: f64,
}

impl ChunkGenerator {
    /// Creates a generator.
    ///
    /// # Arguments
    /// * `method` - How voxels are chosen
    /// * `sampling` - Whether terrain noise sees the chunk's world offset
    /// * `parameters` - Fractal noise parameters, used by [`GenerationMethod::Terrain`]
    pub fn new(
        method: GenerationMethod,
        sampling: TerrainSampling,
        parameters: &NoiseParameters,
    ) -> Self {
        let noise = Fbm::<Simplex>::new(parameters.seed)
            .set_octaves(parameters.octaves.max(1))
            .set_frequency(parameters.frequency)
            .set_lacunarity(parameters.lacunarity)
            .set_persistence(parameters.persistence);

        Self {
            method,
            sampling,
            noise,
            amplitude: parameters.amplitude,
        }
    }

    /// Generates the voxel field of the chunk at `position` (chunk grid coordinates).
    ///
    /// # Returns
    /// A well-formed field of `edge³` voxels.
    pub fn generate(&self, position: Point3<i32>, edge: usize) -> VoxelField {
        match self.method {
            GenerationMethod::Terrain => self.terrain(position, edge),
            GenerationMethod::Solid => VoxelField::uniform(edge, VoxelType::STONE),
            GenerationMethod::Empty => VoxelField::uniform(edge, VoxelType::AIR),
            GenerationMethod::Checkerboard => VoxelField::checkerboard(edge),
        }
    }

    /// Samples the terrain noise at a column, before normalization.
    pub fn sample(&self, x: f64, z: f64) -> f64 {
        self.noise.get([x, z]) * self.amplitude
    }

    /// Column thresholds for a chunk, indexed `z * edge + x`.
    pub fn height_map(&self, position: Point3<i32>, edge: usize) -> Vec<usize> {
        let (offset_x, offset_z) = match self.sampling {
            TerrainSampling::ChunkLocal => (0.0, 0.0),
            TerrainSampling::WorldSpace => (
                position.x as f64 * edge as f64,
                position.z as f64 * edge as f64,
            ),
        };

        let mut heights = Vec::with_capacity(edge * edge);
        for z in 0..edge {
            for x in 0..edge {
                let sample = self.sample(x as f64 + offset_x, z as f64 + offset_z);
                heights.push(column_threshold(sample, edge));
            }
        }
        heights
    }

    fn terrain(&self, position: Point3<i32>, edge: usize) -> VoxelField {
        let heights = self.height_map(position, edge);
        VoxelField::generate(edge, |x, y, z| classify_height(y, heights[z * edge + x]))
    }
}

#[cfg(test)]
mod tests {
    use test_case::test_case;

    use super::*;

    fn terrain_generator(sampling: TerrainSampling) -> ChunkGenerator {
        ChunkGenerator::new(
            GenerationMethod::Terrain,
            sampling,
            &NoiseParameters::default(),
        )
    }

    #[test_case(-1.0, 32, 0 ; "lowest sample")]
    #[test_case(0.0, 32, 16 ; "midpoint")]
    #[test_case(1.0, 32, 32 ; "highest sample")]
    #[test_case(5.0, 32, 32 ; "clamped above")]
    #[test_case(-3.0, 32, 0 ; "clamped below")]
    #[test_case(0.3, 10, 6 ; "truncates toward zero")]
    fn threshold_from_sample(sample: f64, edge: usize, expected: usize) {
        assert_eq!(column_threshold(sample, edge), expected);
    }

    #[test_case(0, 5, VoxelType::STONE ; "bottom of column")]
    #[test_case(2, 5, VoxelType::STONE ; "below half of odd threshold")]
    #[test_case(3, 5, VoxelType::AIR ; "above half of odd threshold")]
    #[test_case(15, 32, VoxelType::STONE ; "just under half")]
    #[test_case(16, 32, VoxelType::AIR ; "at half")]
    #[test_case(0, 0, VoxelType::AIR ; "empty column")]
    fn height_classification(y: usize, threshold: usize, expected: VoxelType) {
        assert_eq!(classify_height(y, threshold), expected);
    }

    #[test]
    fn terrain_matches_its_height_map() {
        let generator = terrain_generator(TerrainSampling::ChunkLocal);
        let edge = 16;
        let position = Point3::new(0, 0, 0);
        let heights = generator.height_map(position, edge);
        let field = generator.generate(position, edge);

        assert!(field.is_well_formed());
        for (p, voxel) in field.iter() {
            let threshold = heights[p.z * edge + p.x];
            assert_eq!(voxel.get_type(), Some(classify_height(p.y, threshold)));
        }
    }

    #[test]
    fn terrain_never_rises_above_half_the_chunk() {
        let generator = terrain_generator(TerrainSampling::ChunkLocal);
        let edge = 8;
        let field = generator.generate(Point3::new(0, 0, 0), edge);
        for (p, voxel) in field.iter() {
            if p.y >= edge / 2 {
                assert!(!voxel.is_solid(), "stone at {:?}", p);
            }
        }
    }

    #[test]
    fn chunk_local_sampling_repeats_terrain() {
        let generator = terrain_generator(TerrainSampling::ChunkLocal);
        let a = generator.generate(Point3::new(0, 0, 0), 8);
        let b = generator.generate(Point3::new(3, 0, -2), 8);
        assert_eq!(a, b);
    }

    #[test]
    fn world_space_sampling_follows_chunk_offset() {
        let generator = terrain_generator(TerrainSampling::WorldSpace);
        let edge = 8;
        let heights = generator.height_map(Point3::new(1, 0, 0), edge);
        for z in 0..edge {
            for x in 0..edge {
                let sample = generator.sample((x + edge) as f64, z as f64);
                assert_eq!(heights[z * edge + x], column_threshold(sample, edge));
            }
        }
    }

    #[test]
    fn generation_is_deterministic() {
        let a = terrain_generator(TerrainSampling::WorldSpace).generate(Point3::new(2, 0, 5), 8);
        let b = terrain_generator(TerrainSampling::WorldSpace).generate(Point3::new(2, 0, 5), 8);
        assert_eq!(a, b);
    }

    #[test_case(GenerationMethod::Solid, 27 ; "solid")]
    #[test_case(GenerationMethod::Empty, 0 ; "empty")]
    #[test_case(GenerationMethod::Checkerboard, 14 ; "checkerboard")]
    fn test_generators_fill_the_field(method: GenerationMethod, solid: usize) {
        let generator = ChunkGenerator::new(
            method,
            TerrainSampling::ChunkLocal,
            &NoiseParameters::default(),
        );
        let field = generator.generate(Point3::new(0, 0, 0), 3);
        assert_eq!(field.len(), 27);
        assert_eq!(field.solid_count(), solid);
    }
}
