//! # Engine Settings
//!
//! Runtime configuration, read once at startup from a JSON file.
//!
//! The file path is taken from the `VOXEL_WORLD_SETTINGS` environment variable and
//! defaults to `voxel_world.json` in the working directory. A missing file means
//! "use the defaults"; a file that exists but cannot be read or parsed is an error.
//! Every field is optional, so a file only needs to list what it overrides:
//!
//! ```json
//! {
//!     "world_extent": [4, 1, 4],
//!     "terrain_sampling": "world_space",
//!     "noise": { "seed": 7 }
//! }
//! ```

use std::path::Path;

use log::info;
use serde::{Deserialize, Serialize};

use crate::{
    engine_state::{
        rendering::meshing::mesh::MeshLayout,
        voxels::chunk::{
            chunk_generation::{GenerationMethod, NoiseParameters, TerrainSampling},
            CHUNK_DIMENSION,
        },
    },
    error::SettingsError,
};

/// Environment variable holding the settings file path.
pub const SETTINGS_PATH_VARIABLE: &str = "VOXEL_WORLD_SETTINGS";

/// Settings file used when the environment variable is not set.
pub const DEFAULT_SETTINGS_PATH: &str = "voxel_world.json";

/// Camera placement, projection and controller tuning.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraSettings {
    /// Vertical field of view in degrees
    pub fov_degrees: f32,
    /// Near clipping plane distance
    pub near: f32,
    /// Far clipping plane distance
    pub far: f32,
    /// Movement speed in world units per second
    pub move_speed: f32,
    /// Look speed in radians per second
    pub look_speed: f32,
    /// Starting position in world space
    pub position: [f32; 3],
    /// Starting yaw in degrees, 0 looking along +X
    pub yaw_degrees: f32,
    /// Starting pitch in degrees, negative looking down
    pub pitch_degrees: f32,
}

impl Default for CameraSettings {
    fn default() -> Self {
        Self {
            fov_degrees: 60.0,
            near: 0.1,
            far: 512.0,
            move_speed: 9.0,
            look_speed: 1.5,
            position: [-24.0, 40.0, -24.0],
            yaw_degrees: 45.0,
            pitch_degrees: -25.0,
        }
    }
}

/// Everything configurable about the engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineSettings {
    /// Chunk edge length in voxels
    pub chunk_edge: usize,
    /// Number of chunks along x, y and z
    pub world_extent: [u32; 3],
    /// How chunk voxels are generated
    pub generation: GenerationMethod,
    /// Terrain noise parameters
    pub noise: NoiseParameters,
    /// Whether terrain noise sees chunk world offsets
    pub terrain_sampling: TerrainSampling,
    /// Per-voxel vertex layout
    pub mesh_layout: MeshLayout,
    /// Camera settings
    pub camera: CameraSettings,
    /// Whether a unit cube is placed at the world origin
    pub origin_marker: bool,
    /// Path of the WGSL shader
    pub shader_path: String,
    /// Window title
    pub window_title: String,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            chunk_edge: CHUNK_DIMENSION,
            world_extent: [8, 1, 8],
            generation: GenerationMethod::Terrain,
            noise: NoiseParameters::default(),
            terrain_sampling: TerrainSampling::ChunkLocal,
            mesh_layout: MeshLayout::PerFace,
            camera: CameraSettings::default(),
            origin_marker: true,
            shader_path: "assets/shaders/voxel_shader.wgsl".to_owned(),
            window_title: "Voxel World".to_owned(),
        }
    }
}

impl EngineSettings {
    /// Loads settings from the file named by `VOXEL_WORLD_SETTINGS`, or the default path.
    pub fn load() -> Result<Self, SettingsError> {
        let path = std::env::var(SETTINGS_PATH_VARIABLE)
            .unwrap_or_else(|_| DEFAULT_SETTINGS_PATH.to_owned());
        Self::load_from(Path::new(&path))
    }

    /// Loads settings from `path`, falling back to defaults if the file does not exist.
    pub fn load_from(path: &Path) -> Result<Self, SettingsError> {
        let display = path.display().to_string();
        let contents = match std::fs::read_to_string(path) {
            Ok(contents) => contents,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                info!("No settings file at '{}', using defaults", display);
                return Ok(Self::default());
            }
            Err(source) => {
                return Err(SettingsError::Io {
                    path: display,
                    source,
                })
            }
        };

        let settings = Self::from_json(&contents).map_err(|source| SettingsError::Parse {
            path: display.clone(),
            source,
        })?;
        info!("Loaded settings from '{}'", display);
        Ok(settings)
    }

    /// Parses settings from a JSON document. Missing fields take their defaults.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Total number of chunks in the world grid.
    pub fn chunk_count(&self) -> usize {
        self.world_extent.iter().map(|e| *e as usize).product()
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;

    use super::*;

    #[test]
    fn defaults_describe_the_reference_world() {
        let settings = EngineSettings::default();
        assert_eq!(settings.chunk_edge, 32);
        assert_eq!(settings.world_extent, [8, 1, 8]);
        assert_eq!(settings.chunk_count(), 64);
        assert_eq!(settings.generation, GenerationMethod::Terrain);
        assert_eq!(settings.terrain_sampling, TerrainSampling::ChunkLocal);
        assert_eq!(settings.mesh_layout, MeshLayout::PerFace);
        assert_relative_eq!(settings.noise.lacunarity, 2.3);
        assert_relative_eq!(settings.noise.persistence, 1.0 / 2.3);
        assert_relative_eq!(settings.camera.fov_degrees, 60.0);
        assert_relative_eq!(settings.camera.far, 512.0);
    }

    #[test]
    fn empty_document_is_all_defaults() {
        assert_eq!(
            EngineSettings::from_json("{}").unwrap(),
            EngineSettings::default()
        );
    }

    #[test]
    fn partial_document_overrides_only_listed_fields() {
        let settings = EngineSettings::from_json(
            r#"{
                "world_extent": [2, 1, 3],
                "generation": "checkerboard",
                "mesh_layout": "shared_corners",
                "terrain_sampling": "world_space",
                "noise": { "seed": 9 },
                "camera": { "move_speed": 20.0 }
            }"#,
        )
        .unwrap();

        assert_eq!(settings.world_extent, [2, 1, 3]);
        assert_eq!(settings.generation, GenerationMethod::Checkerboard);
        assert_eq!(settings.mesh_layout, MeshLayout::SharedCorners);
        assert_eq!(settings.terrain_sampling, TerrainSampling::WorldSpace);
        assert_eq!(settings.noise.seed, 9);
        assert_eq!(settings.noise.octaves, NoiseParameters::default().octaves);
        assert_relative_eq!(settings.camera.move_speed, 20.0);
        assert_relative_eq!(settings.camera.look_speed, 1.5);
        assert_eq!(settings.chunk_edge, 32);
    }

    #[test]
    fn unknown_enum_value_is_an_error() {
        assert!(EngineSettings::from_json(r#"{ "generation": "caves" }"#).is_err());
    }

    #[test]
    fn missing_file_falls_back_to_defaults() {
        let path = std::env::temp_dir().join("voxel-world-settings-that-does-not-exist.json");
        assert_eq!(
            EngineSettings::load_from(&path).unwrap(),
            EngineSettings::default()
        );
    }

    #[test]
    fn malformed_file_is_a_parse_error() {
        let path = std::env::temp_dir().join(format!(
            "voxel-world-malformed-{}.json",
            std::process::id()
        ));
        std::fs::write(&path, "{ not json").unwrap();

        let result = EngineSettings::load_from(&path);
        let _ = std::fs::remove_file(&path);

        assert!(matches!(result, Err(SettingsError::Parse { .. })));
    }

    #[test]
    fn settings_round_trip_through_json() {
        let mut settings = EngineSettings::default();
        settings.origin_marker = false;
        settings.window_title = "test".to_owned();

        let json = serde_json::to_string(&settings).unwrap();
        assert_eq!(EngineSettings::from_json(&json).unwrap(), settings);
    }
}
