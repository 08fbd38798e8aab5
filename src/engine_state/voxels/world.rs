//! # World Module
//!
//! This module provides the `World` struct, the scene every frame draws: a set of
//! objects, each a voxel chunk, a static mesh, or an empty placeholder, with a
//! transform that is pushed to the GPU before the object is drawn.
//!
//! ## Loading
//!
//! [`World::load_chunk_grid`] fills the world once at startup. Chunks are created at
//! every grid position of the configured extent, generated, meshed and uploaded in
//! turn, on the calling thread. A chunk whose field is malformed or which produced
//! no drawable geometry is skipped with a warning; any other failure aborts the load.
//!
//! ## Draw Order
//!
//! Objects are kept in a `BTreeMap` keyed by creation id, so draw order is the
//! order objects were added and is stable across runs.

use std::collections::{BTreeMap, HashMap};

use cgmath::{Matrix, Matrix4, Point3, Rad, SquareMatrix, Vector3};
use log::{debug, info, warn};

use crate::{
    engine_state::rendering::{meshing::mesh::Mesh, CommandContext, GpuMesh, GpuUploader},
    error::{ChunkError, WorldError},
    settings::EngineSettings,
};

use super::chunk::{chunk_generation::ChunkGenerator, Chunk};

/// Stable identifier of a scene object. Assigned in creation order.
pub type ObjectId = u32;

/// Placement of a scene object.
///
/// Rotation is Tait-Bryan angles in radians applied Y, then X, then Z.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    /// Translation in world units
    pub translation: Vector3<f32>,
    /// Per-axis scale
    pub scale: Vector3<f32>,
    /// Rotation around x, y and z in radians
    pub rotation: Vector3<f32>,
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            translation: Vector3::new(0.0, 0.0, 0.0),
            scale: Vector3::new(1.0, 1.0, 1.0),
            rotation: Vector3::new(0.0, 0.0, 0.0),
        }
    }
}

impl Transform {
    /// A pure translation.
    pub fn from_translation(translation: Vector3<f32>) -> Self {
        Self {
            translation,
            ..Self::default()
        }
    }

    /// `T * Ry * Rx * Rz * S`
    pub fn model_matrix(&self) -> Matrix4<f32> {
        Matrix4::from_translation(self.translation)
            * Matrix4::from_angle_y(Rad(self.rotation.y))
            * Matrix4::from_angle_x(Rad(self.rotation.x))
            * Matrix4::from_angle_z(Rad(self.rotation.z))
            * Matrix4::from_nonuniform_scale(self.scale.x, self.scale.y, self.scale.z)
    }

    /// Inverse transpose of the model matrix, for transforming normals.
    ///
    /// Falls back to identity when the scale makes the model matrix singular.
    pub fn normal_matrix(&self) -> Matrix4<f32> {
        self.model_matrix()
            .invert()
            .map(|inverse| inverse.transpose())
            .unwrap_or_else(Matrix4::identity)
    }

    /// The per-object push constant block.
    pub fn push_constants(&self) -> ObjectPushConstants {
        ObjectPushConstants {
            model: self.model_matrix().into(),
            normal_matrix: self.normal_matrix().into(),
        }
    }
}

/// Per-object data pushed before each draw. 128 bytes.
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct ObjectPushConstants {
    /// Model matrix
    pub model: [[f32; 4]; 4],
    /// Normal matrix
    pub normal_matrix: [[f32; 4]; 4],
}

/// A mesh loaded once and never modified.
#[derive(Debug)]
pub struct StaticMesh<B> {
    /// Name, used in labels and logs
    pub name: String,
    /// The CPU-side geometry
    pub mesh: Mesh,
    /// The uploaded buffers
    pub gpu_mesh: GpuMesh<B>,
}

/// What a scene object renders.
#[derive(Debug)]
pub enum SceneObjectKind<B> {
    /// A loaded mesh
    StaticMesh(StaticMesh<B>),
    /// A voxel chunk
    VoxelChunk(Chunk<B>),
    /// Nothing
    #[allow(dead_code)]
    Empty,
}

/// One entry of the scene.
#[derive(Debug)]
pub struct SceneObject<B> {
    /// Stable id, also the draw order key
    pub id: ObjectId,
    /// World placement
    pub transform: Transform,
    /// Payload
    pub kind: SceneObjectKind<B>,
}

impl<B> SceneObject<B> {
    /// Pushes this object's constants, binds its buffers and draws it.
    ///
    /// Empty objects record nothing.
    pub fn draw<C>(&self, context: &mut C) -> Result<(), ChunkError>
    where
        C: CommandContext<B> + ?Sized,
    {
        match &self.kind {
            SceneObjectKind::Empty => Ok(()),
            SceneObjectKind::StaticMesh(static_mesh) => {
                context.push_object_constants(bytemuck::bytes_of(
                    &self.transform.push_constants(),
                ));
                static_mesh.gpu_mesh.bind(context);
                static_mesh.gpu_mesh.draw(context);
                Ok(())
            }
            SceneObjectKind::VoxelChunk(chunk) => {
                context.push_object_constants(bytemuck::bytes_of(
                    &self.transform.push_constants(),
                ));
                chunk.bind(context)?;
                chunk.draw(context)
            }
        }
    }
}

/// Summary of a chunk grid load.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WorldLoadReport {
    /// Chunks generated, meshed and uploaded
    pub loaded: usize,
    /// Grid positions of chunks skipped, with the reason
    pub skipped: Vec<(Point3<i32>, ChunkError)>,
    /// Vertices uploaded across all loaded chunks
    pub vertex_count: usize,
    /// Indices uploaded across all loaded chunks
    pub index_count: usize,
}

/// The scene: every object drawn each frame.
#[derive(Debug)]
pub struct World<B> {
    objects: BTreeMap<ObjectId, SceneObject<B>>,
    chunk_ids: HashMap<Point3<i32>, ObjectId>,
    next_id: ObjectId,
}

impl<B> Default for World<B> {
    fn default() -> Self {
        Self::new()
    }
}

impl<B> World<B> {
    /// Creates a new, empty world.
    pub fn new() -> Self {
        World {
            objects: BTreeMap::new(),
            chunk_ids: HashMap::new(),
            next_id: 0,
        }
    }

    /// Adds an object and returns its id.
    pub fn add_object(&mut self, transform: Transform, kind: SceneObjectKind<B>) -> ObjectId {
        let id = self.next_id;
        self.next_id += 1;

        if let SceneObjectKind::VoxelChunk(chunk) = &kind {
            self.chunk_ids.insert(chunk.position, id);
        }
        self.objects.insert(
            id,
            SceneObject {
                id,
                transform,
                kind,
            },
        );
        id
    }

    /// Adds a chunk, placed at its grid translation.
    ///
    /// Does nothing if a chunk already exists at the same position.
    ///
    /// # Returns
    /// The id of the chunk at that position.
    pub fn add_chunk(&mut self, chunk: Chunk<B>) -> ObjectId {
        if let Some(id) = self.chunk_ids.get(&chunk.position) {
            return *id;
        }
        let transform = Transform::from_translation(chunk.translation());
        self.add_object(transform, SceneObjectKind::VoxelChunk(chunk))
    }

    /// Uploads a mesh and adds it as a static object.
    ///
    /// # Errors
    /// [`WorldError::StaticMesh`] if the mesh is degenerate or the upload fails.
    pub fn add_static_mesh<U>(
        &mut self,
        name: &str,
        mesh: Mesh,
        transform: Transform,
        uploader: &mut U,
    ) -> Result<ObjectId, WorldError>
    where
        U: GpuUploader<Buffer = B>,
    {
        let gpu_mesh =
            GpuMesh::upload(uploader, name, &mesh).map_err(|source| WorldError::StaticMesh {
                name: name.to_owned(),
                source,
            })?;

        let static_mesh = StaticMesh {
            name: name.to_owned(),
            mesh,
            gpu_mesh,
        };
        debug!(
            "Static mesh '{}': {} vertices, {} indices",
            static_mesh.name,
            static_mesh.mesh.vertex_count(),
            static_mesh.mesh.index_count()
        );
        Ok(self.add_object(transform, SceneObjectKind::StaticMesh(static_mesh)))
    }

    /// Generates, meshes and uploads every chunk of the configured grid.
    ///
    /// Chunks are visited `y`, then `z`, then `x`, and added in that order.
    ///
    /// # Errors
    /// [`WorldError::Chunk`] for the first chunk failure that is not skippable.
    /// Chunks loaded before the failure stay in the world.
    pub fn load_chunk_grid<U>(
        &mut self,
        settings: &EngineSettings,
        uploader: &mut U,
    ) -> Result<WorldLoadReport, WorldError>
    where
        U: GpuUploader<Buffer = B>,
    {
        let generator = ChunkGenerator::new(
            settings.generation,
            settings.terrain_sampling,
            &settings.noise,
        );
        let [extent_x, extent_y, extent_z] = settings.world_extent;
        let mut report = WorldLoadReport::default();

        for y in 0..extent_y as i32 {
            for z in 0..extent_z as i32 {
                for x in 0..extent_x as i32 {
                    let position = Point3::new(x, y, z);
                    let mut chunk = Chunk::new(position, settings.chunk_edge);

                    let result = chunk
                        .initialize(&generator)
                        .and_then(|_| chunk.build_mesh(settings.mesh_layout, uploader));

                    match result {
                        Ok(()) => {
                            report.loaded += 1;
                            report.vertex_count += chunk.mesh().vertex_count();
                            report.index_count += chunk.mesh().index_count();
                            self.add_chunk(chunk);
                        }
                        Err(err) if is_skippable(&err) => {
                            warn!("Skipping chunk {:?}: {}", position, err);
                            report.skipped.push((position, err));
                        }
                        Err(source) => return Err(WorldError::Chunk { position, source }),
                    }
                }
            }
        }

        info!(
            "Loaded {} chunks ({} skipped): {} vertices, {} indices",
            report.loaded,
            report.skipped.len(),
            report.vertex_count,
            report.index_count
        );
        Ok(report)
    }

    /// The chunk at a grid position.
    #[cfg(test)]
    pub fn get_chunk_at(&self, position: Point3<i32>) -> Option<&Chunk<B>> {
        let id = self.chunk_ids.get(&position)?;
        match &self.objects.get(id)?.kind {
            SceneObjectKind::VoxelChunk(chunk) => Some(chunk),
            _ => None,
        }
    }

    /// Objects in draw order.
    pub fn objects(&self) -> impl Iterator<Item = &SceneObject<B>> {
        self.objects.values()
    }

    /// Number of objects.
    pub fn len(&self) -> usize {
        self.objects.len()
    }

    /// Whether the world has no objects.
    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    /// Number of chunk objects.
    pub fn chunk_count(&self) -> usize {
        self.chunk_ids.len()
    }

    /// Records every object's draw, in id order.
    ///
    /// # Errors
    /// The first chunk that is not drawable.
    pub fn draw_all<C>(&self, context: &mut C) -> Result<(), ChunkError>
    where
        C: CommandContext<B> + ?Sized,
    {
        for object in self.objects() {
            object.draw(context)?;
        }
        Ok(())
    }
}

/// Chunk errors the loader skips instead of aborting on.
pub fn is_skippable(err: &ChunkError) -> bool {
    matches!(
        err,
        ChunkError::InvalidFieldSize { .. } | ChunkError::InsufficientGeometry { .. }
    )
}
