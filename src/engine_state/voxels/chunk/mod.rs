//! # Chunk Module
//!
//! This module provides the `Chunk` aggregate: one voxel field, the mesh built from
//! it, and the device buffers that mesh was uploaded to.
//!
//! ## Lifecycle
//!
//! ```text
//! Unloaded ──initialize──▶ VoxelsGenerated ──generate_mesh──▶ MeshBuilt ──upload──▶ Uploaded
//! ```
//!
//! Only `Uploaded` chunks can be bound and drawn. There is no way back: once a mesh
//! has been built the voxels are frozen, and once uploaded the mesh is frozen too.
//! [`Chunk::build_mesh`] runs the last two steps in one call.
//!
//! ## Ownership
//!
//! A chunk exclusively owns its field, its mesh and its buffers. It knows nothing of
//! its neighbours; its world placement is a translation derived from its grid position.

use cgmath::{Point3, Vector3};
use log::debug;

use chunk_generation::ChunkGenerator;
use field::VoxelField;

use crate::{
    engine_state::rendering::{
        meshing::mesh::{Mesh, MeshLayout},
        CommandContext, GpuMesh, GpuUploader,
    },
    error::ChunkError,
};

pub mod chunk_generation;
pub mod field;

/// The default dimension (width, height, depth) of a chunk in voxels.
pub const CHUNK_DIMENSION: usize = 32;

/// Where a chunk is in its generate, mesh, upload lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChunkState {
    /// Constructed, no voxels yet.
    Unloaded,
    /// The voxel field has been generated.
    VoxelsGenerated,
    /// The mesh has been built from the field.
    MeshBuilt,
    /// The mesh is resident on the device. The only drawable state.
    Uploaded,
}

/// A cube of `edge³` voxels placed in the world.
///
/// `B` is the backend's buffer handle type.
#[derive(Debug)]
pub struct Chunk<B> {
    /// The position of this chunk in chunk coordinates (not voxel coordinates).
    pub position: Point3<i32>,
    edge: usize,
    field: VoxelField,
    mesh: Mesh,
    gpu_mesh: Option<GpuMesh<B>>,
    state: ChunkState,
}

impl<B> Chunk<B> {
    /// Creates an unloaded chunk.
    ///
    /// # Arguments
    /// * `position` - The chunk grid coordinates
    /// * `edge` - The chunk edge length in voxels
    pub fn new(position: Point3<i32>, edge: usize) -> Self {
        Self {
            position,
            edge,
            field: VoxelField::unallocated(edge),
            mesh: Mesh::new(),
            gpu_mesh: None,
            state: ChunkState::Unloaded,
        }
    }

    /// World-space offset of the chunk's local origin: `position * edge`.
    pub fn translation(&self) -> Vector3<f32> {
        let edge = self.edge as f32;
        Vector3::new(
            self.position.x as f32 * edge,
            self.position.y as f32 * edge,
            self.position.z as f32 * edge,
        )
    }

    /// The CPU-side mesh. Empty until [`Self::generate_mesh`] succeeds.
    pub fn mesh(&self) -> &Mesh {
        &self.mesh
    }

    /// Generates the voxel field, replacing any previous one.
    ///
    /// # Errors
    /// [`ChunkError::InvalidTransition`] once a mesh has been built.
    pub fn initialize(&mut self, generator: &ChunkGenerator) -> Result<(), ChunkError> {
        self.expect_state(
            &[ChunkState::Unloaded, ChunkState::VoxelsGenerated],
            "initialize",
        )?;
        let field = generator.generate(self.position, self.edge);
        self.initialize_with(field)
    }

    /// Installs an externally produced voxel field, replacing any previous one.
    ///
    /// The field is not validated here; meshing rejects malformed fields.
    ///
    /// # Errors
    /// [`ChunkError::InvalidTransition`] once a mesh has been built.
    pub fn initialize_with(&mut self, field: VoxelField) -> Result<(), ChunkError> {
        self.expect_state(
            &[ChunkState::Unloaded, ChunkState::VoxelsGenerated],
            "initialize",
        )?;

        self.field = field;
        self.state = ChunkState::VoxelsGenerated;
        Ok(())
    }

    /// Builds the CPU-side mesh from the current field.
    ///
    /// An unloaded chunk is meshed from its empty field, which yields no geometry.
    ///
    /// # Errors
    /// * [`ChunkError::InvalidFieldSize`] if the field is malformed
    /// * [`ChunkError::InvalidTransition`] once uploaded
    pub fn generate_mesh(&mut self, layout: MeshLayout) -> Result<(), ChunkError> {
        self.expect_state(
            &[
                ChunkState::Unloaded,
                ChunkState::VoxelsGenerated,
                ChunkState::MeshBuilt,
            ],
            "mesh",
        )?;

        self.mesh.build(&self.field, layout)?;
        self.state = ChunkState::MeshBuilt;
        Ok(())
    }

    /// Uploads the built mesh to device-local buffers.
    ///
    /// # Errors
    /// * [`ChunkError::InsufficientGeometry`] if the mesh has fewer than 3 vertices
    /// * [`ChunkError::UploadFailure`] if the backend fails
    /// * [`ChunkError::InvalidTransition`] unless the mesh has been built and not uploaded
    pub fn upload<U>(&mut self, uploader: &mut U) -> Result<(), ChunkError>
    where
        U: GpuUploader<Buffer = B>,
    {
        self.expect_state(&[ChunkState::MeshBuilt], "upload")?;

        let label = format!(
            "chunk ({}, {}, {})",
            self.position.x, self.position.y, self.position.z
        );
        let gpu_mesh = GpuMesh::upload(uploader, &label, &self.mesh)?;

        self.gpu_mesh = Some(gpu_mesh);
        self.state = ChunkState::Uploaded;
        Ok(())
    }

    /// Builds the mesh and uploads it.
    ///
    /// # Errors
    /// Any error of [`Self::generate_mesh`] or [`Self::upload`].
    pub fn build_mesh<U>(&mut self, layout: MeshLayout, uploader: &mut U) -> Result<(), ChunkError>
    where
        U: GpuUploader<Buffer = B>,
    {
        self.generate_mesh(layout)?;
        self.upload(uploader)?;

        debug!(
            "Chunk {:?}: {} vertices, {} indices",
            self.position,
            self.mesh.vertex_count(),
            self.mesh.index_count()
        );
        Ok(())
    }

    /// Binds the chunk's buffers.
    ///
    /// # Errors
    /// [`ChunkError::NotReady`] unless uploaded.
    pub fn bind<C>(&self, context: &mut C) -> Result<(), ChunkError>
    where
        C: CommandContext<B> + ?Sized,
    {
        self.drawable()?.bind(context);
        Ok(())
    }

    /// Records the chunk's draw call.
    ///
    /// # Errors
    /// [`ChunkError::NotReady`] unless uploaded.
    pub fn draw<C>(&self, context: &mut C) -> Result<(), ChunkError>
    where
        C: CommandContext<B> + ?Sized,
    {
        self.drawable()?.draw(context);
        Ok(())
    }

    fn drawable(&self) -> Result<&GpuMesh<B>, ChunkError> {
        match (&self.gpu_mesh, self.state) {
            (Some(gpu_mesh), ChunkState::Uploaded) => Ok(gpu_mesh),
            _ => Err(ChunkError::NotReady { state: self.state }),
        }
    }

    fn expect_state(
        &self,
        allowed: &[ChunkState],
        operation: &'static str,
    ) -> Result<(), ChunkError> {
        if allowed.contains(&self.state) {
            Ok(())
        } else {
            Err(ChunkError::InvalidTransition {
                state: self.state,
                operation,
            })
        }
    }
}

#[cfg(test)]
impl<B> Chunk<B> {
    /// The current lifecycle state.
    pub fn state(&self) -> ChunkState {
        self.state
    }

    /// The voxel field.
    pub fn field(&self) -> &VoxelField {
        &self.field
    }

    /// The uploaded buffers, once in [`ChunkState::Uploaded`].
    pub fn gpu_mesh(&self) -> Option<&GpuMesh<B>> {
        self.gpu_mesh.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine_state::{
        rendering::recording::{
            FakeBuffer, RecordedCommand, RecordingContext, RecordingUploader,
        },
        voxels::{
            chunk::chunk_generation::{GenerationMethod, NoiseParameters, TerrainSampling},
            voxel::{voxel_type::VoxelType, Voxel},
        },
    };
    use crate::error::UploadError;

    fn generator(method: GenerationMethod) -> ChunkGenerator {
        ChunkGenerator::new(
            method,
            TerrainSampling::ChunkLocal,
            &NoiseParameters::default(),
        )
    }

    fn uploaded_chunk(edge: usize) -> (Chunk<FakeBuffer>, RecordingUploader) {
        let mut uploader = RecordingUploader::new();
        let mut chunk = Chunk::new(Point3::new(0, 0, 0), edge);
        chunk.initialize(&generator(GenerationMethod::Solid)).unwrap();
        chunk.build_mesh(MeshLayout::PerFace, &mut uploader).unwrap();
        (chunk, uploader)
    }

    #[test]
    fn lifecycle_walks_through_every_state() {
        let mut uploader = RecordingUploader::new();
        let mut chunk: Chunk<FakeBuffer> = Chunk::new(Point3::new(1, 0, 2), 4);
        assert_eq!(chunk.state(), ChunkState::Unloaded);

        chunk.initialize(&generator(GenerationMethod::Terrain)).unwrap();
        assert_eq!(chunk.state(), ChunkState::VoxelsGenerated);
        assert_eq!(chunk.field().len(), 64);

        chunk.generate_mesh(MeshLayout::SharedCorners).unwrap();
        assert_eq!(chunk.state(), ChunkState::MeshBuilt);
        assert_eq!(chunk.mesh().vertex_count(), 8 * 64);

        chunk.upload(&mut uploader).unwrap();
        assert_eq!(chunk.state(), ChunkState::Uploaded);
        assert_eq!(uploader.device_buffer_count(), 2);
    }

    #[test]
    fn translation_is_grid_position_times_edge() {
        let chunk: Chunk<FakeBuffer> = Chunk::new(Point3::new(3, 0, -2), 32);
        assert_eq!(chunk.translation(), Vector3::new(96.0, 0.0, -64.0));
    }

    #[test]
    fn all_stone_chunk_matches_expected_counts() {
        let (chunk, _) = uploaded_chunk(2);
        let gpu_mesh = chunk.gpu_mesh().unwrap();
        assert_eq!(gpu_mesh.vertex_count(), 192);
        assert_eq!(gpu_mesh.index_count(), 288);
    }

    #[test]
    fn uploaded_chunk_binds_and_draws_indexed() {
        let (chunk, _) = uploaded_chunk(2);
        let mut context = RecordingContext::new();
        chunk.bind(&mut context).unwrap();
        chunk.draw(&mut context).unwrap();

        assert!(matches!(
            context.commands[0],
            RecordedCommand::BindVertexBuffer { slot: 0, .. }
        ));
        assert!(matches!(
            context.commands[1],
            RecordedCommand::BindIndexBuffer { .. }
        ));
        assert_eq!(
            context.commands[2],
            RecordedCommand::DrawIndexed {
                index_count: 288,
                instance_count: 1
            }
        );
    }

    #[test]
    fn bind_and_draw_before_upload_are_not_ready() {
        let mut chunk: Chunk<FakeBuffer> = Chunk::new(Point3::new(0, 0, 0), 2);
        let mut context = RecordingContext::new();

        assert_eq!(
            chunk.bind(&mut context),
            Err(ChunkError::NotReady {
                state: ChunkState::Unloaded
            })
        );

        chunk.initialize(&generator(GenerationMethod::Solid)).unwrap();
        chunk.generate_mesh(MeshLayout::PerFace).unwrap();
        assert_eq!(
            chunk.draw(&mut context),
            Err(ChunkError::NotReady {
                state: ChunkState::MeshBuilt
            })
        );
        assert!(context.commands.is_empty());
    }

    #[test]
    fn empty_field_fails_with_insufficient_geometry() {
        let mut uploader = RecordingUploader::new();
        let mut chunk: Chunk<FakeBuffer> = Chunk::new(Point3::new(0, 0, 0), 32);

        let result = chunk.build_mesh(MeshLayout::PerFace, &mut uploader);
        assert_eq!(
            result,
            Err(ChunkError::InsufficientGeometry { vertex_count: 0 })
        );
        assert!(uploader.buffers.is_empty());
        assert_ne!(chunk.state(), ChunkState::Uploaded);
    }

    #[test]
    fn malformed_field_fails_with_invalid_field_size() {
        let mut uploader = RecordingUploader::new();
        let mut chunk: Chunk<FakeBuffer> = Chunk::new(Point3::new(0, 0, 0), 2);
        chunk
            .initialize_with(VoxelField::from_voxels(
                2,
                vec![Voxel::new(VoxelType::STONE); 7],
            ))
            .unwrap();

        assert_eq!(
            chunk.build_mesh(MeshLayout::SharedCorners, &mut uploader),
            Err(ChunkError::InvalidFieldSize {
                expected: 8,
                actual: 7
            })
        );
        assert_eq!(chunk.state(), ChunkState::VoxelsGenerated);
    }

    #[test]
    fn backend_copy_failure_surfaces_as_upload_failure() {
        let mut uploader = RecordingUploader::new();
        uploader.fail_copies();
        let mut chunk: Chunk<FakeBuffer> = Chunk::new(Point3::new(0, 0, 0), 1);
        chunk.initialize(&generator(GenerationMethod::Solid)).unwrap();

        let result = chunk.build_mesh(MeshLayout::PerFace, &mut uploader);
        assert!(matches!(
            result,
            Err(ChunkError::UploadFailure(UploadError::BufferCopy { .. }))
        ));
        assert_eq!(chunk.state(), ChunkState::MeshBuilt);
    }

    #[test]
    fn initialize_after_meshing_is_rejected() {
        let (mut chunk, _) = uploaded_chunk(1);
        assert_eq!(
            chunk.initialize(&generator(GenerationMethod::Empty)),
            Err(ChunkError::InvalidTransition {
                state: ChunkState::Uploaded,
                operation: "initialize"
            })
        );
    }

    #[test]
    fn second_upload_is_rejected() {
        let (mut chunk, mut uploader) = uploaded_chunk(1);
        assert!(matches!(
            chunk.upload(&mut uploader),
            Err(ChunkError::InvalidTransition {
                state: ChunkState::Uploaded,
                ..
            })
        ));
        assert!(matches!(
            chunk.generate_mesh(MeshLayout::PerFace),
            Err(ChunkError::InvalidTransition { .. })
        ));
    }

    #[test]
    fn reinitializing_before_meshing_replaces_the_field() {
        let mut chunk: Chunk<FakeBuffer> = Chunk::new(Point3::new(0, 0, 0), 3);
        chunk.initialize(&generator(GenerationMethod::Solid)).unwrap();
        chunk.initialize(&generator(GenerationMethod::Empty)).unwrap();
        assert_eq!(chunk.field().solid_count(), 0);
    }

    #[test]
    fn remeshing_before_upload_is_idempotent() {
        let mut chunk: Chunk<FakeBuffer> = Chunk::new(Point3::new(0, 0, 0), 3);
        chunk.initialize(&generator(GenerationMethod::Checkerboard)).unwrap();
        chunk.generate_mesh(MeshLayout::PerFace).unwrap();
        let first = chunk.mesh().clone();
        chunk.generate_mesh(MeshLayout::PerFace).unwrap();
        assert_eq!(chunk.mesh(), &first);
    }
}
