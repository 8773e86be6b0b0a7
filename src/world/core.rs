use crate::config::WorldConfig;
use crate::utils::error::Result;
use crate::utils::math::Ray;
use crate::world::chunk::{Chunk, PassOutcome};
use crate::world::chunk_coord::{ChunkCoord, ChunkDims};
use crate::world::entity::Entity;
use crate::world::generator::TerrainGenerator;
use crate::world::grid::{ChunkHandle, WorldGrid};
use crate::world::halo::NeighborHalo;
use crate::world::mesh::{CollisionSink, FaceMesher, GeometryBuilder};
use crate::world::moving::MovingVoxel;
use crate::world::raycast::{raycast_grid, VoxelHit};
use crate::world::request::{ChunkRequest, RequestKind, RequestQueue};
use crate::world::sky::Sky;
use crate::world::storage::{ChunkStore, FileChunkStore};
use crate::world::voxel::{Face, Voxel};
use glam::{I64Vec3, UVec3};
use log::{debug, info, trace, warn};
use rayon::prelude::*;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DamageOutcome {
    /// No voxel at the position.
    Absent,
    /// The voxel type cannot be damaged.
    Resisted,
    /// Accumulated damage after the hit.
    Damaged(u32),
    /// The voxel reached its hardness and was removed.
    Destroyed(Voxel),
}

/// Counters for one call to [`World::update`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TickReport {
    pub requests: usize,
    pub refreshed: usize,
    pub remeshed: usize,
    /// Chunk passes skipped because a chunk or one of its neighbors was locked.
    pub contended: usize,
    pub landed: usize,
}

impl TickReport {
    fn record(&mut self, result: PassResult) {
        match result {
            PassResult::Ran(PassOutcome::Refreshed) => self.refreshed += 1,
            PassResult::Ran(PassOutcome::Remeshed) => self.remeshed += 1,
            PassResult::Contended => self.contended += 1,
            PassResult::Ran(PassOutcome::Clean) | PassResult::Absent | PassResult::Clean => {}
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WorldStats {
    pub resident_chunks: usize,
    pub dirty_chunks: usize,
    pub visible_voxels: usize,
    pub pending_requests: usize,
    pub moving_voxels: usize,
    pub entities: usize,
}

/// Result of [`World::save_all`]. Chunks that failed to save were logged and stay resident.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SaveSummary {
    pub saved: usize,
    pub failed: Vec<ChunkCoord>,
}

impl SaveSummary {
    pub fn is_complete(&self) -> bool {
        self.failed.is_empty()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PassResult {
    Absent,
    Clean,
    Contended,
    Ran(PassOutcome),
}

/// Borrowed view of what a chunk pass needs, shareable across rayon workers.
struct ChunkPass<'a> {
    grid: &'a WorldGrid,
    builder: &'a dyn GeometryBuilder,
    collision: Option<&'a dyn CollisionSink>,
}

impl ChunkPass<'_> {
    /// Visibility and mesh pass for one chunk, never blocking on a lock.
    ///
    /// The chunk lock is released while the neighbor halo is captured, so at
    /// most one chunk is locked at a time. If the chunk was written in between,
    /// the pass is left for the next tick.
    fn run(&self, coord: ChunkCoord) -> PassResult {
        let Some(handle) = self.grid.get(coord) else {
            return PassResult::Absent;
        };

        let epoch = match handle.try_lock() {
            Some(chunk) if chunk.is_dirty() => chunk.epoch(),
            Some(_) => return PassResult::Clean,
            None => {
                trace!("Chunk {:?} is locked, skipping this tick", coord);
                return PassResult::Contended;
            }
        };

        let Some(halo) = NeighborHalo::capture(self.grid, coord) else {
            trace!("Neighbor of chunk {:?} is locked, skipping this tick", coord);
            return PassResult::Contended;
        };

        let Some(mut chunk) = handle.try_lock() else {
            return PassResult::Contended;
        };
        if chunk.epoch() != epoch {
            return PassResult::Contended;
        }

        let outcome = chunk.request_generate(&halo, self.builder);
        if outcome == PassOutcome::Remeshed {
            if let (Some(sink), Some(mesh)) = (self.collision, chunk.geometry()) {
                sink.rebuild(coord, mesh);
            }
        }
        trace!("Chunk {:?} pass: {:?}", coord, outcome);
        PassResult::Ran(outcome)
    }
}

pub struct World {
    config: WorldConfig,
    dims: ChunkDims,
    grid: WorldGrid,
    generator: TerrainGenerator,
    store: Option<Box<dyn ChunkStore>>,
    builder: Box<dyn GeometryBuilder>,
    collision: Option<Box<dyn CollisionSink>>,
    requests: RequestQueue,
    moving: Vec<MovingVoxel>,
    entities: Vec<Box<dyn Entity>>,
    sky: Sky,
}

impl World {
    /// Creates an empty world. A configured `save_dir` attaches a [`FileChunkStore`].
    pub fn new(config: WorldConfig) -> Result<Self> {
        config.validate()?;
        let dims = config.chunk_dims();

        let store: Option<Box<dyn ChunkStore>> = match &config.save_dir {
            Some(dir) => Some(Box::new(FileChunkStore::new(dir.clone())?)),
            None => None,
        };

        info!(
            "Creating world '{}': {}^3 chunks of {}x{}x{} voxels, {:?} terrain, seed {}",
            config.name,
            config.edge_size,
            dims.width,
            dims.height,
            dims.width,
            config.terrain.world_type,
            config.terrain.seed
        );

        Ok(Self {
            dims,
            grid: WorldGrid::new(config.edge_size, dims),
            generator: TerrainGenerator::new(config.terrain.clone()),
            store,
            builder: Box::new(FaceMesher),
            collision: None,
            requests: RequestQueue::new(),
            moving: Vec::new(),
            entities: Vec::new(),
            sky: Sky::new(config.day_length),
            config,
        })
    }

    pub fn with_store(mut self, store: impl ChunkStore + 'static) -> Self {
        self.store = Some(Box::new(store));
        self
    }

    pub fn with_geometry_builder(mut self, builder: impl GeometryBuilder + 'static) -> Self {
        self.builder = Box::new(builder);
        self
    }

    pub fn with_collision_sink(mut self, sink: impl CollisionSink + 'static) -> Self {
        self.collision = Some(Box::new(sink));
        self
    }

    pub fn config(&self) -> &WorldConfig {
        &self.config
    }

    pub fn dims(&self) -> ChunkDims {
        self.dims
    }

    pub fn sky(&self) -> &Sky {
        &self.sky
    }

    pub fn chunk(&self, coord: ChunkCoord) -> Option<ChunkHandle> {
        self.grid.get(coord).cloned()
    }

    pub fn is_resident(&self, coord: ChunkCoord) -> bool {
        self.grid.is_resident(coord)
    }

    pub fn resident_chunks(&self) -> Vec<ChunkCoord> {
        self.grid.coords()
    }

    pub fn pending_requests(&self) -> usize {
        self.requests.len()
    }

    pub fn pending_request(&self, coord: ChunkCoord) -> Option<RequestKind> {
        self.requests.get(coord)
    }

    pub fn moving_voxels(&self) -> &[MovingVoxel] {
        &self.moving
    }

    pub fn spawn_entity(&mut self, entity: impl Entity + 'static) {
        self.entities.push(Box::new(entity));
    }

    pub fn get_voxel_at(&self, x: i64, y: i64, z: i64) -> Option<Voxel> {
        let (coord, local) = self.dims.world_to_chunk(I64Vec3::new(x, y, z));
        let voxel = self.grid.get(coord)?.lock().voxel(local).copied();
        voxel
    }

    /// Writes a voxel, generating or loading its chunk first if needed.
    /// Returns false when the position lies outside the world.
    pub fn set_voxel_at(&mut self, voxel: impl Into<Voxel>, x: i64, y: i64, z: i64) -> bool {
        let voxel = voxel.into();
        let position = I64Vec3::new(x, y, z);
        let (coord, local) = self.dims.world_to_chunk(position);
        let Some(handle) = self.activate_chunk(coord) else {
            return false;
        };

        handle.lock().set_voxel(local, voxel);
        self.mark_boundary_neighbors(coord, local);
        self.notify_neighbors(position, Some(&voxel));
        true
    }

    /// Clears a voxel, generating or loading its chunk first if needed.
    pub fn remove_voxel_at(&mut self, x: i64, y: i64, z: i64) -> Option<Voxel> {
        let position = I64Vec3::new(x, y, z);
        let (coord, local) = self.dims.world_to_chunk(position);
        let handle = self.activate_chunk(coord)?;

        let removed = handle.lock().remove_voxel(local);
        if removed.is_some() {
            self.mark_boundary_neighbors(coord, local);
            self.notify_neighbors(position, None);
        }
        removed
    }

    pub fn damage_voxel_at(&mut self, x: i64, y: i64, z: i64, amount: u32) -> DamageOutcome {
        let (coord, local) = self.dims.world_to_chunk(I64Vec3::new(x, y, z));
        let Some(handle) = self.chunk(coord) else {
            return DamageOutcome::Absent;
        };

        let outcome = {
            let mut chunk = handle.lock();
            let Some(voxel) = chunk.voxel(local).copied() else {
                return DamageOutcome::Absent;
            };
            let hardness = voxel.info().hardness;
            if hardness == 0 {
                return DamageOutcome::Resisted;
            }

            let damage = voxel.damage.saturating_add(amount);
            if damage < hardness {
                chunk.update_voxel(local, |voxel| {
                    voxel.damage = damage;
                    true
                });
                DamageOutcome::Damaged(damage)
            } else {
                DamageOutcome::Destroyed(voxel)
            }
        };

        if let DamageOutcome::Destroyed(_) = outcome {
            self.remove_voxel_at(x, y, z);
        }
        outcome
    }

    /// Lifts the voxel at (x, y, z) out of the grid and slides it to (tx, ty, tz)
    /// over `duration` seconds of world time. Returns false when there is nothing to move.
    #[allow(clippy::too_many_arguments)]
    pub fn move_voxel(&mut self, x: i64, y: i64, z: i64, duration: f32, tx: i64, ty: i64, tz: i64) -> bool {
        let Some(voxel) = self.get_voxel_at(x, y, z) else {
            return false;
        };
        self.remove_voxel_at(x, y, z);
        self.moving.push(MovingVoxel::new(
            voxel,
            I64Vec3::new(x, y, z),
            I64Vec3::new(tx, ty, tz),
            duration,
        ));
        true
    }

    pub fn request_chunk_load(&mut self, cx: i64, cy: i64, cz: i64) {
        self.request(ChunkCoord::new(cx, cy, cz), RequestKind::Load);
    }

    pub fn request_chunk_unload(&mut self, cx: i64, cy: i64, cz: i64) {
        self.request(ChunkCoord::new(cx, cy, cz), RequestKind::Unload);
    }

    fn request(&mut self, coord: ChunkCoord, kind: RequestKind) {
        if !self.grid.contains(coord) {
            trace!("Ignoring {:?} request for out-of-bounds chunk {:?}", kind, coord);
            return;
        }
        self.requests.push(coord, kind);
    }

    pub fn raycast_world(&self, ray: &Ray, solid_only: bool) -> Option<VoxelHit> {
        raycast_grid(&self.grid, ray, solid_only)
    }

    /// Advances the world by `dt` seconds.
    ///
    /// Order: sky, entities, pending chunk requests (capped per tick), chunk
    /// passes (only when no load was pending), then moving voxels.
    pub fn update(&mut self, dt: f32) -> TickReport {
        let mut report = TickReport::default();

        self.sky.advance(dt);
        for entity in &mut self.entities {
            entity.think(dt);
        }

        let loads_pending = self.requests.has_loads();
        for request in self.requests.drain(self.config.max_requests_per_tick) {
            self.process_request(request, &mut report);
            report.requests += 1;
        }

        if !loads_pending {
            self.update_chunks(&mut report);
        }

        report.landed = self.advance_moving(dt);
        report
    }

    pub fn stats(&self) -> WorldStats {
        let mut stats = WorldStats {
            resident_chunks: self.grid.len(),
            pending_requests: self.requests.len(),
            moving_voxels: self.moving.len(),
            entities: self.entities.len(),
            ..WorldStats::default()
        };
        for (_, handle) in self.grid.iter() {
            let chunk = handle.lock();
            stats.visible_voxels += chunk.visible_count();
            if chunk.is_dirty() {
                stats.dirty_chunks += 1;
            }
        }
        stats
    }

    /// Writes every resident chunk to the attached store. A chunk that fails to
    /// save is logged and listed in the summary; the rest are still written.
    pub fn save_all(&self) -> SaveSummary {
        let mut summary = SaveSummary::default();
        let Some(store) = &self.store else {
            return summary;
        };
        for (coord, handle) in self.grid.iter() {
            match store.save_chunk(&handle.lock()) {
                Ok(()) => summary.saved += 1,
                Err(e) => {
                    warn!("Failed to save chunk {:?}: {}", coord, e);
                    summary.failed.push(coord);
                }
            }
        }
        info!(
            "Saved {} chunks of world '{}', {} failed",
            summary.saved,
            self.config.name,
            summary.failed.len()
        );
        summary
    }

    fn chunk_pass(&self) -> ChunkPass<'_> {
        ChunkPass {
            grid: &self.grid,
            builder: self.builder.as_ref(),
            collision: self.collision.as_deref(),
        }
    }

    fn update_chunks(&self, report: &mut TickReport) {
        let coords = self.grid.coords();
        let pass = self.chunk_pass();
        let results: Vec<PassResult> = if self.config.parallel_updates {
            coords.par_iter().map(|&coord| pass.run(coord)).collect()
        } else {
            coords.iter().map(|&coord| pass.run(coord)).collect()
        };
        for result in results {
            report.record(result);
        }
    }

    fn process_request(&mut self, request: ChunkRequest, report: &mut TickReport) {
        match request.kind {
            RequestKind::Load => {
                if self.grid.is_resident(request.coord) {
                    return;
                }
                if self.activate_chunk(request.coord).is_some() {
                    let result = self.chunk_pass().run(request.coord);
                    report.record(result);
                }
            }
            RequestKind::Unload => {
                self.unload_chunk(request.coord);
            }
        }
    }

    /// Returns the resident chunk at `coord`, loading it from the store or
    /// generating it when absent. `None` outside the world.
    fn activate_chunk(&mut self, coord: ChunkCoord) -> Option<ChunkHandle> {
        if let Some(handle) = self.grid.get(coord) {
            return Some(handle.clone());
        }
        if !self.grid.contains(coord) {
            return None;
        }

        let chunk = self.load_or_generate(coord);
        let handle = self.grid.insert(chunk)?;
        self.mark_neighbor_chunks(coord);
        debug!("Activated chunk {:?}", coord);
        Some(handle)
    }

    fn load_or_generate(&self, coord: ChunkCoord) -> Chunk {
        if let Some(store) = &self.store {
            if store.has_chunk(coord) {
                match store.load_chunk(coord, self.dims) {
                    Ok(Some(chunk)) => {
                        debug!("Loaded chunk {:?} from store", coord);
                        return chunk;
                    }
                    Ok(None) => {}
                    Err(e) => warn!("Failed to load chunk {:?}, generating instead: {}", coord, e),
                }
            }
        }
        self.generator.generate(coord, self.dims)
    }

    /// Saves and drops a resident chunk. A chunk whose save fails stays resident.
    fn unload_chunk(&mut self, coord: ChunkCoord) -> bool {
        let Some(handle) = self.grid.get(coord).cloned() else {
            return false;
        };

        if let Some(store) = &self.store {
            if let Err(e) = store.save_chunk(&handle.lock()) {
                warn!("Failed to save chunk {:?}, keeping it resident: {}", coord, e);
                return false;
            }
        }
        self.grid.remove(coord);
        if let Some(sink) = &self.collision {
            sink.remove(coord);
        }
        self.mark_neighbor_chunks(coord);
        debug!("Unloaded chunk {:?}", coord);
        true
    }

    /// Boundary visibility of the six neighbors depends on this chunk.
    fn mark_neighbor_chunks(&self, coord: ChunkCoord) {
        for (_, neighbor) in coord.face_neighbors() {
            if let Some(handle) = self.grid.get(neighbor) {
                handle.lock().mark_dirty();
            }
        }
    }

    /// A write in a boundary layer changes what the adjacent chunk sees across that face.
    fn mark_boundary_neighbors(&self, coord: ChunkCoord, local: UVec3) {
        for face in self.dims.boundary_faces(local) {
            if let Some(handle) = self.grid.get(coord.offset(face)) {
                handle.lock().mark_dirty();
            }
        }
    }

    /// Runs the neighbor-changed hooks of the six voxels around `position`.
    /// Changes made by a hook do not notify further neighbors.
    fn notify_neighbors(&self, position: I64Vec3, changed: Option<&Voxel>) {
        for face in Face::ALL {
            let (coord, local) = self.dims.world_to_chunk(position + face.offset());
            let Some(handle) = self.grid.get(coord) else {
                continue;
            };

            let modified = handle.lock().update_voxel(local, |neighbor| {
                match neighbor.info().on_neighbor_changed {
                    Some(hook) => hook(neighbor, face.opposite(), changed),
                    None => false,
                }
            });
            if modified {
                self.mark_boundary_neighbors(coord, local);
            }
        }
    }

    fn advance_moving(&mut self, dt: f32) -> usize {
        let mut landed = Vec::new();
        self.moving.retain_mut(|moving| {
            if moving.advance(dt) {
                landed.push(*moving);
                false
            } else {
                true
            }
        });

        for moving in &landed {
            let end = moving.end;
            if !self.set_voxel_at(moving.voxel, end.x, end.y, end.z) {
                warn!("Moving voxel landed outside the world at {:?}, dropped", end);
            }
        }
        landed.len()
    }
}

impl Drop for World {
    fn drop(&mut self) {
        if self.store.is_none() {
            return;
        }
        let summary = self.save_all();
        if !summary.is_complete() {
            warn!(
                "World '{}' shut down with {} unsaved chunks",
                self.config.name,
                summary.failed.len()
            );
        }
    }
}
