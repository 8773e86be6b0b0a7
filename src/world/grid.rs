use crate::world::chunk::Chunk;
use crate::world::chunk_coord::{ChunkCoord, ChunkDims};
use parking_lot::Mutex;
use std::sync::Arc;

/// Shared handle to a resident chunk. The mutex guards every read and write of the chunk.
pub type ChunkHandle = Arc<Mutex<Chunk>>;

/// Dense cube of chunk slots, `edge` chunks along each axis.
///
/// Slots are indexed `z*E*E + y*E + x`. Coordinates outside `0..edge` on any
/// axis are not part of the world and never allocate. An empty slot means the
/// chunk has not been generated or loaded yet.
pub struct WorldGrid {
    edge: u32,
    dims: ChunkDims,
    slots: Vec<Option<ChunkHandle>>,
    resident: usize,
}

impl WorldGrid {
    pub fn new(edge: u32, dims: ChunkDims) -> Self {
        let edge_len = edge as usize;
        Self {
            edge,
            dims,
            slots: vec![None; edge_len * edge_len * edge_len],
            resident: 0,
        }
    }

    pub fn edge(&self) -> u32 {
        self.edge
    }

    pub fn dims(&self) -> ChunkDims {
        self.dims
    }

    pub fn len(&self) -> usize {
        self.resident
    }

    pub fn is_empty(&self) -> bool {
        self.resident == 0
    }

    pub fn contains(&self, coord: ChunkCoord) -> bool {
        self.slot_index(coord).is_some()
    }

    fn slot_index(&self, coord: ChunkCoord) -> Option<usize> {
        let edge = i64::from(self.edge);
        let in_range = |c: i64| (0..edge).contains(&c);
        if !(in_range(coord.x()) && in_range(coord.y()) && in_range(coord.z())) {
            return None;
        }
        let e = self.edge as usize;
        Some(coord.z() as usize * e * e + coord.y() as usize * e + coord.x() as usize)
    }

    fn slot_coord(&self, index: usize) -> ChunkCoord {
        let e = self.edge as usize;
        ChunkCoord::new((index % e) as i64, ((index / e) % e) as i64, (index / (e * e)) as i64)
    }

    /// The resident chunk at `coord`, if any.
    pub fn get(&self, coord: ChunkCoord) -> Option<&ChunkHandle> {
        self.slots.get(self.slot_index(coord)?)?.as_ref()
    }

    pub fn is_resident(&self, coord: ChunkCoord) -> bool {
        self.get(coord).is_some()
    }

    /// Stores `chunk` in its slot and returns the new handle. Returns `None` when
    /// the chunk lies outside the world; an existing occupant is replaced.
    pub fn insert(&mut self, chunk: Chunk) -> Option<ChunkHandle> {
        let index = self.slot_index(chunk.coord())?;
        let handle = Arc::new(Mutex::new(chunk));
        if self.slots[index].replace(handle.clone()).is_none() {
            self.resident += 1;
        }
        Some(handle)
    }

    pub fn remove(&mut self, coord: ChunkCoord) -> Option<ChunkHandle> {
        let index = self.slot_index(coord)?;
        let removed = self.slots[index].take();
        if removed.is_some() {
            self.resident -= 1;
        }
        removed
    }

    /// Resident chunks in slot order.
    pub fn iter(&self) -> impl Iterator<Item = (ChunkCoord, &ChunkHandle)> + '_ {
        self.slots
            .iter()
            .enumerate()
            .filter_map(|(index, slot)| slot.as_ref().map(|handle| (self.slot_coord(index), handle)))
    }

    pub fn coords(&self) -> Vec<ChunkCoord> {
        self.iter().map(|(coord, _)| coord).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_grid() -> WorldGrid {
        WorldGrid::new(3, ChunkDims::new(4, 4))
    }

    #[test]
    fn test_bounds() {
        let grid = test_grid();
        assert!(grid.contains(ChunkCoord::new(0, 0, 0)));
        assert!(grid.contains(ChunkCoord::new(2, 2, 2)));
        assert!(!grid.contains(ChunkCoord::new(3, 0, 0)));
        assert!(!grid.contains(ChunkCoord::new(0, -1, 0)));
        assert!(grid.get(ChunkCoord::new(-1, 0, 0)).is_none());
    }

    #[test]
    fn test_insert_and_remove() {
        let mut grid = test_grid();
        let coord = ChunkCoord::new(1, 2, 0);
        assert!(!grid.is_resident(coord));

        let handle = grid.insert(Chunk::new(coord, grid.dims())).unwrap();
        assert!(grid.is_resident(coord));
        assert_eq!(grid.len(), 1);
        assert_eq!(handle.lock().coord(), coord);
        assert_eq!(grid.coords(), vec![coord]);

        // replacing keeps the count
        grid.insert(Chunk::new(coord, grid.dims())).unwrap();
        assert_eq!(grid.len(), 1);

        assert!(grid.remove(coord).is_some());
        assert!(grid.remove(coord).is_none());
        assert!(grid.is_empty());
    }

    #[test]
    fn test_out_of_bounds_insert_is_rejected() {
        let mut grid = test_grid();
        let chunk = Chunk::new(ChunkCoord::new(0, 3, 0), grid.dims());
        assert!(grid.insert(chunk).is_none());
        assert!(grid.is_empty());
    }

    #[test]
    fn test_iteration_recovers_coordinates() {
        let mut grid = test_grid();
        let coords = [
            ChunkCoord::new(2, 0, 1),
            ChunkCoord::new(0, 1, 2),
            ChunkCoord::new(1, 1, 1),
        ];
        for coord in coords {
            grid.insert(Chunk::new(coord, grid.dims()));
        }
        for (coord, handle) in grid.iter() {
            assert_eq!(handle.lock().coord(), coord);
        }
        assert_eq!(grid.len(), 3);
    }
}
