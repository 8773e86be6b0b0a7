use crate::world::chunk_coord::ChunkCoord;
use std::collections::VecDeque;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestKind {
    Load,
    Unload,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChunkRequest {
    pub coord: ChunkCoord,
    pub kind: RequestKind,
}

/// Pending chunk load/unload requests, drained in arrival order.
///
/// At most one request per coordinate is kept: a newer request replaces the
/// older one and moves to the back of the queue.
#[derive(Debug, Default)]
pub struct RequestQueue {
    pending: VecDeque<ChunkRequest>,
}

impl RequestQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, coord: ChunkCoord, kind: RequestKind) {
        self.pending.retain(|request| request.coord != coord);
        self.pending.push_back(ChunkRequest { coord, kind });
    }

    pub fn has_loads(&self) -> bool {
        self.pending.iter().any(|request| request.kind == RequestKind::Load)
    }

    pub fn get(&self, coord: ChunkCoord) -> Option<RequestKind> {
        self.pending
            .iter()
            .find(|request| request.coord == coord)
            .map(|request| request.kind)
    }

    /// Removes and returns up to `max` requests from the front.
    pub fn drain(&mut self, max: usize) -> Vec<ChunkRequest> {
        let count = max.min(self.pending.len());
        self.pending.drain(..count).collect()
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }
}
