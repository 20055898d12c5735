use std::collections::HashSet;

use serde::{Deserialize, Serialize};

/// Width of a chunk cell, in world units.
pub const CHUNK_SIZE: f64 = 16.0;

/// A position in the world's horizontal plane.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct WorldPos {
    pub x: f64,
    pub z: f64,
}

impl WorldPos {
    pub fn new(x: f64, z: f64) -> Self {
        Self { x, z }
    }

    pub fn distance_to(&self, other: &WorldPos) -> f64 {
        (self.x - other.x).hypot(self.z - other.z)
    }

    /// The chunk cell that contains this position. Negative coordinates round towards negative infinity, so
    /// `x = -1` is in cell `-1`, not cell `0`.
    pub fn chunk(&self) -> ChunkCell {
        #[allow(clippy::cast_possible_truncation)]
        ChunkCell::new((self.x / CHUNK_SIZE).floor() as i64, (self.z / CHUNK_SIZE).floor() as i64)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ChunkCell {
    pub x: i64,
    pub z: i64,
}

impl ChunkCell {
    pub fn new(x: i64, z: i64) -> Self {
        Self { x, z }
    }
}

/// The drop-off area: a fixed set of chunk cells, loaded once at startup.
#[derive(Debug, Clone, Default)]
pub struct Geofence {
    cells: HashSet<ChunkCell>,
}

impl Geofence {
    pub fn new<I: IntoIterator<Item = ChunkCell>>(cells: I) -> Self {
        Self { cells: cells.into_iter().collect() }
    }

    pub fn contains(&self, pos: &WorldPos) -> bool {
        self.cells.contains(&pos.chunk())
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }
}
