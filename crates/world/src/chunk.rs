use digsite_core::TilePos;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::num::ParseIntError;
use std::str::FromStr;
use thiserror::Error;

/// Chunk coordinate in chunk space.
/// Implements Ord for deterministic iteration in BTreeMap/BTreeSet (sorts by x, then y).
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize,
)]
pub struct ChunkPos {
    pub x: i32,
    pub y: i32,
}

impl ChunkPos {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Chebyshev distance in chunks.
    pub fn distance(self, other: ChunkPos) -> i32 {
        let dx = self.x.saturating_sub(other.x).saturating_abs();
        let dy = self.y.saturating_sub(other.y).saturating_abs();
        dx.max(dy)
    }

    /// Every chunk within Chebyshev `radius`, row by row.
    pub fn window(self, radius: i32) -> impl Iterator<Item = ChunkPos> {
        let radius = radius.max(0);
        let (x0, x1) = (self.x.saturating_sub(radius), self.x.saturating_add(radius));
        let (y0, y1) = (self.y.saturating_sub(radius), self.y.saturating_add(radius));
        (x0..=x1).flat_map(move |x| (y0..=y1).map(move |y| ChunkPos::new(x, y)))
    }
}

impl fmt::Display for ChunkPos {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{}", self.x, self.y)
    }
}

/// Failure to parse an `"x,y"` chunk key.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ChunkKeyError {
    #[error("chunk key must look like \"x,y\": {0:?}")]
    Malformed(String),
    #[error("invalid chunk coordinate: {0}")]
    Coordinate(#[from] ParseIntError),
}

impl FromStr for ChunkPos {
    type Err = ChunkKeyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (x, y) = s
            .split_once(',')
            .ok_or_else(|| ChunkKeyError::Malformed(s.to_string()))?;
        Ok(Self::new(x.trim().parse()?, y.trim().parse()?))
    }
}

/// Chunk size in tiles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ChunkDims {
    pub width: u32,
    pub height: u32,
}

impl ChunkDims {
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Top-left tile of `pos`. Saturates for chunks beyond the `i32` tile range.
    pub fn origin(self, pos: ChunkPos) -> TilePos {
        TilePos::new(
            pos.x.saturating_mul(self.width as i32),
            pos.y.saturating_mul(self.height as i32),
        )
    }

    /// Chunk containing `tile`.
    pub fn chunk_of(self, tile: TilePos) -> ChunkPos {
        ChunkPos::new(
            tile.x.div_euclid(self.width.max(1) as i32),
            tile.y.div_euclid(self.height.max(1) as i32),
        )
    }

    /// All tiles covered by `pos`, row-major.
    pub fn tiles(self, pos: ChunkPos) -> impl Iterator<Item = TilePos> {
        let origin = self.origin(pos);
        let (w, h) = (self.width as i32, self.height as i32);
        let (x1, y1) = (origin.x.saturating_add(w), origin.y.saturating_add(h));
        (origin.y..y1).flat_map(move |y| (origin.x..x1).map(move |x| TilePos::new(x, y)))
    }
}

impl Default for ChunkDims {
    fn default() -> Self {
        Self::new(16, 16)
    }
}
