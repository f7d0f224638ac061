//! Ground tile store.
//!
//! The mine owns the ground layer and the damage map. Chunks are written
//! into the ground layer when they enter the load window and cleared when
//! they leave it; nothing is cached in between because regeneration from
//! the seed is exact.

use crate::chunk::{ChunkDims, ChunkPos};
use crate::config::TerrainConfig;
use crate::damage::TileDamageMap;
use crate::layers::generate_block;
use crate::terrain::TerrainProfile;
use crate::tilemap::{TileLayer, TileSize, Tilemap};
use digsite_core::{BlockType, TilePos};
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument, warn};

/// A materialized ground tile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tile {
    pub x: i32,
    pub y: i32,
    pub block: BlockType,
}

impl Tile {
    pub fn pos(&self) -> TilePos {
        TilePos::new(self.x, self.y)
    }
}

/// Ground layer, terrain generator state and per-tile damage.
#[derive(Debug, Clone)]
pub struct Mine {
    tilemap: Tilemap,
    ground: TileLayer<BlockType>,
    damage: TileDamageMap,
    terrain: TerrainConfig,
    profile: TerrainProfile,
    seed: String,
    chunks_written: usize,
}

impl Mine {
    pub fn new(tilemap: Tilemap, terrain: TerrainConfig, seed: impl Into<String>) -> Self {
        let seed = seed.into();
        let mut ground = tilemap.create_layer();
        ground.set_collision(BlockType::SOLID);
        let profile = TerrainProfile::generate(&terrain, &seed, tilemap.width());
        Self {
            tilemap,
            ground,
            damage: TileDamageMap::new(tilemap.width(), tilemap.height()),
            terrain,
            profile,
            seed,
            chunks_written: 0,
        }
    }

    pub fn seed(&self) -> &str {
        &self.seed
    }

    pub fn tilemap(&self) -> &Tilemap {
        &self.tilemap
    }

    pub fn tile_size(&self) -> TileSize {
        self.tilemap.tile_size()
    }

    pub fn terrain_config(&self) -> &TerrainConfig {
        &self.terrain
    }

    pub fn profile(&self) -> &TerrainProfile {
        &self.profile
    }

    pub fn damage(&self) -> &TileDamageMap {
        &self.damage
    }

    /// Swap the terrain description and rebuild the column profile.
    ///
    /// Tiles already in the ground layer keep their old realization.
    pub fn set_terrain_config(&mut self, terrain: TerrainConfig) {
        if self.chunks_written > 0 {
            warn!(
                chunks = self.chunks_written,
                "terrain config changed after chunks were generated; loaded tiles keep the old layout"
            );
        }
        self.profile = TerrainProfile::generate(&terrain, &self.seed, self.tilemap.width());
        self.terrain = terrain;
    }

    /// What the generator produces at `(x, y)`, ignoring digging.
    pub fn generated_block_at(&self, x: i32, y: i32) -> BlockType {
        if !self.tilemap.in_bounds(x, y) {
            return BlockType::Empty;
        }
        generate_block(&self.terrain, &self.profile, &self.seed, x, y)
    }

    /// Generate and write `pos` into the ground layer, clipped to the map.
    #[instrument(skip(self), fields(chunk = %pos))]
    pub fn add_chunk(&mut self, dims: ChunkDims, pos: ChunkPos) {
        let mut written = 0usize;
        for tile in dims.tiles(pos) {
            if !self.tilemap.in_bounds(tile.x, tile.y) {
                continue;
            }
            let block = self.generated_block_at(tile.x, tile.y);
            if block.is_solid() {
                self.ground.put(tile.x, tile.y, block);
                written += 1;
            } else {
                self.ground.remove(tile.x, tile.y);
            }
        }
        self.chunks_written += 1;
        debug!(solid_tiles = written, "chunk generated");
    }

    /// Clear every tile of `pos` along with any damage recorded there.
    #[instrument(skip(self), fields(chunk = %pos))]
    pub fn remove_chunk(&mut self, dims: ChunkDims, pos: ChunkPos) {
        for tile in dims.tiles(pos) {
            self.ground.remove(tile.x, tile.y);
        }
        let origin = dims.origin(pos);
        self.damage
            .clear_region(origin.x, origin.y, dims.width, dims.height);
        debug!("chunk removed");
    }

    /// Ground tile at `(x, y)`; `None` when out of bounds or nothing is there.
    pub fn get_tile_at(&self, x: i32, y: i32) -> Option<Tile> {
        self.ground.get(x, y).map(|block| Tile { x, y, block })
    }

    /// Block at `(x, y)`, `Empty` when there is no tile.
    pub fn block_at(&self, x: i32, y: i32) -> BlockType {
        self.ground.get(x, y).unwrap_or(BlockType::Empty)
    }

    pub fn is_collidable(&self, x: i32, y: i32) -> bool {
        self.ground.is_colliding(x, y)
    }

    /// Generated surface row for `column`.
    pub fn surface_row(&self, column: i32) -> Option<i32> {
        self.profile.surface_row(column)
    }

    /// Damage the tile; `true` if this destroyed it.
    pub fn damage_tile(&mut self, tile: TilePos, amount: f32) -> bool {
        self.damage
            .apply_damage(tile.x, tile.y, amount, &mut self.ground)
    }

    /// Remove the tile outright. `false` if there was nothing to remove.
    pub fn remove_tile(&mut self, tile: TilePos) -> bool {
        self.damage.clear_tile(tile.x, tile.y);
        self.ground.remove(tile.x, tile.y).is_some()
    }

    /// Undo up to `amount` damage; `false` if the tile was undamaged.
    pub fn repair_tile(&mut self, tile: TilePos, amount: f32) -> bool {
        self.damage.repair_tile(tile.x, tile.y, amount)
    }

    /// Number of solid tiles currently in the ground layer.
    pub fn solid_tiles(&self) -> usize {
        self.ground.occupied()
    }
}
