//! World facade.
//!
//! Composes the mine, the selection map and the chunk loader behind the
//! calls made by player states and scene setup.

use crate::camera::Camera;
use crate::chunk::{ChunkDims, ChunkPos};
use crate::config::{DepthLayerConfig, TerrainConfig, WorldConfig};
use crate::loader::{ChunkLoadReport, ChunkLoader};
use crate::mine::{Mine, Tile};
use crate::selection::{Adjacency, PlayerSelectedTile, SelectionMap};
use crate::tilemap::{TileSize, Tilemap};
use digsite_core::{BlockType, TilePos};
use rand::Rng;
use std::collections::BTreeSet;
use tracing::{debug, info, warn};

const DEFAULT_CHECK_INTERVAL_MS: f64 = 250.0;

/// Spawn box used when searching for a spawn point, in tiles.
const SPAWN_BOX_TILES: (f32, f32) = (1.0, 2.0);

/// Mine, selections and chunk streaming for one session.
#[derive(Debug, Clone)]
pub struct World {
    config: WorldConfig,
    seed: String,
    mine: Mine,
    selection: SelectionMap,
    loader: ChunkLoader,
    camera: Camera,
    check_interval_ms: f64,
    timer: f64,
}

impl World {
    /// Build the world and load the chunks around the initial camera.
    pub fn new(config: WorldConfig) -> Self {
        let config = with_usable_sizes(config);
        let seed = config
            .seed
            .clone()
            .unwrap_or_else(|| rand::thread_rng().gen::<u32>().to_string());
        let tilemap = Tilemap::new(
            config.world_width_tiles,
            config.world_height_tiles,
            config.tile_width,
            config.tile_height,
        );
        let dims = ChunkDims::new(config.chunk_width_tiles, config.chunk_height_tiles);
        let check_interval_ms = if config.chunk_check_interval_ms > 0.0 {
            config.chunk_check_interval_ms
        } else {
            warn!(
                interval = config.chunk_check_interval_ms,
                "chunk check interval must be positive; using default"
            );
            DEFAULT_CHECK_INTERVAL_MS
        };

        let mut world = Self {
            mine: Mine::new(tilemap, config.terrain.clone(), seed.clone()),
            selection: SelectionMap::new(tilemap.width(), tilemap.height()),
            loader: ChunkLoader::new(
                dims,
                config.chunk_load_distance,
                config.chunk_unload_distance,
            ),
            camera: Camera::new(config.viewport_width, config.viewport_height),
            check_interval_ms,
            timer: 0.0,
            seed,
            config,
        };
        let report = world.load_chunks();
        info!(
            seed = %world.seed,
            chunks = report.loaded.len(),
            "world created"
        );
        world
    }

    pub fn seed(&self) -> &str {
        &self.seed
    }

    pub fn config(&self) -> &WorldConfig {
        &self.config
    }

    pub fn mine(&self) -> &Mine {
        &self.mine
    }

    pub fn selection(&self) -> &SelectionMap {
        &self.selection
    }

    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    /// Move the camera; chunks follow on the next check in [`World::update`].
    pub fn camera_mut(&mut self) -> &mut Camera {
        &mut self.camera
    }

    pub fn loaded_chunks(&self) -> &BTreeSet<ChunkPos> {
        self.loader.loaded_chunks()
    }

    pub fn chunk_loader(&self) -> &ChunkLoader {
        &self.loader
    }

    /// Run the loader immediately, bypassing the check throttle.
    pub fn load_chunks(&mut self) -> ChunkLoadReport {
        let tilemap = *self.mine.tilemap();
        self.loader
            .load_chunks(&self.camera, &tilemap, &mut self.mine)
    }

    /// Advance the frame clock. Every full check interval the loader looks at
    /// the camera and reloads if the center chunk changed.
    ///
    /// Negative or non-finite deltas are logged and ignored. However many
    /// intervals elapsed, the camera is checked once since it cannot move
    /// in between.
    pub fn update(&mut self, _time: f64, delta: f64) -> ChunkLoadReport {
        if !delta.is_finite() || delta < 0.0 {
            warn!(delta, "ignoring invalid frame delta");
            return ChunkLoadReport::default();
        }
        self.timer += delta;
        if self.timer <= self.check_interval_ms {
            return ChunkLoadReport::default();
        }
        let elapsed = (self.timer / self.check_interval_ms).ceil() - 1.0;
        self.timer -= elapsed * self.check_interval_ms;

        let tilemap = *self.mine.tilemap();
        if self.loader.should_update_chunks(&self.camera, &tilemap) {
            self.load_chunks()
        } else {
            ChunkLoadReport::default()
        }
    }

    /// Select the tile at `(x, y)` for `player`, snapshotting its neighbors.
    ///
    /// Any previous selection of `player` is dropped first, even when the new
    /// target is empty.
    pub fn select_tile(&mut self, x: i32, y: i32, player: &str) -> Option<PlayerSelectedTile> {
        self.selection.deselect_tile(player);

        let tile = self.mine.get_tile_at(x, y)?;
        if tile.block.is_empty() {
            return None;
        }

        let mine = &self.mine;
        let adjacencies = Adjacency::scan(tile.pos(), |p| mine.block_at(p.x, p.y).is_solid());
        let selected = PlayerSelectedTile {
            x,
            y,
            block: tile.block,
            adjacencies: Some(adjacencies),
        };
        self.selection.set_selected_tile(Some(selected), player);
        Some(selected)
    }

    /// Hit `player`'s selected tile.
    ///
    /// Returns `true` when the player is done with it: nothing was selected,
    /// the tile was removed by `auto_destroy`, or this hit destroyed it.
    /// `false` means the tile survived and stays selected.
    pub fn dig_tile(&mut self, player: &str, damage: f32, auto_destroy: bool) -> bool {
        let Some(selected) = self.selection.get_selected_tile(player).copied() else {
            return true;
        };

        if auto_destroy {
            self.mine.remove_tile(selected.pos());
            self.selection.deselect_tile(player);
            return true;
        }

        if self.mine.damage_tile(selected.pos(), damage) {
            debug!(player, tile = %selected.pos(), block = %selected.block, "tile dug out");
            self.selection.deselect_tile(player);
            return true;
        }
        false
    }

    pub fn deselect_tile(&mut self, player: &str) {
        self.selection.deselect_tile(player);
    }

    pub fn get_selected_tile(&self, player: &str) -> Option<&PlayerSelectedTile> {
        self.selection.get_selected_tile(player)
    }

    /// Undo damage on a tile; `false` if it was undamaged.
    pub fn repair_tile(&mut self, x: i32, y: i32, amount: f32) -> bool {
        self.mine.repair_tile(TilePos::new(x, y), amount)
    }

    /// Ground tile under a world-space point.
    pub fn get_tile_position(&self, world_x: f32, world_y: f32) -> Option<Tile> {
        let pos = self.mine.tilemap().world_to_tile(world_x, world_y);
        self.mine.get_tile_at(pos.x, pos.y)
    }

    pub fn get_tile_size(&self) -> TileSize {
        self.mine.tile_size()
    }

    /// Pixel y of the top of the highest solid tile in the column under
    /// `world_x`. Columns that are not loaded are answered from the generator.
    pub fn get_surface_y(&self, world_x: f32) -> Option<f32> {
        let tilemap = self.mine.tilemap();
        let column = tilemap.world_to_tile(world_x, 0.0).x;
        if !tilemap.in_bounds(column, 0) {
            return None;
        }
        (0..tilemap.height() as i32)
            .find(|&row| self.effective_block(column, row).is_solid())
            .map(|row| tilemap.tile_to_world(TilePos::new(column, row)).1)
    }

    /// Whether a `width × height` box at `(x, y)` fits inside the world,
    /// overlaps no solid tile and stands on solid ground.
    pub fn is_valid_spawn_position(&self, x: f32, y: f32, width: f32, height: f32) -> bool {
        let tilemap = self.mine.tilemap();
        let (world_w, world_h) = tilemap.pixel_size();
        if x < 0.0 || y < 0.0 || x + width > world_w || y + height > world_h {
            return false;
        }
        if width <= 0.0 || height <= 0.0 {
            return false;
        }

        let tile = tilemap.tile_size();
        let (tw, th) = (tile.width as f32, tile.height as f32);
        let x0 = (x / tw).floor() as i32;
        let x1 = ((x + width) / tw).ceil() as i32 - 1;
        let y0 = (y / th).floor() as i32;
        let y1 = ((y + height) / th).ceil() as i32 - 1;

        let overlaps_solid = (y0..=y1)
            .any(|row| (x0..=x1).any(|col| self.effective_block(col, row).is_solid()));
        if overlaps_solid {
            return false;
        }

        let below = ((y + height) / th).floor() as i32;
        (x0..=x1).any(|col| self.effective_block(col, below).is_solid())
    }

    /// Find a spot to stand on the surface, searching outward from
    /// `preferred_x` (world center when `None`).
    pub fn get_valid_spawn_position(&self, preferred_x: Option<f32>) -> (f32, f32) {
        let tilemap = self.mine.tilemap();
        let (world_w, _) = tilemap.pixel_size();
        let tile = tilemap.tile_size();
        let (tw, th) = (tile.width as f32, tile.height as f32);
        let (box_w, box_h) = (SPAWN_BOX_TILES.0 * tw, SPAWN_BOX_TILES.1 * th);

        let preferred = preferred_x.unwrap_or(world_w / 2.0);
        let width = tilemap.width() as i32;
        let start = ((preferred / tw).floor() as i32).clamp(0, width - 1);

        for offset in 0..width {
            let mut columns = vec![start + offset];
            if offset > 0 {
                columns.push(start - offset);
            }
            for column in columns {
                if column < 0 || column >= width {
                    continue;
                }
                let x = column as f32 * tw;
                let Some(surface) = self.get_surface_y(x) else {
                    continue;
                };
                let y = surface - box_h;
                if self.is_valid_spawn_position(x, y, box_w, box_h) {
                    return (x, y);
                }
            }
        }

        warn!(preferred, "no valid spawn position found; spawning at the top");
        (preferred, 0.0)
    }

    /// Replace the terrain description.
    pub fn set_terrain_config(&mut self, terrain: TerrainConfig) {
        self.config.terrain = terrain.clone();
        self.mine.set_terrain_config(terrain);
    }

    /// Append a depth layer and restore ordering by start depth.
    pub fn add_depth_layer(&mut self, layer: DepthLayerConfig) {
        let mut terrain = self.mine.terrain_config().clone();
        terrain.layers.push(layer);
        terrain.sort_layers();
        self.set_terrain_config(terrain);
    }

    /// Insert a `thickness`-row layer of `block` at `index`.
    ///
    /// The new layer starts where the previous one ends (or at the first
    /// layer's start when inserting at the front); every later layer moves
    /// down by `thickness`. Misuse is logged and ignored.
    pub fn add_depth_layer_by_index(
        &mut self,
        index: usize,
        block: BlockType,
        thickness: i32,
    ) -> bool {
        let mut terrain = self.mine.terrain_config().clone();
        if index > terrain.layers.len() {
            warn!(
                index,
                layers = terrain.layers.len(),
                "depth layer index out of range"
            );
            return false;
        }
        if thickness <= 0 {
            warn!(thickness, "depth layer thickness must be positive");
            return false;
        }

        let start = if index == 0 {
            terrain.layers.first().map(|l| l.start_depth).unwrap_or(0)
        } else {
            match terrain.layers[index - 1].end_depth {
                Some(end) => end,
                None => {
                    warn!(index, "cannot insert below an open-ended depth layer");
                    return false;
                }
            }
        };

        for layer in &mut terrain.layers[index..] {
            layer.start_depth += thickness;
            if let Some(end) = layer.end_depth.as_mut() {
                *end += thickness;
            }
        }
        terrain
            .layers
            .insert(index, DepthLayerConfig::new(start, start + thickness, block));
        self.set_terrain_config(terrain);
        true
    }

    /// Block at a tile as the player sees it: the ground layer for loaded
    /// chunks, the generator elsewhere.
    fn effective_block(&self, x: i32, y: i32) -> BlockType {
        let chunk = self.loader.dims().chunk_of(TilePos::new(x, y));
        if self.loader.is_loaded(chunk) {
            self.mine.block_at(x, y)
        } else {
            self.mine.generated_block_at(x, y)
        }
    }
}

/// Replace zero sizes with the defaults so the tilemap and chunk math stay usable.
fn with_usable_sizes(mut config: WorldConfig) -> WorldConfig {
    if let Err(err) = config.validate() {
        warn!(%err, "world config is invalid; zero sizes fall back to defaults");
    }
    let defaults = WorldConfig::default();
    let sizes = [
        (&mut config.world_width_tiles, defaults.world_width_tiles),
        (&mut config.world_height_tiles, defaults.world_height_tiles),
        (&mut config.tile_width, defaults.tile_width),
        (&mut config.tile_height, defaults.tile_height),
        (&mut config.chunk_width_tiles, defaults.chunk_width_tiles),
        (&mut config.chunk_height_tiles, defaults.chunk_height_tiles),
    ];
    for (value, fallback) in sizes {
        if *value == 0 {
            *value = fallback;
        }
    }
    config
}
