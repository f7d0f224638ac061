//! Camera-driven chunk streaming.
//!
//! Chunks within `load_distance` of the camera-center chunk are generated;
//! loaded chunks farther than `unload_distance` are dropped. Keeping the
//! unload radius strictly larger than the load radius stops a camera that
//! wobbles across a chunk border from loading and unloading the same chunks
//! every check.

use crate::camera::Camera;
use crate::chunk::{ChunkDims, ChunkPos};
use crate::mine::Mine;
use crate::tilemap::Tilemap;
use std::collections::BTreeSet;
use tracing::{debug, warn};

/// Chunks touched by one [`ChunkLoader::load_chunks`] call, in key order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChunkLoadReport {
    pub loaded: Vec<ChunkPos>,
    pub unloaded: Vec<ChunkPos>,
}

impl ChunkLoadReport {
    pub fn is_empty(&self) -> bool {
        self.loaded.is_empty() && self.unloaded.is_empty()
    }
}

/// Loaded-chunk set plus the streaming radii.
#[derive(Debug, Clone)]
pub struct ChunkLoader {
    dims: ChunkDims,
    load_distance: i32,
    unload_distance: i32,
    loaded: BTreeSet<ChunkPos>,
    last_check: Option<ChunkPos>,
}

impl ChunkLoader {
    /// Build a loader. An unload radius that does not exceed the load radius
    /// is raised to `load_distance + 1`.
    pub fn new(dims: ChunkDims, load_distance: i32, unload_distance: i32) -> Self {
        let load_distance = load_distance.max(0);
        let unload_distance = if unload_distance <= load_distance {
            warn!(
                load_distance,
                unload_distance, "unload distance must exceed load distance; widening it"
            );
            load_distance + 1
        } else {
            unload_distance
        };
        Self {
            dims,
            load_distance,
            unload_distance,
            loaded: BTreeSet::new(),
            last_check: None,
        }
    }

    pub fn dims(&self) -> ChunkDims {
        self.dims
    }

    pub fn load_distance(&self) -> i32 {
        self.load_distance
    }

    pub fn unload_distance(&self) -> i32 {
        self.unload_distance
    }

    /// Currently loaded chunks in key order.
    pub fn loaded_chunks(&self) -> &BTreeSet<ChunkPos> {
        &self.loaded
    }

    pub fn is_loaded(&self, pos: ChunkPos) -> bool {
        self.loaded.contains(&pos)
    }

    /// Chunk under the middle of the camera viewport.
    ///
    /// Clamped to chunks whose tiles are addressable; a non-finite camera
    /// maps to the nearest limit (NaN to zero).
    pub fn center_chunk(&self, camera: &Camera, tilemap: &Tilemap) -> ChunkPos {
        let tile = tilemap.tile_size();
        let (width, height) = (self.dims.width.max(1), self.dims.height.max(1));
        let chunk_w = f64::from(width) * f64::from(tile.width.max(1));
        let chunk_h = f64::from(height) * f64::from(tile.height.max(1));
        let limit_x = f64::from(i32::MAX / width as i32);
        let limit_y = f64::from(i32::MAX / height as i32);
        let (cx, cy) = camera.center();
        ChunkPos::new(
            (f64::from(cx) / chunk_w).floor().clamp(-limit_x, limit_x) as i32,
            (f64::from(cy) / chunk_h).floor().clamp(-limit_y, limit_y) as i32,
        )
    }

    /// Load the window around the camera, then unload anything too far away.
    pub fn load_chunks(
        &mut self,
        camera: &Camera,
        tilemap: &Tilemap,
        mine: &mut Mine,
    ) -> ChunkLoadReport {
        let center = self.center_chunk(camera, tilemap);
        let mut report = ChunkLoadReport::default();

        for pos in center.window(self.load_distance) {
            if self.loaded.insert(pos) {
                mine.add_chunk(self.dims, pos);
                report.loaded.push(pos);
            }
        }

        let far: Vec<ChunkPos> = self
            .loaded
            .iter()
            .copied()
            .filter(|pos| pos.distance(center) > self.unload_distance)
            .collect();
        for pos in far {
            mine.remove_chunk(self.dims, pos);
            self.loaded.remove(&pos);
            report.unloaded.push(pos);
        }

        report.loaded.sort();
        if !report.is_empty() {
            debug!(
                %center,
                loaded = report.loaded.len(),
                unloaded = report.unloaded.len(),
                total = self.loaded.len(),
                "chunk window updated"
            );
        }
        report
    }

    /// `true` when the camera-center chunk differs from the one seen by the
    /// previous call. The first call always reports a change.
    pub fn should_update_chunks(&mut self, camera: &Camera, tilemap: &Tilemap) -> bool {
        let center = self.center_chunk(camera, tilemap);
        if self.last_check == Some(center) {
            return false;
        }
        self.last_check = Some(center);
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::TerrainConfig;

    fn setup() -> (Tilemap, Mine, ChunkLoader) {
        let tilemap = Tilemap::new(100, 1000, 64, 64);
        let mine = Mine::new(tilemap, TerrainConfig::default(), "loader");
        let loader = ChunkLoader::new(ChunkDims::new(16, 16), 2, 4);
        (tilemap, mine, loader)
    }

    /// Camera whose center sits in the middle of chunk `(cx, cy)`.
    fn camera_at_chunk(cx: i32, cy: i32) -> Camera {
        let mut camera = Camera::new(1024.0, 768.0);
        let chunk_px = 16.0 * 64.0;
        camera.center_on(
            (cx as f32 + 0.5) * chunk_px,
            (cy as f32 + 0.5) * chunk_px,
        );
        camera
    }

    #[test]
    fn center_uses_viewport_midpoint() {
        let (tilemap, _, loader) = setup();
        let camera = Camera::new(1024.0, 768.0);
        // (512, 384) is inside chunk (0, 0).
        assert_eq!(loader.center_chunk(&camera, &tilemap), ChunkPos::new(0, 0));
        assert_eq!(
            loader.center_chunk(&camera_at_chunk(3, 7), &tilemap),
            ChunkPos::new(3, 7)
        );
    }

    #[test]
    fn loads_square_window() {
        let (tilemap, mut mine, mut loader) = setup();
        let report = loader.load_chunks(&camera_at_chunk(3, 3), &tilemap, &mut mine);
        assert_eq!(report.loaded.len(), 25);
        assert!(report.unloaded.is_empty());
        assert!(loader.is_loaded(ChunkPos::new(1, 5)));
        assert!(!loader.is_loaded(ChunkPos::new(6, 3)));

        let again = loader.load_chunks(&camera_at_chunk(3, 3), &tilemap, &mut mine);
        assert!(again.is_empty());
    }

    #[test]
    fn unloads_beyond_unload_radius_only() {
        let (tilemap, mut mine, mut loader) = setup();
        loader.load_chunks(&camera_at_chunk(3, 3), &tilemap, &mut mine);

        // Column x = 1 is now 3 away: outside load radius, inside unload radius.
        let report = loader.load_chunks(&camera_at_chunk(4, 3), &tilemap, &mut mine);
        assert!(report.unloaded.is_empty());
        assert!(loader.is_loaded(ChunkPos::new(1, 3)));

        // Column x = 1 is now 5 away.
        let report = loader.load_chunks(&camera_at_chunk(6, 3), &tilemap, &mut mine);
        assert!(report.unloaded.contains(&ChunkPos::new(1, 3)));
        assert!(!loader.is_loaded(ChunkPos::new(1, 3)));
        assert!(loader
            .loaded_chunks()
            .iter()
            .all(|c| c.distance(ChunkPos::new(6, 3)) <= 4));
    }

    #[test]
    fn should_update_is_edge_triggered() {
        let (tilemap, _, mut loader) = setup();
        let camera = camera_at_chunk(2, 2);
        assert!(loader.should_update_chunks(&camera, &tilemap));
        assert!(!loader.should_update_chunks(&camera, &tilemap));

        let mut nudged = camera;
        nudged.scroll_x += 10.0;
        assert!(!loader.should_update_chunks(&nudged, &tilemap));
        assert!(loader.should_update_chunks(&camera_at_chunk(3, 2), &tilemap));
    }

    #[test]
    fn far_camera_is_clamped_and_streams() {
        let (tilemap, mut mine, mut loader) = setup();
        let mut camera = Camera::new(1024.0, 768.0);
        camera.center_on(1.0e12, -1.0e12);
        let center = loader.center_chunk(&camera, &tilemap);
        assert_eq!(center, ChunkPos::new(i32::MAX / 16, -(i32::MAX / 16)));

        loader.load_chunks(&camera_at_chunk(0, 0), &tilemap, &mut mine);
        let report = loader.load_chunks(&camera, &tilemap, &mut mine);
        assert_eq!(report.loaded.len(), 25);
        assert_eq!(report.unloaded.len(), 25);
        assert_eq!(mine.solid_tiles(), 0);

        camera.center_on(f32::INFINITY, f32::NAN);
        assert_eq!(
            loader.center_chunk(&camera, &tilemap),
            ChunkPos::new(i32::MAX / 16, 0)
        );
    }

    #[test]
    fn widens_unload_radius_without_hysteresis() {
        let loader = ChunkLoader::new(ChunkDims::new(16, 16), 3, 2);
        assert_eq!(loader.unload_distance(), 4);
    }
}
