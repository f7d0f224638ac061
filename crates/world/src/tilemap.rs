//! In-memory tile grid standing in for the engine tilemap.
//!
//! A [`Tilemap`] only carries dimensions and coordinate conversion; each
//! [`TileLayer`] is a dense grid of optional tile values with an index-based
//! collision set, mirroring how ground, damage and selection layers are kept
//! apart.

use digsite_core::TilePos;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::hash::Hash;

/// Tile size in world pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TileSize {
    pub width: u32,
    pub height: u32,
}

/// Bounded grid geometry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Tilemap {
    width: u32,
    height: u32,
    tile_size: TileSize,
}

impl Tilemap {
    /// `width × height` tiles of `tile_width × tile_height` pixels.
    pub fn new(width: u32, height: u32, tile_width: u32, tile_height: u32) -> Self {
        Self {
            width,
            height,
            tile_size: TileSize {
                width: tile_width,
                height: tile_height,
            },
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn tile_size(&self) -> TileSize {
        self.tile_size
    }

    /// World size in pixels.
    pub fn pixel_size(&self) -> (f32, f32) {
        (
            (self.width * self.tile_size.width) as f32,
            (self.height * self.tile_size.height) as f32,
        )
    }

    #[inline]
    pub fn in_bounds(&self, x: i32, y: i32) -> bool {
        x >= 0 && y >= 0 && (x as u32) < self.width && (y as u32) < self.height
    }

    /// Tile containing the world-space point. May be out of bounds.
    pub fn world_to_tile(&self, world_x: f32, world_y: f32) -> TilePos {
        TilePos::new(
            (world_x / self.tile_size.width as f32).floor() as i32,
            (world_y / self.tile_size.height as f32).floor() as i32,
        )
    }

    /// Top-left corner of a tile in world space.
    pub fn tile_to_world(&self, tile: TilePos) -> (f32, f32) {
        (
            (tile.x * self.tile_size.width as i32) as f32,
            (tile.y * self.tile_size.height as i32) as f32,
        )
    }

    /// Blank layer sized to this map.
    pub fn create_layer<T: Copy + Eq + Hash>(&self) -> TileLayer<T> {
        TileLayer::new(self.width, self.height)
    }
}

/// Dense grid of optional tiles.
#[derive(Debug, Clone)]
pub struct TileLayer<T: Copy + Eq + Hash> {
    width: u32,
    height: u32,
    cells: Vec<Option<T>>,
    collides: HashSet<T>,
}

impl<T: Copy + Eq + Hash> TileLayer<T> {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            cells: vec![None; width as usize * height as usize],
            collides: HashSet::new(),
        }
    }

    fn index(&self, x: i32, y: i32) -> Option<usize> {
        if x < 0 || y < 0 || x as u32 >= self.width || y as u32 >= self.height {
            return None;
        }
        Some(y as usize * self.width as usize + x as usize)
    }

    pub fn get(&self, x: i32, y: i32) -> Option<T> {
        self.index(x, y).and_then(|i| self.cells[i])
    }

    /// Write a tile; `false` if the coordinate is outside the layer.
    pub fn put(&mut self, x: i32, y: i32, value: T) -> bool {
        match self.index(x, y) {
            Some(i) => {
                self.cells[i] = Some(value);
                true
            }
            None => false,
        }
    }

    /// Clear a tile, returning what was there.
    pub fn remove(&mut self, x: i32, y: i32) -> Option<T> {
        self.index(x, y).and_then(|i| self.cells[i].take())
    }

    /// Register tile values that collide.
    pub fn set_collision(&mut self, values: impl IntoIterator<Item = T>) {
        self.collides.extend(values);
    }

    pub fn is_colliding(&self, x: i32, y: i32) -> bool {
        self.get(x, y).is_some_and(|v| self.collides.contains(&v))
    }

    /// Number of occupied cells.
    pub fn occupied(&self) -> usize {
        self.cells.iter().filter(|c| c.is_some()).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn world_to_tile_floors() {
        let map = Tilemap::new(100, 1000, 64, 64);
        assert_eq!(map.world_to_tile(0.0, 0.0), TilePos::new(0, 0));
        assert_eq!(map.world_to_tile(127.9, 64.0), TilePos::new(1, 1));
        assert_eq!(map.world_to_tile(-0.5, 10.0), TilePos::new(-1, 0));
        assert_eq!(map.tile_to_world(TilePos::new(2, 3)), (128.0, 192.0));
        assert_eq!(map.pixel_size(), (6400.0, 64000.0));
    }

    #[test]
    fn layer_ignores_out_of_bounds() {
        let mut layer: TileLayer<u8> = TileLayer::new(4, 4);
        assert!(!layer.put(4, 0, 1));
        assert!(!layer.put(0, -1, 1));
        assert_eq!(layer.get(-1, 0), None);
        assert!(layer.put(3, 3, 7));
        assert_eq!(layer.get(3, 3), Some(7));
        assert_eq!(layer.remove(3, 3), Some(7));
        assert_eq!(layer.remove(3, 3), None);
        assert_eq!(layer.occupied(), 0);
    }

    #[test]
    fn collision_follows_registered_values() {
        let mut layer: TileLayer<u8> = TileLayer::new(2, 1);
        layer.set_collision([1]);
        layer.put(0, 0, 1);
        layer.put(1, 0, 2);
        assert!(layer.is_colliding(0, 0));
        assert!(!layer.is_colliding(1, 0));
    }
}
