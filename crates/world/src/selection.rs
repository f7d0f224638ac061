//! Per-player tile selection.
//!
//! Each player owns at most one selected tile. Selections are drawn as
//! markers on an overlay layer; several players may point at the same tile,
//! and its marker stays until the last of them lets go.

use crate::tilemap::TileLayer;
use digsite_core::{BlockType, Direction, TilePos};
use std::collections::BTreeMap;

bitflags::bitflags! {
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
    /// Which of the eight neighbors were solid when a tile was selected.
    pub struct Adjacency: u8 {
        const UP_LEFT = 0b0000_0001;
        const UP = 0b0000_0010;
        const UP_RIGHT = 0b0000_0100;
        const LEFT = 0b0000_1000;
        const RIGHT = 0b0001_0000;
        const DOWN_LEFT = 0b0010_0000;
        const DOWN = 0b0100_0000;
        const DOWN_RIGHT = 0b1000_0000;
    }
}

impl Default for Adjacency {
    fn default() -> Self {
        Adjacency::empty()
    }
}

impl Adjacency {
    /// Flag for a single direction.
    pub const fn from_direction(dir: Direction) -> Self {
        match dir {
            Direction::UpLeft => Adjacency::UP_LEFT,
            Direction::Up => Adjacency::UP,
            Direction::UpRight => Adjacency::UP_RIGHT,
            Direction::Left => Adjacency::LEFT,
            Direction::Right => Adjacency::RIGHT,
            Direction::DownLeft => Adjacency::DOWN_LEFT,
            Direction::Down => Adjacency::DOWN,
            Direction::DownRight => Adjacency::DOWN_RIGHT,
        }
    }

    /// Snapshot neighbors of `center` using `is_solid`.
    pub fn scan(center: TilePos, mut is_solid: impl FnMut(TilePos) -> bool) -> Self {
        Direction::ALL
            .into_iter()
            .filter(|dir| is_solid(center.offset(*dir)))
            .fold(Adjacency::empty(), |acc, dir| {
                acc | Adjacency::from_direction(dir)
            })
    }

    pub fn is_solid(self, dir: Direction) -> bool {
        self.contains(Adjacency::from_direction(dir))
    }
}

/// Tile a player has selected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlayerSelectedTile {
    pub x: i32,
    pub y: i32,
    pub block: BlockType,
    /// Neighbor solidity at selection time. Not refreshed afterwards.
    pub adjacencies: Option<Adjacency>,
}

impl PlayerSelectedTile {
    pub fn pos(&self) -> TilePos {
        TilePos::new(self.x, self.y)
    }
}

/// Marker drawn on a selected tile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SelectionMarker {
    Outline,
}

/// Selected tile per player id plus the marker overlay.
#[derive(Debug, Clone)]
pub struct SelectionMap {
    selected: BTreeMap<String, PlayerSelectedTile>,
    markers: TileLayer<SelectionMarker>,
}

impl SelectionMap {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            selected: BTreeMap::new(),
            markers: TileLayer::new(width, height),
        }
    }

    /// Replace `player`'s selection with `tile`. `false` (and no change) for `None`.
    pub fn set_selected_tile(&mut self, tile: Option<PlayerSelectedTile>, player: &str) -> bool {
        let Some(tile) = tile else {
            return false;
        };
        self.deselect_tile(player);
        self.selected.insert(player.to_string(), tile);
        self.markers.put(tile.x, tile.y, SelectionMarker::Outline);
        true
    }

    /// Drop `player`'s selection if there is one.
    pub fn deselect_tile(&mut self, player: &str) {
        if let Some(old) = self.selected.remove(player) {
            if !self.is_selected_by_anyone(old.pos()) {
                self.markers.remove(old.x, old.y);
            }
        }
    }

    pub fn get_selected_tile(&self, player: &str) -> Option<&PlayerSelectedTile> {
        self.selected.get(player)
    }

    /// Whether a marker is drawn at `(x, y)`.
    pub fn has_marker(&self, x: i32, y: i32) -> bool {
        self.markers.get(x, y).is_some()
    }

    /// Players that currently hold a selection, in id order.
    pub fn players(&self) -> impl Iterator<Item = &str> {
        self.selected.keys().map(String::as_str)
    }

    fn is_selected_by_anyone(&self, pos: TilePos) -> bool {
        self.selected.values().any(|t| t.pos() == pos)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tile(x: i32, y: i32) -> PlayerSelectedTile {
        PlayerSelectedTile {
            x,
            y,
            block: BlockType::Dirt,
            adjacencies: None,
        }
    }

    #[test]
    fn none_is_rejected() {
        let mut map = SelectionMap::new(8, 8);
        assert!(map.set_selected_tile(Some(tile(1, 1)), "p1"));
        assert!(!map.set_selected_tile(None, "p1"));
        assert_eq!(map.get_selected_tile("p1").map(|t| t.pos()), Some(TilePos::new(1, 1)));
    }

    #[test]
    fn reselect_moves_marker() {
        let mut map = SelectionMap::new(8, 8);
        map.set_selected_tile(Some(tile(1, 1)), "p1");
        map.set_selected_tile(Some(tile(2, 3)), "p1");
        assert_eq!(map.get_selected_tile("p1").map(|t| t.pos()), Some(TilePos::new(2, 3)));
        assert!(!map.has_marker(1, 1));
        assert!(map.has_marker(2, 3));
    }

    #[test]
    fn shared_tile_keeps_marker_until_last_player_leaves() {
        let mut map = SelectionMap::new(8, 8);
        map.set_selected_tile(Some(tile(4, 4)), "p1");
        map.set_selected_tile(Some(tile(4, 4)), "p2");
        map.deselect_tile("p1");
        assert!(map.has_marker(4, 4));
        assert!(map.get_selected_tile("p1").is_none());
        map.deselect_tile("p2");
        assert!(!map.has_marker(4, 4));
    }

    #[test]
    fn deselect_without_selection_is_noop() {
        let mut map = SelectionMap::new(8, 8);
        map.deselect_tile("nobody");
        assert_eq!(map.players().count(), 0);
    }

    #[test]
    fn adjacency_scan_marks_solid_neighbors() {
        let solid = [TilePos::new(4, 5), TilePos::new(5, 4), TilePos::new(3, 3)];
        let adj = Adjacency::scan(TilePos::new(4, 4), |p| solid.contains(&p));
        assert!(adj.is_solid(Direction::Down));
        assert!(adj.is_solid(Direction::Right));
        assert!(adj.is_solid(Direction::UpLeft));
        assert!(!adj.is_solid(Direction::Up));
        assert_eq!(adj.bits().count_ones(), 3);
    }
}
