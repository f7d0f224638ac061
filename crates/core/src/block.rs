//! Tile materials.
//!
//! The integer index of a [`BlockType`] is the value stored in the ground
//! layer of the tilemap. `-1` is reserved for [`BlockType::Empty`].

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Material of a single ground tile.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Default,
)]
#[serde(rename_all = "snake_case")]
#[repr(i8)]
pub enum BlockType {
    /// No collidable block.
    #[default]
    Empty = -1,
    /// Loose surface dirt.
    Dirt = 0,
    /// Cobbled stone.
    CobbledStone = 1,
    /// Indestructible floor material.
    Bedrock = 2,
    /// Shallow stone.
    LightStone = 3,
    /// Diamond ore.
    Diamond = 4,
    /// Deep stone.
    DarkStone = 5,
    /// Ruby ore.
    Ruby = 6,
    /// Sodalite ore.
    Sodalite = 7,
    /// Beryl ore.
    Beryl = 8,
}

/// Error returned when a block name or index does not map to a [`BlockType`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown block type: {0}")]
pub struct UnknownBlockType(pub String);

impl BlockType {
    /// Every block type, `Empty` first.
    pub const ALL: [BlockType; 10] = [
        BlockType::Empty,
        BlockType::Dirt,
        BlockType::CobbledStone,
        BlockType::Bedrock,
        BlockType::LightStone,
        BlockType::Diamond,
        BlockType::DarkStone,
        BlockType::Ruby,
        BlockType::Sodalite,
        BlockType::Beryl,
    ];

    /// Every block type that collides.
    pub const SOLID: [BlockType; 9] = [
        BlockType::Dirt,
        BlockType::CobbledStone,
        BlockType::Bedrock,
        BlockType::LightStone,
        BlockType::Diamond,
        BlockType::DarkStone,
        BlockType::Ruby,
        BlockType::Sodalite,
        BlockType::Beryl,
    ];

    /// Tile index used by the tile layer.
    #[inline]
    pub const fn index(self) -> i32 {
        self as i8 as i32
    }

    /// Inverse of [`BlockType::index`].
    pub fn from_index(index: i32) -> Option<Self> {
        Self::ALL.iter().copied().find(|b| b.index() == index)
    }

    /// `Empty` is never solid; everything else is.
    #[inline]
    pub const fn is_solid(self) -> bool {
        !matches!(self, BlockType::Empty)
    }

    /// Inverse of [`BlockType::is_solid`].
    #[inline]
    pub const fn is_empty(self) -> bool {
        matches!(self, BlockType::Empty)
    }

    /// Whether the block is a sellable ore vein material.
    pub const fn is_ore(self) -> bool {
        matches!(
            self,
            BlockType::Diamond | BlockType::Ruby | BlockType::Sodalite | BlockType::Beryl
        )
    }

    /// Stable snake_case name, matching the config file spelling.
    pub const fn name(self) -> &'static str {
        match self {
            BlockType::Empty => "empty",
            BlockType::Dirt => "dirt",
            BlockType::CobbledStone => "cobbled_stone",
            BlockType::Bedrock => "bedrock",
            BlockType::LightStone => "light_stone",
            BlockType::Diamond => "diamond",
            BlockType::DarkStone => "dark_stone",
            BlockType::Ruby => "ruby",
            BlockType::Sodalite => "sodalite",
            BlockType::Beryl => "beryl",
        }
    }

    /// Single character used by ASCII terrain dumps.
    pub const fn glyph(self) -> char {
        match self {
            BlockType::Empty => ' ',
            BlockType::Dirt => '.',
            BlockType::CobbledStone => 'c',
            BlockType::Bedrock => '#',
            BlockType::LightStone => ':',
            BlockType::Diamond => 'D',
            BlockType::DarkStone => '=',
            BlockType::Ruby => 'R',
            BlockType::Sodalite => 'S',
            BlockType::Beryl => 'B',
        }
    }
}

impl fmt::Display for BlockType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for BlockType {
    type Err = UnknownBlockType;

    /// Accepts either the snake_case name or the integer tile index.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if let Ok(index) = s.parse::<i32>() {
            return Self::from_index(index).ok_or_else(|| UnknownBlockType(s.to_string()));
        }
        let lower = s.to_ascii_lowercase();
        Self::ALL
            .iter()
            .copied()
            .find(|b| b.name() == lower)
            .ok_or_else(|| UnknownBlockType(s.to_string()))
    }
}
