//! Terrain and world configuration.
//!
//! Everything here is plain data with `serde` derives so the root binary can
//! load it from TOML. Defaults reproduce the shipped mine layout.

use digsite_core::BlockType;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A band of depth (rows below the column surface) filled with one block type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DepthLayerConfig {
    /// First depth of the band.
    pub start_depth: i32,
    /// End of the band; `None` extends to infinity.
    #[serde(default)]
    pub end_depth: Option<i32>,
    /// Dominant block for the band.
    pub block_type: BlockType,
    /// Authoring weight. Not read by generation.
    #[serde(default)]
    pub weight: Option<f32>,
}

impl DepthLayerConfig {
    /// Bounded layer covering `[start_depth, end_depth)`.
    pub fn new(start_depth: i32, end_depth: i32, block_type: BlockType) -> Self {
        Self {
            start_depth,
            end_depth: Some(end_depth),
            block_type,
            weight: None,
        }
    }

    /// Layer that never ends.
    pub fn open_ended(start_depth: i32, block_type: BlockType) -> Self {
        Self {
            start_depth,
            end_depth: None,
            block_type,
            weight: None,
        }
    }

    /// Nominal thickness, `None` for an open-ended layer.
    pub fn thickness(&self) -> Option<i32> {
        self.end_depth.map(|end| end - self.start_depth)
    }
}

/// Absolute row band in which an ore may replace the layer block.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OreLayerConfig {
    /// First row (inclusive).
    pub start_depth: i32,
    /// Last row (inclusive).
    pub end_depth: i32,
    /// Ore placed on a successful roll.
    pub block_type: BlockType,
    /// Per-tile probability in `[0, 1]`.
    #[serde(default)]
    pub chance: f64,
}

impl OreLayerConfig {
    pub fn new(start_depth: i32, end_depth: i32, block_type: BlockType, chance: f64) -> Self {
        Self {
            start_depth,
            end_depth,
            block_type,
            chance,
        }
    }

    /// Whether `row` falls inside the band.
    #[inline]
    pub fn contains_row(&self, row: i32) -> bool {
        row >= self.start_depth && row <= self.end_depth
    }
}

/// Layered terrain description consumed by the mine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TerrainConfig {
    /// Row around which the surface walk wanders.
    pub surface_level: i32,
    /// Depth layers, sorted ascending by `start_depth`.
    pub layers: Vec<DepthLayerConfig>,
    /// Ore bands, evaluated in declaration order.
    pub ore_layers: Vec<OreLayerConfig>,
    /// How far the surface may wander from `surface_level`.
    pub surface_variation: i32,
    /// Columns a surface terrace must span before it may step.
    pub surface_min_section: i32,
    /// How far each layer's thickness may deviate.
    pub layer_variation: i32,
    /// Columns a layer boundary keeps its direction at minimum.
    pub layer_min_section: i32,
}

impl Default for TerrainConfig {
    fn default() -> Self {
        Self {
            surface_level: 5,
            layers: vec![
                DepthLayerConfig::new(0, 1, BlockType::Empty),
                DepthLayerConfig::new(2, 3, BlockType::Dirt),
                DepthLayerConfig::new(4, 30, BlockType::LightStone),
                DepthLayerConfig::new(30, 50, BlockType::DarkStone),
                DepthLayerConfig::open_ended(50, BlockType::DarkStone),
            ],
            ore_layers: vec![
                OreLayerConfig::new(10, 20, BlockType::Diamond, 0.05),
                OreLayerConfig::new(15, 25, BlockType::Ruby, 0.1),
                OreLayerConfig::new(20, 30, BlockType::Sodalite, 0.15),
                OreLayerConfig::new(25, 40, BlockType::Beryl, 0.2),
            ],
            surface_variation: 2,
            surface_min_section: 4,
            layer_variation: 2,
            layer_min_section: 3,
        }
    }
}

impl TerrainConfig {
    /// Re-establish ascending `start_depth` order.
    pub fn sort_layers(&mut self) {
        self.layers.sort_by_key(|layer| layer.start_depth);
    }
}

/// Everything needed to build a [`crate::World`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorldConfig {
    /// World seed; a random one is generated when absent.
    pub seed: Option<String>,
    pub world_width_tiles: u32,
    pub world_height_tiles: u32,
    /// Tile size in world pixels.
    pub tile_width: u32,
    pub tile_height: u32,
    pub chunk_width_tiles: u32,
    pub chunk_height_tiles: u32,
    /// Chebyshev radius (in chunks) loaded around the camera.
    pub chunk_load_distance: i32,
    /// Chebyshev radius beyond which loaded chunks are dropped.
    pub chunk_unload_distance: i32,
    /// Accumulated frame time between chunk checks.
    pub chunk_check_interval_ms: f64,
    pub viewport_width: f32,
    pub viewport_height: f32,
    pub terrain: TerrainConfig,
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            seed: None,
            world_width_tiles: 100,
            world_height_tiles: 1000,
            tile_width: 64,
            tile_height: 64,
            chunk_width_tiles: 16,
            chunk_height_tiles: 16,
            chunk_load_distance: 2,
            chunk_unload_distance: 4,
            chunk_check_interval_ms: 250.0,
            viewport_width: 1024.0,
            viewport_height: 768.0,
            terrain: TerrainConfig::default(),
        }
    }
}

/// Setup-time configuration problems.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    /// A size that must be positive was zero.
    #[error("{0} must be greater than zero")]
    ZeroSize(&'static str),
    /// Load/unload radii would thrash.
    #[error("chunk_unload_distance ({unload}) must exceed chunk_load_distance ({load})")]
    NoHysteresis { load: i32, unload: i32 },
    /// Negative load radius.
    #[error("chunk_load_distance must not be negative (got {0})")]
    NegativeLoadDistance(i32),
    /// Terrain has no depth layers.
    #[error("terrain must define at least one depth layer")]
    NoLayers,
    /// Layers are not ascending by start depth.
    #[error("depth layer {index} starts at {start} before the previous layer ({previous})")]
    UnsortedLayers { index: usize, start: i32, previous: i32 },
    /// A bounded layer ends before it starts.
    #[error("depth layer {index} ends ({end}) before it starts ({start})")]
    InvertedLayer { index: usize, start: i32, end: i32 },
    /// An ore chance outside `[0, 1]`.
    #[error("ore layer {index} chance {chance} is outside [0, 1]")]
    InvalidChance { index: usize, chance: f64 },
}

impl TerrainConfig {
    /// Check ordering and ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.layers.is_empty() {
            return Err(ConfigError::NoLayers);
        }
        for (index, layer) in self.layers.iter().enumerate() {
            if let Some(end) = layer.end_depth {
                if end < layer.start_depth {
                    return Err(ConfigError::InvertedLayer {
                        index,
                        start: layer.start_depth,
                        end,
                    });
                }
            }
            if index > 0 {
                let previous = self.layers[index - 1].start_depth;
                if layer.start_depth < previous {
                    return Err(ConfigError::UnsortedLayers {
                        index,
                        start: layer.start_depth,
                        previous,
                    });
                }
            }
        }
        for (index, ore) in self.ore_layers.iter().enumerate() {
            if !(0.0..=1.0).contains(&ore.chance) {
                return Err(ConfigError::InvalidChance {
                    index,
                    chance: ore.chance,
                });
            }
        }
        Ok(())
    }
}

impl WorldConfig {
    /// Validate sizes, streaming radii and the terrain description.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let sizes = [
            ("world_width_tiles", self.world_width_tiles),
            ("world_height_tiles", self.world_height_tiles),
            ("tile_width", self.tile_width),
            ("tile_height", self.tile_height),
            ("chunk_width_tiles", self.chunk_width_tiles),
            ("chunk_height_tiles", self.chunk_height_tiles),
        ];
        for (name, value) in sizes {
            if value == 0 {
                return Err(ConfigError::ZeroSize(name));
            }
        }
        if self.chunk_load_distance < 0 {
            return Err(ConfigError::NegativeLoadDistance(self.chunk_load_distance));
        }
        if self.chunk_unload_distance <= self.chunk_load_distance {
            return Err(ConfigError::NoHysteresis {
                load: self.chunk_load_distance,
                unload: self.chunk_unload_distance,
            });
        }
        self.terrain.validate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        assert_eq!(WorldConfig::default().validate(), Ok(()));
    }

    #[test]
    fn rejects_missing_hysteresis() {
        let cfg = WorldConfig {
            chunk_load_distance: 3,
            chunk_unload_distance: 3,
            ..WorldConfig::default()
        };
        assert_eq!(
            cfg.validate(),
            Err(ConfigError::NoHysteresis { load: 3, unload: 3 })
        );
    }

    #[test]
    fn rejects_unsorted_layers() {
        let mut terrain = TerrainConfig::default();
        terrain.layers.swap(1, 2);
        assert!(matches!(
            terrain.validate(),
            Err(ConfigError::UnsortedLayers { index: 2, .. })
        ));
        terrain.sort_layers();
        assert_eq!(terrain.validate(), Ok(()));
    }

    #[test]
    fn rejects_bad_chance() {
        let mut terrain = TerrainConfig::default();
        terrain.ore_layers[0].chance = 1.5;
        assert!(matches!(
            terrain.validate(),
            Err(ConfigError::InvalidChance { index: 0, .. })
        ));
    }

    #[test]
    fn ore_band_is_inclusive() {
        let ore = OreLayerConfig::new(10, 20, BlockType::Diamond, 1.0);
        assert!(ore.contains_row(10));
        assert!(ore.contains_row(20));
        assert!(!ore.contains_row(21));
        assert!(!ore.contains_row(9));
    }

    #[test]
    fn terrain_config_deserializes_with_defaults() {
        let json = r#"{
            "surface_level": 8,
            "layers": [
                {"start_depth": 0, "end_depth": 4, "block_type": "dirt"},
                {"start_depth": 4, "block_type": "bedrock"}
            ]
        }"#;
        let cfg: TerrainConfig = serde_json::from_str(json).unwrap();
        assert_eq!(cfg.surface_level, 8);
        assert_eq!(cfg.layers[1].end_depth, None);
        assert!(cfg.ore_layers.is_empty());
        assert_eq!(cfg.layer_variation, TerrainConfig::default().layer_variation);
    }
}
