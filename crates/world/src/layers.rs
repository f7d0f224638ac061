//! Depth-layer classification and ore overlay.

use crate::config::{DepthLayerConfig, OreLayerConfig, TerrainConfig};
use crate::terrain::{ore_roll, TerrainProfile};
use digsite_core::BlockType;

/// Index of the layer whose adjusted band contains `depth`.
///
/// Bands are laid end to end starting at the first layer's `start_depth`; a
/// layer's thickness is its nominal thickness plus its boundary offset for
/// `lateral` (never below zero). Open-ended layers swallow everything below
/// them. Depths past every band fall back to the last layer; depths above the
/// first band (including negative depths) have no layer.
pub fn layer_index(
    depth: i32,
    lateral: usize,
    layers: &[DepthLayerConfig],
    variations: &[Vec<i32>],
) -> Option<usize> {
    let first = layers.first()?;
    let mut start = first.start_depth;
    if depth < start.max(0) {
        return None;
    }

    for (index, layer) in layers.iter().enumerate() {
        let Some(thickness) = layer.thickness() else {
            return Some(index);
        };
        let offset = variations
            .get(index)
            .and_then(|row| row.get(lateral))
            .copied()
            .unwrap_or(0);
        let end = start + (thickness + offset).max(0);
        if depth >= start && depth < end {
            return Some(index);
        }
        start = end;
    }

    Some(layers.len() - 1)
}

/// Block for a tile `depth` rows below its column surface.
pub fn classify(
    depth: i32,
    lateral: usize,
    layers: &[DepthLayerConfig],
    variations: &[Vec<i32>],
) -> BlockType {
    layer_index(depth, lateral, layers, variations)
        .map(|index| layers[index].block_type)
        .unwrap_or(BlockType::Empty)
}

/// Replace `block` with an ore when a layer's band covers row `y` and its roll passes.
///
/// Ore layers are tried in declaration order and the first passing roll
/// wins. Empty tiles are never turned into ore.
pub fn apply_ore_layers(
    block: BlockType,
    x: i32,
    y: i32,
    ore_layers: &[OreLayerConfig],
    seed: &str,
) -> BlockType {
    if block.is_empty() {
        return block;
    }
    ore_layers
        .iter()
        .filter(|ore| ore.contains_row(y))
        .find(|ore| ore_roll(seed, x, y, ore.block_type) < ore.chance)
        .map(|ore| ore.block_type)
        .unwrap_or(block)
}

/// Full generator query for one tile: surface, layer band, then ore overlay.
pub fn generate_block(
    config: &TerrainConfig,
    profile: &TerrainProfile,
    seed: &str,
    x: i32,
    y: i32,
) -> BlockType {
    let Some(surface) = profile.surface_row(x) else {
        return BlockType::Empty;
    };
    let base = classify(
        y - surface,
        x as usize,
        &config.layers,
        profile.layer_variations(),
    );
    apply_ore_layers(base, x, y, &config.ore_layers, seed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DepthLayerConfig;

    fn layers() -> Vec<DepthLayerConfig> {
        vec![
            DepthLayerConfig::new(0, 2, BlockType::Empty),
            DepthLayerConfig::new(2, 5, BlockType::Dirt),
            DepthLayerConfig::new(5, 10, BlockType::LightStone),
            DepthLayerConfig::open_ended(10, BlockType::Bedrock),
        ]
    }

    #[test]
    fn classifies_unvaried_bands() {
        let layers = layers();
        assert_eq!(classify(0, 0, &layers, &[]), BlockType::Empty);
        assert_eq!(classify(1, 0, &layers, &[]), BlockType::Empty);
        assert_eq!(classify(2, 0, &layers, &[]), BlockType::Dirt);
        assert_eq!(classify(4, 0, &layers, &[]), BlockType::Dirt);
        assert_eq!(classify(5, 0, &layers, &[]), BlockType::LightStone);
        assert_eq!(classify(9, 0, &layers, &[]), BlockType::LightStone);
        assert_eq!(classify(10, 0, &layers, &[]), BlockType::Bedrock);
        assert_eq!(classify(5000, 0, &layers, &[]), BlockType::Bedrock);
    }

    #[test]
    fn variation_shifts_following_bands() {
        let layers = layers();
        // Dirt thickens by two at column 1 only.
        let variations = vec![vec![0, 0], vec![0, 2], vec![0, 0], vec![0, 0]];
        assert_eq!(classify(5, 0, &layers, &variations), BlockType::LightStone);
        assert_eq!(classify(5, 1, &layers, &variations), BlockType::Dirt);
        assert_eq!(classify(7, 1, &layers, &variations), BlockType::LightStone);
        assert_eq!(classify(11, 1, &layers, &variations), BlockType::LightStone);
        assert_eq!(classify(12, 1, &layers, &variations), BlockType::Bedrock);
    }

    #[test]
    fn negative_thickness_collapses_band() {
        let layers = layers();
        let variations = vec![vec![0], vec![-10], vec![0], vec![0]];
        assert_eq!(classify(2, 0, &layers, &variations), BlockType::LightStone);
    }

    #[test]
    fn above_surface_and_no_layers_are_empty() {
        assert_eq!(classify(-1, 0, &layers(), &[]), BlockType::Empty);
        assert_eq!(classify(3, 0, &[], &[]), BlockType::Empty);
    }

    #[test]
    fn bounded_last_layer_is_fallback() {
        let layers = vec![
            DepthLayerConfig::new(0, 3, BlockType::Dirt),
            DepthLayerConfig::new(3, 6, BlockType::DarkStone),
        ];
        assert_eq!(classify(100, 0, &layers, &[]), BlockType::DarkStone);
    }

    #[test]
    fn ore_first_match_wins() {
        let ores = vec![
            OreLayerConfig::new(0, 50, BlockType::Ruby, 1.0),
            OreLayerConfig::new(0, 50, BlockType::Diamond, 1.0),
        ];
        assert_eq!(
            apply_ore_layers(BlockType::LightStone, 4, 20, &ores, "s"),
            BlockType::Ruby
        );
        assert_eq!(
            apply_ore_layers(BlockType::LightStone, 4, 51, &ores, "s"),
            BlockType::LightStone
        );
        assert_eq!(
            apply_ore_layers(BlockType::Empty, 4, 20, &ores, "s"),
            BlockType::Empty
        );
    }

    #[test]
    fn zero_chance_never_places_ore() {
        let ores = vec![OreLayerConfig::new(0, 100, BlockType::Beryl, 0.0)];
        for x in 0..50 {
            assert_eq!(
                apply_ore_layers(BlockType::DarkStone, x, x, &ores, "s"),
                BlockType::DarkStone
            );
        }
    }

    #[test]
    fn bands_follow_each_column_surface() {
        let config = TerrainConfig {
            surface_level: 10,
            surface_variation: 3,
            surface_min_section: 1,
            layer_variation: 0,
            layers: vec![
                DepthLayerConfig::new(0, 3, BlockType::Dirt),
                DepthLayerConfig::new(3, 7, BlockType::LightStone),
                DepthLayerConfig::open_ended(7, BlockType::DarkStone),
            ],
            ore_layers: Vec::new(),
            ..TerrainConfig::default()
        };
        let (seed, profile) = (0..32)
            .map(|i| format!("undulating-{i}"))
            .map(|seed| {
                let profile = TerrainProfile::generate(&config, &seed, 64);
                (seed, profile)
            })
            .find(|(_, profile)| {
                let rows: Vec<_> = (0..64).filter_map(|x| profile.surface_row(x)).collect();
                rows.iter().any(|&row| row != rows[0])
            })
            .expect("some seed should produce an uneven surface");

        for x in 0..64 {
            let surface = profile.surface_row(x).unwrap();
            let block = |y| generate_block(&config, &profile, &seed, x, y);
            assert_eq!(block(surface - 1), BlockType::Empty, "column {x}");
            for depth in 0..3 {
                assert_eq!(block(surface + depth), BlockType::Dirt, "column {x}");
            }
            for depth in 3..7 {
                assert_eq!(block(surface + depth), BlockType::LightStone, "column {x}");
            }
            assert_eq!(block(surface + 7), BlockType::DarkStone, "column {x}");
            assert_eq!(block(surface + 40), BlockType::DarkStone, "column {x}");
        }
    }
}
