//! Seeded terrain shape primitives.
//!
//! Everything in this module is a pure function of its inputs and a string
//! seed. Chunk generation never draws from a shared stream, so the order in
//! which chunks are materialized cannot change what they contain.

use crate::config::TerrainConfig;
use digsite_core::{BlockType, SeededRandom};
use tracing::{debug, instrument};

/// Probability that a boundary walk picks a fresh direction once its run is long enough.
const DIRECTION_CHANGE_CHANCE: f64 = 0.3;
/// Probability that a boundary walk steps in its current direction.
const STEP_CHANCE: f64 = 0.4;

/// Wandering boundary made of flat terraces.
///
/// Starts at a random height in `[min_height, max_height]`. For every column a
/// binary direction is drawn, but a step of one is only applied once the
/// current terrace is longer than `min_section_size`; stepping resets the
/// terrace. Heights are clamped to `[min_height, max_height]` and to
/// `start ± max_variation` (a negative `max_variation` disables that clamp).
///
/// Returns one height per column; `width <= 0` yields an empty vector.
pub fn random_walk_smooth(
    width: i32,
    max_variation: i32,
    max_height: i32,
    min_height: i32,
    min_section_size: i32,
    seed: &str,
) -> Vec<i32> {
    if width <= 0 {
        return Vec::new();
    }

    let mut rand = SeededRandom::new(seed);
    let start = rand.range(min_height, max_height + 1);
    let (low, high) = if max_variation >= 0 {
        (
            min_height.max(start - max_variation),
            max_height.min(start + max_variation),
        )
    } else {
        (min_height, max_height)
    };

    let mut heights = Vec::with_capacity(width as usize);
    let mut height = start;
    let mut section = 0;

    for _ in 0..width {
        let step_down = rand.range(0, 2) == 0;
        if section > min_section_size {
            if step_down && height > low {
                height -= 1;
                section = 0;
            } else if !step_down && height < high {
                height += 1;
                section = 0;
            }
        }
        section += 1;
        heights.push(height);
    }

    heights
}

/// Perturbation of a single layer boundary around `base_depth`.
///
/// Keeps a direction for at least `min_section_size` columns, then re-rolls
/// it with a 30% chance per column. Each column has a 40% chance to move one
/// step, provided the result stays inside `base_depth ± max_variation`.
pub fn layer_boundary_walk(
    width: i32,
    base_depth: i32,
    max_variation: i32,
    min_section_size: i32,
    seed: &str,
) -> Vec<i32> {
    if width <= 0 {
        return Vec::new();
    }

    let mut rand = SeededRandom::new(seed);
    let max_variation = max_variation.max(0);
    let mut height = base_depth + rand.range(-max_variation, max_variation + 1);
    let mut direction = if rand.range(0, 2) == 0 { -1 } else { 1 };
    let mut section = 0;
    let mut heights = Vec::with_capacity(width as usize);

    for _ in 0..width {
        if section >= min_section_size && rand.float() < DIRECTION_CHANGE_CHANCE {
            direction = if rand.range(0, 2) == 0 { -1 } else { 1 };
            section = 0;
        }

        if rand.float() < STEP_CHANCE {
            let next = height + direction;
            if next >= base_depth - max_variation && next <= base_depth + max_variation {
                height = next;
            }
        }

        heights.push(height);
        section += 1;
    }

    heights
}

/// Deterministic draw in `[0, 1)` for an ore roll at one tile.
///
/// Re-seeded per world seed, coordinate and ore type, so two ore layers
/// overlapping the same tile roll independently.
pub fn ore_roll(world_seed: &str, x: i32, y: i32, block: BlockType) -> f64 {
    SeededRandom::new(&format!("{world_seed}-ore-{x},{y}-{block}")).float()
}

/// Per-column surface rows and per-layer boundary offsets for a whole world.
///
/// Computed once per seed/config so that every chunk reads the same columns
/// regardless of load order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TerrainProfile {
    surface: Vec<i32>,
    layer_variations: Vec<Vec<i32>>,
}

impl TerrainProfile {
    /// Generate the profile for `width` columns.
    #[instrument(skip(config), fields(layers = config.layers.len()))]
    pub fn generate(config: &TerrainConfig, seed: &str, width: u32) -> Self {
        let width = i32::try_from(width).unwrap_or(i32::MAX);
        let variation = config.surface_variation.max(0);
        let surface = random_walk_smooth(
            width,
            variation,
            config.surface_level + variation,
            (config.surface_level - variation).max(0),
            config.surface_min_section,
            &format!("{seed}-surface"),
        );

        let layer_variations = (0..config.layers.len())
            .map(|index| {
                layer_boundary_walk(
                    width,
                    0,
                    config.layer_variation,
                    config.layer_min_section,
                    &format!("{seed}-layer-{index}"),
                )
            })
            .collect();

        debug!(columns = surface.len(), "terrain profile generated");
        Self {
            surface,
            layer_variations,
        }
    }

    /// Surface row of `column`, if the column is inside the profile.
    pub fn surface_row(&self, column: i32) -> Option<i32> {
        usize::try_from(column)
            .ok()
            .and_then(|c| self.surface.get(c))
            .copied()
    }

    /// Boundary offsets, one row per depth layer.
    pub fn layer_variations(&self) -> &[Vec<i32>] {
        &self.layer_variations
    }

    /// Number of columns covered.
    pub fn width(&self) -> usize {
        self.surface.len()
    }
}
