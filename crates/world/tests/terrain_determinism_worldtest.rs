//! Terrain determinism worldtest
//!
//! Validates that chunk generation is a pure function of the seed:
//! - Same seed produces identical chunks
//! - Chunk load order does not matter
//! - Unload + reload reproduces the same tiles
//! - Different seeds produce different terrain

use digsite_core::BlockType;
use digsite_testkit::{BlockHistogram, RegionFingerprint};
use digsite_world::{ChunkDims, ChunkPos, Mine, TerrainConfig, Tilemap};

const SEED: &str = "determinism-11223344";
const DIMS: ChunkDims = ChunkDims::new(16, 16);

fn fresh_mine(seed: &str) -> Mine {
    Mine::new(Tilemap::new(100, 1000, 64, 64), TerrainConfig::default(), seed)
}

fn fingerprint(mine: &Mine, pos: ChunkPos) -> RegionFingerprint {
    let origin = DIMS.origin(pos);
    RegionFingerprint::of_region(origin.x, origin.y, DIMS.width, DIMS.height, |x, y| {
        mine.block_at(x, y)
    })
}

fn chunk_grid() -> Vec<ChunkPos> {
    (0..7)
        .flat_map(|x| (0..6).map(move |y| ChunkPos::new(x, y)))
        .collect()
}

#[test]
fn same_seed_same_chunks() {
    let mut a = fresh_mine(SEED);
    let mut b = fresh_mine(SEED);
    for pos in chunk_grid() {
        a.add_chunk(DIMS, pos);
        b.add_chunk(DIMS, pos);
        assert_eq!(fingerprint(&a, pos), fingerprint(&b, pos), "chunk {pos}");
    }
}

#[test]
fn load_order_does_not_matter() {
    let mut forward = fresh_mine(SEED);
    let mut backward = fresh_mine(SEED);
    let grid = chunk_grid();
    for pos in &grid {
        forward.add_chunk(DIMS, *pos);
    }
    for pos in grid.iter().rev() {
        backward.add_chunk(DIMS, *pos);
    }
    for pos in grid {
        assert_eq!(fingerprint(&forward, pos), fingerprint(&backward, pos), "chunk {pos}");
    }
}

#[test]
fn reload_reproduces_tiles() {
    let mut mine = fresh_mine(SEED);
    let pos = ChunkPos::new(2, 1);
    mine.add_chunk(DIMS, pos);
    let before = fingerprint(&mine, pos);

    mine.remove_chunk(DIMS, pos);
    let origin = DIMS.origin(pos);
    assert!(DIMS
        .tiles(pos)
        .all(|t| mine.get_tile_at(t.x, t.y).is_none()));

    mine.add_chunk(DIMS, pos);
    assert_eq!(fingerprint(&mine, pos), before);
    assert_eq!(
        mine.block_at(origin.x, origin.y + 5),
        mine.generated_block_at(origin.x, origin.y + 5)
    );
}

#[test]
fn different_seeds_diverge() {
    let mut a = fresh_mine("seed-a");
    let mut b = fresh_mine("seed-b");
    let grid = chunk_grid();
    for pos in &grid {
        a.add_chunk(DIMS, *pos);
        b.add_chunk(DIMS, *pos);
    }
    let differing = grid
        .iter()
        .filter(|pos| fingerprint(&a, **pos) != fingerprint(&b, **pos))
        .count();
    assert!(differing > 0);
}

#[test]
fn default_layers_produce_expected_materials() {
    let mut mine = fresh_mine(SEED);
    for pos in chunk_grid() {
        mine.add_chunk(DIMS, pos);
    }
    let histogram = BlockHistogram::from_blocks(
        (0..96)
            .flat_map(|y| (0..100).map(move |x| (x, y)))
            .map(|(x, y)| mine.block_at(x, y)),
    );
    assert!(histogram.count(BlockType::Dirt) > 0);
    assert!(histogram.count(BlockType::LightStone) > 0);
    assert!(histogram.count(BlockType::DarkStone) > 0);
    assert!(histogram.ore_total() > 0);
    assert_eq!(histogram.count(BlockType::Bedrock), 0);

    // Ores never appear outside their bands.
    for x in 0..100 {
        for y in 41..96 {
            assert!(!mine.block_at(x, y).is_ore(), "ore at {x},{y}");
        }
        for y in 0..10 {
            assert!(!mine.block_at(x, y).is_ore(), "ore at {x},{y}");
        }
    }
}
