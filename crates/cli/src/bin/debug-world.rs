//! Debug World Tool
//!
//! Debugging utility for terrain generation visualization and validation.
//!
//! Features:
//! - ASCII dump of a tile region
//! - Ore distribution per row band
//! - Determinism validation across load orders and reloads
//!
//! Usage:
//!   debug-world ascii --seed 12345 --region 0,0,99,60
//!   debug-world ores --seed 12345 --rows 0,60 --json target/ores.json
//!   debug-world validate-determinism --seed 12345 --chunks 0,0,6,8

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use digsite_core::BlockType;
use digsite_testkit::{write_json_report, BlockHistogram, RegionFingerprint};
use digsite_world::{ChunkDims, ChunkPos, Mine, TerrainConfig, Tilemap};
use serde::Serialize;
use std::fs;
use std::path::PathBuf;
use tracing::info;

#[derive(Parser, Debug)]
#[command(author, version, about = "Terrain debugging utility for digsite", long_about = None)]
struct Cli {
    #[command(flatten)]
    world: WorldArgs,

    #[command(subcommand)]
    command: Command,
}

#[derive(Args, Debug)]
struct WorldArgs {
    /// World seed string
    #[arg(long, global = true, default_value = "12345")]
    seed: String,

    /// World width in tiles
    #[arg(long, global = true, default_value_t = 100)]
    width: u32,

    /// World height in tiles
    #[arg(long, global = true, default_value_t = 1000)]
    height: u32,

    /// Chunk edge length in tiles
    #[arg(long, global = true, default_value_t = 16)]
    chunk_size: u32,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print a tile region as ASCII art
    Ascii {
        /// Inclusive tile region: min_x,min_y,max_x,max_y
        #[arg(long, value_parser = parse_rect)]
        region: Rect,
        /// Write to a file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Count blocks per type over a row band spanning the full width
    Ores {
        /// Inclusive row band: min_row,max_row
        #[arg(long, value_parser = parse_band, default_value = "0,60")]
        rows: (i32, i32),
        /// Also write the histogram as JSON
        #[arg(long)]
        json: Option<PathBuf>,
    },
    /// Regenerate chunks in different orders and compare fingerprints
    ValidateDeterminism {
        /// Inclusive chunk region: min_x,min_y,max_x,max_y
        #[arg(long, value_parser = parse_rect, default_value = "0,0,6,8")]
        chunks: Rect,
    },
}

#[derive(Debug, Clone, Copy)]
struct Rect {
    min_x: i32,
    min_y: i32,
    max_x: i32,
    max_y: i32,
}

fn parse_rect(s: &str) -> Result<Rect, String> {
    let parts: Vec<i32> = s
        .split(',')
        .map(|p| p.trim().parse::<i32>().map_err(|e| format!("{p:?}: {e}")))
        .collect::<Result<_, _>>()?;
    let [min_x, min_y, max_x, max_y] = parts[..] else {
        return Err("expected min_x,min_y,max_x,max_y".to_string());
    };
    if min_x > max_x || min_y > max_y {
        return Err("min must not exceed max".to_string());
    }
    Ok(Rect {
        min_x,
        min_y,
        max_x,
        max_y,
    })
}

fn parse_band(s: &str) -> Result<(i32, i32), String> {
    let (lo, hi) = s.split_once(',').ok_or("expected min_row,max_row")?;
    let lo: i32 = lo.trim().parse().map_err(|e| format!("min_row: {e}"))?;
    let hi: i32 = hi.trim().parse().map_err(|e| format!("max_row: {e}"))?;
    if lo > hi {
        return Err("min_row must not exceed max_row".to_string());
    }
    Ok((lo, hi))
}

#[derive(Debug, Serialize)]
struct OreReport<'a> {
    seed: &'a str,
    rows: (i32, i32),
    ore_total: usize,
    blocks: &'a BlockHistogram,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .init();

    let cli = Cli::parse();
    match cli.command {
        Command::Ascii { region, output } => ascii(&cli.world, region, output),
        Command::Ores { rows, json } => ores(&cli.world, rows, json),
        Command::ValidateDeterminism { chunks } => validate_determinism(&cli.world, chunks),
    }
}

impl WorldArgs {
    fn dims(&self) -> ChunkDims {
        ChunkDims::new(self.chunk_size, self.chunk_size)
    }

    fn mine(&self) -> Mine {
        Mine::new(
            Tilemap::new(self.width, self.height, 64, 64),
            TerrainConfig::default(),
            self.seed.as_str(),
        )
    }

    /// Mine with every chunk touching the tile rectangle loaded.
    fn mine_covering(&self, region: Rect) -> Mine {
        let dims = self.dims();
        let mut mine = self.mine();
        let lo = dims.chunk_of(digsite_core::TilePos::new(region.min_x, region.min_y));
        let hi = dims.chunk_of(digsite_core::TilePos::new(region.max_x, region.max_y));
        for x in lo.x..=hi.x {
            for y in lo.y..=hi.y {
                mine.add_chunk(dims, ChunkPos::new(x, y));
            }
        }
        mine
    }
}

fn ascii(world: &WorldArgs, region: Rect, output: Option<PathBuf>) -> Result<()> {
    let mine = world.mine_covering(region);
    let mut art = String::new();
    for y in region.min_y..=region.max_y {
        art.extend((region.min_x..=region.max_x).map(|x| mine.block_at(x, y).glyph()));
        art.push('\n');
    }
    art.push_str("\nlegend:");
    for block in BlockType::ALL {
        art.push_str(&format!(" '{}'={}", block.glyph(), block));
    }
    art.push('\n');

    match output {
        Some(path) => {
            fs::write(&path, art)
                .with_context(|| format!("failed to write {}", path.display()))?;
            info!(path = %path.display(), "ascii map written");
        }
        None => print!("{art}"),
    }
    Ok(())
}

fn ores(world: &WorldArgs, rows: (i32, i32), json: Option<PathBuf>) -> Result<()> {
    let region = Rect {
        min_x: 0,
        min_y: rows.0,
        max_x: world.width as i32 - 1,
        max_y: rows.1,
    };
    let mine = world.mine_covering(region);
    let histogram = BlockHistogram::from_blocks(
        (rows.0..=rows.1)
            .flat_map(|y| (region.min_x..=region.max_x).map(move |x| (x, y)))
            .map(|(x, y)| mine.block_at(x, y)),
    );

    println!("seed {} rows {}..={}", world.seed, rows.0, rows.1);
    for (block, count) in histogram.iter() {
        let marker = if block.is_ore() { "*" } else { " " };
        println!("{marker} {:<14} {count:>8}", block.name());
    }
    println!("  {:<14} {:>8}", "ore total", histogram.ore_total());

    if let Some(path) = json {
        let report = OreReport {
            seed: &world.seed,
            rows,
            ore_total: histogram.ore_total(),
            blocks: &histogram,
        };
        write_json_report(&path, &report)
            .with_context(|| format!("failed to write {}", path.display()))?;
    }
    Ok(())
}

fn validate_determinism(world: &WorldArgs, chunks: Rect) -> Result<()> {
    let dims = world.dims();
    let positions: Vec<ChunkPos> = (chunks.min_x..=chunks.max_x)
        .flat_map(|x| (chunks.min_y..=chunks.max_y).map(move |y| ChunkPos::new(x, y)))
        .collect();

    let fingerprint = |mine: &Mine, pos: ChunkPos| {
        let origin = dims.origin(pos);
        RegionFingerprint::of_region(origin.x, origin.y, dims.width, dims.height, |x, y| {
            mine.block_at(x, y)
        })
    };

    let mut forward = world.mine();
    for pos in &positions {
        forward.add_chunk(dims, *pos);
    }
    let mut backward = world.mine();
    for pos in positions.iter().rev() {
        backward.add_chunk(dims, *pos);
    }

    let mut mismatches = 0usize;
    for pos in &positions {
        let expected = fingerprint(&forward, *pos);
        if fingerprint(&backward, *pos) != expected {
            eprintln!("chunk {pos}: load order changed the result");
            mismatches += 1;
        }
        backward.remove_chunk(dims, *pos);
        backward.add_chunk(dims, *pos);
        if fingerprint(&backward, *pos) != expected {
            eprintln!("chunk {pos}: reload changed the result");
            mismatches += 1;
        }
    }

    if mismatches > 0 {
        bail!("{mismatches} determinism mismatches across {} chunks", positions.len());
    }
    println!(
        "✓ {} chunks deterministic for seed {}",
        positions.len(),
        world.seed
    );
    Ok(())
}
