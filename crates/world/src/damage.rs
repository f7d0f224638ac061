//! Incremental tile damage.
//!
//! A tile moves from undamaged (no record) to damaged (record with
//! `0 < damage < max_health`) to destroyed (record dropped, ground tile
//! cleared). `max_health` is captured from the health table on the first hit
//! and stays fixed for the life of the record.

use crate::tilemap::TileLayer;
use digsite_core::{BlockType, TilePos};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use tracing::debug;

/// Health used for block types missing from the table.
pub const DEFAULT_BLOCK_HEALTH: f32 = 30.0;

/// Cosmetic crack stage drawn over a damaged tile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum DamageTier {
    /// `[25, 50)` percent.
    Light,
    /// `[50, 75)` percent.
    Medium,
    /// `[75, 90)` percent.
    Heavy,
    /// 90 percent and above.
    Critical,
}

impl DamageTier {
    /// Tier for a damage percentage in `0..=100`. Below 25 has no overlay.
    pub fn from_percent(percent: f32) -> Option<Self> {
        if percent >= 90.0 {
            Some(DamageTier::Critical)
        } else if percent >= 75.0 {
            Some(DamageTier::Heavy)
        } else if percent >= 50.0 {
            Some(DamageTier::Medium)
        } else if percent >= 25.0 {
            Some(DamageTier::Light)
        } else {
            None
        }
    }
}

/// Max health per block type.
#[derive(Debug, Clone, PartialEq)]
pub struct BlockHealthTable {
    health: HashMap<BlockType, f32>,
}

impl Default for BlockHealthTable {
    fn default() -> Self {
        let health = HashMap::from([
            (BlockType::Empty, 0.0),
            (BlockType::Dirt, 20.0),
            (BlockType::CobbledStone, 40.0),
            (BlockType::LightStone, 50.0),
            (BlockType::Sodalite, 60.0),
            (BlockType::Beryl, 70.0),
            (BlockType::DarkStone, 80.0),
            (BlockType::Ruby, 100.0),
            (BlockType::Diamond, 120.0),
            // Out of reach of any tool.
            (BlockType::Bedrock, 999.0),
        ]);
        Self { health }
    }
}

impl BlockHealthTable {
    /// Table with no entries; every block gets [`DEFAULT_BLOCK_HEALTH`].
    pub fn empty() -> Self {
        Self {
            health: HashMap::new(),
        }
    }

    pub fn with(mut self, block: BlockType, health: f32) -> Self {
        self.health.insert(block, health);
        self
    }

    /// Max health for `block`. Unmapped and zero entries fall back to the default.
    pub fn max_health(&self, block: BlockType) -> f32 {
        match self.health.get(&block) {
            Some(&h) if h > 0.0 => h,
            _ => DEFAULT_BLOCK_HEALTH,
        }
    }
}

/// Accumulated damage on one tile.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DamageRecord {
    pub damage: f32,
    pub max_health: f32,
}

impl DamageRecord {
    pub fn percent(&self) -> f32 {
        self.damage * 100.0 / self.max_health
    }
}

/// Per-tile damage records and their overlay layer.
#[derive(Debug, Clone)]
pub struct TileDamageMap {
    health: BlockHealthTable,
    records: BTreeMap<TilePos, DamageRecord>,
    overlay: TileLayer<DamageTier>,
}

impl TileDamageMap {
    pub fn new(width: u32, height: u32) -> Self {
        Self::with_health(width, height, BlockHealthTable::default())
    }

    pub fn with_health(width: u32, height: u32, health: BlockHealthTable) -> Self {
        Self {
            health,
            records: BTreeMap::new(),
            overlay: TileLayer::new(width, height),
        }
    }

    pub fn health_table(&self) -> &BlockHealthTable {
        &self.health
    }

    /// Add `amount` damage to the tile at `(x, y)` on `ground`.
    ///
    /// Returns `true` only when this hit destroyed the tile. Empty tiles and
    /// non-positive amounts are ignored.
    pub fn apply_damage(
        &mut self,
        x: i32,
        y: i32,
        amount: f32,
        ground: &mut TileLayer<BlockType>,
    ) -> bool {
        let Some(block) = ground.get(x, y).filter(|b| b.is_solid()) else {
            return false;
        };
        if amount <= 0.0 {
            return false;
        }

        let pos = TilePos::new(x, y);
        let max_health = self.health.max_health(block);
        let record = self.records.entry(pos).or_insert(DamageRecord {
            damage: 0.0,
            max_health,
        });
        record.damage += amount;

        if record.damage >= record.max_health {
            debug!(%pos, ?block, "tile destroyed");
            ground.remove(x, y);
            self.clear_tile(x, y);
            return true;
        }

        let tier = DamageTier::from_percent(record.percent());
        self.set_overlay(x, y, tier);
        false
    }

    /// Remove up to `amount` damage. A record that reaches zero is dropped.
    ///
    /// Returns `false` when the tile had no damage.
    pub fn repair_tile(&mut self, x: i32, y: i32, amount: f32) -> bool {
        let pos = TilePos::new(x, y);
        let Some(record) = self.records.get_mut(&pos) else {
            return false;
        };
        record.damage = (record.damage - amount.max(0.0)).max(0.0);
        if record.damage <= 0.0 {
            self.clear_tile(x, y);
        } else {
            let tier = DamageTier::from_percent(record.percent());
            self.set_overlay(x, y, tier);
        }
        true
    }

    /// Damage as a percentage of max health, 0 if undamaged.
    pub fn damage_percent(&self, x: i32, y: i32) -> f32 {
        self.records
            .get(&TilePos::new(x, y))
            .map(DamageRecord::percent)
            .unwrap_or(0.0)
    }

    pub fn is_damaged(&self, x: i32, y: i32) -> bool {
        self.records.contains_key(&TilePos::new(x, y))
    }

    pub fn record(&self, x: i32, y: i32) -> Option<DamageRecord> {
        self.records.get(&TilePos::new(x, y)).copied()
    }

    /// Overlay tier currently drawn at the tile.
    pub fn tier_at(&self, x: i32, y: i32) -> Option<DamageTier> {
        self.overlay.get(x, y)
    }

    /// Forget damage on a single tile.
    pub fn clear_tile(&mut self, x: i32, y: i32) {
        self.records.remove(&TilePos::new(x, y));
        self.overlay.remove(x, y);
    }

    /// Forget damage on every tile of a `width × height` window.
    pub fn clear_region(&mut self, x: i32, y: i32, width: u32, height: u32) {
        let (x1, y1) = (x.saturating_add(width as i32), y.saturating_add(height as i32));
        if x1 <= x || y1 <= y {
            return;
        }
        let doomed: Vec<TilePos> = self
            .records
            .range(TilePos::new(x, y)..TilePos::new(x1, y1))
            .map(|(pos, _)| *pos)
            .filter(|pos| pos.x < x1 && pos.y >= y && pos.y < y1)
            .collect();
        for pos in doomed {
            self.clear_tile(pos.x, pos.y);
        }
    }

    /// Number of tiles carrying damage.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    fn set_overlay(&mut self, x: i32, y: i32, tier: Option<DamageTier>) {
        match tier {
            Some(tier) => {
                self.overlay.put(x, y, tier);
            }
            None => {
                self.overlay.remove(x, y);
            }
        }
    }
}
