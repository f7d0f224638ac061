//! Fingerprints and histograms over rectangular terrain regions.

use digsite_core::BlockType;
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;

/// BLAKE3 digest of a block sequence, used to compare generated regions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RegionFingerprint([u8; 32]);

impl RegionFingerprint {
    /// Hash blocks in iteration order.
    pub fn from_blocks(blocks: impl IntoIterator<Item = BlockType>) -> Self {
        let mut hasher = blake3::Hasher::new();
        for block in blocks {
            hasher.update(&(block.index() as i8).to_le_bytes());
        }
        Self(*hasher.finalize().as_bytes())
    }

    /// Hash every tile of a `width × height` window using `block_at`.
    pub fn of_region(
        x: i32,
        y: i32,
        width: u32,
        height: u32,
        block_at: impl Fn(i32, i32) -> BlockType,
    ) -> Self {
        let (w, h) = (width as i32, height as i32);
        Self::from_blocks(
            (y..y + h)
                .flat_map(|ty| (x..x + w).map(move |tx| (tx, ty)))
                .map(|(tx, ty)| block_at(tx, ty)),
        )
    }

    /// Lowercase hex form.
    pub fn to_hex(&self) -> String {
        self.0.iter().map(|b| format!("{b:02x}")).collect()
    }
}

impl fmt::Display for RegionFingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl Serialize for RegionFingerprint {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

/// Count of each block type in a region, keyed by block name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct BlockHistogram {
    counts: BTreeMap<BlockType, usize>,
}

impl BlockHistogram {
    /// Count `blocks`.
    pub fn from_blocks(blocks: impl IntoIterator<Item = BlockType>) -> Self {
        let mut histogram = Self::default();
        for block in blocks {
            histogram.add(block);
        }
        histogram
    }

    /// Record one block.
    pub fn add(&mut self, block: BlockType) {
        *self.counts.entry(block).or_default() += 1;
    }

    /// Occurrences of `block`.
    pub fn count(&self, block: BlockType) -> usize {
        self.counts.get(&block).copied().unwrap_or(0)
    }

    /// Total number of ore tiles.
    pub fn ore_total(&self) -> usize {
        self.counts
            .iter()
            .filter(|(block, _)| block.is_ore())
            .map(|(_, n)| n)
            .sum()
    }

    /// Iterate `(block, count)` in block order.
    pub fn iter(&self) -> impl Iterator<Item = (BlockType, usize)> + '_ {
        self.counts.iter().map(|(b, n)| (*b, *n))
    }
}
