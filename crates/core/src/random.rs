//! String-seeded deterministic random source.
//!
//! Terrain must regenerate identically whenever a chunk re-enters the load
//! window, so every random draw in world generation goes through a
//! [`SeededRandom`] built from a string seed. The seed string is hashed with
//! BLAKE3 into the 32-byte seed of a ChaCha-based [`StdRng`], which gives the
//! same stream on every platform and decorrelates near-identical seeds.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Reproducible float/integer stream derived from a string seed.
#[derive(Debug, Clone)]
pub struct SeededRandom {
    rng: StdRng,
}

impl SeededRandom {
    /// Create a stream from `seed`.
    pub fn new(seed: &str) -> Self {
        let hash = blake3::hash(seed.as_bytes());
        Self {
            rng: StdRng::from_seed(*hash.as_bytes()),
        }
    }

    /// Next float in `[0, 1)`.
    pub fn float(&mut self) -> f64 {
        self.rng.gen::<f64>()
    }

    /// Next integer in `[min, max_exclusive)`.
    ///
    /// An empty range yields `min` without advancing the stream.
    pub fn range(&mut self, min: i32, max_exclusive: i32) -> i32 {
        if max_exclusive <= min {
            return min;
        }
        self.rng.gen_range(min..max_exclusive)
    }

    /// `true` with probability `p`.
    pub fn chance(&mut self, p: f64) -> bool {
        self.float() < p
    }
}
