#![warn(missing_docs)]
//! Core primitives shared across the workspace.

pub mod block;
pub mod direction;
pub mod random;

use serde::{Deserialize, Serialize};

// Re-export commonly used types
pub use block::{BlockType, UnknownBlockType};
pub use direction::{Direction, TilePos};
pub use random::SeededRandom;

/// Fixed tick type (20 TPS => 50 ms per tick).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SimTick(pub u64);

impl SimTick {
    /// First tick in any deterministic timeline.
    pub const ZERO: Self = Self(0);

    /// Milliseconds covered by one tick.
    pub const MILLIS: f64 = 50.0;

    /// Advance by `delta` ticks.
    pub fn advance(self, delta: u64) -> Self {
        Self(self.0 + delta)
    }

    /// Elapsed time at the start of this tick, in milliseconds.
    pub fn as_millis(self) -> f64 {
        self.0 as f64 * Self::MILLIS
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tick_advances_and_converts_to_millis() {
        let tick = SimTick::ZERO.advance(3);
        assert_eq!(tick, SimTick(3));
        assert_eq!(tick.as_millis(), 150.0);
    }
}
