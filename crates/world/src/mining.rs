//! Mining cursor driven by a player's dig/left/right input.
//!
//! The cursor starts on the tile under the player's feet and may move one
//! column to either side of it. Moving sideways climbs onto a solid
//! diagonal neighbor (as seen in the selection snapshot) and drops back
//! down to the entry row when already raised.

use crate::selection::PlayerSelectedTile;
use crate::world::World;
use digsite_core::{Direction, TilePos};

/// One frame of mining input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MiningInput {
    Dig,
    Left,
    Right,
}

/// Result of feeding one input to a [`MiningCursor`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MiningOutcome {
    /// The tile took damage and survived.
    Hit,
    /// Digging is over; the player can leave the mining state.
    Finished,
    /// The cursor moved and reselected (or lost) a tile.
    Moved(Option<PlayerSelectedTile>),
    /// The cursor is already at the edge of its reach.
    Blocked,
}

/// Per-player mining state.
#[derive(Debug, Clone, PartialEq)]
pub struct MiningCursor {
    player: String,
    origin: TilePos,
    position: TilePos,
    selected: Option<PlayerSelectedTile>,
}

impl MiningCursor {
    /// Start mining below `(feet_x, feet_y)` in world pixels.
    ///
    /// `None` when there is no tile there to select.
    pub fn enter(world: &mut World, player: &str, feet_x: f32, feet_y: f32) -> Option<Self> {
        let origin = world.get_tile_position(feet_x, feet_y)?.pos();
        let selected = world.select_tile(origin.x, origin.y, player)?;
        Some(Self {
            player: player.to_string(),
            origin,
            position: origin,
            selected: Some(selected),
        })
    }

    pub fn player(&self) -> &str {
        &self.player
    }

    pub fn origin(&self) -> TilePos {
        self.origin
    }

    pub fn position(&self) -> TilePos {
        self.position
    }

    pub fn selected(&self) -> Option<&PlayerSelectedTile> {
        self.selected.as_ref()
    }

    /// Apply one input with the given tool `strength`.
    pub fn step(&mut self, world: &mut World, input: MiningInput, strength: f32) -> MiningOutcome {
        match input {
            MiningInput::Dig => {
                if world.dig_tile(&self.player, strength, false) {
                    self.selected = None;
                    MiningOutcome::Finished
                } else {
                    MiningOutcome::Hit
                }
            }
            MiningInput::Left if self.position.x >= self.origin.x => {
                self.shift(world, Direction::Left, Direction::UpLeft)
            }
            MiningInput::Right if self.position.x <= self.origin.x => {
                self.shift(world, Direction::Right, Direction::UpRight)
            }
            MiningInput::Left | MiningInput::Right => MiningOutcome::Blocked,
        }
    }

    fn shift(&mut self, world: &mut World, side: Direction, climb: Direction) -> MiningOutcome {
        self.position = self.position.offset(side);
        if self.position.y == self.origin.y - 1 {
            self.position.y += 1;
        } else if self
            .selected
            .and_then(|s| s.adjacencies)
            .is_some_and(|adj| adj.is_solid(climb))
        {
            self.position.y -= 1;
        }
        self.selected = world.select_tile(self.position.x, self.position.y, &self.player);
        MiningOutcome::Moved(self.selected)
    }
}
