//! Events emitted during a simulation step.
//! The driver consumes these for logging.

use crate::domain::collision::CollisionKind;
use crate::domain::grid::Cell;
use crate::domain::snake::Direction;
use super::world::Phase;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum GameEvent {
    PhaseChanged { from: Phase, to: Phase },
    SpeedChanged { speed: u32 },
    Turned { direction: Direction },
    PixelCollected { cell: Cell, collected: usize, total: usize },
    TargetChosen { cell: Cell },
    CollisionForgiven { kind: CollisionKind, remaining: u32 },
    Crashed { kind: CollisionKind, at: Cell },
    SessionReset,
}
