//! Collision detector.
//!
//! Checks run against the post-move head, in this order:
//!
//! | Check                     | Allowance > 0        | Allowance = 0 |
//! |---------------------------|----------------------|---------------|
//! | head outside the board    | forgiven, allowance−1 | fatal        |
//! | head on a body segment    | forgiven, allowance−1 | fatal        |
//! | head inside the UI panel  | fatal                | fatal         |
//! | otherwise                 | clear                | clear         |

use super::grid::Grid;
use super::snake::Snake;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum CollisionKind {
    Wall,
    Body,
    Panel,
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Verdict {
    Clear,
    /// Collision absorbed by the allowance.
    Forgiven(CollisionKind),
    Fatal(CollisionKind),
}

/// Judge the snake's current head. Consumes one unit of `allowance`
/// when a wall or body hit is forgiven.
pub fn check(grid: &Grid, snake: &Snake, allowance: &mut u32) -> Verdict {
    let head = snake.head();

    let kind = if !grid.contains(head) {
        Some(CollisionKind::Wall)
    } else if snake.body_contains(head) {
        Some(CollisionKind::Body)
    } else {
        None
    };

    if let Some(kind) = kind {
        return if *allowance > 0 {
            *allowance -= 1;
            Verdict::Forgiven(kind)
        } else {
            Verdict::Fatal(kind)
        };
    }

    if grid.in_panel(head) {
        return Verdict::Fatal(CollisionKind::Panel);
    }

    Verdict::Clear
}
