//! Snake entity and heading.

use std::collections::VecDeque;

use super::grid::Cell;

/// Initial body, head first.
pub const INITIAL_BODY: [Cell; 3] = [Cell::new(5, 5), Cell::new(4, 5), Cell::new(3, 5)];
pub const INITIAL_DIRECTION: Direction = Direction::Right;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

impl Direction {
    /// Unit vector in grid space (y grows downward).
    pub fn delta(self) -> (i32, i32) {
        match self {
            Direction::Up    => (0, -1),
            Direction::Down  => (0, 1),
            Direction::Left  => (-1, 0),
            Direction::Right => (1, 0),
        }
    }

    pub fn opposite(self) -> Self {
        match self {
            Direction::Up    => Direction::Down,
            Direction::Down  => Direction::Up,
            Direction::Left  => Direction::Right,
            Direction::Right => Direction::Left,
        }
    }

    pub fn is_opposite(self, other: Direction) -> bool {
        self.opposite() == other
    }
}

/// Ordered body segments. Index 0 is the head.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Snake {
    body: VecDeque<Cell>,
}

impl Snake {
    pub fn new(cells: &[Cell]) -> Self {
        Snake { body: cells.iter().copied().collect() }
    }

    pub fn initial() -> Self {
        Snake::new(&INITIAL_BODY)
    }

    pub fn head(&self) -> Cell {
        // The body is never empty: constructed non-empty, and every
        // tail removal follows a head insertion.
        self.body[0]
    }

    pub fn len(&self) -> usize {
        self.body.len()
    }

    pub fn segments(&self) -> impl Iterator<Item = Cell> + '_ {
        self.body.iter().copied()
    }

    /// Does any segment other than the head occupy `cell`?
    pub fn body_contains(&self, cell: Cell) -> bool {
        self.body.iter().skip(1).any(|&c| c == cell)
    }

    /// Prepend a new head one step along `dir`. Returns the new head.
    /// The tail is left in place; call `drop_tail` when not growing.
    pub fn push_head(&mut self, dir: Direction) -> Cell {
        let (dx, dy) = dir.delta();
        let new_head = self.head().offset(dx, dy);
        self.body.push_front(new_head);
        new_head
    }

    pub fn drop_tail(&mut self) -> Option<Cell> {
        if self.body.len() > 1 {
            self.body.pop_back()
        } else {
            None
        }
    }
}
