//! Grid model: cells, cell rectangles and the board itself.
//!
//! The board is derived from a logical pixel surface (`canvas_width` ×
//! `canvas_height`) cut into square cells of `cell_size` pixels.
//! Coordinates are signed: a forgiven wall hit parks the head one cell
//! outside the board for a tick.

use crate::config::BoardConfig;

/// A grid position. No identity beyond its value.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct Cell {
    pub x: i32,
    pub y: i32,
}

impl Cell {
    pub const fn new(x: i32, y: i32) -> Self {
        Cell { x, y }
    }

    /// Cell shifted by `(dx, dy)`.
    #[inline]
    pub fn offset(self, dx: i32, dy: i32) -> Self {
        Cell { x: self.x + dx, y: self.y + dy }
    }
}

impl From<(i32, i32)> for Cell {
    fn from((x, y): (i32, i32)) -> Self {
        Cell { x, y }
    }
}

/// Axis-aligned rectangle measured in cells.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct CellRect {
    pub x: i32,
    pub y: i32,
    pub w: i32,
    pub h: i32,
}

impl CellRect {
    pub const fn new(x: i32, y: i32, w: i32, h: i32) -> Self {
        CellRect { x, y, w, h }
    }

    pub fn contains(&self, cell: Cell) -> bool {
        cell.x >= self.x && cell.x < self.x + self.w
            && cell.y >= self.y && cell.y < self.y + self.h
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Grid {
    pub width: i32,
    pub height: i32,
    /// Pixels per cell on the logical surface.
    pub cell_size: i32,
    /// Reserved UI panel in the top-right corner. Entering it is fatal.
    pub panel: CellRect,
}

impl Grid {
    pub fn new(width: i32, height: i32, cell_size: i32, panel_w: i32, panel_h: i32) -> Self {
        Grid {
            width,
            height,
            cell_size,
            panel: CellRect::new(width - panel_w, 0, panel_w, panel_h),
        }
    }

    pub fn from_config(board: &BoardConfig) -> Self {
        let cell = board.cell_size as i32;
        Grid::new(
            board.canvas_width as i32 / cell,
            board.canvas_height as i32 / cell,
            cell,
            board.panel_width as i32,
            board.panel_height as i32,
        )
    }

    #[inline]
    pub fn contains(&self, cell: Cell) -> bool {
        cell.x >= 0 && cell.x < self.width && cell.y >= 0 && cell.y < self.height
    }

    #[inline]
    pub fn in_panel(&self, cell: Cell) -> bool {
        self.panel.contains(cell)
    }

    /// Logical surface size in pixels.
    pub fn pixel_size(&self) -> (i32, i32) {
        (self.width * self.cell_size, self.height * self.cell_size)
    }
}
