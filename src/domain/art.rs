//! Pixel-art catalog.
//!
//! Static shapes in local coordinates, placed on the board relative to the
//! heart's offset so everything stays centred whatever the board size.
//! Nothing here is clipped; the renderer drops off-board cells.

use super::grid::{Cell, Grid};

/// Heart outline (8 × 7) plus a one-pixel shine, 17 cells in all.
/// Collecting every one of these wins the game.
pub const HEART_PIXELS: [(i32, i32); 17] = [
    (2, 0), (3, 1), (4, 1), (5, 0),
    (1, 1), (6, 1),
    (0, 2), (7, 2),
    (2, 2),
    (0, 3), (7, 3),
    (1, 4), (6, 4),
    (2, 5), (5, 5),
    (3, 6), (4, 6),
];

/// "CC I" to the left of the heart and "YOU" to the right,
/// relative to the heart offset.
const BANNER_PIXELS: &[(i32, i32)] = &[
    // C
    (-12, 1), (-12, 2), (-12, 3), (-12, 4),
    (-11, 1), (-11, 4),
    (-10, 1), (-10, 4),
    // C
    (-8, 1), (-8, 2), (-8, 3), (-8, 4),
    (-7, 1), (-7, 4),
    (-6, 1), (-6, 4),
    // I
    (-3, 1), (-3, 2), (-3, 3), (-3, 4),
    // Y
    (9, 1), (9, 2),
    (10, 3), (10, 4),
    (11, 2), (11, 1),
    // O
    (13, 1), (13, 2), (13, 3), (13, 4),
    (14, 1), (14, 4),
    (15, 1), (15, 2), (15, 3), (15, 4),
    // U
    (17, 1), (17, 2), (17, 3), (17, 4),
    (18, 4),
    (19, 4), (19, 3), (19, 2), (19, 1),
];

/// A single rose: 3-wide bloom over a 2-cell stem.
const ROSE: [(i32, i32); 10] = [
    (0, 0), (2, 0),
    (0, 1), (1, 1), (2, 1),
    (0, 2), (1, 2), (2, 2),
    (1, 3),
    (1, 4),
];

/// Rows below this are stem, the rest is bloom.
const ROSE_BLOOM_ROWS: i32 = 3;
const ROSE_SPACING: i32 = 5;
const ROSE_COUNT: i32 = 3;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum RosePart {
    Bloom,
    Stem,
}

/// Board position of the heart's local origin.
pub fn heart_offset(grid: &Grid) -> (i32, i32) {
    (grid.width / 2 - 4, grid.height / 2 - 4)
}

pub fn heart_cells(grid: &Grid) -> Vec<Cell> {
    let (ox, oy) = heart_offset(grid);
    HEART_PIXELS.iter().map(|&(x, y)| Cell::new(x + ox, y + oy)).collect()
}

/// Letter cells of the win banner. The heart between the letters
/// is not included; it is drawn separately so it can flash.
pub fn banner_cells(grid: &Grid) -> Vec<Cell> {
    let (ox, oy) = heart_offset(grid);
    BANNER_PIXELS.iter().map(|&(x, y)| Cell::new(x + ox, y + oy)).collect()
}

/// Three roses side by side, centred under the heart.
pub fn rose_bundle(grid: &Grid) -> Vec<(Cell, RosePart)> {
    let ox = grid.width / 2 - 7;
    let oy = heart_offset(grid).1 + 9;
    (0..ROSE_COUNT)
        .flat_map(|i| {
            ROSE.iter().map(move |&(x, y)| {
                let part = if y < ROSE_BLOOM_ROWS { RosePart::Bloom } else { RosePart::Stem };
                (Cell::new(x + i * ROSE_SPACING + ox, y + oy), part)
            })
        })
        .collect()
}
