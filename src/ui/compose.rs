//! Frame composition: session snapshot → abstract draw commands.
//!
//! Pure: reads the session, never mutates it, owns no game logic.
//! The commands speak in grid cells (fills, grid lines) and logical
//! pixels (text), and are consumed in order by a backend (painter's
//! algorithm, later commands win).
//!
//! Layer order:
//!   1. clear
//!   2. grid lines
//!   3. target             (Playing, Debug)
//!   4. snake              (Playing)
//!   5. UI panel + button  (always; button depends on phase)
//!   6. loss text          (GameOver)
//!   7. win art            (Win, Debug)
//!   8. start overlay      (Start)

use crate::domain::art::{self, RosePart};
use crate::domain::grid::{Cell, CellRect, Grid};
use crate::sim::input::Button;
use crate::sim::world::{Phase, Session};

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Color {
    Black,
    White,
    Red,
    Green,
    Yellow,
    Panel,
    Button,
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum GridLine {
    /// Left edge of column `n` (n == width is the right border).
    Vertical(i32),
    /// Top edge of row `n`.
    Horizontal(i32),
}

#[derive(Clone, PartialEq, Eq, Debug)]
pub enum DrawCommand {
    Clear,
    Line(GridLine),
    FillCell { cell: Cell, color: Color },
    FillRect { rect: CellRect, color: Color },
    /// Text with its top-left corner at logical pixel `(x, y)`.
    Text { x: i32, y: i32, text: String, color: Color },
}

// ── Layout: where the clickable affordances sit ──

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Layout {
    pub cell_size: i32,
    pub panel: CellRect,
    pub pause_button: CellRect,
    pub replay_button: CellRect,
    pub start_panel: CellRect,
    pub start_button: CellRect,
}

const START_PANEL_W: i32 = 16;
const START_PANEL_H: i32 = 7;

impl Layout {
    pub fn new(grid: &Grid) -> Self {
        let panel = grid.panel;
        // Pause/resume and replay share the panel's second row;
        // they are never shown at the same time.
        let button_row = CellRect::new(panel.x, panel.y + 1, panel.w, 1);
        let start_panel = CellRect::new(
            (grid.width - START_PANEL_W) / 2,
            (grid.height - START_PANEL_H) / 2,
            START_PANEL_W,
            START_PANEL_H,
        );
        Layout {
            cell_size: grid.cell_size,
            panel,
            pause_button: button_row,
            replay_button: button_row,
            start_button: CellRect::new(start_panel.x + 5, start_panel.y + 4, 6, 1),
            start_panel,
        }
    }

    /// Which visible button, if any, is under `cell` in this phase.
    pub fn button_at(&self, phase: Phase, cell: Cell) -> Option<Button> {
        match phase {
            Phase::Start if self.start_button.contains(cell) => Some(Button::Start),
            Phase::Playing | Phase::Paused if self.pause_button.contains(cell) => {
                Some(Button::PauseResume)
            }
            Phase::GameOver | Phase::Win if self.replay_button.contains(cell) => {
                Some(Button::Replay)
            }
            _ => None,
        }
    }

    fn px(&self, rect: CellRect, dx_cells: i32, dy_cells: i32) -> (i32, i32) {
        ((rect.x + dx_cells) * self.cell_size, (rect.y + dy_cells) * self.cell_size)
    }
}

// ── Compose ──

pub fn compose<R>(s: &Session<R>, layout: &Layout) -> Vec<DrawCommand> {
    let grid = &s.grid;
    let mut out = vec![DrawCommand::Clear];

    for x in 0..=grid.width {
        out.push(DrawCommand::Line(GridLine::Vertical(x)));
    }
    for y in 0..=grid.height {
        out.push(DrawCommand::Line(GridLine::Horizontal(y)));
    }

    if matches!(s.phase, Phase::Playing | Phase::Debug) {
        fill(&mut out, grid, s.target, Color::Red);
    }

    if s.phase == Phase::Playing {
        for seg in s.snake.segments() {
            fill(&mut out, grid, seg, Color::Green);
        }
    }

    compose_panel(&mut out, s, layout);

    match s.phase {
        Phase::GameOver => {
            let (w, h) = grid.pixel_size();
            text(&mut out, w / 2 - 50, h / 2 - 50, "You Lose", Color::Red);
        }
        Phase::Win | Phase::Debug => compose_win_art(&mut out, s),
        Phase::Start => compose_start(&mut out, s, layout),
        Phase::Playing | Phase::Paused => {}
    }

    out
}

fn compose_panel<R>(out: &mut Vec<DrawCommand>, s: &Session<R>, layout: &Layout) {
    out.push(DrawCommand::FillRect { rect: layout.panel, color: Color::Panel });

    let (x, y) = layout.px(layout.panel, 0, 0);
    let progress = format!("{}/{}", s.collected_count(), s.heart_total());
    text(out, x, y, &progress, Color::White);

    let button = match s.phase {
        Phase::Playing => Some((layout.pause_button, "Pause")),
        Phase::Paused => Some((layout.pause_button, "Resume")),
        Phase::GameOver | Phase::Win => Some((layout.replay_button, "Replay")),
        Phase::Start | Phase::Debug => None,
    };
    if let Some((rect, label)) = button {
        out.push(DrawCommand::FillRect { rect, color: Color::Button });
        let (bx, by) = layout.px(rect, 0, 0);
        text(out, bx, by, label, Color::Yellow);
    }
}

fn compose_win_art<R>(out: &mut Vec<DrawCommand>, s: &Session<R>) {
    let grid = &s.grid;

    for cell in art::banner_cells(grid) {
        fill(out, grid, cell, Color::Red);
    }

    let heart_color = if s.flash_on() { Color::Red } else { Color::Black };
    for &cell in &s.heart {
        fill(out, grid, cell, heart_color);
    }

    for (cell, part) in art::rose_bundle(grid) {
        let color = match part {
            RosePart::Bloom => Color::Red,
            RosePart::Stem => Color::Green,
        };
        fill(out, grid, cell, color);
    }
}

fn compose_start<R>(out: &mut Vec<DrawCommand>, s: &Session<R>, layout: &Layout) {
    let panel = layout.start_panel;
    out.push(DrawCommand::FillRect { rect: panel, color: Color::Panel });

    let lines = [
        (0, "HEART SNAKE".to_string(), Color::Red),
        (1, format!("Collect all {} pixels", s.heart_total()), Color::White),
        (2, format!("Speed: {}   <- / ->", s.speed), Color::Yellow),
        (6, "Enter: start  d: debug".to_string(), Color::White),
    ];
    for (row, line, color) in lines {
        let (x, y) = layout.px(panel, 1, row);
        text(out, x, y, &line, color);
    }

    out.push(DrawCommand::FillRect { rect: layout.start_button, color: Color::Button });
    let (bx, by) = layout.px(layout.start_button, 1, 0);
    text(out, bx, by, "Start", Color::Yellow);
}

/// Fill a cell, dropping anything off the board.
fn fill(out: &mut Vec<DrawCommand>, grid: &Grid, cell: Cell, color: Color) {
    if grid.contains(cell) {
        out.push(DrawCommand::FillCell { cell, color });
    }
}

fn text(out: &mut Vec<DrawCommand>, x: i32, y: i32, s: &str, color: Color) {
    out.push(DrawCommand::Text { x, y, text: s.to_string(), color });
}
