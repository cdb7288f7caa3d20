//! Terminal input collector.
//!
//! Drains crossterm key and mouse events without blocking and queues them
//! until the next frame takes them. Keys map to abstract `Input`s
//! directly; mouse clicks are hit-tested against the on-screen buttons
//! of the phase in force when the click is applied, which may differ
//! from the phase at the start of the frame.
//!
//! Quit keys (`q`, `Esc`, `Ctrl+C`) never reach the game: they only
//! raise the quit flag.

use std::io;
use std::time::Duration;

use crossterm::event::{
    self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers, MouseButton, MouseEventKind, poll,
};

use crate::domain::grid::Cell;
use crate::sim::input::Input;
use crate::sim::world::Phase;
use super::compose::Layout;
use super::renderer::CELL_W;

/// A device event waiting for the next frame.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum RawInput {
    Key(KeyCode),
    /// Left click at terminal (column, row).
    Click(u16, u16),
}

pub struct InputState {
    pending: Vec<RawInput>,
    quit: bool,
}

impl InputState {
    pub fn new() -> Self {
        InputState {
            pending: Vec::with_capacity(8),
            quit: false,
        }
    }

    /// Read all available terminal events without blocking.
    /// Call as often as you like; events accumulate until `take_pending`.
    pub fn drain_events(&mut self) -> io::Result<()> {
        while poll(Duration::ZERO)? {
            match event::read()? {
                Event::Key(key) => self.on_key(key),
                Event::Mouse(m) => {
                    if m.kind == MouseEventKind::Down(MouseButton::Left) {
                        self.pending.push(RawInput::Click(m.column, m.row));
                    }
                }
                _ => {}
            }
        }
        Ok(())
    }

    pub fn quit_requested(&self) -> bool {
        self.quit
    }

    /// Hand the queued events over in arrival order.
    pub fn take_pending(&mut self) -> Vec<RawInput> {
        std::mem::take(&mut self.pending)
    }

    fn on_key(&mut self, key: KeyEvent) {
        if key.kind == KeyEventKind::Release {
            return;
        }
        if is_quit(&key) {
            self.quit = true;
            return;
        }
        self.pending.push(RawInput::Key(key.code));
    }
}

fn is_quit(key: &KeyEvent) -> bool {
    match key.code {
        KeyCode::Esc | KeyCode::Char('q') | KeyCode::Char('Q') => true,
        KeyCode::Char('c') | KeyCode::Char('C') => key.modifiers.contains(KeyModifiers::CONTROL),
        _ => false,
    }
}

// ── Key mapping ──

pub fn map_key(code: KeyCode) -> Option<Input> {
    match code {
        KeyCode::Enter => Some(Input::Confirm),
        KeyCode::Up => Some(Input::Up),
        KeyCode::Down => Some(Input::Down),
        KeyCode::Left => Some(Input::Left),
        KeyCode::Right => Some(Input::Right),
        KeyCode::Char(' ') => Some(Input::Pause),
        KeyCode::Char('d') | KeyCode::Char('D') => Some(Input::DebugToggle),
        KeyCode::Char('r') | KeyCode::Char('R') => Some(Input::Replay),
        _ => None,
    }
}

/// Board cell under a terminal position. The board starts at the
/// terminal origin; every cell is `CELL_W` columns wide.
pub fn cell_at(column: u16, row: u16) -> Cell {
    Cell::new(column as i32 / CELL_W as i32, row as i32)
}

/// Resolve one queued event against the phase it will be applied in.
pub fn resolve(raw: RawInput, phase: Phase, layout: &Layout) -> Option<Input> {
    match raw {
        RawInput::Key(code) => map_key(code),
        RawInput::Click(col, row) => layout.button_at(phase, cell_at(col, row)).map(Input::Click),
    }
}
