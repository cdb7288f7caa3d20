//! Presentation layer: double-buffered, diff-based terminal renderer.
//!
//! How it works:
//!   1. Paint the frame's draw commands into the `front` buffer
//!   2. Compare each glyph with the `back` buffer (previous frame)
//!   3. Only emit terminal commands for glyphs that changed
//!   4. All commands are batched with `queue!`, flushed once at the end
//!   5. Swap front/back
//!
//! Board cell (gx, gy) occupies terminal columns gx*2 and gx*2+1 of
//! row gy, so the board starts at the terminal origin.

use std::io::{self, BufWriter, Write};

use crossterm::{
    cursor::{self, MoveTo},
    event::{DisableMouseCapture, EnableMouseCapture},
    execute, queue,
    style::{Color as TermColor, Print, ResetColor, SetBackgroundColor, SetForegroundColor},
    terminal::{self, Clear, ClearType},
};

use crate::domain::grid::{Cell, CellRect, Grid};
use super::compose::{Color, DrawCommand, GridLine};

/// Terminal columns per board cell.
pub const CELL_W: usize = 2;

const HELP: &str = " arrows: steer  space: pause  r: replay  d: debug  q: quit";

// ── Glyph: the unit of the back-buffer ──

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
struct Glyph {
    ch: char,
    fg: TermColor,
    bg: TermColor,
}

impl Glyph {
    const BASE_BG: TermColor = TermColor::Rgb { r: 0, g: 0, b: 0 };

    const BLANK: Glyph = Glyph { ch: ' ', fg: TermColor::White, bg: Glyph::BASE_BG };

    /// Sentinel used to invalidate the back buffer.
    /// Different from any real glyph, so every position will be diff'd.
    const INVALID: Glyph = Glyph { ch: '?', fg: TermColor::Magenta, bg: TermColor::Magenta };

    fn solid(bg: TermColor) -> Self {
        Glyph { ch: ' ', fg: TermColor::White, bg }
    }
}

fn term_color(c: Color) -> TermColor {
    match c {
        Color::Black  => TermColor::Rgb { r: 0, g: 0, b: 0 },
        Color::White  => TermColor::Rgb { r: 255, g: 255, b: 255 },
        Color::Red    => TermColor::Rgb { r: 255, g: 0, b: 0 },
        Color::Green  => TermColor::Rgb { r: 0, g: 255, b: 0 },
        Color::Yellow => TermColor::Rgb { r: 255, g: 255, b: 0 },
        Color::Panel  => TermColor::Rgb { r: 51, g: 51, b: 51 },
        Color::Button => TermColor::Rgb { r: 90, g: 90, b: 90 },
    }
}

const GRID_DOT: TermColor = TermColor::Rgb { r: 90, g: 90, b: 90 };

// ── FrameBuffer: a 2D grid of Glyphs ──

struct FrameBuffer {
    width: usize,
    height: usize,
    glyphs: Vec<Glyph>,
}

impl FrameBuffer {
    fn new(w: usize, h: usize) -> Self {
        FrameBuffer { width: w, height: h, glyphs: vec![Glyph::BLANK; w * h] }
    }

    fn resize(&mut self, w: usize, h: usize) {
        if self.width != w || self.height != h {
            self.width = w;
            self.height = h;
            self.glyphs = vec![Glyph::BLANK; w * h];
        }
    }

    fn clear(&mut self) {
        self.glyphs.fill(Glyph::BLANK);
    }

    fn set(&mut self, x: i32, y: i32, glyph: Glyph) {
        if x >= 0 && y >= 0 && (x as usize) < self.width && (y as usize) < self.height {
            self.glyphs[y as usize * self.width + x as usize] = glyph;
        }
    }

    fn get(&self, x: usize, y: usize) -> Glyph {
        if x < self.width && y < self.height {
            self.glyphs[y * self.width + x]
        } else {
            Glyph::BLANK
        }
    }

    /// Write a string at (x, y). Keeps whatever background is already there,
    /// so labels sit on their panels.
    fn put_str(&mut self, x: i32, y: i32, s: &str, fg: TermColor) {
        if y < 0 || y as usize >= self.height { return; }
        for (i, ch) in s.chars().enumerate() {
            let cx = x + i as i32;
            if cx < 0 { continue; }
            if cx as usize >= self.width { break; }
            let bg = self.get(cx as usize, y as usize).bg;
            self.set(cx, y, Glyph { ch, fg, bg });
        }
    }

    fn fill_cell(&mut self, cell: Cell, bg: TermColor) {
        let col = cell.x * CELL_W as i32;
        for dx in 0..CELL_W as i32 {
            self.set(col + dx, cell.y, Glyph::solid(bg));
        }
    }

    fn fill_rect(&mut self, rect: CellRect, bg: TermColor) {
        for y in rect.y..rect.y + rect.h {
            for x in rect.x..rect.x + rect.w {
                self.fill_cell(Cell::new(x, y), bg);
            }
        }
    }
}

/// Board geometry the backend needs to place commands.
#[derive(Clone, Copy, Debug)]
struct Board {
    width: i32,
    height: i32,
    cell_px: i32,
}

/// Paint one frame's commands, in order, into `buf`.
fn paint(buf: &mut FrameBuffer, board: Board, commands: &[DrawCommand]) {
    let dot = Glyph { ch: '·', fg: GRID_DOT, bg: Glyph::BASE_BG };
    for cmd in commands {
        match cmd {
            DrawCommand::Clear => buf.clear(),
            // Interior lines mark cell corners; the far edges draw a border.
            DrawCommand::Line(GridLine::Vertical(x)) => {
                let col = *x * CELL_W as i32;
                for y in 0..board.height {
                    if *x < board.width {
                        buf.set(col, y, dot);
                    } else {
                        buf.set(col, y, Glyph { ch: '│', ..dot });
                    }
                }
            }
            DrawCommand::Line(GridLine::Horizontal(y)) => {
                for x in 0..board.width {
                    let col = x * CELL_W as i32;
                    if *y < board.height {
                        buf.set(col, *y, dot);
                    } else {
                        buf.set(col, *y, Glyph { ch: '─', ..dot });
                        buf.set(col + 1, *y, Glyph { ch: '─', ..dot });
                    }
                }
            }
            DrawCommand::FillCell { cell, color } => buf.fill_cell(*cell, term_color(*color)),
            DrawCommand::FillRect { rect, color } => buf.fill_rect(*rect, term_color(*color)),
            DrawCommand::Text { x, y, text, color } => {
                let col = *x * CELL_W as i32 / board.cell_px;
                let row = *y / board.cell_px;
                buf.put_str(col, row, text, term_color(*color));
            }
        }
    }
    buf.put_str(0, board.height + 1, HELP, TermColor::DarkGrey);
}

// ── Renderer ──

pub struct Renderer {
    writer: BufWriter<io::Stdout>,
    front: FrameBuffer,
    back: FrameBuffer,
    term_w: usize,
    term_h: usize,
    board: Board,
}

impl Renderer {
    pub fn new(grid: &Grid) -> Self {
        Renderer {
            writer: BufWriter::with_capacity(16384, io::stdout()),
            front: FrameBuffer::new(0, 0),
            back: FrameBuffer::new(0, 0),
            term_w: 0,
            term_h: 0,
            board: Board { width: grid.width, height: grid.height, cell_px: grid.cell_size },
        }
    }

    pub fn init(&mut self) -> io::Result<()> {
        terminal::enable_raw_mode()?;
        execute!(
            self.writer,
            terminal::EnterAlternateScreen,
            EnableMouseCapture,
            cursor::Hide,
            SetBackgroundColor(Glyph::BASE_BG),
            Clear(ClearType::All)
        )?;

        let (tw, th) = terminal::size().unwrap_or((80, 24));
        self.term_w = tw as usize;
        self.term_h = th as usize;
        self.front.resize(self.term_w, self.term_h);
        self.back.resize(self.term_w, self.term_h);
        // Force full repaint on first frame: back ≠ front for every glyph.
        self.back.glyphs.fill(Glyph::INVALID);

        Ok(())
    }

    pub fn cleanup(&mut self) -> io::Result<()> {
        execute!(
            self.writer,
            ResetColor,
            DisableMouseCapture,
            cursor::Show,
            terminal::LeaveAlternateScreen
        )?;
        terminal::disable_raw_mode()
    }

    pub fn render(&mut self, commands: &[DrawCommand]) -> io::Result<()> {
        // Detect terminal resize
        let (tw, th) = terminal::size().unwrap_or((80, 24));
        if tw as usize != self.term_w || th as usize != self.term_h {
            self.term_w = tw as usize;
            self.term_h = th as usize;
            self.front.resize(self.term_w, self.term_h);
            self.back.resize(self.term_w, self.term_h);
            self.back.glyphs.fill(Glyph::INVALID);
            queue!(self.writer, SetBackgroundColor(Glyph::BASE_BG), Clear(ClearType::All))?;
        }

        paint(&mut self.front, self.board, commands);
        self.flush_diff()?;
        std::mem::swap(&mut self.front, &mut self.back);

        Ok(())
    }

    // ── Diff flush: only write changed glyphs ──

    fn flush_diff(&mut self) -> io::Result<()> {
        let mut last_fg = TermColor::White;
        let mut last_bg = Glyph::BASE_BG;
        let mut cursor_at: Option<(usize, usize)> = None;

        queue!(self.writer, SetForegroundColor(last_fg), SetBackgroundColor(last_bg))?;

        for y in 0..self.front.height {
            for x in 0..self.front.width {
                let glyph = self.front.get(x, y);
                if glyph == self.back.get(x, y) {
                    continue;
                }

                if cursor_at != Some((x, y)) {
                    queue!(self.writer, MoveTo(x as u16, y as u16))?;
                }
                if glyph.fg != last_fg {
                    queue!(self.writer, SetForegroundColor(glyph.fg))?;
                    last_fg = glyph.fg;
                }
                if glyph.bg != last_bg {
                    queue!(self.writer, SetBackgroundColor(glyph.bg))?;
                    last_bg = glyph.bg;
                }

                queue!(self.writer, Print(glyph.ch))?;
                cursor_at = Some((x + 1, y));
            }
        }

        self.writer.flush()
    }
}
