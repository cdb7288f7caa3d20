//! Session: the complete state of one play session.
//!
//! Everything the update and render passes need lives here; nothing is
//! global. The random source is a type parameter so tests can inject a
//! seeded generator and assert exact target sequences.
//!
//! ## Lifetime
//!
//! A session is created once at startup and `reset()` on replay. Every
//! field returns to its initial value on reset, except the board geometry,
//! the tuning from config and the random source.

use std::collections::HashSet;

use rand::seq::IteratorRandom;
use rand::Rng;

use crate::config::{GameConfig, SpeedConfig};
use crate::domain::art;
use crate::domain::grid::{Cell, Grid};
use crate::domain::snake::{Direction, Snake, INITIAL_DIRECTION};

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Phase {
    Start,
    Playing,
    Paused,
    GameOver,
    Win,
    /// Shows the win art without winning, for eyeballing the artwork.
    Debug,
}

impl Phase {
    pub fn is_terminal(self) -> bool {
        matches!(self, Phase::GameOver | Phase::Win)
    }
}

pub struct Session<R> {
    // ── Board ──
    pub grid: Grid,
    /// Heart cells in catalog order. Fixed for the session.
    pub heart: Vec<Cell>,

    // ── State machine ──
    pub phase: Phase,

    // ── Snake ──
    pub snake: Snake,
    /// Heading for the next move.
    pub direction: Direction,
    /// Heading of the move last executed. Turns are checked against both,
    /// so two quick key presses between moves cannot fold the head back
    /// onto the neck.
    pub last_moved: Direction,

    // ── Collection ──
    pub collected: HashSet<Cell>,
    pub target: Cell,
    pub allowance: u32,

    // ── Timing ──
    pub speed: u32,
    pub frame_counter: u32,
    pub flash_timer: u32,
    pub timing: SpeedConfig,
    initial_allowance: u32,

    rng: R,
}

// ── Construction ──

impl<R: Rng> Session<R> {
    pub fn new(config: &GameConfig, rng: R) -> Self {
        let grid = Grid::from_config(&config.board);
        let heart = art::heart_cells(&grid);
        let target = heart[0];
        let mut session = Session {
            grid,
            heart,
            phase: Phase::Start,
            snake: Snake::initial(),
            direction: INITIAL_DIRECTION,
            last_moved: INITIAL_DIRECTION,
            collected: HashSet::new(),
            target,
            allowance: config.rules.collision_allowance,
            speed: config.speed.initial,
            frame_counter: 0,
            flash_timer: 0,
            timing: config.speed.clone(),
            initial_allowance: config.rules.collision_allowance,
            rng,
        };
        if let Some(t) = session.pick_target() {
            session.target = t;
        }
        session
    }

    /// Back to a fresh Start screen.
    pub fn reset(&mut self) {
        self.phase = Phase::Start;
        self.snake = Snake::initial();
        self.direction = INITIAL_DIRECTION;
        self.last_moved = INITIAL_DIRECTION;
        self.collected.clear();
        self.allowance = self.initial_allowance;
        self.speed = self.timing.initial;
        self.frame_counter = 0;
        self.flash_timer = 0;
        if let Some(t) = self.pick_target() {
            self.target = t;
        }
    }

    /// Uniformly random heart cell not yet collected.
    /// `None` once the heart is complete.
    pub fn pick_target(&mut self) -> Option<Cell> {
        self.heart
            .iter()
            .filter(|c| !self.collected.contains(*c))
            .copied()
            .choose(&mut self.rng)
    }
}

// ── Queries ──

impl<R> Session<R> {
    /// Frames between two snake moves at the current speed.
    pub fn frames_per_move(&self) -> u32 {
        (self.timing.refresh_rate / self.speed.max(1)).max(1)
    }

    /// Heart flash state: lit for the first half of each interval.
    pub fn flash_on(&self) -> bool {
        self.flash_timer < self.timing.flash_interval_ms / 2
    }

    pub fn collected_count(&self) -> usize {
        self.collected.len()
    }

    pub fn heart_total(&self) -> usize {
        self.heart.len()
    }

    pub fn is_complete(&self) -> bool {
        self.collected.len() == self.heart.len()
    }
}
