//! Entry point and game loop.

mod config;
mod domain;
mod sim;
mod ui;

use std::fs::File;
use std::time::{Duration, Instant};

use log::{debug, error, info, warn};
use rand::rngs::StdRng;
use rand::SeedableRng;
use simplelog::WriteLogger;

use config::GameConfig;
use sim::event::GameEvent;
use sim::step;
use sim::world::Session;
use ui::compose::{compose, Layout};
use ui::input::{self as term_input, InputState};
use ui::renderer::Renderer;

const FRAME_SLEEP: Duration = Duration::from_millis(5);

/// Frames the loop will replay at once after a stall (suspend, slow
/// terminal). Anything beyond is dropped and the clock restarts.
const MAX_CATCH_UP: u32 = 5;

// ── Fixed-timestep frame clock ──

/// Schedules frames on a fixed grid of `period` ticks. Lateness of one
/// frame is carried into the next instead of being lost.
struct FrameClock {
    period: Duration,
    next: Instant,
}

impl FrameClock {
    fn new(refresh_rate: u32, now: Instant) -> Self {
        let period = Duration::from_secs(1) / refresh_rate.max(1);
        FrameClock { period, next: now + period }
    }

    /// Number of frames that have come due by `now`.
    fn frames_due(&mut self, now: Instant) -> u32 {
        let mut due = 0;
        while now >= self.next {
            self.next += self.period;
            due += 1;
            if due == MAX_CATCH_UP {
                if now >= self.next {
                    self.next = now + self.period;
                }
                break;
            }
        }
        due
    }
}

fn main() {
    // A broken config file still gets a playable game; the reason is logged
    // once the logger is up.
    let (config, config_err) = match GameConfig::load() {
        Ok(c) => (c, None),
        Err(e) => (GameConfig::default(), Some(e)),
    };

    init_logging(&config);
    if let Some(e) = config_err {
        warn!("{e}; using default settings");
    }

    let rng = match config.general.seed {
        Some(seed) => {
            info!("seeding target selection with {seed}");
            StdRng::seed_from_u64(seed)
        }
        None => StdRng::from_os_rng(),
    };
    let mut session = Session::new(&config, rng);

    let mut renderer = Renderer::new(&session.grid);
    if let Err(e) = renderer.init() {
        eprintln!("Terminal init failed: {e}");
        return;
    }

    let result = game_loop(&mut session, &mut renderer, &config);

    if let Err(e) = renderer.cleanup() {
        eprintln!("Terminal cleanup failed: {e}");
    }

    if let Err(e) = result {
        error!("game loop aborted: {e}");
        eprintln!("Game error: {e}");
    }

    info!(
        "exiting in {:?} with {}/{} pixels",
        session.phase,
        session.collected_count(),
        session.heart_total()
    );
    println!();
    println!("Heart Snake: {}/{} pixels collected.", session.collected_count(), session.heart_total());
}

/// The terminal belongs to the game, so log records go to a file.
fn init_logging(config: &GameConfig) {
    let g = &config.general;
    let file = match File::create(&g.log_file) {
        Ok(f) => f,
        Err(e) => {
            eprintln!("could not create log file {}: {e}", g.log_file.display());
            return;
        }
    };
    if let Err(e) = WriteLogger::init(g.log_level, simplelog::Config::default(), file) {
        eprintln!("logger init failed: {e}");
    }
}

fn game_loop(
    session: &mut Session<StdRng>,
    renderer: &mut Renderer,
    config: &GameConfig,
) -> Result<(), Box<dyn std::error::Error>> {
    let layout = Layout::new(&session.grid);
    let mut input = InputState::new();
    let mut clock = FrameClock::new(config.speed.refresh_rate, Instant::now());

    info!(
        "board {}x{} cells, {} frames/s, speed {}",
        session.grid.width, session.grid.height, config.speed.refresh_rate, session.speed
    );

    loop {
        input.drain_events()?;
        if input.quit_requested() {
            info!("quit requested");
            break;
        }

        for _ in 0..clock.frames_due(Instant::now()) {
            let raw = input.take_pending();
            let events = step::step_with(session, &raw, |phase, &r| term_input::resolve(r, phase, &layout));
            log_events(&events);
        }

        renderer.render(&compose(&*session, &layout))?;
        std::thread::sleep(FRAME_SLEEP);
    }

    Ok(())
}

fn log_events(events: &[GameEvent]) {
    for event in events {
        match event {
            GameEvent::PhaseChanged { from, to } => {
                if to.is_terminal() {
                    info!("round over: {from:?} -> {to:?}");
                } else {
                    info!("phase {from:?} -> {to:?}");
                }
            }
            GameEvent::SpeedChanged { speed } => info!("speed set to {speed}"),
            GameEvent::SessionReset => info!("session reset"),
            GameEvent::Crashed { kind, at } => info!("crashed into {kind:?} at ({}, {})", at.x, at.y),
            GameEvent::CollisionForgiven { kind, remaining } => {
                info!("forgave {kind:?} collision, {remaining} left")
            }
            GameEvent::PixelCollected { cell, collected, total } => {
                debug!("collected ({}, {}) {collected}/{total}", cell.x, cell.y)
            }
            GameEvent::TargetChosen { cell } => debug!("next target ({}, {})", cell.x, cell.y),
            GameEvent::Turned { direction } => debug!("turned {direction:?}"),
        }
    }
}
