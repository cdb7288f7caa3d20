//! The step function: advances the session by one display frame.
//!
//! Processing order:
//!   1. Inputs, in arrival order, resolved against the current phase
//!   2. Frame update for the phase that results:
//!        Playing     → frame counter; every `frames_per_move` frames a move
//!        Win / Debug → flash timer
//!        otherwise   → nothing
//!
//! A move is: new head, eat-or-drop-tail, collision check, win check.
//! A fatal collision on the winning move ends the game as a loss.

use rand::Rng;

use crate::domain::collision::{self, Verdict};
use crate::domain::snake::Direction;
use super::event::GameEvent;
use super::input::{Button, Input};
use super::world::{Phase, Session};

// ══════════════════════════════════════════════════════════════
// Main entry point
// ══════════════════════════════════════════════════════════════

pub fn step<R: Rng>(session: &mut Session<R>, inputs: &[Input]) -> Vec<GameEvent> {
    step_with(session, inputs, |_, &input| Some(input))
}

/// Like `step`, but each raw event is turned into an `Input` only when
/// its turn comes, against the phase left by the events before it.
/// A click that lands on a button shown only after an earlier key in
/// the same frame therefore still counts.
pub fn step_with<R, T, F>(session: &mut Session<R>, raw: &[T], mut resolve: F) -> Vec<GameEvent>
where
    R: Rng,
    F: FnMut(Phase, &T) -> Option<Input>,
{
    let mut events = Vec::new();
    for r in raw {
        if let Some(input) = resolve(session.phase, r) {
            apply_input(session, input, &mut events);
        }
    }
    update(session, &mut events);
    events
}

// ══════════════════════════════════════════════════════════════
// Input dispatch (state machine)
// ══════════════════════════════════════════════════════════════

/// Resolve one input against the current phase. Inputs that mean
/// nothing in this phase are dropped silently.
pub fn apply_input<R: Rng>(s: &mut Session<R>, input: Input, events: &mut Vec<GameEvent>) {
    match (s.phase, input) {
        // ── Start ──
        (Phase::Start, Input::Confirm | Input::Click(Button::Start)) => {
            set_phase(s, Phase::Playing, events);
        }
        (Phase::Start, Input::Left) => change_speed(s, -1, events),
        (Phase::Start, Input::Right) => change_speed(s, 1, events),
        (Phase::Start, Input::DebugToggle) => set_phase(s, Phase::Debug, events),

        // ── Debug ──
        (Phase::Debug, Input::DebugToggle) => set_phase(s, Phase::Start, events),

        // ── Playing ──
        (Phase::Playing, Input::Pause | Input::Click(Button::PauseResume)) => {
            set_phase(s, Phase::Paused, events);
        }
        (Phase::Playing, Input::Up) => turn(s, Direction::Up, events),
        (Phase::Playing, Input::Down) => turn(s, Direction::Down, events),
        (Phase::Playing, Input::Left) => turn(s, Direction::Left, events),
        (Phase::Playing, Input::Right) => turn(s, Direction::Right, events),

        // ── Paused ──
        (Phase::Paused, Input::Pause | Input::Click(Button::PauseResume)) => {
            set_phase(s, Phase::Playing, events);
        }

        // ── Game over / Win ──
        (Phase::GameOver | Phase::Win, Input::Replay | Input::Click(Button::Replay)) => {
            replay(s, events);
        }

        _ => {}
    }
}

fn set_phase<R>(s: &mut Session<R>, to: Phase, events: &mut Vec<GameEvent>) {
    if s.phase == to { return; }
    events.push(GameEvent::PhaseChanged { from: s.phase, to });
    s.phase = to;
}

fn change_speed<R>(s: &mut Session<R>, delta: i32, events: &mut Vec<GameEvent>) {
    let next = if delta < 0 {
        s.speed.saturating_sub(delta.unsigned_abs()).max(s.timing.min)
    } else {
        s.speed.saturating_add(delta as u32).min(s.timing.max)
    };
    if next != s.speed {
        s.speed = next;
        events.push(GameEvent::SpeedChanged { speed: next });
    }
}

/// Change heading unless it would reverse the snake onto itself.
fn turn<R>(s: &mut Session<R>, dir: Direction, events: &mut Vec<GameEvent>) {
    if dir == s.direction { return; }
    if dir.is_opposite(s.direction) || dir.is_opposite(s.last_moved) { return; }
    s.direction = dir;
    events.push(GameEvent::Turned { direction: dir });
}

fn replay<R: Rng>(s: &mut Session<R>, events: &mut Vec<GameEvent>) {
    let from = s.phase;
    s.reset();
    events.push(GameEvent::SessionReset);
    events.push(GameEvent::PhaseChanged { from, to: Phase::Start });
    events.push(GameEvent::TargetChosen { cell: s.target });
}

// ══════════════════════════════════════════════════════════════
// Frame update
// ══════════════════════════════════════════════════════════════

fn update<R: Rng>(s: &mut Session<R>, events: &mut Vec<GameEvent>) {
    match s.phase {
        Phase::Playing => {
            s.frame_counter += 1;
            if s.frame_counter >= s.frames_per_move() {
                s.frame_counter = 0;
                move_snake(s, events);
            }
        }
        Phase::Win | Phase::Debug => {
            s.flash_timer += s.timing.frame_ms;
            if s.flash_timer >= s.timing.flash_interval_ms {
                s.flash_timer = 0;
            }
        }
        Phase::Start | Phase::Paused | Phase::GameOver => {}
    }
}

// ══════════════════════════════════════════════════════════════
// Snake move
// ══════════════════════════════════════════════════════════════

/// One logical move. Public so tests and tools can drive moves
/// without counting frames.
pub fn move_snake<R: Rng>(s: &mut Session<R>, events: &mut Vec<GameEvent>) {
    let head = s.snake.push_head(s.direction);
    s.last_moved = s.direction;

    if head == s.target {
        // Eating: the tail stays, net length +1.
        s.collected.insert(head);
        events.push(GameEvent::PixelCollected {
            cell: head,
            collected: s.collected.len(),
            total: s.heart.len(),
        });
        if let Some(next) = s.pick_target() {
            s.target = next;
            events.push(GameEvent::TargetChosen { cell: next });
        }
    } else {
        s.snake.drop_tail();
    }

    match collision::check(&s.grid, &s.snake, &mut s.allowance) {
        Verdict::Clear => {}
        Verdict::Forgiven(kind) => {
            events.push(GameEvent::CollisionForgiven { kind, remaining: s.allowance });
        }
        Verdict::Fatal(kind) => {
            events.push(GameEvent::Crashed { kind, at: head });
            set_phase(s, Phase::GameOver, events);
            return;
        }
    }

    if s.is_complete() {
        set_phase(s, Phase::Win, events);
    }
}

// ══════════════════════════════════════════════════════════════
// Unit tests
// ══════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GameConfig;
    use crate::domain::collision::CollisionKind;
    use crate::domain::grid::Cell;
    use crate::domain::snake::Snake;
    use rand::SeedableRng;
    use rand_chacha::ChaCha12Rng;
    use std::collections::HashSet;

    const RNG_SEED: u64 = 0x0123456789ABCDEF;

    fn session() -> Session<ChaCha12Rng> {
        Session::new(&GameConfig::default(), ChaCha12Rng::seed_from_u64(RNG_SEED))
    }

    fn playing() -> Session<ChaCha12Rng> {
        let mut s = session();
        step(&mut s, &[Input::Confirm]);
        assert_eq!(s.phase, Phase::Playing);
        s
    }

    fn cells(list: &[(i32, i32)]) -> Vec<Cell> {
        list.iter().map(|&c| Cell::from(c)).collect()
    }

    /// Park the target somewhere the snake will not reach.
    fn target_out_of_the_way(s: &mut Session<ChaCha12Rng>) {
        s.target = s.heart[16];
    }

    fn do_move(s: &mut Session<ChaCha12Rng>) -> Vec<GameEvent> {
        let mut events = vec![];
        move_snake(s, &mut events);
        events
    }

    // ── State machine ──

    #[test]
    fn confirm_starts_play() {
        let mut s = session();
        let ev = step(&mut s, &[Input::Confirm]);
        assert_eq!(s.phase, Phase::Playing);
        assert!(ev.contains(&GameEvent::PhaseChanged { from: Phase::Start, to: Phase::Playing }));
    }

    #[test]
    fn start_button_click_starts_play() {
        let mut s = session();
        step(&mut s, &[Input::Click(Button::Start)]);
        assert_eq!(s.phase, Phase::Playing);
    }

    #[test]
    fn raw_events_resolve_against_the_evolving_phase() {
        // `true` stands for a click on the pause button, which only
        // exists while playing or paused.
        let resolve = |phase: Phase, &click: &bool| {
            if !click {
                Some(Input::Confirm)
            } else if matches!(phase, Phase::Playing | Phase::Paused) {
                Some(Input::Click(Button::PauseResume))
            } else {
                None
            }
        };
        let mut s = session();
        let ev = step_with(&mut s, &[false, true], resolve);
        assert_eq!(s.phase, Phase::Paused);
        assert!(ev.contains(&GameEvent::PhaseChanged { from: Phase::Playing, to: Phase::Paused }));

        let mut s = session();
        step_with(&mut s, &[true, false], resolve);
        assert_eq!(s.phase, Phase::Playing);
    }

    #[test]
    fn debug_toggles_only_from_start() {
        let mut s = session();
        step(&mut s, &[Input::DebugToggle]);
        assert_eq!(s.phase, Phase::Debug);
        step(&mut s, &[Input::Confirm, Input::Pause, Input::Left]);
        assert_eq!(s.phase, Phase::Debug);
        step(&mut s, &[Input::DebugToggle]);
        assert_eq!(s.phase, Phase::Start);

        let mut p = playing();
        step(&mut p, &[Input::DebugToggle]);
        assert_eq!(p.phase, Phase::Playing);
    }

    #[test]
    fn pause_and_resume() {
        let mut s = playing();
        step(&mut s, &[Input::Pause]);
        assert_eq!(s.phase, Phase::Paused);
        step(&mut s, &[Input::Click(Button::PauseResume)]);
        assert_eq!(s.phase, Phase::Playing);
        step(&mut s, &[Input::Click(Button::PauseResume)]);
        assert_eq!(s.phase, Phase::Paused);
        step(&mut s, &[Input::Pause]);
        assert_eq!(s.phase, Phase::Playing);
    }

    #[test]
    fn paused_ignores_steering_and_holds_the_snake() {
        let mut s = playing();
        step(&mut s, &[Input::Pause]);
        let before = s.snake.clone();
        for _ in 0..100 {
            step(&mut s, &[Input::Up]);
        }
        assert_eq!(s.snake, before);
        assert_eq!(s.direction, Direction::Right);
    }

    #[test]
    fn replay_is_ignored_outside_terminal_states() {
        let mut s = playing();
        step(&mut s, &[Input::Replay, Input::Click(Button::Replay)]);
        assert_eq!(s.phase, Phase::Playing);
    }

    #[test]
    fn start_and_terminal_states_do_not_move() {
        let mut s = session();
        for _ in 0..200 { step(&mut s, &[]); }
        assert_eq!(s.snake, Snake::initial());

        s.phase = Phase::GameOver;
        for _ in 0..200 { step(&mut s, &[]); }
        assert_eq!(s.snake, Snake::initial());
    }

    // ── Speed ──

    #[test]
    fn speed_floors_at_one() {
        let mut s = session();
        assert_eq!(s.speed, 3);
        for _ in 0..4 {
            step(&mut s, &[Input::Left]);
        }
        assert_eq!(s.speed, 1);
        assert_eq!(s.phase, Phase::Start);
    }

    #[test]
    fn speed_rises_to_the_cap() {
        let mut s = session();
        let ev = step(&mut s, &[Input::Right]);
        assert_eq!(s.speed, 4);
        assert_eq!(ev, vec![GameEvent::SpeedChanged { speed: 4 }]);
        for _ in 0..100 { step(&mut s, &[Input::Right]); }
        assert_eq!(s.speed, 60);
    }

    #[test]
    fn speed_is_locked_outside_start() {
        let mut s = playing();
        step(&mut s, &[Input::Up, Input::Left]);
        assert_eq!(s.speed, 3);
    }

    // ── Direction ──

    #[test]
    fn cannot_reverse() {
        let mut s = playing();
        step(&mut s, &[Input::Left]);
        assert_eq!(s.direction, Direction::Right);
        step(&mut s, &[Input::Up]);
        assert_eq!(s.direction, Direction::Up);
        step(&mut s, &[Input::Down]);
        assert_eq!(s.direction, Direction::Up);
    }

    #[test]
    fn two_quick_turns_cannot_fold_back() {
        let mut s = playing();
        // Heading right; Up then Left before the next move would point
        // the head straight into the neck.
        step(&mut s, &[Input::Up, Input::Left]);
        assert_eq!(s.direction, Direction::Up);
    }

    #[test]
    fn direction_never_becomes_inverse_of_current() {
        let all = [Input::Up, Input::Down, Input::Left, Input::Right];
        let mut s = playing();
        for a in all {
            for b in all {
                let before = s.direction;
                let mut ev = vec![];
                apply_input(&mut s, a, &mut ev);
                assert!(!s.direction.is_opposite(before));
                let mid = s.direction;
                apply_input(&mut s, b, &mut ev);
                assert!(!s.direction.is_opposite(mid));
            }
        }
    }

    // ── Move cadence ──

    #[test]
    fn moves_every_floor_60_over_speed_frames() {
        let mut s = playing();
        target_out_of_the_way(&mut s);
        // Confirm frame already counted one.
        assert_eq!(s.frame_counter, 1);
        for _ in 0..18 { step(&mut s, &[]); }
        assert_eq!(s.snake.head(), Cell::new(5, 5));
        step(&mut s, &[]);
        assert_eq!(s.snake.head(), Cell::new(6, 5));
        assert_eq!(s.frame_counter, 0);
        for _ in 0..20 { step(&mut s, &[]); }
        assert_eq!(s.snake.head(), Cell::new(7, 5));
    }

    #[test]
    fn faster_speed_moves_sooner() {
        let mut s = session();
        step(&mut s, &[Input::Right, Input::Right, Input::Right]); // speed 6
        step(&mut s, &[Input::Confirm]);
        target_out_of_the_way(&mut s);
        for _ in 0..9 { step(&mut s, &[]); }
        assert_eq!(s.snake.head(), Cell::new(6, 5));
    }

    // ── Eating ──

    #[test]
    fn plain_move_keeps_length() {
        let mut s = playing();
        target_out_of_the_way(&mut s);
        let before = s.snake.len();
        do_move(&mut s);
        assert_eq!(s.snake.len(), before);
        assert_eq!(s.snake.segments().collect::<Vec<_>>(), cells(&[(6, 5), (5, 5), (4, 5)]));
    }

    #[test]
    fn eating_grows_by_exactly_one() {
        let mut s = playing();
        s.target = Cell::new(6, 5);
        s.heart[0] = Cell::new(6, 5);
        let before = s.snake.len();
        let ev = do_move(&mut s);
        assert_eq!(s.snake.len(), before + 1);
        assert_eq!(s.snake.segments().last(), Some(Cell::new(3, 5)));
        assert!(s.collected.contains(&Cell::new(6, 5)));
        assert!(matches!(ev[0], GameEvent::PixelCollected { collected: 1, total: 17, .. }));
        assert_ne!(s.target, Cell::new(6, 5));
    }

    #[test]
    fn eaten_targets_are_never_chosen_again() {
        let mut s = playing();
        let mut seen = HashSet::new();
        // Teleport the head next to each target in turn and eat it.
        while s.phase == Phase::Playing {
            let t = s.target;
            assert!(seen.insert(t), "target {:?} chosen twice", t);
            assert!(!s.collected.contains(&t));
            s.snake = Snake::new(&[t.offset(-1, 0), t.offset(-2, 0)]);
            s.direction = Direction::Right;
            s.last_moved = Direction::Right;
            do_move(&mut s);
        }
        assert_eq!(seen.len(), 17);
    }

    #[test]
    fn win_exactly_when_heart_complete() {
        let mut s = playing();
        let mut eaten = 0;
        while s.phase == Phase::Playing {
            assert_eq!(s.collected_count(), eaten);
            assert!(!s.is_complete());
            let t = s.target;
            s.snake = Snake::new(&[t.offset(0, 1)]);
            s.direction = Direction::Up;
            s.last_moved = Direction::Up;
            do_move(&mut s);
            eaten += 1;
        }
        assert_eq!(s.phase, Phase::Win);
        assert_eq!(eaten, 17);
        assert_eq!(s.collected_count(), s.heart_total());
    }

    #[test]
    fn same_seed_same_target_sequence() {
        fn sequence() -> Vec<Cell> {
            let mut s = playing();
            let mut seq = vec![];
            while s.phase == Phase::Playing {
                let t = s.target;
                seq.push(t);
                s.snake = Snake::new(&[t.offset(1, 0)]);
                s.direction = Direction::Left;
                s.last_moved = Direction::Left;
                do_move(&mut s);
            }
            seq
        }
        assert_eq!(sequence(), sequence());
    }

    // ── Collisions ──

    #[test]
    fn wall_forgiven_once_then_game_over() {
        let mut s = playing();
        target_out_of_the_way(&mut s);
        s.snake = Snake::new(&cells(&[(0, 5), (1, 5), (2, 5)]));
        s.direction = Direction::Left;
        s.last_moved = Direction::Left;

        let ev = do_move(&mut s);
        assert_eq!(s.snake.head(), Cell::new(-1, 5));
        assert_eq!(s.phase, Phase::Playing);
        assert_eq!(s.allowance, 0);
        assert!(ev.contains(&GameEvent::CollisionForgiven { kind: CollisionKind::Wall, remaining: 0 }));

        let ev = do_move(&mut s);
        assert_eq!(s.phase, Phase::GameOver);
        assert!(ev.contains(&GameEvent::Crashed { kind: CollisionKind::Wall, at: Cell::new(-2, 5) }));
    }

    #[test]
    fn initial_snake_driven_up_into_the_wall() {
        let mut s = playing();
        target_out_of_the_way(&mut s);
        step(&mut s, &[Input::Up]);
        // rows 4..0 are fine, row -1 is forgiven, row -2 ends it
        for _ in 0..6 { do_move(&mut s); }
        assert_eq!(s.snake.head(), Cell::new(5, -1));
        assert_eq!(s.phase, Phase::Playing);
        do_move(&mut s);
        assert_eq!(s.phase, Phase::GameOver);
    }

    #[test]
    fn self_bite_uses_the_same_allowance() {
        let mut s = playing();
        target_out_of_the_way(&mut s);
        // A hook: moving down from (5,5) lands on (5,6), which is body.
        s.snake = Snake::new(&cells(&[(5, 5), (6, 5), (6, 6), (5, 6), (4, 6)]));
        s.direction = Direction::Down;
        s.last_moved = Direction::Left;
        do_move(&mut s);
        assert_eq!(s.phase, Phase::Playing);
        assert_eq!(s.allowance, 0);

        s.snake = Snake::new(&cells(&[(5, 5), (6, 5), (6, 6), (5, 6), (4, 6)]));
        do_move(&mut s);
        assert_eq!(s.phase, Phase::GameOver);
    }

    #[test]
    fn panel_is_fatal_with_allowance_left() {
        let mut s = playing();
        target_out_of_the_way(&mut s);
        s.snake = Snake::new(&cells(&[(34, 1), (33, 1), (32, 1)]));
        let ev = do_move(&mut s);
        assert_eq!(s.phase, Phase::GameOver);
        assert_eq!(s.allowance, 1);
        assert!(ev.contains(&GameEvent::Crashed { kind: CollisionKind::Panel, at: Cell::new(35, 1) }));
    }

    #[test]
    fn fatal_collision_beats_the_last_pixel() {
        let mut s = playing();
        let last = s.heart[0];
        for &c in s.heart.clone().iter().filter(|&&c| c != last) {
            s.collected.insert(c);
        }
        s.target = last;
        s.allowance = 0;
        // The last pixel lies under the snake's own body.
        s.snake = Snake::new(&[last.offset(0, 1), last.offset(1, 1), last.offset(1, 0), last, last.offset(-1, 0)]);
        s.direction = Direction::Up;
        s.last_moved = Direction::Left;
        do_move(&mut s);
        assert_eq!(s.phase, Phase::GameOver);
    }

    // ── Replay ──

    #[test]
    fn replay_after_game_over_resets_everything() {
        let mut s = playing();
        step(&mut s, &[Input::Up]);
        s.collected.insert(s.heart[3]);
        s.allowance = 0;
        s.speed = 9;
        s.phase = Phase::GameOver;

        let ev = step(&mut s, &[Input::Replay]);
        assert_eq!(s.phase, Phase::Start);
        assert_eq!(s.snake, Snake::initial());
        assert_eq!(s.snake.len(), 3);
        assert_eq!(s.direction, Direction::Right);
        assert!(s.collected.is_empty());
        assert_eq!(s.allowance, 1);
        assert_eq!(s.speed, 3);
        assert_eq!(s.frame_counter, 0);
        assert!(s.heart.contains(&s.target));
        assert!(ev.contains(&GameEvent::SessionReset));
    }

    #[test]
    fn replay_button_works_from_win() {
        let mut s = session();
        s.phase = Phase::Win;
        s.flash_timer = 320;
        step(&mut s, &[Input::Click(Button::Replay)]);
        assert_eq!(s.phase, Phase::Start);
        assert_eq!(s.flash_timer, 0);
    }

    // ── Flash ──

    #[test]
    fn flash_timer_wraps_at_the_interval() {
        let mut s = session();
        // The toggling frame already runs in Debug: 16 ms per frame,
        // wrapping once it reaches 500.
        step(&mut s, &[Input::DebugToggle]);
        assert_eq!(s.flash_timer, 16);
        for _ in 0..29 { step(&mut s, &[]); }
        assert_eq!(s.flash_timer, 480);
        step(&mut s, &[]);
        assert_eq!(s.flash_timer, 496);
        step(&mut s, &[]);
        assert_eq!(s.flash_timer, 0);
        for _ in 0..16 { step(&mut s, &[]); }
        assert!(!s.flash_on());
    }
}
