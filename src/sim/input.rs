//! Abstract inputs accepted by the state machine.
//!
//! The presentation layer translates device events into these; what each
//! one means depends on the current phase (see `step::apply_input`).

/// On-screen affordances that can be clicked.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Button {
    Start,
    PauseResume,
    Replay,
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Input {
    Confirm,
    Up,
    Down,
    Left,
    Right,
    /// Pause while playing, resume while paused.
    Pause,
    DebugToggle,
    Replay,
    Click(Button),
}
