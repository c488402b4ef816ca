//! Session lifecycle state machine.
//!
//! The app moves through four phases:
//!
//! ```text
//! Onboarding ──key──▶ Loading ──model ready──▶ Running ──pause/overflow──▶ Finished
//!                        │                        ▲                           │
//!                        └──stream failed──▶ exit └────────resume─────────────┘
//! ```
//!
//! [`Phase::apply`] is a pure transition function; all side effects (starting
//! streams, flipping the recording gate, shutting the pipeline down) live in
//! the app layer, keyed off the returned [`Transition`].

// ---------------------------------------------------------------------------
// Phase
// ---------------------------------------------------------------------------

/// The four top-level states of a journaling session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Phase {
    /// Waiting for the user's first key press.
    #[default]
    Onboarding,
    /// Model loading and stream setup in progress.
    Loading,
    /// Live capture, transcription and rendering.
    Running,
    /// Paused or out of layout space; transcript frozen on screen.
    Finished,
}

impl Phase {
    /// Human-readable name, used in logs.
    pub fn label(&self) -> &'static str {
        match self {
            Phase::Onboarding => "onboarding",
            Phase::Loading => "loading",
            Phase::Running => "running",
            Phase::Finished => "finished",
        }
    }
}

// ---------------------------------------------------------------------------
// Events and transitions
// ---------------------------------------------------------------------------

/// Everything that can move the session between phases.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleEvent {
    /// Any key pressed during onboarding.
    KeyPressed,
    /// The transcription model finished loading and the input stream started.
    ModelReadyStreamStarted,
    /// The input stream could not be started.
    StreamStartFailed,
    /// The user pressed the pause button.
    Pause,
    /// The layout ran out of space in both columns.
    Overflow,
    /// The user pressed the resume button.
    Resume,
    /// Window close requested.
    Quit,
}

/// The outcome of applying an event to a phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    /// Event not meaningful in this phase; nothing changes.
    Stay,
    /// Move to the given phase.
    Enter(Phase),
    /// End the application.
    Terminate,
}

impl Phase {
    /// Pure transition function.
    ///
    /// `overflowed` distinguishes a paused session from one that ran out of
    /// layout space: resume is only honoured when the columns still have
    /// room.
    pub fn apply(self, event: LifecycleEvent, overflowed: bool) -> Transition {
        use LifecycleEvent::*;

        if event == Quit {
            return Transition::Terminate;
        }

        match (self, event) {
            (Phase::Onboarding, KeyPressed) => Transition::Enter(Phase::Loading),
            (Phase::Loading, ModelReadyStreamStarted) => Transition::Enter(Phase::Running),
            (Phase::Loading, StreamStartFailed) => Transition::Terminate,
            (Phase::Running, Pause) | (Phase::Running, Overflow) => {
                Transition::Enter(Phase::Finished)
            }
            (Phase::Finished, Resume) if !overflowed => Transition::Enter(Phase::Running),
            _ => Transition::Stay,
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
