use crate::models::engine::note::Direction;

/// Gameplay and session actions consumed by the logic thread.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameAction {
    // Gameplay
    Press { direction: Direction },
    Release { direction: Direction },
    SetFacing(Option<Direction>),

    // Session
    TogglePause,
    Pause,
    Resume,
    Interrupt,
    ResumeFromInterruption,
    ClearAllNotes,
    Restart,
}

/// Commands sent to the input thread.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputCommand {
    /// Turns autoplay on or off without stopping the thread.
    SetAutoplay(bool),
    Stop,
}
