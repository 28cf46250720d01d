//! Traits at the boundary between the core and its collaborators.

use crate::models::engine::note::Direction;
use crate::models::stats::Judgement;

/// Trait for creating render-ready snapshots.
///
/// Snapshots are immutable captures of state sent to the presentation side.
pub trait Snapshot {
    /// The snapshot type produced.
    type Output;

    /// Creates an immutable snapshot for rendering.
    fn create_snapshot(&self) -> Self::Output;
}

/// Consumer of damage events (the combatant model).
///
/// Called once per resolved note, once more for a long note's head, and for
/// every hold tick or bonus.
pub trait DamageSink {
    fn apply_note_damage(&mut self, amount: i32, note_kind: &str, judgement: Judgement);
}

/// External gate consulted before a press is accepted.
///
/// A gated press is dropped entirely: no judgement, no damage, no whiff.
pub trait InputGate {
    fn is_gated(&self, direction: Direction) -> bool;
}

/// Gate that lets every press through.
#[derive(Debug, Clone, Copy, Default)]
pub struct OpenGate;

impl InputGate for OpenGate {
    fn is_gated(&self, _direction: Direction) -> bool {
        false
    }
}

/// Any `Fn(Direction) -> bool` works as a gate.
impl<F> InputGate for F
where
    F: Fn(Direction) -> bool,
{
    fn is_gated(&self, direction: Direction) -> bool {
        self(direction)
    }
}
