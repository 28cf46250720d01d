//! Presentation snapshots for inter-thread communication.
//!
//! Snapshots are immutable captures of session state sent from the logic
//! thread to whoever presents it. This decouples the core from presentation.

use crate::models::engine::note::{Direction, NoteId, NoteKind};
use crate::models::settings::ShieldMode;
use crate::models::stats::{HitStats, Judgement};
use std::time::Instant;

/// A live note as seen by presentation.
#[derive(Clone, Debug, PartialEq)]
pub struct NoteView {
    pub id: NoteId,
    pub direction: Direction,
    pub kind: NoteKind,
    pub hit_time: f64,
    pub duration: f64,
    /// 0 when the note spawns, 1 at its hit time.
    pub approach: f64,
    pub holding: bool,
    /// Hold completion, 0 unless holding.
    pub hold_progress: f64,
}

/// One shield direction.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ShieldView {
    pub direction: Direction,
    /// Durability as a percentage of max.
    pub percent: f64,
    pub disabled: bool,
}

/// Snapshot of a running session.
#[derive(Clone, Debug)]
pub struct GameplaySnapshot {
    /// Virtual time in seconds.
    pub now: f64,
    /// Wall-clock time when the snapshot was created.
    pub timestamp: Instant,
    pub paused: bool,

    /// Live notes, in spawn order.
    pub notes: Vec<NoteView>,
    /// Directions with a long note held down.
    pub holding: Vec<Direction>,
    /// Notes scheduled but not yet live.
    pub pending_notes: usize,

    pub shield_mode: ShieldMode,
    pub shields: [ShieldView; 4],
    pub facing: Option<Direction>,

    pub combo: u32,
    pub max_combo: u32,
    pub accuracy: f64,
    pub hit_stats: HitStats,
    /// Last judgement (for flash display).
    pub last_judgement: Option<Judgement>,
}

impl GameplaySnapshot {
    pub fn shield(&self, direction: Direction) -> &ShieldView {
        &self.shields[direction.index()]
    }

    /// Live notes of one direction.
    pub fn notes_in(&self, direction: Direction) -> impl Iterator<Item = &NoteView> {
        self.notes.iter().filter(move |n| n.direction == direction)
    }
}
