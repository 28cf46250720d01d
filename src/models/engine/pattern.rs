//! Static, relative-time note patterns.

use super::note::{Direction, NoteKind};
use serde::{Deserialize, Serialize};

/// Default floor applied to pattern durations, in seconds.
pub const DEFAULT_MIN_PATTERN_DURATION: f64 = 2.0;

/// One note inside a pattern, timed relative to the pattern start.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PatternNote {
    pub relative_time: f64,
    pub direction: Direction,
    pub kind: NoteKind,
    /// Hold length, 0 for non-long notes.
    pub duration: f64,
}

impl PatternNote {
    pub fn new(relative_time: f64, direction: Direction, kind: NoteKind, duration: f64) -> Self {
        let duration = if kind.is_long() { duration } else { 0.0 };
        Self {
            relative_time,
            direction,
            kind,
            duration,
        }
    }

    pub fn tap(relative_time: f64, direction: Direction) -> Self {
        Self::new(relative_time, direction, NoteKind::Normal, 0.0)
    }

    pub fn hold(relative_time: f64, direction: Direction, duration: f64) -> Self {
        Self::new(relative_time, direction, NoteKind::Long, duration)
    }

    /// Relative instant at which this note stops occupying the timeline.
    pub fn end(&self) -> f64 {
        self.relative_time + self.duration
    }
}

/// Immutable template of notes. Never mutated at runtime.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PatternDescriptor {
    pub name: String,
    notes: Vec<PatternNote>,
    /// Explicit length overriding the derived one.
    length: Option<f64>,
}

impl PatternDescriptor {
    /// Builds a descriptor; notes are stored ordered by relative time.
    pub fn new(name: impl Into<String>, mut notes: Vec<PatternNote>) -> Self {
        notes.sort_by(|a, b| a.relative_time.total_cmp(&b.relative_time));
        Self {
            name: name.into(),
            notes,
            length: None,
        }
    }

    /// Sets an explicit length. Non-finite or non-positive values are ignored.
    pub fn with_length(mut self, length: f64) -> Self {
        if length.is_finite() && length > 0.0 {
            self.length = Some(length);
        }
        self
    }

    pub fn notes(&self) -> &[PatternNote] {
        &self.notes
    }

    pub fn is_empty(&self) -> bool {
        self.notes.is_empty()
    }

    /// Relative instant at which the last note ends.
    pub fn notes_end(&self) -> f64 {
        self.notes.iter().map(PatternNote::end).fold(0.0, f64::max)
    }

    /// Length of the pattern: the latest note end, stretched by an explicit
    /// length if one is set, never below `floor`. A declared length never
    /// cuts the pattern short.
    pub fn total_duration(&self, floor: f64) -> f64 {
        let derived = self.notes_end();
        self.length.map_or(derived, |l| l.max(derived)).max(floor)
    }
}
