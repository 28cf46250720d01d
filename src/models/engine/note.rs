//! Note entities: direction, kind and the per-note state machine.

use crate::models::stats::Judgement;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Input direction. Notes use the three lanes, shields all four.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Direction {
    Left,
    Right,
    Up,
    Down,
}

impl Direction {
    pub const ALL: [Direction; 4] = [
        Direction::Left,
        Direction::Right,
        Direction::Up,
        Direction::Down,
    ];

    /// Directions that notes are authored on.
    pub const LANES: [Direction; 3] = [Direction::Left, Direction::Right, Direction::Up];

    /// Dense index, used by per-direction arrays.
    pub fn index(self) -> usize {
        match self {
            Direction::Left => 0,
            Direction::Right => 1,
            Direction::Up => 2,
            Direction::Down => 3,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Direction::Left => "left",
            Direction::Right => "right",
            Direction::Up => "up",
            Direction::Down => "down",
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Direction {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "left" | "l" => Ok(Direction::Left),
            "right" | "r" => Ok(Direction::Right),
            "up" | "u" => Ok(Direction::Up),
            "down" | "d" => Ok(Direction::Down),
            other => Err(format!("unknown direction '{other}'")),
        }
    }
}

/// Kind of playable event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NoteKind {
    /// Single press.
    Normal,
    /// Press and hold from `hit_time` to `hit_time + duration`.
    Long,
    /// Single press with its own damage table.
    Special,
    /// Single press used to block an incoming attack.
    Defense,
}

impl NoteKind {
    /// Name handed to the damage sink.
    pub fn label(self) -> &'static str {
        match self {
            NoteKind::Normal => "normal",
            NoteKind::Long => "long",
            NoteKind::Special => "special",
            NoteKind::Defense => "defense",
        }
    }

    pub fn is_long(self) -> bool {
        self == NoteKind::Long
    }
}

impl fmt::Display for NoteKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for NoteKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "normal" | "tap" => Ok(NoteKind::Normal),
            "long" | "hold" => Ok(NoteKind::Long),
            "special" => Ok(NoteKind::Special),
            "defense" | "defence" => Ok(NoteKind::Defense),
            other => Err(format!("unknown note kind '{other}'")),
        }
    }
}

/// Unique id handed out by the scheduler.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct NoteId(pub u64);

impl fmt::Display for NoteId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Lifecycle of a note.
///
/// `Approaching` and `AwaitingHit` are both matchable; the second only marks
/// that the good window has opened.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum NoteState {
    Approaching,
    AwaitingHit,
    Holding {
        /// Virtual time at which the head was pressed.
        started_at: f64,
        /// Next instant a hold tick is due.
        next_tick_at: f64,
        /// Judgement given to the head.
        head: Judgement,
    },
    Resolved(Judgement),
}

/// A single scheduled note.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Note {
    pub id: NoteId,
    pub direction: Direction,
    pub kind: NoteKind,
    /// Absolute virtual time of the primary judgement point.
    pub hit_time: f64,
    /// Hold length; always 0 for non-long notes.
    pub duration: f64,
    pub state: NoteState,
}

impl Note {
    pub fn new(
        id: NoteId,
        direction: Direction,
        kind: NoteKind,
        hit_time: f64,
        duration: f64,
    ) -> Self {
        let duration = if kind.is_long() { duration.max(0.0) } else { 0.0 };
        Self {
            id,
            direction,
            kind,
            hit_time,
            duration,
            state: NoteState::Approaching,
        }
    }

    /// Creates a normal note.
    pub fn tap(id: NoteId, direction: Direction, hit_time: f64) -> Self {
        Self::new(id, direction, NoteKind::Normal, hit_time, 0.0)
    }

    /// Creates a long note.
    pub fn hold(id: NoteId, direction: Direction, hit_time: f64, duration: f64) -> Self {
        Self::new(id, direction, NoteKind::Long, hit_time, duration)
    }

    /// End of the hold. Same as `hit_time` for non-long notes.
    pub fn hold_end_time(&self) -> f64 {
        self.hit_time + self.duration
    }

    pub fn is_long(&self) -> bool {
        self.kind.is_long()
    }

    pub fn is_resolved(&self) -> bool {
        matches!(self.state, NoteState::Resolved(_))
    }

    pub fn is_holding(&self) -> bool {
        matches!(self.state, NoteState::Holding { .. })
    }

    /// True while a press may still be matched against this note.
    pub fn is_matchable(&self) -> bool {
        matches!(self.state, NoteState::Approaching | NoteState::AwaitingHit)
    }

    /// The final judgement, once resolved.
    pub fn outcome(&self) -> Option<Judgement> {
        match self.state {
            NoteState::Resolved(j) => Some(j),
            _ => None,
        }
    }

    /// Marks the window as open. No-op outside `Approaching`.
    pub fn open_window(&mut self) {
        if self.state == NoteState::Approaching {
            self.state = NoteState::AwaitingHit;
        }
    }

    /// Enters `Holding`. Returns false if the note is not a matchable long
    /// note or the head was a Miss.
    pub fn begin_hold(&mut self, now: f64, tick_interval: f64, head: Judgement) -> bool {
        if !self.is_long() || !self.is_matchable() || !head.is_hit() {
            return false;
        }
        self.state = NoteState::Holding {
            started_at: now,
            next_tick_at: now + tick_interval,
            head,
        };
        true
    }

    /// Resolves the note. Returns false if it was already resolved, in
    /// which case the previous outcome is kept.
    pub fn resolve(&mut self, judgement: Judgement) -> bool {
        if self.is_resolved() {
            return false;
        }
        self.state = NoteState::Resolved(judgement);
        true
    }

    /// Fraction of the hold completed at `now`, in `[0, 1]`.
    pub fn hold_progress(&self, now: f64) -> f64 {
        match self.state {
            NoteState::Holding { started_at, .. } => {
                if self.duration <= 0.0 {
                    1.0
                } else {
                    ((now - started_at) / self.duration).clamp(0.0, 1.0)
                }
            }
            _ => 0.0,
        }
    }

    /// How far along its approach the note is, `0` when it spawns `lead`
    /// seconds ahead and `1` at `hit_time`.
    pub fn approach_progress(&self, now: f64, lead: f64) -> f64 {
        if lead <= 0.0 {
            return 1.0;
        }
        (1.0 - (self.hit_time - now) / lead).clamp(0.0, 1.0)
    }
}
