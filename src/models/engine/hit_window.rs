//! Definitions and constructors for hit window timing thresholds.

use crate::models::engine::note::NoteKind;
use crate::models::stats::Judgement;
use serde::{Deserialize, Serialize};

/// A symmetric pair of tolerances around a target instant, in seconds.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HitWindow {
    pub perfect: f64,
    pub good: f64,
}

impl HitWindow {
    pub const fn new(perfect: f64, good: f64) -> Self {
        Self { perfect, good }
    }

    /// Standard windows for ordinary hits and long-note tails.
    pub const fn standard() -> Self {
        Self::new(0.05, 0.10)
    }

    /// Narrower windows for the head of a long note.
    pub const fn long_head() -> Self {
        Self::new(0.04, 0.08)
    }

    /// Judges a signed offset (`target - input` or `input - target`; only
    /// the magnitude matters).
    pub fn judge(&self, time_delta: f64) -> Judgement {
        let abs_diff = time_delta.abs();

        if abs_diff <= self.perfect {
            Judgement::Perfect
        } else if abs_diff <= self.good {
            Judgement::Good
        } else {
            // Also reached for NaN.
            Judgement::Miss
        }
    }

    /// True if `time_delta` falls inside the good window.
    pub fn contains(&self, time_delta: f64) -> bool {
        time_delta.abs() <= self.good
    }
}

impl Default for HitWindow {
    fn default() -> Self {
        Self::standard()
    }
}

/// Pure judgement function over a window pair.
pub fn judge(time_delta: f64, windows: &HitWindow) -> Judgement {
    windows.judge(time_delta)
}

/// The three window parameterizations used by the router.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct JudgeWindows {
    /// Ordinary hits (Normal, Special, Defense) against `hit_time`.
    pub normal: HitWindow,
    /// Long-note head against `hit_time`.
    pub long_head: HitWindow,
    /// Long-note tail against `hold_end_time`.
    pub long_tail: HitWindow,
}

impl JudgeWindows {
    /// Window applied when a note of `kind` is pressed.
    pub fn for_press(&self, kind: NoteKind) -> &HitWindow {
        if kind == NoteKind::Long {
            &self.long_head
        } else {
            &self.normal
        }
    }

    /// Window applied when a hold is released.
    pub fn for_release(&self) -> &HitWindow {
        &self.long_tail
    }
}

impl Default for JudgeWindows {
    fn default() -> Self {
        Self {
            normal: HitWindow::standard(),
            long_head: HitWindow::long_head(),
            long_tail: HitWindow::standard(),
        }
    }
}
