//! Judgement types and accumulated hit statistics.
//!
//! Judgements are ordered from best to worst so that `a < b` reads as
//! "a is a better outcome than b".

use serde::{Deserialize, Serialize};
use std::fmt;

/// Outcome of a single timing judgement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Judgement {
    /// Inside the perfect window.
    Perfect,
    /// Inside the good window.
    Good,
    /// Outside every window, or never addressed.
    Miss,
}

impl Judgement {
    /// Returns true for Perfect and Good.
    pub fn is_hit(self) -> bool {
        !matches!(self, Judgement::Miss)
    }

    /// Short label used in logs and popups.
    pub fn label(self) -> &'static str {
        match self {
            Judgement::Perfect => "PERFECT",
            Judgement::Good => "GOOD",
            Judgement::Miss => "MISS",
        }
    }
}

impl fmt::Display for Judgement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Accumulated statistics for a session.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct HitStats {
    pub perfect: u32,
    pub good: u32,
    pub miss: u32,
    /// Presses that matched no note. Counted but never penalised.
    pub whiff: u32,
}

impl HitStats {
    pub fn new() -> Self {
        Self::default()
    }

    /// Counts one resolved judgement.
    pub fn record(&mut self, judgement: Judgement) {
        match judgement {
            Judgement::Perfect => self.perfect += 1,
            Judgement::Good => self.good += 1,
            Judgement::Miss => self.miss += 1,
        }
    }

    pub fn record_whiff(&mut self) {
        self.whiff += 1;
    }

    /// Number of judgements recorded (whiffs excluded).
    pub fn judged(&self) -> u32 {
        self.perfect + self.good + self.miss
    }

    /// Calculates accuracy percentage (0-100).
    ///
    /// Perfect weighs 100%, Good 50%, Miss 0%.
    pub fn calculate_accuracy(&self) -> f64 {
        let total = self.judged() as f64;
        if total == 0.0 {
            return 0.0;
        }

        let score = self.perfect as f64 * 2.0 + self.good as f64;
        (score / (total * 2.0)) * 100.0
    }
}
