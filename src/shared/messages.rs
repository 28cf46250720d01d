//! Outbound events produced by the core.
//!
//! The session appends to a queue each tick; the presentation layer (or the
//! logic thread, when running threaded) drains it. Nothing here feeds back
//! into core state.

use crate::models::engine::note::{Direction, NoteId, NoteKind};
use crate::models::stats::Judgement;
use crate::state::traits::DamageSink;

/// Which judgement point produced an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JudgePhase {
    /// Press on a non-long note.
    Hit,
    /// Press on a long note's head.
    Head,
    /// Release, or automatic completion, of a hold.
    Tail,
    /// Window expired with no input.
    Timeout,
}

/// Where a damage event comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DamageSource {
    Hit,
    Head,
    Tail,
    /// Periodic tick while a hold is kept down.
    HoldTick,
    /// Progress-scaled bonus paid when a hold ends.
    HoldBonus,
    Timeout,
}

/// One damage event for the combatant model.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DamageEvent {
    pub note: NoteId,
    pub amount: i32,
    pub kind: NoteKind,
    pub judgement: Judgement,
    pub source: DamageSource,
}

#[derive(Debug, Clone, PartialEq)]
pub enum CoreEvent {
    /// A judgement popup: every resolved note, plus long-note heads.
    Judged {
        note: NoteId,
        direction: Direction,
        kind: NoteKind,
        judgement: Judgement,
        phase: JudgePhase,
        /// Hold progress for tails, 0 otherwise.
        progress: f64,
    },
    Damage(DamageEvent),
    /// Press that matched nothing. Not penalised.
    Whiff { direction: Direction, at: f64 },
    ShieldBroken { direction: Direction, at: f64 },
    ShieldRestored { direction: Direction, at: f64 },
    /// A new set of patterns was scheduled.
    SetScheduled {
        start_time: f64,
        end_time: f64,
        notes: usize,
    },
}

impl CoreEvent {
    pub fn as_damage(&self) -> Option<&DamageEvent> {
        match self {
            CoreEvent::Damage(damage) => Some(damage),
            _ => None,
        }
    }
}

/// Forwards every damage event in `events` to `sink`, in order.
pub fn dispatch_damage(events: &[CoreEvent], sink: &mut dyn DamageSink) {
    for damage in events.iter().filter_map(CoreEvent::as_damage) {
        sink.apply_note_damage(damage.amount, damage.kind.label(), damage.judgement);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct Recorder {
        calls: Vec<(i32, String, Judgement)>,
    }

    impl DamageSink for Recorder {
        fn apply_note_damage(&mut self, amount: i32, note_kind: &str, judgement: Judgement) {
            self.calls.push((amount, note_kind.to_string(), judgement));
        }
    }

    #[test]
    fn only_damage_events_reach_the_sink() {
        let events = vec![
            CoreEvent::Whiff {
                direction: Direction::Left,
                at: 0.0,
            },
            CoreEvent::Damage(DamageEvent {
                note: NoteId(1),
                amount: 10,
                kind: NoteKind::Normal,
                judgement: Judgement::Perfect,
                source: DamageSource::Hit,
            }),
            CoreEvent::Damage(DamageEvent {
                note: NoteId(2),
                amount: 0,
                kind: NoteKind::Long,
                judgement: Judgement::Miss,
                source: DamageSource::Timeout,
            }),
        ];

        let mut recorder = Recorder::default();
        dispatch_damage(&events, &mut recorder);
        assert_eq!(
            recorder.calls,
            vec![
                (10, "normal".to_string(), Judgement::Perfect),
                (0, "long".to_string(), Judgement::Miss),
            ]
        );
    }
}
