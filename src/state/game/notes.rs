//! Note processing - update_notes

use super::GameSession;
use crate::models::engine::note::NoteState;
use crate::models::stats::Judgement;
use crate::shared::messages::{CoreEvent, DamageEvent, DamageSource, JudgePhase};

impl GameSession {
    /// Sweeps live notes: opens windows, times out unplayed notes, pays hold
    /// ticks and completes holds that reached their end.
    pub(crate) fn update_notes(&mut self, now: f64) {
        let windows = self.settings.judge;
        let tick_interval = self.settings.damage.hold_tick_interval;
        let tick_damage = self.settings.damage.hold_tick_damage;
        let ticking = tick_interval > 0.0 && tick_damage > 0;

        // Collect first, apply after (to avoid borrow conflicts)
        let mut timed_out: Vec<usize> = Vec::new();
        let mut completed: Vec<usize> = Vec::new();
        let mut ticks: Vec<DamageEvent> = Vec::new();

        for (idx, note) in self.live.iter_mut().enumerate() {
            let window = windows.for_press(note.kind);

            if note.is_matchable() {
                if now >= note.hit_time - window.good {
                    note.open_window();
                }
                if now > note.hit_time + window.good {
                    timed_out.push(idx);
                }
                continue;
            }

            let (id, kind, end) = (note.id, note.kind, note.hold_end_time());
            if let NoteState::Holding {
                next_tick_at, head, ..
            } = &mut note.state
            {
                if ticking {
                    while *next_tick_at < end && now >= *next_tick_at {
                        ticks.push(DamageEvent {
                            note: id,
                            amount: tick_damage,
                            kind,
                            judgement: *head,
                            source: DamageSource::HoldTick,
                        });
                        *next_tick_at += tick_interval;
                    }
                }
                if now >= end {
                    completed.push(idx);
                }
            }
        }

        self.events.extend(ticks.into_iter().map(CoreEvent::Damage));

        for idx in timed_out {
            if self.live[idx].resolve(Judgement::Miss) {
                log::debug!(
                    "SESSION: {} on {} timed out at {:.3}s",
                    self.live[idx].id,
                    self.live[idx].direction,
                    now
                );
                self.emit_judgement(idx, Judgement::Miss, JudgePhase::Timeout, 0.0);
            }
        }

        for idx in completed {
            self.held.remove(&self.live[idx].direction);
            self.finish_hold(idx, Judgement::Perfect, 1.0);
        }

        self.remove_resolved();
    }
}
