//! Input routing for GameSession - on_press, on_release

use super::GameSession;
use crate::models::engine::note::{Direction, NoteKind};
use crate::models::stats::Judgement;
use crate::shared::messages::{CoreEvent, DamageEvent, DamageSource, JudgePhase};
use ordered_float::OrderedFloat;

impl GameSession {
    /// Handles a press on `direction`.
    ///
    /// Picks the closest matchable note of that direction whose good window
    /// contains `now` (earliest hit time on ties) and judges it. A press with
    /// no candidate is a whiff: logged and counted, never penalised.
    pub fn on_press(&mut self, direction: Direction) {
        if self.clock.is_paused() {
            log::debug!("INPUT: Press {} ignored while paused", direction);
            return;
        }
        if self.gate.is_gated(direction) {
            log::debug!("INPUT: Press {} gated", direction);
            return;
        }
        if self.held.contains_key(&direction) {
            log::debug!("INPUT: Press {} ignored, already holding", direction);
            return;
        }

        self.shield.set_facing(Some(direction));
        let now = self.clock.now();
        let windows = self.settings.judge;

        // Find the best matching note (immutable borrow)
        let best_idx = self
            .live
            .iter()
            .enumerate()
            .filter(|(_, n)| n.direction == direction && n.is_matchable())
            .filter(|(_, n)| windows.for_press(n.kind).contains(now - n.hit_time))
            .min_by_key(|(_, n)| (OrderedFloat((now - n.hit_time).abs()), OrderedFloat(n.hit_time)))
            .map(|(i, _)| i);

        let Some(idx) = best_idx else {
            log::debug!("INPUT: Whiff on {} at {:.3}s", direction, now);
            self.hit_stats.record_whiff();
            self.events.push(CoreEvent::Whiff { direction, at: now });
            return;
        };

        let kind = self.live[idx].kind;
        let delta = now - self.live[idx].hit_time;
        let judgement = windows.for_press(kind).judge(delta);

        if kind == NoteKind::Long && judgement.is_hit() {
            let tick_interval = self.settings.damage.hold_tick_interval;
            let note = &mut self.live[idx];
            let started = note.begin_hold(now, tick_interval, judgement);
            debug_assert!(started, "matchable long note refused to hold");
            let id = note.id;
            self.held.insert(direction, id);
            log::debug!("INPUT: Hold {} started on {} ({})", id, direction, judgement);
            self.emit_judgement(idx, judgement, JudgePhase::Head, 0.0);
        } else {
            let phase = if kind == NoteKind::Long { JudgePhase::Head } else { JudgePhase::Hit };
            if self.live[idx].resolve(judgement) {
                self.emit_judgement(idx, judgement, phase, 0.0);
            }
        }

        self.remove_resolved();
    }

    /// Handles a release on `direction`. Only meaningful while a long note
    /// is held there; otherwise a no-op.
    pub fn on_release(&mut self, direction: Direction) {
        let Some(id) = self.held.remove(&direction) else {
            return;
        };
        let Some(idx) = self.live.iter().position(|n| n.id == id) else {
            log::error!("INPUT: Held note {} missing from live notes", id);
            return;
        };

        let now = self.clock.now();
        let hold_end = self.live[idx].hold_end_time();

        if now >= hold_end {
            // Released after the end but before the sweep saw it.
            self.finish_hold(idx, Judgement::Perfect, 1.0);
        } else {
            let judgement = self.settings.judge.for_release().judge(now - hold_end);
            let progress = self.live[idx].hold_progress(now);
            log::debug!(
                "INPUT: Hold {} released early on {} ({}, {:.0}%)",
                id,
                direction,
                judgement,
                progress * 100.0
            );
            self.finish_hold(idx, judgement, progress);
        }

        self.remove_resolved();
    }

    /// Resolves a held note's tail and pays out the hold bonus.
    pub(crate) fn finish_hold(&mut self, idx: usize, judgement: Judgement, progress: f64) {
        if !self.live[idx].resolve(judgement) {
            return;
        }
        self.emit_judgement(idx, judgement, JudgePhase::Tail, progress);

        let bonus = self.settings.damage.hold_bonus_for(progress);
        if bonus > 0 {
            let note = &self.live[idx];
            self.events.push(CoreEvent::Damage(DamageEvent {
                note: note.id,
                amount: bonus,
                kind: note.kind,
                judgement,
                source: DamageSource::HoldBonus,
            }));
        }
    }

    /// Emits the popup, damage, shield and stats effects of one judgement on
    /// `self.live[idx]`.
    pub(crate) fn emit_judgement(
        &mut self,
        idx: usize,
        judgement: Judgement,
        phase: JudgePhase,
        progress: f64,
    ) {
        let now = self.clock.now();
        let note = &self.live[idx];
        let (id, direction, kind) = (note.id, note.direction, note.kind);

        let (amount, source) = match phase {
            JudgePhase::Hit => (
                self.settings.damage.for_press(kind).for_judgement(judgement),
                DamageSource::Hit,
            ),
            JudgePhase::Head => (
                self.settings.damage.long_head.for_judgement(judgement),
                DamageSource::Head,
            ),
            JudgePhase::Tail => (
                self.settings.damage.long_tail.for_judgement(judgement),
                DamageSource::Tail,
            ),
            JudgePhase::Timeout => (0, DamageSource::Timeout),
        };

        self.events.push(CoreEvent::Judged {
            note: id,
            direction,
            kind,
            judgement,
            phase,
            progress,
        });
        self.events.push(CoreEvent::Damage(DamageEvent {
            note: id,
            amount,
            kind,
            judgement,
            source,
        }));

        let shield_events = self.shield.apply_result(direction, judgement, now);
        self.push_shield_events(shield_events, now);
        self.apply_judgement(judgement);
    }
}
