//! Core rhythm-battle session.
//!
//! The `GameSession` owns every piece of mutable rhythm state and advances it
//! in a fixed order once per tick:
//! 1. Advance the virtual clock (and the shield timers that read it)
//! 2. Release scheduled notes that came within look-ahead
//! 3. Process input queued since the last tick
//! 4. Sweep for timeouts, hold ticks and hold completions
//! 5. Extend the schedule if the current set is running out

mod input;
mod notes;
mod snapshot;

pub mod scheduler;
pub mod shield;

use crate::input::events::GameAction;
use crate::logic::clock::VirtualClock;
use crate::models::engine::note::{Direction, Note, NoteId};
use crate::models::engine::pattern::PatternDescriptor;
use crate::models::settings::GameSettings;
use crate::models::stats::{HitStats, Judgement};
use crate::shared::messages::CoreEvent;
use crate::state::traits::{InputGate, OpenGate};
use scheduler::{PatternScheduler, ScheduledSet};
use shield::{DirectionalResourcePool, ShieldEvent};
use std::collections::{HashMap, VecDeque};

pub use scheduler::maybe_extend;

/// Main rhythm engine handling note timing, judgement, shields and schedule.
pub struct GameSession {
    pub(crate) settings: GameSettings,
    pub(crate) clock: VirtualClock,
    pub(crate) scheduler: PatternScheduler,
    /// Live notes, in spawn order.
    pub(crate) live: Vec<Note>,
    /// At most one held long note per direction.
    pub(crate) held: HashMap<Direction, NoteId>,
    pub(crate) shield: DirectionalResourcePool,
    gate: Box<dyn InputGate + Send>,

    pub(crate) hit_stats: HitStats,
    pub(crate) combo: u32,
    pub(crate) max_combo: u32,
    pub(crate) last_judgement: Option<Judgement>,

    /// Inputs buffered until the next tick.
    input_queue: VecDeque<GameAction>,
    /// Outbound events, drained by the presentation layer.
    pub(crate) events: Vec<CoreEvent>,
    started: bool,
    /// Set by `interrupt`, consumed by `resume_from_interruption`.
    interrupted: bool,
}

impl GameSession {
    /// Creates a session over a fixed pattern source.
    pub fn new(settings: GameSettings, patterns: Vec<PatternDescriptor>) -> Self {
        let scheduler = PatternScheduler::new(settings.scheduler.clone(), patterns);
        let shield = DirectionalResourcePool::new(settings.shield);

        Self {
            settings,
            clock: VirtualClock::new(),
            scheduler,
            live: Vec::new(),
            held: HashMap::new(),
            shield,
            gate: Box::new(OpenGate),
            hit_stats: HitStats::new(),
            combo: 0,
            max_combo: 0,
            last_judgement: None,
            input_queue: VecDeque::new(),
            events: Vec::new(),
            started: false,
            interrupted: false,
        }
    }

    /// Replaces the input gate consulted before each press.
    pub fn with_gate(mut self, gate: impl InputGate + Send + 'static) -> Self {
        self.gate = Box::new(gate);
        self
    }

    pub fn set_gate(&mut self, gate: Box<dyn InputGate + Send>) {
        self.gate = gate;
    }

    pub fn settings(&self) -> &GameSettings {
        &self.settings
    }

    pub fn clock(&self) -> &VirtualClock {
        &self.clock
    }

    pub fn now(&self) -> f64 {
        self.clock.now()
    }

    pub fn is_started(&self) -> bool {
        self.started
    }

    pub fn is_interrupted(&self) -> bool {
        self.interrupted
    }

    pub fn live_notes(&self) -> &[Note] {
        &self.live
    }

    pub fn held_note(&self, direction: Direction) -> Option<&Note> {
        let id = self.held.get(&direction)?;
        self.live.iter().find(|n| n.id == *id)
    }

    pub fn scheduler(&self) -> &PatternScheduler {
        &self.scheduler
    }

    pub fn shield(&self) -> &DirectionalResourcePool {
        &self.shield
    }

    pub fn hit_stats(&self) -> &HitStats {
        &self.hit_stats
    }

    pub fn combo(&self) -> u32 {
        self.combo
    }

    pub fn max_combo(&self) -> u32 {
        self.max_combo
    }

    /// Starts the schedule with the first set at `start_time`.
    pub fn start_game(&mut self, start_time: f64) {
        self.started = true;
        log::info!("SESSION: Starting at {:.3}s", start_time);
        if let Some(set) = self.scheduler.start(start_time) {
            self.push_set_event(&set);
        }
    }

    /// Queues an externally built set.
    pub fn add_notes(&mut self, set: &ScheduledSet) {
        self.scheduler.add_set(set);
        self.push_set_event(set);
    }

    /// Drops every live, held and pending note and stops schedule
    /// monitoring, all at once.
    pub fn clear_all_notes(&mut self) {
        log::info!(
            "SESSION: Clearing {} live notes, {} held",
            self.live.len(),
            self.held.len()
        );
        self.live.clear();
        self.held.clear();
        self.scheduler.clear();
    }

    pub fn pause(&mut self) {
        self.clock.pause();
    }

    pub fn resume(&mut self) {
        self.clock.resume();
    }

    /// Suspends the rhythm phase: notes are cleared and the clock frozen.
    pub fn interrupt(&mut self) {
        self.clear_all_notes();
        self.clock.pause();
        self.interrupted = true;
    }

    /// Resumes after [`interrupt`](Self::interrupt), restarting the schedule
    /// at `now + resume_buffer`. Does nothing unless interrupted.
    pub fn resume_from_interruption(&mut self) {
        if !self.interrupted {
            log::debug!("SESSION: Resume from interruption ignored, not interrupted");
            return;
        }
        self.interrupted = false;
        self.clock.resume();
        if let Some(set) = self.scheduler.resume_from_interruption(self.clock.now()) {
            self.push_set_event(&set);
        }
    }

    /// Back to the zero state for a fresh session.
    pub fn reset_for_restart(&mut self) {
        log::info!("SESSION: Reset for restart");
        self.clear_all_notes();
        self.clock.reset();
        self.scheduler.reset();
        self.shield.reset();
        self.hit_stats = HitStats::new();
        self.combo = 0;
        self.max_combo = 0;
        self.last_judgement = None;
        self.input_queue.clear();
        self.events.clear();
        self.started = false;
        self.interrupted = false;
    }

    /// Sets the shield direction in use.
    pub fn set_facing(&mut self, direction: Option<Direction>) {
        self.shield.set_facing(direction);
    }

    /// Buffers an action for the next tick.
    pub fn queue_action(&mut self, action: GameAction) {
        self.input_queue.push_back(action);
    }

    /// Takes every event produced since the last drain.
    pub fn drain_events(&mut self) -> Vec<CoreEvent> {
        std::mem::take(&mut self.events)
    }

    /// Advances the session by `dt` seconds of real time.
    pub fn update(&mut self, dt: f64) {
        // 1. Clock and time-driven shield state
        let advanced = self.clock.advance(dt);
        let now = self.clock.now();
        let shield_events = self.shield.tick(advanced, now);
        self.push_shield_events(shield_events, now);

        // 2. Spawn notes entering look-ahead
        let due = self.scheduler.take_due(now);
        if !due.is_empty() {
            log::trace!("SESSION: {} notes entered look-ahead", due.len());
            self.live.extend(due);
        }

        // 3. Inputs accumulated since last tick
        while let Some(action) = self.input_queue.pop_front() {
            self.handle_action(action);
        }

        // 4. Timeouts and holds (actions may have reset the clock)
        let now = self.clock.now();
        self.update_notes(now);

        // 5. Schedule extension
        for set in self.scheduler.extend_all(now) {
            self.push_set_event(&set);
        }
    }

    /// Applies one action immediately.
    pub fn handle_action(&mut self, action: GameAction) {
        match action {
            GameAction::Press { direction } => self.on_press(direction),
            GameAction::Release { direction } => self.on_release(direction),
            GameAction::SetFacing(direction) => self.set_facing(direction),
            GameAction::TogglePause => {
                if self.clock.is_paused() {
                    self.resume();
                } else {
                    self.pause();
                }
            }
            GameAction::Pause => self.pause(),
            GameAction::Resume => self.resume(),
            GameAction::Interrupt => self.interrupt(),
            GameAction::ResumeFromInterruption => self.resume_from_interruption(),
            GameAction::ClearAllNotes => self.clear_all_notes(),
            GameAction::Restart => {
                self.reset_for_restart();
                self.start_game(0.0);
            }
        }
    }

    /// Counts a judgement toward stats and combo.
    pub(crate) fn apply_judgement(&mut self, judgement: Judgement) {
        self.hit_stats.record(judgement);
        self.last_judgement = Some(judgement);
        if judgement.is_hit() {
            self.combo += 1;
            self.max_combo = self.max_combo.max(self.combo);
        } else {
            self.combo = 0;
        }
    }

    pub(crate) fn push_shield_events(&mut self, shield_events: Vec<ShieldEvent>, at: f64) {
        for event in shield_events {
            self.events.push(match event {
                ShieldEvent::Broken(direction) => CoreEvent::ShieldBroken { direction, at },
                ShieldEvent::Restored(direction) => CoreEvent::ShieldRestored { direction, at },
            });
        }
    }

    fn push_set_event(&mut self, set: &ScheduledSet) {
        self.events.push(CoreEvent::SetScheduled {
            start_time: set.start_time,
            end_time: set.end_time,
            notes: set.notes.len(),
        });
    }

    /// Drops resolved notes from the live collection.
    pub(crate) fn remove_resolved(&mut self) {
        self.live.retain(|n| !n.is_resolved());
        debug_assert!(
            self.held
                .values()
                .all(|id| self.live.iter().any(|n| n.id == *id && n.is_holding())),
            "held map points at a note that is not holding"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::engine::library::PatternLibrary;
    use crate::models::engine::pattern::PatternNote;

    fn builtin_session() -> GameSession {
        let mut settings = GameSettings::default();
        settings.scheduler.shuffle = false;
        GameSession::new(settings, PatternLibrary::builtin().patterns().to_vec())
    }

    fn set_starts(events: &[CoreEvent]) -> Vec<f64> {
        events
            .iter()
            .filter_map(|e| match e {
                CoreEvent::SetScheduled { start_time, .. } => Some(*start_time),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn restart_mid_run_schedules_against_the_reset_clock() {
        let mut session = builtin_session();
        session.start_game(0.0);
        for _ in 0..250 {
            session.update(0.1);
        }
        assert!(session.now() > 20.0);

        session.queue_action(GameAction::Restart);
        session.update(0.1);

        // stairs 2.0 + anchor 2.5 + guard 2.0, still beyond the 4s threshold
        assert_eq!(session.now(), 0.0);
        assert_eq!(session.scheduler().set_end(), Some(6.5));
        assert_eq!(set_starts(&session.drain_events()), vec![0.0]);
        assert_eq!(session.hit_stats().judged(), 0);
    }

    #[test]
    fn resume_without_interrupt_keeps_the_schedule() {
        let pattern = PatternDescriptor::new(
            "p",
            vec![
                PatternNote::tap(0.25, Direction::Left),
                PatternNote::tap(0.5, Direction::Up),
                PatternNote::tap(9.0, Direction::Right),
            ],
        )
        .with_length(60.0);
        let mut settings = GameSettings::default();
        settings.scheduler.shuffle = false;
        let mut session = GameSession::new(settings, vec![pattern]);
        session.start_game(10.0);
        session.update(10.0);
        assert_eq!(session.live_notes().len(), 2);
        let pending = session.scheduler().pending().len();
        let set_end = session.scheduler().set_end();
        session.drain_events();

        session.handle_action(GameAction::ResumeFromInterruption);
        assert!(session.drain_events().is_empty());
        assert_eq!(session.live_notes().len(), 2);
        assert_eq!(session.scheduler().pending().len(), pending);
        assert_eq!(session.scheduler().set_end(), set_end);
        assert!(!session.is_interrupted());
    }

    #[test]
    fn interruption_is_resumed_once() {
        let mut session = builtin_session();
        session.start_game(0.0);
        session.update(1.0);
        session.interrupt();
        assert!(session.is_interrupted());
        session.drain_events();

        session.resume_from_interruption();
        session.resume_from_interruption();
        assert_eq!(set_starts(&session.drain_events()), vec![2.0]);
        assert!(!session.is_interrupted());
        assert!(!session.clock().is_paused());
    }
}
