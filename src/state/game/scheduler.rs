//! Pattern scheduler: turns relative-time patterns into an unbounded,
//! gap-free absolute schedule.
//!
//! Sets are laid end to end. The next set is generated once the time left in
//! the current one drops to `look_ahead * extension_factor`, starting exactly
//! at the previous set's end. The only exception is
//! [`PatternScheduler::resume_from_interruption`], which restarts at
//! `now + resume_buffer` after the schedule was cleared.

use crate::models::engine::note::{Note, NoteId};
use crate::models::engine::pattern::PatternDescriptor;
use crate::models::settings::SchedulerSettings;
use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;

/// Upper bound on sets generated in a single extension check.
const MAX_SETS_PER_CHECK: usize = 16;

/// A shuffled run of patterns instantiated at absolute times.
#[derive(Debug, Clone, PartialEq)]
pub struct ScheduledSet {
    pub start_time: f64,
    pub end_time: f64,
    pub notes: Vec<Note>,
    /// Pattern names in the order they were laid out.
    pub pattern_names: Vec<String>,
}

impl ScheduledSet {
    pub fn duration(&self) -> f64 {
        self.end_time - self.start_time
    }
}

/// Returns whether the next set should be generated now.
pub fn maybe_extend(current_time: f64, set_end_time: f64, threshold: f64) -> bool {
    set_end_time - current_time <= threshold
}

/// Lays `patterns` out back to back from `start_time`, assigning ids from
/// `next_id`.
pub fn lay_out(
    patterns: &[&PatternDescriptor],
    start_time: f64,
    min_pattern_duration: f64,
    next_id: &mut u64,
) -> ScheduledSet {
    let mut notes = Vec::new();
    let mut pattern_names = Vec::with_capacity(patterns.len());
    let mut cursor = start_time;

    for pattern in patterns {
        for entry in pattern.notes() {
            let id = NoteId(*next_id);
            *next_id += 1;
            notes.push(Note::new(
                id,
                entry.direction,
                entry.kind,
                cursor + entry.relative_time,
                entry.duration,
            ));
        }
        pattern_names.push(pattern.name.clone());
        cursor += pattern.total_duration(min_pattern_duration);
    }

    ScheduledSet {
        start_time,
        end_time: cursor,
        notes,
        pattern_names,
    }
}

/// Generates sets from a fixed pattern source and releases their notes as
/// they come within `look_ahead` of the clock.
#[derive(Debug)]
pub struct PatternScheduler {
    settings: SchedulerSettings,
    patterns: Vec<PatternDescriptor>,
    rng: StdRng,
    next_id: u64,
    /// Instantiated notes not yet live, ordered by hit time.
    pending: Vec<Note>,
    /// End of the latest generated set.
    set_end: Option<f64>,
    monitoring: bool,
    /// Boundary that already triggered an extension.
    extended_at: Option<f64>,
}

impl PatternScheduler {
    pub fn new(settings: SchedulerSettings, patterns: Vec<PatternDescriptor>) -> Self {
        let rng = Self::make_rng(&settings);
        if patterns.is_empty() {
            log::warn!("SCHEDULER: Pattern source is empty, no notes will spawn");
        }
        Self {
            settings,
            patterns,
            rng,
            next_id: 0,
            pending: Vec::new(),
            set_end: None,
            monitoring: false,
            extended_at: None,
        }
    }

    fn make_rng(settings: &SchedulerSettings) -> StdRng {
        match settings.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        }
    }

    pub fn settings(&self) -> &SchedulerSettings {
        &self.settings
    }

    pub fn patterns(&self) -> &[PatternDescriptor] {
        &self.patterns
    }

    pub fn is_monitoring(&self) -> bool {
        self.monitoring
    }

    /// End of the latest generated set, if any.
    pub fn set_end(&self) -> Option<f64> {
        self.set_end
    }

    pub fn pending(&self) -> &[Note] {
        &self.pending
    }

    /// Instantiates one set from the whole pattern source starting at
    /// `start_time`, shuffled when `shuffle` is set.
    pub fn instantiate_set(&mut self, start_time: f64, shuffle: bool) -> ScheduledSet {
        let mut order: Vec<&PatternDescriptor> = self.patterns.iter().collect();
        if shuffle {
            order.shuffle(&mut self.rng);
        }
        lay_out(
            &order,
            start_time,
            self.settings.min_pattern_duration,
            &mut self.next_id,
        )
    }

    /// Generates the first set and starts monitoring.
    pub fn start(&mut self, start_time: f64) -> Option<ScheduledSet> {
        self.clear();
        self.begin_at(start_time)
    }

    /// Restarts right after an interruption cleared the schedule. Breaks
    /// seamlessness on purpose so notes are available promptly.
    pub fn resume_from_interruption(&mut self, now: f64) -> Option<ScheduledSet> {
        self.clear();
        let start_time = now + self.settings.resume_buffer;
        log::info!("SCHEDULER: Resuming after interruption at {:.3}s", start_time);
        self.begin_at(start_time)
    }

    fn begin_at(&mut self, start_time: f64) -> Option<ScheduledSet> {
        if self.patterns.is_empty() {
            log::warn!("SCHEDULER: Nothing to schedule at {:.3}s", start_time);
            return None;
        }
        let set = self.instantiate_set(start_time, self.settings.shuffle);
        self.monitoring = true;
        self.add_set(&set);
        Some(set)
    }

    /// Queues an externally built set and continues the schedule from its end.
    pub fn add_set(&mut self, set: &ScheduledSet) {
        log::debug!(
            "SCHEDULER: Set [{:.3}s, {:.3}s) with {} notes: {:?}",
            set.start_time,
            set.end_time,
            set.notes.len(),
            set.pattern_names
        );
        self.pending.extend(set.notes.iter().cloned());
        self.pending.sort_by(|a, b| a.hit_time.total_cmp(&b.hit_time));
        self.set_end = Some(self.set_end.map_or(set.end_time, |end| end.max(set.end_time)));
    }

    /// True if the current boundary is close enough and has not fired yet.
    pub fn extension_due(&self, now: f64) -> bool {
        if !self.monitoring {
            return false;
        }
        match self.set_end {
            Some(end) => {
                self.extended_at != Some(end)
                    && maybe_extend(now, end, self.settings.extension_threshold())
            }
            None => false,
        }
    }

    /// Generates the next seamless set if one is due.
    pub fn extend(&mut self, now: f64) -> Option<ScheduledSet> {
        if !self.extension_due(now) {
            return None;
        }
        let boundary = self.set_end?;
        self.extended_at = Some(boundary);

        let set = self.instantiate_set(boundary, self.settings.shuffle);
        log::info!(
            "SCHEDULER: Extended schedule at {:.3}s: [{:.3}s, {:.3}s)",
            now,
            set.start_time,
            set.end_time
        );
        self.add_set(&set);
        Some(set)
    }

    /// Generates sets until the schedule reaches past the extension window.
    pub fn extend_all(&mut self, now: f64) -> Vec<ScheduledSet> {
        let mut sets = Vec::new();
        while sets.len() < MAX_SETS_PER_CHECK {
            match self.extend(now) {
                Some(set) => sets.push(set),
                None => break,
            }
        }
        sets
    }

    /// Removes and returns pending notes within `look_ahead` of `now`.
    pub fn take_due(&mut self, now: f64) -> Vec<Note> {
        let horizon = now + self.settings.look_ahead;
        let split = self.pending.partition_point(|n| n.hit_time <= horizon);
        self.pending.drain(..split).collect()
    }

    /// Drops every pending note and stops monitoring.
    pub fn clear(&mut self) {
        self.pending.clear();
        self.set_end = None;
        self.monitoring = false;
        self.extended_at = None;
    }

    /// Clears and reseeds for a fresh session.
    pub fn reset(&mut self) {
        self.clear();
        self.rng = Self::make_rng(&self.settings);
        self.next_id = 0;
    }
}
