//! Snapshot-driven player that presses every note on time.

use crate::input::events::GameAction;
use crate::models::engine::note::{Direction, NoteId, NoteKind};
use crate::shared::snapshot::GameplaySnapshot;
use std::collections::{HashMap, HashSet};

pub struct AutoPlayer {
    enabled: bool,
    /// Notes already pressed, so a late snapshot never presses twice.
    struck: HashSet<NoteId>,
    /// Long notes held down, with their end time.
    holding: HashMap<Direction, (NoteId, f64)>,
}

impl AutoPlayer {
    pub fn new() -> Self {
        Self {
            enabled: true,
            struck: HashSet::new(),
            holding: HashMap::new(),
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Disabling releases nothing; the session times out whatever is left.
    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
        if !enabled {
            self.struck.clear();
            self.holding.clear();
        }
    }

    /// Returns the actions to take for `snapshot`, in order.
    pub fn process(&mut self, snapshot: &GameplaySnapshot) -> Vec<GameAction> {
        let mut actions = Vec::new();
        if !self.enabled || snapshot.paused {
            return actions;
        }
        let now = snapshot.now;

        // Releases first so a direction is free for the next note.
        let finished: Vec<Direction> = self
            .holding
            .iter()
            .filter(|(_, (id, end))| now >= *end || !snapshot.notes.iter().any(|n| n.id == *id))
            .map(|(direction, _)| *direction)
            .collect();
        for direction in finished {
            self.holding.remove(&direction);
            actions.push(GameAction::Release { direction });
        }

        for note in &snapshot.notes {
            if note.holding || now < note.hit_time || self.struck.contains(&note.id) {
                continue;
            }
            if self.holding.contains_key(&note.direction) {
                continue;
            }

            self.struck.insert(note.id);
            actions.push(GameAction::Press {
                direction: note.direction,
            });
            if note.kind == NoteKind::Long {
                self.holding
                    .insert(note.direction, (note.id, note.hit_time + note.duration));
            } else {
                actions.push(GameAction::Release {
                    direction: note.direction,
                });
            }
        }

        self.struck
            .retain(|id| snapshot.notes.iter().any(|n| n.id == *id));
        actions
    }
}

impl Default for AutoPlayer {
    fn default() -> Self {
        Self::new()
    }
}
