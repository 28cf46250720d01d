//! Snapshot creation for GameSession

use super::GameSession;
use crate::models::engine::note::Direction;
use crate::shared::snapshot::{GameplaySnapshot, NoteView, ShieldView};
use crate::state::traits::Snapshot;

impl Snapshot for GameSession {
    type Output = GameplaySnapshot;

    fn create_snapshot(&self) -> GameplaySnapshot {
        let now = self.clock.now();
        let lead = self.settings.scheduler.look_ahead;

        let notes = self
            .live
            .iter()
            .map(|n| NoteView {
                id: n.id,
                direction: n.direction,
                kind: n.kind,
                hit_time: n.hit_time,
                duration: n.duration,
                approach: n.approach_progress(now, lead),
                holding: n.is_holding(),
                hold_progress: n.hold_progress(now),
            })
            .collect();

        let mut holding: Vec<Direction> = self.held.keys().copied().collect();
        holding.sort();

        let shields = Direction::ALL.map(|direction| ShieldView {
            direction,
            percent: self.shield.percent(direction),
            disabled: self.shield.is_disabled(direction),
        });

        GameplaySnapshot {
            now,
            timestamp: std::time::Instant::now(),
            paused: self.clock.is_paused(),
            notes,
            holding,
            pending_notes: self.scheduler.pending().len(),
            shield_mode: self.shield.mode(),
            shields,
            facing: self.shield.facing(),
            combo: self.combo,
            max_combo: self.max_combo,
            accuracy: self.hit_stats.calculate_accuracy(),
            hit_stats: self.hit_stats.clone(),
            last_judgement: self.last_judgement,
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::models::engine::note::Direction;
    use crate::models::engine::pattern::{PatternDescriptor, PatternNote};
    use crate::models::settings::GameSettings;
    use crate::state::game::GameSession;
    use crate::state::traits::Snapshot;

    #[test]
    fn snapshot_reflects_live_state() {
        let mut settings = GameSettings::default();
        settings.scheduler.shuffle = false;
        let pattern = PatternDescriptor::new(
            "p",
            vec![
                PatternNote::hold(0.0, Direction::Left, 1.0),
                PatternNote::tap(1.0, Direction::Up),
                PatternNote::tap(4.0, Direction::Right),
            ],
        )
        .with_length(50.0);
        let mut session = GameSession::new(settings, vec![pattern]);
        session.start_game(1.0);
        session.update(1.0);
        session.on_press(Direction::Left);

        let snapshot = session.create_snapshot();
        assert_eq!(snapshot.now, 1.0);
        assert!(!snapshot.paused);
        assert_eq!(snapshot.notes.len(), 2);
        assert_eq!(snapshot.pending_notes, 1);
        assert_eq!(snapshot.holding, vec![Direction::Left]);
        assert_eq!(snapshot.facing, Some(Direction::Left));
        assert_eq!(snapshot.combo, 1);

        let held = &snapshot.notes[0];
        assert!(held.holding);
        assert_eq!(held.approach, 1.0);

        let up = snapshot.notes_in(Direction::Up).next().map(|n| n.approach);
        assert_eq!(up, Some(0.5));
        assert_eq!(snapshot.shield(Direction::Left).percent, 95.0);
        assert_eq!(snapshot.shield(Direction::Down).percent, 100.0);
    }
}
