//! Pausable virtual clock.
//!
//! Every scheduling and judgement comparison reads `now()` from here instead
//! of wall time, so pausing the clock freezes the whole rhythm timeline.

/// Monotonic virtual time in seconds.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct VirtualClock {
    elapsed: f64,
    paused: bool,
    /// Real time fed to `advance` since the last pause.
    paused_for: f64,
}

impl VirtualClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a clock already positioned at `start`.
    pub fn starting_at(start: f64) -> Self {
        Self {
            elapsed: start,
            ..Self::default()
        }
    }

    pub fn now(&self) -> f64 {
        self.elapsed
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    /// Feeds `dt` seconds of real time. Returns the virtual time that
    /// actually elapsed (0 while paused).
    pub fn advance(&mut self, dt: f64) -> f64 {
        if !(dt.is_finite() && dt > 0.0) {
            return 0.0;
        }
        if self.paused {
            self.paused_for += dt;
            0.0
        } else {
            self.elapsed += dt;
            dt
        }
    }

    pub fn pause(&mut self) {
        if self.paused {
            return;
        }
        self.paused = true;
        self.paused_for = 0.0;
        log::debug!("CLOCK: Paused at {:.3}s", self.elapsed);
    }

    pub fn resume(&mut self) {
        if !self.paused {
            return;
        }
        self.paused = false;
        log::debug!(
            "CLOCK: Resumed at {:.3}s after {:.3}s paused",
            self.elapsed,
            self.paused_for
        );
    }

    /// Real time spent in the current pause. Zero when running.
    pub fn delta_since_pause(&self) -> f64 {
        if self.paused { self.paused_for } else { 0.0 }
    }

    /// Back to the zero state for a fresh session.
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn paused_clock_does_not_move() {
        let mut clock = VirtualClock::new();
        clock.advance(1.0);
        clock.pause();
        for _ in 0..100 {
            assert_eq!(clock.advance(0.016), 0.0);
        }
        assert_eq!(clock.now(), 1.0);
        assert!((clock.delta_since_pause() - 1.6).abs() < 1e-9);
    }

    #[test]
    fn paused_time_is_excluded_not_replayed() {
        let mut reference = VirtualClock::new();
        let mut clock = VirtualClock::new();

        reference.advance(0.5);
        clock.advance(0.5);

        clock.pause();
        clock.advance(10.0);
        clock.resume();

        reference.advance(0.25);
        clock.advance(0.25);
        assert_eq!(clock.now(), reference.now());
        assert_eq!(clock.delta_since_pause(), 0.0);
    }

    #[test]
    fn pause_and_resume_are_idempotent() {
        let mut clock = VirtualClock::starting_at(2.0);
        clock.pause();
        clock.advance(1.0);
        clock.pause();
        assert!((clock.delta_since_pause() - 1.0).abs() < 1e-9);
        clock.resume();
        clock.resume();
        assert!(!clock.is_paused());
        assert_eq!(clock.now(), 2.0);
    }

    #[test]
    fn bad_deltas_are_ignored() {
        let mut clock = VirtualClock::new();
        clock.advance(-1.0);
        clock.advance(f64::NAN);
        clock.advance(f64::INFINITY);
        assert_eq!(clock.now(), 0.0);
    }

    #[test]
    fn reset_returns_to_zero_state() {
        let mut clock = VirtualClock::starting_at(5.0);
        clock.pause();
        clock.reset();
        assert_eq!(clock, VirtualClock::new());
    }
}
