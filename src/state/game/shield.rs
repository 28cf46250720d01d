//! Directional shield durability.
//!
//! Each meter cycles `full -> depleting -> disabled -> full`. Damage comes
//! from Perfect/Good judgements; a meter that reaches zero is disabled on
//! that same call and refills completely once `disable_duration` of virtual
//! time has passed.

use crate::models::engine::note::Direction;
use crate::models::settings::{ShieldMode, ShieldSettings};
use crate::models::stats::Judgement;

/// Edge events produced by the pool.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShieldEvent {
    Broken(Direction),
    Restored(Direction),
}

/// One durability meter.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ShieldMeter {
    pub current: f64,
    pub max: f64,
    pub disabled: bool,
    pub disabled_since: f64,
}

impl ShieldMeter {
    pub fn new(max: f64) -> Self {
        Self {
            current: max,
            max,
            disabled: false,
            disabled_since: 0.0,
        }
    }

    pub fn percent(&self) -> f64 {
        if self.max <= 0.0 {
            return 0.0;
        }
        self.current / self.max * 100.0
    }

    /// Applies damage. Returns true on the transition to zero.
    fn damage(&mut self, amount: f64, now: f64) -> bool {
        if self.disabled || amount <= 0.0 {
            return false;
        }
        self.current = (self.current - amount).max(0.0);
        if self.current == 0.0 {
            self.disabled = true;
            self.disabled_since = now;
            return true;
        }
        false
    }

    /// Restores the meter if its disable window is over.
    fn try_restore(&mut self, now: f64, disable_duration: f64) -> bool {
        if self.disabled && now - self.disabled_since >= disable_duration {
            self.disabled = false;
            self.current = self.max;
            return true;
        }
        false
    }

    fn regenerate(&mut self, amount: f64) {
        if !self.disabled && self.current < self.max {
            self.current = (self.current + amount).min(self.max);
        }
    }

    fn refill(&mut self) {
        *self = Self::new(self.max);
    }
}

/// Four direction meters, or a single shared one, depending on the mode.
#[derive(Debug, Clone)]
pub struct DirectionalResourcePool {
    settings: ShieldSettings,
    meters: [ShieldMeter; 4],
    /// Direction currently in use; it does not regenerate in independent mode.
    facing: Option<Direction>,
}

impl DirectionalResourcePool {
    pub fn new(settings: ShieldSettings) -> Self {
        Self {
            meters: [ShieldMeter::new(settings.max); 4],
            settings,
            facing: None,
        }
    }

    pub fn mode(&self) -> ShieldMode {
        self.settings.mode
    }

    pub fn settings(&self) -> &ShieldSettings {
        &self.settings
    }

    fn slot(&self, direction: Direction) -> usize {
        match self.settings.mode {
            ShieldMode::Independent => direction.index(),
            ShieldMode::Shared => 0,
        }
    }

    /// Meter backing `direction`.
    pub fn meter(&self, direction: Direction) -> &ShieldMeter {
        &self.meters[self.slot(direction)]
    }

    pub fn facing(&self) -> Option<Direction> {
        self.facing
    }

    pub fn set_facing(&mut self, direction: Option<Direction>) {
        self.facing = direction;
    }

    /// Directions affected by a change to `direction`'s meter.
    fn affected(&self, direction: Direction) -> Vec<Direction> {
        match self.settings.mode {
            ShieldMode::Independent => vec![direction],
            ShieldMode::Shared => Direction::ALL.to_vec(),
        }
    }

    /// Applies the shield damage for one judgement.
    pub fn apply_result(
        &mut self,
        direction: Direction,
        judgement: Judgement,
        now: f64,
    ) -> Vec<ShieldEvent> {
        let amount = self.settings.damage_for(judgement);
        let slot = self.slot(direction);
        if !self.meters[slot].damage(amount, now) {
            return Vec::new();
        }

        log::info!("SHIELD: {} depleted at {:.3}s", direction, now);
        self.affected(direction)
            .into_iter()
            .map(ShieldEvent::Broken)
            .collect()
    }

    /// Restores expired disable windows, then regenerates `dt` seconds
    /// worth of durability.
    pub fn tick(&mut self, dt: f64, now: f64) -> Vec<ShieldEvent> {
        let mut events = Vec::new();
        let disable_duration = self.settings.disable_duration;

        let slots: &[Direction] = match self.settings.mode {
            ShieldMode::Independent => &Direction::ALL,
            ShieldMode::Shared => &Direction::ALL[..1],
        };

        for &direction in slots {
            let slot = self.slot(direction);
            if self.meters[slot].try_restore(now, disable_duration) {
                log::info!("SHIELD: {} restored at {:.3}s", direction, now);
                events.extend(self.affected(direction).into_iter().map(ShieldEvent::Restored));
            }
        }

        if dt > 0.0 {
            let amount = self.settings.regen_rate * dt;
            for &direction in slots {
                let is_facing = self.settings.mode == ShieldMode::Independent
                    && self.facing == Some(direction);
                if !is_facing {
                    let slot = self.slot(direction);
                    self.meters[slot].regenerate(amount);
                }
            }
        }

        events
    }

    pub fn is_disabled(&self, direction: Direction) -> bool {
        self.meter(direction).disabled
    }

    /// Durability of `direction` as a percentage of its maximum.
    pub fn percent(&self, direction: Direction) -> f64 {
        self.meter(direction).percent()
    }

    pub fn current(&self, direction: Direction) -> f64 {
        self.meter(direction).current
    }

    /// Refills every meter and clears facing.
    pub fn reset(&mut self) {
        for meter in &mut self.meters {
            meter.refill();
        }
        self.facing = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings(mode: ShieldMode) -> ShieldSettings {
        ShieldSettings {
            mode,
            max: 100.0,
            regen_rate: 10.0,
            disable_duration: 3.0,
            perfect_damage: 5.0,
            good_damage: 3.0,
        }
    }

    #[test]
    fn two_perfects_take_ten() {
        let mut pool = DirectionalResourcePool::new(settings(ShieldMode::Independent));
        pool.apply_result(Direction::Left, Judgement::Perfect, 0.0);
        pool.apply_result(Direction::Left, Judgement::Perfect, 0.1);
        assert_eq!(pool.current(Direction::Left), 90.0);
        assert_eq!(pool.current(Direction::Right), 100.0);
    }

    #[test]
    fn misses_do_no_damage() {
        let mut pool = DirectionalResourcePool::new(settings(ShieldMode::Independent));
        assert!(pool.apply_result(Direction::Up, Judgement::Miss, 0.0).is_empty());
        assert_eq!(pool.percent(Direction::Up), 100.0);
    }

    #[test]
    fn reaching_zero_disables_on_the_same_call() {
        let mut config = settings(ShieldMode::Independent);
        config.max = 10.0;
        let mut pool = DirectionalResourcePool::new(config);

        assert!(pool.apply_result(Direction::Left, Judgement::Perfect, 1.0).is_empty());
        let events = pool.apply_result(Direction::Left, Judgement::Perfect, 2.0);
        assert_eq!(events, vec![ShieldEvent::Broken(Direction::Left)]);
        assert!(pool.is_disabled(Direction::Left));
        assert_eq!(pool.current(Direction::Left), 0.0);

        // Disabled meters take no further damage and do not regenerate.
        assert!(pool.apply_result(Direction::Left, Judgement::Perfect, 2.5).is_empty());
        pool.tick(1.0, 3.0);
        assert_eq!(pool.current(Direction::Left), 0.0);
    }

    #[test]
    fn overshooting_damage_is_floored() {
        let mut config = settings(ShieldMode::Independent);
        config.max = 4.0;
        let mut pool = DirectionalResourcePool::new(config);
        pool.apply_result(Direction::Up, Judgement::Perfect, 0.0);
        assert_eq!(pool.current(Direction::Up), 0.0);
        assert!(pool.is_disabled(Direction::Up));
    }

    #[test]
    fn disable_window_expires_to_full() {
        let mut config = settings(ShieldMode::Independent);
        config.max = 5.0;
        let mut pool = DirectionalResourcePool::new(config);
        pool.apply_result(Direction::Right, Judgement::Perfect, 10.0);

        assert!(pool.tick(0.5, 12.9).is_empty());
        assert!(pool.is_disabled(Direction::Right));

        let events = pool.tick(0.5, 13.0);
        assert_eq!(events, vec![ShieldEvent::Restored(Direction::Right)]);
        assert!(!pool.is_disabled(Direction::Right));
        assert_eq!(pool.current(Direction::Right), 5.0);
    }

    #[test]
    fn facing_direction_does_not_regenerate() {
        let mut pool = DirectionalResourcePool::new(settings(ShieldMode::Independent));
        pool.apply_result(Direction::Left, Judgement::Good, 0.0);
        pool.apply_result(Direction::Up, Judgement::Good, 0.0);
        pool.set_facing(Some(Direction::Left));

        pool.tick(0.1, 0.1);
        assert_eq!(pool.current(Direction::Left), 97.0);
        assert_eq!(pool.current(Direction::Up), 98.0);

        pool.tick(1.0, 1.1);
        assert_eq!(pool.current(Direction::Up), 100.0);
    }

    #[test]
    fn shared_mode_uses_one_meter() {
        let mut config = settings(ShieldMode::Shared);
        config.max = 8.0;
        let mut pool = DirectionalResourcePool::new(config);
        pool.set_facing(Some(Direction::Up));

        pool.apply_result(Direction::Left, Judgement::Good, 0.0);
        assert_eq!(pool.current(Direction::Right), 5.0);

        // Facing is ignored for regeneration in shared mode.
        pool.tick(0.1, 0.1);
        assert_eq!(pool.current(Direction::Up), 6.0);

        assert!(pool.apply_result(Direction::Right, Judgement::Perfect, 0.2).is_empty());
        let events = pool.apply_result(Direction::Up, Judgement::Perfect, 0.3);
        assert_eq!(events.len(), 4);
        assert!(Direction::ALL.iter().all(|&d| pool.is_disabled(d)));
    }

    #[test]
    fn current_stays_in_bounds() {
        let mut pool = DirectionalResourcePool::new(settings(ShieldMode::Independent));
        let mut now = 0.0;
        for step in 0..500 {
            now += 0.05;
            let direction = Direction::ALL[step % 4];
            let judgement = if step % 3 == 0 { Judgement::Good } else { Judgement::Perfect };
            pool.apply_result(direction, judgement, now);
            pool.tick(0.05, now);
            for d in Direction::ALL {
                let meter = pool.meter(d);
                assert!(meter.current >= 0.0 && meter.current <= meter.max);
                assert!(!meter.disabled || meter.current == 0.0);
            }
        }
    }
}
