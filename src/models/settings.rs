//! Tunable settings, loadable from TOML.
//!
//! Every section has defaults, so a settings file only needs the keys it
//! wants to override.

use crate::models::engine::hit_window::{HitWindow, JudgeWindows};
use crate::models::engine::note::NoteKind;
use crate::models::engine::pattern::DEFAULT_MIN_PATTERN_DURATION;
use crate::models::stats::Judgement;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::Path;

/// Error raised while loading or validating settings.
#[derive(Debug)]
pub enum ConfigError {
    Io(std::io::Error),
    Parse(String),
    Invalid(String),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Io(e) => write!(f, "Failed to read settings: {}", e),
            ConfigError::Parse(msg) => write!(f, "Failed to parse settings: {}", msg),
            ConfigError::Invalid(msg) => write!(f, "Invalid settings: {}", msg),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<std::io::Error> for ConfigError {
    fn from(e: std::io::Error) -> Self {
        ConfigError::Io(e)
    }
}

/// How the shield pool shares durability between directions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ShieldMode {
    /// Four meters; the facing direction does not regenerate.
    Independent,
    /// One meter applied uniformly to every direction.
    Shared,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShieldSettings {
    pub mode: ShieldMode,
    pub max: f64,
    /// Durability regained per second of virtual time.
    pub regen_rate: f64,
    /// Seconds a depleted direction stays disabled.
    pub disable_duration: f64,
    pub perfect_damage: f64,
    pub good_damage: f64,
}

impl Default for ShieldSettings {
    fn default() -> Self {
        Self {
            mode: ShieldMode::Independent,
            max: 100.0,
            regen_rate: 5.0,
            disable_duration: 3.0,
            perfect_damage: 5.0,
            good_damage: 3.0,
        }
    }
}

impl ShieldSettings {
    pub fn damage_for(&self, judgement: Judgement) -> f64 {
        match judgement {
            Judgement::Perfect => self.perfect_damage,
            Judgement::Good => self.good_damage,
            Judgement::Miss => 0.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SchedulerSettings {
    /// Seconds before `hit_time` that a note becomes live.
    pub look_ahead: f64,
    /// Next set is generated once `set_end - now <= look_ahead * extension_factor`.
    pub extension_factor: f64,
    /// Offset from `now` used when restarting after an interruption.
    pub resume_buffer: f64,
    pub min_pattern_duration: f64,
    pub shuffle: bool,
    /// Fixed shuffle seed; random when absent.
    pub seed: Option<u64>,
}

impl Default for SchedulerSettings {
    fn default() -> Self {
        Self {
            look_ahead: 2.0,
            extension_factor: 2.0,
            resume_buffer: 1.0,
            min_pattern_duration: DEFAULT_MIN_PATTERN_DURATION,
            shuffle: true,
            seed: None,
        }
    }
}

impl SchedulerSettings {
    /// Remaining time below which the next set is generated.
    pub fn extension_threshold(&self) -> f64 {
        self.look_ahead * self.extension_factor
    }
}

/// Damage handed to the damage sink for one judgement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DamageAmounts {
    pub perfect: i32,
    pub good: i32,
}

impl DamageAmounts {
    pub const fn new(perfect: i32, good: i32) -> Self {
        Self { perfect, good }
    }

    pub fn for_judgement(&self, judgement: Judgement) -> i32 {
        match judgement {
            Judgement::Perfect => self.perfect,
            Judgement::Good => self.good,
            Judgement::Miss => 0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DamageSettings {
    /// Bonus at full hold progress, scaled down for early releases.
    pub hold_bonus: i32,
    /// Seconds between hold ticks while a long note is held.
    pub hold_tick_interval: f64,
    pub hold_tick_damage: i32,
    pub normal: DamageAmounts,
    pub long_head: DamageAmounts,
    pub long_tail: DamageAmounts,
    pub special: DamageAmounts,
    pub defense: DamageAmounts,
}

impl Default for DamageSettings {
    fn default() -> Self {
        Self {
            hold_bonus: 20,
            hold_tick_interval: 0.25,
            hold_tick_damage: 2,
            normal: DamageAmounts::new(10, 5),
            long_head: DamageAmounts::new(10, 5),
            long_tail: DamageAmounts::new(15, 8),
            special: DamageAmounts::new(25, 12),
            defense: DamageAmounts::new(0, 0),
        }
    }
}

impl DamageSettings {
    /// Table used when a note of `kind` is pressed (head for long notes).
    pub fn for_press(&self, kind: NoteKind) -> &DamageAmounts {
        match kind {
            NoteKind::Normal => &self.normal,
            NoteKind::Long => &self.long_head,
            NoteKind::Special => &self.special,
            NoteKind::Defense => &self.defense,
        }
    }

    /// Hold bonus for a given progress in `[0, 1]`.
    pub fn hold_bonus_for(&self, progress: f64) -> i32 {
        (self.hold_bonus as f64 * progress.clamp(0.0, 1.0)).round() as i32
    }
}

/// Full settings tree.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct GameSettings {
    pub judge: JudgeWindows,
    pub shield: ShieldSettings,
    pub scheduler: SchedulerSettings,
    pub damage: DamageSettings,
}

impl GameSettings {
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads and validates settings from a TOML file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path)?;
        let settings = Self::from_toml_str(&content)?;
        log::info!("CONFIG: Loaded settings from {:?}", path);
        Ok(settings)
    }

    /// Loads settings, falling back to defaults when the file is missing or
    /// broken.
    pub fn load_or_default(path: &Path) -> Self {
        match Self::load(path) {
            Ok(settings) => settings,
            Err(e) => {
                log::warn!("CONFIG: {} ({:?}), using defaults", e, path);
                Self::default()
            }
        }
    }

    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let settings: Self =
            toml::from_str(content).map_err(|e| ConfigError::Parse(e.to_string()))?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn to_toml_string(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    /// Checks the relations the engine relies on.
    pub fn validate(&self) -> Result<(), ConfigError> {
        check_window("judge.normal", &self.judge.normal)?;
        check_window("judge.long_head", &self.judge.long_head)?;
        check_window("judge.long_tail", &self.judge.long_tail)?;
        if self.judge.long_head.good > self.judge.normal.good
            || self.judge.long_head.perfect > self.judge.normal.perfect
        {
            return Err(ConfigError::Invalid(
                "judge.long_head must not be wider than judge.normal".to_string(),
            ));
        }

        let shield = &self.shield;
        if !positive(shield.max) {
            return Err(ConfigError::Invalid("shield.max must be positive".to_string()));
        }
        if shield.regen_rate < 0.0 || shield.disable_duration < 0.0 {
            return Err(ConfigError::Invalid(
                "shield.regen_rate and shield.disable_duration must not be negative".to_string(),
            ));
        }
        if shield.perfect_damage < 0.0 || shield.good_damage < 0.0 {
            return Err(ConfigError::Invalid("shield damage must not be negative".to_string()));
        }
        if shield.good_damage > shield.perfect_damage {
            return Err(ConfigError::Invalid(
                "shield.good_damage must not exceed shield.perfect_damage".to_string(),
            ));
        }

        let scheduler = &self.scheduler;
        if !positive(scheduler.look_ahead) || !at_least(scheduler.extension_factor, 1.0) {
            return Err(ConfigError::Invalid(
                "scheduler.look_ahead must be positive and extension_factor at least 1".to_string(),
            ));
        }
        if !positive(scheduler.min_pattern_duration) || scheduler.resume_buffer < 0.0 {
            return Err(ConfigError::Invalid(
                "scheduler.min_pattern_duration must be positive and resume_buffer not negative"
                    .to_string(),
            ));
        }

        if !positive(self.damage.hold_tick_interval) {
            return Err(ConfigError::Invalid(
                "damage.hold_tick_interval must be positive".to_string(),
            ));
        }
        Ok(())
    }
}

fn positive(value: f64) -> bool {
    value.is_finite() && value > 0.0
}

fn at_least(value: f64, min: f64) -> bool {
    value.is_finite() && value >= min
}

fn check_window(name: &str, window: &HitWindow) -> Result<(), ConfigError> {
    if !(positive(window.perfect) && window.perfect <= window.good) {
        return Err(ConfigError::Invalid(format!(
            "{name}: expected 0 < perfect <= good, got {} / {}",
            window.perfect, window.good
        )));
    }
    Ok(())
}
