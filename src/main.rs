//! Headless entry point: runs an autoplayed session and reports the result.
//!
//! Usage: `rhythm-battle [settings.toml] [patterns.toml|patterns.json] [seconds]`

use rhythm_battle::input::{self, autoplay::AutoPlayer, events::InputCommand};
use rhythm_battle::logic;
use rhythm_battle::models::engine::{PatternDescriptor, PatternLibrary};
use rhythm_battle::system::bus::{SystemBus, SystemEvent};
use rhythm_battle::{CoreEvent, DamageSink, GameSession, GameSettings, Judgement, dispatch_damage};
use std::path::Path;
use std::time::{Duration, Instant};

const DEFAULT_RUN_SECS: f64 = 30.0;
/// Lead-in before the first set, in virtual seconds.
const START_DELAY: f64 = 1.0;

/// Opponent that soaks up the damage dealt by the player.
struct Opponent {
    health: i32,
    received: i32,
    hits: u32,
}

impl Opponent {
    fn new(health: i32) -> Self {
        Self {
            health,
            received: 0,
            hits: 0,
        }
    }
}

impl DamageSink for Opponent {
    fn apply_note_damage(&mut self, amount: i32, note_kind: &str, judgement: Judgement) {
        if amount <= 0 {
            return;
        }
        self.health = (self.health - amount).max(0);
        self.received += amount;
        self.hits += 1;
        log::debug!(
            "BATTLE: {} {} for {} ({} left)",
            judgement,
            note_kind,
            amount,
            self.health
        );
    }
}

fn load_patterns(path: Option<&String>) -> Vec<PatternDescriptor> {
    let Some(path) = path else {
        return PatternLibrary::builtin().patterns().to_vec();
    };
    match PatternLibrary::load(Path::new(path)) {
        Ok(library) if !library.is_empty() => library.patterns().to_vec(),
        Ok(_) => {
            log::warn!("MAIN: {} has no usable patterns, using built-ins", path);
            PatternLibrary::builtin().patterns().to_vec()
        }
        Err(_) => PatternLibrary::builtin().patterns().to_vec(),
    }
}

fn main() {
    if std::env::var_os("RUST_LOG").is_none() {
        unsafe {
            std::env::set_var("RUST_LOG", "info");
        }
    }
    env_logger::init();

    log::info!("MAIN: Booting rhythm-battle...");

    let args: Vec<String> = std::env::args().skip(1).collect();
    let settings = args
        .first()
        .map(|path| GameSettings::load_or_default(Path::new(path)))
        .unwrap_or_default();
    let patterns = load_patterns(args.get(1));
    let run_secs = args
        .get(2)
        .and_then(|s| s.parse::<f64>().ok())
        .filter(|s| s.is_finite() && *s > 0.0)
        .unwrap_or(DEFAULT_RUN_SECS);

    let mut session = GameSession::new(settings, patterns);
    session.start_game(START_DELAY);

    let bus = SystemBus::new();
    let input_handle = match input::start_thread(bus.clone(), AutoPlayer::new()) {
        Ok(handle) => handle,
        Err(e) => {
            log::error!("MAIN: Failed to spawn Input thread: {}", e);
            return;
        }
    };
    let logic_handle = match logic::start_thread(bus.clone(), session) {
        Ok(handle) => handle,
        Err(e) => {
            log::error!("MAIN: Failed to spawn Logic thread: {}", e);
            let _ = bus.input_cmd_tx.send(InputCommand::Stop);
            return;
        }
    };

    let mut opponent = Opponent::new(5000);
    let deadline = Instant::now() + Duration::from_secs_f64(run_secs);

    while Instant::now() < deadline {
        let Ok(event) = bus.event_rx.recv_timeout(Duration::from_millis(50)) else {
            continue;
        };
        match &event {
            CoreEvent::Judged {
                note,
                direction,
                kind,
                judgement,
                phase,
                ..
            } => log::info!(
                "MAIN: {} {} {} on {} ({:?})",
                judgement,
                kind,
                note,
                direction,
                phase
            ),
            CoreEvent::ShieldBroken { direction, at } => {
                log::info!("MAIN: Shield {} broken at {:.3}s", direction, at)
            }
            CoreEvent::ShieldRestored { direction, at } => {
                log::info!("MAIN: Shield {} restored at {:.3}s", direction, at)
            }
            CoreEvent::SetScheduled {
                start_time,
                end_time,
                notes,
            } => log::debug!(
                "MAIN: Set of {} notes [{:.3}s, {:.3}s)",
                notes,
                start_time,
                end_time
            ),
            CoreEvent::Whiff { .. } | CoreEvent::Damage(_) => {}
        }
        dispatch_damage(std::slice::from_ref(&event), &mut opponent);
    }

    let _ = bus.input_cmd_tx.send(InputCommand::Stop);
    let _ = bus.sys_tx.send(SystemEvent::Quit);

    if input_handle.join().is_err() {
        log::error!("MAIN: Input thread panicked");
    }
    let session = match logic_handle.join() {
        Ok(session) => session,
        Err(_) => {
            log::error!("MAIN: Logic thread panicked");
            return;
        }
    };

    let stats = session.hit_stats();
    log::info!(
        "MAIN: {:.2}% accuracy, {} perfect / {} good / {} miss / {} whiff, max combo {}",
        stats.calculate_accuracy(),
        stats.perfect,
        stats.good,
        stats.miss,
        stats.whiff,
        session.max_combo()
    );
    log::info!(
        "MAIN: Opponent took {} damage over {} hits ({} left)",
        opponent.received,
        opponent.hits,
        opponent.health
    );
}
