//! Logic thread module for session updates.
//!
//! This module contains the loop that runs the session at a fixed tick rate
//! and publishes its output to the other threads.

pub mod clock;

use crate::state::game::GameSession;
use crate::state::traits::Snapshot;
use crate::system::bus::{SystemBus, SystemEvent};
use std::io;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

/// Target ticks per second for the logic thread.
pub const TPS: u64 = 200;

/// Upper bound on catch-up steps per loop iteration.
const MAX_STEPS_PER_LOOP: u32 = 10;

/// Spawns the logic thread. The session is handed back when it quits.
///
/// This thread runs a fixed-timestep loop that:
/// 1. Queues input actions from the input thread
/// 2. Handles system events
/// 3. Updates the session at a fixed rate
/// 4. Publishes a snapshot and the events produced
pub fn start_thread(bus: SystemBus, mut session: GameSession) -> io::Result<JoinHandle<GameSession>> {
    thread::Builder::new()
        .name("Logic Thread".to_string())
        .spawn(move || {
            log::info!("LOGIC: Thread started");

            let mut accumulator = Duration::new(0, 0);
            let mut last_time = Instant::now();
            let target_dt = Duration::from_secs_f64(1.0 / TPS as f64);

            loop {
                // 1. Queue input actions for the next tick
                while let Ok(action) = bus.action_rx.try_recv() {
                    session.queue_action(action);
                }

                // 2. Handle system events
                while let Ok(sys_evt) = bus.sys_rx.try_recv() {
                    match sys_evt {
                        SystemEvent::Quit => {
                            log::info!("LOGIC: Quit received at {:.3}s", session.now());
                            return session;
                        }
                    }
                }

                // 3. Fixed-timestep update loop
                let current_time = Instant::now();
                accumulator += current_time - last_time;
                last_time = current_time;

                let mut loops = 0;
                while accumulator >= target_dt && loops < MAX_STEPS_PER_LOOP {
                    session.update(target_dt.as_secs_f64());
                    accumulator -= target_dt;
                    loops += 1;
                }
                if loops == MAX_STEPS_PER_LOOP && accumulator >= target_dt {
                    log::warn!("LOGIC: Falling behind, dropping {:?}", accumulator);
                    accumulator = Duration::new(0, 0);
                }

                // 4. Publish only if we updated
                if loops > 0 {
                    for event in session.drain_events() {
                        if bus.event_tx.send(event).is_err() {
                            log::warn!("LOGIC: Event receiver gone");
                            break;
                        }
                    }
                    let _ = bus.snapshot_tx.try_send(session.create_snapshot());
                } else {
                    thread::sleep(Duration::from_millis(1));
                }
            }
        })
}
