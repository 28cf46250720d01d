//! Input thread bootstrapping and action routing.

pub mod autoplay;
pub mod events;

use crate::input::autoplay::AutoPlayer;
use crate::input::events::InputCommand;
use crate::system::bus::SystemBus;
use crossbeam_channel::select;
use std::io;
use std::thread::{self, JoinHandle};

/// Spawns the input thread. It turns snapshots into actions through the
/// auto player until told to stop.
pub fn start_thread(bus: SystemBus, mut player: AutoPlayer) -> io::Result<JoinHandle<()>> {
    thread::Builder::new()
        .name("Input Thread".to_string())
        .spawn(move || {
            log::info!("INPUT: Thread started");

            // Blocking loop: wait for a snapshot or command, handle it, repeat.
            loop {
                select! {
                    recv(bus.snapshot_rx) -> snapshot => {
                        match snapshot {
                            Ok(snapshot) => {
                                for action in player.process(&snapshot) {
                                    if let Err(e) = bus.action_tx.send(action) {
                                        log::error!("INPUT: Failed to send action (Logic thread died?): {}", e);
                                        return;
                                    }
                                }
                            }
                            Err(_) => break,
                        }
                    }
                    recv(bus.input_cmd_rx) -> cmd => {
                        match cmd {
                            Ok(InputCommand::SetAutoplay(enabled)) => {
                                log::info!("INPUT: Autoplay {}", if enabled { "on" } else { "off" });
                                player.set_enabled(enabled);
                            }
                            Ok(InputCommand::Stop) | Err(_) => break,
                        }
                    }
                }
            }

            log::info!("INPUT: Thread stopped");
        })
}
