//! Shared channel infrastructure between system threads.
//!
//! The `SystemBus` is the hub every thread holds a clone of, using lock-free
//! channels for message passing.

use crate::input::events::{GameAction, InputCommand};
use crate::shared::messages::CoreEvent;
use crate::shared::snapshot::GameplaySnapshot;
use crossbeam_channel::{Receiver, Sender, bounded, unbounded};

/// System-level events for the logic thread.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SystemEvent {
    /// Shutdown requested.
    Quit,
}

/// Aggregates the cross-thread communication channels:
/// - Gameplay actions from the input thread
/// - Snapshots and core events from the logic thread
/// - Commands to the input thread
/// - System events (quit)
#[derive(Clone)]
pub struct SystemBus {
    /// Input → Logic: gameplay actions.
    pub action_tx: Sender<GameAction>,
    pub action_rx: Receiver<GameAction>,

    /// Logic → Presentation: session snapshots.
    pub snapshot_tx: Sender<GameplaySnapshot>,
    pub snapshot_rx: Receiver<GameplaySnapshot>,

    /// Logic → Presentation: judgements, damage and shield events.
    pub event_tx: Sender<CoreEvent>,
    pub event_rx: Receiver<CoreEvent>,

    /// Commands sent to the input thread.
    pub input_cmd_tx: Sender<InputCommand>,
    pub input_cmd_rx: Receiver<InputCommand>,

    /// Main → Logic: system events.
    pub sys_tx: Sender<SystemEvent>,
    pub sys_rx: Receiver<SystemEvent>,
}

impl SystemBus {
    /// Creates a new system bus with all channels initialized.
    pub fn new() -> Self {
        let (action_tx, action_rx) = unbounded();

        // Bounded snapshot channel: max 2 queued to limit latency
        let (snapshot_tx, snapshot_rx) = bounded(2);

        let (event_tx, event_rx) = unbounded();
        let (input_cmd_tx, input_cmd_rx) = unbounded();
        let (sys_tx, sys_rx) = unbounded();

        Self {
            action_tx,
            action_rx,
            snapshot_tx,
            snapshot_rx,
            event_tx,
            event_rx,
            input_cmd_tx,
            input_cmd_rx,
            sys_tx,
            sys_rx,
        }
    }
}

impl Default for SystemBus {
    fn default() -> Self {
        Self::new()
    }
}
