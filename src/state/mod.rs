//! State management module.
//!
//! - `GameSession` - the rhythm core: clock, notes, shields and schedule
//! - `traits` - seams to the combatant model, input gating and presentation

pub mod game;
pub mod traits;

// Re-exports for convenient access
pub use game::GameSession;
pub use traits::{DamageSink, InputGate, OpenGate, Snapshot};
