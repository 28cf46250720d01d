//! Rhythm-battle core: timed directional notes, judgement, shields and an
//! endlessly extended pattern schedule, driven by a virtual clock.

pub mod input;
pub mod logic;
pub mod models;
pub mod shared;
pub mod state;
pub mod system;

pub use models::engine::{Direction, NoteKind, PatternDescriptor, PatternLibrary, PatternNote};
pub use models::settings::GameSettings;
pub use models::stats::Judgement;
pub use shared::messages::{CoreEvent, dispatch_damage};
pub use state::{DamageSink, GameSession, InputGate, Snapshot};
