pub mod hit_window;
pub mod library;
pub mod note;
pub mod pattern;

pub use hit_window::{HitWindow, JudgeWindows, judge};
pub use library::{PatternError, PatternLibrary};
pub use note::{Direction, Note, NoteId, NoteKind, NoteState};
pub use pattern::{PatternDescriptor, PatternNote};
