//! Pattern definitions loaded from TOML or JSON.
//!
//! Parsing is lenient: a malformed note entry is skipped with a warning and a
//! pattern whose every entry is malformed is dropped, so one bad line never
//! stops the rest of the schedule from being built.
//!
//! ```toml
//! [[patterns]]
//! name = "opening"
//! length = 4.0            # optional
//!
//! [[patterns.notes]]
//! time = 0.5
//! direction = "left"
//! kind = "long"           # optional, defaults to "normal"
//! duration = 1.0          # required for long notes
//! ```

use super::note::{Direction, NoteKind};
use super::pattern::{PatternDescriptor, PatternNote};
use serde::Deserialize;
use serde_json::Value;
use std::fmt;
use std::fs;
use std::path::Path;

/// Failure to read or parse a whole pattern document.
#[derive(Debug)]
pub enum PatternError {
    Io(std::io::Error),
    Parse(String),
}

impl fmt::Display for PatternError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PatternError::Io(e) => write!(f, "Failed to read pattern file: {}", e),
            PatternError::Parse(msg) => write!(f, "Failed to parse patterns: {}", msg),
        }
    }
}

impl std::error::Error for PatternError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            PatternError::Io(e) => Some(e),
            PatternError::Parse(_) => None,
        }
    }
}

impl From<std::io::Error> for PatternError {
    fn from(e: std::io::Error) -> Self {
        PatternError::Io(e)
    }
}

#[derive(Deserialize)]
struct RawDocument {
    #[serde(default)]
    patterns: Vec<Value>,
}

#[derive(Deserialize)]
struct RawPattern {
    name: Option<String>,
    length: Option<f64>,
    #[serde(default)]
    notes: Vec<Value>,
}

#[derive(Deserialize)]
struct RawNote {
    time: Option<f64>,
    direction: Option<String>,
    kind: Option<String>,
    duration: Option<f64>,
}

/// Named collection of pattern descriptors.
#[derive(Debug, Clone, Default)]
pub struct PatternLibrary {
    patterns: Vec<PatternDescriptor>,
}

impl PatternLibrary {
    pub fn new(patterns: Vec<PatternDescriptor>) -> Self {
        Self { patterns }
    }

    /// Small built-in set used when no pattern file is given.
    pub fn builtin() -> Self {
        use Direction::{Left, Right, Up};

        Self::new(vec![
            PatternDescriptor::new(
                "stairs",
                vec![
                    PatternNote::tap(0.0, Left),
                    PatternNote::tap(0.5, Up),
                    PatternNote::tap(1.0, Right),
                    PatternNote::tap(1.5, Up),
                ],
            ),
            PatternDescriptor::new(
                "anchor",
                vec![
                    PatternNote::hold(0.0, Left, 1.5),
                    PatternNote::tap(0.5, Right),
                    PatternNote::tap(1.0, Up),
                ],
            )
            .with_length(2.5),
            PatternDescriptor::new(
                "guard",
                vec![
                    PatternNote::new(0.0, Up, NoteKind::Defense, 0.0),
                    PatternNote::new(0.75, Right, NoteKind::Special, 0.0),
                    PatternNote::tap(1.25, Left),
                ],
            ),
        ])
    }

    /// Loads a library from disk. `.json` files are read as JSON, anything
    /// else as TOML.
    pub fn load(path: &Path) -> Result<Self, PatternError> {
        let content = fs::read_to_string(path)?;
        let is_json = path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));

        let library = if is_json {
            Self::from_json_str(&content)
        } else {
            Self::from_toml_str(&content)
        };

        match &library {
            Ok(lib) => log::info!("PATTERN: Loaded {} patterns from {:?}", lib.len(), path),
            Err(e) => log::error!("PATTERN: {:?}: {}", path, e),
        }
        library
    }

    pub fn from_toml_str(content: &str) -> Result<Self, PatternError> {
        let doc: RawDocument =
            toml::from_str(content).map_err(|e| PatternError::Parse(e.to_string()))?;
        Ok(Self::from_raw(doc))
    }

    pub fn from_json_str(content: &str) -> Result<Self, PatternError> {
        let doc: RawDocument =
            serde_json::from_str(content).map_err(|e| PatternError::Parse(e.to_string()))?;
        Ok(Self::from_raw(doc))
    }

    fn from_raw(doc: RawDocument) -> Self {
        let mut patterns = Vec::with_capacity(doc.patterns.len());

        for (index, value) in doc.patterns.into_iter().enumerate() {
            let raw: RawPattern = match serde_json::from_value(value) {
                Ok(raw) => raw,
                Err(e) => {
                    log::warn!("PATTERN: Skipping pattern #{}: {}", index, e);
                    continue;
                }
            };

            let name = raw.name.unwrap_or_else(|| format!("pattern_{}", index));
            let declared = raw.notes.len();
            let notes: Vec<PatternNote> = raw
                .notes
                .into_iter()
                .enumerate()
                .filter_map(|(i, v)| match parse_note(v) {
                    Ok(note) => Some(note),
                    Err(reason) => {
                        log::warn!("PATTERN: '{}' note #{} skipped: {}", name, i, reason);
                        None
                    }
                })
                .collect();

            if declared > 0 && notes.is_empty() {
                log::warn!("PATTERN: '{}' has no usable notes, dropping it", name);
                continue;
            }

            let mut pattern = PatternDescriptor::new(name, notes);
            if let Some(length) = raw.length {
                if length.is_finite() && length > 0.0 {
                    let notes_end = pattern.notes_end();
                    if length < notes_end {
                        log::warn!(
                            "PATTERN: '{}' length {} ends before its last note ({}), stretching",
                            pattern.name,
                            length,
                            notes_end
                        );
                    }
                    pattern = pattern.with_length(length);
                } else {
                    log::warn!("PATTERN: '{}' has invalid length {}, ignoring", pattern.name, length);
                }
            }
            patterns.push(pattern);
        }

        Self { patterns }
    }

    pub fn patterns(&self) -> &[PatternDescriptor] {
        &self.patterns
    }

    pub fn len(&self) -> usize {
        self.patterns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }

    pub fn get(&self, name: &str) -> Option<&PatternDescriptor> {
        self.patterns.iter().find(|p| p.name == name)
    }

    /// Returns the named patterns in order, skipping names that don't exist.
    pub fn select<S: AsRef<str>>(&self, names: &[S]) -> Vec<PatternDescriptor> {
        names
            .iter()
            .filter_map(|name| {
                let name = name.as_ref();
                let found = self.get(name).cloned();
                if found.is_none() {
                    log::warn!("PATTERN: Requested pattern '{}' not found, skipping", name);
                }
                found
            })
            .collect()
    }
}

fn parse_note(value: Value) -> Result<PatternNote, String> {
    let raw: RawNote = serde_json::from_value(value).map_err(|e| e.to_string())?;

    let time = raw.time.ok_or("missing time")?;
    if !time.is_finite() || time < 0.0 {
        return Err(format!("invalid time {}", time));
    }

    let direction: Direction = raw.direction.ok_or("missing direction")?.parse()?;
    if !Direction::LANES.contains(&direction) {
        return Err(format!("notes cannot be placed on {}", direction));
    }
    let kind: NoteKind = match raw.kind {
        Some(kind) => kind.parse()?,
        None => NoteKind::Normal,
    };

    let duration = raw.duration.unwrap_or(0.0);
    if kind.is_long() && !(duration.is_finite() && duration > 0.0) {
        return Err(format!("long note needs a positive duration, got {}", duration));
    }

    Ok(PatternNote::new(time, direction, kind, duration))
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"
        [[patterns]]
        name = "opening"

        [[patterns.notes]]
        time = 0.0
        direction = "left"

        [[patterns.notes]]
        time = 1.0
        direction = "up"
        kind = "long"
        duration = 1.5

        [[patterns]]
        name = "broken"

        [[patterns.notes]]
        time = -1.0
        direction = "left"

        [[patterns.notes]]
        time = 0.5
        direction = "sideways"

        [[patterns]]
        name = "partly"
        length = 3.0

        [[patterns.notes]]
        time = 0.25
        direction = "right"
        kind = "special"

        [[patterns.notes]]
        time = "soon"
        direction = "right"

        [[patterns.notes]]
        time = 1.0
        direction = "right"
        kind = "long"
    "#;

    #[test]
    fn lenient_toml_parsing() {
        let library = PatternLibrary::from_toml_str(SAMPLE).unwrap();
        assert_eq!(library.len(), 2);

        let opening = library.get("opening").unwrap();
        assert_eq!(opening.notes().len(), 2);
        assert_eq!(opening.total_duration(0.0), 2.5);

        assert!(library.get("broken").is_none());

        let partly = library.get("partly").unwrap();
        assert_eq!(partly.notes().len(), 1);
        assert_eq!(partly.notes()[0].kind, NoteKind::Special);
        assert_eq!(partly.total_duration(2.0), 3.0);
    }

    #[test]
    fn json_documents_parse_the_same_way() {
        let json = r#"{"patterns":[{"name":"j","notes":[{"time":0.0,"direction":"R"}]}]}"#;
        let library = PatternLibrary::from_json_str(json).unwrap();
        assert_eq!(library.get("j").unwrap().notes()[0].direction, Direction::Right);
    }

    #[test]
    fn select_skips_missing_names() {
        let library = PatternLibrary::from_toml_str(SAMPLE).unwrap();
        let picked = library.select(&["partly", "nope", "opening"]);
        let names: Vec<&str> = picked.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["partly", "opening"]);
    }

    #[test]
    fn down_is_not_a_note_lane() {
        let toml = r#"
            [[patterns]]
            name = "lanes"

            [[patterns.notes]]
            time = 0.0
            direction = "down"

            [[patterns.notes]]
            time = 0.5
            direction = "up"
        "#;
        let library = PatternLibrary::from_toml_str(toml).unwrap();
        let lanes = library.get("lanes").unwrap();
        assert_eq!(lanes.notes().len(), 1);
        assert_eq!(lanes.notes()[0].direction, Direction::Up);

        let only_down = r#"{"patterns":[{"name":"d","notes":[{"time":0.0,"direction":"d"}]}]}"#;
        assert!(PatternLibrary::from_json_str(only_down).unwrap().is_empty());
    }

    #[test]
    fn short_declared_length_is_stretched_to_the_notes() {
        let toml = r#"
            [[patterns]]
            name = "cramped"
            length = 1.0

            [[patterns.notes]]
            time = 3.0
            direction = "left"
        "#;
        let library = PatternLibrary::from_toml_str(toml).unwrap();
        assert_eq!(library.get("cramped").unwrap().total_duration(0.5), 3.0);
    }

    #[test]
    fn empty_document_is_an_empty_library() {
        let library = PatternLibrary::from_toml_str("").unwrap();
        assert!(library.is_empty());
    }

    #[test]
    fn syntax_errors_are_reported() {
        assert!(matches!(
            PatternLibrary::from_toml_str("[[patterns]\nname="),
            Err(PatternError::Parse(_))
        ));
    }

    #[test]
    fn builtin_patterns_are_playable() {
        let library = PatternLibrary::builtin();
        assert_eq!(library.len(), 3);
        for pattern in library.patterns() {
            assert!(!pattern.is_empty());
            assert!(pattern.notes().iter().all(|n| n.direction != Direction::Down));
        }
    }
}
