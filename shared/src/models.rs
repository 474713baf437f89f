//! Shared data models for the event links document.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// The persisted JSON document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EventDocument {
    /// Event currently shown on the site
    #[serde(default)]
    pub current_event: Option<Event>,
    /// Superseded events, most recent first
    #[serde(default)]
    pub past_events: Vec<ArchivedEvent>,
    /// Any other top-level fields, preserved as stored
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// An event: a list of days plus arbitrary pass-through fields.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Event {
    #[serde(default)]
    pub days: Vec<Day>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// A single dated entry of an event.
///
/// Kept as the raw JSON object so every key, including explicit nulls and
/// non-string values, is written back exactly as it was read.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Day {
    pub fields: Map<String, Value>,
}

impl Day {
    /// True unless the label is missing, null or an empty string.
    pub fn has_label(&self) -> bool {
        match self.fields.get("label") {
            None | Some(Value::Null) => false,
            Some(Value::String(label)) => !label.is_empty(),
            Some(_) => true,
        }
    }

    /// The raw date value, unless missing, null or an empty string.
    pub fn date(&self) -> Option<&Value> {
        match self.fields.get("date") {
            None | Some(Value::Null) => None,
            Some(Value::String(date)) if date.is_empty() => None,
            Some(date) => Some(date),
        }
    }

    pub fn label(&self) -> Option<&str> {
        self.fields.get("label").and_then(Value::as_str)
    }

    pub fn set_label(&mut self, label: String) {
        self.fields.insert("label".to_string(), Value::String(label));
    }
}

/// A former current event with the moment it was superseded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArchivedEvent {
    #[serde(flatten)]
    pub event: Event,
    /// RFC 3339 UTC timestamp of the archival
    pub archived_at: String,
}

/// Opaque revision of the stored document (the GitHub blob sha).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RevisionToken(pub String);

impl RevisionToken {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for RevisionToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}
