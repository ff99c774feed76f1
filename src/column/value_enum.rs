//! Enumerated cell values (`valueEnum`).
//!
//! Callers declare the shape at the boundary: an ordered map (arbitrary
//! string/number keys, insertion order kept) or a plain object (string keys).
//! Both become the same [`ValueEnum`], so nothing downstream probes shapes.

use super::declaration::FilterOption;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Badge shown next to an enumerated value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[allow(missing_docs)]
pub enum Status {
    Success,
    Error,
    Processing,
    Warning,
    Default,
}

impl Status {
    /// Parse a status name as written in a value enum.
    pub fn parse(name: &str) -> Option<Self> {
        match name {
            "Success" | "success" => Some(Status::Success),
            "Error" | "error" => Some(Status::Error),
            "Processing" | "processing" => Some(Status::Processing),
            "Warning" | "warning" => Some(Status::Warning),
            "Default" | "default" => Some(Status::Default),
            _ => None,
        }
    }
}

/// Display information for one enumerated value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValueEnumEntry {
    /// Label.
    pub text: String,
    /// Optional status badge.
    pub status: Option<Status>,
}

impl ValueEnumEntry {
    /// Plain label.
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            status: None,
        }
    }

    /// Label with a status badge.
    pub fn with_status(text: impl Into<String>, status: Status) -> Self {
        Self {
            text: text.into(),
            status: Some(status),
        }
    }

    fn from_json(raw: &Value) -> Self {
        match raw {
            Value::String(text) => Self::text(text.clone()),
            Value::Object(fields) => Self {
                text: fields
                    .get("text")
                    .map(display_text)
                    .unwrap_or_default(),
                status: fields
                    .get("status")
                    .and_then(Value::as_str)
                    .and_then(Status::parse),
            },
            other => Self::text(display_text(other)),
        }
    }
}

/// Declared shape of a value enum.
#[derive(Debug, Clone, PartialEq)]
pub enum ValueEnumSource {
    /// Map-like source; keys may be numbers and order is preserved.
    Map(Vec<(Value, ValueEnumEntry)>),
    /// Plain object source.
    Object(Map<String, Value>),
}

/// Normalized value enum: stringified keys in declaration order.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ValueEnum {
    entries: Vec<(String, ValueEnumEntry)>,
}

impl ValueEnum {
    /// Normalize a declared source.
    pub fn new(source: ValueEnumSource) -> Self {
        let entries = match source {
            ValueEnumSource::Map(pairs) => pairs
                .into_iter()
                .map(|(key, entry)| (display_text(&key), entry))
                .collect(),
            ValueEnumSource::Object(fields) => fields
                .iter()
                .map(|(key, raw)| (key.clone(), ValueEnumEntry::from_json(raw)))
                .collect(),
        };
        Self { entries }
    }

    /// Build from `(key, entry)` pairs.
    pub fn from_pairs<K: Into<String>>(pairs: impl IntoIterator<Item = (K, ValueEnumEntry)>) -> Self {
        Self {
            entries: pairs.into_iter().map(|(k, e)| (k.into(), e)).collect(),
        }
    }

    /// Entry for `key` (compared as a string).
    pub fn get(&self, key: &str) -> Option<&ValueEnumEntry> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, entry)| entry)
    }

    /// Entries in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &ValueEnumEntry)> {
        self.entries.iter().map(|(k, e)| (k.as_str(), e))
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether there are no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Header filter choices, without the catch-all `"all"` entry.
    pub fn to_filter_options(&self) -> Vec<FilterOption> {
        self.iter()
            .filter(|(key, _)| *key != "all")
            .map(|(key, entry)| FilterOption {
                text: entry.text.clone(),
                value: key.to_owned(),
            })
            .collect()
    }
}

impl From<ValueEnumSource> for ValueEnum {
    fn from(source: ValueEnumSource) -> Self {
        ValueEnum::new(source)
    }
}

/// Result of looking a cell value up in a value enum.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParsedText {
    /// Not enumerated: show the raw value.
    Raw(String),
    /// Enumerated label.
    Text(String),
    /// Enumerated label with a badge.
    Status {
        /// Label.
        text: String,
        /// Badge.
        status: Status,
    },
}

impl ParsedText {
    /// Label regardless of variant.
    pub fn text(&self) -> &str {
        match self {
            ParsedText::Raw(text) | ParsedText::Text(text) => text,
            ParsedText::Status { text, .. } => text,
        }
    }
}

/// Resolve the display text of `value` through `value_enum`.
///
/// With `pure` set the badge is dropped and only the label is returned.
pub fn parsing_text(value: &Value, value_enum: Option<&ValueEnum>, pure: bool) -> ParsedText {
    let raw = display_text(value);
    let Some(entry) = value_enum.and_then(|e| e.get(&raw)) else {
        return ParsedText::Raw(raw);
    };

    match entry.status {
        Some(status) if !pure => ParsedText::Status {
            text: entry.text.clone(),
            status,
        },
        _ => ParsedText::Text(entry.text.clone()),
    }
}

fn display_text(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}
