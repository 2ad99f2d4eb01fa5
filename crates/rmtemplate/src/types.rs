//! Core types for rule-table driven configuration management

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

/// Operating state requested for one controller invocation
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum State {
    /// Add the wanted configuration on top of what is there
    #[default]
    Merged,
    /// Replace the configuration of the wanted items
    Replaced,
    /// Make the device configuration equal to the wanted one
    Overridden,
    /// Remove configuration
    Deleted,
    /// Remove the whole resource
    Purged,
    /// Read current facts from the device
    Gathered,
    /// Render wanted configuration offline
    Rendered,
    /// Parse offline device output
    Parsed,
}

impl State {
    pub const ALL: [State; 8] = [
        Self::Merged,
        Self::Replaced,
        Self::Overridden,
        Self::Deleted,
        Self::Purged,
        Self::Gathered,
        Self::Rendered,
        Self::Parsed,
    ];

    /// States that compute commands and may push them to the device
    pub fn is_action(&self) -> bool {
        matches!(
            self,
            Self::Merged | Self::Replaced | Self::Overridden | Self::Deleted | Self::Purged
        )
    }

    /// States for which an empty "want" is a configuration error
    pub fn requires_want(&self) -> bool {
        matches!(
            self,
            Self::Merged | Self::Replaced | Self::Overridden | Self::Rendered
        )
    }

    /// States that talk to a live device
    pub fn contacts_device(&self) -> bool {
        self.is_action() || matches!(self, Self::Gathered)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Merged => "merged",
            Self::Replaced => "replaced",
            Self::Overridden => "overridden",
            Self::Deleted => "deleted",
            Self::Purged => "purged",
            Self::Gathered => "gathered",
            Self::Rendered => "rendered",
            Self::Parsed => "parsed",
        }
    }
}

impl fmt::Display for State {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for State {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|state| state.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("unknown state: {s}"))
    }
}

/// A result template: literal structure mixed with placeholder strings
///
/// Built from any JSON value. Strings carrying `{{ }}`, `{% %}` or `{# #}`
/// markers become [`Template::Text`]; every other leaf is a
/// [`Template::Scalar`] and is copied through untouched.
#[derive(Debug, Clone, PartialEq)]
pub enum Template {
    Scalar(Value),
    Text(String),
    Map(IndexMap<String, Template>),
    Sequence(Vec<Template>),
}

impl Template {
    /// Empty map, the result of a rule that contributes no facts
    pub fn empty() -> Self {
        Self::Map(IndexMap::new())
    }
}

impl Default for Template {
    fn default() -> Self {
        Self::empty()
    }
}

impl From<Value> for Template {
    fn from(value: Value) -> Self {
        match value {
            Value::String(s) if has_markers(&s) => Self::Text(s),
            Value::Array(items) => Self::Sequence(items.into_iter().map(Self::from).collect()),
            Value::Object(map) => Self::Map(
                map.into_iter()
                    .map(|(key, value)| (key, Self::from(value)))
                    .collect(),
            ),
            other => Self::Scalar(other),
        }
    }
}

/// Check whether a string contains any template markers
pub fn has_markers(text: &str) -> bool {
    text.contains("{{") || text.contains("{%") || text.contains("{#")
}

/// Signature of a code-supplied command builder
pub type SetValFn = dyn Fn(&Value) -> Value + Send + Sync;

/// How a rule turns data back into command text
#[derive(Clone)]
pub enum SetVal {
    /// Template text evaluated against the data
    Literal(String),
    /// Function called with the data; its return value is used as-is
    Function(Arc<SetValFn>),
}

impl SetVal {
    pub fn function<F>(f: F) -> Self
    where
        F: Fn(&Value) -> Value + Send + Sync + 'static,
    {
        Self::Function(Arc::new(f))
    }
}

impl fmt::Debug for SetVal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Literal(text) => f.debug_tuple("Literal").field(text).finish(),
            Self::Function(_) => f.write_str("Function(..)"),
        }
    }
}

impl From<&str> for SetVal {
    fn from(text: &str) -> Self {
        Self::Literal(text.to_string())
    }
}

impl From<String> for SetVal {
    fn from(text: String) -> Self {
        Self::Literal(text)
    }
}

/// Output of rendering one rule
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Rendered {
    /// Nothing to emit
    #[default]
    Empty,
    Line(String),
    Lines(Vec<String>),
}

impl Rendered {
    /// Interpret an evaluated template value as command text
    ///
    /// Strings are split on line breaks and blank lines dropped; sequences
    /// contribute one line per non-empty element.
    pub fn from_value(value: Option<Value>) -> Self {
        let lines: Vec<String> = match value {
            None | Some(Value::Null) | Some(Value::Bool(false)) | Some(Value::Object(_)) => {
                Vec::new()
            }
            Some(Value::String(s)) => split_lines(&s),
            Some(Value::Array(items)) => items.iter().flat_map(value_lines).collect(),
            Some(other) => vec![other.to_string()],
        };
        Self::from_lines(lines)
    }

    fn from_lines(mut lines: Vec<String>) -> Self {
        match lines.len() {
            0 => Self::Empty,
            1 => Self::Line(lines.remove(0)),
            _ => Self::Lines(lines),
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, Self::Empty)
    }

    /// Prepend `prefix` and a space to every line
    pub fn prefixed(self, prefix: &str) -> Self {
        match self {
            Self::Empty => Self::Empty,
            Self::Line(line) => Self::Line(format!("{prefix} {line}")),
            Self::Lines(lines) => Self::Lines(
                lines
                    .into_iter()
                    .map(|line| format!("{prefix} {line}"))
                    .collect(),
            ),
        }
    }

    pub fn into_lines(self) -> Vec<String> {
        match self {
            Self::Empty => Vec::new(),
            Self::Line(line) => vec![line],
            Self::Lines(lines) => lines,
        }
    }
}

fn split_lines(text: &str) -> Vec<String> {
    text.lines()
        .map(str::trim_end)
        .filter(|line| !line.trim().is_empty())
        .map(str::to_string)
        .collect()
}

fn value_lines(value: &Value) -> Vec<String> {
    match value {
        Value::String(s) => split_lines(s),
        Value::Null | Value::Bool(false) | Value::Object(_) | Value::Array(_) => Vec::new(),
        other => vec![other.to_string()],
    }
}

/// Prefixes applied to rendered commands
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Prefixes {
    /// Prepended to every line of a non-negated render, when set
    pub set: Option<String>,
    /// Prepended to every line of a negated render
    pub remove: String,
}

impl Default for Prefixes {
    fn default() -> Self {
        Self {
            set: None,
            remove: "no".to_string(),
        }
    }
}
