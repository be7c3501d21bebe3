//! Hierarchical state namespace - keys, descriptors and values.
//!
//! A [`StateKey`] is an ordered chain of path segments joined by `.`
//! (category prefix, optional device id, then the field names encountered
//! while walking a payload). Keys are unique within the namespace.
//!
//! A [`StateDescriptor`] is the metadata attached to a key at creation
//! time. Descriptors are create-only: once a key exists, later
//! registration calls never mutate it.

use serde::{Deserialize, Serialize};

/// Separator between path segments.
pub const SEPARATOR: char = '.';

/// Dotted hierarchical key identifying one entry in the state namespace.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StateKey(String);

impl StateKey {
    /// Create a key from a root segment.
    ///
    /// A trailing separator on the segment is dropped; it is re-added
    /// when the next segment is joined, so keys are never
    /// double-separated and never left unterminated.
    pub fn root(segment: impl AsRef<str>) -> Self {
        let mut key = Self(String::new());
        key.push(segment.as_ref());
        key
    }

    /// Return a new key with `segment` appended.
    pub fn join(&self, segment: impl AsRef<str>) -> Self {
        let mut key = self.clone();
        key.push(segment.as_ref());
        key
    }

    fn push(&mut self, segment: &str) {
        let segment = segment.trim_matches(SEPARATOR);
        if segment.is_empty() {
            return;
        }
        if !self.0.is_empty() {
            self.0.push(SEPARATOR);
        }
        self.0.push_str(segment);
    }

    /// The full dotted path.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Last path segment (the leaf field name).
    pub fn leaf(&self) -> &str {
        self.0.rsplit(SEPARATOR).next().unwrap_or(&self.0)
    }

    /// Whether this key lives under the given prefix.
    pub fn starts_with(&self, prefix: &StateKey) -> bool {
        self.0 == prefix.0
            || self
                .0
                .strip_prefix(&prefix.0)
                .is_some_and(|rest| rest.starts_with(SEPARATOR))
    }
}

impl std::fmt::Display for StateKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl AsRef<str> for StateKey {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl From<&str> for StateKey {
    fn from(s: &str) -> Self {
        Self::root(s)
    }
}

impl From<String> for StateKey {
    fn from(s: String) -> Self {
        Self::root(s)
    }
}

/// Semantic type of a state entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum StateType {
    Number,
    Text,
    Boolean,
    /// Untyped fallback for nested or ambiguous values.
    #[default]
    Mixed,
}

impl StateType {
    /// Infer the semantic type from a JSON value's runtime type.
    ///
    /// Arrays and objects fall back to [`StateType::Mixed`]; null has no
    /// type of its own and also maps to `Mixed` (callers suppress null
    /// leaves before this matters).
    pub fn infer(value: &serde_json::Value) -> Self {
        match value {
            serde_json::Value::Number(_) => Self::Number,
            serde_json::Value::String(_) => Self::Text,
            serde_json::Value::Bool(_) => Self::Boolean,
            serde_json::Value::Null
            | serde_json::Value::Array(_)
            | serde_json::Value::Object(_) => Self::Mixed,
        }
    }
}

/// Role tag used by host stores for UI hints.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum StateRole {
    /// A live measurement.
    #[default]
    Value,
    /// Device metadata (serial numbers, versions).
    Meta,
    /// Informational text (status descriptions).
    Info,
    /// Boolean health/connectivity flag.
    Indicator,
}

/// Metadata attached to a [`StateKey`] when the entry is created.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StateDescriptor {
    /// Display name; defaults to the leaf field name.
    pub name: String,
    /// Semantic type.
    pub state_type: StateType,
    /// Physical unit, empty when unitless.
    #[serde(default)]
    pub unit: String,
    /// Human description.
    #[serde(default)]
    pub description: String,
    /// Role tag for UI hints.
    #[serde(default)]
    pub role: StateRole,
}

impl StateDescriptor {
    /// Create a descriptor with the given display name and type.
    pub fn new(name: impl Into<String>, state_type: StateType) -> Self {
        Self {
            name: name.into(),
            state_type,
            unit: String::new(),
            description: String::new(),
            role: StateRole::Value,
        }
    }

    /// Generic fallback descriptor for a field the curated schema did
    /// not anticipate: name is the field name, no unit, type as given.
    pub fn fallback(field: &str, state_type: StateType) -> Self {
        Self::new(field, state_type)
    }

    pub fn with_unit(mut self, unit: impl Into<String>) -> Self {
        self.unit = unit.into();
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_role(mut self, role: StateRole) -> Self {
        self.role = role;
        self
    }
}

/// A value written into the store for one key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StateValue {
    /// The raw value.
    pub value: serde_json::Value,
    /// Authoritative flag: true when the value originates from a
    /// successful device read, false for locally computed defaults.
    pub ack: bool,
    /// Write timestamp (unix millis).
    pub timestamp: i64,
}

impl StateValue {
    /// Wrap a device-read value (authoritative).
    pub fn acknowledged(value: serde_json::Value) -> Self {
        Self {
            value,
            ack: true,
            timestamp: chrono::Utc::now().timestamp_millis(),
        }
    }
}
