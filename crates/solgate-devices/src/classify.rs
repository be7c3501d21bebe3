//! Leaf classification for arbitrary JSON payloads.
//!
//! A payload leaf comes in three shapes the gateway must tell apart:
//! plain scalars, `{value, unit}` measurement pairs, and time-series
//! maps keyed by timestamp-like keys. Everything else that is an object
//! is a container to recurse into. JSON null is classified as suppressed:
//! vendors include a field name with a null value to signal "not
//! applicable", and no state entry must come out of that.

use serde_json::{Map, Value};

use solgate_core::StateType;

/// Field name carrying the measured value inside a measurement pair.
const VALUE_FIELD: &str = "value";
/// Sibling field carrying the unit inside a measurement pair.
const UNIT_FIELD: &str = "unit";

/// Classification of a single payload value.
#[derive(Debug, Clone, PartialEq)]
pub enum Leaf<'a> {
    /// JSON null - suppressed, no state entry, no value write.
    Null,
    /// Plain scalar (bool, number, string or array).
    Scalar {
        state_type: StateType,
        value: &'a Value,
    },
    /// `{value, unit}` pair; siblings fold into this one leaf.
    Measurement {
        state_type: StateType,
        unit: Option<&'a str>,
        value: &'a Value,
    },
    /// Map keyed by timestamp-like keys; only the last entry matters.
    Series(&'a Map<String, Value>),
    /// Nested object to recurse into.
    Container(&'a Map<String, Value>),
}

/// Classify one JSON value.
///
/// Tie-break rule: the presence of a `value` key inside an object always
/// wins over treating the object as a generic container, even when other
/// sibling keys exist.
pub fn classify(value: &Value) -> Leaf<'_> {
    match value {
        Value::Null => Leaf::Null,
        Value::Bool(_) | Value::Number(_) | Value::String(_) => Leaf::Scalar {
            state_type: StateType::infer(value),
            value,
        },
        // Arrays are opaque fallback values, not containers to expand.
        Value::Array(_) => Leaf::Scalar {
            state_type: StateType::Mixed,
            value,
        },
        Value::Object(map) => classify_object(map),
    }
}

fn classify_object(map: &Map<String, Value>) -> Leaf<'_> {
    if let Some(inner) = map.get(VALUE_FIELD) {
        // A null measured value suppresses the whole leaf.
        if inner.is_null() {
            return Leaf::Null;
        }
        let unit = map
            .get(UNIT_FIELD)
            .and_then(Value::as_str)
            .filter(|u| !u.is_empty());
        return Leaf::Measurement {
            state_type: StateType::infer(inner),
            unit,
            value: inner,
        };
    }
    if is_time_series(map) {
        return Leaf::Series(map);
    }
    Leaf::Container(map)
}

/// A non-empty map whose keys all look like timestamps (integer seconds
/// or offsets) and whose values are all non-container is a time series.
/// Insertion order is assumed chronological.
fn is_time_series(map: &Map<String, Value>) -> bool {
    !map.is_empty()
        && map.keys().all(|k| k.parse::<i64>().is_ok())
        && map
            .values()
            .all(|v| !matches!(v, Value::Object(_) | Value::Array(_)))
}

/// The chronologically last entry of a time series (insertion order).
pub fn last_series_entry(map: &Map<String, Value>) -> Option<&Value> {
    map.values().last().filter(|v| !v.is_null())
}
