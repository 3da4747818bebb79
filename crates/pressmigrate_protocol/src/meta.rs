//! Meta entry values.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

/// The value of one meta key on a content record.
///
/// The source emits a bare value when a key has one stored entry and a list
/// when it has several; a stored entry may itself be a structured map. The
/// variant is decided once when the record is decoded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "Value", into = "Value")]
pub enum MetaValue {
    /// One stored entry.
    Scalar(Value),
    /// Several stored entries, in order.
    List(Vec<Value>),
    /// One stored entry holding a keyed structure.
    Map(BTreeMap<String, Value>),
}

impl MetaValue {
    /// Returns the entries to store at the destination.
    ///
    /// A list becomes one entry per element; a scalar or a map becomes a
    /// single entry.
    pub fn stored_entries(&self) -> Vec<Value> {
        match self {
            MetaValue::Scalar(v) => vec![v.clone()],
            MetaValue::List(items) => items.clone(),
            MetaValue::Map(entries) => vec![Value::Object(
                entries.iter().map(|(k, v)| (k.clone(), v.clone())).collect::<Map<_, _>>(),
            )],
        }
    }

    /// Returns true if this value writes several entries.
    pub fn is_list(&self) -> bool {
        matches!(self, MetaValue::List(_))
    }
}

impl From<Value> for MetaValue {
    fn from(value: Value) -> Self {
        match value {
            Value::Array(items) => MetaValue::List(items),
            Value::Object(entries) => MetaValue::Map(entries.into_iter().collect()),
            other => MetaValue::Scalar(other),
        }
    }
}

impl From<MetaValue> for Value {
    fn from(value: MetaValue) -> Self {
        match value {
            MetaValue::Scalar(v) => v,
            MetaValue::List(items) => Value::Array(items),
            MetaValue::Map(entries) => Value::Object(entries.into_iter().collect()),
        }
    }
}

impl From<&str> for MetaValue {
    fn from(value: &str) -> Self {
        MetaValue::Scalar(Value::String(value.to_string()))
    }
}
