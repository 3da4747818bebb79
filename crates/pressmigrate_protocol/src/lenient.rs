//! Deserializers for the loosely typed JSON the source emits.
//!
//! The source encoder writes an empty map as `[]`, database ids as numeric
//! strings and absent text as `null`. These helpers normalize all of that at
//! the decoding boundary so the rest of the workspace sees plain types.

use serde::de::{DeserializeOwned, Deserializer, Error};
use serde::Deserialize;
use serde_json::Value;
use std::collections::BTreeMap;

/// Interprets a JSON value as a non-negative integer id.
///
/// Accepts integers, integral floats and numeric strings (surrounding
/// whitespace is ignored). Returns `None` for anything else.
pub fn parse_id(value: &Value) -> Option<u64> {
    match value {
        Value::Number(n) => n.as_u64().or_else(|| {
            n.as_f64()
                .filter(|f| *f >= 0.0 && f.fract() == 0.0 && *f <= u64::MAX as f64)
                .map(|f| f as u64)
        }),
        Value::String(s) => {
            let s = s.trim();
            s.parse::<u64>().ok().or_else(|| {
                s.parse::<f64>()
                    .ok()
                    .filter(|f| *f >= 0.0 && f.fract() == 0.0 && *f <= u64::MAX as f64)
                    .map(|f| f as u64)
            })
        }
        _ => None,
    }
}

/// A required id.
pub(crate) fn id<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u64, D::Error> {
    let value = Value::deserialize(deserializer)?;
    parse_id(&value).ok_or_else(|| D::Error::custom(format!("expected an integer id, found {value}")))
}

/// An id where `null`, empty or unparsable input means 0.
pub(crate) fn id_or_zero<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u64, D::Error> {
    let value = Value::deserialize(deserializer)?;
    Ok(parse_id(&value).unwrap_or(0))
}

/// An optional id where 0 counts as absent.
pub(crate) fn opt_id<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<u64>, D::Error> {
    let value = Value::deserialize(deserializer)?;
    Ok(parse_id(&value).filter(|id| *id > 0))
}

/// A list of ids, each possibly a numeric string.
pub(crate) fn id_list<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u64>, D::Error> {
    let value = Value::deserialize(deserializer)?;
    match value {
        Value::Null => Ok(Vec::new()),
        Value::Array(items) => items
            .iter()
            .map(|v| parse_id(v).ok_or_else(|| D::Error::custom(format!("expected an integer id, found {v}"))))
            .collect(),
        other => Err(D::Error::custom(format!("expected a list of ids, found {other}"))),
    }
}

/// A signed integer that may arrive as a string.
pub(crate) fn int<'de, D: Deserializer<'de>>(deserializer: D) -> Result<i64, D::Error> {
    let value = Value::deserialize(deserializer)?;
    Ok(match &value {
        Value::Number(n) => n.as_i64().unwrap_or(0),
        Value::String(s) => s.trim().parse().unwrap_or(0),
        _ => 0,
    })
}

/// Text where `null` becomes empty and scalars are stringified.
pub(crate) fn text<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    let value = Value::deserialize(deserializer)?;
    Ok(match value {
        Value::Null => String::new(),
        Value::String(s) => s,
        Value::Bool(b) => if b { "1".into() } else { String::new() },
        Value::Number(n) => n.to_string(),
        other => return Err(D::Error::custom(format!("expected text, found {other}"))),
    })
}

/// A string list that may arrive as an index-keyed map.
pub(crate) fn string_list<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<String>, D::Error> {
    let value = Value::deserialize(deserializer)?;
    let items: Vec<Value> = match value {
        Value::Null => return Ok(Vec::new()),
        Value::Array(items) => items,
        Value::Object(map) => map.into_iter().map(|(_, v)| v).collect(),
        Value::String(s) => vec![Value::String(s)],
        other => return Err(D::Error::custom(format!("expected a list of strings, found {other}"))),
    };
    Ok(items
        .into_iter()
        .filter_map(|v| match v {
            Value::String(s) => Some(s),
            _ => None,
        })
        .collect())
}

/// A string-keyed map where `[]` and `null` mean empty.
pub(crate) fn map<'de, D, T>(deserializer: D) -> Result<BTreeMap<String, T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let value = Value::deserialize(deserializer)?;
    map_from_value(value).map_err(D::Error::custom)
}

/// Converts an already-decoded value with the same rules as [`map`].
pub(crate) fn map_from_value<T: DeserializeOwned>(
    value: Value,
) -> Result<BTreeMap<String, T>, serde_json::Error> {
    match value {
        Value::Null => Ok(BTreeMap::new()),
        Value::Array(items) => items
            .into_iter()
            .enumerate()
            .map(|(i, v)| serde_json::from_value(v).map(|t| (i.to_string(), t)))
            .collect(),
        Value::Object(entries) => entries
            .into_iter()
            .map(|(k, v)| serde_json::from_value(v).map(|t| (k, t)))
            .collect(),
        other => Err(serde_json::Error::custom(format!("expected a map, found {other}"))),
    }
}
