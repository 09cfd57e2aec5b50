//! Registry operations: listing, key lookup, set/unset, and result types.
//!
//! Provides the logic behind `registry list`, `registry get`, `registry set`,
//! `registry unset`, and `registry comment`, and the `RegistryResult` enum
//! that callers use to display results.
//!
//! Keys are dotted paths into nested nodes (`servers.db.host`). Writes are
//! saved immediately, with an audit comment in the metadata log.

use std::fmt;

use serde_json::{Map, Value};

use crate::config_file::ConfigFile;
use crate::error::RegistryError;
use crate::node::normalize_key;
use crate::types::{METADATA_KEY, RegistryAction};

/// Result of a registry operation. Returned to the caller for display.
#[derive(Debug, Clone, PartialEq)]
pub enum RegistryResult {
    /// All top-level entries, metadata excluded.
    Listing { entries: Vec<(String, String)> },
    /// A key's stored value.
    KeyValue { key: String, value: String },
    /// Confirmation that a value was persisted.
    ValueSet { key: String, value: String },
    /// Confirmation that a value was removed.
    ValueUnset { key: String },
    /// Confirmation that a comment was logged.
    Commented { text: String },
}

impl fmt::Display for RegistryResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RegistryResult::Listing { entries } => {
                for (i, (key, value)) in entries.iter().enumerate() {
                    if i > 0 {
                        writeln!(f)?;
                    }
                    write!(f, "{key} = {value}")?;
                }
                Ok(())
            }
            RegistryResult::KeyValue { key, value } => write!(f, "{key} = {value}"),
            RegistryResult::ValueSet { key, value } => write!(f, "Set {key} = {value}"),
            RegistryResult::ValueUnset { key } => write!(f, "Unset {key}"),
            RegistryResult::Commented { text } => write!(f, "Logged \"{text}\""),
        }
    }
}

/// Run `action` against `file`. Mutating actions save before returning.
pub fn handle(
    file: &mut ConfigFile,
    action: &RegistryAction,
) -> Result<RegistryResult, RegistryError> {
    match action {
        RegistryAction::List => Ok(list_values(file)),
        RegistryAction::Get { key } => get_value(file, key),
        RegistryAction::Set { key, value } => {
            let parsed = parse_value(value);
            set_value(file.registry_mut().all_mut(), key, parsed.clone())?;
            file.save(Some(&format!("Set \"{}\"", normalize_path(key))))?;
            Ok(RegistryResult::ValueSet {
                key: key.clone(),
                value: format_value(&parsed),
            })
        }
        RegistryAction::Unset { key } => {
            // A missing key is an error, not an empty save.
            if value_at(file.registry().all(), key).is_none() {
                return Err(RegistryError::KeyNotFound(key.clone()));
            }
            unset_value(file.registry_mut().all_mut(), key)?;
            file.save(Some(&format!("Unset \"{}\"", normalize_path(key))))?;
            Ok(RegistryResult::ValueUnset { key: key.clone() })
        }
        RegistryAction::Comment { text } => {
            file.save(Some(text))?;
            Ok(RegistryResult::Commented { text: text.clone() })
        }
    }
}

/// Every top-level entry except the metadata block.
pub fn list_values(file: &ConfigFile) -> RegistryResult {
    let entries = file
        .registry()
        .iter()
        .filter(|(key, _)| key.as_str() != METADATA_KEY)
        .map(|(key, value)| (key.clone(), format_value(value)))
        .collect();
    RegistryResult::Listing { entries }
}

/// Look up a value by dotted key.
pub fn get_value(file: &ConfigFile, key: &str) -> Result<RegistryResult, RegistryError> {
    let value = value_at(file.registry().all(), key)
        .ok_or_else(|| RegistryError::KeyNotFound(key.into()))?;
    Ok(RegistryResult::KeyValue {
        key: key.into(),
        value: format_value(value),
    })
}

/// Navigate a mapping by dotted key path (e.g. `"servers.db.host"`).
/// Each segment is normalized before lookup.
pub fn value_at<'a>(map: &'a Map<String, Value>, dotted_key: &str) -> Option<&'a Value> {
    let (path, leaf) = match dotted_key.rsplit_once('.') {
        Some((p, l)) => (Some(p), l),
        None => (None, dotted_key),
    };

    let node = match path {
        Some(path) => {
            let mut current = map;
            for segment in path.split('.') {
                current = current.get(&normalize_key(segment))?.as_object()?;
            }
            current
        }
        None => map,
    };

    node.get(&normalize_key(leaf))
}

/// Store `value` at a dotted key, creating intermediate nodes as needed.
/// Fails with `NotANode` if a segment on the way holds a non-object.
pub fn set_value(
    map: &mut Map<String, Value>,
    dotted_key: &str,
    value: Value,
) -> Result<(), RegistryError> {
    let (path, leaf) = match dotted_key.rsplit_once('.') {
        Some((p, l)) => (Some(p), l),
        None => (None, dotted_key),
    };

    let mut current = map;
    if let Some(path) = path {
        for segment in path.split('.') {
            let slot = current
                .entry(normalize_key(segment))
                .or_insert_with(|| Value::Object(Map::new()));
            current = match slot {
                Value::Object(inner) => inner,
                _ => return Err(RegistryError::NotANode(segment.into())),
            };
        }
    }
    current.insert(normalize_key(leaf), value);
    Ok(())
}

/// Remove the value at a dotted key. Returns whether anything was removed.
pub fn unset_value(map: &mut Map<String, Value>, dotted_key: &str) -> Result<bool, RegistryError> {
    let (path, leaf) = match dotted_key.rsplit_once('.') {
        Some((p, l)) => (Some(p), l),
        None => (None, dotted_key),
    };

    let mut current = map;
    if let Some(path) = path {
        for segment in path.split('.') {
            current = match current.get_mut(&normalize_key(segment)) {
                Some(Value::Object(inner)) => inner,
                Some(_) => return Err(RegistryError::NotANode(segment.into())),
                None => return Ok(false),
            };
        }
    }
    Ok(current.shift_remove(&normalize_key(leaf)).is_some())
}

/// Interpret a command-line string as a JSON value: booleans, `null`,
/// integers, decimals, and JSON objects or arrays are recognized; anything
/// else is stored as a string.
pub fn parse_value(raw: &str) -> Value {
    match raw {
        "true" => return Value::Bool(true),
        "false" => return Value::Bool(false),
        "null" => return Value::Null,
        _ => {}
    }
    if let Ok(i) = raw.parse::<i64>() {
        return Value::from(i);
    }
    if raw.contains('.') {
        if let Some(n) = raw.parse::<f64>().ok().and_then(serde_json::Number::from_f64) {
            return Value::Number(n);
        }
    }
    match serde_json::from_str::<Value>(raw) {
        Ok(v @ (Value::Object(_) | Value::Array(_))) => v,
        _ => Value::String(raw.to_string()),
    }
}

/// Format a value for display. Strings print bare; everything else as
/// compact JSON.
pub fn format_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn normalize_path(dotted_key: &str) -> String {
    dotted_key
        .split('.')
        .map(normalize_key)
        .collect::<Vec<_>>()
        .join(".")
}
