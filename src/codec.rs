//! JSON document codec for registry files.
//!
//! Pure functions, no I/O. Documents are always JSON objects at the root and
//! keep their key order (`serde_json` is built with `preserve_order`).
//! Encoding uses four-space indentation, the layout existing registry files
//! were written with; forward slashes are never escaped.

use serde::Serialize;
use serde::de::Error as _;
use serde_json::{Map, Value};
use serde_json::ser::PrettyFormatter;

use crate::error::RegistryError;

const INDENT: &[u8] = b"    ";

/// Encode a mapping as pretty-printed JSON.
pub fn encode(document: &Map<String, Value>) -> Result<String, RegistryError> {
    let mut buf = Vec::new();
    let mut ser =
        serde_json::Serializer::with_formatter(&mut buf, PrettyFormatter::with_indent(INDENT));
    document
        .serialize(&mut ser)
        .map_err(|source| RegistryError::Encoding {
            key: "<document>".into(),
            source,
        })?;
    // serde_json only emits valid UTF-8.
    String::from_utf8(buf).map_err(|e| RegistryError::Encoding {
        key: "<document>".into(),
        source: serde_json::Error::custom(e),
    })
}

/// Decode JSON text into a mapping.
///
/// Whitespace-only text and the empty array `[]` (what older tools wrote for
/// an empty registry) both decode to an empty mapping. Any other non-object
/// root is rejected.
pub fn decode(text: &str) -> Result<Map<String, Value>, RegistryError> {
    decode_slice(text.as_bytes())
}

/// Decode raw file bytes. Invalid UTF-8 is a [`RegistryError::Parse`] like
/// any other malformed input.
pub fn decode_slice(bytes: &[u8]) -> Result<Map<String, Value>, RegistryError> {
    if bytes.iter().all(u8::is_ascii_whitespace) {
        return Ok(Map::new());
    }

    match serde_json::from_slice::<Value>(bytes).map_err(RegistryError::Parse)? {
        Value::Object(map) => Ok(map),
        Value::Array(items) if items.is_empty() => Ok(Map::new()),
        other => Err(RegistryError::Parse(serde_json::Error::custom(format!(
            "document root must be an object, found {}",
            kind_of(&other)
        )))),
    }
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
