//! The `_metadata` block stored inside every node.
//!
//! ```json
//! "_metadata": {
//!     "node_id": "myapp",
//!     "parent_id": null,
//!     "comments": { "2014-06-01T10:00:00+00:00": "Creation" },
//!     "updated_at": "2014-06-01T10:00:00+00:00"
//! }
//! ```
//!
//! Comments are keyed by timestamp at second resolution. Two comments added
//! within the same second share a key and the later one wins.

use chrono::{Local, SecondsFormat};
use serde_json::{Map, Value};

pub const NODE_ID: &str = "node_id";
pub const PARENT_ID: &str = "parent_id";
pub const COMMENTS: &str = "comments";
pub const UPDATED_AT: &str = "updated_at";

/// Comment recorded when a node is first created.
pub const CREATION_COMMENT: &str = "Creation";

/// Current local time as ISO-8601 with offset, e.g. `2014-06-01T10:00:00+02:00`.
pub fn timestamp() -> String {
    Local::now().to_rfc3339_opts(SecondsFormat::Secs, false)
}

/// An empty metadata block: no comments yet, `updated_at` set to `now`.
pub fn block(node_id: &str, parent_id: Option<&str>, now: &str) -> Map<String, Value> {
    let mut block = Map::new();
    block.insert(NODE_ID.into(), Value::String(node_id.into()));
    block.insert(
        PARENT_ID.into(),
        parent_id.map_or(Value::Null, |p| Value::String(p.into())),
    );
    block.insert(COMMENTS.into(), Value::Object(Map::new()));
    block.insert(UPDATED_AT.into(), Value::String(now.into()));
    block
}

/// A fresh metadata block carrying a single creation comment.
pub fn schema(node_id: &str, parent_id: Option<&str>, now: &str) -> Map<String, Value> {
    let mut block = block(node_id, parent_id, now);
    add_comment(&mut block, now, CREATION_COMMENT);
    block
}

/// Append `text` to the block's comment log under `at`.
///
/// A non-object `comments` value (hand-edited file) is replaced.
pub fn add_comment(block: &mut Map<String, Value>, at: &str, text: &str) {
    let comments = block
        .entry(COMMENTS)
        .or_insert_with(|| Value::Object(Map::new()));
    if !comments.is_object() {
        *comments = Value::Object(Map::new());
    }
    if let Value::Object(log) = comments {
        log.insert(at.to_string(), Value::String(text.into()));
    }
}

/// All comments in insertion order. Non-string entries are skipped.
pub fn comments(block: &Map<String, Value>) -> Vec<(String, String)> {
    block
        .get(COMMENTS)
        .and_then(Value::as_object)
        .map(|log| {
            log.iter()
                .filter_map(|(at, text)| Some((at.clone(), text.as_str()?.to_string())))
                .collect()
        })
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn timestamp_is_iso8601_seconds() {
        let ts = timestamp();
        assert!(chrono::DateTime::parse_from_rfc3339(&ts).is_ok(), "{ts}");
        assert!(!ts.contains('.'), "no fractional seconds: {ts}");
    }

    #[test]
    fn schema_has_expected_shape() {
        let block = schema("myapp", None, "2014-06-01T10:00:00+00:00");
        assert_eq!(
            Value::Object(block),
            json!({
                "node_id": "myapp",
                "parent_id": null,
                "comments": {"2014-06-01T10:00:00+00:00": "Creation"},
                "updated_at": "2014-06-01T10:00:00+00:00"
            })
        );
    }

    #[test]
    fn block_starts_without_comments() {
        let block = block("myapp", None, "t");
        assert!(comments(&block).is_empty());
        assert_eq!(block[UPDATED_AT], json!("t"));
    }

    #[test]
    fn schema_records_parent() {
        let block = schema("db", Some("myapp"), "t");
        assert_eq!(block[PARENT_ID], json!("myapp"));
    }

    #[test]
    fn add_comment_creates_log() {
        let mut block = Map::new();
        add_comment(&mut block, "t1", "first");
        assert_eq!(block[COMMENTS], json!({"t1": "first"}));
    }

    #[test]
    fn add_comment_appends_in_order() {
        let mut block = schema("myapp", None, "t0");
        add_comment(&mut block, "t1", "one");
        add_comment(&mut block, "t2", "two");
        let log = comments(&block);
        assert_eq!(
            log,
            vec![
                ("t0".to_string(), "Creation".to_string()),
                ("t1".to_string(), "one".to_string()),
                ("t2".to_string(), "two".to_string()),
            ]
        );
    }

    #[test]
    fn same_timestamp_last_write_wins() {
        let mut block = Map::new();
        add_comment(&mut block, "t1", "first");
        add_comment(&mut block, "t1", "second");
        assert_eq!(comments(&block), vec![("t1".to_string(), "second".to_string())]);
    }

    #[test]
    fn add_comment_replaces_non_object_log() {
        let mut block = Map::new();
        block.insert(COMMENTS.into(), json!(["legacy"]));
        add_comment(&mut block, "t1", "fresh");
        assert_eq!(block[COMMENTS], json!({"t1": "fresh"}));
    }
}
