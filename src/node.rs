//! The in-memory registry node: an ordered, case-insensitive key-value map
//! with a reserved `_metadata` entry.
//!
//! Every key is lower-cased before it is stored or looked up, so `Host`,
//! `HOST`, and `host` all address the same entry. Values are plain
//! [`serde_json::Value`]s; anything `Serialize` can be stored via
//! [`RegistryNode::set`].

use serde::Serialize;
use serde_json::{Map, Value};

use crate::codec;
use crate::error::RegistryError;
use crate::metadata;
use crate::types::METADATA_KEY;

/// Normalize a key for storage and lookup.
pub fn normalize_key(key: &str) -> String {
    key.to_lowercase()
}

/// Rebuild a mapping with every top-level key normalized.
/// Later keys win when two normalize to the same form.
pub(crate) fn normalize_keys(map: Map<String, Value>) -> Map<String, Value> {
    map.into_iter()
        .map(|(k, v)| (normalize_key(&k), v))
        .collect()
}

/// A named container of entries, optionally nested under a parent node.
#[derive(Debug, Clone, PartialEq)]
pub struct RegistryNode {
    id: String,
    parent_id: Option<String>,
    entries: Map<String, Value>,
}

impl RegistryNode {
    /// An empty top-level node.
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            parent_id: None,
            entries: Map::new(),
        }
    }

    /// A node seeded with `entries` (keys are normalized).
    pub fn with_entries(id: impl Into<String>, entries: Map<String, Value>) -> Self {
        let mut node = Self::new(id);
        node.add(entries);
        node
    }

    /// An empty node whose parent is this node.
    pub fn child(&self, id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            parent_id: Some(self.id.clone()),
            entries: Map::new(),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn parent_id(&self) -> Option<&str> {
        self.parent_id.as_deref()
    }

    /// Look up `key`. Returns `None` if absent.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.entries.get(&normalize_key(key))
    }

    /// Look up `key`, falling back to `default` if absent.
    pub fn get_or(&self, key: &str, default: Value) -> Value {
        self.get(key).cloned().unwrap_or(default)
    }

    pub fn get_mut(&mut self, key: &str) -> Option<&mut Value> {
        self.entries.get_mut(&normalize_key(key))
    }

    /// Burn after reading: remove `key` and return its value.
    pub fn take(&mut self, key: &str) -> Option<Value> {
        self.entries.shift_remove(&normalize_key(key))
    }

    /// Like [`take`](Self::take), falling back to `default` if absent.
    pub fn take_or(&mut self, key: &str, default: Value) -> Value {
        self.take(key).unwrap_or(default)
    }

    /// Store `value` under `key`, replacing whatever was there.
    ///
    /// Fails with [`RegistryError::Encoding`] if `value` has no JSON form
    /// (e.g. a map with non-string keys).
    pub fn set<V: Serialize>(&mut self, key: &str, value: V) -> Result<&mut Self, RegistryError> {
        let value = to_value(key, value)?;
        Ok(self.set_value(key, value))
    }

    /// Store `value` under `key` only if the key is not present yet.
    ///
    /// Fails with [`RegistryError::Overwrite`] if it is; the stored value is
    /// left untouched.
    pub fn set_new<V: Serialize>(
        &mut self,
        key: &str,
        value: V,
    ) -> Result<&mut Self, RegistryError> {
        if self.contains(key) {
            return Err(RegistryError::Overwrite { key: key.into() });
        }
        self.set(key, value)
    }

    pub fn set_value(&mut self, key: &str, value: Value) -> &mut Self {
        self.entries.insert(normalize_key(key), value);
        self
    }

    /// The normalized form of `key` if it is present.
    pub fn has(&self, key: &str) -> Option<String> {
        let normalized = normalize_key(key);
        self.entries.contains_key(&normalized).then_some(normalized)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.has(key).is_some()
    }

    /// Remove `key`. Returns `true` if it was present.
    pub fn remove(&mut self, key: &str) -> bool {
        self.take(key).is_some()
    }

    /// Shallow merge: each incoming key replaces the stored one.
    pub fn add<I>(&mut self, values: I) -> &mut Self
    where
        I: IntoIterator<Item = (String, Value)>,
    {
        for (key, value) in values {
            self.set_value(&key, value);
        }
        self
    }

    /// Replace the entire content with `entries` (keys are normalized).
    pub fn replace(&mut self, entries: Map<String, Value>) -> &mut Self {
        self.entries = normalize_keys(entries);
        self
    }

    pub fn clear(&mut self) -> &mut Self {
        self.entries.clear();
        self
    }

    /// Append a timestamped comment to this node's metadata.
    pub fn add_comment(&mut self, text: &str) -> &mut Self {
        self.add_comment_at(&metadata::timestamp(), text)
    }

    pub(crate) fn add_comment_at(&mut self, at: &str, text: &str) -> &mut Self {
        metadata::add_comment(self.metadata_mut(), at, text);
        self
    }

    /// Stamp the metadata's `updated_at` with the current time.
    pub fn touch(&mut self) -> &mut Self {
        self.touch_at(&metadata::timestamp())
    }

    pub(crate) fn touch_at(&mut self, at: &str) -> &mut Self {
        self.metadata_mut()
            .insert(metadata::UPDATED_AT.into(), Value::String(at.into()));
        self
    }

    /// Comment log as `(timestamp, text)` pairs, oldest first.
    pub fn comments(&self) -> Vec<(String, String)> {
        self.metadata().map(metadata::comments).unwrap_or_default()
    }

    pub fn updated_at(&self) -> Option<&str> {
        self.metadata()?.get(metadata::UPDATED_AT)?.as_str()
    }

    /// The metadata block, if one has been created.
    pub fn metadata(&self) -> Option<&Map<String, Value>> {
        self.entries.get(METADATA_KEY)?.as_object()
    }

    /// The metadata block, created on first access. A non-object value
    /// under the reserved key is replaced.
    fn metadata_mut(&mut self) -> &mut Map<String, Value> {
        let id = self.id.clone();
        let parent = self.parent_id.clone();
        let slot = self
            .entries
            .entry(METADATA_KEY)
            .or_insert_with(|| Value::Null);
        if !slot.is_object() {
            *slot = Value::Object(metadata::block(
                &id,
                parent.as_deref(),
                &metadata::timestamp(),
            ));
        }
        match slot {
            Value::Object(block) => block,
            _ => unreachable!("metadata slot was just set to an object"),
        }
    }

    /// The skeleton used to seed a new node: a metadata block with a single
    /// creation comment.
    pub fn default_schema(&self) -> Map<String, Value> {
        let mut schema = Map::new();
        schema.insert(
            METADATA_KEY.into(),
            Value::Object(metadata::schema(
                &self.id,
                self.parent_id.as_deref(),
                &metadata::timestamp(),
            )),
        );
        schema
    }

    /// The entire content of the node.
    pub fn all(&self) -> &Map<String, Value> {
        &self.entries
    }

    /// Raw mutable access to the entries. Keys inserted here bypass
    /// normalization; callers normalize them first.
    pub(crate) fn all_mut(&mut self) -> &mut Map<String, Value> {
        &mut self.entries
    }

    /// The entire content as pretty-printed JSON.
    pub fn to_json(&self) -> Result<String, RegistryError> {
        codec::encode(&self.entries)
    }

    pub fn into_entries(self) -> Map<String, Value> {
        self.entries
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn iter(&self) -> serde_json::map::Iter<'_> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<'a> IntoIterator for &'a RegistryNode {
    type Item = (&'a String, &'a Value);
    type IntoIter = serde_json::map::Iter<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

fn to_value<V: Serialize>(key: &str, value: V) -> Result<Value, RegistryError> {
    serde_json::to_value(value).map_err(|source| RegistryError::Encoding {
        key: key.into(),
        source,
    })
}
