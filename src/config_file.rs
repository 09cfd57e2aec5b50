//! A registry bound to its JSON file.
//!
//! [`ConfigFile`] owns one root [`RegistryNode`] and moves through
//! `Unloaded → Loaded → (Dirty ⇄ Clean) → Closed`:
//!
//! - [`load()`](ConfigFile::load) resolves the path, reads and decodes the
//!   file, and replaces the in-memory registry (seed values first, file
//!   content on top).
//! - The registry is dirty whenever its content differs from what was last
//!   loaded or saved.
//! - [`save()`](ConfigFile::save) stamps `updated_at`, appends an optional
//!   comment, writes the document, and marks it clean.
//! - Dropping a dirty file saves it once; failures are logged, not raised.
//!   [`close()`](ConfigFile::close) does the same but returns the error.
//!
//! A load that hits malformed JSON or invalid UTF-8 leaves the path
//! *invalid*: `save()` then refuses to write until
//! [`resolve()`](ConfigFile::resolve) or a successful `load()`, so a corrupt
//! but recoverable file is never replaced by an empty registry.

use std::path::{Path, PathBuf};

use serde_json::{Map, Value};
use tracing::{debug, warn};

use crate::builder::{ConfigFileBuilder, Settings};
use crate::codec;
use crate::error::RegistryError;
use crate::file::PathResolver;
use crate::metadata;
use crate::node::{RegistryNode, normalize_key, normalize_keys};
use crate::ops::{self, RegistryResult};
use crate::types::RegistryAction;

#[derive(Debug, Clone, PartialEq)]
enum PathState {
    Unresolved,
    Resolved(PathBuf),
    /// The last load found malformed JSON.
    Invalid,
}

#[derive(Debug)]
pub struct ConfigFile {
    name: String,
    resolver: PathResolver,
    values: Map<String, Value>,
    template: Map<String, Value>,
    autosave: bool,
    registry: RegistryNode,
    state: PathState,
    /// Content as last loaded or saved.
    snapshot: Map<String, Value>,
}

impl ConfigFile {
    pub fn builder() -> ConfigFileBuilder {
        ConfigFileBuilder::new()
    }

    /// Open registry `name`, stored under `path_hint` if that is an existing
    /// directory, otherwise under the user's home (or the next fallback).
    pub fn open(name: &str, path_hint: Option<&Path>) -> Result<Self, RegistryError> {
        let mut builder = Self::builder().name(name);
        if let Some(hint) = path_hint {
            builder = builder.path_hint(hint);
        }
        builder.open()
    }

    pub(crate) fn new(settings: Settings) -> Self {
        let registry = RegistryNode::new(settings.name.clone());
        Self {
            name: settings.name,
            resolver: settings.resolver,
            values: settings.values,
            template: settings.template,
            autosave: settings.autosave,
            registry,
            state: PathState::Unresolved,
            snapshot: Map::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Absolute path of the backing file, once resolved.
    pub fn path(&self) -> Option<&Path> {
        match &self.state {
            PathState::Resolved(path) => Some(path),
            _ => None,
        }
    }

    /// Whether the registry differs from its last loaded or saved state.
    pub fn is_dirty(&self) -> bool {
        self.registry.all() != &self.snapshot
    }

    pub fn registry(&self) -> &RegistryNode {
        &self.registry
    }

    /// Mutable access to the registry. Only actual changes make the file
    /// dirty.
    pub fn registry_mut(&mut self) -> &mut RegistryNode {
        &mut self.registry
    }

    /// Document written when the file does not exist yet.
    fn seed_document(&self) -> Result<String, RegistryError> {
        let mut seed = self.registry.default_schema();
        seed.extend(normalize_keys(self.template.clone()));
        codec::encode(&seed)
    }

    /// Resolve (or re-resolve) the backing file, creating it if missing.
    /// Clears the invalid state left by a failed load.
    pub fn resolve(&mut self) -> Result<PathBuf, RegistryError> {
        let seed = self.seed_document()?;
        match self.resolver.resolve(&self.name, &seed) {
            Ok(path) => {
                self.state = PathState::Resolved(path.clone());
                Ok(path)
            }
            Err(e) => {
                if self.state != PathState::Invalid {
                    self.state = PathState::Unresolved;
                }
                Err(e)
            }
        }
    }

    /// Read the file and replace the in-memory registry with its content,
    /// layered over the configured default values.
    pub fn load(&mut self) -> Result<&RegistryNode, RegistryError> {
        let path = self.resolve()?;

        let bytes = std::fs::read(&path).map_err(|e| {
            self.state = PathState::Unresolved;
            RegistryError::FileSystem {
                path: path.clone(),
                source: e,
            }
        })?;

        // Undecodable bytes, including invalid UTF-8, lock the path.
        let document = match codec::decode_slice(&bytes) {
            Ok(document) => document,
            Err(RegistryError::Parse(source)) => {
                self.state = PathState::Invalid;
                return Err(RegistryError::Config { path, source });
            }
            Err(other) => return Err(other),
        };

        self.registry.replace(self.values.clone());
        self.registry.add(document);
        self.snapshot = self.registry.all().clone();
        debug!(path = %path.display(), entries = self.registry.len(), "loaded registry");
        Ok(&self.registry)
    }

    /// Write the registry to disk, stamping `updated_at` and appending
    /// `comment` to the metadata comment log. Returns the written document.
    pub fn save(&mut self, comment: Option<&str>) -> Result<Map<String, Value>, RegistryError> {
        let path = match &self.state {
            PathState::Resolved(path) => path.clone(),
            PathState::Unresolved => self.resolve()?,
            PathState::Invalid => return Err(RegistryError::Unresolved),
        };

        let now = metadata::timestamp();
        self.registry.touch_at(&now);
        if let Some(text) = comment {
            self.registry.add_comment_at(&now, text);
        }

        let json = codec::encode(self.registry.all())?;
        if let Err(e) = std::fs::write(&path, json) {
            self.state = PathState::Unresolved;
            return Err(RegistryError::FileSystem { path, source: e });
        }
        restrict_permissions(&path);

        self.snapshot = self.registry.all().clone();
        debug!(path = %path.display(), "saved registry");
        Ok(self.snapshot.clone())
    }

    /// Save if dirty and give up the file. Unlike dropping, a failed save is
    /// returned to the caller.
    pub fn close(mut self) -> Result<(), RegistryError> {
        // One attempt only; Drop must not retry.
        self.autosave = false;
        if self.is_dirty() {
            self.save(None)?;
        }
        Ok(())
    }

    /// Run a [`RegistryAction`] against this file.
    pub fn handle(&mut self, action: &RegistryAction) -> Result<RegistryResult, RegistryError> {
        ops::handle(self, action)
    }

    // --- Nodes ---------------------------------------------------------------

    /// The node stored under `id`, created if absent: with `default` if
    /// given, otherwise with a fresh node schema.
    pub fn get_node(&mut self, id: &str, default: Option<Value>) -> Value {
        if let Some(existing) = self.registry.get(id) {
            return existing.clone();
        }

        let value = default.unwrap_or_else(|| {
            Value::Object(self.registry.child(normalize_key(id)).default_schema())
        });
        self.registry.set_value(id, value.clone());
        value
    }

    /// The node stored under `id`. Fails if absent.
    pub fn node(&self, id: &str) -> Result<&Value, RegistryError> {
        self.registry
            .get(id)
            .ok_or_else(|| RegistryError::KeyNotFound(id.into()))
    }

    /// Store `properties` as node `id`, replacing any existing node, and log
    /// it in the comment log.
    pub fn add_node(&mut self, id: &str, properties: Map<String, Value>) -> &mut Self {
        self.set_node(id, properties);
        let comment = format!("Created node \"{}\"", normalize_key(id));
        self.registry.add_comment(&comment);
        self
    }

    /// Store `properties` as node `id` without logging.
    pub fn set_node(&mut self, id: &str, properties: Map<String, Value>) -> &mut Self {
        self.registry
            .set_value(id, Value::Object(normalize_keys(properties)));
        self
    }

    /// Shallow-merge `properties` into node `id`, creating it if absent.
    pub fn merge_node(
        &mut self,
        id: &str,
        properties: Map<String, Value>,
    ) -> Result<&mut Self, RegistryError> {
        self.get_node(id, None);
        let node = self.node_object_mut(id)?;
        node.extend(normalize_keys(properties));
        Ok(self)
    }

    /// Remove node `id`, returning its prior value.
    pub fn remove_node(&mut self, id: &str) -> Result<Value, RegistryError> {
        let removed = self
            .registry
            .take(id)
            .ok_or_else(|| RegistryError::KeyNotFound(id.into()))?;
        let comment = format!("Removed node \"{}\"", normalize_key(id));
        self.registry.add_comment(&comment);
        Ok(removed)
    }

    // --- Node entries --------------------------------------------------------

    /// Entry `entry_id` of node `node_id`. Fails if either is absent.
    pub fn node_entry(&self, node_id: &str, entry_id: &str) -> Result<&Value, RegistryError> {
        let node = self
            .node(node_id)?
            .as_object()
            .ok_or_else(|| RegistryError::NotANode(node_id.into()))?;
        node.get(&normalize_key(entry_id))
            .ok_or_else(|| RegistryError::KeyNotFound(format!("{node_id}.{entry_id}")))
    }

    /// Store `properties` as entry `entry_id` of node `node_id`, creating the
    /// node if absent.
    pub fn add_node_entry(
        &mut self,
        node_id: &str,
        entry_id: &str,
        properties: Map<String, Value>,
    ) -> Result<&mut Self, RegistryError> {
        self.get_node(node_id, None);
        let node = self.node_object_mut(node_id)?;
        node.insert(
            normalize_key(entry_id),
            Value::Object(normalize_keys(properties)),
        );
        Ok(self)
    }

    /// Remove entry `entry_id` from node `node_id`. Returns `false` if
    /// either is absent.
    pub fn remove_node_entry(
        &mut self,
        node_id: &str,
        entry_id: &str,
    ) -> Result<bool, RegistryError> {
        if !self.registry.contains(node_id) {
            return Ok(false);
        }
        Ok(self
            .node_object_mut(node_id)?
            .shift_remove(&normalize_key(entry_id))
            .is_some())
    }

    fn node_object_mut(&mut self, id: &str) -> Result<&mut Map<String, Value>, RegistryError> {
        match self.registry.get_mut(id) {
            Some(Value::Object(node)) => Ok(node),
            Some(_) => Err(RegistryError::NotANode(id.into())),
            None => Err(RegistryError::KeyNotFound(id.into())),
        }
    }
}

impl Drop for ConfigFile {
    fn drop(&mut self) {
        if !self.is_dirty() || !self.autosave || self.state == PathState::Invalid {
            return;
        }
        if let Err(e) = self.save(None) {
            warn!(registry = %self.name, error = %e, "failed to save registry on drop");
        }
    }
}

/// Lock the file down to owner read/write. Best effort.
fn restrict_permissions(path: &Path) {
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;

        if let Err(e) = std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o600)) {
            warn!(path = %path.display(), error = %e, "could not restrict registry permissions");
        }
    }
    #[cfg(not(unix))]
    let _ = path;
}
