//! JSON-backed configuration registries for DreamFactory console tools.
//! Name a registry, open it, and read or write keys.
//!
//! A registry is an ordered, case-insensitive key-value store persisted as a
//! single pretty-printed JSON file. Each registry carries a `_metadata` block
//! with its identity, an `updated_at` timestamp, and a timestamped comment
//! log that doubles as an audit trail.
//!
//! ```ignore
//! let mut config = ConfigFile::open("dfadmin", None)?;
//! config.registry_mut().set("endpoint", "http://localhost/rest")?;
//! config.save(Some("Pointed at local instance"))?;
//! ```
//!
//! That call finds (or creates) `~/.dreamfactory/dfadmin.config.json`, loads
//! it, and on `save` writes it back with a fresh `updated_at` and the comment
//! appended to the log.
//!
//! # File layout
//!
//! ```text
//! {
//!     "_metadata": {
//!         "node_id": "dfadmin",
//!         "parent_id": null,
//!         "comments": { "2024-05-01T10:00:00+02:00": "Creation" },
//!         "updated_at": "2024-05-01T10:00:00+02:00"
//!     },
//!     "endpoint": "http://localhost/rest"
//! }
//! ```
//!
//! Files are indented with four spaces, keep their key order, and never
//! escape forward slashes. After every write the file is restricted to mode
//! `0600` on Unix.
//!
//! # Where files live
//!
//! The root directory is taken from the first usable candidate:
//!
//! 1. the path hint passed to [`ConfigFile::open`] or
//!    [`path_hint()`](ConfigFileBuilder::path_hint), if it is an existing
//!    directory;
//! 2. the OS user's home directory;
//! 3. `$HOME`;
//! 4. the current working directory;
//! 5. the system temp directory.
//!
//! Under that root, `.dreamfactory/` is created if needed, and a missing
//! registry file is seeded with a metadata block holding a single
//! `"Creation"` comment. See [`RootCandidates`] and [`PathResolver`].
//!
//! # Nodes
//!
//! Top-level entries that are JSON objects are *nodes*. A node created
//! through [`ConfigFile::get_node`] gets its own `_metadata` block naming the
//! registry as its parent. Nodes hold *entries*: keyed objects managed with
//! [`add_node_entry`](ConfigFile::add_node_entry) and friends.
//!
//! # Lifecycle
//!
//! [`ConfigFile`] tracks whether the in-memory registry differs from disk.
//! Dropping a dirty file saves it once; failures are logged through
//! `tracing` rather than raised. Use [`close()`](ConfigFile::close) to get
//! the error instead, or turn autosave off with
//! [`autosave(false)`](ConfigFileBuilder::autosave).
//!
//! A file with malformed JSON fails to load and is never overwritten
//! implicitly: `save()` returns [`RegistryError::Unresolved`] until
//! [`resolve()`](ConfigFile::resolve) or a successful `load()`.
//!
//! # Actions and the clap adapter
//!
//! [`RegistryAction`] describes `list`, `get`, `set`, `unset`, and `comment`
//! independently of any CLI framework; [`ConfigFile::handle`] runs one and
//! returns a displayable [`RegistryResult`]. With the `clap` feature (on by
//! default), [`RegistryArgs`] gives an application those subcommands with no
//! boilerplate. To use the crate without clap:
//!
//! ```toml
//! dfregistry = { version = "...", default-features = false }
//! ```
//!
//! # Error handling
//!
//! All fallible operations return [`RegistryError`]. Errors carry the path
//! or key involved. See the [`error`] module for the full set.

pub mod error;
pub mod types;

mod builder;
#[cfg(feature = "clap")]
mod cli;
pub mod codec;
mod config_file;
mod file;
pub mod metadata;
mod node;
mod ops;

#[cfg(test)]
mod fixtures;

pub use builder::{ConfigFileBuilder, normalize_name};
#[cfg(feature = "clap")]
pub use cli::{RegistryArgs, RegistrySubcommand};
pub use config_file::ConfigFile;
pub use error::RegistryError;
pub use file::{PathResolver, RootCandidates};
pub use node::{RegistryNode, normalize_key};
pub use ops::{RegistryResult, format_value, parse_value, value_at};
pub use types::{DEFAULT_BASE_DIR, DEFAULT_SUFFIX, METADATA_KEY, RegistryAction};
