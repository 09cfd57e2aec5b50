use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("Failed to access {path}: {source}")]
    FileSystem {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Malformed JSON document: {0}")]
    Parse(#[source] serde_json::Error),

    #[error("Invalid configuration file {path}: {source}")]
    Config {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("The key '{key}' exists and overwrite is disabled")]
    Overwrite { key: String },

    #[error("Key not found: {0}")]
    KeyNotFound(String),

    #[error("Value for '{key}' cannot be stored as JSON: {source}")]
    Encoding {
        key: String,
        source: serde_json::Error,
    },

    #[error("'{0}' is not a node (expected a JSON object)")]
    NotANode(String),

    #[error("Config path is unresolved after a failed load — call .resolve() or .load() first")]
    Unresolved,

    #[error("No usable base directory found (tried: {})", display_paths(.tried))]
    NoBaseDirectory { tried: Vec<PathBuf> },

    #[error("Registry name is required — call .name() on the builder")]
    NameRequired,

    #[error("Invalid registry name '{0}'")]
    InvalidName(String),

    #[error("Invalid file suffix '{0}' (must start with '.')")]
    InvalidSuffix(String),

    #[error("Invalid base directory '{0}' (must be a single relative path segment)")]
    InvalidBaseDir(String),

    #[error("Invalid registry settings")]
    InvalidSettings(Vec<RegistryError>),
}

fn display_paths(paths: &[PathBuf]) -> String {
    if paths.is_empty() {
        return "nothing".into();
    }
    paths
        .iter()
        .map(|p| p.display().to_string())
        .collect::<Vec<_>>()
        .join(", ")
}
