//! Registry file discovery and bootstrapping.
//!
//! A registry named `myapp` lives at `<root>/.dreamfactory/myapp.config.json`.
//! The root is picked from a fallback chain of [`RootCandidates`]:
//!
//! 1. the explicit path hint, but only if it is an existing directory;
//! 2. the OS user's home directory (platform user lookup);
//! 3. the `HOME` environment variable;
//! 4. the current working directory;
//! 5. the system temp directory.
//!
//! The first candidate that exists as a directory, or can be created, wins.
//! Later candidates are never consulted once one succeeds.
//!
//! Once a root is chosen the base directory is created if needed, and if the
//! registry file itself is missing it is written with the seed document the
//! caller supplies.

use std::fs::DirBuilder;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::RegistryError;
use crate::types::{DEFAULT_BASE_DIR, DEFAULT_SUFFIX};

/// The root directories the resolver may choose from, in preference order.
///
/// Plain data so the chain can be exercised with synthetic directories;
/// [`RootCandidates::from_system`] fills it from the running process.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RootCandidates {
    pub explicit: Option<PathBuf>,
    pub user_home: Option<PathBuf>,
    pub home_env: Option<PathBuf>,
    pub cwd: Option<PathBuf>,
    pub temp: Option<PathBuf>,
}

impl RootCandidates {
    /// Collect candidates from the OS, environment, and process state.
    pub fn from_system(explicit: Option<&Path>) -> Self {
        Self {
            explicit: explicit.and_then(|p| std::path::absolute(p).ok()),
            user_home: directories::UserDirs::new().map(|u| u.home_dir().to_path_buf()),
            home_env: std::env::var_os("HOME")
                .filter(|h| !h.is_empty())
                .map(PathBuf::from),
            cwd: std::env::current_dir().ok(),
            temp: Some(std::env::temp_dir()),
        }
    }

    /// Pick the root directory. Creating a fallback directory is allowed;
    /// the explicit hint is only used if it already exists.
    pub fn choose(&self) -> Result<PathBuf, RegistryError> {
        let mut tried = Vec::new();

        if let Some(hint) = &self.explicit {
            if hint.is_dir() {
                debug!(root = %hint.display(), "using explicit registry path");
                return Ok(hint.clone());
            }
            tried.push(hint.clone());
        }

        let fallbacks = [&self.user_home, &self.home_env, &self.cwd, &self.temp];
        for candidate in fallbacks.into_iter().flatten() {
            if candidate.is_dir() || std::fs::create_dir_all(candidate).is_ok() {
                debug!(root = %candidate.display(), "using fallback registry root");
                return Ok(candidate.clone());
            }
            tried.push(candidate.clone());
        }

        Err(RegistryError::NoBaseDirectory { tried })
    }
}

/// Locates registry files and makes sure they exist.
#[derive(Debug, Clone)]
pub struct PathResolver {
    roots: RootCandidates,
    base_dir: String,
    suffix: String,
}

impl PathResolver {
    pub fn new(roots: RootCandidates) -> Self {
        Self {
            roots,
            base_dir: DEFAULT_BASE_DIR.into(),
            suffix: DEFAULT_SUFFIX.into(),
        }
    }

    pub fn base_dir(mut self, base_dir: &str) -> Self {
        self.base_dir = base_dir.to_string();
        self
    }

    pub fn suffix(mut self, suffix: &str) -> Self {
        self.suffix = suffix.to_string();
        self
    }

    pub fn file_name(&self, name: &str) -> String {
        format!("{name}{}", self.suffix)
    }

    /// Resolve the absolute path of registry `name`, creating the base
    /// directory and, if missing, the file (with `seed` as its content).
    pub fn resolve(&self, name: &str, seed: &str) -> Result<PathBuf, RegistryError> {
        let base = self.roots.choose()?.join(&self.base_dir);
        ensure_dir(&base)?;

        let file = base.join(self.file_name(name));
        ensure_file(&file, seed)?;
        Ok(file)
    }
}

/// Create `dir` recursively with permissive mode (0777 before umask).
fn ensure_dir(dir: &Path) -> Result<(), RegistryError> {
    if dir.is_dir() {
        return Ok(());
    }

    let mut builder = DirBuilder::new();
    builder.recursive(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::DirBuilderExt;
        builder.mode(0o777);
    }

    builder.create(dir).map_err(|e| RegistryError::FileSystem {
        path: dir.to_path_buf(),
        source: e,
    })?;
    debug!(dir = %dir.display(), "created registry directory");
    Ok(())
}

/// Write `seed` to `file` unless it already exists.
fn ensure_file(file: &Path, seed: &str) -> Result<(), RegistryError> {
    if file.exists() {
        return Ok(());
    }

    std::fs::write(file, seed).map_err(|e| RegistryError::FileSystem {
        path: file.to_path_buf(),
        source: e,
    })?;
    debug!(file = %file.display(), "created registry file");
    Ok(())
}
