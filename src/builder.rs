use std::path::PathBuf;

use serde_json::{Map, Value};

use crate::config_file::ConfigFile;
use crate::error::RegistryError;
use crate::file::{PathResolver, RootCandidates};
use crate::types::{DEFAULT_BASE_DIR, DEFAULT_SUFFIX};

/// Builder for opening a [`ConfigFile`].
///
/// Every setting is a typed field. Nothing is checked until
/// [`open()`](Self::open), which validates all settings together and reports
/// every problem at once.
///
/// ```ignore
/// let config = ConfigFile::builder()
///     .name("fabric")
///     .path_hint("/etc/dreamfactory")
///     .values(defaults)
///     .open()?;
/// ```
#[derive(Debug, Clone)]
pub struct ConfigFileBuilder {
    name: Option<String>,
    path_hint: Option<PathBuf>,
    roots: Option<RootCandidates>,
    base_dir: String,
    suffix: String,
    values: Map<String, Value>,
    template: Map<String, Value>,
    autosave: bool,
    normalize_name: bool,
}

/// Validated settings handed to [`ConfigFile`].
#[derive(Debug, Clone)]
pub(crate) struct Settings {
    pub name: String,
    pub resolver: PathResolver,
    pub values: Map<String, Value>,
    pub template: Map<String, Value>,
    pub autosave: bool,
}

impl Default for ConfigFileBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigFileBuilder {
    pub fn new() -> Self {
        Self {
            name: None,
            path_hint: None,
            roots: None,
            base_dir: DEFAULT_BASE_DIR.into(),
            suffix: DEFAULT_SUFFIX.into(),
            values: Map::new(),
            template: Map::new(),
            autosave: true,
            normalize_name: false,
        }
    }

    /// Set the registry name. It is used as the file stem as given:
    /// `"MyApp"` → `MyApp.config.json`.
    pub fn name(mut self, name: &str) -> Self {
        self.name = Some(name.to_string());
        self
    }

    /// Directory to store the registry in. Only used if it already exists;
    /// otherwise the usual fallback chain applies.
    pub fn path_hint(mut self, path: impl Into<PathBuf>) -> Self {
        self.path_hint = Some(path.into());
        self
    }

    /// Replace the root candidates gathered from the system. A
    /// [`path_hint`](Self::path_hint) still takes precedence.
    pub fn roots(mut self, roots: RootCandidates) -> Self {
        self.roots = Some(roots);
        self
    }

    /// Override the base directory under the root (default: `.dreamfactory`).
    pub fn base_dir(mut self, dir: &str) -> Self {
        self.base_dir = dir.to_string();
        self
    }

    /// Override the file suffix (default: `.config.json`).
    pub fn suffix(mut self, suffix: &str) -> Self {
        self.suffix = suffix.to_string();
        self
    }

    /// Default values layered underneath the file content on every load.
    /// Keys present in the file win.
    pub fn values(mut self, values: Map<String, Value>) -> Self {
        self.values = values;
        self
    }

    /// Extra top-level entries written into the file when it is first
    /// created, next to the metadata block.
    pub fn template(mut self, template: Map<String, Value>) -> Self {
        self.template = template;
        self
    }

    /// Save pending changes when the [`ConfigFile`] is dropped (default: `true`).
    pub fn autosave(mut self, autosave: bool) -> Self {
        self.autosave = autosave;
        self
    }

    /// Lower-case the name and turn spaces into `-` before it becomes the
    /// file stem: `"My App"` → `my-app.config.json` (default: `false`).
    pub fn normalize_name(mut self, normalize: bool) -> Self {
        self.normalize_name = normalize;
        self
    }

    /// Validate the settings, resolve the file, and load it.
    pub fn open(self) -> Result<ConfigFile, RegistryError> {
        let settings = self.validate()?;
        let mut file = ConfigFile::new(settings);
        file.load()?;
        Ok(file)
    }

    fn validate(self) -> Result<Settings, RegistryError> {
        let mut errors = Vec::new();

        let name = match self.name.as_deref() {
            None => {
                errors.push(RegistryError::NameRequired);
                None
            }
            Some(raw) => {
                let name = if self.normalize_name {
                    normalize_name(raw)
                } else {
                    raw.to_string()
                };
                if !name.trim().is_empty() && is_plain_segment(&name) {
                    Some(name)
                } else {
                    errors.push(RegistryError::InvalidName(raw.to_string()));
                    None
                }
            }
        };

        if !self.suffix.starts_with('.') || has_separator(&self.suffix) {
            errors.push(RegistryError::InvalidSuffix(self.suffix.clone()));
        }
        if !is_plain_segment(&self.base_dir) {
            errors.push(RegistryError::InvalidBaseDir(self.base_dir.clone()));
        }

        match (name, errors.len()) {
            (Some(name), 0) => {
                let mut roots = match self.roots {
                    Some(roots) => roots,
                    None => RootCandidates::from_system(None),
                };
                if let Some(hint) = &self.path_hint {
                    roots.explicit = std::path::absolute(hint).ok();
                }
                let resolver = PathResolver::new(roots)
                    .base_dir(&self.base_dir)
                    .suffix(&self.suffix);
                Ok(Settings {
                    name,
                    resolver,
                    values: self.values,
                    template: self.template,
                    autosave: self.autosave,
                })
            }
            _ if errors.len() == 1 => Err(errors.remove(0)),
            _ => Err(RegistryError::InvalidSettings(errors)),
        }
    }
}

/// Lower-case and replace spaces with `-`.
pub fn normalize_name(name: &str) -> String {
    name.trim().to_lowercase().replace(' ', "-")
}

fn has_separator(s: &str) -> bool {
    s.contains('/') || s.contains('\\')
}

fn is_plain_segment(s: &str) -> bool {
    !s.is_empty() && s != "." && s != ".." && !has_separator(s)
}
