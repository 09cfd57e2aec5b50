/// Reserved key holding a node's metadata block.
pub const METADATA_KEY: &str = "_metadata";

/// Directory (relative to the chosen root) that holds registry files.
pub const DEFAULT_BASE_DIR: &str = ".dreamfactory";

/// Suffix appended to the registry name to form its file name.
pub const DEFAULT_SUFFIX: &str = ".config.json";

/// A registry operation, independent of any CLI framework.
/// The CLI layer converts parsed clap args into this.
#[derive(Debug, Clone, PartialEq)]
pub enum RegistryAction {
    List,
    Get { key: String },
    Set { key: String, value: String },
    Unset { key: String },
    Comment { text: String },
}
