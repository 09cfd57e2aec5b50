//! Clap adapter for dfregistry.
//!
//! This module is the **optional integration layer** between the registry
//! core and the [clap](https://docs.rs/clap) CLI parser. It is compiled only
//! when the `clap` Cargo feature is enabled (on by default).
//!
//! [`RegistryArgs`] and [`RegistrySubcommand`] can be embedded directly in a
//! clap `#[derive(Parser)]` struct to get `registry list|get|set|unset|comment`
//! subcommands with no boilerplate.
//!
//! The only bridge to the core is [`RegistryArgs::into_action()`], which
//! converts parsed arguments into a [`RegistryAction`](crate::RegistryAction).
//! From there everything flows through
//! [`ConfigFile::handle()`](crate::ConfigFile::handle).

use clap::{Args, Subcommand};

use crate::types::RegistryAction;

/// Clap-derived args for the `registry` subcommand group.
///
/// ```ignore
/// #[derive(Parser)]
/// struct Cli {
///     #[command(subcommand)]
///     command: Commands,
/// }
///
/// #[derive(Subcommand)]
/// enum Commands {
///     Registry(RegistryArgs),
/// }
/// ```
#[derive(Debug, Args)]
pub struct RegistryArgs {
    #[command(subcommand)]
    pub action: Option<RegistrySubcommand>,
}

/// Available registry subcommands.
#[derive(Debug, Subcommand)]
pub enum RegistrySubcommand {
    /// Show all top-level registry entries.
    List,
    /// Show the stored value for a key.
    Get {
        /// Dotted key path (e.g. "servers.db.host").
        key: String,
    },
    /// Store a value and save the registry.
    Set {
        /// Dotted key path (e.g. "servers.db.host").
        key: String,
        /// Value to set. Numbers, booleans, null, and JSON objects or arrays
        /// are stored as such; anything else as a string.
        value: String,
    },
    /// Remove a value and save the registry.
    Unset {
        /// Dotted key path (e.g. "servers.db.host").
        key: String,
    },
    /// Add a comment to the registry's metadata log.
    Comment {
        /// Comment text.
        text: String,
    },
}

impl RegistryArgs {
    /// Convert clap-parsed args into a framework-agnostic `RegistryAction`.
    ///
    /// Bare `registry` (no subcommand) and explicit `registry list` both map
    /// to `RegistryAction::List`.
    pub fn into_action(self) -> RegistryAction {
        match self.action {
            None | Some(RegistrySubcommand::List) => RegistryAction::List,
            Some(RegistrySubcommand::Get { key }) => RegistryAction::Get { key },
            Some(RegistrySubcommand::Set { key, value }) => RegistryAction::Set { key, value },
            Some(RegistrySubcommand::Unset { key }) => RegistryAction::Unset { key },
            Some(RegistrySubcommand::Comment { text }) => RegistryAction::Comment { text },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    /// Wrapper so we can use `try_parse_from` on the subcommand.
    #[derive(Debug, Parser)]
    struct TestCli {
        #[command(flatten)]
        registry: RegistryArgs,
    }

    fn parse(args: &[&str]) -> RegistryArgs {
        TestCli::try_parse_from(args).unwrap().registry
    }

    #[test]
    fn parse_bare_registry_is_list() {
        assert_eq!(parse(&["test"]).into_action(), RegistryAction::List);
    }

    #[test]
    fn parse_explicit_list() {
        assert_eq!(parse(&["test", "list"]).into_action(), RegistryAction::List);
    }

    #[test]
    fn parse_get() {
        let action = parse(&["test", "get", "servers.db.host"]).into_action();
        assert_eq!(
            action,
            RegistryAction::Get {
                key: "servers.db.host".into()
            }
        );
    }

    #[test]
    fn parse_set() {
        let action = parse(&["test", "set", "port", "3000"]).into_action();
        assert_eq!(
            action,
            RegistryAction::Set {
                key: "port".into(),
                value: "3000".into(),
            }
        );
    }

    #[test]
    fn parse_set_json_value() {
        let action = parse(&["test", "set", "servers.db", r#"{"host":"a"}"#]).into_action();
        assert_eq!(
            action,
            RegistryAction::Set {
                key: "servers.db".into(),
                value: r#"{"host":"a"}"#.into(),
            }
        );
    }

    #[test]
    fn parse_unset() {
        let action = parse(&["test", "unset", "servers.db"]).into_action();
        assert_eq!(
            action,
            RegistryAction::Unset {
                key: "servers.db".into()
            }
        );
    }

    #[test]
    fn parse_comment() {
        let action = parse(&["test", "comment", "Migrated to v2"]).into_action();
        assert_eq!(
            action,
            RegistryAction::Comment {
                text: "Migrated to v2".into()
            }
        );
    }

    #[test]
    fn set_requires_value() {
        assert!(TestCli::try_parse_from(["test", "set", "port"]).is_err());
    }

    #[test]
    fn invalid_subcommand_errors() {
        assert!(TestCli::try_parse_from(["test", "gen"]).is_err());
    }
}
