//! Embedded templates for codespace files.

/// Default `codespace.toml` configuration.
pub(crate) const CODESPACE_TOML: &str = include_str!("codespace.toml");
