//! CLI command implementations.
//!
//! Each submodule implements one `codespace` subcommand, loading config from
//! the working directory and driving the sandbox manager.

pub mod down;
pub mod image;
pub mod init;
pub mod languages;
pub mod list;
pub mod up;
