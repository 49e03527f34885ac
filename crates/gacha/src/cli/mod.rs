//! Command-line interface module.
//!
//! This module provides the CLI structure and command handlers for the gacha binary.

mod assets;
mod commands;

pub use assets::handle_command;
pub use commands::Cli;
