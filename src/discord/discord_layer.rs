// Discord layer - commands and event handlers.

#[path = "commands/command_catalog.rs"]
pub mod commands;

#[path = "censor/mod.rs"]
pub mod censor;

// Re-export command types for convenience
pub use commands::censor::{Data, Error};
