//! Slash command module.

mod builtin;

pub use builtin::{BuiltinSlashCommand, builtin_commands, find_command, matching_commands};
