//! Builtin slash commands for selecting a message intent.
//!
//! These commands are always available and cannot be modified by users.
//! They are loaded once at startup and cached for the lifetime of the
//! application.

use serde::Serialize;
use std::sync::OnceLock;

/// A builtin slash command that tags the message with an intent.
#[derive(Debug, Clone, Serialize)]
pub struct BuiltinSlashCommand {
    /// Command name (without the leading /)
    pub name: &'static str,
    /// Icon to display next to the command
    pub icon: &'static str,
    /// Short label shown in pickers and card titles
    pub label: &'static str,
    /// Human-readable description
    pub description: &'static str,
}

impl BuiltinSlashCommand {
    /// Creates a new builtin slash command.
    pub const fn new(
        name: &'static str,
        icon: &'static str,
        label: &'static str,
        description: &'static str,
    ) -> Self {
        Self {
            name,
            icon,
            label,
            description,
        }
    }

    /// The command as typed in chat, with the leading slash.
    pub fn key(&self) -> String {
        format!("/{}", self.name)
    }
}

/// Static storage for builtin commands (initialized once).
static BUILTIN_COMMANDS: OnceLock<Vec<BuiltinSlashCommand>> = OnceLock::new();

/// Returns a reference to all builtin intent commands.
///
/// The commands are initialized on first access and cached for subsequent
/// calls.
pub fn builtin_commands() -> &'static [BuiltinSlashCommand] {
    BUILTIN_COMMANDS.get_or_init(|| {
        vec![
            BuiltinSlashCommand::new(
                "nota",
                "📝",
                "Nota",
                "Convierte tu mensaje en una nota clara y resumida.",
            ),
            BuiltinSlashCommand::new(
                "recordatorio",
                "⏰",
                "Recordatorio",
                "Crea recordatorios con hora, fecha o acciones.",
            ),
            BuiltinSlashCommand::new(
                "busqueda",
                "🔎",
                "Búsqueda",
                "Realiza una búsqueda informativa o investigativa.",
            ),
        ]
    })
}

/// Looks up a builtin command by its bare name (no leading slash).
pub fn find_command(name: &str) -> Option<&'static BuiltinSlashCommand> {
    builtin_commands().iter().find(|command| command.name == name)
}

/// Returns the commands whose `/name` form starts with the given prefix.
///
/// Used by the frontend for completion and hints; a bare `/` matches every
/// command.
pub fn matching_commands(prefix: &str) -> Vec<&'static BuiltinSlashCommand> {
    builtin_commands()
        .iter()
        .filter(|command| command.key().starts_with(prefix))
        .collect()
}
