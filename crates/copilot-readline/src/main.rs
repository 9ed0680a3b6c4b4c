use std::borrow::Cow::{self, Borrowed, Owned};

use anyhow::Result;
use colored::Colorize;
use rustyline::Editor;
use rustyline::completion::{Completer, Pair};
use rustyline::highlight::Highlighter;
use rustyline::hint::Hinter;
use rustyline::validate::Validator;
use rustyline::{Context, Helper};

use copilot_core::MAX_TURNS;
use copilot_core::backend::BackendResponse;
use copilot_core::config::BackendConfig;
use copilot_core::render::{DisplayBlock, Frame, RenderConfig, Span, render_message};
use copilot_core::session::{ConversationStore, Message};
use copilot_core::slash_command::builtin_commands;
use copilot_interaction::HttpChatBackend;

/// CLI helper for rustyline that provides completion, highlighting, and hints
/// for the slash commands.
#[derive(Clone)]
struct CliHelper {
    commands: Vec<String>,
}

impl CliHelper {
    fn new() -> Self {
        let mut commands: Vec<String> = builtin_commands()
            .iter()
            .map(|command| command.key())
            .collect();
        commands.push("/help".to_string());
        commands.push("/reset".to_string());
        Self { commands }
    }
}

impl Helper for CliHelper {}

impl Completer for CliHelper {
    type Candidate = Pair;

    fn complete(
        &self,
        line: &str,
        pos: usize,
        _ctx: &Context<'_>,
    ) -> rustyline::Result<(usize, Vec<Pair>)> {
        let line = &line[..pos];

        if line.starts_with('/') {
            let candidates: Vec<Pair> = self
                .commands
                .iter()
                .filter(|cmd| cmd.starts_with(line))
                .map(|cmd| Pair {
                    display: cmd.clone(),
                    replacement: cmd.clone(),
                })
                .collect();
            Ok((0, candidates))
        } else {
            Ok((0, vec![]))
        }
    }
}

impl Highlighter for CliHelper {
    fn highlight<'l>(&self, line: &'l str, _pos: usize) -> Cow<'l, str> {
        if line.starts_with('/') {
            Owned(line.bright_cyan().to_string())
        } else {
            Borrowed(line)
        }
    }

    fn highlight_char(&self, _line: &str, _pos: usize, _forced: bool) -> bool {
        true
    }
}

impl Hinter for CliHelper {
    type Hint = String;

    fn hint(&self, line: &str, pos: usize, _ctx: &Context<'_>) -> Option<String> {
        let line = &line[..pos];

        if line.starts_with('/') && !line.contains(' ') {
            self.commands
                .iter()
                .find(|cmd| cmd.starts_with(line) && cmd.len() > line.len())
                .map(|cmd| cmd[line.len()..].to_string())
        } else {
            None
        }
    }
}

impl Validator for CliHelper {}

/// Renders a paragraph's spans into one colored string.
fn paragraph_text(spans: &[Span], color: fn(&str) -> colored::ColoredString) -> String {
    spans
        .iter()
        .map(|span| match span {
            Span::Plain(text) => color(text).to_string(),
            Span::Bold(text) => color(text).bold().to_string(),
        })
        .collect()
}

/// Prints an assistant message: plain bubble for the default intent, titled
/// card for everything else.
fn print_assistant_message(message: &Message, config: &RenderConfig) {
    let rendered = render_message(&message.content, message.intent(), config);

    match &rendered.frame {
        Frame::Bubble => {
            for block in &rendered.blocks {
                if let DisplayBlock::Paragraph(spans) = block {
                    println!("{}", paragraph_text(spans, |text| text.bright_blue()));
                }
            }
        }
        Frame::Card { icon, title } => {
            println!("{}", format!("{icon} {title}").bright_magenta().bold());
            for block in &rendered.blocks {
                match block {
                    DisplayBlock::Paragraph(spans) => {
                        println!("  {}", paragraph_text(spans, |text| text.normal()));
                    }
                    DisplayBlock::Fields(rows) => {
                        for row in rows {
                            println!(
                                "  {} {}",
                                format!("{}:", row.label).bright_black(),
                                row.value.cyan()
                            );
                        }
                    }
                }
            }
            print_metadata_badges(message);
        }
    }
}

/// Dimmed metadata line under intent cards: latency, model, provider, and
/// the backend's fallback flag.
fn print_metadata_badges(message: &Message) {
    let Some(metadata) = &message.metadata else {
        return;
    };

    let mut badges = Vec::new();
    if let Some(latency) = metadata.latency_ms {
        badges.push(format!("latencia {} ms", latency.round()));
    }
    if let Some(model) = &metadata.model {
        badges.push(format!("modelo {model}"));
    }
    if let Some(provider) = &metadata.provider {
        badges.push(format!("proveedor {provider}"));
    }

    if !badges.is_empty() {
        println!("  {}", badges.join(" · ").bright_black());
    }
    if metadata.fallback == Some(true) {
        println!("  {}", "fallback".yellow());
    }
}

fn print_turn_progress(turn_count: u32) {
    println!(
        "{}",
        format!("Turno {turn_count} de {MAX_TURNS}").bright_black()
    );
}

fn print_cap_notice() {
    println!(
        "{}",
        format!(
            "Hemos alcanzado el limite para esta sesion ({MAX_TURNS} turnos). Usa /reset para seguir conversando."
        )
        .yellow()
    );
}

/// Dimmed banner shown when the backend flags a degraded reply.
fn print_fallback_notice(envelope: &BackendResponse) {
    let text = envelope
        .display_text()
        .unwrap_or("Se ha producido un fallback, pero no hay mensaje disponible");
    println!("{}", format!("[fallback] {text}").yellow().dimmed());
}

fn print_help() {
    println!("{}", "Comandos disponibles:".bright_black());
    for command in builtin_commands() {
        println!(
            "  {} {} {}",
            command.icon,
            command.key().bright_cyan(),
            command.description.bright_black()
        );
    }
    println!(
        "  {} {}",
        "/reset".bright_cyan(),
        "Descarta la sesion actual y empieza una nueva.".bright_black()
    );
    println!(
        "  {} {}",
        "/help".bright_cyan(),
        "Muestra esta ayuda.".bright_black()
    );
    println!(
        "{}",
        "Escribe 'quit' o 'exit' para salir.".bright_black()
    );
}

/// The main entry point for the Copilot readline REPL application.
///
/// Sets up a rustyline-based REPL that:
/// 1. Resolves the backend endpoint and initializes the conversation store
/// 2. Provides command completion for the intent slash commands
/// 3. Sends each accepted turn to the backend (one exchange in flight)
/// 4. Displays colored output for user, assistant, and system messages
#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .init();

    // ===== Backend Initialization =====
    let config = BackendConfig::from_env();
    let backend = HttpChatBackend::new(&config);
    let store = ConversationStore::new(backend);
    let render_config = RenderConfig::default();

    store.init().await;

    // ===== REPL Setup =====
    let helper = CliHelper::new();
    let mut rl = Editor::new()?;
    rl.set_helper(Some(helper));

    println!("{}", "=== AI Copilot ===".bright_magenta().bold());
    println!(
        "{}",
        "Escribe un mensaje para conversar. '/' muestra los comandos, 'quit' para salir."
            .bright_black()
    );
    println!();

    // ===== Main REPL Loop =====
    loop {
        let readline = rl.readline(">> ");

        match readline {
            Ok(line) => {
                let trimmed = line.trim();

                // Handle quit command
                if trimmed == "quit" || trimmed == "exit" {
                    println!("{}", "Hasta luego!".bright_green());
                    break;
                }

                // Skip empty lines
                if trimmed.is_empty() {
                    continue;
                }

                // Add to history
                let _ = rl.add_history_entry(&line);

                // Frontend-local commands
                if trimmed == "/help" {
                    print_help();
                    continue;
                }
                if trimmed == "/reset" {
                    store.reset().await;
                    store.init().await;
                    println!("{}", "Sesion reiniciada.".bright_green());
                    continue;
                }

                if store.is_capped().await {
                    print_cap_notice();
                    continue;
                }

                // Display user input in green
                println!("{}", format!("> {}", trimmed).green());

                // Exactly one exchange in flight: await completion inline.
                match store.send(trimmed).await {
                    Ok(Some(envelope)) => {
                        if let Some(session) = store.session().await {
                            if let Some(message) = session.last_assistant_message() {
                                print_assistant_message(message, &render_config);
                            }
                            if envelope.is_fallback() {
                                print_fallback_notice(&envelope);
                            }
                            print_turn_progress(session.turn_count);
                            if session.turn_count >= MAX_TURNS {
                                print_cap_notice();
                            }
                        }
                    }
                    Ok(None) => {
                        // Rejected client-side; the only reachable cause
                        // here is the turn cap.
                        if store.is_capped().await {
                            print_cap_notice();
                        }
                    }
                    Err(_) => {
                        let message = store
                            .error()
                            .await
                            .unwrap_or_else(|| "Error desconocido".to_string());
                        println!("{}", format!("Error: {message}").red());
                        if let Some(session) = store.session().await {
                            print_turn_progress(session.turn_count);
                        }
                    }
                }
            }
            Err(rustyline::error::ReadlineError::Interrupted) => {
                println!("{}", "CTRL-C detectado. Escribe 'quit' para salir.".yellow());
            }
            Err(rustyline::error::ReadlineError::Eof) => {
                println!("{}", "CTRL-D detectado. Saliendo...".bright_green());
                break;
            }
            Err(err) => {
                eprintln!("{}", format!("Error: {:?}", err).red());
                break;
            }
        }
    }

    Ok(())
}
