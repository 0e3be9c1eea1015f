use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use clap::Parser;
use colored::Colorize;
use rustyline::Editor;
use rustyline::error::ReadlineError;
use tokio::sync::mpsc;

use promptbar_application::{Submission, Toolbar, WindowSelection};
use promptbar_core::config::{DeliveryMode, FixedPreference, PreferenceProvider};
use promptbar_core::lifecycle::PromptState;
use promptbar_core::session::ChatSession;
use promptbar_execution::{ToolbarEvent, ToolbarEventLayer, init_tracing};
use promptbar_infrastructure::{
    ConfigService, HttpAgentBridge, SystemClipboard, TracingAnalytics, XmlPromptRenderer,
};

mod helper;
mod repl;

use helper::CliHelper;
use repl::{COMMANDS, ReplCommand};

#[derive(Parser)]
#[command(name = "promptbar")]
#[command(about = "Promptbar - drive the agent toolbar from a terminal", long_about = None)]
struct Cli {
    /// Configuration file (defaults to ~/.config/promptbar/config.toml)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Base URL of the HTTP agent bridge
    #[arg(long)]
    bridge_url: Option<String>,

    /// Delivery mode: send, copy or both
    #[arg(long)]
    delivery: Option<DeliveryMode>,

    /// Log filter directive (e.g. "warn", "promptbar=debug")
    #[arg(long)]
    log: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // ===== Configuration =====
    let config_service = match &cli.config {
        Some(path) => ConfigService::with_path(path),
        None => ConfigService::new_default()?,
    };
    let mut config = config_service.get_config();
    if let Some(endpoint) = cli.bridge_url {
        config.bridge.endpoint = Some(endpoint);
    }

    let (events_layer, events) = ToolbarEventLayer::channel();
    init_tracing(&config.logging, cli.log.as_deref(), Some(events_layer))?;
    tracing::debug!(path = %config_service.path().display(), "[Cli] Configuration resolved");

    // ===== Toolbar =====
    let preferences: Arc<dyn PreferenceProvider> = match cli.delivery {
        Some(mode) => Arc::new(FixedPreference(mode)),
        None => Arc::new(config_service.clone()),
    };
    let mut builder = Toolbar::builder(config.clone(), Arc::new(XmlPromptRenderer::new()?))
        .preferences(preferences)
        .session_selector(Arc::new(WindowSelection::default()))
        .analytics(Arc::new(TracingAnalytics));
    match SystemClipboard::new() {
        Ok(clipboard) => builder = builder.clipboard(Arc::new(clipboard)),
        Err(e) => tracing::warn!(error = %e, "[Cli] Clipboard unavailable, copy delivery will fail"),
    }
    if let Some(endpoint) = &config.bridge.endpoint {
        builder = builder.bridge(Arc::new(HttpAgentBridge::new(endpoint.clone())));
    }
    let toolbar = builder.build();
    toolbar.load_plugins().await?;

    let printer = tokio::spawn(print_events(events));

    // ===== REPL Setup =====
    let mut rl = Editor::new()?;
    rl.set_helper(Some(CliHelper));

    println!("{}", "=== Promptbar REPL ===".bright_magenta().bold());
    match &config.bridge.endpoint {
        Some(endpoint) => println!("{}", format!("Agent bridge: {}", endpoint).bright_black()),
        None => println!("{}", "No agent bridge configured (use --bridge-url)".yellow()),
    }
    println!(
        "{}",
        "Type a prompt to submit it, ':help' for commands, or 'quit' to exit.".bright_black()
    );
    println!();

    // ===== Main REPL Loop =====
    loop {
        let readline = rl.readline(">> ");
        let line = match readline {
            Ok(line) => line,
            Err(ReadlineError::Interrupted) => {
                println!("{}", "CTRL-C detected. Type 'quit' to exit.".yellow());
                continue;
            }
            Err(ReadlineError::Eof) => {
                println!("{}", "CTRL-D detected. Exiting...".bright_green());
                break;
            }
            Err(err) => {
                eprintln!("{}", format!("Error: {:?}", err).red());
                break;
            }
        };

        let Some(command) = repl::parse(&line) else {
            continue;
        };
        let _ = rl.add_history_entry(line.as_str());

        match command {
            ReplCommand::Quit => {
                println!("{}", "Goodbye!".bright_green());
                break;
            }
            ReplCommand::Key(event) => {
                if !toolbar.handle_key(&event).await {
                    println!("{}", "Key not handled".bright_black());
                }
                print_mode(&toolbar);
            }
            ReplCommand::NewSession => {
                let id = toolbar.create_session().await;
                println!("{}", format!("Created session {}", id).green());
            }
            ReplCommand::DeleteSession(id) => {
                let id = match id {
                    Some(id) => id,
                    None => toolbar.current_session_id().await,
                };
                toolbar.delete_session(&id).await;
                println!(
                    "{}",
                    format!(
                        "Deleted {}, current session is {}",
                        id,
                        toolbar.current_session_id().await
                    )
                    .green()
                );
            }
            ReplCommand::UseSession(id) => match toolbar.set_current_session(&id).await {
                Ok(()) => println!("{}", format!("Switched to {}", id).green()),
                Err(e) => println!("{}", e.to_string().red()),
            },
            ReplCommand::Sessions => {
                let current = toolbar.current_session_id().await;
                for session in toolbar.sessions().await {
                    print_session(&session, session.id == current);
                }
            }
            ReplCommand::State => {
                println!(
                    "{}",
                    format!(
                        "prompt: {}  session: {}",
                        toolbar.prompt_state(),
                        toolbar.current_session_id().await
                    )
                    .bright_blue()
                );
                print_mode(&toolbar);
            }
            ReplCommand::Reset => {
                toolbar.reset_prompt_state();
                println!("{}", "Prompt state reset".green());
            }
            ReplCommand::Help => {
                println!("{}", COMMANDS.join("  ").bright_black());
            }
            ReplCommand::Unknown(command) => {
                println!("{}", format!("Unknown command {}", command).bright_black());
            }
            ReplCommand::Prompt(text) => {
                if toolbar.prompt_state() == PromptState::Loading {
                    println!("{}", "A prompt is already being sent".yellow());
                    continue;
                }
                println!("{}", format!("> {}", text.trim()).green());
                let session_id = toolbar.current_session_id().await;
                toolbar.submit_detached(Submission::new(session_id, text));
            }
        }
    }

    drop(toolbar);
    printer.abort();
    Ok(())
}

/// Prints lifecycle transitions as they happen.
async fn print_events(mut events: mpsc::UnboundedReceiver<ToolbarEvent>) {
    while let Some(event) = events.recv().await {
        if event.target != "promptbar::lifecycle" {
            continue;
        }
        let Some(to) = event.fields.get("to").and_then(|v| v.as_str()) else {
            continue;
        };
        let line = format!("[{}]", to);
        let colored = match to {
            "loading" => line.yellow(),
            "success" => line.bright_green(),
            "error" => line.red(),
            _ => line.bright_black(),
        };
        println!("{}", colored);
    }
}

fn print_mode(toolbar: &Toolbar) {
    let mode = toolbar.mode();
    println!(
        "{}",
        format!(
            "minimized={} prompting={} selector={} search={} chat={}",
            mode.minimized,
            mode.prompt_creation_active,
            mode.dom_selector_active,
            mode.search_activated,
            mode.chat_area
        )
        .bright_black()
    );
}

fn print_session(session: &ChatSession, current: bool) {
    let marker = if current { "*" } else { " " };
    let title = session.title.as_deref().unwrap_or("(untitled)");
    println!(
        "{}",
        format!(
            "{} {}  {}  {} message(s)",
            marker,
            session.id,
            title,
            session.messages.len()
        )
        .bright_magenta()
    );
}
