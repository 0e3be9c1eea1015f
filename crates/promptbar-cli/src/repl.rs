//! REPL command parsing.

use promptbar_core::hotkey::{Key, KeyEvent};

/// Every `:`-command the REPL understands, for completion and help.
pub const COMMANDS: &[&str] = &[
    ":alt.",
    ":cmd-alt.",
    ":esc",
    ":new",
    ":delete",
    ":use",
    ":sessions",
    ":state",
    ":reset",
    ":help",
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReplCommand {
    /// Simulated key chord
    Key(KeyEvent),
    NewSession,
    DeleteSession(Option<String>),
    UseSession(String),
    Sessions,
    State,
    Reset,
    Help,
    Quit,
    Prompt(String),
    Unknown(String),
}

/// Parses one input line. Returns `None` for blank lines.
pub fn parse(line: &str) -> Option<ReplCommand> {
    let trimmed = line.trim();
    if trimmed.is_empty() {
        return None;
    }
    if trimmed == "quit" || trimmed == "exit" {
        return Some(ReplCommand::Quit);
    }
    if !trimmed.starts_with(':') {
        return Some(ReplCommand::Prompt(line.to_string()));
    }

    let (command, argument) = match trimmed.split_once(char::is_whitespace) {
        Some((command, argument)) => (command, Some(argument.trim().to_string())),
        None => (trimmed, None),
    };

    let parsed = match command {
        ":alt." => ReplCommand::Key(KeyEvent::new(Key::Period).with_alt()),
        ":cmd-alt." => ReplCommand::Key(KeyEvent::new(Key::Period).with_alt().with_meta()),
        ":esc" => ReplCommand::Key(KeyEvent::new(Key::Escape)),
        ":new" => ReplCommand::NewSession,
        ":delete" => ReplCommand::DeleteSession(argument.filter(|a| !a.is_empty())),
        ":use" => match argument.filter(|a| !a.is_empty()) {
            Some(id) => ReplCommand::UseSession(id),
            None => ReplCommand::Unknown(":use <id>".to_string()),
        },
        ":sessions" => ReplCommand::Sessions,
        ":state" => ReplCommand::State,
        ":reset" => ReplCommand::Reset,
        ":help" => ReplCommand::Help,
        other => ReplCommand::Unknown(other.to_string()),
    };
    Some(parsed)
}
