//! Interactive REPL.

use std::borrow::Cow;
use std::io::Stdout;

use reedline::{
    FileBackedHistory, Prompt, PromptEditMode, PromptHistorySearch, PromptHistorySearchStatus,
    Reedline, Signal,
};
use tracing::{debug, warn};

use super::runner::{drive_request, get_version, Screen};
use crate::config::XdgDirs;
use crate::session::ChatSession;
use crate::stream::ChatTransport;

const HISTORY_SIZE: usize = 500;

/// Commands understood at the prompt.
pub const COMMANDS: &[(&str, &str)] = &[
    ("/help", "Show this help"),
    ("/exit", "Leave querywiz"),
    ("/quit", "Leave querywiz"),
];

/// querywiz prompt
pub struct WizPrompt {
    pub endpoint: String,
    pub color: bool,
}

impl WizPrompt {
    pub fn new(endpoint: &str, color: bool) -> Self {
        Self {
            endpoint: endpoint.to_string(),
            color,
        }
    }
}

impl Prompt for WizPrompt {
    fn render_prompt_left(&self) -> Cow<'_, str> {
        if self.color {
            Cow::Owned(format!("\x1b[1;36mwiz\x1b[0m \x1b[2m[{}]\x1b[0m", self.endpoint))
        } else {
            Cow::Owned(format!("wiz [{}]", self.endpoint))
        }
    }

    fn render_prompt_right(&self) -> Cow<'_, str> {
        Cow::Borrowed("")
    }

    fn render_prompt_indicator(&self, _mode: PromptEditMode) -> Cow<'_, str> {
        Cow::Borrowed(" › ")
    }

    fn render_prompt_multiline_indicator(&self) -> Cow<'_, str> {
        Cow::Borrowed("... ")
    }

    fn render_prompt_history_search_indicator(&self, hs: PromptHistorySearch) -> Cow<'_, str> {
        let prefix = match hs.status {
            PromptHistorySearchStatus::Passing => "",
            PromptHistorySearchStatus::Failing => "failing ",
        };
        Cow::Owned(format!("({}search: {}) ", prefix, hs.term))
    }
}

/// What a line of input asks for.
#[derive(Debug, PartialEq, Eq)]
pub enum ReplInput {
    Prompt(String),
    Help,
    Exit,
    UnknownCommand(String),
    Empty,
}

/// Classify a line read at the prompt. Prompts keep the line as typed.
pub fn parse_input(line: &str) -> ReplInput {
    let trimmed = line.trim();
    if trimmed.is_empty() {
        return ReplInput::Empty;
    }
    if !trimmed.starts_with('/') {
        return ReplInput::Prompt(line.to_string());
    }

    let cmd = trimmed.split_whitespace().next().unwrap_or(trimmed);
    match cmd {
        "/help" | "/?" => ReplInput::Help,
        "/exit" | "/quit" => ReplInput::Exit,
        _ => ReplInput::UnknownCommand(cmd.to_string()),
    }
}

/// REPL state.
pub struct Repl<'a> {
    transport: &'a dyn ChatTransport,
    session: ChatSession,
    screen: Screen<Stdout>,
    prompt: WizPrompt,
}

impl<'a> Repl<'a> {
    pub fn new(transport: &'a dyn ChatTransport, screen: Screen<Stdout>, prompt: WizPrompt) -> Self {
        Self {
            transport,
            session: ChatSession::new(),
            screen,
            prompt,
        }
    }

    /// Run the REPL loop.
    pub async fn run(&mut self) -> anyhow::Result<()> {
        let mut line_editor = Reedline::create();

        let dirs = XdgDirs::new();
        if let Err(e) = dirs.ensure_dirs() {
            warn!("Could not create state directory: {}", e);
        }
        match FileBackedHistory::with_file(HISTORY_SIZE, dirs.history_path()) {
            Ok(history) => line_editor = line_editor.with_history(Box::new(history)),
            Err(e) => debug!("History disabled: {}", e),
        }

        loop {
            match line_editor.read_line(&self.prompt) {
                Ok(Signal::Success(line)) => match parse_input(&line) {
                    ReplInput::Empty => continue,
                    ReplInput::Exit => break,
                    ReplInput::Help => print_help(),
                    ReplInput::UnknownCommand(cmd) => {
                        println!("Unknown command: {} (try /help)", cmd);
                    }
                    ReplInput::Prompt(text) => {
                        self.session.set_input(text);
                        println!();
                        drive_request(&mut self.session, self.transport, &mut self.screen)
                            .await?;
                    }
                },
                Ok(Signal::CtrlC) => {
                    println!("^C");
                    continue;
                }
                Ok(Signal::CtrlD) => break,
                Err(err) => {
                    eprintln!("Readline error: {}", err);
                    break;
                }
            }
        }

        Ok(())
    }
}

/// Run in interactive mode.
pub async fn run_interactive(
    transport: &dyn ChatTransport,
    screen: Screen<Stdout>,
    endpoint: &str,
    color: bool,
) -> anyhow::Result<()> {
    print_banner(color);
    let mut repl = Repl::new(transport, screen, WizPrompt::new(endpoint, color));
    repl.run().await
}

/// Print the welcome banner.
pub fn print_banner(color: bool) {
    println!();
    if color {
        println!(
            "  \x1b[1;36mquerywiz\x1b[0m  \x1b[2mv{}\x1b[0m",
            get_version()
        );
        println!("  \x1b[2mType \x1b[0m\x1b[1;36m/help\x1b[0m\x1b[2m for commands, or ask away.\x1b[0m");
    } else {
        println!("  querywiz  v{}", get_version());
        println!("  Type /help for commands, or ask away.");
    }
    println!();
}

fn print_help() {
    for (cmd, description) in COMMANDS {
        println!("  {:<8} {}", cmd, description);
    }
}
