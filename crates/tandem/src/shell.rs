// SPDX-FileCopyrightText: 2026 Tandem Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `tandem shell` command implementation.
//!
//! Launches an interactive REPL with a colored prompt and readline history.
//! Plain lines go to the assistant; lines starting with `/` are commands.

use colored::Colorize;
use rustyline::DefaultEditor;
use rustyline::error::ReadlineError;
use tandem_agent::AgentSession;
use tandem_config::TandemConfig;
use tandem_core::TandemError;
use tracing::warn;

use crate::bootstrap::{self, build_registry};
use crate::commands::{print_items, print_status};

/// Items requested by a bare `/discover`.
const SHELL_DISCOVER_LIMIT: usize = 5;

const HELP: &str = "\
Commands:
  /help                      Show this help message
  /status                    Show profile and memory statistics
  /discover [n]              Discover interesting content (default: 5 items)
  /interests                 Show your interests and topics
  /interests add <interest>  Add an interest
  /interests remove <x>      Remove an interest
  /topics [add|remove <x>]   Show or edit your topics
  /understand                Analyze your interactions
  /exit                      Leave the shell

Anything else is sent to your assistant.";

/// Which preference list a `/interests` or `/topics` command edits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListKind {
    Interests,
    Topics,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ListAction {
    Show,
    Add(String),
    Remove(String),
}

/// One parsed line of shell input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShellCommand {
    Empty,
    Message(String),
    Help,
    Status,
    Discover(usize),
    List(ListKind, ListAction),
    Understand,
    Exit,
    /// A recognized command used wrongly; carries the usage line.
    Usage(&'static str),
    Unknown(String),
}

/// Parses one line of input.
pub fn parse_command(line: &str) -> ShellCommand {
    let line = line.trim();
    if line.is_empty() {
        return ShellCommand::Empty;
    }
    if !line.starts_with('/') {
        return ShellCommand::Message(line.to_string());
    }

    let mut parts = line.split_whitespace();
    let cmd = parts.next().unwrap_or_default().to_lowercase();
    let rest: Vec<&str> = parts.collect();

    match cmd.as_str() {
        "/exit" | "/quit" => ShellCommand::Exit,
        "/help" => ShellCommand::Help,
        "/status" => ShellCommand::Status,
        "/understand" => ShellCommand::Understand,
        "/discover" => match rest.first() {
            None => ShellCommand::Discover(SHELL_DISCOVER_LIMIT),
            Some(n) => match n.parse::<usize>() {
                Ok(n) if n > 0 => ShellCommand::Discover(n),
                _ => ShellCommand::Usage("/discover [n], with n a positive number"),
            },
        },
        "/interests" => parse_list(ListKind::Interests, &rest, "/interests [add|remove] <interest>"),
        "/topics" => parse_list(ListKind::Topics, &rest, "/topics [add|remove] <topic>"),
        _ => ShellCommand::Unknown(cmd),
    }
}

fn parse_list(kind: ListKind, rest: &[&str], usage: &'static str) -> ShellCommand {
    match rest {
        [] => ShellCommand::List(kind, ListAction::Show),
        ["add", value @ ..] if !value.is_empty() => {
            ShellCommand::List(kind, ListAction::Add(value.join(" ")))
        }
        ["remove", value @ ..] if !value.is_empty() => {
            ShellCommand::List(kind, ListAction::Remove(value.join(" ")))
        }
        _ => ShellCommand::Usage(usage),
    }
}

/// Runs the `tandem shell` interactive REPL.
pub async fn run_shell(config: &TandemConfig, user: Option<&str>) -> Result<(), TandemError> {
    let provider = bootstrap::optional_provider(config, &build_registry()).await;
    if provider.is_none() {
        eprintln!(
            "{} no provider available; set provider.api_key or GEMINI_API_KEY to chat",
            "warning:".yellow().bold()
        );
    }
    let mut session = bootstrap::open_session(config, provider, user)?;

    let mut rl = DefaultEditor::new()
        .map_err(|e| TandemError::Internal(format!("failed to initialize readline: {e}")))?;

    println!("{}", format!("{} shell", config.agent.name).bold().green());
    println!(
        "Hello, {}! Type {} for commands or {} to leave.\n",
        session.profile().name,
        "/help".yellow(),
        "/exit".yellow()
    );

    let prompt = format!("{}> ", "you".green());
    let result = loop {
        let line = match rl.readline(&prompt) {
            Ok(line) => line,
            Err(ReadlineError::Interrupted | ReadlineError::Eof) => break Ok(()),
            Err(e) => break Err(TandemError::Internal(format!("readline error: {e}"))),
        };
        if !line.trim().is_empty() {
            let _ = rl.add_history_entry(line.as_str());
        }

        match dispatch(&mut session, parse_command(&line)).await {
            Ok(true) => {}
            Ok(false) => break Ok(()),
            // Save failures are reported but do not end the shell.
            Err(e @ TandemError::Persistence { .. }) => {
                warn!(error = %e, "failed to save session state");
                eprintln!("{} {e}", "error:".red().bold());
            }
            Err(e) => break Err(e),
        }
    };

    println!("{}", "Goodbye!".yellow());
    let closed = session.close().await;
    result.and(closed)
}

/// Executes one command. Returns false when the shell should exit.
async fn dispatch(session: &mut AgentSession, command: ShellCommand) -> Result<bool, TandemError> {
    match command {
        ShellCommand::Empty => {}
        ShellCommand::Exit => return Ok(false),
        ShellCommand::Help => println!("{HELP}"),
        ShellCommand::Status => print_status(&session.get_status()),
        ShellCommand::Message(text) => {
            let reply = session.handle_message(&text).await?;
            println!("\n{} {reply}\n", "tandem>".cyan().bold());
        }
        ShellCommand::Discover(limit) => {
            println!("{}", format!("Discovering {limit} items for you...").blue().bold());
            let items = session.discover(limit).await?;
            print_items(&items);
        }
        ShellCommand::Understand => {
            println!("{}", "Analyzing your interactions...".blue().bold());
            println!("\n{}\n", session.reflect().await?);
        }
        ShellCommand::List(kind, action) => edit_list(session, kind, action)?,
        ShellCommand::Usage(usage) => println!("{} {usage}", "usage:".red()),
        ShellCommand::Unknown(cmd) => {
            println!("{} {cmd}", "Unknown command:".red());
            println!("Type {} for available commands", "/help".yellow());
        }
    }
    Ok(true)
}

fn edit_list(
    session: &mut AgentSession,
    kind: ListKind,
    action: ListAction,
) -> Result<(), TandemError> {
    let label = match kind {
        ListKind::Interests => "interest",
        ListKind::Topics => "topic",
    };
    match action {
        ListAction::Show => {
            let profile = session.profile();
            print_list("Your interests", profile.interests());
            print_list("Your topics", profile.topics());
        }
        ListAction::Add(value) => {
            let changed = match kind {
                ListKind::Interests => session.add_interest(&value)?,
                ListKind::Topics => session.add_topic(&value)?,
            };
            if changed {
                println!("{}", format!("Added {label}: {value}").green());
            } else {
                println!("Already have {label}: {value}");
            }
        }
        ListAction::Remove(value) => {
            let changed = match kind {
                ListKind::Interests => session.remove_interest(&value)?,
                ListKind::Topics => session.remove_topic(&value)?,
            };
            if changed {
                println!("{}", format!("Removed {label}: {value}").yellow());
            } else {
                println!("No such {label}: {value}");
            }
        }
    }
    Ok(())
}

fn print_list(title: &str, values: &[String]) {
    println!("{}", format!("{title}:").bold());
    if values.is_empty() {
        println!("  {}", "none yet".dimmed());
    }
    for (i, value) in values.iter().enumerate() {
        println!("  {}. {value}", i + 1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_text_is_a_message() {
        assert_eq!(
            parse_command("  what's new in rust?  "),
            ShellCommand::Message("what's new in rust?".into())
        );
        assert_eq!(parse_command("   "), ShellCommand::Empty);
    }

    #[test]
    fn discover_takes_optional_limit() {
        assert_eq!(parse_command("/discover"), ShellCommand::Discover(5));
        assert_eq!(parse_command("/discover 3"), ShellCommand::Discover(3));
        assert!(matches!(parse_command("/discover lots"), ShellCommand::Usage(_)));
        assert!(matches!(parse_command("/discover 0"), ShellCommand::Usage(_)));
    }

    #[test]
    fn list_commands_keep_multi_word_values() {
        assert_eq!(
            parse_command("/interests add machine learning"),
            ShellCommand::List(ListKind::Interests, ListAction::Add("machine learning".into()))
        );
        assert_eq!(
            parse_command("/topics remove Rust"),
            ShellCommand::List(ListKind::Topics, ListAction::Remove("Rust".into()))
        );
        assert_eq!(
            parse_command("/topics"),
            ShellCommand::List(ListKind::Topics, ListAction::Show)
        );
        assert!(matches!(parse_command("/interests add"), ShellCommand::Usage(_)));
        assert!(matches!(parse_command("/interests clear"), ShellCommand::Usage(_)));
    }

    #[test]
    fn commands_are_case_insensitive() {
        assert_eq!(parse_command("/EXIT"), ShellCommand::Exit);
        assert_eq!(parse_command("/Understand"), ShellCommand::Understand);
        assert_eq!(parse_command("/nope"), ShellCommand::Unknown("/nope".into()));
    }

    #[tokio::test]
    async fn dispatch_edits_lists_and_exits() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = TandemConfig::default();
        config.agent.data_dir = dir.path().to_path_buf();
        let mut session = bootstrap::open_session(&config, None, None).unwrap();

        let keep = dispatch(&mut session, parse_command("/topics add Rust")).await.unwrap();
        assert!(keep);
        assert_eq!(session.profile().topics(), ["Rust"]);
        assert!(!dispatch(&mut session, ShellCommand::Exit).await.unwrap());
    }
}
