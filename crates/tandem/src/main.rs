// SPDX-FileCopyrightText: 2026 Tandem Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Tandem - a personal AI assistant that learns your interests.
//!
//! This is the binary entry point.

mod bootstrap;
mod commands;
mod daemon;
mod logging;
mod serve;
mod shell;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use colored::Colorize;
use tandem_config::TandemConfig;

use crate::commands::InterestAction;

/// Discovery size for `tandem discover` when `--limit` is absent.
const DEFAULT_DISCOVER_LIMIT: usize = 10;

/// Tandem - a personal AI assistant that learns your interests.
#[derive(Parser, Debug)]
#[command(name = "tandem", version, about, long_about = None)]
struct Cli {
    /// Load configuration from this file instead of the usual locations.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Act for this user id instead of `agent.user_id`.
    #[arg(long, global = true)]
    user: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Launch an interactive REPL session (the default).
    Shell,
    /// Send one message and print the reply.
    Chat {
        /// The message to send.
        message: String,
    },
    /// Run a one-shot prompt against the provider, without session state.
    Ask {
        prompt: String,
        /// System instruction to send alongside the prompt.
        #[arg(long)]
        system: Option<String>,
        /// Print the reply as it streams in.
        #[arg(long)]
        stream: bool,
    },
    /// Discover content matching your interests.
    Discover {
        #[arg(long, default_value_t = DEFAULT_DISCOVER_LIMIT)]
        limit: usize,
    },
    /// Analyze recent interactions.
    Reflect,
    /// Show profile and memory statistics.
    Status {
        /// Output as JSON.
        #[arg(long)]
        json: bool,
    },
    /// List or edit your interests.
    Interests {
        #[command(subcommand)]
        action: Option<InterestsCommand>,
    },
    /// List registered providers.
    Providers,
    /// Run periodic discovery and reflection until Ctrl-C.
    Daemon,
    /// Start the HTTP gateway.
    Serve,
}

#[derive(Subcommand, Debug)]
enum InterestsCommand {
    /// Show current interests.
    List,
    /// Add an interest.
    Add { interest: String },
    /// Remove an interest.
    Remove { interest: String },
}

impl From<Option<InterestsCommand>> for InterestAction {
    fn from(command: Option<InterestsCommand>) -> Self {
        match command {
            None | Some(InterestsCommand::List) => InterestAction::List,
            Some(InterestsCommand::Add { interest }) => InterestAction::Add(interest),
            Some(InterestsCommand::Remove { interest }) => InterestAction::Remove(interest),
        }
    }
}

fn load_config(path: Option<&PathBuf>) -> TandemConfig {
    let loaded = match path {
        Some(path) => tandem_config::load_and_validate_path(path),
        None => tandem_config::load_and_validate(),
    };
    match loaded {
        Ok(config) => config,
        Err(errors) => {
            tandem_config::render_errors(&errors);
            std::process::exit(1);
        }
    }
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    let config = load_config(cli.config.as_ref());
    logging::init_tracing(&config.agent.log_level);

    let user = cli.user.as_deref();
    let result = match cli.command.unwrap_or(Commands::Shell) {
        Commands::Shell => shell::run_shell(&config, user).await,
        Commands::Chat { message } => commands::run_chat(&config, user, &message).await,
        Commands::Ask {
            prompt,
            system,
            stream,
        } => commands::run_ask(&config, &prompt, system.as_deref(), stream).await,
        Commands::Discover { limit } => commands::run_discover(&config, user, limit).await,
        Commands::Reflect => commands::run_reflect(&config, user).await,
        Commands::Status { json } => commands::run_status(&config, user, json).await,
        Commands::Interests { action } => {
            commands::run_interests(&config, user, action.into()).await
        }
        Commands::Providers => {
            commands::run_providers(&config);
            Ok(())
        }
        Commands::Daemon => daemon::run_daemon(&config, user).await,
        Commands::Serve => serve::run_serve(&config).await,
    };

    if let Err(e) = result {
        eprintln!("{} {e}", "error:".red().bold());
        std::process::exit(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn no_subcommand_means_shell() {
        let cli = Cli::try_parse_from(["tandem"]).unwrap();
        assert!(cli.command.is_none());
    }

    #[test]
    fn global_flags_parse_after_subcommand() {
        let cli = Cli::try_parse_from(["tandem", "status", "--json", "--user", "bob"]).unwrap();
        assert_eq!(cli.user.as_deref(), Some("bob"));
        assert!(matches!(cli.command, Some(Commands::Status { json: true })));
    }

    #[test]
    fn discover_limit_defaults() {
        let cli = Cli::try_parse_from(["tandem", "discover"]).unwrap();
        assert!(matches!(
            cli.command,
            Some(Commands::Discover { limit: DEFAULT_DISCOVER_LIMIT })
        ));
    }

    #[test]
    fn interests_subcommands_map_to_actions() {
        let cli = Cli::try_parse_from(["tandem", "interests", "add", "rust lang"]).unwrap();
        let Some(Commands::Interests { action }) = cli.command else {
            panic!("expected interests command");
        };
        assert_eq!(
            InterestAction::from(action),
            InterestAction::Add("rust lang".into())
        );
        assert_eq!(InterestAction::from(None), InterestAction::List);
    }

    #[test]
    fn ask_accepts_system_and_stream() {
        let cli = Cli::try_parse_from(["tandem", "ask", "hi", "--system", "be brief", "--stream"])
            .unwrap();
        match cli.command {
            Some(Commands::Ask {
                prompt,
                system,
                stream,
            }) => {
                assert_eq!(prompt, "hi");
                assert_eq!(system.as_deref(), Some("be brief"));
                assert!(stream);
            }
            other => panic!("unexpected {other:?}"),
        }
    }
}
