// SPDX-FileCopyrightText: 2026 Tandem Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! One-shot CLI commands: `chat`, `ask`, `discover`, `reflect`, `status`,
//! `interests`, and `providers`.

use std::io::Write;

use colored::Colorize;
use futures::StreamExt;
use tandem_agent::{AgentSession, AgentStatus, ContentItem};
use tandem_config::TandemConfig;
use tandem_core::{ProviderOptions, TandemError};

use crate::bootstrap::{self, build_registry};

/// `tandem interests` actions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InterestAction {
    List,
    Add(String),
    Remove(String),
}

/// Runs `tandem chat <message>`.
pub async fn run_chat(
    config: &TandemConfig,
    user: Option<&str>,
    message: &str,
) -> Result<(), TandemError> {
    let mut session = open(config, user, true).await?;
    let reply = session.handle_message(message).await;
    finish(&mut session, reply, |reply| println!("{reply}")).await
}

/// Runs `tandem ask <prompt>`: one generation with no session state.
pub async fn run_ask(
    config: &TandemConfig,
    prompt: &str,
    system: Option<&str>,
    stream: bool,
) -> Result<(), TandemError> {
    let provider = bootstrap::create_provider(config, &build_registry()).await?;
    let options = ProviderOptions::new();

    let result = if stream {
        match provider.generate_stream(prompt, system, &options).await {
            Ok(mut fragments) => {
                let mut stdout = std::io::stdout();
                let mut outcome = Ok(());
                while let Some(fragment) = fragments.next().await {
                    match fragment {
                        Ok(text) => {
                            print!("{text}");
                            let _ = stdout.flush();
                        }
                        Err(e) => {
                            outcome = Err(e);
                            break;
                        }
                    }
                }
                println!();
                outcome
            }
            Err(e) => Err(e),
        }
    } else {
        provider
            .generate(prompt, system, &options)
            .await
            .map(|response| println!("{}", response.content))
    };

    provider.close().await?;
    result
}

/// Runs `tandem discover`.
pub async fn run_discover(
    config: &TandemConfig,
    user: Option<&str>,
    limit: usize,
) -> Result<(), TandemError> {
    let mut session = open(config, user, true).await?;
    let items = session.discover(limit).await;
    finish(&mut session, items, |items| print_items(&items)).await
}

/// Runs `tandem reflect`.
pub async fn run_reflect(config: &TandemConfig, user: Option<&str>) -> Result<(), TandemError> {
    let mut session = open(config, user, true).await?;
    let insight = session.reflect().await;
    finish(&mut session, insight, |insight| println!("{insight}")).await
}

/// Runs `tandem status`.
pub async fn run_status(
    config: &TandemConfig,
    user: Option<&str>,
    json: bool,
) -> Result<(), TandemError> {
    let mut session = open(config, user, false).await?;
    let status = session.get_status();
    if json {
        let rendered = serde_json::to_string_pretty(&status)
            .map_err(|e| TandemError::Internal(format!("failed to encode status: {e}")))?;
        println!("{rendered}");
    } else {
        print_status(&status);
    }
    session.close().await
}

/// Runs `tandem interests`.
pub async fn run_interests(
    config: &TandemConfig,
    user: Option<&str>,
    action: InterestAction,
) -> Result<(), TandemError> {
    let mut session = open(config, user, false).await?;
    let changed = match &action {
        InterestAction::List => Ok(true),
        InterestAction::Add(value) => session.add_interest(value),
        InterestAction::Remove(value) => session.remove_interest(value),
    };
    let printed = changed.map(|changed| {
        match &action {
            InterestAction::Add(v) if !changed => println!("{} is already an interest", v.bold()),
            InterestAction::Remove(v) if !changed => println!("{} was not an interest", v.bold()),
            _ => {}
        }
        print_interests(&session);
    });
    let closed = session.close().await;
    printed.and(closed)
}

/// Runs `tandem providers`.
pub fn run_providers(config: &TandemConfig) {
    let registry = build_registry();
    println!("{}", "Registered providers".bold());
    for kind in registry.registered() {
        let marker = if kind == config.provider.kind {
            " (configured)".green().to_string()
        } else {
            String::new()
        };
        println!("  {kind}{marker}");
    }
}

/// Opens a session, with a provider only when the command uses one.
async fn open(
    config: &TandemConfig,
    user: Option<&str>,
    with_provider: bool,
) -> Result<AgentSession, TandemError> {
    let provider = if with_provider {
        bootstrap::optional_provider(config, &build_registry()).await
    } else {
        None
    };
    bootstrap::open_session(config, provider, user)
}

/// Prints a successful result, then closes the session either way.
async fn finish<T>(
    session: &mut AgentSession,
    result: Result<T, TandemError>,
    print: impl FnOnce(T),
) -> Result<(), TandemError> {
    let outcome = result.map(print);
    let closed = session.close().await;
    outcome.and(closed)
}

pub fn print_items(items: &[ContentItem]) {
    if items.is_empty() {
        println!("{}", "No content discovered.".yellow());
        return;
    }
    for (i, item) in items.iter().enumerate() {
        println!(
            "{}. {} {}",
            i + 1,
            item.title.bold(),
            format!("[{:.1}]", item.score).dimmed()
        );
        if let Some(description) = &item.description {
            for line in description.lines() {
                println!("   {line}");
            }
        }
    }
}

pub fn print_status(status: &AgentStatus) {
    let or_none = |values: &[String]| {
        if values.is_empty() {
            "none".dimmed().to_string()
        } else {
            values.join(", ")
        }
    };
    println!("{}", format!("Tandem status for {}", status.name).bold());
    println!("  interests:     {}", or_none(&status.interests));
    println!("  topics:        {}", or_none(&status.topics));
    println!("  interactions:  {}", status.memory.total_interactions);
    if let Some(newest) = status.memory.newest_interaction {
        println!("  last exchange: {}", newest.format("%Y-%m-%d %H:%M UTC"));
    }
    println!("  discovered:    {}", status.discovered_content_count);
}

pub fn print_interests(session: &AgentSession) {
    let profile = session.profile();
    if profile.interests().is_empty() {
        println!("{}", "No interests yet.".yellow());
    }
    for interest in profile.interests() {
        println!("  - {interest}");
    }
}
