// SPDX-FileCopyrightText: 2026 Tandem Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `tandem daemon` command implementation.
//!
//! Runs a discovery pass at startup, then periodic discovery and reflection
//! passes until Ctrl-C. Both timers share one `select!` loop, so passes for
//! the session never overlap.

use std::future::Future;
use std::time::Duration;

use tandem_agent::AgentSession;
use tandem_config::{DaemonConfig, TandemConfig};
use tandem_core::TandemError;
use tokio::time::{Instant, MissedTickBehavior, interval_at};
use tracing::{debug, error, info};

use crate::bootstrap::{self, build_registry};

/// Discovery titles logged per pass.
const LOGGED_TITLES: usize = 3;

/// Upper bound on either timer period, whatever the config says.
const MAX_PERIOD: Duration = Duration::from_secs(365 * 24 * 3600);

/// Timer periods derived from `[daemon]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Schedule {
    pub discover_every: Duration,
    pub reflect_every: Duration,
    pub discover_limit: usize,
}

impl From<&DaemonConfig> for Schedule {
    fn from(config: &DaemonConfig) -> Self {
        Self {
            discover_every: period(config.discover_interval_mins, 60),
            reflect_every: period(config.reflect_interval_hours, 3600),
            discover_limit: config.discover_limit,
        }
    }
}

fn period(count: u64, unit_secs: u64) -> Duration {
    Duration::from_secs(count.saturating_mul(unit_secs)).min(MAX_PERIOD)
}

/// Runs the `tandem daemon` command until Ctrl-C.
pub async fn run_daemon(config: &TandemConfig, user: Option<&str>) -> Result<(), TandemError> {
    let provider = bootstrap::create_provider(config, &build_registry()).await?;
    let mut session = bootstrap::open_session(config, Some(provider), user)?;
    let schedule = Schedule::from(&config.daemon);

    info!(
        discover_every_mins = config.daemon.discover_interval_mins,
        reflect_every_hours = config.daemon.reflect_interval_hours,
        "daemon started; press Ctrl-C to stop"
    );

    let shutdown = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!(error = %e, "failed to listen for Ctrl-C");
        }
        info!("shutdown signal received");
    };
    let result = run_schedule(&mut session, schedule, shutdown).await;

    let closed = session.close().await;
    info!("daemon stopped");
    result.and(closed)
}

/// Drives the session on `schedule` until `shutdown` resolves.
///
/// Pass failures are logged and the loop carries on.
pub async fn run_schedule(
    session: &mut AgentSession,
    schedule: Schedule,
    shutdown: impl Future<Output = ()>,
) -> Result<(), TandemError> {
    discover_pass(session, schedule.discover_limit).await;

    let mut discover = interval_at(Instant::now() + schedule.discover_every, schedule.discover_every);
    let mut reflect = interval_at(Instant::now() + schedule.reflect_every, schedule.reflect_every);
    discover.set_missed_tick_behavior(MissedTickBehavior::Delay);
    reflect.set_missed_tick_behavior(MissedTickBehavior::Delay);

    tokio::pin!(shutdown);
    loop {
        tokio::select! {
            _ = &mut shutdown => return Ok(()),
            _ = discover.tick() => discover_pass(session, schedule.discover_limit).await,
            _ = reflect.tick() => reflect_pass(session).await,
        }
    }
}

async fn discover_pass(session: &mut AgentSession, limit: usize) {
    info!("running content discovery pass");
    match session.discover(limit).await {
        Ok(items) if items.is_empty() => info!("no new content discovered"),
        Ok(items) => {
            info!(count = items.len(), "content discovered");
            for (i, item) in items.iter().take(LOGGED_TITLES).enumerate() {
                info!("  {}. {} (score: {:.2})", i + 1, item.title, item.score);
            }
        }
        Err(e) => error!(error = %e, "content discovery pass failed"),
    }
}

async fn reflect_pass(session: &mut AgentSession) {
    info!("running reflection pass");
    match session.reflect().await {
        Ok(insight) => {
            info!("reflection completed");
            debug!(insight = %insight.chars().take(200).collect::<String>(), "reflection insight");
        }
        Err(e) => error!(error = %e, "reflection pass failed"),
    }
}
