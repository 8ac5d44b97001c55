// SPDX-FileCopyrightText: 2026 Tandem Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `tandem serve` command implementation.

use std::sync::Arc;

use tandem_config::TandemConfig;
use tandem_core::TandemError;
use tandem_gateway::{GatewayState, ServerConfig, SessionPool, start_server};
use tracing::{error, info};

use crate::bootstrap::{self, build_registry};

/// Runs the HTTP gateway until Ctrl-C, then closes every open session.
pub async fn run_serve(config: &TandemConfig) -> Result<(), TandemError> {
    let provider = bootstrap::optional_provider(config, &build_registry()).await;
    let pool = Arc::new(SessionPool::new(
        provider,
        config.agent.data_dir.clone(),
        bootstrap::session_options(config),
        config.agent.user_name.clone(),
    ));
    let state = GatewayState::new(pool, config.agent.user_id.clone());
    let server = ServerConfig {
        host: config.gateway.host.clone(),
        port: config.gateway.port,
    };

    let shutdown = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!(error = %e, "failed to listen for Ctrl-C");
        }
        info!("shutdown signal received");
    };

    start_server(&server, state, shutdown).await
}
