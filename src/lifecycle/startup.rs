//! Startup orchestration.
//!
//! # Responsibilities
//! - Construct collaborator clients once, from validated configuration
//! - Compile the gate
//! - Start the metrics exporter
//! - Bind the listener and begin accepting traffic
//!
//! # Design Decisions
//! - Fail fast: any startup error is fatal
//! - Listener binds last (traffic only when ready)

use std::sync::Arc;

use thiserror::Error;
use tokio::net::TcpListener;

use crate::config::{ConfigError, GateConfig};
use crate::gate::Gate;
use crate::http::GateServer;
use crate::identity::{HttpIdentityProvider, IdentityError};
use crate::lifecycle::shutdown::Shutdown;
use crate::lifecycle::signals::shutdown_on_signal;
use crate::observability::metrics;
use crate::routing::PatternError;
use crate::shield::{HttpSecurityProvider, ShieldError};

/// Errors that stop the process before or while serving.
#[derive(Debug, Error)]
pub enum StartupError {
    #[error("configuration: {0}")]
    Config(#[from] ConfigError),

    #[error("route patterns: {0}")]
    Pattern(#[from] PatternError),

    #[error("identity client: {0}")]
    Identity(#[from] IdentityError),

    #[error("security client: {0}")]
    Shield(#[from] ShieldError),

    #[error("listener: {0}")]
    Io(#[from] std::io::Error),
}

/// Build the gate with the HTTP collaborator clients.
pub fn build_gate(config: &GateConfig) -> Result<Arc<Gate>, StartupError> {
    let identity = HttpIdentityProvider::new(&config.identity, &config.secrets)?;
    let security = HttpSecurityProvider::new(&config.security, &config.secrets)?;
    let gate = Gate::new(config, Arc::new(identity), Arc::new(security))?;

    tracing::info!(
        protected_routes = gate.protected_routes().len(),
        shield_mode = ?config.security.shield_mode,
        bot_mode = ?config.security.bot_mode,
        allow = ?config.security.allow,
        "Gate initialised"
    );
    Ok(Arc::new(gate))
}

/// Start every subsystem and serve until a termination signal arrives.
pub async fn run(config: GateConfig) -> Result<(), StartupError> {
    let gate = build_gate(&config)?;

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse() {
            Ok(addr) => metrics::init_metrics(addr),
            Err(_) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            ),
        }
    }

    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    tracing::info!(address = %listener.local_addr()?, "Listening for connections");

    let shutdown = Shutdown::new();
    let server = GateServer::new(config, gate);
    let server_task = tokio::spawn(server.run(listener, shutdown.subscribe()));

    shutdown_on_signal(&shutdown).await;

    match server_task.await {
        Ok(result) => result?,
        Err(e) => tracing::error!(error = %e, "Server task failed"),
    }
    Ok(())
}
