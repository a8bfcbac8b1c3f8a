//! Request Gate (v1)
//!
//! Screens every in-scope request through an external security provider,
//! resolves the caller through an external identity provider, and either
//! redirects to sign-in or forwards to the application.
//!
//! # Architecture Overview
//!
//! ```text
//!                        ┌──────────────────────────────────────────────────────┐
//!                        │                    REQUEST GATE                       │
//!                        │                                                       │
//!   Client Request       │  ┌─────────┐   ┌─────────┐   ┌─────────┐   ┌────────┐ │
//!   ─────────────────────┼─▶│  http   │──▶│ routing │──▶│ shield  │──▶│identity│ │
//!                        │  │ server  │   │  scope  │   │  check  │   │resolve │ │
//!                        │  └─────────┘   └────┬────┘   └────┬────┘   └───┬────┘ │
//!                        │                     │ skip        │ reject     │      │
//!                        │                     │             ▼            ▼      │
//!                        │                     │        403 / 429    ┌────────┐  │
//!                        │                     │                     │decision│  │
//!                        │                     │                     └───┬────┘  │
//!                        │                     ▼                         │      │
//!   Client Response      │  ┌──────────────────────────┐  allow          │      │
//!   ◀────────────────────┼──│ upstream forwarder       │◀────────────────┤      │
//!                        │  └──────────────────────────┘  302 sign-in ◀──┘      │
//!                        └──────────────────────────────────────────────────────┘
//! ```

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;

use request_gate::config::load_config;
use request_gate::lifecycle;
use request_gate::observability::logging::init_logging;

#[derive(Parser)]
#[command(name = "request-gate")]
#[command(about = "Bot screening and sign-in enforcement in front of a web application", long_about = None)]
struct Args {
    /// Path to the TOML configuration file. Defaults are used when omitted.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Load and validate the configuration, then exit.
    #[arg(long)]
    check: bool,
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();

    let config = match load_config(args.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("request-gate: {}", e);
            return ExitCode::FAILURE;
        }
    };

    init_logging(&config.observability);
    tracing::info!("request-gate v{} starting", env!("CARGO_PKG_VERSION"));

    tracing::info!(
        bind_address = %config.listener.bind_address,
        upstream = %config.upstream.address,
        protected = ?config.routes.protected,
        request_timeout_secs = config.timeouts.request_secs,
        "Configuration loaded"
    );

    if args.check {
        tracing::info!("Configuration valid");
        return ExitCode::SUCCESS;
    }

    match lifecycle::run(config).await {
        Ok(()) => {
            tracing::info!("Shutdown complete");
            ExitCode::SUCCESS
        }
        Err(e) => {
            tracing::error!(error = %e, "Fatal error");
            ExitCode::FAILURE
        }
    }
}
