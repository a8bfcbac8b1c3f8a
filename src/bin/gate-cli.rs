use std::fs;
use std::path::PathBuf;

use clap::{Parser, Subcommand};
use serde_json::json;

use request_gate::config::loader::{finish, parse_config};
use request_gate::config::GateConfig;
use request_gate::routing::{InvocationScope, ProtectedRoutes};

#[derive(Parser)]
#[command(name = "gate-cli")]
#[command(about = "Inspect how the request gate treats paths", long_about = None)]
struct Cli {
    /// Gate configuration file. Defaults are used when omitted.
    #[arg(short, long)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show whether the gate runs for each path and whether it is protected
    Classify {
        /// Request paths, e.g. /dashboard/settings
        #[arg(required = true)]
        paths: Vec<String>,
    },
    /// Validate the configuration, including secrets from the environment
    Check,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => parse_config(&fs::read_to_string(path)?)?,
        None => GateConfig::default(),
    };

    match cli.command {
        Commands::Classify { paths } => {
            let scope = InvocationScope::from_config(&config.scope)?;
            let protected = ProtectedRoutes::new(&config.routes.protected)?;

            let rows: Vec<_> = paths
                .iter()
                .map(|raw| {
                    let path = raw.split('?').next().unwrap_or(raw);
                    let gated = scope.should_run(path);
                    json!({
                        "path": path,
                        "gated": gated,
                        "protected": gated && protected.is_protected(path),
                        "pattern": protected.matching_pattern(path),
                    })
                })
                .collect();
            println!("{}", serde_json::to_string_pretty(&rows)?);
        }
        Commands::Check => match finish(config, |name| std::env::var(name).ok()) {
            Ok(_) => println!("configuration OK"),
            Err(e) => {
                eprintln!("Error: {}", e);
                std::process::exit(1);
            }
        },
    }

    Ok(())
}
