//! mesh-validator
//!
//! Validates a service-mesh configuration snapshot and prints the findings.
//!
//! # Architecture Overview
//!
//! ```text
//!   snapshot.json ──▶ model::MeshSnapshot ─────────────┐
//!                                                      │
//!   control plane ──▶ registry (GET /debug/registryz) ─┤  (optional)
//!                                                      ▼
//!                    ┌──────────────────────────────────────────────┐
//!                    │                  checkers                    │
//!                    │  NoDestination   MultiMatch   EgressHost     │
//!                    │         └──────── hosts ────────┘            │
//!                    └──────────────────────┬───────────────────────┘
//!                                           ▼
//!                              validations::IstioValidations
//!                                           │
//!                                           ▼
//!                                    JSON on stdout
//!
//!   config (TOML) and observability (tracing) are cross-cutting.
//! ```

use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::time::Duration;

use clap::{Parser, Subcommand};

use mesh_validator::config::{load_config, ValidatorConfig};
use mesh_validator::model::MeshSnapshot;
use mesh_validator::observability::init_logging;
use mesh_validator::registry::{fetch_registry_status, HttpReplica, RegistryError, RegistryStatus};
use mesh_validator::validate_snapshot;
use mesh_validator::validations::MessageCode;

#[derive(Parser)]
#[command(name = "mesh-validator")]
#[command(about = "Detects routing defects in a service-mesh configuration snapshot", long_about = None)]
struct Cli {
    /// TOML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate a snapshot and print the result map as JSON
    Validate {
        /// Snapshot document (JSON)
        snapshot: PathBuf,

        /// Print only objects with at least one Error
        #[arg(long)]
        only_invalid: bool,

        /// Single-line JSON output
        #[arg(long)]
        compact: bool,
    },
    /// List message codes, default severities and templates
    Codes,
}

#[tokio::main]
async fn main() -> Result<ExitCode, Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => load_config(path)?,
        None => ValidatorConfig::default(),
    };
    init_logging(&config.observability)?;

    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        identity_domain = %config.mesh.identity_domain,
        "mesh-validator starting"
    );

    match cli.command {
        Commands::Codes => {
            for code in MessageCode::ALL {
                println!("{:<42} {:<8} {}", code.as_str(), code.default_severity().as_str(), code.template());
            }
            Ok(ExitCode::SUCCESS)
        }
        Commands::Validate {
            snapshot,
            only_invalid,
            compact,
        } => validate(&config, &snapshot, only_invalid, compact).await,
    }
}

async fn validate(
    config: &ValidatorConfig,
    path: &Path,
    only_invalid: bool,
    compact: bool,
) -> Result<ExitCode, Box<dyn std::error::Error>> {
    let mut snapshot = MeshSnapshot::load(path)?;
    tracing::info!(
        snapshot = %path.display(),
        destination_rules = snapshot.destination_rules.len(),
        gateways = snapshot.gateways.len(),
        sidecars = snapshot.sidecars.len(),
        "Snapshot loaded"
    );

    let endpoints = config.registry.all_endpoints(&config.mesh);
    if !endpoints.is_empty() {
        let statuses = fetch_registry(&endpoints, config.registry.timeout_secs).await?;
        tracing::info!(services = statuses.len(), "Registry status fetched");
        snapshot.extend_registry(statuses);
    }

    let mut validations = validate_snapshot(&snapshot, &config.mesh);
    let invalid = validations.invalid_count();
    tracing::info!(objects = validations.len(), invalid, "Validation complete");

    if only_invalid || config.output.only_invalid {
        validations.retain(|validation| !validation.valid);
    }

    let rendered = if config.output.pretty && !compact {
        serde_json::to_string_pretty(&validations)?
    } else {
        serde_json::to_string(&validations)?
    };
    println!("{rendered}");

    Ok(if invalid > 0 {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    })
}

async fn fetch_registry(
    endpoints: &[String],
    timeout_secs: u64,
) -> Result<Vec<RegistryStatus>, RegistryError> {
    let client = reqwest::Client::builder()
        .timeout(Duration::from_secs(timeout_secs))
        .build()
        .map_err(|e| RegistryError::Request {
            replica: "client".to_string(),
            reason: e.to_string(),
        })?;

    let replicas = endpoints
        .iter()
        .map(|endpoint| HttpReplica::new(endpoint, client.clone()))
        .collect::<Result<Vec<_>, _>>()?;

    fetch_registry_status(&replicas, Duration::from_secs(timeout_secs)).await
}
