//! Control-plane registry status.
//!
//! # Data Flow
//! ```text
//! control-plane replicas (N)
//!     → fetch.rs (concurrent GET /debug/registryz, per-replica timeout)
//!     → parse each JSON payload, tag entries with the replica name
//!     → merge: any success wins, fail only when every replica failed
//!     → Vec<RegistryStatus> handed to the checkers
//! ```
//!
//! # Design Decisions
//! - A host reported by the control plane is authoritative proof it is reachable
//! - Partial replica failure is logged, not surfaced
//! - Checkers only ever see the merged, immutable list

pub mod fetch;

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use fetch::{fetch_registry_status, merge_replica_outcomes, HttpReplica, RegistryReplica};

/// Debug endpoint listing every service known to the control plane.
pub const REGISTRY_PATH: &str = "/debug/registryz";

/// One service the control plane has resolved.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistryStatus {
    pub hostname: String,
    /// Replica that reported the entry.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pilot: Option<String>,
}

impl RegistryStatus {
    pub fn new(hostname: impl Into<String>) -> Self {
        Self {
            hostname: hostname.into(),
            pilot: None,
        }
    }
}

/// Errors raised while gathering registry status.
#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("no control-plane replicas configured")]
    NoReplicas,

    #[error("invalid control-plane endpoint '{endpoint}': {source}")]
    InvalidEndpoint {
        endpoint: String,
        #[source]
        source: url::ParseError,
    },

    #[error("{replica}: request failed: {reason}")]
    Request { replica: String, reason: String },

    #[error("{replica}: timed out after {secs}s")]
    Timeout { replica: String, secs: u64 },

    #[error("{replica}: malformed registry payload: {source}")]
    Malformed {
        replica: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Error fetching the registry status in the following replicas: {}", join_errors(.0))]
    AllReplicasFailed(Vec<RegistryError>),
}

fn join_errors(errors: &[RegistryError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

/// Parse one replica's `/debug/registryz` payload.
pub fn parse_registry_payload(
    replica: &str,
    payload: &[u8],
) -> Result<Vec<RegistryStatus>, RegistryError> {
    let mut statuses: Vec<RegistryStatus> =
        serde_json::from_slice(payload).map_err(|source| RegistryError::Malformed {
            replica: replica.to_string(),
            source,
        })?;
    for status in &mut statuses {
        status.pilot = Some(replica.to_string());
    }
    Ok(statuses)
}
