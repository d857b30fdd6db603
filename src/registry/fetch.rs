//! Concurrent registry fetch across control-plane replicas.
//!
//! # Responsibilities
//! - Query every replica at once, each under its own timeout
//! - Accept any replica's successful response
//! - Surface a combined error only when all replicas fail

use std::collections::BTreeSet;
use std::future::Future;
use std::time::Duration;

use futures_util::future::join_all;
use tokio::time::timeout;
use url::Url;

use super::{parse_registry_payload, RegistryError, RegistryStatus, REGISTRY_PATH};

/// A control-plane replica able to serve debug endpoints.
pub trait RegistryReplica: Send + Sync {
    /// Name used to tag entries and errors.
    fn name(&self) -> &str;

    /// GET `path` on the replica's debug port and return the raw body.
    fn fetch(&self, path: &str) -> impl Future<Output = Result<Vec<u8>, RegistryError>> + Send;
}

/// Replica reached over HTTP.
#[derive(Clone, Debug)]
pub struct HttpReplica {
    name: String,
    base_url: Url,
    client: reqwest::Client,
}

impl HttpReplica {
    /// Build a replica from a debug base URL such as `http://istiod-0:15014`.
    pub fn new(endpoint: &str, client: reqwest::Client) -> Result<Self, RegistryError> {
        let base_url = Url::parse(endpoint).map_err(|source| RegistryError::InvalidEndpoint {
            endpoint: endpoint.to_string(),
            source,
        })?;
        let name = base_url.host_str().unwrap_or(endpoint).to_string();
        Ok(Self {
            name,
            base_url,
            client,
        })
    }
}

impl RegistryReplica for HttpReplica {
    fn name(&self) -> &str {
        &self.name
    }

    fn fetch(&self, path: &str) -> impl Future<Output = Result<Vec<u8>, RegistryError>> + Send {
        let request_error = |reason: String| RegistryError::Request {
            replica: self.name.clone(),
            reason,
        };
        let url = self.base_url.join(path);

        async move {
            let url = url.map_err(|e| request_error(e.to_string()))?;
            let response = self
                .client
                .get(url)
                .send()
                .await
                .map_err(|e| request_error(e.to_string()))?;

            let status = response.status();
            if !status.is_success() {
                return Err(request_error(format!("status {status}")));
            }

            let body = response
                .bytes()
                .await
                .map_err(|e| request_error(e.to_string()))?;
            Ok(body.to_vec())
        }
    }
}

/// Fetch and merge registry status from every replica.
pub async fn fetch_registry_status<R: RegistryReplica>(
    replicas: &[R],
    per_replica_timeout: Duration,
) -> Result<Vec<RegistryStatus>, RegistryError> {
    let requests = replicas.iter().map(|replica| async move {
        let outcome = match timeout(per_replica_timeout, replica.fetch(REGISTRY_PATH)).await {
            Ok(Ok(body)) => parse_registry_payload(replica.name(), &body),
            Ok(Err(e)) => Err(e),
            Err(_) => Err(RegistryError::Timeout {
                replica: replica.name().to_string(),
                secs: per_replica_timeout.as_secs(),
            }),
        };
        (replica.name().to_string(), outcome)
    });

    let outcomes = join_all(requests).await;
    merge_replica_outcomes(outcomes)
}

/// Merge per-replica results, keeping the first entry seen for each hostname.
pub fn merge_replica_outcomes(
    outcomes: Vec<(String, Result<Vec<RegistryStatus>, RegistryError>)>,
) -> Result<Vec<RegistryStatus>, RegistryError> {
    if outcomes.is_empty() {
        return Err(RegistryError::NoReplicas);
    }

    let mut errors = Vec::new();
    let mut merged = Vec::new();
    let mut seen = BTreeSet::new();
    let mut succeeded = 0usize;

    for (replica, outcome) in outcomes {
        match outcome {
            Ok(statuses) => {
                succeeded += 1;
                tracing::debug!(replica = %replica, services = statuses.len(), "Registry status received");
                for status in statuses {
                    if seen.insert(status.hostname.clone()) {
                        merged.push(status);
                    }
                }
            }
            Err(e) => {
                tracing::warn!(replica = %replica, error = %e, "Registry fetch failed");
                errors.push(e);
            }
        }
    }

    if succeeded == 0 {
        return Err(RegistryError::AllReplicasFailed(errors));
    }
    Ok(merged)
}
