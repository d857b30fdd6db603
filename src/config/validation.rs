//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Reject identity domains the host matcher cannot expand against
//! - Validate value ranges (timeouts > 0, endpoints and replica names parse as URLs)
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: ValidatorConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use thiserror::Error;
use tracing_subscriber::EnvFilter;
use url::Url;

use crate::config::schema::ValidatorConfig;

/// A single semantic problem in a configuration file.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("mesh.identity_domain must not be empty")]
    EmptyIdentityDomain,

    #[error("mesh.identity_domain '{0}' must not start or end with '.'")]
    MalformedIdentityDomain(String),

    #[error("mesh.identity_domain '{0}' must not contain wildcards")]
    WildcardIdentityDomain(String),

    #[error("mesh.istio_namespace must not be empty")]
    EmptyIstioNamespace,

    #[error("observability.log_level '{0}' is not a valid filter directive")]
    InvalidLogLevel(String),

    #[error("registry.timeout_secs must be greater than zero")]
    ZeroRegistryTimeout,

    #[error("registry.endpoints[{index}] '{endpoint}' is not a valid URL")]
    InvalidRegistryEndpoint { index: usize, endpoint: String },

    #[error("registry.replicas[{index}] '{replica}' is not a valid host name")]
    InvalidRegistryReplica { index: usize, replica: String },
}

/// Validate a parsed configuration, collecting every failure.
pub fn validate_config(config: &ValidatorConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    let domain = config.mesh.identity_domain.trim();
    if domain.is_empty() {
        errors.push(ValidationError::EmptyIdentityDomain);
    } else if domain.starts_with('.') || domain.ends_with('.') {
        errors.push(ValidationError::MalformedIdentityDomain(domain.to_string()));
    } else if domain.contains('*') {
        errors.push(ValidationError::WildcardIdentityDomain(domain.to_string()));
    }

    if config.mesh.istio_namespace.trim().is_empty() {
        errors.push(ValidationError::EmptyIstioNamespace);
    }

    if EnvFilter::try_new(&config.observability.log_level).is_err() {
        errors.push(ValidationError::InvalidLogLevel(
            config.observability.log_level.clone(),
        ));
    }

    if config.registry.timeout_secs == 0 {
        errors.push(ValidationError::ZeroRegistryTimeout);
    }

    for (index, endpoint) in config.registry.endpoints.iter().enumerate() {
        if Url::parse(endpoint).is_err() {
            errors.push(ValidationError::InvalidRegistryEndpoint {
                index,
                endpoint: endpoint.clone(),
            });
        }
    }

    for (index, replica) in config.registry.replicas.iter().enumerate() {
        let endpoint = config
            .mesh
            .control_plane_endpoint(replica, config.registry.debug_port);
        if replica.trim().is_empty() || replica.contains('/') || Url::parse(&endpoint).is_err() {
            errors.push(ValidationError::InvalidRegistryReplica {
                index,
                replica: replica.clone(),
            });
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
