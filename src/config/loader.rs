//! Configuration loading from disk.

use std::fs;
use std::path::Path;

use thiserror::Error;

use crate::config::schema::ValidatorConfig;
use crate::config::validation::{validate_config, ValidationError};

/// Error type for configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation failed: {}", join_errors(.0))]
    Validation(Vec<ValidationError>),
}

fn join_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Load and validate configuration from a TOML file.
pub fn load_config(path: &Path) -> Result<ValidatorConfig, ConfigError> {
    let content = fs::read_to_string(path)?;
    parse_config(&content)
}

/// Parse and validate configuration from TOML text.
pub fn parse_config(content: &str) -> Result<ValidatorConfig, ConfigError> {
    let config: ValidatorConfig = toml::from_str(content)?;

    validate_config(&config).map_err(ConfigError::Validation)?;

    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::schema::LogFormat;

    #[test]
    fn test_empty_document_uses_defaults() {
        let config = parse_config("").unwrap();
        assert_eq!(config.mesh.identity_domain, "svc.cluster.local");
        assert_eq!(config.observability.log_format, LogFormat::Pretty);
        assert!(config.registry.endpoints.is_empty());
    }

    #[test]
    fn test_partial_document() {
        let config = parse_config(
            r#"
            [mesh]
            identity_domain = "svc.mesh1.local"

            [observability]
            log_format = "json"

            [registry]
            endpoints = ["http://istiod-0.istio-system:15014"]
            replicas = ["istiod-1"]
            "#,
        )
        .unwrap();

        assert_eq!(config.mesh.identity_domain, "svc.mesh1.local");
        assert_eq!(config.mesh.istio_namespace, "istio-system");
        assert_eq!(config.observability.log_format, LogFormat::Json);
        assert_eq!(config.registry.timeout_secs, 10);
        assert_eq!(config.registry.debug_port, 15014);
        assert_eq!(
            config.registry.all_endpoints(&config.mesh),
            ["http://istiod-0.istio-system:15014", "http://istiod-1.istio-system:15014"]
        );
    }

    #[test]
    fn test_semantic_errors_surface() {
        let err = parse_config("[registry]\ntimeout_secs = 0\n").unwrap_err();
        assert!(matches!(err, ConfigError::Validation(ref errors) if errors.len() == 1));
        assert_eq!(
            err.to_string(),
            "Validation failed: registry.timeout_secs must be greater than zero"
        );
    }

    #[test]
    fn test_unknown_log_format_is_parse_error() {
        let err = parse_config("[observability]\nlog_format = \"xml\"\n").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }
}
