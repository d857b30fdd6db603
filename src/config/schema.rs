//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the validator.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};

/// Root configuration for the validator.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct ValidatorConfig {
    /// Mesh-wide constants threaded into every checker.
    pub mesh: MeshConfig,

    /// Logging settings.
    pub observability: ObservabilityConfig,

    /// Control-plane registry endpoints.
    pub registry: RegistryConfig,

    /// Report rendering.
    pub output: OutputConfig,
}

/// Mesh identity settings.
///
/// Passed explicitly to the host matcher and the checkers so that several
/// configurations can be validated side by side.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct MeshConfig {
    /// Cluster-local suffix appended to `<service>.<namespace>`.
    pub identity_domain: String,

    /// Namespace hosting the control plane.
    pub istio_namespace: String,
}

impl Default for MeshConfig {
    fn default() -> Self {
        Self {
            identity_domain: "svc.cluster.local".to_string(),
            istio_namespace: "istio-system".to_string(),
        }
    }
}

impl MeshConfig {
    /// Fully-qualified name of a service living in `namespace`.
    pub fn fqdn(&self, service: &str, namespace: &str) -> String {
        format!("{}.{}.{}", service, namespace, self.identity_domain)
    }

    /// Wildcard host selecting every service of `namespace`.
    pub fn namespace_wildcard(&self, namespace: &str) -> String {
        self.fqdn("*", namespace)
    }

    /// Debug base URL of a control-plane replica addressed by name.
    pub fn control_plane_endpoint(&self, replica: &str, port: u16) -> String {
        format!("http://{}.{}:{}", replica, self.istio_namespace, port)
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log filter (trace, debug, info, warn, error or a full directive).
    pub log_level: String,

    /// Human-readable or JSON log lines.
    pub log_format: LogFormat,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_format: LogFormat::Pretty,
        }
    }
}

/// Control-plane registry configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct RegistryConfig {
    /// Debug base URLs of the control-plane replicas (e.g. `http://istiod-0:15014`).
    pub endpoints: Vec<String>,

    /// Replica names resolved inside `mesh.istio_namespace`.
    pub replicas: Vec<String>,

    /// Debug port used for `replicas`.
    pub debug_port: u16,

    /// Per-replica request timeout in seconds.
    pub timeout_secs: u64,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            endpoints: Vec::new(),
            replicas: Vec::new(),
            debug_port: 15014,
            timeout_secs: 10,
        }
    }
}

impl RegistryConfig {
    /// Explicit endpoints followed by the named replicas.
    pub fn all_endpoints(&self, mesh: &MeshConfig) -> Vec<String> {
        self.endpoints
            .iter()
            .cloned()
            .chain(
                self.replicas
                    .iter()
                    .map(|replica| mesh.control_plane_endpoint(replica, self.debug_port)),
            )
            .collect()
    }
}

/// Report rendering configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Pretty-print the JSON report.
    pub pretty: bool,

    /// Drop objects whose validation is still valid.
    pub only_invalid: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            pretty: true,
            only_invalid: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fqdn_expansion() {
        let mesh = MeshConfig::default();
        assert_eq!(mesh.fqdn("reviews", "bookinfo"), "reviews.bookinfo.svc.cluster.local");
        assert_eq!(mesh.namespace_wildcard("bookinfo"), "*.bookinfo.svc.cluster.local");
    }

    #[test]
    fn test_replicas_resolve_in_control_plane_namespace() {
        let mesh = MeshConfig {
            istio_namespace: "mesh-system".to_string(),
            ..MeshConfig::default()
        };
        let registry = RegistryConfig {
            endpoints: vec!["http://10.0.0.5:15014".to_string()],
            replicas: vec!["istiod-0".to_string(), "istiod-1".to_string()],
            ..RegistryConfig::default()
        };

        assert_eq!(
            registry.all_endpoints(&mesh),
            [
                "http://10.0.0.5:15014",
                "http://istiod-0.mesh-system:15014",
                "http://istiod-1.mesh-system:15014",
            ]
        );
        assert!(RegistryConfig::default().all_endpoints(&mesh).is_empty());
    }
}
