//! A point-in-time view of the mesh, as read from a JSON document.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::networking::{DestinationRule, Gateway, ServiceEntry, Sidecar, VirtualService};
use super::workload::{Namespace, Service, Workload};
use crate::registry::RegistryStatus;

#[derive(Debug, Error)]
pub enum SnapshotError {
    #[error("Failed to read snapshot: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse snapshot: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Everything the checkers need, gathered up front.
///
/// Every section is optional in the document and defaults to empty.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct MeshSnapshot {
    pub namespaces: Vec<Namespace>,
    pub services: Vec<Service>,
    pub workloads: Vec<Workload>,
    pub virtual_services: Vec<VirtualService>,
    pub destination_rules: Vec<DestinationRule>,
    pub gateways: Vec<Gateway>,
    pub sidecars: Vec<Sidecar>,
    pub service_entries: Vec<ServiceEntry>,
    pub registry_status: Vec<RegistryStatus>,
}

impl MeshSnapshot {
    pub fn from_json(input: &str) -> Result<Self, SnapshotError> {
        Ok(serde_json::from_str(input)?)
    }

    pub fn load(path: &Path) -> Result<Self, SnapshotError> {
        let content = fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    pub fn namespace_names(&self) -> Vec<String> {
        self.namespaces.iter().map(|ns| ns.name.clone()).collect()
    }

    /// Gateways grouped by namespace, in namespace order.
    pub fn gateways_per_namespace(&self) -> Vec<Vec<Gateway>> {
        let mut grouped: BTreeMap<&str, Vec<Gateway>> = BTreeMap::new();
        for gateway in &self.gateways {
            grouped
                .entry(gateway.metadata.namespace.as_str())
                .or_default()
                .push(gateway.clone());
        }
        grouped.into_values().collect()
    }

    /// Append registry entries not already present.
    pub fn extend_registry(&mut self, statuses: Vec<RegistryStatus>) {
        for status in statuses {
            if !self
                .registry_status
                .iter()
                .any(|known| known.hostname == status.hostname)
            {
                self.registry_status.push(status);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_sections_default_to_empty() {
        let snapshot = MeshSnapshot::from_json(
            r#"{"namespaces":[{"name":"bookinfo"}],"registryStatus":[{"hostname":"a.b"}]}"#,
        )
        .unwrap();
        assert_eq!(snapshot.namespace_names(), vec!["bookinfo"]);
        assert_eq!(snapshot.registry_status.len(), 1);
        assert!(snapshot.destination_rules.is_empty());
        assert!(snapshot.gateways.is_empty());
    }

    #[test]
    fn test_gateways_grouped_by_namespace() {
        let snapshot = MeshSnapshot::from_json(
            r#"{"gateways":[
                {"metadata":{"name":"gw-b","namespace":"beta"},"spec":{}},
                {"metadata":{"name":"gw-a1","namespace":"alpha"},"spec":{}},
                {"metadata":{"name":"gw-a2","namespace":"alpha"},"spec":{}}
            ]}"#,
        )
        .unwrap();

        let grouped = snapshot.gateways_per_namespace();
        assert_eq!(grouped.len(), 2);
        assert_eq!(grouped[0].len(), 2);
        assert_eq!(grouped[0][0].metadata.name, "gw-a1");
        assert_eq!(grouped[1][0].metadata.name, "gw-b");
    }

    #[test]
    fn test_extend_registry_skips_known_hosts() {
        let mut snapshot = MeshSnapshot::default();
        snapshot.registry_status.push(RegistryStatus::new("a.b"));
        snapshot.extend_registry(vec![RegistryStatus::new("a.b"), RegistryStatus::new("c.d")]);
        assert_eq!(snapshot.registry_status.len(), 2);
    }

    #[test]
    fn test_malformed_snapshot() {
        assert!(matches!(
            MeshSnapshot::from_json("{\"gateways\": 3}"),
            Err(SnapshotError::Parse(_))
        ));
    }
}
