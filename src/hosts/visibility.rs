//! Which hosts are reachable from a namespace.
//!
//! A host is known when it names a live service, is covered by a
//! service-entry host exported to the asking namespace, or is reported by
//! the control-plane registry.

use std::collections::{BTreeMap, BTreeSet};

use super::fqdn::ResolvedHost;
use super::matcher::HostEntry;
use super::protocol::ProtocolFamily;
use crate::config::MeshConfig;
use crate::model::{Service, ServiceEntry, ServiceEntryLocation};
use crate::registry::RegistryStatus;

/// Namespaces a service-entry host is visible from.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub enum ExportScope {
    Mesh,
    Namespace(String),
}

impl ExportScope {
    /// Mesh-external entries are visible everywhere; only mesh-internal
    /// entries honour `exportTo`.
    fn for_entry(entry: &ServiceEntry) -> Vec<Self> {
        let export_to = &entry.spec.export_to;
        if entry.spec.location == ServiceEntryLocation::MeshExternal
            || export_to.is_empty()
            || export_to.iter().any(|scope| scope == "*")
        {
            return vec![Self::Mesh];
        }
        let own_namespace = entry.metadata.namespace.as_str();
        export_to
            .iter()
            .map(|scope| match scope.as_str() {
                "." => Self::Namespace(own_namespace.to_string()),
                other => Self::Namespace(other.to_string()),
            })
            .collect()
    }

    pub fn includes(&self, namespace: &str) -> bool {
        match self {
            Self::Mesh => true,
            Self::Namespace(ns) => ns == namespace,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ServiceEntryHost {
    pub protocols: BTreeSet<ProtocolFamily>,
    pub exports: BTreeSet<ExportScope>,
}

impl ServiceEntryHost {
    pub fn visible_from(&self, namespace: &str) -> bool {
        self.exports.iter().any(|scope| scope.includes(namespace))
    }
}

/// Service-entry hosts keyed by the host as written (literal or wildcard).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ServiceEntryHosts {
    hosts: BTreeMap<String, ServiceEntryHost>,
}

impl ServiceEntryHosts {
    pub const fn new() -> Self {
        Self {
            hosts: BTreeMap::new(),
        }
    }

    pub fn from_entries(entries: &[ServiceEntry]) -> Self {
        let mut hosts: BTreeMap<String, ServiceEntryHost> = BTreeMap::new();
        for entry in entries {
            let exports = ExportScope::for_entry(entry);
            let mut protocols: BTreeSet<ProtocolFamily> = entry
                .spec
                .ports
                .iter()
                .map(|port| ProtocolFamily::from_port_protocol(&port.protocol))
                .collect();
            if protocols.is_empty() {
                protocols.insert(ProtocolFamily::Tcp);
            }

            for host in &entry.spec.hosts {
                let known = hosts.entry(host.clone()).or_default();
                known.protocols.extend(protocols.iter().copied());
                known.exports.extend(exports.iter().cloned());
            }
        }
        Self { hosts }
    }

    pub fn get(&self, host: &str) -> Option<&ServiceEntryHost> {
        self.hosts.get(host)
    }

    pub fn len(&self) -> usize {
        self.hosts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.hosts.is_empty()
    }

    /// Hosts visible from `namespace`, parsed.
    fn visible_from<'a>(&'a self, namespace: &'a str) -> impl Iterator<Item = HostEntry> + 'a {
        self.hosts
            .iter()
            .filter(move |(_, known)| known.visible_from(namespace))
            .map(|(host, _)| HostEntry::parse(host))
    }

    /// Some visible entry host covers `candidate`.
    pub fn covers(&self, candidate: &HostEntry, from_namespace: &str) -> bool {
        self.visible_from(from_namespace)
            .any(|host| host.covers(candidate))
    }

    /// `rule` covers at least one visible entry host.
    pub fn any_covered_by(&self, rule: &HostEntry, from_namespace: &str) -> bool {
        self.visible_from(from_namespace)
            .any(|host| rule.covers(&host))
    }
}

pub(crate) static NO_SERVICE_ENTRIES: ServiceEntryHosts = ServiceEntryHosts::new();

/// The evidence a checker may consult when resolving hosts.
#[derive(Debug, Clone, Copy)]
pub struct Visibility<'a> {
    pub mesh: &'a MeshConfig,
    pub services: &'a [Service],
    pub service_entries: &'a ServiceEntryHosts,
    pub registry: &'a [RegistryStatus],
}

impl<'a> Visibility<'a> {
    pub fn new(mesh: &'a MeshConfig) -> Self {
        Self {
            mesh,
            services: &[],
            service_entries: &NO_SERVICE_ENTRIES,
            registry: &[],
        }
    }

    pub fn with_services(mut self, services: &'a [Service]) -> Self {
        self.services = services;
        self
    }

    pub fn with_service_entries(mut self, service_entries: &'a ServiceEntryHosts) -> Self {
        self.service_entries = service_entries;
        self
    }

    pub fn with_registry(mut self, registry: &'a [RegistryStatus]) -> Self {
        self.registry = registry;
        self
    }

    pub fn has_service(&self, name: &str, namespace: &str) -> bool {
        self.services
            .iter()
            .any(|svc| svc.name() == name && svc.namespace() == namespace)
    }

    pub fn has_services_in(&self, namespace: &str) -> bool {
        self.services.iter().any(|svc| svc.namespace() == namespace)
    }

    pub fn registry_contains(&self, host: &str) -> bool {
        self.registry.iter().any(|status| status.hostname == host)
    }

    /// FQDNs of the live services in view.
    pub fn service_hosts(&self) -> impl Iterator<Item = String> + '_ {
        self.services
            .iter()
            .map(|svc| self.mesh.fqdn(svc.name(), svc.namespace()))
    }

    /// Whether a concrete host resolves from `from_namespace`.
    pub fn is_known(&self, host: &ResolvedHost, from_namespace: &str) -> bool {
        let live = host
            .local
            .as_ref()
            .is_some_and(|local| self.has_service(&local.service, &local.namespace));

        live || host.candidates().any(|candidate| {
            self.service_entries
                .covers(&HostEntry::parse(candidate), from_namespace)
                || self.registry_contains(candidate)
        })
    }

    /// Whether a wildcard rule host covers anything that exists.
    pub fn wildcard_has_targets(&self, rule: &HostEntry, from_namespace: &str) -> bool {
        self.service_hosts()
            .any(|host| rule.matches(&host))
            || self.service_entries.any_covered_by(rule, from_namespace)
            || self.registry.iter().any(|status| rule.matches(&status.hostname))
    }
}
