//! Sidecar egress hosts that are malformed or reach nothing.

use super::ObjectChecker;
use crate::config::MeshConfig;
use crate::hosts::visibility::NO_SERVICE_ENTRIES;
use crate::hosts::{resolve_host, HostEntry, ServiceEntryHosts, Visibility};
use crate::model::{Service, Sidecar};
use crate::registry::RegistryStatus;
use crate::validations::{IstioCheck, IstioValidationKey, MessageCode, ObjectType};

/// Namespace part of a `<namespace>/<hostname>` egress host.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NamespaceSelector<'s> {
    /// `*`
    MeshWide,
    /// `~`
    Unscoped,
    /// `.`
    Local,
    Named(&'s str),
}

/// Split an egress host into its namespace selector and hostname.
///
/// Exactly one `/` with non-empty parts on both sides.
pub fn parse_egress_host(host: &str) -> Option<(NamespaceSelector<'_>, &str)> {
    let (namespace, hostname) = host.split_once('/')?;
    if namespace.is_empty() || hostname.is_empty() || hostname.contains('/') {
        return None;
    }
    let selector = match namespace {
        "*" => NamespaceSelector::MeshWide,
        "~" => NamespaceSelector::Unscoped,
        "." => NamespaceSelector::Local,
        named => NamespaceSelector::Named(named),
    };
    Some((selector, hostname))
}

/// Checks the egress hosts of one sidecar.
#[derive(Debug, Clone, Copy)]
pub struct EgressHostChecker<'a> {
    mesh: &'a MeshConfig,
    sidecar: &'a Sidecar,
    services: &'a [Service],
    service_entries: &'a ServiceEntryHosts,
    registry: &'a [RegistryStatus],
}

impl<'a> EgressHostChecker<'a> {
    pub fn new(mesh: &'a MeshConfig, sidecar: &'a Sidecar) -> Self {
        Self {
            mesh,
            sidecar,
            services: &[],
            service_entries: &NO_SERVICE_ENTRIES,
            registry: &[],
        }
    }

    /// Live services of every namespace.
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

    fn namespace(&self) -> &str {
        &self.sidecar.metadata.namespace
    }

    fn host_resolves(&self, selector: NamespaceSelector<'_>, hostname: &str) -> bool {
        if hostname == "*" {
            return true;
        }

        let visibility = Visibility::new(self.mesh)
            .with_services(self.services)
            .with_service_entries(self.service_entries)
            .with_registry(self.registry);

        if let Some(suffix) = hostname.strip_prefix("*.") {
            let domain_suffix = format!(".{}", self.mesh.identity_domain);
            let namespace_wildcard = suffix
                .strip_suffix(&domain_suffix)
                .filter(|ns| !ns.contains('.'));
            if let Some(ns) = namespace_wildcard {
                if visibility.has_services_in(ns) {
                    return true;
                }
            }
            return self
                .service_entries
                .covers(&HostEntry::parse(hostname), self.namespace());
        }

        // `~` never reaches across namespaces; only `*` does.
        let lookup_namespace = match selector {
            NamespaceSelector::Local | NamespaceSelector::Unscoped => self.namespace(),
            NamespaceSelector::Named(ns) => ns,
            NamespaceSelector::MeshWide => {
                if !hostname.contains('.') && self.services.iter().any(|svc| svc.name() == hostname) {
                    return true;
                }
                self.namespace()
            }
        };

        let known = [lookup_namespace.to_string()];
        let resolved = resolve_host(hostname, lookup_namespace, &known, self.mesh);
        visibility.is_known(&resolved, self.namespace())
    }
}

impl ObjectChecker for EgressHostChecker<'_> {
    fn key(&self) -> IstioValidationKey {
        IstioValidationKey::new(
            ObjectType::Sidecar,
            self.namespace(),
            self.sidecar.metadata.name.as_str(),
        )
    }

    fn check(&self) -> (Vec<IstioCheck>, bool) {
        let mut checks = Vec::new();
        let mut valid = true;

        for (listener_index, listener) in self.sidecar.spec.egress.iter().enumerate() {
            for (host_index, host) in listener.hosts.iter().enumerate() {
                let path = format!("spec/egress[{listener_index}]/hosts[{host_index}]");

                let Some((selector, hostname)) = parse_egress_host(host) else {
                    tracing::debug!(sidecar = %self.sidecar.metadata.name, host = %host, "Malformed egress host");
                    checks.push(IstioCheck::build(MessageCode::EgressInvalidHostFormat, path));
                    valid = false;
                    continue;
                };

                if !self.host_resolves(selector, hostname) {
                    tracing::trace!(sidecar = %self.sidecar.metadata.name, host = %host, "Egress host not found");
                    checks.push(IstioCheck::build(MessageCode::EgressServiceNotFound, path));
                }
            }
        }

        (checks, valid)
    }
}
