//! Destination rules whose host or subsets point at nothing.
//!
//! # Responsibilities
//! - Confirm `spec.host` resolves to a service, exported service entry or
//!   registry host
//! - Flag subsets without labels
//! - Flag subsets no live workload carries, at Error when a virtual service
//!   routes to them and Unknown otherwise

use super::ObjectChecker;
use crate::config::MeshConfig;
use crate::hosts::visibility::NO_SERVICE_ENTRIES;
use crate::hosts::{resolve_host, HostEntry, ResolvedHost, ServiceEntryHosts, Visibility};
use crate::model::{labels_include, DestinationRule, Service, Subset, VirtualService, Workload};
use crate::registry::RegistryStatus;
use crate::validations::{IstioCheck, IstioValidationKey, MessageCode, ObjectType, Severity};

/// Checks one destination rule against the workloads and services of its
/// namespace.
#[derive(Debug, Clone, Copy)]
pub struct NoDestinationChecker<'a> {
    mesh: &'a MeshConfig,
    destination_rule: &'a DestinationRule,
    namespaces: &'a [String],
    workloads: &'a [Workload],
    services: &'a [Service],
    virtual_services: &'a [VirtualService],
    service_entries: &'a ServiceEntryHosts,
    registry: &'a [RegistryStatus],
}

impl<'a> NoDestinationChecker<'a> {
    pub fn new(mesh: &'a MeshConfig, destination_rule: &'a DestinationRule) -> Self {
        Self {
            mesh,
            destination_rule,
            namespaces: &[],
            workloads: &[],
            services: &[],
            virtual_services: &[],
            service_entries: &NO_SERVICE_ENTRIES,
            registry: &[],
        }
    }

    /// Known namespace names; empty means "unknown", not "none".
    pub fn with_namespaces(mut self, namespaces: &'a [String]) -> Self {
        self.namespaces = namespaces;
        self
    }

    pub fn with_workloads(mut self, workloads: &'a [Workload]) -> Self {
        self.workloads = workloads;
        self
    }

    pub fn with_services(mut self, services: &'a [Service]) -> Self {
        self.services = services;
        self
    }

    pub fn with_virtual_services(mut self, virtual_services: &'a [VirtualService]) -> Self {
        self.virtual_services = virtual_services;
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
        &self.destination_rule.metadata.namespace
    }

    fn visibility(&self) -> Visibility<'a> {
        Visibility::new(self.mesh)
            .with_services(self.services)
            .with_service_entries(self.service_entries)
            .with_registry(self.registry)
    }

    fn own_namespace_wildcard(&self) -> HostEntry {
        HostEntry::parse(&self.mesh.namespace_wildcard(self.namespace()))
    }

    fn host_found(&self, host: &ResolvedHost) -> bool {
        let visibility = self.visibility();
        if host.is_wildcard() {
            let rule = host.entry();
            return rule.covers(&self.own_namespace_wildcard())
                || visibility.wildcard_has_targets(&rule, self.namespace());
        }
        visibility.is_known(host, self.namespace())
    }

    /// Services whose pods the rule's host selects.
    fn target_services<'s>(&'s self, host: &'s ResolvedHost) -> Box<dyn Iterator<Item = &'a Service> + 's> {
        if host.is_wildcard() {
            let rule = host.entry();
            return Box::new(self.services.iter().filter(move |svc| {
                rule.matches(&self.mesh.fqdn(svc.name(), svc.namespace()))
            }));
        }
        match &host.local {
            // Workloads are only known for the rule's namespace, so a
            // cross-namespace FQDN falls back to the same-named local service.
            Some(local) => Box::new(self.services.iter().filter(move |svc| {
                svc.name() == local.service
                    && (svc.namespace() == local.namespace || svc.namespace() == self.namespace())
            })),
            None => Box::new(std::iter::empty()),
        }
    }

    fn subset_has_workloads(&self, host: &ResolvedHost, subset: &Subset) -> bool {
        if host.is_wildcard() && host.entry().covers(&self.own_namespace_wildcard()) {
            return true;
        }
        self.target_services(host).any(|service| {
            let selector = &service.spec.selector;
            !selector.is_empty()
                && self.workloads.iter().any(|workload| {
                    labels_include(&workload.labels, selector)
                        && labels_include(&workload.labels, &subset.labels)
                })
        })
    }

    fn subset_referenced(&self, host: &ResolvedHost, subset: &str) -> bool {
        let rule = host.entry();
        self.virtual_services.iter().any(|vs| {
            vs.spec
                .destinations()
                .filter(|dest| dest.subset.as_deref() == Some(subset))
                .any(|dest| {
                    let target = resolve_host(&dest.host, &vs.metadata.namespace, self.namespaces, self.mesh);
                    rule.covers(&target.entry())
                })
        })
    }
}

impl ObjectChecker for NoDestinationChecker<'_> {
    fn key(&self) -> IstioValidationKey {
        IstioValidationKey::new(
            ObjectType::DestinationRule,
            self.namespace(),
            self.destination_rule.metadata.name.as_str(),
        )
    }

    fn check(&self) -> (Vec<IstioCheck>, bool) {
        let spec = &self.destination_rule.spec;
        let host = resolve_host(&spec.host, self.namespace(), self.namespaces, self.mesh);

        if !self.host_found(&host) {
            tracing::debug!(
                destination_rule = %self.destination_rule.metadata.name,
                namespace = %self.namespace(),
                host = %spec.host,
                "Destination rule host not found"
            );
            return (vec![IstioCheck::build(MessageCode::NoMatchingRegistry, "spec/host")], false);
        }

        let mut checks = Vec::new();
        for (index, subset) in spec.subsets.iter().enumerate() {
            let path = format!("spec/subsets[{index}]");

            if subset.labels.is_empty() {
                checks.push(IstioCheck::build(MessageCode::SubsetNoLabels, path));
                continue;
            }

            if self.subset_has_workloads(&host, subset) {
                continue;
            }

            let severity = if self.subset_referenced(&host, &subset.name) {
                Severity::Error
            } else {
                Severity::Unknown
            };
            tracing::trace!(subset = %subset.name, path = %path, ?severity, "Subset matches no workload");
            checks.push(IstioCheck::with_severity(MessageCode::SubsetLabels, severity, path));
        }

        let valid = !checks.iter().any(IstioCheck::is_error);
        (checks, valid)
    }
}
