//! Checker subsystem.
//!
//! # Data Flow
//! ```text
//! MeshSnapshot + MeshConfig
//!     → build ServiceEntryHosts once
//!     → one NoDestinationChecker per destination rule (its namespace's workloads/services)
//!     → one EgressHostChecker per sidecar
//!     → one MultiMatchChecker over all gateways, grouped per namespace
//!     → merge every result into a single IstioValidations
//! ```
//!
//! # Design Decisions
//! - Checkers borrow the snapshot and never mutate it
//! - Per-object checkers always report their object, even with no findings
//! - Only the gateway checker produces cross-references

pub mod destination_rules;
pub mod gateways;
pub mod sidecars;

use std::collections::BTreeMap;

pub use destination_rules::NoDestinationChecker;
pub use gateways::MultiMatchChecker;
pub use sidecars::{parse_egress_host, EgressHostChecker, NamespaceSelector};

use crate::config::MeshConfig;
use crate::hosts::ServiceEntryHosts;
use crate::model::{MeshSnapshot, Service, Workload};
use crate::validations::{IstioCheck, IstioValidation, IstioValidationKey, IstioValidations};

/// A checker that judges exactly one object.
pub trait ObjectChecker {
    /// Identity of the object under check.
    fn key(&self) -> IstioValidationKey;

    /// Findings in path order, plus the verdict.
    fn check(&self) -> (Vec<IstioCheck>, bool);

    fn validate(&self) -> IstioValidation {
        let (checks, valid) = self.check();
        let mut validation = IstioValidation::new(&self.key());
        for check in checks {
            validation.add_check(check);
        }
        validation.valid &= valid;
        validation
    }
}

/// Every checker the engine runs.
#[derive(Debug, Clone, Copy)]
pub enum Checker<'a> {
    NoDestination(NoDestinationChecker<'a>),
    MultiMatch(MultiMatchChecker<'a>),
    EgressHost(EgressHostChecker<'a>),
}

impl Checker<'_> {
    pub fn name(&self) -> &'static str {
        match self {
            Self::NoDestination(_) => "no_destination",
            Self::MultiMatch(_) => "multi_match",
            Self::EgressHost(_) => "egress_host",
        }
    }

    pub fn run(&self) -> IstioValidations {
        match self {
            Self::NoDestination(checker) => std::iter::once(checker.validate()).collect(),
            Self::MultiMatch(checker) => checker.check(),
            Self::EgressHost(checker) => std::iter::once(checker.validate()).collect(),
        }
    }
}

fn group_by_namespace<'s, T: Clone>(
    items: &'s [T],
    namespace: impl Fn(&T) -> &str,
) -> BTreeMap<&'s str, Vec<T>> {
    let mut grouped: BTreeMap<&str, Vec<T>> = BTreeMap::new();
    for item in items {
        grouped.entry(namespace(item)).or_default().push(item.clone());
    }
    grouped
}

/// Run every checker over `snapshot` and merge the results.
pub fn validate_snapshot(snapshot: &MeshSnapshot, mesh: &MeshConfig) -> IstioValidations {
    let namespaces = snapshot.namespace_names();
    let service_entries = ServiceEntryHosts::from_entries(&snapshot.service_entries);
    let gateways = snapshot.gateways_per_namespace();
    let services: BTreeMap<&str, Vec<Service>> =
        group_by_namespace(&snapshot.services, |svc: &Service| svc.namespace());
    let workloads: BTreeMap<&str, Vec<Workload>> =
        group_by_namespace(&snapshot.workloads, |workload: &Workload| workload.namespace.as_str());

    let mut checkers = Vec::with_capacity(snapshot.destination_rules.len() + snapshot.sidecars.len() + 1);

    for rule in &snapshot.destination_rules {
        let namespace = rule.metadata.namespace.as_str();
        checkers.push(Checker::NoDestination(
            NoDestinationChecker::new(mesh, rule)
                .with_namespaces(&namespaces)
                .with_workloads(workloads.get(namespace).map(Vec::as_slice).unwrap_or_default())
                .with_services(services.get(namespace).map(Vec::as_slice).unwrap_or_default())
                .with_virtual_services(&snapshot.virtual_services)
                .with_service_entries(&service_entries)
                .with_registry(&snapshot.registry_status),
        ));
    }

    for sidecar in &snapshot.sidecars {
        checkers.push(Checker::EgressHost(
            EgressHostChecker::new(mesh, sidecar)
                .with_services(&snapshot.services)
                .with_service_entries(&service_entries)
                .with_registry(&snapshot.registry_status),
        ));
    }

    checkers.push(Checker::MultiMatch(MultiMatchChecker::new(&gateways)));

    let mut validations = IstioValidations::new();
    for checker in &checkers {
        let found = checker.run();
        tracing::trace!(checker = checker.name(), objects = found.len(), "Checker finished");
        validations.merge(found);
    }

    tracing::debug!(
        objects = validations.len(),
        invalid = validations.invalid_count(),
        "Snapshot validated"
    );
    validations
}
