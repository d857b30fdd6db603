//! Gateways that claim the same host and port on one ingress workload.
//!
//! # Design Decisions
//! - Buckets are keyed by (selector, port, protocol family); only hosts in
//!   the same bucket can shadow each other
//! - Hosts are compared lower-cased with any `namespace/` prefix removed
//! - Collisions are Warnings; a gateway stays valid
//! - Two hosts of the same gateway may collide; the gateway then carries the
//!   checks but no self-reference

use std::collections::{BTreeMap, BTreeSet};

use crate::hosts::{HostEntry, ProtocolFamily};
use crate::model::{selector_string, Gateway, Server};
use crate::validations::{IstioCheck, IstioValidationKey, IstioValidations, MessageCode, ObjectType};

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
struct BucketKey {
    selector: String,
    port: u32,
    protocol: ProtocolFamily,
}

impl BucketKey {
    fn new(selector: &str, server: &Server) -> Self {
        let (port, protocol) = server
            .port
            .as_ref()
            .map_or((0, ""), |port| (port.number, port.protocol.as_str()));
        Self {
            selector: selector.to_string(),
            port,
            protocol: ProtocolFamily::from_port_protocol(protocol),
        }
    }
}

/// One host entry of one gateway server.
#[derive(Debug, Clone)]
struct HostSlot {
    gateway: IstioValidationKey,
    server: usize,
    host: usize,
    entry: HostEntry,
}

#[derive(Debug, Default)]
struct Collisions {
    locations: BTreeSet<(usize, usize)>,
    references: BTreeSet<IstioValidationKey>,
}

/// Detects overlapping gateway hosts across every namespace.
#[derive(Debug, Clone, Copy)]
pub struct MultiMatchChecker<'a> {
    gateways_per_namespace: &'a [Vec<Gateway>],
}

impl<'a> MultiMatchChecker<'a> {
    pub fn new(gateways_per_namespace: &'a [Vec<Gateway>]) -> Self {
        Self {
            gateways_per_namespace,
        }
    }

    pub fn check(&self) -> IstioValidations {
        let mut buckets: BTreeMap<BucketKey, Vec<HostSlot>> = BTreeMap::new();
        let mut collisions: BTreeMap<IstioValidationKey, Collisions> = BTreeMap::new();

        for gateway in self.gateways_per_namespace.iter().flatten() {
            let key = IstioValidationKey::new(
                ObjectType::Gateway,
                gateway.metadata.namespace.as_str(),
                gateway.metadata.name.as_str(),
            );
            let selector = selector_string(&gateway.spec.selector);

            for (server_index, server) in gateway.spec.servers.iter().enumerate() {
                let earlier = buckets.entry(BucketKey::new(&selector, server)).or_default();

                for (host_index, host) in server.hosts.iter().enumerate() {
                    let slot = HostSlot {
                        gateway: key.clone(),
                        server: server_index,
                        host: host_index,
                        entry: HostEntry::parse(&normalize_host(host)),
                    };

                    for other in earlier.iter().filter(|other| other.entry.overlaps(&slot.entry)) {
                        tracing::debug!(
                            gateway = %slot.gateway,
                            host = %slot.entry,
                            other_gateway = %other.gateway,
                            other_host = %other.entry,
                            "Gateway hosts overlap"
                        );
                        record(&mut collisions, &slot, &other.gateway);
                        record(&mut collisions, other, &slot.gateway);
                    }
                    earlier.push(slot);
                }
            }
        }

        let mut validations = IstioValidations::new();
        for (key, found) in collisions {
            let validation = validations.entry(key);
            for (server, host) in found.locations {
                validation.add_check(IstioCheck::build(
                    MessageCode::GatewayMultiMatch,
                    format!("spec/servers[{server}]/hosts[{host}]"),
                ));
            }
            for reference in found.references {
                validation.add_reference(reference);
            }
        }
        validations
    }
}

fn record(
    collisions: &mut BTreeMap<IstioValidationKey, Collisions>,
    slot: &HostSlot,
    other: &IstioValidationKey,
) {
    let found = collisions.entry(slot.gateway.clone()).or_default();
    found.locations.insert((slot.server, slot.host));
    found.references.insert(other.clone());
}

/// Lower-case and drop a `namespace/` prefix.
fn normalize_host(host: &str) -> String {
    host.split_once('/')
        .map_or(host, |(_, name)| name)
        .to_lowercase()
}
