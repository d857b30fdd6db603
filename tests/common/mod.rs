//! Shared fixture builders for integration tests.

#![allow(dead_code)]

use std::net::SocketAddr;
use std::time::Duration;

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;

use mesh_validator::config::MeshConfig;
use mesh_validator::model::{
    Destination, DestinationRule, DestinationRuleSpec, EgressListener, Gateway, GatewaySpec,
    Labels, ObjectMeta, Port, RouteDestination, RouteRule, Server, Service, ServiceEntry,
    ServiceEntryLocation, ServiceEntrySpec, ServiceSpec, Sidecar, SidecarSpec, Subset,
    VirtualService, VirtualServiceSpec, Workload,
};
use mesh_validator::registry::RegistryStatus;

pub fn mesh() -> MeshConfig {
    MeshConfig::default()
}

pub fn labels(pairs: &[(&str, &str)]) -> Labels {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

pub fn app_version(app: &str, version: &str) -> Labels {
    labels(&[("app", app), ("version", version)])
}

pub fn strings(values: &[&str]) -> Vec<String> {
    values.iter().map(|v| v.to_string()).collect()
}

// =============================================================================
// Cluster objects
// =============================================================================

pub fn workload(name: &str, namespace: &str, labels: Labels) -> Workload {
    Workload {
        name: name.to_string(),
        namespace: namespace.to_string(),
        labels,
        istio_sidecar: true,
    }
}

/// `reviews` v1 and v2 workloads.
pub fn reviews_workloads(namespace: &str) -> Vec<Workload> {
    vec![
        workload("reviewsv1", namespace, app_version("reviews", "v1")),
        workload("reviewsv2", namespace, app_version("reviews", "v2")),
    ]
}

pub fn service(name: &str, namespace: &str) -> Service {
    Service {
        metadata: ObjectMeta::new(name, namespace),
        spec: ServiceSpec {
            selector: labels(&[("app", name)]),
        },
    }
}

pub fn registry(hosts: &[&str]) -> Vec<RegistryStatus> {
    hosts.iter().map(|host| RegistryStatus::new(*host)).collect()
}

// =============================================================================
// Destination rules and virtual services
// =============================================================================

pub fn subset(name: &str, labels: Labels) -> Subset {
    Subset {
        name: name.to_string(),
        labels,
    }
}

pub fn destination_rule(namespace: &str, name: &str, host: &str, subsets: Vec<Subset>) -> DestinationRule {
    DestinationRule {
        metadata: ObjectMeta::new(name, namespace),
        spec: DestinationRuleSpec {
            host: host.to_string(),
            subsets,
        },
    }
}

/// Rule with `v1` and `v2` subsets keyed on `version`.
pub fn versioned_rule(namespace: &str, host: &str) -> DestinationRule {
    destination_rule(
        namespace,
        "name",
        host,
        vec![
            subset("v1", labels(&[("version", "v1")])),
            subset("v2", labels(&[("version", "v2")])),
        ],
    )
}

pub fn route(host: &str, subset: &str, weight: i32) -> RouteDestination {
    RouteDestination {
        destination: Some(Destination {
            host: host.to_string(),
            subset: Some(subset.to_string()),
        }),
        weight,
    }
}

pub fn virtual_service(namespace: &str, name: &str, hosts: &[&str], http: Vec<RouteDestination>) -> VirtualService {
    VirtualService {
        metadata: ObjectMeta::new(name, namespace),
        spec: VirtualServiceSpec {
            hosts: strings(hosts),
            http: vec![RouteRule {
                name: None,
                route: http,
            }],
            ..Default::default()
        },
    }
}

// =============================================================================
// Service entries
// =============================================================================

pub fn service_entry(
    name: &str,
    namespace: &str,
    hosts: &[&str],
    location: ServiceEntryLocation,
) -> ServiceEntry {
    ServiceEntry {
        metadata: ObjectMeta::new(name, namespace),
        spec: ServiceEntrySpec {
            hosts: strings(hosts),
            ports: Vec::new(),
            location,
            export_to: Vec::new(),
        },
    }
}

pub fn mesh_internal_entry(name: &str, namespace: &str, hosts: &[&str]) -> ServiceEntry {
    service_entry(name, namespace, hosts, ServiceEntryLocation::MeshInternal)
}

pub fn mesh_external_entry(name: &str, namespace: &str, hosts: &[&str]) -> ServiceEntry {
    service_entry(name, namespace, hosts, ServiceEntryLocation::MeshExternal)
}

pub fn tcp_port(number: u32) -> Port {
    Port {
        number,
        protocol: "TCP".to_string(),
        name: "tcp".to_string(),
    }
}

// =============================================================================
// Gateways and sidecars
// =============================================================================

pub fn server(hosts: &[&str], number: u32, protocol: &str) -> Server {
    Server {
        port: Some(Port {
            number,
            protocol: protocol.to_string(),
            name: protocol.to_string(),
        }),
        hosts: strings(hosts),
    }
}

pub fn gateway(name: &str, namespace: &str, selector: Labels, servers: Vec<Server>) -> Gateway {
    Gateway {
        metadata: ObjectMeta::new(name, namespace),
        spec: GatewaySpec { selector, servers },
    }
}

pub fn http_gateway(name: &str, namespace: &str, selector: &[(&str, &str)], hosts: &[&str]) -> Gateway {
    gateway(name, namespace, labels(selector), vec![server(hosts, 80, "http")])
}

/// Sidecar `sidecar` in `bookinfo` with one egress listener.
pub fn sidecar_with_hosts(hosts: &[&str]) -> Sidecar {
    Sidecar {
        metadata: ObjectMeta::new("sidecar", "bookinfo"),
        spec: SidecarSpec {
            egress: vec![EgressListener {
                port: None,
                hosts: strings(hosts),
            }],
        },
    }
}

// =============================================================================
// Control-plane replicas
// =============================================================================

/// Serve every request with `status` and `body` after `delay`; returns the
/// bound address.
pub async fn start_replica(status: u16, body: &str, delay: Duration) -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let body = body.to_string();

    tokio::spawn(async move {
        while let Ok((mut socket, _)) = listener.accept().await {
            let body = body.clone();
            tokio::spawn(async move {
                let mut request = [0u8; 1024];
                let _ = socket.read(&mut request).await;
                tokio::time::sleep(delay).await;

                let status_text = match status {
                    200 => "200 OK",
                    404 => "404 Not Found",
                    503 => "503 Service Unavailable",
                    _ => "500 Internal Server Error",
                };
                let response = format!(
                    "HTTP/1.1 {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                    status_text,
                    body.len(),
                    body
                );
                let _ = socket.write_all(response.as_bytes()).await;
                let _ = socket.shutdown().await;
            });
        }
    });

    addr
}
