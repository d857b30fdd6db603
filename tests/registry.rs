//! Registry status fetched from control-plane replicas over HTTP.

use std::time::Duration;

use mesh_validator::registry::{fetch_registry_status, HttpReplica, RegistryError};
use mesh_validator::validations::ObjectType;
use mesh_validator::{validate_snapshot, IstioValidationKey, MeshConfig, MeshSnapshot};

mod common;

const PAYLOAD: &str = r#"[
    {"hostname": "ratings.mesh2-bookinfo.svc.mesh1-imports.local"},
    {"hostname": "details.bookinfo.svc.cluster.local"}
]"#;

fn client() -> reqwest::Client {
    reqwest::Client::builder()
        .pool_max_idle_per_host(0)
        .no_proxy()
        .build()
        .unwrap()
}

fn replica(addr: std::net::SocketAddr) -> HttpReplica {
    HttpReplica::new(&format!("http://{addr}"), client()).unwrap()
}

#[tokio::test]
async fn test_fetch_from_healthy_replica() {
    let addr = common::start_replica(200, PAYLOAD, Duration::ZERO).await;

    let statuses = fetch_registry_status(&[replica(addr)], Duration::from_secs(2))
        .await
        .unwrap();

    assert_eq!(statuses.len(), 2);
    assert_eq!(statuses[0].hostname, "ratings.mesh2-bookinfo.svc.mesh1-imports.local");
    assert_eq!(statuses[0].pilot.as_deref(), Some("127.0.0.1"));
}

#[tokio::test]
async fn test_failing_replica_is_tolerated() {
    let healthy = common::start_replica(200, PAYLOAD, Duration::ZERO).await;
    let broken = common::start_replica(503, "unavailable", Duration::ZERO).await;
    let slow = common::start_replica(200, PAYLOAD, Duration::from_secs(5)).await;

    let replicas = [replica(broken), replica(slow), replica(healthy)];
    let statuses = fetch_registry_status(&replicas, Duration::from_millis(500))
        .await
        .unwrap();

    assert_eq!(statuses.len(), 2);
}

#[tokio::test]
async fn test_every_replica_failing_is_an_error() {
    let broken = common::start_replica(500, "boom", Duration::ZERO).await;
    let garbage = common::start_replica(200, "not json", Duration::ZERO).await;

    let err = fetch_registry_status(&[replica(broken), replica(garbage)], Duration::from_secs(2))
        .await
        .unwrap_err();

    match err {
        RegistryError::AllReplicasFailed(errors) => {
            assert_eq!(errors.len(), 2);
            assert!(matches!(errors[0], RegistryError::Request { .. }));
            assert!(matches!(errors[1], RegistryError::Malformed { .. }));
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[tokio::test]
async fn test_fetched_registry_feeds_validation() {
    let addr = common::start_replica(200, PAYLOAD, Duration::ZERO).await;
    let statuses = fetch_registry_status(&[replica(addr)], Duration::from_secs(2))
        .await
        .unwrap();

    let mut snapshot = MeshSnapshot::from_json(
        r#"{"destinationRules": [
            {"metadata": {"name": "ratings", "namespace": "test"}, "spec": {"host": "ratings.mesh2-bookinfo.svc.mesh1-imports.local"}}
        ]}"#,
    )
    .unwrap();
    let key = IstioValidationKey::new(ObjectType::DestinationRule, "test", "ratings");

    let before = validate_snapshot(&snapshot, &MeshConfig::default());
    assert!(!before.get(&key).unwrap().valid);

    snapshot.extend_registry(statuses);
    let after = validate_snapshot(&snapshot, &MeshConfig::default());
    assert!(after.get(&key).unwrap().valid);
}
