//! Gateway host collision detection.

use mesh_validator::checkers::MultiMatchChecker;
use mesh_validator::model::Gateway;
use mesh_validator::validations::{IstioValidationKey, IstioValidations, MessageCode, ObjectType, Severity};

mod common;
use common::*;

fn key(namespace: &str, name: &str) -> IstioValidationKey {
    IstioValidationKey::new(ObjectType::Gateway, namespace, name)
}

fn check(gateways: Vec<Vec<Gateway>>) -> IstioValidations {
    MultiMatchChecker::new(&gateways).check()
}

#[test]
fn test_correct_gateway() {
    let vals = check(vec![vec![http_gateway("validgateway", "test", &[("app", "real")], &["valid"])]]);

    assert!(vals.is_empty());
    assert!(vals.get(&key("test", "validgateway")).is_none());
}

#[test]
fn test_case_insensitive_matching() {
    let vals = check(vec![vec![http_gateway(
        "foxxed",
        "test",
        &[("app", "canidae")],
        &["NOTFINE.example.com", "notfine.example.com"],
    )]]);

    assert_eq!(vals.len(), 1);
    let validation = vals.get(&key("test", "foxxed")).unwrap();
    assert!(validation.valid);
    assert!(validation.references.is_empty());
    assert_eq!(validation.checks.len(), 2);
}

#[test]
fn test_dash_is_not_a_subdomain() {
    let vals = check(vec![vec![http_gateway(
        "foxxed",
        "test",
        &[("app", "canidae")],
        &["api.dev.example.com", "api-dev.example.com"],
    )]]);

    assert!(vals.is_empty());
}

#[test]
fn test_same_host_port_on_different_ingress() {
    let vals = check(vec![
        vec![http_gateway("validgateway", "test", &[("app", "istio-ingress-pub")], &["reviews"])],
        vec![http_gateway("stillvalid", "test", &[("app", "istio-ingress-prv")], &["reviews"])],
    ]);

    assert!(vals.is_empty());
}

#[test]
fn test_same_host_port_in_different_namespace() {
    let vals = check(vec![
        vec![http_gateway("validgateway", "test", &[("app", "real")], &["valid"])],
        vec![http_gateway("stillvalid", "bookinfo", &[("app", "real")], &["valid"])],
    ]);

    assert_eq!(vals.len(), 2);
    let validation = vals.get(&key("bookinfo", "stillvalid")).unwrap();
    let other = vals.get(&key("test", "validgateway")).unwrap();
    assert!(validation.valid);
    assert!(other.valid);

    assert_eq!(validation.references.len(), 1);
    assert!(validation.references.contains(&key("test", "validgateway")));
    assert_eq!(other.references.len(), 1);
    assert!(other.references.contains(&key("bookinfo", "stillvalid")));

    let check = &validation.checks[0];
    assert_eq!(check.code, MessageCode::GatewayMultiMatch);
    assert_eq!(check.severity, Severity::Warning);
    assert_eq!(check.path, "spec/servers[0]/hosts[0]");
}

#[test]
fn test_wildcard_matching_host() {
    let selector = [("istio", "istio-ingress")];
    let vals = check(vec![
        vec![http_gateway("validgateway", "test", &selector, &["valid"])],
        vec![
            http_gateway("stillvalid", "test", &selector, &["*"]),
            http_gateway("keepsvalid", "test", &selector, &["*.justhost.com"]),
        ],
    ]);

    assert_eq!(vals.len(), 3);
    assert!(vals.iter().all(|(_, v)| v.valid));

    // "*" overlaps both; the other two only overlap "*"
    for (key, validation) in vals.iter() {
        let expected = if key.name == "stillvalid" { 2 } else { 1 };
        assert_eq!(validation.references.len(), expected, "gateway {key}");
    }
}

#[test]
fn test_subdomain_wildcard_within_one_gateway() {
    let vals = check(vec![vec![http_gateway(
        "shouldnotbevalid",
        "test",
        &[("app", "monotreme")],
        &["*.echidna.com", "tachyglossa.echidna.com"],
    )]]);

    assert_eq!(vals.len(), 1);
    let validation = vals.get(&key("test", "shouldnotbevalid")).unwrap();
    assert!(validation.valid);
    assert!(validation.references.is_empty());
}

#[test]
fn test_apex_does_not_match_subdomain() {
    let vals = check(vec![vec![http_gateway(
        "shouldbevalid",
        "test",
        &[("app", "someother")],
        &["example.com", "thisisfine.example.com"],
    )]]);

    assert!(vals.is_empty());
}

#[test]
fn test_two_wildcards_matching() {
    let selector = [("istio", "istio-ingress")];
    let vals = check(vec![
        vec![http_gateway("validgateway", "test", &selector, &["*"])],
        vec![http_gateway("stillvalid", "test", &selector, &["*"])],
    ]);

    assert_eq!(vals.len(), 2);
    let validation = vals.get(&key("test", "stillvalid")).unwrap();
    assert!(validation.valid);
    assert_eq!(validation.checks[0].path, "spec/servers[0]/hosts[0]");
}

#[test]
fn test_duplicate_gateways_check_count() {
    let selector = [("app", "real")];
    let vals = check(vec![vec![
        http_gateway("validgateway", "test", &selector, &["valid", "second.valid"]),
        http_gateway("duplicatevalidgateway", "test", &selector, &["valid", "second.valid"]),
    ]]);

    for name in ["validgateway", "duplicatevalidgateway"] {
        let validation = vals.get(&key("test", name)).unwrap();
        let paths: Vec<&str> = validation.checks.iter().map(|c| c.path.as_str()).collect();
        assert_eq!(paths, ["spec/servers[0]/hosts[0]", "spec/servers[0]/hosts[1]"], "gateway {name}");
    }
}

#[test]
fn test_different_ports_do_not_collide() {
    let selector = labels(&[("istio", "ingressgateway")]);
    let vals = check(vec![vec![
        gateway("web", "test", selector.clone(), vec![server(&["shop.example.com"], 80, "HTTP")]),
        gateway("secure", "test", selector, vec![server(&["shop.example.com"], 443, "HTTPS")]),
    ]]);

    assert!(vals.is_empty());
}

#[test]
fn test_same_port_different_protocol_family() {
    let selector = labels(&[("istio", "ingressgateway")]);
    let vals = check(vec![vec![
        gateway("web", "test", selector.clone(), vec![server(&["shop.example.com"], 8080, "HTTP")]),
        gateway("raw", "test", selector.clone(), vec![server(&["shop.example.com"], 8080, "TCP")]),
        gateway("grpc", "test", selector, vec![server(&["shop.example.com"], 8080, "GRPC")]),
    ]]);

    // HTTP and GRPC share a family; TCP stands alone
    assert_eq!(vals.len(), 2);
    assert!(vals.get(&key("test", "raw")).is_none());
    assert!(vals.get(&key("test", "web")).is_some());
    assert!(vals.get(&key("test", "grpc")).is_some());
}

#[test]
fn test_namespace_prefix_is_ignored() {
    let selector = [("istio", "ingressgateway")];
    let vals = check(vec![
        vec![http_gateway("first", "bookinfo", &selector, &["bookinfo/reviews.example.com"])],
        vec![http_gateway("second", "other", &selector, &["reviews.example.com"])],
    ]);

    assert_eq!(vals.len(), 2);
}

#[test]
fn test_checks_sorted_by_location() {
    let selector = labels(&[("istio", "ingressgateway")]);
    let vals = check(vec![vec![
        gateway(
            "late",
            "test",
            selector.clone(),
            vec![
                server(&["b.example.com"], 80, "HTTP"),
                server(&["z.example.com", "a.example.com"], 80, "HTTP"),
            ],
        ),
        gateway("early", "test", selector, vec![server(&["a.example.com", "b.example.com"], 80, "HTTP")]),
    ]]);

    let late = vals.get(&key("test", "late")).unwrap();
    let paths: Vec<&str> = late.checks.iter().map(|c| c.path.as_str()).collect();
    assert_eq!(paths, ["spec/servers[0]/hosts[0]", "spec/servers[1]/hosts[1]"]);
}
