//! Object metadata and label-selector helpers.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Label set of an object, ordered so that renderings are stable.
pub type Labels = BTreeMap<String, String>;

/// Metadata shared by every mesh and cluster object.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ObjectMeta {
    /// Resource name
    pub name: String,
    /// Resource namespace
    #[serde(default)]
    pub namespace: String,
    /// Labels
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub labels: Labels,
}

impl ObjectMeta {
    pub fn new(name: impl Into<String>, namespace: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            namespace: namespace.into(),
            labels: Labels::new(),
        }
    }
}

/// True when every `key=value` pair of `selector` is present in `labels`.
///
/// An empty selector selects everything.
pub fn labels_include(labels: &Labels, selector: &Labels) -> bool {
    selector
        .iter()
        .all(|(key, value)| labels.get(key) == Some(value))
}

/// Canonical `k1=v1,k2=v2` rendering of a selector.
pub fn selector_string(selector: &Labels) -> String {
    selector
        .iter()
        .map(|(key, value)| format!("{key}={value}"))
        .collect::<Vec<_>>()
        .join(",")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn labels(pairs: &[(&str, &str)]) -> Labels {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_inclusion_not_equality() {
        let workload = labels(&[("app", "reviews"), ("version", "v1")]);
        assert!(labels_include(&workload, &labels(&[("version", "v1")])));
        assert!(labels_include(&workload, &Labels::new()));
        assert!(!labels_include(&workload, &labels(&[("version", "v1"), ("seek", "notfound")])));
        assert!(!labels_include(&workload, &labels(&[("version", "v2")])));
    }

    #[test]
    fn test_selector_string_is_sorted() {
        let selector = labels(&[("istio", "ingressgateway"), ("app", "gw")]);
        assert_eq!(selector_string(&selector), "app=gw,istio=ingressgateway");
        assert_eq!(selector_string(&Labels::new()), "");
    }
}
