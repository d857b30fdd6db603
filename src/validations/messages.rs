//! Message codes and their English templates.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::Severity;

/// Fixed vocabulary of findings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum MessageCode {
    #[serde(rename = "destinationrules.nodest.matchingregistry")]
    NoMatchingRegistry,
    #[serde(rename = "destinationrules.nodest.subsetlabels")]
    SubsetLabels,
    #[serde(rename = "destinationrules.nodest.subsetnolabels")]
    SubsetNoLabels,
    #[serde(rename = "gateways.multimatch")]
    GatewayMultiMatch,
    #[serde(rename = "sidecar.egress.invalidhostformat")]
    EgressInvalidHostFormat,
    #[serde(rename = "sidecar.egress.servicenotfound")]
    EgressServiceNotFound,
}

impl MessageCode {
    pub const ALL: [MessageCode; 6] = [
        Self::NoMatchingRegistry,
        Self::SubsetLabels,
        Self::SubsetNoLabels,
        Self::GatewayMultiMatch,
        Self::EgressInvalidHostFormat,
        Self::EgressServiceNotFound,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::NoMatchingRegistry => "destinationrules.nodest.matchingregistry",
            Self::SubsetLabels => "destinationrules.nodest.subsetlabels",
            Self::SubsetNoLabels => "destinationrules.nodest.subsetnolabels",
            Self::GatewayMultiMatch => "gateways.multimatch",
            Self::EgressInvalidHostFormat => "sidecar.egress.invalidhostformat",
            Self::EgressServiceNotFound => "sidecar.egress.servicenotfound",
        }
    }

    pub fn default_severity(&self) -> Severity {
        match self {
            Self::NoMatchingRegistry | Self::SubsetLabels | Self::EgressInvalidHostFormat => {
                Severity::Error
            }
            Self::SubsetNoLabels | Self::GatewayMultiMatch | Self::EgressServiceNotFound => {
                Severity::Warning
            }
        }
    }

    pub fn template(&self) -> &'static str {
        template(*self)
    }
}

impl fmt::Display for MessageCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Human-readable text for `code`.
pub fn template(code: MessageCode) -> &'static str {
    match code {
        MessageCode::NoMatchingRegistry => {
            "This host has no matching entry in the service registry (service, workload or service entries)"
        }
        MessageCode::SubsetLabels => "This subset's labels are not found in any matching host",
        MessageCode::SubsetNoLabels => "This subset has no labels",
        MessageCode::GatewayMultiMatch => "More than one Gateway for the same host port combination",
        MessageCode::EgressInvalidHostFormat => {
            "Invalid host format. 'namespace/dnsName' format expected"
        }
        MessageCode::EgressServiceNotFound => {
            "This host has no matching entry in the service registry"
        }
    }
}
