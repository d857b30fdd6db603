//! Short-name expansion into cluster-local FQDNs.

use super::matcher::HostEntry;
use crate::config::MeshConfig;

/// A host that names a cluster-local service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocalHost {
    pub service: String,
    pub namespace: String,
    /// `<service>.<namespace>.<identityDomain>`
    pub fqdn: String,
    /// True when `fqdn` was derived rather than written out.
    pub expanded: bool,
}

/// A routing host with every form it may be looked up under.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedHost {
    pub raw: String,
    pub local: Option<LocalHost>,
}

impl ResolvedHost {
    /// Forms to look the host up under: the literal host (unless it is a
    /// bare short name), then the expanded FQDN.
    pub fn candidates(&self) -> impl Iterator<Item = &str> {
        let expanded = self
            .local
            .as_ref()
            .filter(|local| local.expanded)
            .map(|local| local.fqdn.as_str());
        let literal = (self.raw.contains('.') || expanded.is_none()).then_some(self.raw.as_str());
        literal.into_iter().chain(expanded)
    }

    /// Canonical form: the FQDN when local, the raw host otherwise.
    pub fn canonical(&self) -> &str {
        self.local
            .as_ref()
            .map(|local| local.fqdn.as_str())
            .unwrap_or(self.raw.as_str())
    }

    pub fn entry(&self) -> HostEntry {
        HostEntry::parse(self.canonical())
    }

    pub fn is_wildcard(&self) -> bool {
        self.raw.starts_with('*')
    }
}

/// Resolve `host` as written in an object living in `namespace`.
///
/// Shapes:
/// - `svc.ns.<identityDomain>`: already a local FQDN
/// - `svc`: expanded in `namespace`
/// - `svc.ns`: expanded when `ns` is `namespace`, a known namespace, or
///   when no namespace list was supplied
/// - anything else (wildcards included) stays literal
pub fn resolve_host(
    host: &str,
    namespace: &str,
    known_namespaces: &[String],
    mesh: &MeshConfig,
) -> ResolvedHost {
    let local = if host.starts_with('*') {
        None
    } else {
        local_host(host, namespace, known_namespaces, mesh)
    };
    ResolvedHost {
        raw: host.to_string(),
        local,
    }
}

fn local_host(
    host: &str,
    namespace: &str,
    known_namespaces: &[String],
    mesh: &MeshConfig,
) -> Option<LocalHost> {
    let domain_suffix = format!(".{}", mesh.identity_domain);
    if let Some(head) = host.strip_suffix(&domain_suffix) {
        let (service, ns) = head.split_once('.')?;
        if service.is_empty() || ns.is_empty() || ns.contains('.') {
            return None;
        }
        return Some(LocalHost {
            service: service.to_string(),
            namespace: ns.to_string(),
            fqdn: host.to_string(),
            expanded: false,
        });
    }

    if host.is_empty() {
        return None;
    }

    match host.split_once('.') {
        None => Some(LocalHost {
            service: host.to_string(),
            namespace: namespace.to_string(),
            fqdn: mesh.fqdn(host, namespace),
            expanded: true,
        }),
        Some((service, ns)) => {
            let two_part = !service.is_empty() && !ns.is_empty() && !ns.contains('.');
            let known = ns == namespace
                || known_namespaces.is_empty()
                || known_namespaces.iter().any(|known| known == ns);
            (two_part && known).then(|| LocalHost {
                service: service.to_string(),
                namespace: ns.to_string(),
                fqdn: mesh.fqdn(service, ns),
                expanded: true,
            })
        }
    }
}
