//! Wildcard-aware hostname matching.
//!
//! # Responsibilities
//! - Parse routing hosts into a name plus a leading-wildcard flag
//! - Match a concrete candidate against a rule host
//! - Decide subsumption (`covers`) and gateway shadowing (`overlaps`)
//!
//! # Design Decisions
//! - Matching is case-sensitive; callers lower-case where they need to
//! - `*.suffix` never matches the apex `suffix` itself
//! - No regex, suffix comparison only

use std::fmt;

/// A parsed routing host.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct HostEntry {
    /// Host without the leading `*.`; empty for the full wildcard.
    pub name: String,
    /// Whether the host started with `*` and so selects subdomains.
    pub subdomains_wildcard: bool,
}

impl HostEntry {
    pub fn parse(host: &str) -> Self {
        if host == "*" {
            return Self {
                name: String::new(),
                subdomains_wildcard: true,
            };
        }
        match host.strip_prefix("*.") {
            Some(suffix) => Self {
                name: suffix.to_string(),
                subdomains_wildcard: true,
            },
            None => Self {
                name: host.to_string(),
                subdomains_wildcard: false,
            },
        }
    }

    /// `*`
    pub fn is_full_wildcard(&self) -> bool {
        self.subdomains_wildcard && self.name.is_empty()
    }

    /// Whether a concrete `candidate` is selected by this entry.
    pub fn matches(&self, candidate: &str) -> bool {
        if self.is_full_wildcard() {
            return true;
        }
        if self.subdomains_wildcard {
            return is_subdomain_of(candidate, &self.name);
        }
        candidate == self.name
    }

    /// Wildcard subsumption: everything `other` selects, `self` selects too.
    ///
    /// `*.s` covers `x.s`, `*.x.s` and `*.s`; `*` covers all; a literal
    /// covers only an identical literal.
    pub fn covers(&self, other: &HostEntry) -> bool {
        if self.is_full_wildcard() {
            return true;
        }
        if !self.subdomains_wildcard {
            return !other.subdomains_wildcard && self.name == other.name;
        }
        if other.is_full_wildcard() {
            return false;
        }
        (other.subdomains_wildcard && other.name == self.name)
            || is_subdomain_of(&other.name, &self.name)
    }

    /// Gateway shadowing: one entry covers the other, or a `*.s` wildcard
    /// faces its apex `s`.
    pub fn overlaps(&self, other: &HostEntry) -> bool {
        self.covers(other)
            || other.covers(self)
            || self.faces_apex(other)
            || other.faces_apex(self)
    }

    fn faces_apex(&self, other: &HostEntry) -> bool {
        self.subdomains_wildcard
            && !self.name.is_empty()
            && !other.subdomains_wildcard
            && other.name == self.name
    }
}

impl fmt::Display for HostEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.subdomains_wildcard, self.name.is_empty()) {
            (true, true) => f.write_str("*"),
            (true, false) => write!(f, "*.{}", self.name),
            _ => f.write_str(&self.name),
        }
    }
}

/// Match a concrete `candidate` against `rule_host`.
///
/// `*` matches everything, `*.suffix` matches names ending in `.suffix`,
/// anything else requires exact equality.
pub fn matches(candidate: &str, rule_host: &str) -> bool {
    HostEntry::parse(rule_host).matches(candidate)
}

/// `host` ends with `.suffix`.
pub fn is_subdomain_of(host: &str, suffix: &str) -> bool {
    host.strip_suffix(suffix)
        .is_some_and(|head| head.ends_with('.'))
}
