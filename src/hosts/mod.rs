//! Host-matching engine shared by every checker.
//!
//! # Data Flow
//! ```text
//! host as written in an object (+ object namespace)
//!     → fqdn.rs (short / two-part / FQDN / wildcard shapes)
//!     → matcher.rs (wildcard equality, covers, overlaps)
//!     → visibility.rs (live services, exported service entries, registry)
//!     → known / unknown
//! ```
//!
//! # Design Decisions
//! - Pure functions over borrowed snapshots, no caching
//! - Identity domain comes from `MeshConfig`, never a global
//! - Service-entry visibility honours `exportTo`

pub mod fqdn;
pub mod matcher;
pub mod protocol;
pub mod visibility;

pub use fqdn::{resolve_host, LocalHost, ResolvedHost};
pub use matcher::{is_subdomain_of, matches, HostEntry};
pub use protocol::ProtocolFamily;
pub use visibility::{ExportScope, ServiceEntryHost, ServiceEntryHosts, Visibility};
