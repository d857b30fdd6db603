//! Mesh and cluster objects consumed by the checkers.
//!
//! # Data Flow
//! ```text
//! snapshot.json
//!     → snapshot.rs (MeshSnapshot, every section optional)
//!     → workload.rs (namespaces, services, workloads)
//!     → networking.rs (destination rules, virtual services, gateways, sidecars, service entries)
//!     → checkers borrow slices, never mutate
//! ```

pub mod meta;
pub mod networking;
pub mod snapshot;
pub mod workload;

pub use meta::{labels_include, selector_string, Labels, ObjectMeta};
pub use networking::{
    Destination, DestinationRule, DestinationRuleSpec, EgressListener, Gateway, GatewaySpec, Port,
    RouteDestination, RouteRule, Server, ServiceEntry, ServiceEntryLocation, ServiceEntrySpec,
    Sidecar, SidecarSpec, Subset, VirtualService, VirtualServiceSpec,
};
pub use snapshot::{MeshSnapshot, SnapshotError};
pub use workload::{Namespace, Service, ServiceSpec, Workload};
