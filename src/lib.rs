//! Service-mesh configuration validation engine.
//!
//! Takes a point-in-time snapshot of mesh routing objects and reports the
//! defects that would silently break traffic routing: destination rules
//! pointing at nothing, gateways shadowing each other, and sidecar egress
//! hosts that are malformed or unreachable.

// Core
pub mod checkers;
pub mod hosts;
pub mod validations;

// Inputs
pub mod model;
pub mod registry;

// Cross-cutting concerns
pub mod config;
pub mod observability;

pub use checkers::{validate_snapshot, Checker, ObjectChecker};
pub use config::{MeshConfig, ValidatorConfig};
pub use model::MeshSnapshot;
pub use validations::{IstioCheck, IstioValidation, IstioValidationKey, IstioValidations, Severity};
