//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML)
//!     → loader.rs (parse & deserialize)
//!     → validation.rs (semantic checks)
//!     → ValidatorConfig (validated, immutable)
//!     → MeshConfig borrowed by every checker
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_config, parse_config, ConfigError};
pub use schema::LogFormat;
pub use schema::MeshConfig;
pub use schema::ObservabilityConfig;
pub use schema::OutputConfig;
pub use schema::RegistryConfig;
pub use schema::ValidatorConfig;
