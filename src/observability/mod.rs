//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! checkers, loaders, registry fetch produce:
//!     → logging.rs (structured log events)
//!
//! Consumers:
//!     → stderr (pretty or JSON lines)
//! ```
//!
//! # Design Decisions
//! - Structured fields (object, namespace, path) instead of formatted strings
//! - Checkers log findings at debug level; the CLI summarises at info

pub mod logging;

pub use logging::init_logging;
