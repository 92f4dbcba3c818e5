//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML)
//!     → loader.rs (parse & deserialize)
//!     → validation.rs (semantic checks)
//!     → HandlerConfig (validated, immutable)
//!     → wrapped in Options and shared via Arc by every derived handler
//! ```
//!
//! # Design Decisions
//! - Config is immutable once a handler is built
//! - All fields have defaults except the two backend identifiers
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;

pub use schema::ClientConfig;
pub use schema::HandlerConfig;
pub use schema::LoggerConfig;
