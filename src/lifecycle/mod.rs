//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Shutdown (shutdown.rs):
//!     caller stops logging → drain pending dispatches → close backend
//! ```
//!
//! # Design Decisions
//! - Ordered shutdown: drain first, then release the connection
//! - Draining awaits everything; no timeout, no cancellation
//! - The backend is closed once per handler chain, however many derived
//!   handlers are shut down

pub mod shutdown;

pub use shutdown::{drain, shutdown_all, DrainReport};
