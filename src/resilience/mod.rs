//! Resilience subsystem.
//!
//! # Data Flow
//! ```text
//! Call to identity or security collaborator:
//!     → timeouts.rs (enforce configured deadline, record latency)
//!     → caller maps TimedOut / Failed into its own error type
//!
//! HTTP clients get transport_backstop(deadline) so the deadline above
//! always fires first.
//! ```
//!
//! # Design Decisions
//! - Timeouts are non-negotiable; every external call has a deadline
//! - No retries: a slow collaborator must not multiply request latency

pub mod timeouts;

pub use timeouts::{call_with_timeout, transport_backstop, CallError};
