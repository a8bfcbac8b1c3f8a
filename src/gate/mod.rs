//! Request gate.
//!
//! # Data Flow
//! ```text
//! Request
//!     → routing::scope (skip static assets and framework internals)
//!     → shield::check (reject abusive traffic before any identity call)
//!     → identity::client (resolve session)
//!     → decision.rs (protected && anonymous → redirect)
//!     → next handler | 302 sign-in | 4xx/5xx
//! ```

pub mod engine;
pub mod decision;
pub mod middleware;

pub use engine::{Gate, GateOutcome};
pub use decision::{decide, Decision};
pub use middleware::gate_middleware;
