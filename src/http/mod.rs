//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, layers)
//!     → request.rs (request ID, RequestFacts for collaborators)
//!     → gate middleware (skip / reject / redirect / allow)
//!     → server.rs forwarder (allowed requests → upstream application)
//!     → Send to client
//! ```

pub mod request;
pub mod server;

pub use request::{RequestFacts, X_REQUEST_ID};
pub use server::GateServer;
