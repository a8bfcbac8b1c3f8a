//! Request gate library: bot/shield screening and sign-in enforcement in
//! front of a web application.

pub mod config;
pub mod error;
pub mod gate;
pub mod http;
pub mod identity;
pub mod lifecycle;
pub mod observability;
pub mod resilience;
pub mod routing;
pub mod shield;

pub use config::schema::GateConfig;
pub use error::GateError;
pub use gate::{Gate, GateOutcome};
pub use http::GateServer;
pub use lifecycle::Shutdown;
