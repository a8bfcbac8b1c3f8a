//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML, optional)
//!     → loader.rs (parse & deserialize)
//!     → loader.rs (resolve collaborator secrets from environment)
//!     → validation.rs (semantic checks)
//!     → GateConfig (validated, immutable)
//!     → shared via Arc to all subsystems
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded; the pattern sets live for the whole process
//! - All fields have defaults to allow minimal configs
//! - A missing secret is fatal: the process refuses to serve traffic

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_config, ConfigError};
pub use schema::{
    AgentSignature, GateConfig, IdentityConfig, ListenerConfig, LogFormat, ObservabilityConfig,
    RoutesConfig, RuleMode, ScopeConfig, Secrets, SecurityConfig, TimeoutConfig, UpstreamConfig,
};
