//! Routing subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming Request (path)
//!     → scope.rs (does the gate run for this path at all?)
//!     → matcher.rs (is the path protected?)
//!     → Return: skip / gate-public / gate-protected
//!
//! Pattern Compilation (at startup):
//!     RoutesConfig / ScopeConfig
//!     → Compile patterns to anchored matchers
//!     → Freeze as immutable sets
//! ```
//!
//! # Design Decisions
//! - Patterns compiled at startup, immutable at runtime
//! - Deterministic: same path always yields the same classification
//! - First match wins (declaration order)

pub mod matcher;
pub mod scope;

pub use matcher::{PatternError, PatternSet, ProtectedRoutes, RoutePattern};
pub use scope::InvocationScope;
