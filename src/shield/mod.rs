//! Security collaborator integration (shield and bot detection).
//!
//! # Data Flow
//! ```text
//! RequestFacts
//!     → client.rs (provider verdict for request + rules)
//!     → check.rs (allow-list, rule modes, failure policy)
//!     → ShieldDecision::Proceed | Reject(reason)
//! ```
//!
//! # Design Decisions
//! - Runs before identity resolution; a rejected request costs one call
//! - Detection itself is the provider's job; this layer only applies policy

pub mod check;
pub mod client;
pub mod rules;
pub mod types;

pub use check::SecurityCheck;
pub use client::{HttpSecurityProvider, SecurityProvider};
pub use rules::{Rule, RuleSet};
pub use types::{BotReport, RejectReason, ShieldDecision, ShieldError, Verdict};
