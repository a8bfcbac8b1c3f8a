//! Identity collaborator integration.
//!
//! # Data Flow
//! ```text
//! RequestFacts
//!     → client.rs (session token → provider verify call)
//!     → Option<SessionIdentity>
//!
//! Unauthenticated on a protected path:
//!     → redirect.rs (sign-in URL + return-to parameter)
//! ```
//!
//! # Design Decisions
//! - No token means no network call
//! - A rejected token is "no identity", never an error
//! - Transport and 5xx failures are errors; the gate decides what they mean

pub mod client;
pub mod redirect;
pub mod types;

pub use client::{HttpIdentityProvider, IdentityProvider};
pub use redirect::SignInRedirect;
pub use types::{IdentityError, SessionIdentity};
