//! Identity types and error definitions.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// An authenticated caller, as resolved by the identity provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionIdentity {
    /// Opaque user identifier.
    pub user_id: String,

    /// Provider session identifier, when reported.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session_id: Option<String>,
}

impl SessionIdentity {
    pub fn new(user_id: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            session_id: None,
        }
    }
}

/// Errors that can occur while resolving a session.
///
/// An invalid or expired token is not an error; it resolves to no identity.
#[derive(Debug, Error)]
pub enum IdentityError {
    /// Network failure talking to the provider.
    #[error("identity provider unreachable: {0}")]
    Transport(#[source] reqwest::Error),

    /// The provider answered with an unexpected status.
    #[error("identity provider returned status {0}")]
    Status(u16),

    /// The provider answered with a body we could not read.
    #[error("identity provider response invalid: {0}")]
    Decode(#[source] reqwest::Error),

    /// Client construction or other provider-side failure.
    #[error("identity provider unavailable: {0}")]
    Unavailable(String),
}
