//! Security verdict types and error definitions.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Why the security provider flagged a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RejectReason {
    /// Automated client.
    Bot,
    /// Generically malicious traffic (injection probes, scanners).
    Shield,
    /// Too many requests.
    RateLimit,
    /// The provider could not be consulted and the check fails closed.
    #[serde(skip)]
    Unavailable,
    #[serde(other)]
    Other,
}

impl RejectReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            RejectReason::Bot => "bot",
            RejectReason::Shield => "shield",
            RejectReason::RateLimit => "rate_limit",
            RejectReason::Unavailable => "unavailable",
            RejectReason::Other => "other",
        }
    }
}

/// What the provider knows about an automated client.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BotReport {
    /// Specific agent identifiers, e.g. `GO_HTTP`, `GOOGLE_CRAWLER`.
    #[serde(default)]
    pub identifiers: Vec<String>,

    /// Categories, e.g. `CATEGORY:SEARCH_ENGINE`.
    #[serde(default)]
    pub categories: Vec<String>,
}

/// The provider's answer for one request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Verdict {
    pub blocked: bool,

    #[serde(default)]
    pub reason: Option<RejectReason>,

    #[serde(default)]
    pub bot: Option<BotReport>,
}

impl Verdict {
    pub fn allow() -> Self {
        Self {
            blocked: false,
            reason: None,
            bot: None,
        }
    }

    pub fn block(reason: RejectReason) -> Self {
        Self {
            blocked: true,
            reason: Some(reason),
            bot: None,
        }
    }

    pub fn with_bot(mut self, bot: BotReport) -> Self {
        self.bot = Some(bot);
        self
    }
}

/// Outcome of the security check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShieldDecision {
    Proceed,
    Reject(RejectReason),
}

/// Errors that can occur while consulting the security provider.
#[derive(Debug, Error)]
pub enum ShieldError {
    #[error("security provider unreachable: {0}")]
    Transport(#[source] reqwest::Error),

    #[error("security provider returned status {0}")]
    Status(u16),

    #[error("security provider response invalid: {0}")]
    Decode(#[source] reqwest::Error),

    #[error("security provider timed out after {0:?}")]
    Timeout(std::time::Duration),

    #[error("security provider unavailable: {0}")]
    Unavailable(String),
}
