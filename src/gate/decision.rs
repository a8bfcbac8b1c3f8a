//! The authorization decision.

use crate::identity::SessionIdentity;

/// What the gate does with an in-scope request that passed the security check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Allow,
    RedirectToSignIn,
}

impl Decision {
    pub fn as_str(&self) -> &'static str {
        match self {
            Decision::Allow => "allow",
            Decision::RedirectToSignIn => "redirect_to_sign_in",
        }
    }
}

/// Protected paths need an identity; everything else is allowed as is.
pub fn decide(identity: Option<&SessionIdentity>, protected: bool) -> Decision {
    if protected && identity.is_none() {
        Decision::RedirectToSignIn
    } else {
        Decision::Allow
    }
}
