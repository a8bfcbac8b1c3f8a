//! Request gate orchestration.
//!
//! # Responsibilities
//! - Skip requests outside the invocation scope
//! - Run the security check, then resolve identity, then decide
//! - Fail closed on identity errors for protected paths only

use std::net::IpAddr;
use std::sync::Arc;
use std::time::Duration;

use crate::config::GateConfig;
use crate::error::GateError;
use crate::gate::decision::{decide, Decision};
use crate::http::request::RequestFacts;
use crate::identity::{IdentityProvider, SessionIdentity, SignInRedirect};
use crate::observability::metrics;
use crate::resilience::{call_with_timeout, CallError};
use crate::routing::{InvocationScope, PatternError, ProtectedRoutes};
use crate::shield::{SecurityCheck, SecurityProvider, ShieldDecision};

/// Result of running the gate for one request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GateOutcome {
    /// The path is outside the invocation scope; nothing was checked.
    Skipped,
    /// Continue to the application, with the caller's identity if known.
    Allow(Option<SessionIdentity>),
    /// Send the caller to sign in.
    RedirectToSignIn,
}

/// The request gate. Built once at startup and shared across requests.
pub struct Gate {
    scope: InvocationScope,
    protected: ProtectedRoutes,
    security: SecurityCheck,
    identity: Arc<dyn IdentityProvider>,
    identity_timeout: Duration,
    trusted_proxies: Vec<IpAddr>,
}

impl Gate {
    pub fn new(
        config: &GateConfig,
        identity: Arc<dyn IdentityProvider>,
        security: Arc<dyn SecurityProvider>,
    ) -> Result<Self, PatternError> {
        Ok(Self {
            scope: InvocationScope::from_config(&config.scope)?,
            protected: ProtectedRoutes::new(&config.routes.protected)?,
            security: SecurityCheck::new(security, &config.security),
            identity,
            identity_timeout: Duration::from_millis(config.identity.timeout_ms),
            trusted_proxies: config.listener.trusted_proxies.clone(),
        })
    }

    pub fn scope(&self) -> &InvocationScope {
        &self.scope
    }

    pub fn protected_routes(&self) -> &ProtectedRoutes {
        &self.protected
    }

    pub fn trusted_proxies(&self) -> &[IpAddr] {
        &self.trusted_proxies
    }

    pub fn sign_in(&self) -> &SignInRedirect {
        self.identity.sign_in()
    }

    /// Run the full gate for a request.
    pub async fn evaluate(&self, req: &RequestFacts) -> Result<GateOutcome, GateError> {
        if !self.scope.should_run(&req.path) {
            tracing::trace!(path = %req.path, "Outside gate scope");
            return Ok(GateOutcome::Skipped);
        }

        if let ShieldDecision::Reject(reason) = self.security.check(req).await {
            metrics::record_decision("rejected");
            return Err(GateError::Rejected(reason));
        }

        let protected = self.protected.is_protected(&req.path);
        let identity = match self.resolve_identity(req).await {
            Ok(identity) => identity,
            Err(e) if protected => {
                tracing::error!(error = %e, path = %req.path, "Identity unavailable for protected path");
                metrics::record_decision("error");
                return Err(e);
            }
            Err(e) => {
                tracing::warn!(error = %e, path = %req.path, "Identity unavailable, continuing unauthenticated");
                None
            }
        };

        let decision = decide(identity.as_ref(), protected);
        metrics::record_decision(decision.as_str());
        tracing::debug!(
            path = %req.path,
            protected,
            authenticated = identity.is_some(),
            decision = decision.as_str(),
            "Gate decision"
        );

        Ok(match decision {
            Decision::Allow => GateOutcome::Allow(identity),
            Decision::RedirectToSignIn => GateOutcome::RedirectToSignIn,
        })
    }

    async fn resolve_identity(&self, req: &RequestFacts) -> Result<Option<SessionIdentity>, GateError> {
        call_with_timeout(
            "identity",
            self.identity_timeout,
            self.identity.resolve_session(req),
        )
        .await
        .map_err(|e| match e {
            CallError::TimedOut(limit) => GateError::IdentityTimeout(limit),
            CallError::Failed(e) => GateError::Identity(e),
        })
    }
}
