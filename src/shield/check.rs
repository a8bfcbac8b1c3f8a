//! Security check in front of the authorization gate.
//!
//! # Responsibilities
//! - Ask the provider for a verdict under a deadline
//! - Let allow-listed agents through bot rejections
//! - Downgrade dry-run rules to a log line
//! - Apply the fail-open / fail-closed policy on provider errors

use std::sync::Arc;
use std::time::Duration;

use crate::config::{RuleMode, SecurityConfig};
use crate::http::request::RequestFacts;
use crate::observability::metrics;
use crate::resilience::{call_with_timeout, CallError};
use crate::shield::client::SecurityProvider;
use crate::shield::rules::RuleSet;
use crate::shield::types::{RejectReason, ShieldDecision, ShieldError, Verdict};

pub struct SecurityCheck {
    provider: Arc<dyn SecurityProvider>,
    rules: RuleSet,
    timeout: Duration,
    fail_open: bool,
}

impl SecurityCheck {
    pub fn new(provider: Arc<dyn SecurityProvider>, config: &SecurityConfig) -> Self {
        Self {
            provider,
            rules: RuleSet::from_config(config),
            timeout: Duration::from_millis(config.timeout_ms),
            fail_open: config.fail_open,
        }
    }

    /// Evaluate a request.
    pub async fn check(&self, req: &RequestFacts) -> ShieldDecision {
        let verdict = call_with_timeout(
            "security",
            self.timeout,
            self.provider.evaluate(req, &self.rules),
        )
        .await
        .map_err(|e| match e {
            CallError::TimedOut(limit) => ShieldError::Timeout(limit),
            CallError::Failed(e) => e,
        });

        match verdict {
            Ok(verdict) => self.apply(req, verdict),
            Err(e) if self.fail_open => {
                tracing::warn!(error = %e, path = %req.path, "Security check unavailable, proceeding");
                ShieldDecision::Proceed
            }
            Err(e) => {
                tracing::error!(error = %e, path = %req.path, "Security check unavailable, rejecting");
                metrics::record_shield_rejection(RejectReason::Unavailable.as_str());
                ShieldDecision::Reject(RejectReason::Unavailable)
            }
        }
    }

    /// Turn a provider verdict into a decision.
    pub fn apply(&self, req: &RequestFacts, verdict: Verdict) -> ShieldDecision {
        if !verdict.blocked {
            return ShieldDecision::Proceed;
        }

        let reason = verdict.reason.unwrap_or(RejectReason::Other);

        if reason == RejectReason::Bot
            && self
                .rules
                .is_allowed_agent(verdict.bot.as_ref(), req.user_agent.as_deref())
        {
            tracing::debug!(
                user_agent = ?req.user_agent,
                bot = ?verdict.bot,
                "Allow-listed agent flagged as bot, proceeding"
            );
            return ShieldDecision::Proceed;
        }

        if self.rules.mode_for(reason) == RuleMode::DryRun {
            tracing::info!(
                reason = reason.as_str(),
                path = %req.path,
                client_ip = ?req.client_ip,
                "Dry-run rule would reject request"
            );
            return ShieldDecision::Proceed;
        }

        tracing::warn!(
            reason = reason.as_str(),
            path = %req.path,
            client_ip = ?req.client_ip,
            user_agent = ?req.user_agent,
            "Request rejected by security check"
        );
        metrics::record_shield_rejection(reason.as_str());
        ShieldDecision::Reject(reason)
    }
}
