//! Identity provider client.
//!
//! # Responsibilities
//! - Find the session token on a request (cookie first, then bearer header)
//! - Ask the provider whether the token belongs to a live session
//! - Build the sign-in redirect for unauthenticated callers

use std::time::Duration;

use async_trait::async_trait;
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use url::Url;

use crate::config::{IdentityConfig, Secrets};
use crate::http::request::RequestFacts;
use crate::identity::redirect::SignInRedirect;
use crate::identity::types::{IdentityError, SessionIdentity};
use crate::resilience::transport_backstop;

/// Resolves who is calling.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Resolve the session identity of a request. `Ok(None)` means
    /// unauthenticated.
    async fn resolve_session(
        &self,
        req: &RequestFacts,
    ) -> Result<Option<SessionIdentity>, IdentityError>;

    /// Where unauthenticated callers are sent.
    fn sign_in(&self) -> &SignInRedirect;
}

#[derive(Serialize)]
struct VerifyRequest<'a> {
    token: &'a str,
}

#[derive(Deserialize)]
struct VerifyResponse {
    user_id: Option<String>,
    #[serde(default)]
    session_id: Option<String>,
}

/// Identity provider reached over HTTP.
pub struct HttpIdentityProvider {
    client: reqwest::Client,
    verify_url: Url,
    secret: String,
    session_cookie: String,
    sign_in: SignInRedirect,
}

impl HttpIdentityProvider {
    pub fn new(config: &IdentityConfig, secrets: &Secrets) -> Result<Self, IdentityError> {
        let base = Url::parse(&config.base_url)
            .map_err(|e| IdentityError::Unavailable(format!("invalid base_url: {}", e)))?;
        let verify_url = base
            .join("/v1/sessions/verify")
            .map_err(|e| IdentityError::Unavailable(format!("invalid base_url: {}", e)))?;
        let sign_in = SignInRedirect::from_config(config)
            .map_err(|e| IdentityError::Unavailable(format!("invalid sign_in_url: {}", e)))?;
        let client = reqwest::Client::builder()
            .timeout(transport_backstop(Duration::from_millis(config.timeout_ms)))
            .build()
            .map_err(IdentityError::Transport)?;

        Ok(Self {
            client,
            verify_url,
            secret: secrets.identity_secret.clone(),
            session_cookie: config.session_cookie.clone(),
            sign_in,
        })
    }

    fn session_token<'a>(&self, req: &'a RequestFacts) -> Option<&'a str> {
        req.cookie(&self.session_cookie)
            .filter(|t| !t.is_empty())
            .or_else(|| req.bearer_token())
    }
}

#[async_trait]
impl IdentityProvider for HttpIdentityProvider {
    async fn resolve_session(
        &self,
        req: &RequestFacts,
    ) -> Result<Option<SessionIdentity>, IdentityError> {
        let Some(token) = self.session_token(req) else {
            return Ok(None);
        };

        let response = self
            .client
            .post(self.verify_url.clone())
            .bearer_auth(&self.secret)
            .json(&VerifyRequest { token })
            .send()
            .await
            .map_err(IdentityError::Transport)?;

        match response.status() {
            status if status.is_success() => {
                let body: VerifyResponse = response.json().await.map_err(IdentityError::Decode)?;
                Ok(body.user_id.filter(|id| !id.is_empty()).map(|user_id| SessionIdentity {
                    user_id,
                    session_id: body.session_id,
                }))
            }
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN | StatusCode::NOT_FOUND => {
                tracing::debug!(status = %response.status(), "Session token rejected");
                Ok(None)
            }
            status => Err(IdentityError::Status(status.as_u16())),
        }
    }

    fn sign_in(&self) -> &SignInRedirect {
        &self.sign_in
    }
}
