//! Security provider client.

use std::net::IpAddr;
use std::time::Duration;

use async_trait::async_trait;
use serde::Serialize;
use url::Url;

use crate::config::{Secrets, SecurityConfig};
use crate::http::request::RequestFacts;
use crate::resilience::transport_backstop;
use crate::shield::rules::{Rule, RuleSet};
use crate::shield::types::{ShieldError, Verdict};

/// Scores a request for bot and attack traffic.
#[async_trait]
pub trait SecurityProvider: Send + Sync {
    async fn evaluate(&self, req: &RequestFacts, rules: &RuleSet) -> Result<Verdict, ShieldError>;
}

#[derive(Serialize)]
struct DecideRequest<'a> {
    request: RequestSummary<'a>,
    rules: &'a [Rule],
}

#[derive(Serialize)]
struct RequestSummary<'a> {
    ip: Option<IpAddr>,
    method: &'a str,
    host: Option<&'a str>,
    path: &'a str,
    query: Option<&'a str>,
    user_agent: Option<&'a str>,
}

impl<'a> From<&'a RequestFacts> for RequestSummary<'a> {
    fn from(req: &'a RequestFacts) -> Self {
        Self {
            ip: req.client_ip,
            method: req.method.as_str(),
            host: req.host.as_deref(),
            path: &req.path,
            query: req.query.as_deref(),
            user_agent: req.user_agent.as_deref(),
        }
    }
}

/// Security provider reached over HTTP.
pub struct HttpSecurityProvider {
    client: reqwest::Client,
    decide_url: Url,
    key: String,
}

impl HttpSecurityProvider {
    pub fn new(config: &SecurityConfig, secrets: &Secrets) -> Result<Self, ShieldError> {
        let decide_url = Url::parse(&config.base_url)
            .and_then(|base| base.join("/v1/decide"))
            .map_err(|e| ShieldError::Unavailable(format!("invalid base_url: {}", e)))?;
        let client = reqwest::Client::builder()
            .timeout(transport_backstop(Duration::from_millis(config.timeout_ms)))
            .build()
            .map_err(ShieldError::Transport)?;

        Ok(Self {
            client,
            decide_url,
            key: secrets.security_key.clone(),
        })
    }
}

#[async_trait]
impl SecurityProvider for HttpSecurityProvider {
    async fn evaluate(&self, req: &RequestFacts, rules: &RuleSet) -> Result<Verdict, ShieldError> {
        let body = DecideRequest {
            request: RequestSummary::from(req),
            rules: rules.rules(),
        };

        let response = self
            .client
            .post(self.decide_url.clone())
            .bearer_auth(&self.key)
            .json(&body)
            .send()
            .await
            .map_err(ShieldError::Transport)?;

        let status = response.status();
        if !status.is_success() {
            return Err(ShieldError::Status(status.as_u16()));
        }

        response.json::<Verdict>().await.map_err(ShieldError::Decode)
    }
}
