//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the gate.
//! All types derive Serde traits for deserialization from config files.
//! Secrets are never part of the file; they are resolved from the process
//! environment by the loader and kept in [`Secrets`].

use std::net::IpAddr;

use serde::{Deserialize, Serialize};

/// Root configuration for the request gate.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct GateConfig {
    /// Listener configuration (bind address).
    pub listener: ListenerConfig,

    /// Application the gate forwards allowed requests to.
    pub upstream: UpstreamConfig,

    /// Timeout configuration.
    pub timeouts: TimeoutConfig,

    /// Protected route patterns.
    pub routes: RoutesConfig,

    /// Which requests the gate runs for at all.
    pub scope: ScopeConfig,

    /// Identity collaborator settings.
    pub identity: IdentityConfig,

    /// Security (shield / bot detection) collaborator settings.
    pub security: SecurityConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,

    /// Secrets resolved from the environment at load time.
    #[serde(skip)]
    pub secrets: Secrets,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:8080").
    pub bind_address: String,

    /// Peers whose `X-Forwarded-For` header is believed. Empty means the
    /// client IP is always the connecting peer.
    pub trusted_proxies: Vec<IpAddr>,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8080".to_string(),
            trusted_proxies: Vec::new(),
        }
    }
}

/// The application behind the gate.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct UpstreamConfig {
    /// Upstream address (e.g., "127.0.0.1:3000").
    pub address: String,

    /// Header carrying the resolved user id to the upstream.
    pub user_id_header: String,
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            address: "127.0.0.1:3000".to_string(),
            user_id_header: "x-gate-user-id".to_string(),
        }
    }
}

/// Timeout configuration for the listener side.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Request timeout (total time for request/response) in seconds.
    pub request_secs: u64,

    /// Upstream connection establishment timeout in seconds.
    pub connect_secs: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            request_secs: 30,
            connect_secs: 5,
        }
    }
}

/// Protected route definitions.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct RoutesConfig {
    /// Path patterns requiring a signed-in user, e.g. `/dashboard(.*)`.
    pub protected: Vec<String>,
}

impl Default for RoutesConfig {
    fn default() -> Self {
        Self {
            protected: vec![
                "/dashboard(.*)".to_string(),
                "/account(.*)".to_string(),
                "/transaction(.*)".to_string(),
            ],
        }
    }
}

/// Invocation scope: static assets and framework internals are skipped.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ScopeConfig {
    /// Paths that always run through the gate, checked before exclusions.
    pub always_include: Vec<String>,

    /// Path prefixes that never run through the gate.
    pub excluded_prefixes: Vec<String>,

    /// File extensions that never run through the gate.
    pub excluded_extensions: Vec<String>,

    /// Extensions that look like an excluded one but must still be gated
    /// (`json` vs `js`).
    pub passthrough_extensions: Vec<String>,
}

impl Default for ScopeConfig {
    fn default() -> Self {
        let excluded_extensions = [
            "html", "htm", "css", "js", "jpg", "jpeg", "webp", "png", "gif", "svg", "ttf",
            "woff", "woff2", "ico", "csv", "doc", "docx", "xls", "xlsx", "zip", "webmanifest",
        ];

        Self {
            always_include: vec!["/(api|trpc)(.*)".to_string()],
            excluded_prefixes: vec!["/_next".to_string()],
            excluded_extensions: excluded_extensions.iter().map(|e| e.to_string()).collect(),
            passthrough_extensions: vec!["json".to_string()],
        }
    }
}

/// Identity collaborator configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct IdentityConfig {
    /// Base URL of the identity provider API.
    pub base_url: String,

    /// Environment variable holding the identity provider secret.
    pub secret_env: String,

    /// Cookie carrying the session token.
    pub session_cookie: String,

    /// Sign-in entry point unauthenticated users are sent to.
    pub sign_in_url: String,

    /// Query parameter carrying the original destination.
    pub return_to_param: String,

    /// Public origin prepended to the return path (e.g. "https://app.example.com").
    pub public_origin: Option<String>,

    /// Session resolution timeout in milliseconds.
    pub timeout_ms: u64,
}

impl Default for IdentityConfig {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:4000".to_string(),
            secret_env: "GATE_IDENTITY_SECRET".to_string(),
            session_cookie: "__session".to_string(),
            sign_in_url: "http://127.0.0.1:4000/sign-in".to_string(),
            return_to_param: "redirect_url".to_string(),
            public_origin: None,
            timeout_ms: 2_000,
        }
    }
}

/// Enforcement mode of a security rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RuleMode {
    /// Flagged requests are rejected.
    Live,
    /// Flagged requests are only logged.
    DryRun,
}

/// Security collaborator configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct SecurityConfig {
    /// Base URL of the security provider API.
    pub base_url: String,

    /// Environment variable holding the security provider key.
    pub key_env: String,

    /// Shield rule mode.
    pub shield_mode: RuleMode,

    /// Bot detection rule mode.
    pub bot_mode: RuleMode,

    /// Bot categories / identifiers that are never rejected,
    /// e.g. `CATEGORY:SEARCH_ENGINE` or `GO_HTTP`.
    pub allow: Vec<String>,

    /// Local user-agent signatures for allow-listed identifiers. Used only
    /// when the provider returns no bot classification.
    pub agent_signatures: Vec<AgentSignature>,

    /// Proceed when the provider cannot be reached.
    pub fail_open: bool,

    /// Evaluation timeout in milliseconds.
    pub timeout_ms: u64,
}

impl Default for SecurityConfig {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:4100".to_string(),
            key_env: "GATE_SECURITY_KEY".to_string(),
            shield_mode: RuleMode::Live,
            bot_mode: RuleMode::Live,
            allow: vec!["CATEGORY:SEARCH_ENGINE".to_string(), "GO_HTTP".to_string()],
            agent_signatures: vec![AgentSignature::new("GO_HTTP", "Go-http-client")],
            fail_open: true,
            timeout_ms: 1_000,
        }
    }
}

/// Maps an allow-list identifier to a user-agent substring.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AgentSignature {
    /// Identifier as it appears in the allow-list.
    pub id: String,

    /// Substring of the `User-Agent` header identifying the agent.
    pub user_agent_contains: String,
}

impl AgentSignature {
    pub fn new(id: impl Into<String>, user_agent_contains: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            user_agent_contains: user_agent_contains.into(),
        }
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LogFormat {
    Pretty,
    Json,
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Log output format.
    pub log_format: LogFormat,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_format: LogFormat::Pretty,
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}

/// Collaborator credentials resolved from the environment.
#[derive(Clone, Default)]
pub struct Secrets {
    pub identity_secret: String,
    pub security_key: String,
}

impl std::fmt::Debug for Secrets {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Secrets")
            .field("identity_secret", &"<redacted>")
            .field("security_key", &"<redacted>")
            .finish()
    }
}
