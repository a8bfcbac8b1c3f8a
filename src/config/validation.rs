//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Check that route and scope patterns compile
//! - Validate URLs, addresses and value ranges (timeouts > 0)
//! - Check that collaborator secrets were resolved
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: GateConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::net::SocketAddr;
use thiserror::Error;
use url::Url;

use crate::config::schema::GateConfig;
use crate::routing::{InvocationScope, ProtectedRoutes};

/// A single semantic problem in the configuration.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("{field}: invalid socket address `{value}`")]
    InvalidAddress { field: &'static str, value: String },

    #[error("{field}: invalid URL `{value}`")]
    InvalidUrl { field: &'static str, value: String },

    #[error("{field}: must be greater than zero")]
    ZeroTimeout { field: &'static str },

    #[error("{field}: {message}")]
    InvalidPattern { field: &'static str, message: String },

    #[error("{field} must not be empty")]
    Empty { field: &'static str },

    #[error("secret from ${env} is missing")]
    MissingSecret { env: String },
}

/// Validate a loaded configuration, including resolved secrets.
pub fn validate_config(config: &GateConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    check_address(&mut errors, "listener.bind_address", &config.listener.bind_address);
    check_address(&mut errors, "upstream.address", &config.upstream.address);
    check_url(&mut errors, "identity.base_url", &config.identity.base_url);
    check_url(&mut errors, "identity.sign_in_url", &config.identity.sign_in_url);
    check_url(&mut errors, "security.base_url", &config.security.base_url);
    if let Some(origin) = &config.identity.public_origin {
        check_url(&mut errors, "identity.public_origin", origin);
    }

    if config.timeouts.request_secs == 0 {
        errors.push(ValidationError::ZeroTimeout { field: "timeouts.request_secs" });
    }
    if config.timeouts.connect_secs == 0 {
        errors.push(ValidationError::ZeroTimeout { field: "timeouts.connect_secs" });
    }
    if config.identity.timeout_ms == 0 {
        errors.push(ValidationError::ZeroTimeout { field: "identity.timeout_ms" });
    }
    if config.security.timeout_ms == 0 {
        errors.push(ValidationError::ZeroTimeout { field: "security.timeout_ms" });
    }

    if config.identity.session_cookie.is_empty() {
        errors.push(ValidationError::Empty { field: "identity.session_cookie" });
    }
    if config.identity.return_to_param.is_empty() {
        errors.push(ValidationError::Empty { field: "identity.return_to_param" });
    }
    if config.upstream.user_id_header.is_empty()
        || axum::http::HeaderName::from_bytes(config.upstream.user_id_header.as_bytes()).is_err()
    {
        errors.push(ValidationError::Empty { field: "upstream.user_id_header" });
    }

    if let Err(e) = ProtectedRoutes::new(&config.routes.protected) {
        errors.push(ValidationError::InvalidPattern {
            field: "routes.protected",
            message: e.to_string(),
        });
    }
    if let Err(e) = InvocationScope::from_config(&config.scope) {
        errors.push(ValidationError::InvalidPattern {
            field: "scope.always_include",
            message: e.to_string(),
        });
    }

    if config.secrets.identity_secret.is_empty() {
        errors.push(ValidationError::MissingSecret { env: config.identity.secret_env.clone() });
    }
    if config.secrets.security_key.is_empty() {
        errors.push(ValidationError::MissingSecret { env: config.security.key_env.clone() });
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn check_address(errors: &mut Vec<ValidationError>, field: &'static str, value: &str) {
    if value.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::InvalidAddress {
            field,
            value: value.to_string(),
        });
    }
}

fn check_url(errors: &mut Vec<ValidationError>, field: &'static str, value: &str) {
    if Url::parse(value).is_err() {
        errors.push(ValidationError::InvalidUrl {
            field,
            value: value.to_string(),
        });
    }
}
