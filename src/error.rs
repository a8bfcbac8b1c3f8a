//! Request-level errors and their HTTP mapping.

use std::time::Duration;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;

use crate::identity::IdentityError;
use crate::shield::RejectReason;

/// Errors that end a request inside the gate.
#[derive(Debug, Error)]
pub enum GateError {
    /// Session could not be resolved for a protected path.
    #[error("identity resolution failed: {0}")]
    Identity(#[from] IdentityError),

    /// Session resolution for a protected path hit its deadline.
    #[error("identity resolution timed out after {0:?}")]
    IdentityTimeout(Duration),

    /// The security check rejected the request.
    #[error("rejected by security check ({})", .0.as_str())]
    Rejected(RejectReason),
}

impl GateError {
    pub fn status(&self) -> StatusCode {
        match self {
            GateError::Identity(_) => StatusCode::SERVICE_UNAVAILABLE,
            GateError::IdentityTimeout(_) => StatusCode::GATEWAY_TIMEOUT,
            GateError::Rejected(RejectReason::RateLimit) => StatusCode::TOO_MANY_REQUESTS,
            GateError::Rejected(RejectReason::Unavailable) => StatusCode::SERVICE_UNAVAILABLE,
            GateError::Rejected(_) => StatusCode::FORBIDDEN,
        }
    }
}

impl IntoResponse for GateError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = match &self {
            GateError::Rejected(RejectReason::RateLimit) => "Too many requests",
            GateError::Rejected(RejectReason::Unavailable) => "Service temporarily unavailable",
            GateError::Rejected(_) => "Forbidden",
            GateError::Identity(_) | GateError::IdentityTimeout(_) => {
                "Authentication service unavailable"
            }
        };
        (status, body).into_response()
    }
}
