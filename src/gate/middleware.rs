//! Gate middleware.
//! Runs the gate in front of every handler of the router it is layered on.

use std::sync::Arc;

use axum::{
    body::Body,
    extract::State,
    http::Request,
    middleware::Next,
    response::{IntoResponse, Response},
};

use crate::gate::engine::{Gate, GateOutcome};
use crate::http::request::{request_id, RequestFacts};

pub async fn gate_middleware(
    State(gate): State<Arc<Gate>>,
    mut req: Request<Body>,
    next: Next,
) -> Response {
    let facts = RequestFacts::from_request(&req, gate.trusted_proxies());

    match gate.evaluate(&facts).await {
        Ok(GateOutcome::Skipped) => next.run(req).await,
        Ok(GateOutcome::Allow(identity)) => {
            // Downstream handlers read the identity from extensions.
            if let Some(identity) = identity {
                req.extensions_mut().insert(identity);
            }
            next.run(req).await
        }
        Ok(GateOutcome::RedirectToSignIn) => {
            tracing::info!(
                request_id = %request_id(req.headers()),
                path = %facts.path,
                "Redirecting unauthenticated request to sign-in"
            );
            gate.sign_in().response(&facts.path_and_query())
        }
        Err(e) => {
            tracing::warn!(
                request_id = %request_id(req.headers()),
                path = %facts.path,
                error = %e,
                "Request stopped at gate"
            );
            e.into_response()
        }
    }
}
