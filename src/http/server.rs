//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create Axum Router with the gate in front of the upstream forwarder
//! - Wire up middleware (tracing, timeout, request ID)
//! - Bind server to listener
//! - Forward allowed requests to the upstream application

use axum::{
    body::Body,
    extract::State,
    http::{HeaderName, HeaderValue, Request, StatusCode, Uri, Version},
    middleware,
    response::{IntoResponse, Response},
    Router,
};
use hyper_util::{
    client::legacy::{connect::HttpConnector, Client},
    rt::TokioExecutor,
};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower_http::{timeout::TimeoutLayer, trace::TraceLayer};

use crate::config::GateConfig;
use crate::gate::{gate_middleware, Gate};
use crate::http::request::{propagate_request_id_layer, request_id, set_request_id_layer};
use crate::identity::SessionIdentity;

/// Application state injected into the forwarder.
#[derive(Clone)]
pub struct AppState {
    pub client: Client<HttpConnector, Body>,
    pub upstream_address: Arc<str>,
    pub user_id_header: HeaderName,
}

/// HTTP server for the request gate.
pub struct GateServer {
    router: Router,
    config: GateConfig,
}

impl GateServer {
    /// Create a new HTTP server with the given configuration and gate.
    pub fn new(config: GateConfig, gate: Arc<Gate>) -> Self {
        let mut connector = HttpConnector::new();
        connector.set_connect_timeout(Some(Duration::from_secs(config.timeouts.connect_secs)));
        let client = Client::builder(TokioExecutor::new()).build(connector);

        let user_id_header = HeaderName::from_bytes(config.upstream.user_id_header.as_bytes())
            .unwrap_or_else(|_| HeaderName::from_static("x-gate-user-id"));

        let state = AppState {
            client,
            upstream_address: Arc::from(config.upstream.address.as_str()),
            user_id_header,
        };

        let router = Self::build_router(&config, gate, state);
        Self { router, config }
    }

    /// Build the Axum router with all middleware layers.
    #[allow(deprecated)]
    fn build_router(config: &GateConfig, gate: Arc<Gate>, state: AppState) -> Router {
        Router::new()
            .fallback(forward_handler)
            .with_state(state)
            .layer(middleware::from_fn_with_state(gate, gate_middleware))
            .layer(TimeoutLayer::new(Duration::from_secs(config.timeouts.request_secs)))
            .layer(propagate_request_id_layer())
            .layer(TraceLayer::new_for_http())
            .layer(set_request_id_layer())
    }

    /// The fully layered router, for serving or in-process testing.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// Run the server until the shutdown signal fires.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            upstream = %self.config.upstream.address,
            "HTTP server starting"
        );

        let app = self.router.into_make_service_with_connect_info::<SocketAddr>();

        axum::serve(listener, app)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
                tracing::info!("Shutdown signal received");
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }

    /// Get a reference to the config.
    pub fn config(&self) -> &GateConfig {
        &self.config
    }
}

/// Forward an allowed request to the upstream application.
async fn forward_handler(State(state): State<AppState>, mut request: Request<Body>) -> Response {
    let request_id = request_id(request.headers()).to_string();
    let path_and_query = request
        .uri()
        .path_and_query()
        .map(|pq| pq.as_str())
        .unwrap_or("/");

    let uri: Uri = match format!("http://{}{}", state.upstream_address, path_and_query).parse() {
        Ok(uri) => uri,
        Err(e) => {
            tracing::error!(request_id = %request_id, error = %e, "Failed to build upstream URI");
            return (StatusCode::BAD_REQUEST, "Invalid request URI").into_response();
        }
    };
    *request.uri_mut() = uri;
    *request.version_mut() = Version::HTTP_11;

    // Only the gate may assert who the caller is.
    let identity = request.extensions().get::<SessionIdentity>().cloned();
    let headers = request.headers_mut();
    headers.remove(&state.user_id_header);
    if let Some(identity) = identity {
        if let Ok(value) = HeaderValue::from_str(&identity.user_id) {
            headers.insert(state.user_id_header.clone(), value);
        }
    }

    match state.client.request(request).await {
        Ok(response) => response.map(Body::new),
        Err(e) => {
            tracing::error!(request_id = %request_id, error = %e, "Upstream error");
            (StatusCode::BAD_GATEWAY, "Upstream request failed").into_response()
        }
    }
}
