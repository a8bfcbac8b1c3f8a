//! Request handling.
//!
//! # Responsibilities
//! - Generate a unique request ID (UUID v4) and propagate it
//! - Extract the facts the collaborators look at (path, host, agent, client IP)
//! - Read the session token from cookies or the Authorization header
//!
//! # Design Decisions
//! - Request ID added as early as possible for tracing
//! - Facts are copied out once; the original request is forwarded untouched

use std::net::{IpAddr, SocketAddr};

use axum::body::Body;
use axum::extract::ConnectInfo;
use axum::http::{header, HeaderMap, HeaderName, Method, Request};
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};

pub const X_REQUEST_ID: HeaderName = HeaderName::from_static("x-request-id");

/// Layer assigning a UUID request ID when the client did not send one.
pub fn set_request_id_layer() -> SetRequestIdLayer<MakeRequestUuid> {
    SetRequestIdLayer::new(X_REQUEST_ID, MakeRequestUuid)
}

/// Layer copying the request ID onto the response.
pub fn propagate_request_id_layer() -> PropagateRequestIdLayer {
    PropagateRequestIdLayer::new(X_REQUEST_ID)
}

/// Read the request ID set by [`set_request_id_layer`].
pub fn request_id(headers: &HeaderMap) -> &str {
    headers
        .get(X_REQUEST_ID)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("unknown")
}

/// Read-only view of an incoming request handed to collaborators.
#[derive(Debug, Clone)]
pub struct RequestFacts {
    pub method: Method,
    pub path: String,
    pub query: Option<String>,
    pub host: Option<String>,
    pub user_agent: Option<String>,
    pub client_ip: Option<IpAddr>,
    pub headers: HeaderMap,
}

impl RequestFacts {
    /// Capture the facts of a request.
    ///
    /// The client IP is the peer address from `ConnectInfo`. `X-Forwarded-For`
    /// is only read when that peer is one of `trusted_proxies`.
    pub fn from_request(req: &Request<Body>, trusted_proxies: &[IpAddr]) -> Self {
        let headers = req.headers().clone();
        let peer = req
            .extensions()
            .get::<ConnectInfo<SocketAddr>>()
            .map(|ConnectInfo(addr)| addr.ip());
        let client_ip = peer.map(|peer| client_ip(&headers, peer, trusted_proxies));

        Self {
            method: req.method().clone(),
            path: req.uri().path().to_string(),
            query: req.uri().query().map(str::to_string),
            host: header_str(&headers, header::HOST),
            user_agent: header_str(&headers, header::USER_AGENT),
            client_ip,
            headers,
        }
    }

    /// Path plus query string, as the client requested it.
    pub fn path_and_query(&self) -> String {
        match &self.query {
            Some(q) => format!("{}?{}", self.path, q),
            None => self.path.clone(),
        }
    }

    /// Value of a cookie, if present.
    pub fn cookie(&self, name: &str) -> Option<&str> {
        self.headers
            .get_all(header::COOKIE)
            .iter()
            .filter_map(|v| v.to_str().ok())
            .flat_map(|v| v.split(';'))
            .filter_map(|pair| pair.trim().split_once('='))
            .find(|(k, _)| *k == name)
            .map(|(_, v)| v.trim_matches('"'))
    }

    /// Bearer token from the Authorization header, if present.
    pub fn bearer_token(&self) -> Option<&str> {
        self.headers
            .get(header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.strip_prefix("Bearer "))
            .map(str::trim)
            .filter(|t| !t.is_empty())
    }
}

/// Walk `X-Forwarded-For` from the nearest hop back, skipping trusted
/// proxies. The first untrusted hop is the client.
fn client_ip(headers: &HeaderMap, peer: IpAddr, trusted_proxies: &[IpAddr]) -> IpAddr {
    if !trusted_proxies.contains(&peer) {
        return peer;
    }

    let hops: Vec<IpAddr> = headers
        .get_all("x-forwarded-for")
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(','))
        .filter_map(|ip| ip.trim().parse().ok())
        .collect();

    hops.iter()
        .rev()
        .find(|ip| !trusted_proxies.contains(ip))
        .or(hops.first())
        .copied()
        .unwrap_or(peer)
}

fn header_str(headers: &HeaderMap, name: HeaderName) -> Option<String> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string)
}
