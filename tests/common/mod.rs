//! Shared utilities for integration tests.

#![allow(dead_code)]

use std::collections::HashMap;
use std::future::Future;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use url::Url;

use request_gate::config::{GateConfig, Secrets};
use request_gate::http::RequestFacts;
use request_gate::identity::{IdentityError, IdentityProvider, SessionIdentity, SignInRedirect};
use request_gate::shield::{RuleSet, SecurityProvider, ShieldError, Verdict};

/// A request as seen by a mock backend.
#[derive(Debug, Clone)]
pub struct Captured {
    pub method: String,
    pub path: String,
    pub headers: HashMap<String, String>,
    pub body: String,
}

async fn read_request(socket: &mut tokio::net::TcpStream) -> Option<Captured> {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 4096];
    let header_end = loop {
        let n = socket.read(&mut chunk).await.ok()?;
        if n == 0 {
            return None;
        }
        buf.extend_from_slice(&chunk[..n]);
        if let Some(pos) = buf.windows(4).position(|w| w == b"\r\n\r\n") {
            break pos + 4;
        }
    };

    let head = String::from_utf8_lossy(&buf[..header_end]).to_string();
    let mut lines = head.split("\r\n");
    let mut request_line = lines.next()?.split(' ');
    let method = request_line.next()?.to_string();
    let path = request_line.next()?.to_string();
    let headers: HashMap<String, String> = lines
        .filter_map(|l| l.split_once(':'))
        .map(|(k, v)| (k.trim().to_ascii_lowercase(), v.trim().to_string()))
        .collect();

    let content_length: usize = headers
        .get("content-length")
        .and_then(|v| v.parse().ok())
        .unwrap_or(0);
    while buf.len() < header_end + content_length {
        let n = socket.read(&mut chunk).await.ok()?;
        if n == 0 {
            break;
        }
        buf.extend_from_slice(&chunk[..n]);
    }
    let body = String::from_utf8_lossy(&buf[header_end..]).to_string();

    Some(Captured {
        method,
        path,
        headers,
        body,
    })
}

/// Start a programmable mock backend on an ephemeral port.
///
/// The handler sees each request and returns status and JSON/text body.
pub async fn start_programmable_backend<F, Fut>(f: F) -> SocketAddr
where
    F: Fn(Captured) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = (u16, String)> + Send + 'static,
{
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let f = Arc::new(f);

    tokio::spawn(async move {
        while let Ok((mut socket, _)) = listener.accept().await {
            let f = f.clone();
            tokio::spawn(async move {
                let Some(request) = read_request(&mut socket).await else {
                    return;
                };
                let (status, body) = f(request).await;
                let status_text = match status {
                    200 => "200 OK",
                    401 => "401 Unauthorized",
                    403 => "403 Forbidden",
                    404 => "404 Not Found",
                    500 => "500 Internal Server Error",
                    502 => "502 Bad Gateway",
                    503 => "503 Service Unavailable",
                    _ => "200 OK",
                };

                let response = format!(
                    "HTTP/1.1 {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                    status_text,
                    body.len(),
                    body
                );
                let _ = socket.write_all(response.as_bytes()).await;
                let _ = socket.shutdown().await;
                tokio::time::sleep(Duration::from_millis(10)).await;
            });
        }
    });

    addr
}

/// Configuration with secrets filled in, as the loader would produce.
pub fn test_config() -> GateConfig {
    GateConfig {
        secrets: Secrets {
            identity_secret: "sk_test_identity".into(),
            security_key: "sk_test_security".into(),
        },
        ..GateConfig::default()
    }
}

/// In-process identity provider: `__session=<token>` cookies map to users.
pub struct FakeIdentity {
    sessions: HashMap<String, String>,
    fail: bool,
    delay: Option<Duration>,
    sign_in: SignInRedirect,
    pub calls: AtomicUsize,
}

impl FakeIdentity {
    pub fn new() -> Self {
        Self {
            sessions: HashMap::new(),
            fail: false,
            delay: None,
            sign_in: SignInRedirect::new(
                Url::parse("https://accounts.example.com/sign-in").unwrap(),
                "redirect_url",
                None,
            ),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn with_session(mut self, token: &str, user_id: &str) -> Self {
        self.sessions.insert(token.to_string(), user_id.to_string());
        self
    }

    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::new()
        }
    }

    /// Answers only after `delay`.
    pub fn slow(delay: Duration) -> Self {
        Self {
            delay: Some(delay),
            ..Self::new()
        }
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl IdentityProvider for FakeIdentity {
    async fn resolve_session(
        &self,
        req: &RequestFacts,
    ) -> Result<Option<SessionIdentity>, IdentityError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        if self.fail {
            return Err(IdentityError::Unavailable("identity backend down".into()));
        }
        Ok(req
            .cookie("__session")
            .and_then(|token| self.sessions.get(token))
            .map(SessionIdentity::new))
    }

    fn sign_in(&self) -> &SignInRedirect {
        &self.sign_in
    }
}

/// In-process security provider returning a fixed verdict.
pub struct FakeSecurity {
    verdict: Mutex<Verdict>,
    pub calls: AtomicUsize,
}

impl FakeSecurity {
    pub fn new(verdict: Verdict) -> Self {
        Self {
            verdict: Mutex::new(verdict),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn allowing() -> Self {
        Self::new(Verdict::allow())
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl SecurityProvider for FakeSecurity {
    async fn evaluate(&self, _req: &RequestFacts, _rules: &RuleSet) -> Result<Verdict, ShieldError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.verdict.lock().unwrap().clone())
    }
}
