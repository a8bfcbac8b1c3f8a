//! End-to-end tests: real listener, HTTP collaborators and upstream.

use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use reqwest::header::{COOKIE, LOCATION, USER_AGENT};
use reqwest::StatusCode;
use url::Url;

use request_gate::lifecycle::build_gate;
use request_gate::{GateServer, Shutdown};

mod common;

struct Stack {
    gate_addr: SocketAddr,
    identity_calls: Arc<AtomicUsize>,
    shutdown: Shutdown,
}

async fn start_stack() -> Stack {
    start_stack_with(false).await
}

async fn start_stack_with(identity_down: bool) -> Stack {
    let identity_calls = Arc::new(AtomicUsize::new(0));
    let calls = identity_calls.clone();
    let identity_addr = common::start_programmable_backend(move |req| {
        let calls = calls.clone();
        async move {
            calls.fetch_add(1, Ordering::SeqCst);
            if identity_down {
                return (500, r#"{"error":"internal"}"#.to_string());
            }
            let authorized = req.headers.get("authorization").map(String::as_str)
                == Some("Bearer sk_test_identity");
            if req.path != "/v1/sessions/verify" || !authorized {
                return (500, "{}".to_string());
            }
            if req.body.contains("\"token\":\"valid_tok\"") {
                (200, r#"{"user_id":"user_123","session_id":"sess_1"}"#.to_string())
            } else {
                (401, r#"{"error":"invalid"}"#.to_string())
            }
        }
    })
    .await;

    let security_addr = common::start_programmable_backend(|req| async move {
        if req.path != "/v1/decide" {
            return (500, "{}".to_string());
        }
        if req.body.contains("BadBot") {
            (200, r#"{"blocked":true,"reason":"BOT","bot":{"identifiers":["BAD_BOT"]}}"#.to_string())
        } else {
            (200, r#"{"blocked":false}"#.to_string())
        }
    })
    .await;

    let upstream_addr = common::start_programmable_backend(|req| async move {
        let user = req
            .headers
            .get("x-gate-user-id")
            .cloned()
            .unwrap_or_else(|| "anonymous".to_string());
        (200, format!("{} {}", req.path, user))
    })
    .await;

    let mut config = common::test_config();
    config.listener.bind_address = "127.0.0.1:0".into();
    config.upstream.address = upstream_addr.to_string();
    config.identity.base_url = format!("http://{}", identity_addr);
    config.identity.sign_in_url = "https://accounts.example.com/sign-in".into();
    config.security.base_url = format!("http://{}", security_addr);

    let gate = build_gate(&config).unwrap();
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let gate_addr = listener.local_addr().unwrap();

    let shutdown = Shutdown::new();
    let server = GateServer::new(config, gate);
    let server_shutdown = shutdown.subscribe();
    tokio::spawn(async move {
        let _ = server.run(listener, server_shutdown).await;
    });
    tokio::time::sleep(Duration::from_millis(100)).await;

    Stack {
        gate_addr,
        identity_calls,
        shutdown,
    }
}

fn client() -> reqwest::Client {
    reqwest::Client::builder()
        .redirect(reqwest::redirect::Policy::none())
        .no_proxy()
        .build()
        .unwrap()
}

#[tokio::test]
async fn anonymous_dashboard_request_redirects_to_sign_in() {
    let stack = start_stack().await;

    let res = client()
        .get(format!("http://{}/dashboard/settings", stack.gate_addr))
        .send()
        .await
        .expect("gate unreachable");

    assert_eq!(res.status(), StatusCode::FOUND);
    let location = Url::parse(res.headers()[LOCATION].to_str().unwrap()).unwrap();
    assert_eq!(location.host_str(), Some("accounts.example.com"));
    let return_to = location
        .query_pairs()
        .find(|(k, _)| k == "redirect_url")
        .map(|(_, v)| v.into_owned());
    assert_eq!(return_to.as_deref(), Some("/dashboard/settings"));
    assert!(res.headers().contains_key("x-request-id"));

    // No token, no identity network call.
    assert_eq!(stack.identity_calls.load(Ordering::SeqCst), 0);
    stack.shutdown.trigger();
}

#[tokio::test]
async fn signed_in_dashboard_request_passes_through() {
    let stack = start_stack().await;

    let res = client()
        .get(format!("http://{}/dashboard/settings", stack.gate_addr))
        .header(COOKIE, "__session=valid_tok")
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(res.text().await.unwrap(), "/dashboard/settings user_123");
    stack.shutdown.trigger();
}

#[tokio::test]
async fn invalid_session_is_treated_as_anonymous() {
    let stack = start_stack().await;

    let res = client()
        .get(format!("http://{}/account", stack.gate_addr))
        .header(COOKIE, "__session=stale_tok")
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::FOUND);
    assert_eq!(stack.identity_calls.load(Ordering::SeqCst), 1);
    stack.shutdown.trigger();
}

#[tokio::test]
async fn public_root_passes_through_without_session() {
    let stack = start_stack().await;

    let res = client()
        .get(format!("http://{}/", stack.gate_addr))
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(res.text().await.unwrap(), "/ anonymous");
    stack.shutdown.trigger();
}

#[tokio::test]
async fn spoofed_identity_header_is_stripped() {
    let stack = start_stack().await;

    let res = client()
        .get(format!("http://{}/pricing", stack.gate_addr))
        .header("x-gate-user-id", "admin")
        .send()
        .await
        .unwrap();

    assert_eq!(res.text().await.unwrap(), "/pricing anonymous");
    stack.shutdown.trigger();
}

#[tokio::test]
async fn flagged_bot_is_rejected_before_identity() {
    let stack = start_stack().await;

    let res = client()
        .get(format!("http://{}/dashboard", stack.gate_addr))
        .header(USER_AGENT, "BadBot/1.0")
        .header(COOKIE, "__session=valid_tok")
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::FORBIDDEN);
    assert_eq!(stack.identity_calls.load(Ordering::SeqCst), 0);
    stack.shutdown.trigger();
}

#[tokio::test]
async fn static_assets_go_straight_upstream() {
    let stack = start_stack().await;

    let res = client()
        .get(format!("http://{}/dashboard/logo.png", stack.gate_addr))
        .header(USER_AGENT, "BadBot/1.0")
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(res.text().await.unwrap(), "/dashboard/logo.png anonymous");
    stack.shutdown.trigger();
}

#[tokio::test]
async fn identity_backend_error_fails_closed_on_protected_paths() {
    let stack = start_stack_with(true).await;

    let res = client()
        .get(format!("http://{}/dashboard", stack.gate_addr))
        .header(COOKIE, "__session=valid_tok")
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::SERVICE_UNAVAILABLE);
    assert!(res.headers().get(LOCATION).is_none());
    assert_eq!(stack.identity_calls.load(Ordering::SeqCst), 1);

    let res = client()
        .get(format!("http://{}/pricing", stack.gate_addr))
        .header(COOKIE, "__session=valid_tok")
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(res.text().await.unwrap(), "/pricing anonymous");
    stack.shutdown.trigger();
}
