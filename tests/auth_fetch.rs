//! End-to-end tests for the authenticated-fetch policy: bearer attachment,
//! one-shot refresh-and-retry, and fail-closed logout.
//!
//! A minimal scripted HTTP server stands in for the backend so the tests can
//! count every network call and inspect the exact headers and bodies sent.

use std::sync::Arc;

use reqwest::Method;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use tokio::sync::Mutex;

use f1insight_tui::api::{ApiClient, AuthedClient};
use f1insight_tui::auth::{MemoryTokenStore, Session, StoredTokens, TokenStore};

// ============================================================================
// Scripted mock backend
// ============================================================================

#[derive(Debug, Clone)]
struct Recorded {
    method: String,
    path: String,
    bearer: Option<String>,
    body: String,
}

#[derive(Clone, Default)]
struct MockBehavior {
    /// Bearer tokens the protected endpoints accept
    valid_tokens: Vec<String>,
    /// Access token the refresh endpoint mints; None makes refresh fail
    refresh_access: Option<String>,
    /// Token pair the login endpoint issues; None makes login fail
    login_pair: Option<(String, String)>,
    /// Protected paths that answer 404 even with a valid token
    not_found_paths: Vec<String>,
}

type RequestLog = Arc<Mutex<Vec<Recorded>>>;

async fn spawn_mock(behavior: MockBehavior) -> (String, RequestLog) {
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind mock server");
    let addr = listener.local_addr().expect("local addr");
    let log: RequestLog = Arc::new(Mutex::new(Vec::new()));

    let accept_log = Arc::clone(&log);
    tokio::spawn(async move {
        loop {
            let (socket, _) = match listener.accept().await {
                Ok(conn) => conn,
                Err(_) => break,
            };
            let behavior = behavior.clone();
            let log = Arc::clone(&accept_log);
            tokio::spawn(async move {
                let _ = handle_connection(socket, behavior, log).await;
            });
        }
    });

    (format!("http://{}", addr), log)
}

async fn handle_connection(
    mut socket: tokio::net::TcpStream,
    behavior: MockBehavior,
    log: RequestLog,
) -> std::io::Result<()> {
    let mut buf: Vec<u8> = Vec::new();
    let mut tmp = [0u8; 1024];

    // Read until the end of the header block
    let header_end = loop {
        let n = socket.read(&mut tmp).await?;
        if n == 0 {
            return Ok(());
        }
        buf.extend_from_slice(&tmp[..n]);
        if let Some(pos) = buf.windows(4).position(|w| w == b"\r\n\r\n") {
            break pos + 4;
        }
    };

    let head = String::from_utf8_lossy(&buf[..header_end]).to_string();
    let mut lines = head.lines();
    let request_line = lines.next().unwrap_or_default();
    let mut parts = request_line.split_whitespace();
    let method = parts.next().unwrap_or_default().to_string();
    let path = parts.next().unwrap_or_default().to_string();

    let mut bearer = None;
    let mut content_length = 0usize;
    for line in lines {
        let lower = line.to_lowercase();
        if lower.starts_with("authorization: bearer ") {
            // Slice from the original line so the token's case survives
            bearer = Some(line["authorization: bearer ".len()..].trim().to_string());
        }
        if let Some(value) = lower.strip_prefix("content-length: ") {
            content_length = value.trim().parse().unwrap_or(0);
        }
    }

    // Read the body if one was announced
    while buf.len() < header_end + content_length {
        let n = socket.read(&mut tmp).await?;
        if n == 0 {
            break;
        }
        buf.extend_from_slice(&tmp[..n]);
    }
    let body = String::from_utf8_lossy(&buf[header_end..header_end + content_length.min(buf.len() - header_end)]).to_string();

    log.lock().await.push(Recorded {
        method,
        path: path.clone(),
        bearer: bearer.clone(),
        body,
    });

    let (status, reason, response_body) = route(&behavior, &path, bearer.as_deref());
    let response = format!(
        "HTTP/1.1 {} {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
        status,
        reason,
        response_body.len(),
        response_body
    );
    socket.write_all(response.as_bytes()).await?;
    socket.shutdown().await
}

fn route(behavior: &MockBehavior, path: &str, bearer: Option<&str>) -> (u16, &'static str, String) {
    if path == "/api/auth/refresh/" {
        return match behavior.refresh_access {
            Some(ref access) => (200, "OK", format!(r#"{{"access":"{}"}}"#, access)),
            None => (401, "Unauthorized", r#"{"detail":"refresh token expired"}"#.to_string()),
        };
    }

    if path == "/api/auth/login/" {
        return match behavior.login_pair {
            Some((ref access, ref refresh)) => (
                200,
                "OK",
                format!(r#"{{"access":"{}","refresh":"{}"}}"#, access, refresh),
            ),
            None => (401, "Unauthorized", r#"{"detail":"bad credentials"}"#.to_string()),
        };
    }

    match bearer {
        Some(token) if behavior.valid_tokens.iter().any(|t| t == token) => {
            if behavior.not_found_paths.iter().any(|p| p == path) {
                (404, "Not Found", r#"{"error":"group not found"}"#.to_string())
            } else {
                (200, "OK", r#"{"status":"success"}"#.to_string())
            }
        }
        _ => (401, "Unauthorized", r#"{"detail":"token not valid"}"#.to_string()),
    }
}

// ============================================================================
// Test helpers
// ============================================================================

fn session_with(access: Option<&str>, refresh: Option<&str>) -> Session {
    let store = MemoryTokenStore::default();
    store
        .save(&StoredTokens {
            access_token: access.map(str::to_string),
            refresh_token: refresh.map(str::to_string),
            username: Some("lando".to_string()),
        })
        .expect("seed token store");
    Session::new(Box::new(store))
}

fn client_for(base_url: &str, session: Session) -> AuthedClient {
    let api = ApiClient::new(base_url).expect("api client");
    AuthedClient::new(api, Arc::new(Mutex::new(session)))
}

// ============================================================================
// Refresh-and-retry policy
// ============================================================================

#[tokio::test]
async fn refresh_success_retries_once_with_new_token() {
    let (base_url, log) = spawn_mock(MockBehavior {
        valid_tokens: vec!["acc-2".to_string()],
        refresh_access: Some("acc-2".to_string()),
        ..MockBehavior::default()
    })
    .await;

    let client = client_for(&base_url, session_with(Some("acc-1-expired"), Some("ref-1")));
    let response = client
        .send(Method::GET, "/api/auth/profile/", None)
        .await
        .expect("final response");
    assert_eq!(response.status().as_u16(), 200);

    let requests = log.lock().await;
    // Original request, one refresh, one retry - nothing more
    assert_eq!(requests.len(), 3);
    assert_eq!(requests[0].path, "/api/auth/profile/");
    assert_eq!(requests[0].bearer.as_deref(), Some("acc-1-expired"));
    assert_eq!(requests[1].path, "/api/auth/refresh/");
    assert!(requests[1].body.contains("ref-1"));
    assert_eq!(requests[2].path, "/api/auth/profile/");
    assert_eq!(requests[2].bearer.as_deref(), Some("acc-2"));
    drop(requests);

    // The refreshed access token was persisted
    let session = client.session();
    let session = session.lock().await;
    assert_eq!(session.access_token(), Some("acc-2"));
    assert!(session.is_authenticated());
}

#[tokio::test]
async fn refresh_failure_clears_session_and_returns_unauthorized() {
    let (base_url, log) = spawn_mock(MockBehavior {
        valid_tokens: vec![],
        refresh_access: None,
        ..MockBehavior::default()
    })
    .await;

    let client = client_for(&base_url, session_with(Some("acc-1-expired"), Some("ref-1")));
    let err = client
        .send(Method::GET, "/api/auth/profile/", None)
        .await
        .unwrap_err();
    assert!(err.is_unauthorized());

    let requests = log.lock().await;
    // Original request and the single refresh attempt; no retry
    assert_eq!(requests.len(), 2);
    assert_eq!(requests[1].path, "/api/auth/refresh/");
    drop(requests);

    let session = client.session();
    let session = session.lock().await;
    assert!(!session.is_authenticated());
    assert!(session.refresh_token().is_none());
}

#[tokio::test]
async fn missing_access_token_makes_no_network_calls() {
    let (base_url, log) = spawn_mock(MockBehavior::default()).await;

    let client = client_for(&base_url, session_with(None, Some("ref-1")));
    let err = client
        .send(Method::GET, "/api/auth/profile/", None)
        .await
        .unwrap_err();
    assert!(err.is_unauthorized());

    assert!(log.lock().await.is_empty());
    assert!(!client.session().lock().await.is_authenticated());
}

#[tokio::test]
async fn non_unauthorized_status_passes_through_without_refresh() {
    let (base_url, log) = spawn_mock(MockBehavior {
        valid_tokens: vec!["acc-1".to_string()],
        refresh_access: Some("never-used".to_string()),
        not_found_paths: vec!["/api/betting/groups/getgroupinfo/".to_string()],
        ..MockBehavior::default()
    })
    .await;

    let client = client_for(&base_url, session_with(Some("acc-1"), Some("ref-1")));
    let response = client
        .send(
            Method::POST,
            "/api/betting/groups/getgroupinfo/",
            Some(&serde_json::json!({ "group_id": 7 })),
        )
        .await
        .expect("response");

    // A 404 is the caller's problem, not a trigger for the refresh machinery
    assert_eq!(response.status().as_u16(), 404);
    let requests = log.lock().await;
    assert_eq!(requests.len(), 1);
    assert!(requests[0].body.contains("group_id"));
}

#[tokio::test]
async fn retry_replays_the_original_request_body() {
    let (base_url, log) = spawn_mock(MockBehavior {
        valid_tokens: vec!["acc-2".to_string()],
        refresh_access: Some("acc-2".to_string()),
        ..MockBehavior::default()
    })
    .await;

    let client = client_for(&base_url, session_with(Some("acc-1-expired"), Some("ref-1")));
    let body = serde_json::json!({
        "race": "monza-2026",
        "group": 7,
        "bet_top_3": ["verstappen", "norris", "leclerc"],
        "bet_last_5": "stroll",
        "bet_last_10": "albon",
        "bet_fastest_lap": "norris"
    });
    let response = client
        .send(Method::POST, "/api/betting/bets/createbet", Some(&body))
        .await
        .expect("final response");
    assert_eq!(response.status().as_u16(), 200);

    let requests = log.lock().await;
    assert_eq!(requests.len(), 3);
    // A mutating request must survive the refresh round-trip intact
    assert_eq!(requests[0].method, "POST");
    assert_eq!(requests[2].method, "POST");
    assert!(!requests[0].body.is_empty());
    assert_eq!(requests[0].body, requests[2].body);
    assert!(requests[2].body.contains("verstappen"));
}

// ============================================================================
// Login scenario
// ============================================================================

#[tokio::test]
async fn login_stores_tokens_and_unlocks_protected_calls() {
    let (base_url, _log) = spawn_mock(MockBehavior {
        valid_tokens: vec!["acc-1".to_string()],
        login_pair: Some(("acc-1".to_string(), "ref-1".to_string())),
        ..MockBehavior::default()
    })
    .await;

    let api = ApiClient::new(&base_url).expect("api client");
    let store = MemoryTokenStore::default();
    let mut session = Session::new(Box::new(store));
    assert!(!session.is_authenticated());

    let pair = match api.login("lando", "hunter2").await {
        Ok(p) => p,
        Err(e) => panic!("login failed: {}", e),
    };
    session.login("lando", &pair.access, &pair.refresh).expect("persist login");
    assert!(session.is_authenticated());

    let client = AuthedClient::new(api, Arc::new(Mutex::new(session)));
    client.profile_probe().await.expect("probe succeeds with stored token");
}

#[tokio::test]
async fn logged_out_session_fails_the_route_guard() {
    let (base_url, log) = spawn_mock(MockBehavior::default()).await;

    let client = client_for(&base_url, session_with(None, None));
    let err = client.profile_probe().await.unwrap_err();

    // The guard sees Unauthorized and routes to login; nothing hit the wire
    assert!(err.is_unauthorized());
    assert!(log.lock().await.is_empty());
}
