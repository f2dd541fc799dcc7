//! Shared utilities for integration tests.

#![allow(dead_code)]

use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::{
    body::{Body, Bytes},
    extract::State,
    http::{HeaderMap, Method, Request, StatusCode},
    response::Response,
    Router,
};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use tower::ServiceExt;

use cors_edge_proxy::config::{ProxyConfig, ProxyMode};
use cors_edge_proxy::HttpServer;

/// What the mock upstream saw.
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub method: Method,
    pub uri: String,
    pub headers: HeaderMap,
    pub body: Bytes,
}

#[derive(Clone)]
struct MockState {
    status: StatusCode,
    delay: Duration,
    log: Arc<Mutex<Vec<RecordedRequest>>>,
}

/// A running mock upstream.
#[derive(Clone)]
pub struct MockUpstream {
    pub addr: SocketAddr,
    log: Arc<Mutex<Vec<RecordedRequest>>>,
}

impl MockUpstream {
    /// Base URL with the same `/api` prefix the real upstream uses.
    pub fn api_url(&self) -> String {
        format!("http://{}/api", self.addr)
    }

    pub fn origin_url(&self) -> String {
        format!("http://{}", self.addr)
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.log.lock().unwrap().clone()
    }

    pub fn last_request(&self) -> RecordedRequest {
        self.requests()
            .pop()
            .expect("upstream received no request")
    }
}

/// Start a mock upstream that echoes the request body with status 200.
pub async fn start_mock_upstream() -> MockUpstream {
    start_programmable_upstream(StatusCode::OK, Duration::ZERO).await
}

/// Start a mock upstream that echoes the request body with a fixed status,
/// after waiting `delay` before sending response headers.
///
/// Every response carries upstream CORS headers and an extra header so tests
/// can check they are filtered.
pub async fn start_programmable_upstream(status: StatusCode, delay: Duration) -> MockUpstream {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let log = Arc::new(Mutex::new(Vec::new()));

    let state = MockState {
        status,
        delay,
        log: log.clone(),
    };
    let app = Router::new().fallback(mock_handler).with_state(state);

    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });

    MockUpstream { addr, log }
}

async fn mock_handler(State(state): State<MockState>, request: Request<Body>) -> Response {
    let (parts, body) = request.into_parts();
    let body = axum::body::to_bytes(body, usize::MAX)
        .await
        .unwrap_or_default();

    state.log.lock().unwrap().push(RecordedRequest {
        method: parts.method.clone(),
        uri: parts.uri.to_string(),
        headers: parts.headers.clone(),
        body: body.clone(),
    });

    if !state.delay.is_zero() {
        tokio::time::sleep(state.delay).await;
    }

    Response::builder()
        .status(state.status)
        .header("content-type", "application/json")
        .header("access-control-allow-origin", "https://upstream.example")
        .header("access-control-allow-credentials", "false")
        .header("x-upstream-trace", "abc123")
        .body(Body::from(body))
        .unwrap()
}

/// Start a raw TCP upstream that announces `Content-Length: 100`, sends 10
/// bytes of body and then closes the connection.
pub async fn start_truncating_upstream() -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        while let Ok((mut socket, _)) = listener.accept().await {
            tokio::spawn(async move {
                let mut request = Vec::new();
                let mut buf = [0u8; 1024];
                while !request.windows(4).any(|w| w == b"\r\n\r\n") {
                    match socket.read(&mut buf).await {
                        Ok(0) | Err(_) => return,
                        Ok(n) => request.extend_from_slice(&buf[..n]),
                    }
                }

                let head = "HTTP/1.1 200 OK\r\nContent-Type: application/json\r\nContent-Length: 100\r\n\r\n";
                let _ = socket.write_all(head.as_bytes()).await;
                let _ = socket.write_all(b"0123456789").await;
                let _ = socket.flush().await;
                tokio::time::sleep(Duration::from_millis(50)).await;
                let _ = socket.shutdown().await;
            });
        }
    });

    addr
}

/// Proxy configuration pointed at `base_url`, static files off.
pub fn proxy_config(base_url: &str) -> ProxyConfig {
    let mut config = ProxyConfig::default();
    config.listener.host = "127.0.0.1".into();
    config.listener.port = 0;
    config.upstream.base_url = base_url.into();
    config.upstream.connect_timeout_secs = 2;
    config.upstream.timeout_secs = 5;
    config.static_files.enabled = false;
    config
}

pub fn passthrough_config(base_url: &str) -> ProxyConfig {
    let mut config = proxy_config(base_url);
    config.upstream.mode = ProxyMode::Passthrough;
    config
}

/// Send one request through the fully layered router, in-process.
pub async fn send(config: ProxyConfig, request: Request<Body>) -> Response {
    let server = HttpServer::new(config).unwrap();
    server.router().oneshot(request).await.unwrap()
}

pub async fn body_bytes(response: Response) -> Bytes {
    axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap()
}

/// A local port with nothing listening on it.
pub fn closed_port() -> u16 {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    listener.local_addr().unwrap().port()
}
