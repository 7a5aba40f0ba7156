//! Shared utilities for integration testing.
#![allow(dead_code)]

use std::net::SocketAddr;

use axum::body::Body;
use axum::http::Request;
use axum::Json;
use axum::Router;
use futures_util::{SinkExt, StreamExt};
use serde_json::{json, Value};
use tokio::net::TcpListener;

use gateway::config::{GatewayConfig, RouteConfig};
use gateway::net::Listener;
use gateway::{HttpServer, Shutdown};

/// Start the gateway on an ephemeral port with the given routing table.
///
/// The listener is bound before the serve task is spawned, so requests
/// can be issued immediately.
pub async fn spawn_gateway(routes: Vec<RouteConfig>) -> (SocketAddr, Shutdown) {
    let mut config = GatewayConfig::default();
    config.listener.bind_address = "127.0.0.1:0".to_string();
    config.routes = routes;
    config.observability.metrics_enabled = false;

    let listener = Listener::bind(&config.listener).await.unwrap();
    let addr = listener.local_addr().unwrap();

    let shutdown = Shutdown::new();
    let rx = shutdown.subscribe();
    let server = HttpServer::new(config).unwrap();
    tokio::spawn(async move {
        let _ = server.run(listener, rx).await;
    });

    (addr, shutdown)
}

/// Shorthand for a route table entry.
pub fn route(name: &str, mount: &str, strip: Option<&str>, target: &str) -> RouteConfig {
    RouteConfig {
        name: name.to_string(),
        mount_path: mount.to_string(),
        strip_prefix: strip.map(str::to_string),
        target: target.to_string(),
    }
}

/// Start an HTTP upstream that reports back what it received.
pub async fn start_echo_upstream() -> SocketAddr {
    async fn echo(request: Request<Body>) -> Json<Value> {
        let (parts, body) = request.into_parts();
        let bytes = axum::body::to_bytes(body, 1024 * 1024)
            .await
            .unwrap_or_default();
        Json(json!({
            "method": parts.method.as_str(),
            "path": parts.uri.path(),
            "query": parts.uri.query(),
            "host": parts.headers.get("host").and_then(|h| h.to_str().ok()),
            "request_id": parts.headers.get("x-request-id").and_then(|h| h.to_str().ok()),
            "body": String::from_utf8_lossy(&bytes),
        }))
    }

    let app = Router::new().fallback(echo);
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    addr
}

/// Start a WebSocket upstream that echoes text and binary frames.
pub async fn start_ws_echo_upstream() -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        while let Ok((stream, _)) = listener.accept().await {
            tokio::spawn(async move {
                let mut ws = match tokio_tungstenite::accept_async(stream).await {
                    Ok(ws) => ws,
                    Err(_) => return,
                };
                while let Some(Ok(message)) = ws.next().await {
                    if message.is_close() {
                        break;
                    }
                    if message.is_text() || message.is_binary() {
                        if ws.send(message).await.is_err() {
                            break;
                        }
                    }
                }
            });
        }
    });
    addr
}

/// HTTP client that ignores any proxy configured in the environment.
pub fn client() -> reqwest::Client {
    reqwest::Client::builder().no_proxy().build().unwrap()
}
