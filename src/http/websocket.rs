//! WebSocket proxy handling.
//!
//! # Responsibilities
//! - Detect WebSocket upgrade requests
//! - Complete the upstream handshake before accepting the client upgrade
//! - Bidirectional frame forwarding until either side closes
//!
//! # Data Flow
//! ```text
//! Client ←──── WebSocket frames ────→ Gateway ←──── WebSocket frames ────→ Upstream
//! ```
//!
//! # Design Decisions
//! - Upstream handshake first: a refused upstream fails the client
//!   handshake with the uniform 502, leaving no half-open upgrade
//! - Frame-level forwarding (no message buffering)
//! - Close frames propagated in both directions, code and reason intact
//! - Ping/pong forwarded transparently
//! - The two directions are pumped independently; when one ends, the
//!   other is torn down with it

use std::time::Duration;

use axum::extract::ws::{self, CloseFrame, WebSocket, WebSocketUpgrade};
use axum::http::header::{self, HeaderMap};
use axum::http::uri::Scheme;
use axum::http::Uri;
use axum::response::Response;
use futures_util::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio_tungstenite::tungstenite::protocol::frame::coding::CloseCode;
use tokio_tungstenite::tungstenite::protocol::CloseFrame as UpstreamCloseFrame;
use tokio_tungstenite::tungstenite::Message as UpstreamMessage;
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};

use crate::http::response;
use crate::routing::RouteRule;

/// Whether the request asks to upgrade the connection to WebSocket.
pub fn is_upgrade_request(headers: &HeaderMap) -> bool {
    let connection_upgrade = headers
        .get(header::CONNECTION)
        .and_then(|v| v.to_str().ok())
        .map(|v| v.split(',').any(|t| t.trim().eq_ignore_ascii_case("upgrade")))
        .unwrap_or(false);
    let upgrade_websocket = headers
        .get(header::UPGRADE)
        .and_then(|v| v.to_str().ok())
        .map(|v| v.eq_ignore_ascii_case("websocket"))
        .unwrap_or(false);
    connection_upgrade && upgrade_websocket
}

/// The upstream handshake URL for a matched upgrade request: the rule's
/// target with an `ws`/`wss` scheme and the rewritten path.
pub fn upstream_ws_url(rule: &RouteRule, uri: &Uri) -> String {
    let scheme = if rule.scheme() == &Scheme::HTTPS { "wss" } else { "ws" };
    format!(
        "{}://{}{}",
        scheme,
        rule.authority(),
        rule.rewrite_path_and_query(uri)
    )
}

/// Establish the upstream handshake, then upgrade the client and relay.
///
/// The client handshake is only completed once the upstream accepted the
/// connection; a refused or timed-out upstream handshake fails the client
/// request with the uniform 502.
pub async fn proxy_upgrade(
    ws: WebSocketUpgrade,
    upstream_url: String,
    connect_timeout: Duration,
    request_id: String,
    route: String,
) -> Response {
    match tokio::time::timeout(connect_timeout, connect_async(upstream_url.as_str())).await {
        Ok(Ok((upstream, _handshake))) => {
            tracing::debug!(
                request_id = %request_id,
                route = %route,
                upstream_url = %upstream_url,
                "WebSocket upstream handshake complete"
            );
            ws.on_upgrade(move |client| relay(client, upstream, request_id, route))
        }
        Ok(Err(e)) => {
            tracing::error!(
                request_id = %request_id,
                route = %route,
                error = %e,
                "WebSocket upstream handshake failed"
            );
            response::bad_gateway()
        }
        Err(_) => {
            tracing::warn!(
                request_id = %request_id,
                route = %route,
                "WebSocket upstream handshake timed out"
            );
            response::bad_gateway()
        }
    }
}

/// Pump frames in both directions until either side closes or errors.
///
/// Each direction runs independently so neither can stall the other.
/// When one direction ends, the select drops the other and both
/// connections close with it.
async fn relay(
    client: WebSocket,
    upstream: WebSocketStream<MaybeTlsStream<TcpStream>>,
    request_id: String,
    route: String,
) {
    let (mut client_tx, mut client_rx) = client.split();
    let (mut upstream_tx, mut upstream_rx) = upstream.split();

    let client_to_upstream = async move {
        while let Some(message) = client_rx.next().await {
            let message = match message {
                Ok(m) => m,
                Err(_) => break,
            };
            if upstream_tx.send(into_upstream(message)).await.is_err() {
                break;
            }
        }
        let _ = upstream_tx.close().await;
    };

    let upstream_to_client = async move {
        while let Some(message) = upstream_rx.next().await {
            let message = match message {
                Ok(m) => m,
                Err(_) => break,
            };
            let Some(message) = into_client(message) else {
                continue;
            };
            if client_tx.send(message).await.is_err() {
                break;
            }
        }
        let _ = client_tx.close().await;
    };

    tokio::select! {
        _ = client_to_upstream => {}
        _ = upstream_to_client => {}
    }

    tracing::debug!(request_id = %request_id, route = %route, "WebSocket relay closed");
}

fn into_upstream(message: ws::Message) -> UpstreamMessage {
    match message {
        ws::Message::Text(text) => UpstreamMessage::Text(text.as_str().into()),
        ws::Message::Binary(data) => UpstreamMessage::Binary(data),
        ws::Message::Ping(data) => UpstreamMessage::Ping(data),
        ws::Message::Pong(data) => UpstreamMessage::Pong(data),
        ws::Message::Close(frame) => UpstreamMessage::Close(frame.map(|f| UpstreamCloseFrame {
            code: CloseCode::from(f.code),
            reason: f.reason.as_str().into(),
        })),
    }
}

fn into_client(message: UpstreamMessage) -> Option<ws::Message> {
    match message {
        UpstreamMessage::Text(text) => Some(ws::Message::Text(text.as_str().into())),
        UpstreamMessage::Binary(data) => Some(ws::Message::Binary(data)),
        UpstreamMessage::Ping(data) => Some(ws::Message::Ping(data)),
        UpstreamMessage::Pong(data) => Some(ws::Message::Pong(data)),
        UpstreamMessage::Close(frame) => Some(ws::Message::Close(frame.map(|f| CloseFrame {
            code: f.code.into(),
            reason: f.reason.as_str().into(),
        }))),
        // Raw frames never surface from a stream read.
        UpstreamMessage::Frame(_) => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GatewayConfig;
    use crate::routing::RoutingTable;

    #[test]
    fn upgrade_detection_needs_both_headers() {
        let mut headers = HeaderMap::new();
        assert!(!is_upgrade_request(&headers));

        headers.insert(header::UPGRADE, "websocket".parse().unwrap());
        assert!(!is_upgrade_request(&headers));

        headers.insert(header::CONNECTION, "keep-alive, Upgrade".parse().unwrap());
        assert!(is_upgrade_request(&headers));

        headers.insert(header::UPGRADE, "h2c".parse().unwrap());
        assert!(!is_upgrade_request(&headers));
    }

    #[test]
    fn ws_url_maps_scheme_and_rewrites_path() {
        let table = RoutingTable::from_config(&GatewayConfig::default().routes).unwrap();
        let uri: Uri = "/api/socket".parse().unwrap();
        let rule = table.match_path(uri.path()).unwrap();
        assert_eq!(upstream_ws_url(rule, &uri), "ws://gamey:4000/socket");
    }

    #[test]
    fn close_frame_round_trips() {
        let frame = ws::Message::Close(Some(CloseFrame {
            code: 1001,
            reason: "going away".into(),
        }));
        let upstream = into_upstream(frame);
        let back = into_client(upstream).unwrap();
        match back {
            ws::Message::Close(Some(frame)) => {
                assert_eq!(frame.code, 1001);
                assert_eq!(frame.reason.as_str(), "going away");
            }
            other => panic!("unexpected message: {:?}", other),
        }
    }

    #[test]
    fn text_and_binary_pass_through() {
        match into_upstream(ws::Message::Text("hello".into())) {
            UpstreamMessage::Text(text) => assert_eq!(text.as_str(), "hello"),
            other => panic!("unexpected message: {:?}", other),
        }
        match into_client(UpstreamMessage::Binary(vec![1, 2, 3].into())).unwrap() {
            ws::Message::Binary(data) => assert_eq!(data.as_ref(), &[1, 2, 3]),
            other => panic!("unexpected message: {:?}", other),
        }
    }
}
