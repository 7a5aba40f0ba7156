//! HTTP server setup and proxy dispatch.
//!
//! # Responsibilities
//! - Create the Axum router: `/health` answered locally, everything else
//!   dispatched to the proxy handler
//! - Wire up middleware (tracing, request ID, request timeout)
//! - Forward matched requests to the upstream, streaming both directions
//! - Hand upgrade requests to the WebSocket forwarder
//! - Synthesize the uniform 502 on upstream failure

use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::{
    body::Body,
    extract::ws::WebSocketUpgrade,
    extract::{FromRequestParts, State},
    http::{header, Request, StatusCode},
    response::{IntoResponse, Response},
    routing::{any, get},
    Router,
};
use hyper_util::{
    client::legacy::{connect::HttpConnector, Client},
    rt::TokioExecutor,
};
use tokio::sync::broadcast;
use tower_http::{timeout::TimeoutLayer, trace::TraceLayer};

use crate::config::{GatewayConfig, TimeoutConfig};
use crate::http::request::{self, RequestIdLayer};
use crate::http::{response, websocket};
use crate::lifecycle::signals;
use crate::net::Listener;
use crate::observability::metrics;
use crate::routing::{RouteError, RouteRule, RoutingTable};

/// Application state injected into handlers.
///
/// The routing table is read-only and shared; the client keeps the
/// upstream connection pool.
#[derive(Clone)]
pub struct AppState {
    table: Arc<RoutingTable>,
    client: Client<HttpConnector, Body>,
    timeouts: TimeoutConfig,
}

/// HTTP server for the gateway.
pub struct HttpServer {
    router: Router,
}

impl HttpServer {
    /// Compile the routing table and build the server.
    pub fn new(config: GatewayConfig) -> Result<Self, RouteError> {
        let table = Arc::new(RoutingTable::from_config(&config.routes)?);

        let mut connector = HttpConnector::new();
        connector.set_connect_timeout(Some(Duration::from_secs(config.timeouts.connect_secs)));

        let client = Client::builder(TokioExecutor::new())
            .pool_idle_timeout(Duration::from_secs(config.timeouts.idle_secs))
            .build(connector);

        let state = AppState {
            table,
            client,
            timeouts: config.timeouts.clone(),
        };

        let router = Self::build_router(&config, state);
        Ok(Self { router })
    }

    /// Build the Axum router with all middleware layers.
    ///
    /// `/health` is registered before the wildcard so the probe never
    /// touches the routing table or an upstream.
    fn build_router(config: &GatewayConfig, state: AppState) -> Router {
        Router::new()
            .route("/health", get(health_handler))
            .route("/{*path}", any(proxy_handler))
            .route("/", any(proxy_handler))
            .with_state(state)
            .layer(TimeoutLayer::new(Duration::from_secs(
                config.timeouts.request_secs,
            )))
            .layer(RequestIdLayer)
            .layer(TraceLayer::new_for_http())
    }

    /// Run the server, accepting connections on the given listener.
    ///
    /// Stops on the shutdown signal or on SIGINT/SIGTERM, draining
    /// in-flight connections.
    pub async fn run(
        self,
        listener: Listener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "HTTP server starting");

        axum::serve(listener, self.router)
            .with_graceful_shutdown(async move {
                tokio::select! {
                    _ = shutdown.recv() => tracing::info!("Shutdown requested"),
                    _ = signals::shutdown_signal() => {}
                }
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}

/// Liveness probe; answers as long as the process accepts connections.
async fn health_handler() -> Response {
    response::health()
}

/// Main proxy handler: match the route, then forward the request or
/// relay the WebSocket upgrade.
async fn proxy_handler(State(state): State<AppState>, request: Request<Body>) -> Response {
    let start = Instant::now();
    let request_id = request::request_id(&request).to_string();
    let method = request.method().to_string();
    let path = request.uri().path().to_string();

    let Some(rule) = state.table.match_path(&path) else {
        // A validated table ends with the catch-all, so this only fires
        // on a deployment without one.
        tracing::warn!(request_id = %request_id, path = %path, "No route matched");
        metrics::record_request(&method, 404, "none", start);
        return (StatusCode::NOT_FOUND, "No matching route found").into_response();
    };

    tracing::debug!(
        request_id = %request_id,
        method = %method,
        path = %path,
        route = %rule.name(),
        "Proxying request"
    );

    if websocket::is_upgrade_request(request.headers()) {
        let upstream_url = websocket::upstream_ws_url(rule, request.uri());
        let route = rule.name().to_string();
        let connect_timeout = Duration::from_secs(state.timeouts.connect_secs);

        let (mut parts, _body) = request.into_parts();
        let ws = match WebSocketUpgrade::from_request_parts(&mut parts, &()).await {
            Ok(ws) => ws,
            Err(rejection) => return rejection.into_response(),
        };

        let response =
            websocket::proxy_upgrade(ws, upstream_url, connect_timeout, request_id, route.clone())
                .await;
        metrics::record_request(&method, response.status().as_u16(), &route, start);
        return response;
    }

    forward(&state, request, rule, &request_id, &method, start).await
}

/// Execute one HTTP round trip against the upstream and relay the result.
async fn forward(
    state: &AppState,
    request: Request<Body>,
    rule: &RouteRule,
    request_id: &str,
    method: &str,
    start: Instant,
) -> Response {
    let (parts, body) = request.into_parts();

    let uri = match rule.upstream_uri(&parts.uri) {
        Ok(uri) => uri,
        Err(e) => {
            tracing::error!(
                request_id = %request_id,
                route = %rule.name(),
                error = %e,
                "Failed to build upstream URI"
            );
            metrics::record_request(method, 502, rule.name(), start);
            return response::bad_gateway();
        }
    };

    let mut builder = Request::builder().method(parts.method.clone()).uri(uri);
    if let Some(headers) = builder.headers_mut() {
        for (name, value) in parts.headers.iter() {
            headers.append(name.clone(), value.clone());
        }
        response::strip_hop_by_hop(headers);
        // Virtual-hosted upstreams expect their own authority here.
        headers.insert(header::HOST, rule.host_header().clone());
    }

    // The inbound body streams through; it is never buffered here.
    let upstream_request = match builder.body(body) {
        Ok(r) => r,
        Err(e) => {
            tracing::error!(
                request_id = %request_id,
                route = %rule.name(),
                error = %e,
                "Failed to build upstream request"
            );
            metrics::record_request(method, 502, rule.name(), start);
            return response::bad_gateway();
        }
    };

    let dispatch = Duration::from_secs(state.timeouts.dispatch_secs);
    match tokio::time::timeout(dispatch, state.client.request(upstream_request)).await {
        Ok(Ok(upstream_response)) => {
            let status = upstream_response.status();
            metrics::record_request(method, status.as_u16(), rule.name(), start);

            // Relay status, headers, and body untouched; a mid-stream
            // upstream error surfaces as a body error and tears the
            // connection down instead of corrupting the framing.
            let (mut parts, body) = upstream_response.into_parts();
            response::strip_hop_by_hop(&mut parts.headers);
            Response::from_parts(parts, Body::new(body))
        }
        Ok(Err(e)) => {
            tracing::error!(
                request_id = %request_id,
                route = %rule.name(),
                error = %e,
                "Upstream request failed"
            );
            metrics::record_request(method, 502, rule.name(), start);
            response::bad_gateway()
        }
        Err(_) => {
            tracing::warn!(
                request_id = %request_id,
                route = %rule.name(),
                timeout_secs = state.timeouts.dispatch_secs,
                "Upstream dispatch timed out"
            );
            metrics::record_request(method, 502, rule.name(), start);
            response::bad_gateway()
        }
    }
}
