//! Gateway Router
//!
//! Routes inbound HTTP and WebSocket traffic to backend services by URL
//! prefix, built with Tokio and Axum.
//!
//! # Architecture Overview
//!
//! ```text
//!                    ┌──────────────────────────────────────────────────┐
//!                    │                 GATEWAY ROUTER                    │
//!                    │                                                   │
//!  Client Request    │  ┌─────────┐    ┌─────────┐    ┌──────────────┐  │
//!  ──────────────────┼─▶│   net   │───▶│  http   │───▶│   routing    │  │
//!                    │  │listener │    │ server  │    │    table     │  │
//!                    │  └─────────┘    └─────────┘    └──────┬───────┘  │
//!                    │                                       │          │
//!                    │                                       ▼          │
//!  Client Response   │  ┌─────────┐                  ┌──────────────┐   │
//!  ◀─────────────────┼──│ relay / │◀─────────────────│   upstream   │◀──┼── Backend
//!                    │  │  502    │                  │  dispatch    │   │    Service
//!                    │  └─────────┘                  └──────────────┘   │
//!                    │                                                   │
//!                    │  ┌────────────────────────────────────────────┐  │
//!                    │  │  config │ lifecycle │ observability        │  │
//!                    │  └────────────────────────────────────────────┘  │
//!                    └──────────────────────────────────────────────────┘
//! ```
//!
//! WebSocket upgrade requests take the same routing path; after both
//! handshakes succeed the connection becomes a transparent frame relay.

// Core subsystems
pub mod config;
pub mod http;
pub mod net;
pub mod routing;

// Cross-cutting concerns
pub mod lifecycle;
pub mod observability;

use crate::config::loader;
use crate::http::HttpServer;
use crate::lifecycle::Shutdown;
use crate::net::Listener;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Configuration is read once; the routing table never changes afterwards.
    let config = loader::from_env()?;

    observability::logging::init(&config.observability);

    tracing::info!("gateway v0.1.0 starting");
    tracing::info!(
        bind_address = %config.listener.bind_address,
        max_connections = config.listener.max_connections,
        routes = config.routes.len(),
        dispatch_timeout_secs = config.timeouts.dispatch_secs,
        "Configuration loaded"
    );
    for route in &config.routes {
        tracing::info!(
            route = %route.name,
            mount_path = %route.mount_path,
            strip_prefix = route.strip_prefix.as_deref().unwrap_or(""),
            target = %route.target,
            "Route configured"
        );
    }

    let listener = Listener::bind(&config.listener).await?;

    if config.observability.metrics_enabled {
        if let Ok(addr) = config.observability.metrics_address.parse() {
            observability::metrics::init_metrics(addr);
        } else {
            tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            );
        }
    }

    let shutdown = Shutdown::new();
    let server = HttpServer::new(config)?;
    server.run(listener, shutdown.subscribe()).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
