//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the gateway.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};

/// Root configuration for the gateway router.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct GatewayConfig {
    /// Listener configuration (bind address, connection limit).
    pub listener: ListenerConfig,

    /// Ordered route definitions; first mount-path match wins.
    pub routes: Vec<RouteConfig>,

    /// Timeout configuration.
    pub timeouts: TimeoutConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            listener: ListenerConfig::default(),
            routes: default_routes(),
            timeouts: TimeoutConfig::default(),
            observability: ObservabilityConfig::default(),
        }
    }
}

/// The stock deployment table: API and user services behind their prefixes,
/// the web application as the trailing catch-all.
fn default_routes() -> Vec<RouteConfig> {
    vec![
        RouteConfig {
            name: "gamey".to_string(),
            mount_path: "/api".to_string(),
            strip_prefix: Some("/api".to_string()),
            target: "http://gamey:4000".to_string(),
        },
        RouteConfig {
            name: "users".to_string(),
            mount_path: "/users".to_string(),
            strip_prefix: Some("/users".to_string()),
            target: "http://users:3000".to_string(),
        },
        RouteConfig {
            name: "webapp".to_string(),
            mount_path: "/".to_string(),
            strip_prefix: None,
            target: "http://webapp:80".to_string(),
        },
    ]
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:8080").
    pub bind_address: String,

    /// Maximum concurrent connections (backpressure).
    pub max_connections: usize,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8080".to_string(),
            max_connections: 10_000,
        }
    }
}

/// Route configuration mapping a URL prefix to an upstream service.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RouteConfig {
    /// Route identifier for logging, metrics, and env overrides
    /// (`<NAME>_SERVICE_URL`).
    pub name: String,

    /// URL path prefix to match, anchored at path-segment boundaries.
    pub mount_path: String,

    /// Literal prefix removed once from the path before forwarding.
    /// When absent the path is forwarded unchanged.
    #[serde(default)]
    pub strip_prefix: Option<String>,

    /// Upstream base URL (scheme + host + port).
    pub target: String,
}

/// Timeout configuration for upstream dispatch.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// TCP connection establishment timeout in seconds.
    pub connect_secs: u64,

    /// Dispatch timeout in seconds: connect plus time to the first
    /// response byte from the upstream.
    pub dispatch_secs: u64,

    /// Whole-request ceiling in seconds, enforced as middleware.
    pub request_secs: u64,

    /// Idle timeout for pooled upstream connections in seconds.
    pub idle_secs: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            connect_secs: 5,
            dispatch_secs: 10,
            request_secs: 30,
            idle_secs: 60,
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Enable the Prometheus metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            metrics_enabled: true,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}
