//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Check the routing table invariants (catch-all present and last)
//! - Validate targets, addresses, and value ranges
//!
//! # Design Decisions
//! - Returns all validation errors, not just the first
//! - Validation is a pure function: GatewayConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system; a table without a
//!   catch-all is a deployment defect, never a per-request condition

use std::net::SocketAddr;

use crate::config::schema::GatewayConfig;

/// A single validation failure. A config can produce several.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// The routing table is empty.
    NoRoutes,
    /// A mount path does not start with `/`.
    InvalidMountPath { route: String, mount_path: String },
    /// A strip prefix does not start with `/`.
    InvalidStripPrefix { route: String, strip_prefix: String },
    /// A target is not an absolute http/https URL with a host.
    InvalidTarget { route: String, target: String, reason: String },
    /// No route with mount path `/`; unmatched requests would have nowhere to go.
    MissingCatchAll,
    /// A route is declared after the catch-all and can never match.
    UnreachableRoute { route: String },
    /// A bind address does not parse as host:port.
    InvalidAddress { field: &'static str, value: String },
    /// A numeric setting that must be non-zero is zero.
    ZeroSetting { field: &'static str },
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ValidationError::NoRoutes => write!(f, "no routes configured"),
            ValidationError::InvalidMountPath { route, mount_path } => {
                write!(f, "route {}: mount path {:?} must start with '/'", route, mount_path)
            }
            ValidationError::InvalidStripPrefix { route, strip_prefix } => {
                write!(f, "route {}: strip prefix {:?} must start with '/'", route, strip_prefix)
            }
            ValidationError::InvalidTarget { route, target, reason } => {
                write!(f, "route {}: target {:?}: {}", route, target, reason)
            }
            ValidationError::MissingCatchAll => {
                write!(f, "no catch-all route with mount path \"/\"")
            }
            ValidationError::UnreachableRoute { route } => {
                write!(f, "route {} is declared after the catch-all and can never match", route)
            }
            ValidationError::InvalidAddress { field, value } => {
                write!(f, "{}: {:?} is not a valid socket address", field, value)
            }
            ValidationError::ZeroSetting { field } => {
                write!(f, "{} must be greater than zero", field)
            }
        }
    }
}

/// Validate a loaded configuration, collecting every violation.
pub fn validate_config(config: &GatewayConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.routes.is_empty() {
        errors.push(ValidationError::NoRoutes);
    }

    let mut catch_all_seen = false;
    for route in &config.routes {
        if catch_all_seen {
            errors.push(ValidationError::UnreachableRoute {
                route: route.name.clone(),
            });
        }
        if route.mount_path == "/" {
            catch_all_seen = true;
        }

        if !route.mount_path.starts_with('/') {
            errors.push(ValidationError::InvalidMountPath {
                route: route.name.clone(),
                mount_path: route.mount_path.clone(),
            });
        }

        if let Some(prefix) = &route.strip_prefix {
            if !prefix.starts_with('/') {
                errors.push(ValidationError::InvalidStripPrefix {
                    route: route.name.clone(),
                    strip_prefix: prefix.clone(),
                });
            }
        }

        match url::Url::parse(&route.target) {
            Ok(target) => {
                if target.scheme() != "http" && target.scheme() != "https" {
                    errors.push(ValidationError::InvalidTarget {
                        route: route.name.clone(),
                        target: route.target.clone(),
                        reason: format!("unsupported scheme {:?}", target.scheme()),
                    });
                } else if target.host_str().is_none() {
                    errors.push(ValidationError::InvalidTarget {
                        route: route.name.clone(),
                        target: route.target.clone(),
                        reason: "missing host".to_string(),
                    });
                }
            }
            Err(e) => {
                errors.push(ValidationError::InvalidTarget {
                    route: route.name.clone(),
                    target: route.target.clone(),
                    reason: e.to_string(),
                });
            }
        }
    }

    if !config.routes.is_empty() && !catch_all_seen {
        errors.push(ValidationError::MissingCatchAll);
    }

    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::InvalidAddress {
            field: "listener.bind_address",
            value: config.listener.bind_address.clone(),
        });
    }
    if config.observability.metrics_enabled
        && config.observability.metrics_address.parse::<SocketAddr>().is_err()
    {
        errors.push(ValidationError::InvalidAddress {
            field: "observability.metrics_address",
            value: config.observability.metrics_address.clone(),
        });
    }

    if config.listener.max_connections == 0 {
        errors.push(ValidationError::ZeroSetting {
            field: "listener.max_connections",
        });
    }
    for (field, value) in [
        ("timeouts.connect_secs", config.timeouts.connect_secs),
        ("timeouts.dispatch_secs", config.timeouts.dispatch_secs),
        ("timeouts.request_secs", config.timeouts.request_secs),
    ] {
        if value == 0 {
            errors.push(ValidationError::ZeroSetting { field });
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
