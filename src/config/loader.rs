//! Configuration loading from the environment and from disk.
//!
//! The gateway is configured the way the deployment runs it: environment
//! variables on top of built-in defaults. A TOML file can replace the
//! defaults entirely via `GATEWAY_CONFIG`; env overrides are applied last.

use std::env;
use std::fs;
use std::path::Path;

use crate::config::schema::GatewayConfig;
use crate::config::validation::{validate_config, ValidationError};

/// Environment variable naming the listening port.
pub const ENV_PORT: &str = "PORT";

/// Environment variable naming an optional TOML config file.
pub const ENV_CONFIG_FILE: &str = "GATEWAY_CONFIG";

/// Error type for configuration loading.
#[derive(Debug)]
pub enum ConfigError {
    Io(std::io::Error),
    Parse(toml::de::Error),
    Env { key: String, reason: String },
    Validation(Vec<ValidationError>),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::Io(e) => write!(f, "IO error: {}", e),
            ConfigError::Parse(e) => write!(f, "Parse error: {}", e),
            ConfigError::Env { key, reason } => write!(f, "Invalid {}: {}", key, reason),
            ConfigError::Validation(errors) => {
                write!(f, "Validation failed: ")?;
                for (i, err) in errors.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", err)?;
                }
                Ok(())
            }
        }
    }
}

impl std::error::Error for ConfigError {}

/// Load and validate configuration from a TOML file.
pub fn load_config(path: &Path) -> Result<GatewayConfig, ConfigError> {
    let content = fs::read_to_string(path).map_err(ConfigError::Io)?;
    let config: GatewayConfig = toml::from_str(&content).map_err(ConfigError::Parse)?;

    validate_config(&config).map_err(ConfigError::Validation)?;

    Ok(config)
}

/// Build the runtime configuration: defaults (or the `GATEWAY_CONFIG` file),
/// then environment overrides, then validation.
///
/// Recognized overrides:
/// - `PORT` — listening port, bound on all interfaces
/// - `<NAME>_SERVICE_URL` — target for the route named `name`
///   (e.g. `GAMEY_SERVICE_URL`, `USERS_SERVICE_URL`, `WEBAPP_SERVICE_URL`)
pub fn from_env() -> Result<GatewayConfig, ConfigError> {
    let mut config = match env::var(ENV_CONFIG_FILE) {
        Ok(path) => {
            let content = fs::read_to_string(Path::new(&path)).map_err(ConfigError::Io)?;
            toml::from_str(&content).map_err(ConfigError::Parse)?
        }
        Err(_) => GatewayConfig::default(),
    };

    apply_env_overrides(&mut config)?;

    validate_config(&config).map_err(ConfigError::Validation)?;

    Ok(config)
}

fn apply_env_overrides(config: &mut GatewayConfig) -> Result<(), ConfigError> {
    if let Ok(port) = env::var(ENV_PORT) {
        let port: u16 = port.parse().map_err(|_| ConfigError::Env {
            key: ENV_PORT.to_string(),
            reason: format!("{:?} is not a port number", port),
        })?;
        config.listener.bind_address = format!("0.0.0.0:{}", port);
    }

    for route in &mut config.routes {
        let key = format!("{}_SERVICE_URL", route.name.to_uppercase());
        if let Ok(target) = env::var(&key) {
            route.target = target;
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn toml_table_overrides_defaults() {
        let content = r#"
            [listener]
            bind_address = "127.0.0.1:9999"

            [[routes]]
            name = "api"
            mount_path = "/api"
            strip_prefix = "/api"
            target = "http://localhost:4000"

            [[routes]]
            name = "fallback"
            mount_path = "/"
            target = "http://localhost:8000"
        "#;
        let config: GatewayConfig = toml::from_str(content).unwrap();
        assert_eq!(config.listener.bind_address, "127.0.0.1:9999");
        assert_eq!(config.routes.len(), 2);
        assert_eq!(config.routes[0].strip_prefix.as_deref(), Some("/api"));
        // Untouched sections keep their defaults.
        assert_eq!(config.timeouts.connect_secs, 5);
    }

    #[test]
    fn port_override_rebinds_listener() {
        let mut config = GatewayConfig::default();
        std::env::set_var("PORT", "8123");
        apply_env_overrides(&mut config).unwrap();
        std::env::remove_var("PORT");
        assert_eq!(config.listener.bind_address, "0.0.0.0:8123");
    }

    #[test]
    fn service_url_override_retargets_route() {
        let mut config = GatewayConfig::default();
        std::env::set_var("GAMEY_SERVICE_URL", "http://127.0.0.1:14000");
        apply_env_overrides(&mut config).unwrap();
        std::env::remove_var("GAMEY_SERVICE_URL");
        assert_eq!(config.routes[0].target, "http://127.0.0.1:14000");
        assert_eq!(config.routes[1].target, "http://users:3000");
    }
}
