//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! environment (PORT, <NAME>_SERVICE_URL, GATEWAY_CONFIG)
//!     → loader.rs (optional TOML file, then env overrides)
//!     → validation.rs (semantic checks, all errors collected)
//!     → GatewayConfig (validated, immutable)
//!     → routing table compiled once, shared via Arc
//! ```
//!
//! # Design Decisions
//! - Config is read once at startup; the routing table is fixed for the
//!   process lifetime
//! - All fields have defaults so the stock deployment needs no config file
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;

pub use schema::GatewayConfig;
pub use schema::ListenerConfig;
pub use schema::RouteConfig;
pub use schema::TimeoutConfig;
