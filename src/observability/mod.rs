//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! All subsystems produce:
//!     → logging.rs (structured log events, request IDs in fields)
//!     → metrics.rs (request counters, latency histograms)
//!
//! Consumers:
//!     → Log aggregation (stdout)
//!     → Metrics endpoint (Prometheus scrape)
//! ```
//!
//! # Design Decisions
//! - Structured logging via tracing; RUST_LOG wins over config
//! - Metric updates are cheap (atomic operations)
//! - Labels for method, status code, and route

pub mod logging;
pub mod metrics;
