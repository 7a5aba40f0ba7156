//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, /health, proxy dispatch)
//!     → request.rs (request ID middleware)
//!     → routing table decides the upstream
//!     → websocket.rs (upgrade requests: handshake + frame relay)
//!     → response.rs (hop-by-hop stripping, failure synthesis)
//!     → Send to client
//! ```

pub mod request;
pub mod response;
pub mod server;
pub mod websocket;

pub use request::{RequestIdLayer, X_REQUEST_ID};
pub use server::HttpServer;
