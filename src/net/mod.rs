//! Network layer subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming TCP connection
//!     → listener.rs (accept loop, connection limits)
//!     → Hand off to HTTP layer
//! ```
//!
//! # Design Decisions
//! - Bounded accept via semaphore prevents resource exhaustion
//! - Each connection holds an owned permit for its whole lifetime;
//!   dropping the connection releases the slot on every exit path

pub mod listener;

pub use listener::Listener;
