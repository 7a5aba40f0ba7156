//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Startup (main):
//!     Load config → Validate → Compile table → Bind listener → Serve
//!
//! Shutdown:
//!     Signal or trigger → Stop accepting → Drain connections → Exit
//!
//! Signals (signals.rs):
//!     SIGTERM/SIGINT → Trigger graceful shutdown
//! ```
//!
//! # Design Decisions
//! - Ordered startup: config first, then table, then listener
//! - Shutdown drains in-flight connections before exit
//! - Programmatic trigger (tests, embedding) and OS signals are
//!   interchangeable shutdown sources

pub mod shutdown;
pub mod signals;

pub use shutdown::Shutdown;
