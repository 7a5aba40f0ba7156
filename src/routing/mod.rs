//! Routing subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming request path
//!     → router.rs (first-match scan over the table)
//!     → matcher.rs (mount-path predicate, path rewrite)
//!     → Return: matched RouteRule or none
//!
//! Table compilation (at startup):
//!     RouteConfig[]
//!     → Parse targets (scheme, authority, Host header)
//!     → Freeze as immutable RoutingTable
//! ```
//!
//! # Design Decisions
//! - Table compiled at startup, immutable at runtime, shared via Arc
//! - Declaration order is match order; the catch-all sits last
//! - No regex in the hot path; mount matching is anchored prefix comparison
//! - Deterministic: same path always matches the same rule

pub mod matcher;
pub mod router;

pub use router::{RouteError, RouteRule, RoutingTable};
