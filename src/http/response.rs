//! Response synthesis and header hygiene.
//!
//! # Responsibilities
//! - Synthesize the uniform upstream-failure response
//! - Strip hop-by-hop headers in both directions
//!
//! # Design Decisions
//! - One failure body for every upstream error cause; no upstream detail
//!   (error text, hostnames) ever reaches the client
//! - Hop-by-hop headers are connection-scoped and must not be forwarded;
//!   end-to-end headers pass through untouched
//! - A failure after the response head was relayed cannot be converted
//!   into an error body; the body stream error tears the connection down
//!   instead of corrupting the framing

use axum::http::header::{self, HeaderMap, HeaderName};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;

/// Headers scoped to a single hop (RFC 9110 §7.6.1).
const HOP_BY_HOP: [HeaderName; 8] = [
    header::CONNECTION,
    HeaderName::from_static("keep-alive"),
    header::PROXY_AUTHENTICATE,
    header::PROXY_AUTHORIZATION,
    header::TE,
    header::TRAILER,
    header::TRANSFER_ENCODING,
    header::UPGRADE,
];

/// Remove hop-by-hop headers before forwarding in either direction.
pub fn strip_hop_by_hop(headers: &mut HeaderMap) {
    for name in HOP_BY_HOP {
        headers.remove(name);
    }
}

/// The uniform upstream-failure response: `502` with a fixed JSON body.
pub fn bad_gateway() -> Response {
    (StatusCode::BAD_GATEWAY, Json(json!({ "message": "Bad Gateway" }))).into_response()
}

/// Liveness probe body; no routing table or upstream involved.
pub fn health() -> Response {
    Json(json!({ "status": "ok" })).into_response()
}
