//! Request identification middleware.
//!
//! # Responsibilities
//! - Assign a unique request ID (UUID v4) as early as possible
//! - Preserve an ID supplied by the client
//! - The ID is copied to the upstream with the rest of the headers, so
//!   one request correlates across gateway and backend logs
//!
//! # Design Decisions
//! - Plain tower middleware; no response mutation, no extensions

use std::task::{Context, Poll};

use axum::http::header::{HeaderName, HeaderValue};
use axum::http::Request;
use tower::{Layer, Service};
use uuid::Uuid;

/// Header carrying the per-request correlation ID.
pub const X_REQUEST_ID: HeaderName = HeaderName::from_static("x-request-id");

/// Layer that stamps each request with an `x-request-id` header.
#[derive(Debug, Clone, Copy, Default)]
pub struct RequestIdLayer;

impl<S> Layer<S> for RequestIdLayer {
    type Service = RequestIdService<S>;

    fn layer(&self, inner: S) -> Self::Service {
        RequestIdService { inner }
    }
}

/// Service produced by [`RequestIdLayer`].
#[derive(Debug, Clone)]
pub struct RequestIdService<S> {
    inner: S,
}

impl<S, B> Service<Request<B>> for RequestIdService<S>
where
    S: Service<Request<B>>,
{
    type Response = S::Response;
    type Error = S::Error;
    type Future = S::Future;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, mut request: Request<B>) -> Self::Future {
        if !request.headers().contains_key(X_REQUEST_ID) {
            let id = Uuid::new_v4().to_string();
            if let Ok(value) = HeaderValue::from_str(&id) {
                request.headers_mut().insert(X_REQUEST_ID, value);
            }
        }
        self.inner.call(request)
    }
}

/// The request's correlation ID, or `"unknown"` for a request that
/// somehow bypassed the layer.
pub fn request_id<B>(request: &Request<B>) -> &str {
    request
        .headers()
        .get(X_REQUEST_ID)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("unknown")
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;

    #[derive(Clone)]
    struct Capture;

    impl Service<Request<Body>> for Capture {
        type Response = Request<Body>;
        type Error = std::convert::Infallible;
        type Future = std::future::Ready<Result<Self::Response, Self::Error>>;

        fn poll_ready(&mut self, _cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
            Poll::Ready(Ok(()))
        }

        fn call(&mut self, request: Request<Body>) -> Self::Future {
            std::future::ready(Ok(request))
        }
    }

    #[tokio::test]
    async fn missing_id_is_generated() {
        let mut service = RequestIdLayer.layer(Capture);
        let request = Request::builder().body(Body::empty()).unwrap();
        let seen = service.call(request).await.unwrap();
        let id = request_id(&seen);
        assert_ne!(id, "unknown");
        assert_eq!(id.len(), 36);
    }

    #[tokio::test]
    async fn client_id_is_preserved() {
        let mut service = RequestIdLayer.layer(Capture);
        let request = Request::builder()
            .header(X_REQUEST_ID, "abc-123")
            .body(Body::empty())
            .unwrap();
        let seen = service.call(request).await.unwrap();
        assert_eq!(request_id(&seen), "abc-123");
    }
}
