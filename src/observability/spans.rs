//! Request spans.
//!
//! Every request gets one span carrying its ID, verb and path, so all log
//! events emitted while serving it are correlated.

use axum::http::Request;
use tracing::Span;

use crate::http::request::request_id;

/// Span for an incoming request; used by the HTTP trace layer.
pub fn request_span<B>(request: &Request<B>) -> Span {
    tracing::info_span!(
        "request",
        request_id = %request_id(request.headers()),
        method = %request.method(),
        path = %request.uri().path(),
    )
}
