//! Request ids and the per-request tracing span.
//!
//! Handlers name the listing view or article they serve with [`record_view`]
//! and [`record_slug`]; both land on the `http_request` span, so the
//! completion line tells which page a request touched.

use std::time::Instant;

use axum::{
    extract::Request,
    http::{HeaderMap, HeaderValue},
    middleware::Next,
    response::Response,
};
use tracing::{field, Instrument, Span};
use uuid::Uuid;

pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Longer incoming ids are replaced by a generated one.
const MAX_INCOMING_ID_LEN: usize = 128;

pub async fn trace_request(request: Request, next: Next) -> Response {
    let request_id = incoming_request_id(request.headers()).unwrap_or_else(|| random_id("req"));
    let span = tracing::info_span!(
        "http_request",
        request_id = %request_id,
        method = %request.method(),
        path = %request.uri().path(),
        view_id = field::Empty,
        slug = field::Empty,
    );
    let started_at = Instant::now();

    let mut response = next.run(request).instrument(span.clone()).await;
    if let Ok(value) = HeaderValue::from_str(&request_id) {
        response.headers_mut().insert(REQUEST_ID_HEADER, value);
    }

    let status = response.status();
    let elapsed_ms = started_at.elapsed().as_millis();
    if status.is_server_error() {
        tracing::warn!(parent: &span, status = status.as_u16(), elapsed_ms, "request failed");
    } else {
        tracing::info!(parent: &span, status = status.as_u16(), elapsed_ms, "request completed");
    }
    response
}

/// Random id of the form `<prefix>-<32 hex digits>`.
///
/// Listing view ids act as the access key to a reader's view and must not be
/// guessable.
pub fn random_id(prefix: &str) -> String {
    format!("{prefix}-{}", Uuid::new_v4().simple())
}

/// Attaches a listing view id to the current request span.
pub fn record_view(view_id: &str) {
    Span::current().record("view_id", view_id);
}

/// Attaches an article slug to the current request span.
pub fn record_slug(slug: &str) {
    Span::current().record("slug", slug);
}

fn incoming_request_id(headers: &HeaderMap) -> Option<String> {
    headers
        .get(REQUEST_ID_HEADER)
        .and_then(|value| value.to_str().ok())
        .map(str::trim)
        .filter(|value| !value.is_empty() && value.len() <= MAX_INCOMING_ID_LEN)
        .map(ToOwned::to_owned)
}
