//! Mapping of domain errors onto HTTP responses.

use armory_core::Error;
use axum::http::StatusCode;
use tracing::{error, warn};

/// Error half of every handler result.
pub type ApiError = (StatusCode, String);

pub fn status_for(err: &Error) -> StatusCode {
    match err {
        e if e.is_upstream() => StatusCode::BAD_GATEWAY,
        e if e.is_not_found() => StatusCode::NOT_FOUND,
        e if e.is_invalid_input() => StatusCode::BAD_REQUEST,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

/// Convert a domain error, logging server-side failures.
pub fn api_error(err: Error) -> ApiError {
    let status = status_for(&err);
    if status == StatusCode::BAD_GATEWAY {
        warn!(error = %err, "Upstream failure");
    } else if status.is_server_error() {
        error!(error = %err, "Request failed");
    }
    (status, err.to_string())
}
