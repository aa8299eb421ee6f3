//! Web-facing error wrapper.
//!
//! Handlers return `Result<_, ApiError>`; any error that can convert into
//! `anyhow::Error` bubbles up with `?` and is rendered as a JSON envelope.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

/// Wraps an internal error for the HTTP boundary.
///
/// The response body keeps the `{"status": "error", "detail": …}` envelope
/// so batch callers can inspect per-request outcomes uniformly.
pub struct ApiError(anyhow::Error);

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        tracing::error!(error = %self.0, "request failed");
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({ "status": "error", "detail": self.0.to_string() })),
        )
            .into_response()
    }
}

impl<E> From<E> for ApiError
where
    E: Into<anyhow::Error>,
{
    fn from(err: E) -> Self {
        Self(err.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn converts_from_anyhow() {
        let err = ApiError::from(anyhow::anyhow!("storage unreachable"));
        assert_eq!(err.0.to_string(), "storage unreachable");
    }
}
