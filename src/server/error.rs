//! HTTP mapping of [`ConvertError`].

use crate::error::ConvertError;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

/// JSON error body: `{"error": "..."}`.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

/// A [`ConvertError`] on its way to becoming an HTTP response.
#[derive(Debug)]
pub struct ApiError(pub ConvertError);

impl From<ConvertError> for ApiError {
    fn from(e: ConvertError) -> Self {
        Self(e)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = StatusCode::from_u16(self.0.status_code())
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

        if self.0.is_client_error() {
            tracing::warn!(status = status.as_u16(), error = %self.0, "Request rejected");
        } else {
            tracing::error!(status = status.as_u16(), error = %self.0, "Conversion failed");
        }

        (
            status,
            Json(ErrorResponse {
                error: self.0.public_message(),
            }),
        )
            .into_response()
    }
}
