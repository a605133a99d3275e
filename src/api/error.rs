//! Mapping from library errors to HTTP responses

use crate::error::FeedbackError;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use tracing::error;

/// Error body returned by every endpoint
#[derive(Debug, Serialize)]
struct ErrorBody {
    error: String,
}

/// Wrapper so handlers can use `?` on library results
#[derive(Debug)]
pub struct ApiError(pub FeedbackError);

impl From<FeedbackError> for ApiError {
    fn from(err: FeedbackError) -> Self {
        ApiError(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match &self.0 {
            FeedbackError::Validation(msg) => (StatusCode::UNPROCESSABLE_ENTITY, msg.clone()),
            // Same body whatever the cause
            FeedbackError::Auth => (StatusCode::UNAUTHORIZED, "Unauthorized".to_string()),
            other => {
                error!("Request failed: {}", other);
                (StatusCode::INTERNAL_SERVER_ERROR, other.to_string())
            }
        };

        (status, Json(ErrorBody { error: message })).into_response()
    }
}
