//! HTTP error response mapping.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;

use khrushchevka_domain::error::KhrushchevkaError;

/// JSON error body returned by API endpoints.
#[derive(Serialize)]
struct ErrorBody {
    error: String,
}

/// Maps [`KhrushchevkaError`] (or a malformed request) to an HTTP response.
pub enum ApiError {
    Domain(KhrushchevkaError),
    BadRequest(String),
}

impl From<KhrushchevkaError> for ApiError {
    fn from(err: KhrushchevkaError) -> Self {
        Self::Domain(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            Self::BadRequest(message) => (StatusCode::BAD_REQUEST, message.clone()),
            Self::Domain(KhrushchevkaError::Validation(err)) => {
                (StatusCode::BAD_REQUEST, err.to_string())
            }
            Self::Domain(KhrushchevkaError::FlowNotFound(err)) => {
                (StatusCode::NOT_FOUND, err.to_string())
            }
            Self::Domain(KhrushchevkaError::NoBoardConnected(err)) => {
                (StatusCode::NOT_FOUND, err.to_string())
            }
            Self::Domain(
                err @ (KhrushchevkaError::Hardware(_) | KhrushchevkaError::Persistence(_)),
            ) => {
                tracing::error!(error = %err, source = ?std::error::Error::source(err), "request failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal server error".to_string(),
                )
            }
        };

        (status, Json(ErrorBody { error: message })).into_response()
    }
}
