//! The wire error envelope.
//!
//! Every failure leaves the API as `{"error": "<message>"}` with the status
//! implied by the error's kind. Internal causes are logged and replaced with
//! a generic message so database and hashing details never reach a client.

use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;

use hms_core::HmsError;

/// Error half of every handler result.
#[derive(Debug)]
pub enum ApiError {
    /// A core error, mapped onto its HTTP status.
    Core(HmsError),
    /// Login failure. Deliberately the same message for an unknown email and
    /// a wrong password.
    InvalidCredentials,
}

/// Handler result alias used across the route modules.
pub type ApiResult<T> = Result<T, ApiError>;

impl From<HmsError> for ApiError {
    fn from(err: HmsError) -> Self {
        Self::Core(err)
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::Core(HmsError::InvalidInput(rejection.body_text()))
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::InvalidCredentials => (
                StatusCode::UNAUTHORIZED,
                "Invalid email or password".to_owned(),
            ),
            ApiError::Core(err) => {
                let status = match &err {
                    HmsError::InvalidInput(_) => StatusCode::BAD_REQUEST,
                    HmsError::Unauthenticated => StatusCode::UNAUTHORIZED,
                    HmsError::Forbidden => StatusCode::FORBIDDEN,
                    HmsError::NotFound(_) => StatusCode::NOT_FOUND,
                    HmsError::Conflict(_) => StatusCode::CONFLICT,
                    HmsError::CorruptRecord(_)
                    | HmsError::Database(_)
                    | HmsError::PasswordHash(_)
                    | HmsError::Token(_) => StatusCode::INTERNAL_SERVER_ERROR,
                };
                if status == StatusCode::INTERNAL_SERVER_ERROR {
                    tracing::error!(error = %err, "request failed");
                    (status, "Internal server error".to_owned())
                } else {
                    (status, err.to_string())
                }
            }
        };
        (status, Json(json!({ "error": message }))).into_response()
    }
}
