//! Request extractors shared by the route modules.

use axum::extract::{FromRequest, FromRequestParts};
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use axum::response::{IntoResponse, Response};

use hms_core::{Claims, HmsError};

use crate::error::ApiError;
use crate::AppState;

/// The verified identity of the caller.
///
/// Reads `Authorization: Bearer <token>` and verifies the token against the
/// service signing key. Handlers that take this extractor never run for an
/// unauthenticated request; the rejection is `401 {"error": "Unauthorized"}`.
pub struct AuthUser(pub Claims);

#[axum::async_trait]
impl FromRequestParts<AppState> for AuthUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.strip_prefix("Bearer "))
            .and_then(|token| state.tokens.verify(token))
            .map(AuthUser)
            .ok_or(ApiError::Core(HmsError::Unauthenticated))
    }
}

/// JSON body extractor whose rejection uses the same `{"error": ...}`
/// envelope as the handlers, instead of axum's plain-text default.
#[derive(FromRequest)]
#[from_request(via(axum::Json), rejection(ApiError))]
pub struct Json<T>(pub T);

impl<T: serde::Serialize> IntoResponse for Json<T> {
    fn into_response(self) -> Response {
        axum::Json(self.0).into_response()
    }
}
