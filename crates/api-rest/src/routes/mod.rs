//! Route modules, one per resource.
//!
//! Each module owns its request/response DTOs and exposes a `router()` that
//! the crate root merges into the full application.

pub mod admin;
pub mod appointments;
pub mod auth;
pub mod doctors;
pub mod medicines;
pub mod patients;
pub mod prescriptions;
pub mod users;

use axum::extract::State;
use serde::Serialize;
use utoipa::ToSchema;

use hms_core::HmsError;

use crate::error::ApiError;
use crate::extract::Json;
use crate::AppState;

/// Plain `{"message": ...}` success body.
#[derive(Debug, Serialize, ToSchema)]
pub struct MessageRes {
    pub message: String,
}

impl MessageRes {
    pub(crate) fn new(message: &str) -> Self {
        Self {
            message: message.to_owned(),
        }
    }
}

/// Liveness body served at `/health`.
#[derive(Debug, Serialize, ToSchema)]
pub struct HealthRes {
    pub ok: bool,
    pub message: String,
}

#[utoipa::path(
    get,
    path = "/health",
    responses((status = 200, description = "Service is alive", body = HealthRes))
)]
/// Health check endpoint used by monitors and load balancers.
#[axum::debug_handler]
pub async fn health(State(_state): State<AppState>) -> Json<HealthRes> {
    Json(HealthRes {
        ok: true,
        message: "HMS REST API is alive".into(),
    })
}

/// Required-field check shared by the write endpoints. Absent and blank
/// values both fail with the endpoint's own message; the returned value is
/// trimmed.
pub(crate) fn required<'a>(value: Option<&'a str>, message: &str) -> Result<&'a str, ApiError> {
    match value.map(str::trim) {
        Some(trimmed) if !trimmed.is_empty() => Ok(trimmed),
        _ => Err(ApiError::Core(HmsError::InvalidInput(message.to_owned()))),
    }
}

/// Treat blank strings as absent. Partial updates use this so a cleared form
/// field does not overwrite stored data with an empty string.
pub(crate) fn non_empty(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}
