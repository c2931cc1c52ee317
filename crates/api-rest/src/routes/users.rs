//! The caller's own account profile.

use axum::extract::State;
use axum::routing::get;
use axum::Router;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use hms_core::model::UserAccount;
use hms_core::repositories::users;
use hms_core::HmsError;

use crate::error::ApiResult;
use crate::extract::{AuthUser, Json};
use crate::routes::non_empty;
use crate::AppState;

pub fn router() -> Router<AppState> {
    Router::new().route("/user/profile", get(get_profile).put(update_profile))
}

#[derive(Debug, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct ProfileUpdateReq {
    pub name: Option<String>,
    pub contact_no: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ProfileRes {
    pub message: String,
    pub user: UserAccount,
}

#[utoipa::path(
    get,
    path = "/user/profile",
    responses(
        (status = 200, description = "The caller's account", body = UserAccount),
        (status = 401, description = "Missing or invalid token"),
        (status = 404, description = "Account no longer exists")
    )
)]
/// Fetch the caller's account fields.
#[axum::debug_handler]
pub async fn get_profile(
    State(state): State<AppState>,
    AuthUser(claims): AuthUser,
) -> ApiResult<Json<UserAccount>> {
    let account = users::find_by_id(&state.pool, claims.user_id)
        .await?
        .ok_or_else(|| HmsError::NotFound("User".into()))?;
    Ok(Json(account))
}

#[utoipa::path(
    put,
    path = "/user/profile",
    request_body = ProfileUpdateReq,
    responses(
        (status = 200, description = "Updated account", body = ProfileRes),
        (status = 401, description = "Missing or invalid token")
    )
)]
/// Update the caller's display name and contact number.
///
/// Absent or blank fields keep their stored value; an empty body is a no-op
/// that still returns the current account.
#[axum::debug_handler]
pub async fn update_profile(
    State(state): State<AppState>,
    AuthUser(claims): AuthUser,
    Json(req): Json<ProfileUpdateReq>,
) -> ApiResult<Json<ProfileRes>> {
    users::update_profile(
        &state.pool,
        claims.user_id,
        non_empty(req.name.as_deref()),
        non_empty(req.contact_no.as_deref()),
    )
    .await?;

    let user = users::find_by_id(&state.pool, claims.user_id)
        .await?
        .ok_or_else(|| HmsError::NotFound("User".into()))?;
    Ok(Json(ProfileRes {
        message: "Profile updated successfully".into(),
        user,
    }))
}
