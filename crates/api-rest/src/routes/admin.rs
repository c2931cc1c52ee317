//! Admin-only aggregates.

use axum::extract::State;
use axum::routing::get;
use axum::Router;
use serde::Serialize;
use utoipa::ToSchema;

use hms_core::authz;
use hms_core::reports::{self, DashboardCounts, Reports};
use hms_types::Role;

use crate::error::ApiResult;
use crate::extract::{AuthUser, Json};
use crate::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/admin/dashboard", get(get_dashboard))
        .route("/admin/reports", get(get_reports))
}

#[derive(Debug, Serialize, ToSchema)]
pub struct DashboardRes {
    pub statistics: DashboardCounts,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ReportsRes {
    pub reports: Reports,
}

#[utoipa::path(
    get,
    path = "/admin/dashboard",
    responses(
        (status = 200, description = "Headline counters", body = DashboardRes),
        (status = 403, description = "Caller is not an admin")
    )
)]
/// Dashboard counters: doctors, patients, appointments by status and the
/// last seven days.
#[axum::debug_handler]
pub async fn get_dashboard(
    State(state): State<AppState>,
    AuthUser(claims): AuthUser,
) -> ApiResult<Json<DashboardRes>> {
    authz::require_role(&claims, &[Role::Admin])?;
    let statistics = reports::dashboard(&state.pool).await?;
    Ok(Json(DashboardRes { statistics }))
}

#[utoipa::path(
    get,
    path = "/admin/reports",
    responses(
        (status = 200, description = "Busiest doctors, appointments per status, doctors per specialization", body = ReportsRes),
        (status = 403, description = "Caller is not an admin")
    )
)]
/// The reports page's three breakdowns.
#[axum::debug_handler]
pub async fn get_reports(
    State(state): State<AppState>,
    AuthUser(claims): AuthUser,
) -> ApiResult<Json<ReportsRes>> {
    authz::require_role(&claims, &[Role::Admin])?;
    let reports = reports::compile(&state.pool).await?;
    Ok(Json(ReportsRes { reports }))
}
