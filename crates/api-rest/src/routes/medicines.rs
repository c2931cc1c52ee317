//! Medicine catalogue endpoints. Reads are open to any signed-in user;
//! writes are admin only.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::routing::get;
use axum::Router;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use hms_core::model::Medicine;
use hms_core::repositories::medicines::{self, NewMedicine};
use hms_core::{authz, HmsError};
use hms_types::{MedicineForm, Role};

use crate::error::ApiResult;
use crate::extract::{AuthUser, Json};
use crate::routes::{non_empty, required, MessageRes};
use crate::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/medicine", get(list_medicines).post(create_medicine))
        .route(
            "/medicine/:id",
            get(get_medicine).put(update_medicine).delete(delete_medicine),
        )
}

#[derive(Debug, Default, Deserialize)]
pub struct MedicineQuery {
    pub search: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct MedicineListRes {
    pub medicines: Vec<Medicine>,
    pub total: usize,
}

#[derive(Debug, Default, Deserialize, ToSchema)]
#[serde(default)]
pub struct MedicineReq {
    pub name: Option<String>,
    /// Dosage form in its canonical spelling, e.g. `Tablet`, `Syrup`.
    pub form: Option<String>,
    pub details: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MedicineCreatedRes {
    pub message: String,
    pub medicine_id: i64,
}

#[utoipa::path(
    get,
    path = "/medicine",
    responses(
        (status = 200, description = "The catalogue, alphabetical, optionally filtered by ?search=", body = MedicineListRes),
        (status = 401, description = "Missing or invalid token")
    )
)]
/// List the medicine catalogue.
#[axum::debug_handler]
pub async fn list_medicines(
    State(state): State<AppState>,
    AuthUser(_claims): AuthUser,
    Query(query): Query<MedicineQuery>,
) -> ApiResult<Json<MedicineListRes>> {
    let medicines = medicines::list(&state.pool, non_empty(query.search.as_deref())).await?;
    Ok(Json(MedicineListRes {
        total: medicines.len(),
        medicines,
    }))
}

#[utoipa::path(
    post,
    path = "/medicine",
    request_body = MedicineReq,
    responses(
        (status = 201, description = "Medicine added", body = MedicineCreatedRes),
        (status = 400, description = "Missing name/form or unknown form"),
        (status = 403, description = "Caller is not an admin"),
        (status = 409, description = "Name already in the catalogue")
    )
)]
/// Add a medicine to the catalogue. Admin only; names are unique ignoring
/// case.
#[axum::debug_handler]
pub async fn create_medicine(
    State(state): State<AppState>,
    AuthUser(claims): AuthUser,
    Json(req): Json<MedicineReq>,
) -> ApiResult<(StatusCode, Json<MedicineCreatedRes>)> {
    authz::require_role(&claims, &[Role::Admin])?;

    let name = required(req.name.as_deref(), "Medicine name and form are required")?;
    let form_raw = required(req.form.as_deref(), "Medicine name and form are required")?;
    let form: MedicineForm = form_raw
        .parse()
        .map_err(|_| HmsError::InvalidInput("Invalid medicine form".into()))?;

    let medicine_id = medicines::create(
        &state.pool,
        &NewMedicine {
            name,
            form,
            details: non_empty(req.details.as_deref()),
        },
    )
    .await?;

    tracing::info!(medicine_id, "medicine created");
    Ok((
        StatusCode::CREATED,
        Json(MedicineCreatedRes {
            message: "Medicine created successfully".into(),
            medicine_id,
        }),
    ))
}

#[utoipa::path(
    get,
    path = "/medicine/{id}",
    responses(
        (status = 200, description = "The medicine", body = Medicine),
        (status = 404, description = "Unknown medicine")
    )
)]
/// Fetch one medicine.
#[axum::debug_handler]
pub async fn get_medicine(
    State(state): State<AppState>,
    AuthUser(_claims): AuthUser,
    Path(medicine_id): Path<i64>,
) -> ApiResult<Json<Medicine>> {
    let medicine = medicines::find(&state.pool, medicine_id)
        .await?
        .ok_or_else(|| HmsError::NotFound("Medicine".into()))?;
    Ok(Json(medicine))
}

#[utoipa::path(
    put,
    path = "/medicine/{id}",
    request_body = MedicineReq,
    responses(
        (status = 200, description = "Medicine updated", body = MessageRes),
        (status = 400, description = "Missing name/form or unknown form"),
        (status = 403, description = "Caller is not an admin"),
        (status = 404, description = "Unknown medicine"),
        (status = 409, description = "New name already taken")
    )
)]
/// Rewrite a medicine's name and form; details keep their stored value when
/// absent. Admin only.
#[axum::debug_handler]
pub async fn update_medicine(
    State(state): State<AppState>,
    AuthUser(claims): AuthUser,
    Path(medicine_id): Path<i64>,
    Json(req): Json<MedicineReq>,
) -> ApiResult<Json<MessageRes>> {
    authz::require_role(&claims, &[Role::Admin])?;

    let name = required(req.name.as_deref(), "Medicine name and form are required")?;
    let form_raw = required(req.form.as_deref(), "Medicine name and form are required")?;
    let form: MedicineForm = form_raw
        .parse()
        .map_err(|_| HmsError::InvalidInput("Invalid medicine form".into()))?;

    let matched = medicines::update(
        &state.pool,
        medicine_id,
        Some(name),
        Some(form),
        non_empty(req.details.as_deref()),
    )
    .await?;
    if !matched {
        return Err(HmsError::NotFound("Medicine".into()).into());
    }
    Ok(Json(MessageRes::new("Medicine updated successfully")))
}

#[utoipa::path(
    delete,
    path = "/medicine/{id}",
    responses(
        (status = 200, description = "Medicine removed", body = MessageRes),
        (status = 403, description = "Caller is not an admin"),
        (status = 404, description = "Unknown medicine"),
        (status = 409, description = "Medicine appears on a prescription")
    )
)]
/// Delete a medicine. Refused while any prescription line references it.
#[axum::debug_handler]
pub async fn delete_medicine(
    State(state): State<AppState>,
    AuthUser(claims): AuthUser,
    Path(medicine_id): Path<i64>,
) -> ApiResult<Json<MessageRes>> {
    authz::require_role(&claims, &[Role::Admin])?;

    medicines::find(&state.pool, medicine_id)
        .await?
        .ok_or_else(|| HmsError::NotFound("Medicine".into()))?;
    if medicines::is_referenced(&state.pool, medicine_id).await? {
        return Err(HmsError::Conflict(
            "Cannot delete medicine that is used in prescriptions".into(),
        )
        .into());
    }
    medicines::delete(&state.pool, medicine_id).await?;

    tracing::info!(medicine_id, "medicine deleted");
    Ok(Json(MessageRes::new("Medicine deleted successfully")))
}
