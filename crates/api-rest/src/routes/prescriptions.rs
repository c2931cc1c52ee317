//! Prescription endpoints: headers under `/prescription`, medicine lines
//! under `/prescription-medicine`.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::Router;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use hms_core::model::{PrescriptionDetail, PrescriptionSummary};
use hms_core::prescribing::{self, CreateOutcome};
use hms_core::repositories::prescriptions::LineUpsert;
use hms_core::{authz, HmsError};
use hms_types::Role;

use crate::error::ApiResult;
use crate::extract::{AuthUser, Json};
use crate::routes::{non_empty, MessageRes};
use crate::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/prescription",
            get(list_prescriptions).post(create_prescription),
        )
        .route(
            "/prescription/:id",
            get(get_prescription).put(update_prescription),
        )
        .route(
            "/prescription-medicine",
            post(add_medicines).delete(remove_medicine),
        )
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PrescriptionQuery {
    pub appointment_id: Option<i64>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct PrescriptionListRes {
    pub prescriptions: Vec<PrescriptionSummary>,
    pub total: usize,
}

#[derive(Debug, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct CreatePrescriptionReq {
    pub appointment_id: Option<i64>,
    pub notes: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PrescriptionCreatedRes {
    pub message: String,
    pub prescription_id: i64,
}

#[derive(Debug, Default, Deserialize, ToSchema)]
#[serde(default)]
pub struct NotesReq {
    pub notes: Option<String>,
}

#[derive(Debug, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct MedicineLineReq {
    pub medicine_id: Option<i64>,
    pub dose: Option<String>,
    pub duration: Option<String>,
    pub instructions: Option<String>,
}

#[derive(Debug, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct MedicineLinesReq {
    pub prescription_id: Option<i64>,
    pub medicines: Vec<MedicineLineReq>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RemoveLineQuery {
    pub prescription_id: Option<i64>,
    pub medicine_id: Option<i64>,
}

#[utoipa::path(
    get,
    path = "/prescription",
    responses(
        (status = 200, description = "The caller's prescriptions, newest first, optionally filtered by ?appointmentId=", body = PrescriptionListRes),
        (status = 401, description = "Missing or invalid token")
    )
)]
/// List prescriptions. Admins see all, doctors what they prescribed,
/// patients what was prescribed to them.
#[axum::debug_handler]
pub async fn list_prescriptions(
    State(state): State<AppState>,
    AuthUser(claims): AuthUser,
    Query(query): Query<PrescriptionQuery>,
) -> ApiResult<Json<PrescriptionListRes>> {
    let prescriptions = prescribing::list(&state.pool, &claims, query.appointment_id).await?;
    Ok(Json(PrescriptionListRes {
        total: prescriptions.len(),
        prescriptions,
    }))
}

#[utoipa::path(
    post,
    path = "/prescription",
    request_body = CreatePrescriptionReq,
    responses(
        (status = 201, description = "Prescription created", body = PrescriptionCreatedRes),
        (status = 200, description = "The appointment already had one; its id is returned", body = PrescriptionCreatedRes),
        (status = 400, description = "Missing appointment id"),
        (status = 403, description = "Caller is not a doctor"),
        (status = 404, description = "Unknown appointment")
    )
)]
/// Open a prescription against an appointment. One per appointment: asking
/// again returns the existing id with a 200 instead of failing.
#[axum::debug_handler]
pub async fn create_prescription(
    State(state): State<AppState>,
    AuthUser(claims): AuthUser,
    Json(req): Json<CreatePrescriptionReq>,
) -> ApiResult<(StatusCode, Json<PrescriptionCreatedRes>)> {
    authz::require_role(&claims, &[Role::Doctor])?;

    let Some(appointment_id) = req.appointment_id else {
        return Err(HmsError::InvalidInput("Appointment ID is required".into()).into());
    };

    let outcome = prescribing::create(
        &state.pool,
        &claims,
        appointment_id,
        non_empty(req.notes.as_deref()),
    )
    .await?;
    let (status, message, prescription_id) = match outcome {
        CreateOutcome::Created(id) => {
            (StatusCode::CREATED, "Prescription created successfully", id)
        }
        CreateOutcome::AlreadyExists(id) => (StatusCode::OK, "Prescription already exists", id),
    };

    Ok((
        status,
        Json(PrescriptionCreatedRes {
            message: message.into(),
            prescription_id,
        }),
    ))
}

#[utoipa::path(
    get,
    path = "/prescription/{id}",
    responses(
        (status = 200, description = "Header, patient/doctor names and medicine lines", body = PrescriptionDetail),
        (status = 403, description = "Caller is not on this prescription"),
        (status = 404, description = "Unknown prescription")
    )
)]
/// Fetch one prescription with its medicine lines.
#[axum::debug_handler]
pub async fn get_prescription(
    State(state): State<AppState>,
    AuthUser(claims): AuthUser,
    Path(prescription_id): Path<i64>,
) -> ApiResult<Json<PrescriptionDetail>> {
    let detail = prescribing::detail(&state.pool, &claims, prescription_id).await?;
    Ok(Json(detail))
}

#[utoipa::path(
    put,
    path = "/prescription/{id}",
    request_body = NotesReq,
    responses(
        (status = 200, description = "Notes replaced", body = MessageRes),
        (status = 403, description = "Caller is neither the prescriber nor an admin"),
        (status = 404, description = "Unknown prescription")
    )
)]
/// Replace the prescription's free-text notes; a blank or absent body clears
/// them.
#[axum::debug_handler]
pub async fn update_prescription(
    State(state): State<AppState>,
    AuthUser(claims): AuthUser,
    Path(prescription_id): Path<i64>,
    Json(req): Json<NotesReq>,
) -> ApiResult<Json<MessageRes>> {
    prescribing::update_notes(
        &state.pool,
        &claims,
        prescription_id,
        non_empty(req.notes.as_deref()),
    )
    .await?;
    Ok(Json(MessageRes::new("Prescription updated successfully")))
}

#[utoipa::path(
    post,
    path = "/prescription-medicine",
    request_body = MedicineLinesReq,
    responses(
        (status = 201, description = "Lines written", body = MessageRes),
        (status = 400, description = "Missing prescription id, empty batch or incomplete line"),
        (status = 403, description = "Caller is neither the prescriber nor an admin"),
        (status = 404, description = "Unknown prescription or medicine")
    )
)]
/// Attach a batch of medicine lines to a prescription. The batch is written
/// in one transaction; a line naming an unknown medicine rejects the whole
/// batch, and re-sending a medicine overwrites its line.
#[axum::debug_handler]
pub async fn add_medicines(
    State(state): State<AppState>,
    AuthUser(claims): AuthUser,
    Json(req): Json<MedicineLinesReq>,
) -> ApiResult<(StatusCode, Json<MessageRes>)> {
    authz::require_role(&claims, &[Role::Doctor, Role::Admin])?;

    let Some(prescription_id) = req.prescription_id else {
        return Err(HmsError::InvalidInput(
            "Prescription ID and medicines are required".into(),
        )
        .into());
    };

    let mut lines = Vec::with_capacity(req.medicines.len());
    for line in &req.medicines {
        let (Some(medicine_id), Some(dose), Some(duration)) = (
            line.medicine_id,
            non_empty(line.dose.as_deref()),
            non_empty(line.duration.as_deref()),
        ) else {
            return Err(HmsError::InvalidInput(
                "Medicine ID, dose, and duration are required for each medicine".into(),
            )
            .into());
        };
        lines.push(LineUpsert {
            medicine_id,
            dose,
            duration,
            instructions: non_empty(line.instructions.as_deref()),
        });
    }

    prescribing::add_medicines(&state.pool, &claims, prescription_id, &lines).await?;

    tracing::info!(prescription_id, lines = lines.len(), "prescription lines written");
    Ok((
        StatusCode::CREATED,
        Json(MessageRes::new(
            "Medicines added to prescription successfully",
        )),
    ))
}

#[utoipa::path(
    delete,
    path = "/prescription-medicine",
    responses(
        (status = 200, description = "Line removed (idempotent)", body = MessageRes),
        (status = 400, description = "Missing ?prescriptionId= or ?medicineId="),
        (status = 403, description = "Caller is neither the prescriber nor an admin"),
        (status = 404, description = "Unknown prescription")
    )
)]
/// Remove one medicine line, addressed by `?prescriptionId=&medicineId=`.
/// Removing a line that is not there succeeds.
#[axum::debug_handler]
pub async fn remove_medicine(
    State(state): State<AppState>,
    AuthUser(claims): AuthUser,
    Query(query): Query<RemoveLineQuery>,
) -> ApiResult<Json<MessageRes>> {
    authz::require_role(&claims, &[Role::Doctor, Role::Admin])?;

    let (Some(prescription_id), Some(medicine_id)) = (query.prescription_id, query.medicine_id)
    else {
        return Err(HmsError::InvalidInput(
            "Prescription ID and Medicine ID are required".into(),
        )
        .into());
    };

    prescribing::remove_medicine(&state.pool, &claims, prescription_id, medicine_id).await?;
    Ok(Json(MessageRes::new(
        "Medicine removed from prescription successfully",
    )))
}
