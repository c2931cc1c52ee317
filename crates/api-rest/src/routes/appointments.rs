//! Appointment booking and lifecycle.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::get;
use axum::Router;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use hms_core::booking;
use hms_core::model::{Appointment, AppointmentSummary};
use hms_core::repositories::appointments;
use hms_core::{validation, HmsError};
use hms_types::AppointmentStatus;

use crate::error::ApiResult;
use crate::extract::{AuthUser, Json};
use crate::routes::{non_empty, required, MessageRes};
use crate::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/appointment", get(list_appointments).post(book_appointment))
        .route(
            "/appointment/:id",
            get(get_appointment)
                .put(update_appointment)
                .delete(cancel_appointment),
        )
}

#[derive(Debug, Serialize, ToSchema)]
pub struct AppointmentListRes {
    pub appointments: Vec<AppointmentSummary>,
    pub total: usize,
}

#[derive(Debug, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct BookReq {
    pub doctor_id: Option<i64>,
    /// RFC 3339 timestamp of the slot.
    pub appt_date: Option<String>,
    /// Defaults to 30 minutes.
    pub duration_min: Option<i64>,
    pub reason: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BookedRes {
    pub message: String,
    pub appointment_id: i64,
}

#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct StatusReq {
    pub status: Option<String>,
}

#[utoipa::path(
    get,
    path = "/appointment",
    responses(
        (status = 200, description = "The caller's slice of the appointment book, newest first", body = AppointmentListRes),
        (status = 401, description = "Missing or invalid token")
    )
)]
/// List appointments. Admins see all, doctors and patients their own; a
/// caller with no doctor/patient record yet sees an empty list.
#[axum::debug_handler]
pub async fn list_appointments(
    State(state): State<AppState>,
    AuthUser(claims): AuthUser,
) -> ApiResult<Json<AppointmentListRes>> {
    let appointments = match booking::scope_for(&state.pool, &claims).await? {
        Some(scope) => appointments::list(&state.pool, scope).await?,
        None => Vec::new(),
    };
    Ok(Json(AppointmentListRes {
        total: appointments.len(),
        appointments,
    }))
}

#[utoipa::path(
    post,
    path = "/appointment",
    request_body = BookReq,
    responses(
        (status = 201, description = "Slot reserved", body = BookedRes),
        (status = 400, description = "Missing fields or unparseable date"),
        (status = 403, description = "Caller is not a patient"),
        (status = 404, description = "Unknown doctor or incomplete patient profile"),
        (status = 409, description = "Doctor already booked at that time")
    )
)]
/// Book an appointment with a doctor at an exact time.
///
/// # Errors
/// Returns `404 Patient profile not found` until the caller has saved their
/// patient record, and `409` when the doctor holds a live appointment at the
/// same timestamp.
#[axum::debug_handler]
pub async fn book_appointment(
    State(state): State<AppState>,
    AuthUser(claims): AuthUser,
    Json(req): Json<BookReq>,
) -> ApiResult<(StatusCode, Json<BookedRes>)> {
    let (Some(doctor_id), Some(appt_raw)) = (req.doctor_id, non_empty(req.appt_date.as_deref()))
    else {
        return Err(HmsError::InvalidInput(
            "Doctor ID and appointment date are required".into(),
        )
        .into());
    };
    let appt_date = validation::timestamp_utc(appt_raw, "Invalid appointment date")?;

    let appointment_id = booking::book(
        &state.pool,
        &claims,
        doctor_id,
        appt_date,
        req.duration_min.unwrap_or(30),
        non_empty(req.reason.as_deref()),
    )
    .await?;

    Ok((
        StatusCode::CREATED,
        Json(BookedRes {
            message: "Appointment booked successfully".into(),
            appointment_id,
        }),
    ))
}

#[utoipa::path(
    get,
    path = "/appointment/{id}",
    responses(
        (status = 200, description = "The appointment", body = Appointment),
        (status = 403, description = "Caller is not on this appointment"),
        (status = 404, description = "Unknown appointment")
    )
)]
/// Fetch one appointment, visible to its patient, its doctor and admins.
#[axum::debug_handler]
pub async fn get_appointment(
    State(state): State<AppState>,
    AuthUser(claims): AuthUser,
    Path(appointment_id): Path<i64>,
) -> ApiResult<Json<Appointment>> {
    let appointment = booking::fetch(&state.pool, &claims, appointment_id).await?;
    Ok(Json(appointment))
}

#[utoipa::path(
    put,
    path = "/appointment/{id}",
    request_body = StatusReq,
    responses(
        (status = 200, description = "Status changed", body = MessageRes),
        (status = 400, description = "Missing or unknown status"),
        (status = 403, description = "This caller may not make this transition"),
        (status = 404, description = "Unknown appointment"),
        (status = 409, description = "Appointment already completed or cancelled")
    )
)]
/// Move an appointment through its lifecycle. Patients may cancel their own,
/// doctors complete or cancel their own, admins anything; finished
/// appointments stay finished.
#[axum::debug_handler]
pub async fn update_appointment(
    State(state): State<AppState>,
    AuthUser(claims): AuthUser,
    Path(appointment_id): Path<i64>,
    Json(req): Json<StatusReq>,
) -> ApiResult<Json<MessageRes>> {
    let raw = required(req.status.as_deref(), "Status is required")?;
    let next: AppointmentStatus = raw
        .parse()
        .map_err(|_| HmsError::InvalidInput("Invalid status".into()))?;

    booking::set_status(&state.pool, &claims, appointment_id, next).await?;
    Ok(Json(MessageRes::new("Appointment updated successfully")))
}

#[utoipa::path(
    delete,
    path = "/appointment/{id}",
    responses(
        (status = 200, description = "Appointment cancelled", body = MessageRes),
        (status = 403, description = "Caller is neither the owning patient nor an admin"),
        (status = 404, description = "Unknown appointment"),
        (status = 409, description = "Appointment already completed")
    )
)]
/// Cancel an appointment. Owning patient or admin; cancelling twice is a
/// no-op success.
#[axum::debug_handler]
pub async fn cancel_appointment(
    State(state): State<AppState>,
    AuthUser(claims): AuthUser,
    Path(appointment_id): Path<i64>,
) -> ApiResult<Json<MessageRes>> {
    booking::cancel(&state.pool, &claims, appointment_id).await?;
    Ok(Json(MessageRes::new("Appointment cancelled successfully")))
}
