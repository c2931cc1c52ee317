//! Doctor directory, self-service profile and schedule.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::{get, put};
use axum::Router;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use hms_core::model::{DoctorProfile, ScheduleEntry};
use hms_core::repositories::appointments::{self, AppointmentScope};
use hms_core::repositories::doctors::{self, DoctorUpdate, NewDoctor};
use hms_core::repositories::users::NewUser;
use hms_core::{auth, authz, validation, HmsError};
use hms_types::Role;

use crate::error::ApiResult;
use crate::extract::{AuthUser, Json};
use crate::routes::appointments::AppointmentListRes;
use crate::routes::{non_empty, required, MessageRes};
use crate::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/doctor", get(list_doctors).post(create_doctor))
        .route("/doctor/me", get(my_profile).put(update_my_profile))
        .route("/doctor/schedule", get(my_schedule).put(update_availability))
        .route("/doctor/:id", get(get_doctor).put(update_doctor))
        .route("/doctor/:id/appointments", get(doctor_appointments))
}

#[derive(Debug, Serialize, ToSchema)]
pub struct DoctorListRes {
    pub doctors: Vec<DoctorProfile>,
    pub total: usize,
}

#[derive(Debug, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct CreateDoctorReq {
    pub name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    pub contact_no: Option<String>,
    pub specialization: Option<String>,
    pub experience_yrs: Option<i64>,
    pub qualification: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct DoctorRes {
    pub message: String,
    pub doctor: DoctorProfile,
}

/// Partial update accepted by `PUT /doctor/:id`.
#[derive(Debug, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct DoctorUpdateReq {
    pub specialization: Option<String>,
    pub experience_yrs: Option<i64>,
    pub qualification: Option<String>,
    pub available_from: Option<String>,
    pub available_to: Option<String>,
}

/// Self-service update accepted by `PUT /doctor/me`; unlike the admin
/// endpoint it also covers the account fields.
#[derive(Debug, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct MyProfileReq {
    pub name: Option<String>,
    pub contact_no: Option<String>,
    pub specialization: Option<String>,
    pub experience_yrs: Option<i64>,
    pub qualification: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleRes {
    pub doctor_id: i64,
    pub available_from: Option<DateTime<Utc>>,
    pub available_to: Option<DateTime<Utc>>,
    pub schedule: Vec<ScheduleEntry>,
}

#[derive(Debug, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct AvailabilityReq {
    pub available_from: Option<String>,
    pub available_to: Option<String>,
}

#[utoipa::path(
    get,
    path = "/doctor",
    responses(
        (status = 200, description = "All doctors", body = DoctorListRes),
        (status = 401, description = "Missing or invalid token")
    )
)]
/// The doctor directory, visible to any signed-in user.
#[axum::debug_handler]
pub async fn list_doctors(
    State(state): State<AppState>,
    AuthUser(_claims): AuthUser,
) -> ApiResult<Json<DoctorListRes>> {
    let doctors = doctors::list(&state.pool).await?;
    Ok(Json(DoctorListRes {
        total: doctors.len(),
        doctors,
    }))
}

#[utoipa::path(
    post,
    path = "/doctor",
    request_body = CreateDoctorReq,
    responses(
        (status = 201, description = "Doctor registered", body = DoctorRes),
        (status = 400, description = "Missing fields or malformed email"),
        (status = 403, description = "Caller is not an admin"),
        (status = 409, description = "Email already registered")
    )
)]
/// Register a doctor: the account and the profile in one step. Admin only.
#[axum::debug_handler]
pub async fn create_doctor(
    State(state): State<AppState>,
    AuthUser(claims): AuthUser,
    Json(req): Json<CreateDoctorReq>,
) -> ApiResult<(StatusCode, Json<DoctorRes>)> {
    authz::require_role(&claims, &[Role::Admin])?;

    let name = required(req.name.as_deref(), "Required fields missing")?;
    let email = required(req.email.as_deref(), "Required fields missing")?;
    let contact_no = required(req.contact_no.as_deref(), "Required fields missing")?;
    let specialization = required(req.specialization.as_deref(), "Required fields missing")?;
    required(req.password.as_deref(), "Required fields missing")?;
    let password = req.password.as_deref().unwrap_or_default();

    if !validation::is_valid_email(email) {
        return Err(HmsError::InvalidInput("Invalid email format".into()).into());
    }

    let password_hash = auth::hash_password(password, state.bcrypt_cost)?;
    let (_, doctor_id) = doctors::create_with_account(
        &state.pool,
        &NewUser {
            name,
            email,
            password_hash: &password_hash,
            role: Role::Doctor,
            contact_no,
        },
        &NewDoctor {
            specialization,
            experience_yrs: req.experience_yrs.unwrap_or(0),
            qualification: non_empty(req.qualification.as_deref()),
            available_from: None,
            available_to: None,
        },
    )
    .await?;

    let doctor = doctors::find(&state.pool, doctor_id)
        .await?
        .ok_or_else(|| HmsError::NotFound("Doctor".into()))?;
    tracing::info!(doctor_id, "doctor registered");
    Ok((
        StatusCode::CREATED,
        Json(DoctorRes {
            message: "Doctor registered successfully".into(),
            doctor,
        }),
    ))
}

#[utoipa::path(
    get,
    path = "/doctor/me",
    responses(
        (status = 200, description = "The caller's doctor profile", body = DoctorProfile),
        (status = 404, description = "Caller has no doctor profile")
    )
)]
/// Fetch the caller's own doctor profile.
#[axum::debug_handler]
pub async fn my_profile(
    State(state): State<AppState>,
    AuthUser(claims): AuthUser,
) -> ApiResult<Json<DoctorProfile>> {
    let doctor = doctors::find_by_user(&state.pool, claims.user_id)
        .await?
        .ok_or_else(|| HmsError::NotFound("Doctor profile".into()))?;
    Ok(Json(doctor))
}

#[utoipa::path(
    put,
    path = "/doctor/me",
    request_body = MyProfileReq,
    responses(
        (status = 200, description = "Profile updated", body = MessageRes),
        (status = 403, description = "Caller is neither doctor nor admin"),
        (status = 404, description = "Caller has no doctor profile")
    )
)]
/// Update the caller's own account and doctor fields in one call.
#[axum::debug_handler]
pub async fn update_my_profile(
    State(state): State<AppState>,
    AuthUser(claims): AuthUser,
    Json(req): Json<MyProfileReq>,
) -> ApiResult<Json<MessageRes>> {
    authz::require_role(&claims, &[Role::Doctor, Role::Admin])?;

    let matched = doctors::update_with_account(
        &state.pool,
        claims.user_id,
        non_empty(req.name.as_deref()),
        non_empty(req.contact_no.as_deref()),
        &DoctorUpdate {
            specialization: non_empty(req.specialization.as_deref()),
            experience_yrs: req.experience_yrs,
            qualification: non_empty(req.qualification.as_deref()),
            available_from: None,
            available_to: None,
        },
    )
    .await?;
    if !matched {
        return Err(HmsError::NotFound("Doctor profile".into()).into());
    }
    Ok(Json(MessageRes::new("Profile updated")))
}

#[utoipa::path(
    get,
    path = "/doctor/schedule",
    responses(
        (status = 200, description = "The caller's availability window and booked slots", body = ScheduleRes),
        (status = 404, description = "Caller has no doctor profile")
    )
)]
/// The caller's schedule: availability window plus booked slots in time
/// order.
#[axum::debug_handler]
pub async fn my_schedule(
    State(state): State<AppState>,
    AuthUser(claims): AuthUser,
) -> ApiResult<Json<ScheduleRes>> {
    let doctor = doctors::find_by_user(&state.pool, claims.user_id)
        .await?
        .ok_or_else(|| HmsError::NotFound("Doctor".into()))?;
    let schedule = appointments::schedule_for_doctor(&state.pool, doctor.doctor_id).await?;
    Ok(Json(ScheduleRes {
        doctor_id: doctor.doctor_id,
        available_from: doctor.available_from,
        available_to: doctor.available_to,
        schedule,
    }))
}

#[utoipa::path(
    put,
    path = "/doctor/schedule",
    request_body = AvailabilityReq,
    responses(
        (status = 200, description = "Availability replaced", body = MessageRes),
        (status = 400, description = "Missing or unparseable window"),
        (status = 403, description = "Caller is not a doctor"),
        (status = 404, description = "Caller has no doctor profile")
    )
)]
/// Replace the caller's availability window. Both ends are required.
#[axum::debug_handler]
pub async fn update_availability(
    State(state): State<AppState>,
    AuthUser(claims): AuthUser,
    Json(req): Json<AvailabilityReq>,
) -> ApiResult<Json<MessageRes>> {
    authz::require_role(&claims, &[Role::Doctor])?;

    let (Some(from_raw), Some(to_raw)) = (
        non_empty(req.available_from.as_deref()),
        non_empty(req.available_to.as_deref()),
    ) else {
        return Err(HmsError::InvalidInput("Missing availability".into()).into());
    };
    let available_from = validation::timestamp_utc(from_raw, "Invalid availability")?;
    let available_to = validation::timestamp_utc(to_raw, "Invalid availability")?;

    let doctor_id = authz::resolve_doctor_id(&state.pool, &claims)
        .await?
        .ok_or_else(|| HmsError::NotFound("Doctor profile".into()))?;
    if !doctors::set_availability(&state.pool, doctor_id, available_from, available_to).await? {
        return Err(HmsError::NotFound("Doctor profile".into()).into());
    }

    tracing::info!(doctor_id, "availability updated");
    Ok(Json(MessageRes::new("Availability updated")))
}

#[utoipa::path(
    get,
    path = "/doctor/{id}",
    responses(
        (status = 200, description = "Doctor profile", body = DoctorProfile),
        (status = 403, description = "Caller is neither this doctor nor an admin"),
        (status = 404, description = "Unknown doctor")
    )
)]
/// Fetch one doctor. Admins see anyone; doctors see themselves.
#[axum::debug_handler]
pub async fn get_doctor(
    State(state): State<AppState>,
    AuthUser(claims): AuthUser,
    Path(doctor_id): Path<i64>,
) -> ApiResult<Json<DoctorProfile>> {
    let own = authz::resolve_doctor_id(&state.pool, &claims).await?;
    if !authz::owns_or_admin(claims.role, own, doctor_id) {
        return Err(HmsError::Forbidden.into());
    }

    let doctor = doctors::find(&state.pool, doctor_id)
        .await?
        .ok_or_else(|| HmsError::NotFound("Doctor".into()))?;
    Ok(Json(doctor))
}

#[utoipa::path(
    put,
    path = "/doctor/{id}",
    request_body = DoctorUpdateReq,
    responses(
        (status = 200, description = "Updated doctor", body = DoctorRes),
        (status = 400, description = "Empty update or unparseable availability"),
        (status = 403, description = "Caller is neither this doctor nor an admin"),
        (status = 404, description = "Unknown doctor")
    )
)]
/// Update a doctor's professional fields. Admins update anyone; doctors
/// update themselves.
#[axum::debug_handler]
pub async fn update_doctor(
    State(state): State<AppState>,
    AuthUser(claims): AuthUser,
    Path(doctor_id): Path<i64>,
    Json(req): Json<DoctorUpdateReq>,
) -> ApiResult<Json<DoctorRes>> {
    let own = authz::resolve_doctor_id(&state.pool, &claims).await?;
    if !authz::owns_or_admin(claims.role, own, doctor_id) {
        return Err(HmsError::Forbidden.into());
    }

    let available_from = non_empty(req.available_from.as_deref())
        .map(|raw| validation::timestamp_utc(raw, "Invalid availability"))
        .transpose()?;
    let available_to = non_empty(req.available_to.as_deref())
        .map(|raw| validation::timestamp_utc(raw, "Invalid availability"))
        .transpose()?;
    let update = DoctorUpdate {
        specialization: non_empty(req.specialization.as_deref()),
        experience_yrs: req.experience_yrs,
        qualification: non_empty(req.qualification.as_deref()),
        available_from,
        available_to,
    };
    if update.is_empty() {
        return Err(HmsError::InvalidInput("No fields to update".into()).into());
    }

    if !doctors::update(&state.pool, doctor_id, &update).await? {
        return Err(HmsError::NotFound("Doctor".into()).into());
    }
    let doctor = doctors::find(&state.pool, doctor_id)
        .await?
        .ok_or_else(|| HmsError::NotFound("Doctor".into()))?;
    Ok(Json(DoctorRes {
        message: "Doctor updated successfully".into(),
        doctor,
    }))
}

#[utoipa::path(
    get,
    path = "/doctor/{id}/appointments",
    responses(
        (status = 200, description = "This doctor's appointments, newest first", body = AppointmentListRes),
        (status = 403, description = "Caller is neither this doctor nor an admin")
    )
)]
/// List one doctor's appointments. Admins see anyone's; doctors their own.
#[axum::debug_handler]
pub async fn doctor_appointments(
    State(state): State<AppState>,
    AuthUser(claims): AuthUser,
    Path(doctor_id): Path<i64>,
) -> ApiResult<Json<AppointmentListRes>> {
    let own = authz::resolve_doctor_id(&state.pool, &claims).await?;
    if !authz::owns_or_admin(claims.role, own, doctor_id) {
        return Err(HmsError::Forbidden.into());
    }

    let appointments =
        appointments::list(&state.pool, AppointmentScope::Doctor(doctor_id)).await?;
    Ok(Json(AppointmentListRes {
        total: appointments.len(),
        appointments,
    }))
}
