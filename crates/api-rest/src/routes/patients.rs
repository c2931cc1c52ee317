//! Patient registration, directory and per-patient views.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::get;
use axum::Router;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use hms_core::model::PatientProfile;
use hms_core::repositories::appointments::{self, AppointmentScope};
use hms_core::repositories::patients::{self, PatientUpdate};
use hms_core::repositories::users::NewUser;
use hms_core::{auth, authz, validation, HmsError};
use hms_types::Role;

use crate::error::{ApiError, ApiResult};
use crate::extract::{AuthUser, Json};
use crate::routes::appointments::AppointmentListRes;
use crate::routes::{non_empty, required, MessageRes};
use crate::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/patient", get(list_patients).post(register_patient))
        .route("/patient/:id", get(get_patient).put(update_patient))
        .route("/patient/:id/appointments", get(patient_appointments))
}

/// Patient-record fields shared by the self-service and admin endpoints.
/// Everything is optional; absent and blank fields leave stored values
/// alone.
#[derive(Debug, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct PatientFields {
    pub gender: Option<String>,
    pub date_of_birth: Option<String>,
    pub blood_group: Option<String>,
    pub address: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub zip_code: Option<String>,
    pub emergency_contact: Option<String>,
    pub allergies: Option<String>,
    pub medical_history: Option<String>,
    pub insurance_id: Option<String>,
    pub insurance_provider: Option<String>,
}

impl PatientFields {
    /// Convert to the storage update, parsing the date of birth. A date with
    /// a time component is accepted and truncated to the date.
    pub(crate) fn to_update(&self) -> Result<PatientUpdate<'_>, ApiError> {
        let date_of_birth = non_empty(self.date_of_birth.as_deref())
            .map(|raw| validation::date_only(raw, "Invalid date of birth"))
            .transpose()?;
        Ok(PatientUpdate {
            gender: non_empty(self.gender.as_deref()),
            date_of_birth,
            blood_group: non_empty(self.blood_group.as_deref()),
            address: non_empty(self.address.as_deref()),
            city: non_empty(self.city.as_deref()),
            state: non_empty(self.state.as_deref()),
            zip_code: non_empty(self.zip_code.as_deref()),
            emergency_contact: non_empty(self.emergency_contact.as_deref()),
            allergies: non_empty(self.allergies.as_deref()),
            medical_history: non_empty(self.medical_history.as_deref()),
            insurance_id: non_empty(self.insurance_id.as_deref()),
            insurance_provider: non_empty(self.insurance_provider.as_deref()),
        })
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct PatientListRes {
    pub patients: Vec<PatientProfile>,
    pub total: usize,
}

#[derive(Debug, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct RegisterPatientReq {
    pub name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    pub contact_no: Option<String>,
    #[serde(flatten)]
    pub profile: PatientFields,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct PatientRes {
    pub message: String,
    pub patient: PatientProfile,
}

#[utoipa::path(
    get,
    path = "/patient",
    responses(
        (status = 200, description = "All patients", body = PatientListRes),
        (status = 403, description = "Caller is not an admin")
    )
)]
/// The patient directory. Admin only.
#[axum::debug_handler]
pub async fn list_patients(
    State(state): State<AppState>,
    AuthUser(claims): AuthUser,
) -> ApiResult<Json<PatientListRes>> {
    authz::require_role(&claims, &[Role::Admin])?;
    let patients = patients::list(&state.pool).await?;
    Ok(Json(PatientListRes {
        total: patients.len(),
        patients,
    }))
}

#[utoipa::path(
    post,
    path = "/patient",
    request_body = RegisterPatientReq,
    responses(
        (status = 201, description = "Patient registered", body = PatientRes),
        (status = 400, description = "Missing fields or malformed email"),
        (status = 409, description = "Email already registered")
    )
)]
/// Register a patient in one step: account plus whatever record fields the
/// caller provides. Open endpoint, used by front-desk kiosks.
#[axum::debug_handler]
pub async fn register_patient(
    State(state): State<AppState>,
    Json(req): Json<RegisterPatientReq>,
) -> ApiResult<(StatusCode, Json<PatientRes>)> {
    let name = required(req.name.as_deref(), "Required fields missing")?;
    let email = required(req.email.as_deref(), "Required fields missing")?;
    let contact_no = required(req.contact_no.as_deref(), "Required fields missing")?;
    required(req.password.as_deref(), "Required fields missing")?;
    let password = req.password.as_deref().unwrap_or_default();

    if !validation::is_valid_email(email) {
        return Err(HmsError::InvalidInput("Invalid email format".into()).into());
    }

    let profile = req.profile.to_update()?;
    let password_hash = auth::hash_password(password, state.bcrypt_cost)?;
    let (_, patient_id) = patients::create_with_account(
        &state.pool,
        &NewUser {
            name,
            email,
            password_hash: &password_hash,
            role: Role::Patient,
            contact_no,
        },
        &profile,
    )
    .await?;

    let patient = patients::find(&state.pool, patient_id)
        .await?
        .ok_or_else(|| HmsError::NotFound("Patient".into()))?;
    tracing::info!(patient_id, "patient registered");
    Ok((
        StatusCode::CREATED,
        Json(PatientRes {
            message: "Patient registered successfully".into(),
            patient,
        }),
    ))
}

#[utoipa::path(
    get,
    path = "/patient/{id}",
    responses(
        (status = 200, description = "Patient record", body = PatientProfile),
        (status = 403, description = "Caller is neither this patient nor an admin"),
        (status = 404, description = "Unknown patient")
    )
)]
/// Fetch one patient. Admins see anyone; patients see themselves.
#[axum::debug_handler]
pub async fn get_patient(
    State(state): State<AppState>,
    AuthUser(claims): AuthUser,
    Path(patient_id): Path<i64>,
) -> ApiResult<Json<PatientProfile>> {
    let patient = patients::find(&state.pool, patient_id)
        .await?
        .ok_or_else(|| HmsError::NotFound("Patient".into()))?;

    let own = authz::resolve_patient_id(&state.pool, &claims).await?;
    if !authz::owns_or_admin(claims.role, own, patient_id) {
        return Err(HmsError::Forbidden.into());
    }
    Ok(Json(patient))
}

#[utoipa::path(
    put,
    path = "/patient/{id}",
    request_body = PatientFields,
    responses(
        (status = 200, description = "Record updated", body = MessageRes),
        (status = 400, description = "Empty update or unparseable date of birth"),
        (status = 403, description = "Caller is neither this patient nor an admin"),
        (status = 404, description = "Unknown patient")
    )
)]
/// Update a patient's record fields. Admins update anyone; patients update
/// themselves. At least one field must be provided.
#[axum::debug_handler]
pub async fn update_patient(
    State(state): State<AppState>,
    AuthUser(claims): AuthUser,
    Path(patient_id): Path<i64>,
    Json(req): Json<PatientFields>,
) -> ApiResult<Json<MessageRes>> {
    let own = authz::resolve_patient_id(&state.pool, &claims).await?;
    if !authz::owns_or_admin(claims.role, own, patient_id) {
        return Err(HmsError::Forbidden.into());
    }

    let update = req.to_update()?;
    if update.is_empty() {
        return Err(HmsError::InvalidInput("No fields to update".into()).into());
    }
    if !patients::update(&state.pool, patient_id, &update).await? {
        return Err(HmsError::NotFound("Patient".into()).into());
    }
    Ok(Json(MessageRes::new("Patient profile updated successfully")))
}

#[utoipa::path(
    get,
    path = "/patient/{id}/appointments",
    responses(
        (status = 200, description = "This patient's appointments, newest first", body = AppointmentListRes),
        (status = 403, description = "Caller is neither this patient nor an admin")
    )
)]
/// List one patient's appointments. Admins see anyone's; patients their own.
#[axum::debug_handler]
pub async fn patient_appointments(
    State(state): State<AppState>,
    AuthUser(claims): AuthUser,
    Path(patient_id): Path<i64>,
) -> ApiResult<Json<AppointmentListRes>> {
    let own = authz::resolve_patient_id(&state.pool, &claims).await?;
    if !authz::owns_or_admin(claims.role, own, patient_id) {
        return Err(HmsError::Forbidden.into());
    }

    let appointments =
        appointments::list(&state.pool, AppointmentScope::Patient(patient_id)).await?;
    Ok(Json(AppointmentListRes {
        total: appointments.len(),
        appointments,
    }))
}
