//! Registration, login and the self-service patient record.

use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::Router;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use hms_core::model::PatientProfile;
use hms_core::repositories::users::NewUser;
use hms_core::repositories::{doctors, patients, users};
use hms_core::{auth, authz, validation, HmsError, TokenIdentity};
use hms_types::Role;

use crate::error::{ApiError, ApiResult};
use crate::extract::{AuthUser, Json};
use crate::routes::patients::PatientFields;
use crate::routes::{required, MessageRes};
use crate::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/auth/register", post(register))
        .route("/auth/login", post(login))
        .route("/auth/logout", post(logout))
        .route(
            "/auth/register/patient",
            get(my_patient_record).post(save_patient_record),
        )
}

#[derive(Debug, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct RegisterReq {
    pub name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    pub contact_no: Option<String>,
    /// Defaults to `PATIENT` when omitted.
    pub role: Option<String>,
}

#[derive(Debug, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct LoginReq {
    pub email: Option<String>,
    pub password: Option<String>,
}

/// The caller's identity as echoed back by the auth endpoints.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AuthUserInfo {
    pub user_id: i64,
    pub name: String,
    pub email: String,
    pub role: Role,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub doctor_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub patient_id: Option<i64>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct AuthRes {
    pub message: String,
    pub token: String,
    pub user: AuthUserInfo,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct PatientRecordRes {
    pub patient: PatientProfile,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SavePatientRes {
    pub message: String,
    pub token: String,
    pub patient_id: i64,
}

#[utoipa::path(
    post,
    path = "/auth/register",
    request_body = RegisterReq,
    responses(
        (status = 201, description = "Account created and signed in", body = AuthRes),
        (status = 400, description = "Missing or invalid fields"),
        (status = 409, description = "Email already registered")
    )
)]
/// Create an account and sign the caller in.
///
/// The role defaults to `PATIENT`. Patients complete their medical record
/// afterwards through `POST /auth/register/patient`.
///
/// # Errors
/// Returns `400` for missing fields, a malformed email or phone number, or a
/// weak password; `409` when the email is already registered.
#[axum::debug_handler]
pub async fn register(
    State(state): State<AppState>,
    Json(req): Json<RegisterReq>,
) -> ApiResult<(StatusCode, Json<AuthRes>)> {
    let name = required(req.name.as_deref(), "All fields are required")?;
    let email = required(req.email.as_deref(), "All fields are required")?;
    let contact_no = required(req.contact_no.as_deref(), "All fields are required")?;
    // The strength check and the stored hash both see the password exactly
    // as sent.
    required(req.password.as_deref(), "All fields are required")?;
    let password = req.password.as_deref().unwrap_or_default();

    if !validation::is_valid_email(email) {
        return Err(HmsError::InvalidInput("Invalid email format".into()).into());
    }
    if !validation::is_valid_phone(contact_no) {
        return Err(HmsError::InvalidInput("Invalid phone number format".into()).into());
    }
    if !validation::is_strong_password(password) {
        return Err(HmsError::InvalidInput(
            "Password must be at least 8 characters with uppercase, lowercase, and numbers".into(),
        )
        .into());
    }
    let role = match req.role.as_deref() {
        None => Role::Patient,
        Some(raw) => raw
            .parse()
            .map_err(|_| HmsError::InvalidInput("Invalid role".into()))?,
    };

    let password_hash = auth::hash_password(password, state.bcrypt_cost)?;
    let user_id = users::create(
        &state.pool,
        &NewUser {
            name,
            email,
            password_hash: &password_hash,
            role,
            contact_no,
        },
    )
    .await?;

    let token = state.tokens.issue(&TokenIdentity {
        user_id,
        email: email.to_owned(),
        role,
        name: Some(name.to_owned()),
        doctor_id: None,
        patient_id: None,
    })?;

    tracing::info!(user_id, role = role.as_str(), "user registered");
    Ok((
        StatusCode::CREATED,
        Json(AuthRes {
            message: "User registered successfully".into(),
            token,
            user: AuthUserInfo {
                user_id,
                name: name.to_owned(),
                email: email.to_owned(),
                role,
                doctor_id: None,
                patient_id: None,
            },
        }),
    ))
}

#[utoipa::path(
    post,
    path = "/auth/login",
    request_body = LoginReq,
    responses(
        (status = 200, description = "Signed in", body = AuthRes),
        (status = 400, description = "Missing credentials"),
        (status = 401, description = "Unknown email or wrong password")
    )
)]
/// Verify credentials and issue a bearer token.
///
/// The token embeds the linked doctor/patient id when one exists, so most
/// requests resolve ownership without an extra lookup.
#[axum::debug_handler]
pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginReq>,
) -> ApiResult<Json<AuthRes>> {
    let email = required(req.email.as_deref(), "Email and password are required")?;
    required(req.password.as_deref(), "Email and password are required")?;
    let password = req.password.as_deref().unwrap_or_default();

    let credentials = users::find_credentials(&state.pool, email)
        .await?
        .ok_or(ApiError::InvalidCredentials)?;
    if !auth::verify_password(password, &credentials.password_hash)? {
        return Err(ApiError::InvalidCredentials);
    }
    let account = credentials.account;

    let doctor_id = match account.role {
        Role::Doctor => doctors::id_for_user(&state.pool, account.user_id).await?,
        _ => None,
    };
    let patient_id = match account.role {
        Role::Patient => patients::id_for_user(&state.pool, account.user_id).await?,
        _ => None,
    };

    let token = state.tokens.issue(&TokenIdentity {
        user_id: account.user_id,
        email: account.email.clone(),
        role: account.role,
        name: Some(account.name.clone()),
        doctor_id,
        patient_id,
    })?;

    tracing::info!(user_id = account.user_id, "user logged in");
    Ok(Json(AuthRes {
        message: "Login successful".into(),
        token,
        user: AuthUserInfo {
            user_id: account.user_id,
            name: account.name,
            email: account.email,
            role: account.role,
            doctor_id,
            patient_id,
        },
    }))
}

#[utoipa::path(
    post,
    path = "/auth/logout",
    responses((status = 200, description = "Signed out", body = MessageRes))
)]
/// Stateless sign-out. Tokens are not revocable; clients drop theirs.
#[axum::debug_handler]
pub async fn logout() -> Json<MessageRes> {
    Json(MessageRes::new("Logout successful"))
}

#[utoipa::path(
    get,
    path = "/auth/register/patient",
    responses(
        (status = 200, description = "The caller's patient record", body = PatientRecordRes),
        (status = 401, description = "Missing or invalid token"),
        (status = 404, description = "No patient record yet")
    )
)]
/// Fetch the caller's own patient record.
#[axum::debug_handler]
pub async fn my_patient_record(
    State(state): State<AppState>,
    AuthUser(claims): AuthUser,
) -> ApiResult<Json<PatientRecordRes>> {
    let patient = patients::find_by_user(&state.pool, claims.user_id)
        .await?
        .ok_or_else(|| HmsError::NotFound("Patient record".into()))?;
    Ok(Json(PatientRecordRes { patient }))
}

#[utoipa::path(
    post,
    path = "/auth/register/patient",
    request_body = PatientFields,
    responses(
        (status = 201, description = "Record saved; the token carries the patient link", body = SavePatientRes),
        (status = 400, description = "Unparseable date of birth"),
        (status = 403, description = "Caller is not a patient")
    )
)]
/// Create or update the caller's patient record.
///
/// Issues a fresh token embedding the patient id, so follow-up requests
/// (booking in particular) resolve ownership from the token alone.
#[axum::debug_handler]
pub async fn save_patient_record(
    State(state): State<AppState>,
    AuthUser(claims): AuthUser,
    Json(req): Json<PatientFields>,
) -> ApiResult<(StatusCode, Json<SavePatientRes>)> {
    authz::require_role(&claims, &[Role::Patient])?;

    let update = req.to_update()?;
    let patient_id = patients::upsert_profile(&state.pool, claims.user_id, &update).await?;

    let token = state.tokens.issue(&TokenIdentity {
        user_id: claims.user_id,
        email: claims.email.clone(),
        role: claims.role,
        name: claims.name.clone(),
        doctor_id: claims.doctor_id,
        patient_id: Some(patient_id),
    })?;

    tracing::info!(user_id = claims.user_id, patient_id, "patient record saved");
    Ok((
        StatusCode::CREATED,
        Json(SavePatientRes {
            message: "Patient saved".into(),
            token,
            patient_id,
        }),
    ))
}
