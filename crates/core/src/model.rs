//! Row and projection types returned by repositories.
//!
//! These are plain data carriers: the API layer serialises them directly, so
//! field naming follows the wire convention (camelCase) via serde.

use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;
use utoipa::ToSchema;

use hms_types::{AppointmentStatus, MedicineForm, Role};

/// A user account without its credential hash.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserAccount {
    pub user_id: i64,
    pub name: String,
    pub email: String,
    pub role: Role,
    pub contact_no: String,
    pub created_on: DateTime<Utc>,
}

/// Account plus stored hash, for credential verification only. Never
/// serialised.
#[derive(Debug, Clone)]
pub struct UserCredentials {
    pub account: UserAccount,
    pub password_hash: String,
}

/// A doctor joined with their account fields.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DoctorProfile {
    pub doctor_id: i64,
    pub user_id: i64,
    pub name: String,
    pub email: String,
    pub contact_no: String,
    pub specialization: String,
    pub experience_yrs: i64,
    pub qualification: Option<String>,
    pub available_from: Option<DateTime<Utc>>,
    pub available_to: Option<DateTime<Utc>>,
    pub created_on: DateTime<Utc>,
}

/// A patient joined with their account fields.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PatientProfile {
    pub patient_id: i64,
    pub user_id: i64,
    pub name: String,
    pub email: String,
    pub contact_no: String,
    pub gender: Option<String>,
    pub date_of_birth: Option<NaiveDate>,
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
    pub created_on: DateTime<Utc>,
}

/// A bare appointment row.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Appointment {
    pub appointment_id: i64,
    pub patient_id: i64,
    pub doctor_id: i64,
    pub appt_date: DateTime<Utc>,
    pub duration_min: i64,
    pub status: AppointmentStatus,
    pub reason: Option<String>,
    pub created_on: DateTime<Utc>,
}

/// Appointment joined with the people involved; the shape every listing
/// endpoint returns.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AppointmentSummary {
    pub appointment_id: i64,
    pub patient_id: i64,
    pub doctor_id: i64,
    pub appt_date: DateTime<Utc>,
    pub duration_min: i64,
    pub status: AppointmentStatus,
    pub reason: Option<String>,
    pub created_on: DateTime<Utc>,
    pub patient_name: String,
    pub doctor_name: String,
    pub specialization: String,
}

/// One slot on a doctor's own schedule view.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleEntry {
    pub appointment_id: i64,
    pub appt_date: DateTime<Utc>,
    pub duration_min: i64,
    pub status: AppointmentStatus,
    pub patient_id: i64,
    pub patient_name: String,
}

/// A catalogue medicine.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Medicine {
    pub medicine_id: i64,
    pub name: String,
    pub form: MedicineForm,
    pub details: Option<String>,
}

/// A bare prescription row.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Prescription {
    pub prescription_id: i64,
    pub appointment_id: i64,
    pub prescribed_by: i64,
    pub notes: Option<String>,
    pub created_on: DateTime<Utc>,
}

/// Prescription as listed, with the prescriber's display name and the
/// appointment's patient for scoping.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PrescriptionSummary {
    pub prescription_id: i64,
    pub appointment_id: i64,
    pub prescribed_by: i64,
    pub doctor_name: String,
    pub patient_id: i64,
    pub notes: Option<String>,
    pub created_on: DateTime<Utc>,
}

/// One medicine line on a prescription.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PrescriptionLine {
    pub medicine_id: i64,
    pub name: String,
    pub form: MedicineForm,
    pub dose: String,
    pub duration: String,
    pub instructions: Option<String>,
}

/// Full prescription detail: header plus its medicine lines.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PrescriptionDetail {
    pub prescription_id: i64,
    pub appointment_id: i64,
    pub prescribed_by: i64,
    pub doctor_name: String,
    pub patient_id: i64,
    pub notes: Option<String>,
    pub created_on: DateTime<Utc>,
    pub medicines: Vec<PrescriptionLine>,
}
