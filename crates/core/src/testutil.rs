//! Shared fixtures for the unit tests: an in-memory database plus seeded
//! accounts, rows and claims.

use chrono::{DateTime, Utc};
use sqlx::SqlitePool;

use hms_types::Role;

use crate::auth::Claims;
use crate::db;
use crate::repositories::appointments::{self, NewAppointment};
use crate::repositories::doctors::{self, NewDoctor};
use crate::repositories::patients::{self, PatientUpdate};
use crate::repositories::users::NewUser;

// Shaped like a bcrypt hash; nothing in these tests verifies it.
const FAKE_HASH: &str = "$2b$04$N9qo8uLOickgx2ZMRZoMyeIjZAgcfl7p92ldGxad68LJZdL17lhWy";

pub(crate) async fn test_pool() -> SqlitePool {
    let pool = db::connect("sqlite::memory:")
        .await
        .expect("in-memory pool should open");
    db::apply_schema(&pool)
        .await
        .expect("schema should apply");
    pool
}

pub(crate) fn ts(value: &str) -> DateTime<Utc> {
    value.parse().expect("timestamp literal should parse")
}

pub(crate) fn new_doctor_user(email: &str) -> NewUser<'_> {
    NewUser {
        name: "Greg House",
        email,
        password_hash: FAKE_HASH,
        role: Role::Doctor,
        contact_no: "0123456789",
    }
}

pub(crate) fn new_patient_user(email: &str) -> NewUser<'_> {
    NewUser {
        name: "Alice Moran",
        email,
        password_hash: FAKE_HASH,
        role: Role::Patient,
        contact_no: "0123456789",
    }
}

/// Account + doctor row; returns `(user_id, doctor_id)`.
pub(crate) async fn seed_doctor(pool: &SqlitePool, email: &str) -> (i64, i64) {
    doctors::create_with_account(
        pool,
        &new_doctor_user(email),
        &NewDoctor {
            specialization: "General Medicine",
            experience_yrs: 5,
            ..Default::default()
        },
    )
    .await
    .expect("doctor seed should succeed")
}

/// Account + patient row; returns `(user_id, patient_id)`.
pub(crate) async fn seed_patient(pool: &SqlitePool, email: &str) -> (i64, i64) {
    patients::create_with_account(pool, &new_patient_user(email), &PatientUpdate::default())
        .await
        .expect("patient seed should succeed")
}

pub(crate) async fn seed_appointment(
    pool: &SqlitePool,
    patient_id: i64,
    doctor_id: i64,
    appt_date: DateTime<Utc>,
) -> i64 {
    appointments::create(
        pool,
        &NewAppointment {
            patient_id,
            doctor_id,
            appt_date,
            duration_min: 30,
            reason: None,
        },
    )
    .await
    .expect("appointment seed should succeed")
}

fn claims(user_id: i64, role: Role, doctor_id: Option<i64>, patient_id: Option<i64>) -> Claims {
    let now = Utc::now().timestamp();
    Claims {
        user_id,
        email: format!("user{user_id}@example.com"),
        role,
        name: None,
        doctor_id,
        patient_id,
        iat: now,
        exp: now + 3_600,
    }
}

pub(crate) fn admin_claims(user_id: i64) -> Claims {
    claims(user_id, Role::Admin, None, None)
}

pub(crate) fn doctor_claims(user_id: i64, doctor_id: Option<i64>) -> Claims {
    claims(user_id, Role::Doctor, doctor_id, None)
}

pub(crate) fn patient_claims(user_id: i64, patient_id: Option<i64>) -> Claims {
    claims(user_id, Role::Patient, None, patient_id)
}
