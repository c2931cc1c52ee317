//! Database pool construction and schema bootstrap.
//!
//! The pool is built once at startup and injected into repositories as a
//! parameter; nothing in this crate reaches for a process-global connection.
//! The binaries own the lifecycle: open the pool at start, close it on
//! shutdown.

use sqlx::sqlite::{SqlitePool, SqlitePoolOptions};

use crate::HmsResult;

/// Idempotent DDL applied at startup.
///
/// Uniqueness rules live in the schema rather than in application checks:
/// duplicate account emails, case-insensitive duplicate medicine names, a
/// second prescription for the same appointment and a double-booked doctor
/// slot all fail at the constraint. Cancelled appointments are excluded from
/// the slot index so a freed slot can be rebooked.
const SCHEMA: &[&str] = &[
    "CREATE TABLE IF NOT EXISTS users (
        user_id       INTEGER PRIMARY KEY AUTOINCREMENT,
        name          TEXT NOT NULL,
        email         TEXT NOT NULL UNIQUE,
        password_hash TEXT NOT NULL,
        role          TEXT NOT NULL,
        contact_no    TEXT NOT NULL,
        created_on    TEXT NOT NULL
    )",
    "CREATE TABLE IF NOT EXISTS doctors (
        doctor_id      INTEGER PRIMARY KEY AUTOINCREMENT,
        user_id        INTEGER NOT NULL UNIQUE REFERENCES users (user_id),
        specialization TEXT NOT NULL,
        experience_yrs INTEGER NOT NULL DEFAULT 0,
        qualification  TEXT,
        available_from TEXT,
        available_to   TEXT
    )",
    "CREATE TABLE IF NOT EXISTS patients (
        patient_id         INTEGER PRIMARY KEY AUTOINCREMENT,
        user_id            INTEGER NOT NULL UNIQUE REFERENCES users (user_id),
        gender             TEXT,
        date_of_birth      TEXT,
        blood_group        TEXT,
        address            TEXT,
        city               TEXT,
        state              TEXT,
        zip_code           TEXT,
        emergency_contact  TEXT,
        allergies          TEXT,
        medical_history    TEXT,
        insurance_id       TEXT,
        insurance_provider TEXT
    )",
    "CREATE TABLE IF NOT EXISTS appointments (
        appointment_id INTEGER PRIMARY KEY AUTOINCREMENT,
        patient_id     INTEGER NOT NULL REFERENCES patients (patient_id),
        doctor_id      INTEGER NOT NULL REFERENCES doctors (doctor_id),
        appt_date      TEXT NOT NULL,
        duration_min   INTEGER NOT NULL DEFAULT 30,
        status         TEXT NOT NULL DEFAULT 'SCHEDULED',
        reason         TEXT,
        created_on     TEXT NOT NULL
    )",
    "CREATE UNIQUE INDEX IF NOT EXISTS uq_appointments_doctor_slot
        ON appointments (doctor_id, appt_date) WHERE status <> 'CANCELLED'",
    "CREATE INDEX IF NOT EXISTS idx_appointments_patient
        ON appointments (patient_id)",
    "CREATE TABLE IF NOT EXISTS medicines (
        medicine_id INTEGER PRIMARY KEY AUTOINCREMENT,
        name        TEXT NOT NULL COLLATE NOCASE UNIQUE,
        form        TEXT NOT NULL,
        details     TEXT
    )",
    "CREATE TABLE IF NOT EXISTS prescriptions (
        prescription_id INTEGER PRIMARY KEY AUTOINCREMENT,
        appointment_id  INTEGER NOT NULL UNIQUE REFERENCES appointments (appointment_id),
        prescribed_by   INTEGER NOT NULL REFERENCES doctors (doctor_id),
        notes           TEXT,
        created_on      TEXT NOT NULL
    )",
    "CREATE INDEX IF NOT EXISTS idx_prescriptions_prescriber
        ON prescriptions (prescribed_by)",
    "CREATE TABLE IF NOT EXISTS prescription_medicines (
        prescription_id INTEGER NOT NULL REFERENCES prescriptions (prescription_id),
        medicine_id     INTEGER NOT NULL REFERENCES medicines (medicine_id),
        dose            TEXT NOT NULL,
        duration        TEXT NOT NULL,
        instructions    TEXT,
        PRIMARY KEY (prescription_id, medicine_id)
    )",
];

/// Open a connection pool for the given database URL.
///
/// In-memory URLs get a single connection so every caller sees the same
/// database; file-backed databases get a small pool.
///
/// # Errors
///
/// Returns `HmsError::Database` if the database cannot be opened.
pub async fn connect(database_url: &str) -> HmsResult<SqlitePool> {
    let max_connections = if database_url.contains(":memory:") { 1 } else { 10 };
    let pool = SqlitePoolOptions::new()
        .max_connections(max_connections)
        .connect(database_url)
        .await?;
    Ok(pool)
}

/// Apply the schema. Safe to run on every start.
///
/// # Errors
///
/// Returns `HmsError::Database` if a DDL statement fails.
pub async fn apply_schema(pool: &SqlitePool) -> HmsResult<()> {
    for statement in SCHEMA {
        sqlx::query(statement).execute(pool).await?;
    }
    Ok(())
}

/// True when the error is a unique-constraint violation, which repositories
/// translate into domain conflicts.
pub fn is_unique_violation(err: &sqlx::Error) -> bool {
    matches!(err, sqlx::Error::Database(db) if db.is_unique_violation())
}
