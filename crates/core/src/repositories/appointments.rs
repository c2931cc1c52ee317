//! Appointment storage: slot inserts, role-scoped listings, status updates.

use chrono::{DateTime, Utc};
use hms_types::AppointmentStatus;
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};

use crate::db::is_unique_violation;
use crate::model::{Appointment, AppointmentSummary, ScheduleEntry};
use crate::repositories::decode_enum;
use crate::{HmsError, HmsResult};

/// Which slice of the appointment book a caller may see.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppointmentScope {
    /// Every appointment (admins).
    All,
    /// Appointments held by one doctor.
    Doctor(i64),
    /// Appointments belonging to one patient.
    Patient(i64),
}

#[derive(Debug)]
pub struct NewAppointment<'a> {
    pub patient_id: i64,
    pub doctor_id: i64,
    pub appt_date: DateTime<Utc>,
    pub duration_min: i64,
    pub reason: Option<&'a str>,
}

fn map_appointment(row: &SqliteRow) -> HmsResult<Appointment> {
    Ok(Appointment {
        appointment_id: row.try_get("appointment_id")?,
        patient_id: row.try_get("patient_id")?,
        doctor_id: row.try_get("doctor_id")?,
        appt_date: row.try_get("appt_date")?,
        duration_min: row.try_get("duration_min")?,
        status: decode_enum(row.try_get("status")?)?,
        reason: row.try_get("reason")?,
        created_on: row.try_get("created_on")?,
    })
}

fn map_summary(row: &SqliteRow) -> HmsResult<AppointmentSummary> {
    Ok(AppointmentSummary {
        appointment_id: row.try_get("appointment_id")?,
        patient_id: row.try_get("patient_id")?,
        doctor_id: row.try_get("doctor_id")?,
        appt_date: row.try_get("appt_date")?,
        duration_min: row.try_get("duration_min")?,
        status: decode_enum(row.try_get("status")?)?,
        reason: row.try_get("reason")?,
        created_on: row.try_get("created_on")?,
        patient_name: row.try_get("patient_name")?,
        doctor_name: row.try_get("doctor_name")?,
        specialization: row.try_get("specialization")?,
    })
}

/// Insert a SCHEDULED appointment.
///
/// # Errors
///
/// `HmsError::Conflict` when the doctor already holds a live appointment at
/// the exact timestamp (the partial unique index is the last line of defence
/// behind [`slot_taken`]).
pub async fn create<'e, E>(executor: E, appointment: &NewAppointment<'_>) -> HmsResult<i64>
where
    E: sqlx::Executor<'e, Database = sqlx::Sqlite>,
{
    let result = sqlx::query(
        "INSERT INTO appointments
             (patient_id, doctor_id, appt_date, duration_min, status, reason, created_on)
         VALUES (?, ?, ?, ?, 'SCHEDULED', ?, ?)",
    )
    .bind(appointment.patient_id)
    .bind(appointment.doctor_id)
    .bind(appointment.appt_date)
    .bind(appointment.duration_min)
    .bind(appointment.reason)
    .bind(Utc::now())
    .execute(executor)
    .await
    .map_err(|err| {
        if is_unique_violation(&err) {
            HmsError::Conflict("Doctor is not available at this time".to_owned())
        } else {
            err.into()
        }
    })?;
    Ok(result.last_insert_rowid())
}

/// True when the doctor has a non-cancelled appointment at exactly this
/// timestamp.
pub async fn slot_taken<'e, E>(
    executor: E,
    doctor_id: i64,
    appt_date: DateTime<Utc>,
) -> HmsResult<bool>
where
    E: sqlx::Executor<'e, Database = sqlx::Sqlite>,
{
    let taken: i64 = sqlx::query_scalar(
        "SELECT EXISTS (
             SELECT 1 FROM appointments
             WHERE doctor_id = ? AND appt_date = ? AND status <> 'CANCELLED'
         )",
    )
    .bind(doctor_id)
    .bind(appt_date)
    .fetch_one(executor)
    .await?;
    Ok(taken != 0)
}

pub async fn find<'e, E>(executor: E, appointment_id: i64) -> HmsResult<Option<Appointment>>
where
    E: sqlx::Executor<'e, Database = sqlx::Sqlite>,
{
    let row = sqlx::query(
        "SELECT appointment_id, patient_id, doctor_id, appt_date, duration_min,
                status, reason, created_on
         FROM appointments
         WHERE appointment_id = ?",
    )
    .bind(appointment_id)
    .fetch_optional(executor)
    .await?;
    row.as_ref().map(map_appointment).transpose()
}

/// Scoped listing with participant names, newest slot first.
pub async fn list(pool: &SqlitePool, scope: AppointmentScope) -> HmsResult<Vec<AppointmentSummary>> {
    let rows = match scope {
        AppointmentScope::All => {
            sqlx::query(
                "SELECT a.appointment_id, a.patient_id, a.doctor_id, a.appt_date,
                        a.duration_min, a.status, a.reason, a.created_on,
                        up.name AS patient_name, ud.name AS doctor_name, d.specialization
                 FROM appointments a
                 JOIN patients p ON p.patient_id = a.patient_id
                 JOIN users up ON up.user_id = p.user_id
                 JOIN doctors d ON d.doctor_id = a.doctor_id
                 JOIN users ud ON ud.user_id = d.user_id
                 ORDER BY a.appt_date DESC",
            )
            .fetch_all(pool)
            .await?
        }
        AppointmentScope::Doctor(doctor_id) => {
            sqlx::query(
                "SELECT a.appointment_id, a.patient_id, a.doctor_id, a.appt_date,
                        a.duration_min, a.status, a.reason, a.created_on,
                        up.name AS patient_name, ud.name AS doctor_name, d.specialization
                 FROM appointments a
                 JOIN patients p ON p.patient_id = a.patient_id
                 JOIN users up ON up.user_id = p.user_id
                 JOIN doctors d ON d.doctor_id = a.doctor_id
                 JOIN users ud ON ud.user_id = d.user_id
                 WHERE a.doctor_id = ?
                 ORDER BY a.appt_date DESC",
            )
            .bind(doctor_id)
            .fetch_all(pool)
            .await?
        }
        AppointmentScope::Patient(patient_id) => {
            sqlx::query(
                "SELECT a.appointment_id, a.patient_id, a.doctor_id, a.appt_date,
                        a.duration_min, a.status, a.reason, a.created_on,
                        up.name AS patient_name, ud.name AS doctor_name, d.specialization
                 FROM appointments a
                 JOIN patients p ON p.patient_id = a.patient_id
                 JOIN users up ON up.user_id = p.user_id
                 JOIN doctors d ON d.doctor_id = a.doctor_id
                 JOIN users ud ON ud.user_id = d.user_id
                 WHERE a.patient_id = ?
                 ORDER BY a.appt_date DESC",
            )
            .bind(patient_id)
            .fetch_all(pool)
            .await?
        }
    };
    rows.iter().map(map_summary).collect()
}

/// Overwrite the status column. Transition and actor rules live in the
/// booking workflow; this only touches storage. Returns whether a row
/// matched.
pub async fn set_status<'e, E>(
    executor: E,
    appointment_id: i64,
    status: AppointmentStatus,
) -> HmsResult<bool>
where
    E: sqlx::Executor<'e, Database = sqlx::Sqlite>,
{
    let result = sqlx::query("UPDATE appointments SET status = ? WHERE appointment_id = ?")
        .bind(status.as_str())
        .bind(appointment_id)
        .execute(executor)
        .await?;
    Ok(result.rows_affected() > 0)
}

/// A doctor's own book in slot order, with patient names.
pub async fn schedule_for_doctor(
    pool: &SqlitePool,
    doctor_id: i64,
) -> HmsResult<Vec<ScheduleEntry>> {
    let rows = sqlx::query(
        "SELECT a.appointment_id, a.appt_date, a.duration_min, a.status,
                p.patient_id, u.name AS patient_name
         FROM appointments a
         JOIN patients p ON p.patient_id = a.patient_id
         JOIN users u ON u.user_id = p.user_id
         WHERE a.doctor_id = ?
         ORDER BY a.appt_date",
    )
    .bind(doctor_id)
    .fetch_all(pool)
    .await?;
    rows.iter()
        .map(|row| {
            Ok(ScheduleEntry {
                appointment_id: row.try_get("appointment_id")?,
                appt_date: row.try_get("appt_date")?,
                duration_min: row.try_get("duration_min")?,
                status: decode_enum(row.try_get("status")?)?,
                patient_id: row.try_get("patient_id")?,
                patient_name: row.try_get("patient_name")?,
            })
        })
        .collect()
}
