//! Prescription storage: headers keyed one-to-one to appointments, plus
//! medicine line upserts.

use chrono::Utc;
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};

use crate::db::is_unique_violation;
use crate::model::{Prescription, PrescriptionDetail, PrescriptionLine, PrescriptionSummary};
use crate::repositories::decode_enum;
use crate::{HmsError, HmsResult};

/// Which slice of the prescription book a caller may see.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PrescriptionScope {
    /// Every prescription (admins).
    All,
    /// Prescriptions written by one doctor.
    Prescriber(i64),
    /// Prescriptions whose appointment belongs to one patient.
    Patient(i64),
}

/// One medicine line to write. An existing `(prescription, medicine)` pair is
/// overwritten rather than duplicated.
#[derive(Debug)]
pub struct LineUpsert<'a> {
    pub medicine_id: i64,
    pub dose: &'a str,
    pub duration: &'a str,
    pub instructions: Option<&'a str>,
}

fn map_prescription(row: &SqliteRow) -> HmsResult<Prescription> {
    Ok(Prescription {
        prescription_id: row.try_get("prescription_id")?,
        appointment_id: row.try_get("appointment_id")?,
        prescribed_by: row.try_get("prescribed_by")?,
        notes: row.try_get("notes")?,
        created_on: row.try_get("created_on")?,
    })
}

fn map_summary(row: &SqliteRow) -> HmsResult<PrescriptionSummary> {
    Ok(PrescriptionSummary {
        prescription_id: row.try_get("prescription_id")?,
        appointment_id: row.try_get("appointment_id")?,
        prescribed_by: row.try_get("prescribed_by")?,
        doctor_name: row.try_get("doctor_name")?,
        patient_id: row.try_get("patient_id")?,
        notes: row.try_get("notes")?,
        created_on: row.try_get("created_on")?,
    })
}

/// Insert a prescription header.
///
/// # Errors
///
/// `HmsError::Conflict` when the appointment already has one; callers
/// pre-check and treat the existing row as the result, so this only fires on
/// a lost race.
pub async fn create<'e, E>(
    executor: E,
    appointment_id: i64,
    prescribed_by: i64,
    notes: Option<&str>,
) -> HmsResult<i64>
where
    E: sqlx::Executor<'e, Database = sqlx::Sqlite>,
{
    let result = sqlx::query(
        "INSERT INTO prescriptions (appointment_id, prescribed_by, notes, created_on)
         VALUES (?, ?, ?, ?)",
    )
    .bind(appointment_id)
    .bind(prescribed_by)
    .bind(notes)
    .bind(Utc::now())
    .execute(executor)
    .await
    .map_err(|err| {
        if is_unique_violation(&err) {
            HmsError::Conflict("Prescription already exists".to_owned())
        } else {
            err.into()
        }
    })?;
    Ok(result.last_insert_rowid())
}

pub async fn find<'e, E>(executor: E, prescription_id: i64) -> HmsResult<Option<Prescription>>
where
    E: sqlx::Executor<'e, Database = sqlx::Sqlite>,
{
    let row = sqlx::query(
        "SELECT prescription_id, appointment_id, prescribed_by, notes, created_on
         FROM prescriptions
         WHERE prescription_id = ?",
    )
    .bind(prescription_id)
    .fetch_optional(executor)
    .await?;
    row.as_ref().map(map_prescription).transpose()
}

/// The prescription already written for an appointment, if any.
pub async fn id_for_appointment<'e, E>(
    executor: E,
    appointment_id: i64,
) -> HmsResult<Option<i64>>
where
    E: sqlx::Executor<'e, Database = sqlx::Sqlite>,
{
    let id = sqlx::query_scalar("SELECT prescription_id FROM prescriptions WHERE appointment_id = ?")
        .bind(appointment_id)
        .fetch_optional(executor)
        .await?;
    Ok(id)
}

/// Scoped listing with the prescriber's name, newest first. The optional
/// appointment filter narrows any scope to one appointment.
pub async fn list(
    pool: &SqlitePool,
    scope: PrescriptionScope,
    appointment_id: Option<i64>,
) -> HmsResult<Vec<PrescriptionSummary>> {
    let (prescriber, patient) = match scope {
        PrescriptionScope::All => (None, None),
        PrescriptionScope::Prescriber(id) => (Some(id), None),
        PrescriptionScope::Patient(id) => (None, Some(id)),
    };
    let rows = sqlx::query(
        "SELECT pr.prescription_id, pr.appointment_id, pr.prescribed_by,
                u.name AS doctor_name, a.patient_id, pr.notes, pr.created_on
         FROM prescriptions pr
         JOIN doctors d ON d.doctor_id = pr.prescribed_by
         JOIN users u ON u.user_id = d.user_id
         JOIN appointments a ON a.appointment_id = pr.appointment_id
         WHERE (?1 IS NULL OR pr.prescribed_by = ?1)
           AND (?2 IS NULL OR a.patient_id = ?2)
           AND (?3 IS NULL OR pr.appointment_id = ?3)
         ORDER BY pr.created_on DESC, pr.prescription_id DESC",
    )
    .bind(prescriber)
    .bind(patient)
    .bind(appointment_id)
    .fetch_all(pool)
    .await?;
    rows.iter().map(map_summary).collect()
}

/// Full detail: header plus medicine lines in name order.
pub async fn detail(
    pool: &SqlitePool,
    prescription_id: i64,
) -> HmsResult<Option<PrescriptionDetail>> {
    let Some(header) = sqlx::query(
        "SELECT pr.prescription_id, pr.appointment_id, pr.prescribed_by,
                u.name AS doctor_name, a.patient_id, pr.notes, pr.created_on
         FROM prescriptions pr
         JOIN doctors d ON d.doctor_id = pr.prescribed_by
         JOIN users u ON u.user_id = d.user_id
         JOIN appointments a ON a.appointment_id = pr.appointment_id
         WHERE pr.prescription_id = ?",
    )
    .bind(prescription_id)
    .fetch_optional(pool)
    .await?
    else {
        return Ok(None);
    };
    let header = map_summary(&header)?;

    let rows = sqlx::query(
        "SELECT m.medicine_id, m.name, m.form, pm.dose, pm.duration, pm.instructions
         FROM prescription_medicines pm
         JOIN medicines m ON m.medicine_id = pm.medicine_id
         WHERE pm.prescription_id = ?
         ORDER BY m.name",
    )
    .bind(prescription_id)
    .fetch_all(pool)
    .await?;
    let medicines = rows
        .iter()
        .map(|row| {
            Ok(PrescriptionLine {
                medicine_id: row.try_get("medicine_id")?,
                name: row.try_get("name")?,
                form: decode_enum(row.try_get("form")?)?,
                dose: row.try_get("dose")?,
                duration: row.try_get("duration")?,
                instructions: row.try_get("instructions")?,
            })
        })
        .collect::<HmsResult<Vec<_>>>()?;

    Ok(Some(PrescriptionDetail {
        prescription_id: header.prescription_id,
        appointment_id: header.appointment_id,
        prescribed_by: header.prescribed_by,
        doctor_name: header.doctor_name,
        patient_id: header.patient_id,
        notes: header.notes,
        created_on: header.created_on,
        medicines,
    }))
}

/// Replace the notes column outright; passing `None` clears it. Returns
/// whether a row matched.
pub async fn update_notes<'e, E>(
    executor: E,
    prescription_id: i64,
    notes: Option<&str>,
) -> HmsResult<bool>
where
    E: sqlx::Executor<'e, Database = sqlx::Sqlite>,
{
    let result = sqlx::query("UPDATE prescriptions SET notes = ? WHERE prescription_id = ?")
        .bind(notes)
        .bind(prescription_id)
        .execute(executor)
        .await?;
    Ok(result.rows_affected() > 0)
}

/// Write one medicine line, overwriting dose, duration and instructions when
/// the pair already exists.
pub async fn upsert_line<'e, E>(
    executor: E,
    prescription_id: i64,
    line: &LineUpsert<'_>,
) -> HmsResult<()>
where
    E: sqlx::Executor<'e, Database = sqlx::Sqlite>,
{
    sqlx::query(
        "INSERT INTO prescription_medicines
             (prescription_id, medicine_id, dose, duration, instructions)
         VALUES (?, ?, ?, ?, ?)
         ON CONFLICT (prescription_id, medicine_id) DO UPDATE SET
             dose         = excluded.dose,
             duration     = excluded.duration,
             instructions = excluded.instructions",
    )
    .bind(prescription_id)
    .bind(line.medicine_id)
    .bind(line.dose)
    .bind(line.duration)
    .bind(line.instructions)
    .execute(executor)
    .await?;
    Ok(())
}

/// Drop one medicine line. Returns whether a row matched; removing an absent
/// line is not an error.
pub async fn remove_line<'e, E>(
    executor: E,
    prescription_id: i64,
    medicine_id: i64,
) -> HmsResult<bool>
where
    E: sqlx::Executor<'e, Database = sqlx::Sqlite>,
{
    let result = sqlx::query(
        "DELETE FROM prescription_medicines WHERE prescription_id = ? AND medicine_id = ?",
    )
    .bind(prescription_id)
    .bind(medicine_id)
    .execute(executor)
    .await?;
    Ok(result.rows_affected() > 0)
}
