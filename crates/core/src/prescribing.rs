//! Prescription workflow: one prescription per appointment, medicine lines
//! managed by the prescribing doctor (or an admin).

use sqlx::SqlitePool;

use hms_types::Role;

use crate::auth::Claims;
use crate::authz;
use crate::model::{PrescriptionDetail, PrescriptionSummary};
use crate::repositories::prescriptions::{self, LineUpsert, PrescriptionScope};
use crate::repositories::{appointments, medicines};
use crate::{HmsError, HmsResult};

/// Result of a create call. Asking again for an appointment that already has
/// a prescription hands back the existing id instead of failing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CreateOutcome {
    Created(i64),
    AlreadyExists(i64),
}

/// Write the prescription header for an appointment.
///
/// Any doctor may prescribe against any existing appointment, and the
/// appointment does not need to be completed first; both follow from how the
/// clinic actually runs (cover doctors, walk-out patients).
///
/// # Errors
///
/// `Forbidden` unless the caller is a doctor; `NotFound` when the caller has
/// no doctor row or the appointment does not exist.
pub async fn create(
    pool: &SqlitePool,
    claims: &Claims,
    appointment_id: i64,
    notes: Option<&str>,
) -> HmsResult<CreateOutcome> {
    authz::require_role(claims, &[Role::Doctor])?;
    let doctor_id = authz::resolve_doctor_id(pool, claims)
        .await?
        .ok_or_else(|| HmsError::NotFound("Doctor".to_owned()))?;

    let mut tx = pool.begin().await?;
    if appointments::find(&mut *tx, appointment_id).await?.is_none() {
        return Err(HmsError::NotFound("Appointment".to_owned()));
    }
    if let Some(existing) = prescriptions::id_for_appointment(&mut *tx, appointment_id).await? {
        return Ok(CreateOutcome::AlreadyExists(existing));
    }
    let prescription_id =
        prescriptions::create(&mut *tx, appointment_id, doctor_id, notes).await?;
    tx.commit().await?;

    tracing::info!(prescription_id, appointment_id, doctor_id, "prescription created");
    Ok(CreateOutcome::Created(prescription_id))
}

/// Write a batch of medicine lines in one transaction; existing
/// `(prescription, medicine)` pairs are overwritten. Nothing is kept if any
/// line refers to a medicine that does not exist.
pub async fn add_medicines(
    pool: &SqlitePool,
    claims: &Claims,
    prescription_id: i64,
    lines: &[LineUpsert<'_>],
) -> HmsResult<()> {
    authz::require_role(claims, &[Role::Doctor, Role::Admin])?;
    if lines.is_empty() {
        return Err(HmsError::InvalidInput(
            "Prescription ID and medicines are required".to_owned(),
        ));
    }
    require_prescriber_or_admin(pool, claims, prescription_id).await?;

    let mut tx = pool.begin().await?;
    for line in lines {
        if !medicines::exists(&mut *tx, line.medicine_id).await? {
            return Err(HmsError::NotFound(format!(
                "Medicine with ID {}",
                line.medicine_id
            )));
        }
        prescriptions::upsert_line(&mut *tx, prescription_id, line).await?;
    }
    tx.commit().await?;
    Ok(())
}

/// Remove one medicine line. Removing a line that is not there succeeds, so
/// retries are safe.
pub async fn remove_medicine(
    pool: &SqlitePool,
    claims: &Claims,
    prescription_id: i64,
    medicine_id: i64,
) -> HmsResult<()> {
    authz::require_role(claims, &[Role::Doctor, Role::Admin])?;
    require_prescriber_or_admin(pool, claims, prescription_id).await?;
    prescriptions::remove_line(pool, prescription_id, medicine_id).await?;
    Ok(())
}

/// Replace the free-text notes; only the prescribing doctor or an admin.
pub async fn update_notes(
    pool: &SqlitePool,
    claims: &Claims,
    prescription_id: i64,
    notes: Option<&str>,
) -> HmsResult<()> {
    authz::require_role(claims, &[Role::Doctor, Role::Admin])?;
    require_prescriber_or_admin(pool, claims, prescription_id).await?;
    prescriptions::update_notes(pool, prescription_id, notes).await?;
    Ok(())
}

/// Role-scoped listing; callers without a doctor/patient row see an empty
/// list. Optional filter narrows to one appointment.
pub async fn list(
    pool: &SqlitePool,
    claims: &Claims,
    appointment_id: Option<i64>,
) -> HmsResult<Vec<PrescriptionSummary>> {
    let scope = match claims.role {
        Role::Admin => Some(PrescriptionScope::All),
        Role::Doctor => authz::resolve_doctor_id(pool, claims)
            .await?
            .map(PrescriptionScope::Prescriber),
        Role::Patient => authz::resolve_patient_id(pool, claims)
            .await?
            .map(PrescriptionScope::Patient),
    };
    match scope {
        Some(scope) => prescriptions::list(pool, scope, appointment_id).await,
        None => Ok(Vec::new()),
    }
}

/// Full detail with medicine lines, visible to the prescriber, the
/// appointment's patient and admins.
pub async fn detail(
    pool: &SqlitePool,
    claims: &Claims,
    prescription_id: i64,
) -> HmsResult<PrescriptionDetail> {
    let detail = prescriptions::detail(pool, prescription_id)
        .await?
        .ok_or_else(|| HmsError::NotFound("Prescription".to_owned()))?;

    let allowed = match claims.role {
        Role::Admin => true,
        Role::Doctor => {
            let doctor_id = authz::resolve_doctor_id(pool, claims).await?;
            authz::owns_or_admin(claims.role, doctor_id, detail.prescribed_by)
        }
        Role::Patient => {
            let patient_id = authz::resolve_patient_id(pool, claims).await?;
            authz::owns_or_admin(claims.role, patient_id, detail.patient_id)
        }
    };
    if !allowed {
        return Err(HmsError::Forbidden);
    }
    Ok(detail)
}

async fn require_prescriber_or_admin(
    pool: &SqlitePool,
    claims: &Claims,
    prescription_id: i64,
) -> HmsResult<()> {
    let prescription = prescriptions::find(pool, prescription_id)
        .await?
        .ok_or_else(|| HmsError::NotFound("Prescription".to_owned()))?;
    if claims.role == Role::Doctor {
        let doctor_id = authz::resolve_doctor_id(pool, claims).await?;
        if !authz::owns_or_admin(claims.role, doctor_id, prescription.prescribed_by) {
            return Err(HmsError::Forbidden);
        }
    }
    Ok(())
}
