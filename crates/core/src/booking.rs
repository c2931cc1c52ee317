//! Appointment booking workflow: slot reservation, the status machine and
//! the actor rules around it.
//!
//! Collisions are exact-timestamp only; two bookings ten minutes apart never
//! conflict regardless of duration. The cancelled state frees the slot, and
//! the partial unique index on `(doctor_id, appt_date)` backs up the
//! in-transaction check.

use chrono::{DateTime, Utc};
use sqlx::SqlitePool;

use hms_types::{AppointmentStatus, Role};

use crate::auth::Claims;
use crate::authz;
use crate::model::Appointment;
use crate::repositories::appointments::{self, AppointmentScope, NewAppointment};
use crate::repositories::doctors;
use crate::{HmsError, HmsResult};

/// Reserve a slot for the calling patient.
///
/// # Errors
///
/// - `Forbidden` unless the caller is a patient.
/// - `NotFound` when the caller has no patient profile yet, or the doctor
///   does not exist.
/// - `Conflict` when the doctor already holds a live appointment at that
///   exact timestamp.
pub async fn book(
    pool: &SqlitePool,
    claims: &Claims,
    doctor_id: i64,
    appt_date: DateTime<Utc>,
    duration_min: i64,
    reason: Option<&str>,
) -> HmsResult<i64> {
    authz::require_role(claims, &[Role::Patient])?;
    let patient_id = authz::resolve_patient_id(pool, claims)
        .await?
        .ok_or_else(|| HmsError::NotFound("Patient profile".to_owned()))?;

    let mut tx = pool.begin().await?;
    if !doctors::exists(&mut *tx, doctor_id).await? {
        return Err(HmsError::NotFound("Doctor".to_owned()));
    }
    if appointments::slot_taken(&mut *tx, doctor_id, appt_date).await? {
        return Err(HmsError::Conflict(
            "Doctor is not available at this time".to_owned(),
        ));
    }
    let appointment_id = appointments::create(
        &mut *tx,
        &NewAppointment {
            patient_id,
            doctor_id,
            appt_date,
            duration_min,
            reason,
        },
    )
    .await?;
    tx.commit().await?;

    tracing::info!(appointment_id, doctor_id, patient_id, "appointment booked");
    Ok(appointment_id)
}

/// Move an appointment to `next`, enforcing both the transition rules and
/// who may perform them: patients may only cancel their own appointments,
/// doctors may complete or cancel their own, admins may make any valid
/// transition.
///
/// # Errors
///
/// `NotFound` for unknown ids, `Forbidden` for the wrong actor, `Conflict`
/// for a transition out of a finished state.
pub async fn set_status(
    pool: &SqlitePool,
    claims: &Claims,
    appointment_id: i64,
    next: AppointmentStatus,
) -> HmsResult<()> {
    let appointment = appointments::find(pool, appointment_id)
        .await?
        .ok_or_else(|| HmsError::NotFound("Appointment".to_owned()))?;

    match claims.role {
        Role::Admin => {}
        Role::Doctor => {
            let doctor_id = authz::resolve_doctor_id(pool, claims).await?;
            if !authz::owns_or_admin(claims.role, doctor_id, appointment.doctor_id) {
                return Err(HmsError::Forbidden);
            }
        }
        Role::Patient => {
            let patient_id = authz::resolve_patient_id(pool, claims).await?;
            if !authz::owns_or_admin(claims.role, patient_id, appointment.patient_id) {
                return Err(HmsError::Forbidden);
            }
            if next != AppointmentStatus::Cancelled {
                return Err(HmsError::Forbidden);
            }
        }
    }

    apply_transition(pool, &appointment, next).await
}

/// Fetch one appointment, visible to the two people on it and admins.
pub async fn fetch(
    pool: &SqlitePool,
    claims: &Claims,
    appointment_id: i64,
) -> HmsResult<Appointment> {
    let appointment = appointments::find(pool, appointment_id)
        .await?
        .ok_or_else(|| HmsError::NotFound("Appointment".to_owned()))?;

    let allowed = match claims.role {
        Role::Admin => true,
        Role::Doctor => {
            let doctor_id = authz::resolve_doctor_id(pool, claims).await?;
            authz::owns_or_admin(claims.role, doctor_id, appointment.doctor_id)
        }
        Role::Patient => {
            let patient_id = authz::resolve_patient_id(pool, claims).await?;
            authz::owns_or_admin(claims.role, patient_id, appointment.patient_id)
        }
    };
    if !allowed {
        return Err(HmsError::Forbidden);
    }
    Ok(appointment)
}

/// Cancel an appointment (the DELETE semantics). Allowed for the owning
/// patient and admins; doctors must use a status update on their own
/// appointments instead. Cancelling twice is a no-op success.
pub async fn cancel(pool: &SqlitePool, claims: &Claims, appointment_id: i64) -> HmsResult<()> {
    let appointment = appointments::find(pool, appointment_id)
        .await?
        .ok_or_else(|| HmsError::NotFound("Appointment".to_owned()))?;

    if claims.role != Role::Admin {
        if claims.role != Role::Patient {
            return Err(HmsError::Forbidden);
        }
        let patient_id = authz::resolve_patient_id(pool, claims).await?;
        if !authz::owns_or_admin(claims.role, patient_id, appointment.patient_id) {
            return Err(HmsError::Forbidden);
        }
    }

    apply_transition(pool, &appointment, AppointmentStatus::Cancelled).await
}

async fn apply_transition(
    pool: &SqlitePool,
    appointment: &Appointment,
    next: AppointmentStatus,
) -> HmsResult<()> {
    if !appointment.status.can_transition_to(next) {
        return Err(HmsError::Conflict(format!(
            "Cannot change a {} appointment",
            appointment.status.as_str()
        )));
    }
    appointments::set_status(pool, appointment.appointment_id, next).await?;
    tracing::info!(
        appointment_id = appointment.appointment_id,
        from = appointment.status.as_str(),
        to = next.as_str(),
        "appointment status changed"
    );
    Ok(())
}

/// The slice of the appointment book the caller may list. `None` means the
/// caller has no doctor/patient row yet and sees an empty list rather than
/// an error.
pub async fn scope_for(pool: &SqlitePool, claims: &Claims) -> HmsResult<Option<AppointmentScope>> {
    Ok(match claims.role {
        Role::Admin => Some(AppointmentScope::All),
        Role::Doctor => authz::resolve_doctor_id(pool, claims)
            .await?
            .map(AppointmentScope::Doctor),
        Role::Patient => authz::resolve_patient_id(pool, claims)
            .await?
            .map(AppointmentScope::Patient),
    })
}
