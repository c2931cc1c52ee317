//! Role and ownership checks shared by every protected operation.
//!
//! Tokens issued before a doctor or patient row existed do not carry the
//! linked id, so the resolvers here prefer the claim and fall back to a
//! fresh lookup by account. Handlers then compare the resolved id against
//! the resource's owner; admins bypass ownership entirely.

use sqlx::SqlitePool;

use hms_types::Role;

use crate::auth::Claims;
use crate::repositories::{doctors, patients};
use crate::{HmsError, HmsResult};

/// True when the principal holds one of the listed roles.
pub fn has_role(claims: &Claims, roles: &[Role]) -> bool {
    roles.contains(&claims.role)
}

/// # Errors
///
/// `HmsError::Forbidden` when the principal holds none of the listed roles.
pub fn require_role(claims: &Claims, roles: &[Role]) -> HmsResult<()> {
    if has_role(claims, roles) {
        Ok(())
    } else {
        Err(HmsError::Forbidden)
    }
}

/// Ownership predicate: admins always pass, everyone else must have a linked
/// id matching the resource's owner.
pub fn owns_or_admin(role: Role, linked_id: Option<i64>, resource_id: i64) -> bool {
    role == Role::Admin || linked_id == Some(resource_id)
}

/// The patient id the principal acts as, from the token when present or the
/// database otherwise. `None` means no patient row exists yet.
pub async fn resolve_patient_id(pool: &SqlitePool, claims: &Claims) -> HmsResult<Option<i64>> {
    if claims.patient_id.is_some() {
        return Ok(claims.patient_id);
    }
    patients::id_for_user(pool, claims.user_id).await
}

/// The doctor id the principal acts as; see [`resolve_patient_id`].
pub async fn resolve_doctor_id(pool: &SqlitePool, claims: &Claims) -> HmsResult<Option<i64>> {
    if claims.doctor_id.is_some() {
        return Ok(claims.doctor_id);
    }
    doctors::id_for_user(pool, claims.user_id).await
}
