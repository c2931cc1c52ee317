//! Patient storage: profiles joined with accounts, profile completion.

use chrono::NaiveDate;
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};

use crate::model::PatientProfile;
use crate::repositories::users::{self, NewUser};
use crate::HmsResult;

/// Profile fields a patient fills in after registering. All optional: the
/// profile endpoint accepts whatever subset the caller provides and the
/// update helpers leave `None` fields untouched.
#[derive(Debug, Default)]
pub struct PatientUpdate<'a> {
    pub gender: Option<&'a str>,
    pub date_of_birth: Option<NaiveDate>,
    pub blood_group: Option<&'a str>,
    pub address: Option<&'a str>,
    pub city: Option<&'a str>,
    pub state: Option<&'a str>,
    pub zip_code: Option<&'a str>,
    pub emergency_contact: Option<&'a str>,
    pub allergies: Option<&'a str>,
    pub medical_history: Option<&'a str>,
    pub insurance_id: Option<&'a str>,
    pub insurance_provider: Option<&'a str>,
}

impl PatientUpdate<'_> {
    /// True when nothing is set.
    pub fn is_empty(&self) -> bool {
        self.gender.is_none()
            && self.date_of_birth.is_none()
            && self.blood_group.is_none()
            && self.address.is_none()
            && self.city.is_none()
            && self.state.is_none()
            && self.zip_code.is_none()
            && self.emergency_contact.is_none()
            && self.allergies.is_none()
            && self.medical_history.is_none()
            && self.insurance_id.is_none()
            && self.insurance_provider.is_none()
    }
}

fn map_profile(row: &SqliteRow) -> HmsResult<PatientProfile> {
    Ok(PatientProfile {
        patient_id: row.try_get("patient_id")?,
        user_id: row.try_get("user_id")?,
        name: row.try_get("name")?,
        email: row.try_get("email")?,
        contact_no: row.try_get("contact_no")?,
        gender: row.try_get("gender")?,
        date_of_birth: row.try_get("date_of_birth")?,
        blood_group: row.try_get("blood_group")?,
        address: row.try_get("address")?,
        city: row.try_get("city")?,
        state: row.try_get("state")?,
        zip_code: row.try_get("zip_code")?,
        emergency_contact: row.try_get("emergency_contact")?,
        allergies: row.try_get("allergies")?,
        medical_history: row.try_get("medical_history")?,
        insurance_id: row.try_get("insurance_id")?,
        insurance_provider: row.try_get("insurance_provider")?,
        created_on: row.try_get("created_on")?,
    })
}

/// Create or update the patient row for an account in one statement,
/// returning the patient id. On update, only the provided fields change.
pub async fn upsert_profile(
    pool: &SqlitePool,
    user_id: i64,
    profile: &PatientUpdate<'_>,
) -> HmsResult<i64> {
    let patient_id = sqlx::query_scalar(
        "INSERT INTO patients
             (user_id, gender, date_of_birth, blood_group, address, city, state, zip_code,
              emergency_contact, allergies, medical_history, insurance_id, insurance_provider)
         VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
         ON CONFLICT (user_id) DO UPDATE SET
             gender             = COALESCE(excluded.gender, patients.gender),
             date_of_birth      = COALESCE(excluded.date_of_birth, patients.date_of_birth),
             blood_group        = COALESCE(excluded.blood_group, patients.blood_group),
             address            = COALESCE(excluded.address, patients.address),
             city               = COALESCE(excluded.city, patients.city),
             state              = COALESCE(excluded.state, patients.state),
             zip_code           = COALESCE(excluded.zip_code, patients.zip_code),
             emergency_contact  = COALESCE(excluded.emergency_contact, patients.emergency_contact),
             allergies          = COALESCE(excluded.allergies, patients.allergies),
             medical_history    = COALESCE(excluded.medical_history, patients.medical_history),
             insurance_id       = COALESCE(excluded.insurance_id, patients.insurance_id),
             insurance_provider = COALESCE(excluded.insurance_provider, patients.insurance_provider)
         RETURNING patient_id",
    )
    .bind(user_id)
    .bind(profile.gender)
    .bind(profile.date_of_birth)
    .bind(profile.blood_group)
    .bind(profile.address)
    .bind(profile.city)
    .bind(profile.state)
    .bind(profile.zip_code)
    .bind(profile.emergency_contact)
    .bind(profile.allergies)
    .bind(profile.medical_history)
    .bind(profile.insurance_id)
    .bind(profile.insurance_provider)
    .fetch_one(pool)
    .await?;
    Ok(patient_id)
}

/// Create the account and the patient row in one transaction.
///
/// # Errors
///
/// Propagates the account conflict for duplicate emails; either both rows
/// exist afterwards or neither does.
pub async fn create_with_account(
    pool: &SqlitePool,
    user: &NewUser<'_>,
    profile: &PatientUpdate<'_>,
) -> HmsResult<(i64, i64)> {
    let mut tx = pool.begin().await?;
    let user_id = users::create(&mut *tx, user).await?;
    let result = sqlx::query(
        "INSERT INTO patients
             (user_id, gender, date_of_birth, blood_group, address, city, state, zip_code,
              emergency_contact, allergies, medical_history, insurance_id, insurance_provider)
         VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
    )
    .bind(user_id)
    .bind(profile.gender)
    .bind(profile.date_of_birth)
    .bind(profile.blood_group)
    .bind(profile.address)
    .bind(profile.city)
    .bind(profile.state)
    .bind(profile.zip_code)
    .bind(profile.emergency_contact)
    .bind(profile.allergies)
    .bind(profile.medical_history)
    .bind(profile.insurance_id)
    .bind(profile.insurance_provider)
    .execute(&mut *tx)
    .await?;
    let patient_id = result.last_insert_rowid();
    tx.commit().await?;
    Ok((user_id, patient_id))
}

/// Admin listing, oldest first.
pub async fn list(pool: &SqlitePool) -> HmsResult<Vec<PatientProfile>> {
    let rows = sqlx::query(
        "SELECT p.patient_id, p.user_id, u.name, u.email, u.contact_no,
                p.gender, p.date_of_birth, p.blood_group, p.address, p.city, p.state,
                p.zip_code, p.emergency_contact, p.allergies, p.medical_history,
                p.insurance_id, p.insurance_provider, u.created_on
         FROM patients p
         JOIN users u ON u.user_id = p.user_id
         ORDER BY p.patient_id",
    )
    .fetch_all(pool)
    .await?;
    rows.iter().map(map_profile).collect()
}

/// Fetch a profile by patient id.
pub async fn find(pool: &SqlitePool, patient_id: i64) -> HmsResult<Option<PatientProfile>> {
    let row = sqlx::query(
        "SELECT p.patient_id, p.user_id, u.name, u.email, u.contact_no,
                p.gender, p.date_of_birth, p.blood_group, p.address, p.city, p.state,
                p.zip_code, p.emergency_contact, p.allergies, p.medical_history,
                p.insurance_id, p.insurance_provider, u.created_on
         FROM patients p
         JOIN users u ON u.user_id = p.user_id
         WHERE p.patient_id = ?",
    )
    .bind(patient_id)
    .fetch_optional(pool)
    .await?;
    row.as_ref().map(map_profile).transpose()
}

/// Fetch a profile by owning account.
pub async fn find_by_user(pool: &SqlitePool, user_id: i64) -> HmsResult<Option<PatientProfile>> {
    let row = sqlx::query(
        "SELECT p.patient_id, p.user_id, u.name, u.email, u.contact_no,
                p.gender, p.date_of_birth, p.blood_group, p.address, p.city, p.state,
                p.zip_code, p.emergency_contact, p.allergies, p.medical_history,
                p.insurance_id, p.insurance_provider, u.created_on
         FROM patients p
         JOIN users u ON u.user_id = p.user_id
         WHERE p.user_id = ?",
    )
    .bind(user_id)
    .fetch_optional(pool)
    .await?;
    row.as_ref().map(map_profile).transpose()
}

/// The patient id linked to an account, if any.
pub async fn id_for_user<'e, E>(executor: E, user_id: i64) -> HmsResult<Option<i64>>
where
    E: sqlx::Executor<'e, Database = sqlx::Sqlite>,
{
    let id = sqlx::query_scalar("SELECT patient_id FROM patients WHERE user_id = ?")
        .bind(user_id)
        .fetch_optional(executor)
        .await?;
    Ok(id)
}

/// Partial update by patient id; absent fields keep their stored value.
/// Returns whether a row matched.
pub async fn update<'e, E>(
    executor: E,
    patient_id: i64,
    update: &PatientUpdate<'_>,
) -> HmsResult<bool>
where
    E: sqlx::Executor<'e, Database = sqlx::Sqlite>,
{
    let result = sqlx::query(
        "UPDATE patients SET
             gender             = COALESCE(?, gender),
             date_of_birth      = COALESCE(?, date_of_birth),
             blood_group        = COALESCE(?, blood_group),
             address            = COALESCE(?, address),
             city               = COALESCE(?, city),
             state              = COALESCE(?, state),
             zip_code           = COALESCE(?, zip_code),
             emergency_contact  = COALESCE(?, emergency_contact),
             allergies          = COALESCE(?, allergies),
             medical_history    = COALESCE(?, medical_history),
             insurance_id       = COALESCE(?, insurance_id),
             insurance_provider = COALESCE(?, insurance_provider)
         WHERE patient_id = ?",
    )
    .bind(update.gender)
    .bind(update.date_of_birth)
    .bind(update.blood_group)
    .bind(update.address)
    .bind(update.city)
    .bind(update.state)
    .bind(update.zip_code)
    .bind(update.emergency_contact)
    .bind(update.allergies)
    .bind(update.medical_history)
    .bind(update.insurance_id)
    .bind(update.insurance_provider)
    .bind(patient_id)
    .execute(executor)
    .await?;
    Ok(result.rows_affected() > 0)
}
