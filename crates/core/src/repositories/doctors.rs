//! Doctor storage: profiles joined with accounts, availability, creation.

use chrono::{DateTime, Utc};
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};

use crate::model::DoctorProfile;
use crate::repositories::users::{self, NewUser};
use crate::HmsResult;

/// Doctor-specific fields for creation.
#[derive(Debug, Default)]
pub struct NewDoctor<'a> {
    pub specialization: &'a str,
    pub experience_yrs: i64,
    pub qualification: Option<&'a str>,
    pub available_from: Option<DateTime<Utc>>,
    pub available_to: Option<DateTime<Utc>>,
}

/// Partial update; `None` fields keep their stored value.
#[derive(Debug, Default)]
pub struct DoctorUpdate<'a> {
    pub specialization: Option<&'a str>,
    pub experience_yrs: Option<i64>,
    pub qualification: Option<&'a str>,
    pub available_from: Option<DateTime<Utc>>,
    pub available_to: Option<DateTime<Utc>>,
}

impl DoctorUpdate<'_> {
    /// True when nothing is set; callers reject the request before touching
    /// the database.
    pub fn is_empty(&self) -> bool {
        self.specialization.is_none()
            && self.experience_yrs.is_none()
            && self.qualification.is_none()
            && self.available_from.is_none()
            && self.available_to.is_none()
    }
}

fn map_profile(row: &SqliteRow) -> HmsResult<DoctorProfile> {
    Ok(DoctorProfile {
        doctor_id: row.try_get("doctor_id")?,
        user_id: row.try_get("user_id")?,
        name: row.try_get("name")?,
        email: row.try_get("email")?,
        contact_no: row.try_get("contact_no")?,
        specialization: row.try_get("specialization")?,
        experience_yrs: row.try_get("experience_yrs")?,
        qualification: row.try_get("qualification")?,
        available_from: row.try_get("available_from")?,
        available_to: row.try_get("available_to")?,
        created_on: row.try_get("created_on")?,
    })
}

/// Create the account and the doctor row in one transaction.
///
/// # Errors
///
/// Propagates the account conflict for duplicate emails; either both rows
/// exist afterwards or neither does.
pub async fn create_with_account(
    pool: &SqlitePool,
    user: &NewUser<'_>,
    doctor: &NewDoctor<'_>,
) -> HmsResult<(i64, i64)> {
    let mut tx = pool.begin().await?;
    let user_id = users::create(&mut *tx, user).await?;
    let result = sqlx::query(
        "INSERT INTO doctors
             (user_id, specialization, experience_yrs, qualification, available_from, available_to)
         VALUES (?, ?, ?, ?, ?, ?)",
    )
    .bind(user_id)
    .bind(doctor.specialization)
    .bind(doctor.experience_yrs)
    .bind(doctor.qualification)
    .bind(doctor.available_from)
    .bind(doctor.available_to)
    .execute(&mut *tx)
    .await?;
    let doctor_id = result.last_insert_rowid();
    tx.commit().await?;
    Ok((user_id, doctor_id))
}

/// Directory listing, oldest first.
pub async fn list(pool: &SqlitePool) -> HmsResult<Vec<DoctorProfile>> {
    let rows = sqlx::query(
        "SELECT d.doctor_id, d.user_id, u.name, u.email, u.contact_no,
                d.specialization, d.experience_yrs, d.qualification,
                d.available_from, d.available_to, u.created_on
         FROM doctors d
         JOIN users u ON u.user_id = d.user_id
         ORDER BY d.doctor_id",
    )
    .fetch_all(pool)
    .await?;
    rows.iter().map(map_profile).collect()
}

/// Fetch a profile by doctor id.
pub async fn find(pool: &SqlitePool, doctor_id: i64) -> HmsResult<Option<DoctorProfile>> {
    let row = sqlx::query(
        "SELECT d.doctor_id, d.user_id, u.name, u.email, u.contact_no,
                d.specialization, d.experience_yrs, d.qualification,
                d.available_from, d.available_to, u.created_on
         FROM doctors d
         JOIN users u ON u.user_id = d.user_id
         WHERE d.doctor_id = ?",
    )
    .bind(doctor_id)
    .fetch_optional(pool)
    .await?;
    row.as_ref().map(map_profile).transpose()
}

/// Fetch a profile by owning account.
pub async fn find_by_user(pool: &SqlitePool, user_id: i64) -> HmsResult<Option<DoctorProfile>> {
    let row = sqlx::query(
        "SELECT d.doctor_id, d.user_id, u.name, u.email, u.contact_no,
                d.specialization, d.experience_yrs, d.qualification,
                d.available_from, d.available_to, u.created_on
         FROM doctors d
         JOIN users u ON u.user_id = d.user_id
         WHERE d.user_id = ?",
    )
    .bind(user_id)
    .fetch_optional(pool)
    .await?;
    row.as_ref().map(map_profile).transpose()
}

/// The doctor id linked to an account, if any.
pub async fn id_for_user<'e, E>(executor: E, user_id: i64) -> HmsResult<Option<i64>>
where
    E: sqlx::Executor<'e, Database = sqlx::Sqlite>,
{
    let id = sqlx::query_scalar("SELECT doctor_id FROM doctors WHERE user_id = ?")
        .bind(user_id)
        .fetch_optional(executor)
        .await?;
    Ok(id)
}

/// Existence check used before taking a booking.
pub async fn exists<'e, E>(executor: E, doctor_id: i64) -> HmsResult<bool>
where
    E: sqlx::Executor<'e, Database = sqlx::Sqlite>,
{
    let found: i64 = sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM doctors WHERE doctor_id = ?)")
        .bind(doctor_id)
        .fetch_one(executor)
        .await?;
    Ok(found != 0)
}

/// Partial update of doctor fields; absent fields keep their stored value.
/// Returns whether a row matched.
pub async fn update<'e, E>(
    executor: E,
    doctor_id: i64,
    update: &DoctorUpdate<'_>,
) -> HmsResult<bool>
where
    E: sqlx::Executor<'e, Database = sqlx::Sqlite>,
{
    let result = sqlx::query(
        "UPDATE doctors
         SET specialization = COALESCE(?, specialization),
             experience_yrs = COALESCE(?, experience_yrs),
             qualification  = COALESCE(?, qualification),
             available_from = COALESCE(?, available_from),
             available_to   = COALESCE(?, available_to)
         WHERE doctor_id = ?",
    )
    .bind(update.specialization)
    .bind(update.experience_yrs)
    .bind(update.qualification)
    .bind(update.available_from)
    .bind(update.available_to)
    .bind(doctor_id)
    .execute(executor)
    .await?;
    Ok(result.rows_affected() > 0)
}

/// Self-service update: account fields and doctor fields together, keyed by
/// the owning account. Returns `false` when the account has no doctor row;
/// nothing is written in that case.
pub async fn update_with_account(
    pool: &SqlitePool,
    user_id: i64,
    name: Option<&str>,
    contact_no: Option<&str>,
    fields: &DoctorUpdate<'_>,
) -> HmsResult<bool> {
    let Some(doctor_id) = id_for_user(pool, user_id).await? else {
        return Ok(false);
    };
    let mut tx = pool.begin().await?;
    users::update_profile(&mut *tx, user_id, name, contact_no).await?;
    update(&mut *tx, doctor_id, fields).await?;
    tx.commit().await?;
    Ok(true)
}

/// Replace the availability window. Returns whether a row matched.
pub async fn set_availability<'e, E>(
    executor: E,
    doctor_id: i64,
    available_from: DateTime<Utc>,
    available_to: DateTime<Utc>,
) -> HmsResult<bool>
where
    E: sqlx::Executor<'e, Database = sqlx::Sqlite>,
{
    let result =
        sqlx::query("UPDATE doctors SET available_from = ?, available_to = ? WHERE doctor_id = ?")
            .bind(available_from)
            .bind(available_to)
            .bind(doctor_id)
            .execute(executor)
            .await?;
    Ok(result.rows_affected() > 0)
}
