//! User account storage.

use chrono::Utc;
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};

use hms_types::Role;

use crate::model::{UserAccount, UserCredentials};
use crate::repositories::decode_enum;
use crate::{db, HmsError, HmsResult};

/// Fields required to create an account. The password must already be
/// hashed.
#[derive(Debug)]
pub struct NewUser<'a> {
    pub name: &'a str,
    pub email: &'a str,
    pub password_hash: &'a str,
    pub role: Role,
    pub contact_no: &'a str,
}

fn map_account(row: &SqliteRow) -> HmsResult<UserAccount> {
    Ok(UserAccount {
        user_id: row.try_get("user_id")?,
        name: row.try_get("name")?,
        email: row.try_get("email")?,
        role: decode_enum(row.try_get::<String, _>("role")?.as_str())?,
        contact_no: row.try_get("contact_no")?,
        created_on: row.try_get("created_on")?,
    })
}

/// Insert an account and return its id.
///
/// # Errors
///
/// Returns `HmsError::Conflict` ("Email already registered") when the email
/// is taken, or `HmsError::Database` for other failures.
pub async fn create<'e, E>(executor: E, user: &NewUser<'_>) -> HmsResult<i64>
where
    E: sqlx::Executor<'e, Database = sqlx::Sqlite>,
{
    let result = sqlx::query(
        "INSERT INTO users (name, email, password_hash, role, contact_no, created_on)
         VALUES (?, ?, ?, ?, ?, ?)",
    )
    .bind(user.name)
    .bind(user.email)
    .bind(user.password_hash)
    .bind(user.role.as_str())
    .bind(user.contact_no)
    .bind(Utc::now())
    .execute(executor)
    .await
    .map_err(|e| {
        if db::is_unique_violation(&e) {
            HmsError::Conflict("Email already registered".into())
        } else {
            e.into()
        }
    })?;
    Ok(result.last_insert_rowid())
}

/// Fetch the account and stored hash for a login attempt.
pub async fn find_credentials(
    pool: &SqlitePool,
    email: &str,
) -> HmsResult<Option<UserCredentials>> {
    let row = sqlx::query(
        "SELECT user_id, name, email, role, contact_no, created_on, password_hash
         FROM users WHERE email = ?",
    )
    .bind(email)
    .fetch_optional(pool)
    .await?;

    row.map(|row| {
        Ok(UserCredentials {
            account: map_account(&row)?,
            password_hash: row.try_get("password_hash")?,
        })
    })
    .transpose()
}

/// Fetch an account by id.
pub async fn find_by_id(pool: &SqlitePool, user_id: i64) -> HmsResult<Option<UserAccount>> {
    let row = sqlx::query(
        "SELECT user_id, name, email, role, contact_no, created_on
         FROM users WHERE user_id = ?",
    )
    .bind(user_id)
    .fetch_optional(pool)
    .await?;
    row.as_ref().map(map_account).transpose()
}

/// Partial profile update; absent fields keep their stored value. Returns
/// whether a row matched.
pub async fn update_profile<'e, E>(
    executor: E,
    user_id: i64,
    name: Option<&str>,
    contact_no: Option<&str>,
) -> HmsResult<bool>
where
    E: sqlx::Executor<'e, Database = sqlx::Sqlite>,
{
    let result = sqlx::query(
        "UPDATE users
         SET name = COALESCE(?, name), contact_no = COALESCE(?, contact_no)
         WHERE user_id = ?",
    )
    .bind(name)
    .bind(contact_no)
    .bind(user_id)
    .execute(executor)
    .await?;
    Ok(result.rows_affected() > 0)
}
