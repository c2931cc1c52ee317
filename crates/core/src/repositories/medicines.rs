//! Medicine catalogue storage.

use hms_types::MedicineForm;
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};

use crate::db::is_unique_violation;
use crate::model::Medicine;
use crate::repositories::decode_enum;
use crate::{HmsError, HmsResult};

#[derive(Debug)]
pub struct NewMedicine<'a> {
    pub name: &'a str,
    pub form: MedicineForm,
    pub details: Option<&'a str>,
}

fn map_medicine(row: &SqliteRow) -> HmsResult<Medicine> {
    Ok(Medicine {
        medicine_id: row.try_get("medicine_id")?,
        name: row.try_get("name")?,
        form: decode_enum(row.try_get("form")?)?,
        details: row.try_get("details")?,
    })
}

/// Add a medicine to the catalogue. Names are unique ignoring case.
///
/// # Errors
///
/// `HmsError::Conflict` when the name is already taken.
pub async fn create<'e, E>(executor: E, medicine: &NewMedicine<'_>) -> HmsResult<i64>
where
    E: sqlx::Executor<'e, Database = sqlx::Sqlite>,
{
    let result = sqlx::query("INSERT INTO medicines (name, form, details) VALUES (?, ?, ?)")
        .bind(medicine.name)
        .bind(medicine.form.as_str())
        .bind(medicine.details)
        .execute(executor)
        .await
        .map_err(|err| {
            if is_unique_violation(&err) {
                HmsError::Conflict("Medicine with this name already exists".to_owned())
            } else {
                err.into()
            }
        })?;
    Ok(result.last_insert_rowid())
}

/// List the catalogue alphabetically, optionally filtered by a name
/// substring. The match ignores case, like the uniqueness rule.
pub async fn list(pool: &SqlitePool, search: Option<&str>) -> HmsResult<Vec<Medicine>> {
    let rows = match search {
        Some(term) => {
            sqlx::query(
                "SELECT medicine_id, name, form, details FROM medicines
                 WHERE name LIKE ? ORDER BY name",
            )
            .bind(format!("%{term}%"))
            .fetch_all(pool)
            .await?
        }
        None => {
            sqlx::query("SELECT medicine_id, name, form, details FROM medicines ORDER BY name")
                .fetch_all(pool)
                .await?
        }
    };
    rows.iter().map(map_medicine).collect()
}

pub async fn exists<'e, E>(executor: E, medicine_id: i64) -> HmsResult<bool>
where
    E: sqlx::Executor<'e, Database = sqlx::Sqlite>,
{
    let found: i64 =
        sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM medicines WHERE medicine_id = ?)")
            .bind(medicine_id)
            .fetch_one(executor)
            .await?;
    Ok(found != 0)
}

pub async fn find(pool: &SqlitePool, medicine_id: i64) -> HmsResult<Option<Medicine>> {
    let row = sqlx::query("SELECT medicine_id, name, form, details FROM medicines WHERE medicine_id = ?")
        .bind(medicine_id)
        .fetch_optional(pool)
        .await?;
    row.as_ref().map(map_medicine).transpose()
}

/// Partial update; absent fields keep their stored value. Returns whether a
/// row matched.
///
/// # Errors
///
/// `HmsError::Conflict` when renaming onto another medicine's name.
pub async fn update<'e, E>(
    executor: E,
    medicine_id: i64,
    name: Option<&str>,
    form: Option<MedicineForm>,
    details: Option<&str>,
) -> HmsResult<bool>
where
    E: sqlx::Executor<'e, Database = sqlx::Sqlite>,
{
    let result = sqlx::query(
        "UPDATE medicines SET
             name    = COALESCE(?, name),
             form    = COALESCE(?, form),
             details = COALESCE(?, details)
         WHERE medicine_id = ?",
    )
    .bind(name)
    .bind(form.map(MedicineForm::as_str))
    .bind(details)
    .bind(medicine_id)
    .execute(executor)
    .await
    .map_err(|err| {
        if is_unique_violation(&err) {
            HmsError::Conflict("Another medicine with this name already exists".to_owned())
        } else {
            err.into()
        }
    })?;
    Ok(result.rows_affected() > 0)
}

/// True when any prescription line references the medicine. Referenced
/// medicines must not be deleted.
pub async fn is_referenced<'e, E>(executor: E, medicine_id: i64) -> HmsResult<bool>
where
    E: sqlx::Executor<'e, Database = sqlx::Sqlite>,
{
    let referenced: i64 = sqlx::query_scalar(
        "SELECT EXISTS (SELECT 1 FROM prescription_medicines WHERE medicine_id = ?)",
    )
    .bind(medicine_id)
    .fetch_one(executor)
    .await?;
    Ok(referenced != 0)
}

/// Remove a medicine. Returns whether a row matched.
pub async fn delete<'e, E>(executor: E, medicine_id: i64) -> HmsResult<bool>
where
    E: sqlx::Executor<'e, Database = sqlx::Sqlite>,
{
    let result = sqlx::query("DELETE FROM medicines WHERE medicine_id = ?")
        .bind(medicine_id)
        .execute(executor)
        .await?;
    Ok(result.rows_affected() > 0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::test_pool;

    #[tokio::test]
    async fn names_are_unique_ignoring_case() {
        let pool = test_pool().await;
        create(
            &pool,
            &NewMedicine {
                name: "Paracetamol",
                form: MedicineForm::Tablet,
                details: None,
            },
        )
        .await
        .expect("create should succeed");

        let err = create(
            &pool,
            &NewMedicine {
                name: "PARACETAMOL",
                form: MedicineForm::Syrup,
                details: None,
            },
        )
        .await
        .expect_err("duplicate name should be rejected");
        assert!(matches!(err, HmsError::Conflict(_)));
    }

    #[tokio::test]
    async fn list_filters_by_substring() {
        let pool = test_pool().await;
        for (name, form) in [
            ("Amoxicillin", MedicineForm::Capsule),
            ("Ibuprofen", MedicineForm::Tablet),
            ("Paracetamol", MedicineForm::Tablet),
        ] {
            create(&pool, &NewMedicine { name, form, details: None })
                .await
                .expect("create should succeed");
        }

        let all = list(&pool, None).await.expect("list should succeed");
        assert_eq!(all.len(), 3);
        assert_eq!(all[0].name, "Amoxicillin");

        let hits = list(&pool, Some("cil")).await.expect("search should succeed");
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].name, "Amoxicillin");
    }

    #[tokio::test]
    async fn update_keeps_absent_fields_and_guards_renames() {
        let pool = test_pool().await;
        let first = create(
            &pool,
            &NewMedicine {
                name: "Cetirizine",
                form: MedicineForm::Tablet,
                details: Some("10mg antihistamine"),
            },
        )
        .await
        .expect("create should succeed");
        create(
            &pool,
            &NewMedicine {
                name: "Loratadine",
                form: MedicineForm::Tablet,
                details: None,
            },
        )
        .await
        .expect("create should succeed");

        let matched = update(&pool, first, None, Some(MedicineForm::Syrup), None)
            .await
            .expect("update should succeed");
        assert!(matched);
        let medicine = find(&pool, first)
            .await
            .expect("lookup should succeed")
            .expect("medicine should exist");
        assert_eq!(medicine.form, MedicineForm::Syrup);
        assert_eq!(medicine.details.as_deref(), Some("10mg antihistamine"));

        let err = update(&pool, first, Some("Loratadine"), None, None)
            .await
            .expect_err("rename onto a taken name should be rejected");
        assert!(matches!(err, HmsError::Conflict(_)));

        let matched = update(&pool, 9999, Some("Ghost"), None, None)
            .await
            .expect("update should succeed");
        assert!(!matched);
    }
}
