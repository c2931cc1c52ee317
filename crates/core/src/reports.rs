//! Admin aggregates behind the dashboard and reports endpoints.

use chrono::{Duration, Utc};
use serde::Serialize;
use sqlx::{Row, SqlitePool};
use utoipa::ToSchema;

use hms_types::AppointmentStatus;

use crate::repositories::decode_enum;
use crate::HmsResult;

/// Headline counters for the admin dashboard. "This week" means an
/// appointment date in the last seven days, upcoming slots included.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DashboardCounts {
    pub total_doctors: i64,
    pub total_patients: i64,
    pub total_appointments: i64,
    pub scheduled_appointments: i64,
    pub completed_appointments: i64,
    pub appointments_this_week: i64,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TopDoctor {
    pub name: String,
    pub specialization: String,
    pub appointment_count: i64,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StatusCount {
    pub status: AppointmentStatus,
    pub count: i64,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SpecializationCount {
    pub specialization: String,
    pub doctor_count: i64,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Reports {
    pub top_doctors: Vec<TopDoctor>,
    pub appointments_by_status: Vec<StatusCount>,
    pub specializations: Vec<SpecializationCount>,
}

pub async fn dashboard(pool: &SqlitePool) -> HmsResult<DashboardCounts> {
    let total_doctors: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM doctors")
        .fetch_one(pool)
        .await?;
    let total_patients: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM patients")
        .fetch_one(pool)
        .await?;
    let total_appointments: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM appointments")
        .fetch_one(pool)
        .await?;
    let scheduled_appointments: i64 =
        sqlx::query_scalar("SELECT COUNT(*) FROM appointments WHERE status = 'SCHEDULED'")
            .fetch_one(pool)
            .await?;
    let completed_appointments: i64 =
        sqlx::query_scalar("SELECT COUNT(*) FROM appointments WHERE status = 'COMPLETED'")
            .fetch_one(pool)
            .await?;
    let appointments_this_week: i64 =
        sqlx::query_scalar("SELECT COUNT(*) FROM appointments WHERE appt_date >= ?")
            .bind(Utc::now() - Duration::days(7))
            .fetch_one(pool)
            .await?;

    Ok(DashboardCounts {
        total_doctors,
        total_patients,
        total_appointments,
        scheduled_appointments,
        completed_appointments,
        appointments_this_week,
    })
}

/// The three breakdowns on the reports page: busiest doctors (top ten,
/// zero-appointment doctors included), appointment counts per status and
/// doctor counts per specialization.
pub async fn compile(pool: &SqlitePool) -> HmsResult<Reports> {
    let top_doctors = sqlx::query(
        "SELECT u.name, d.specialization, COUNT(a.appointment_id) AS appointment_count
         FROM doctors d
         JOIN users u ON u.user_id = d.user_id
         LEFT JOIN appointments a ON a.doctor_id = d.doctor_id
         GROUP BY d.doctor_id
         ORDER BY appointment_count DESC, u.name
         LIMIT 10",
    )
    .fetch_all(pool)
    .await?
    .iter()
    .map(|row| {
        Ok(TopDoctor {
            name: row.try_get("name")?,
            specialization: row.try_get("specialization")?,
            appointment_count: row.try_get("appointment_count")?,
        })
    })
    .collect::<HmsResult<Vec<_>>>()?;

    let appointments_by_status = sqlx::query(
        "SELECT status, COUNT(*) AS count FROM appointments GROUP BY status ORDER BY status",
    )
    .fetch_all(pool)
    .await?
    .iter()
    .map(|row| {
        Ok(StatusCount {
            status: decode_enum(row.try_get("status")?)?,
            count: row.try_get("count")?,
        })
    })
    .collect::<HmsResult<Vec<_>>>()?;

    let specializations = sqlx::query(
        "SELECT specialization, COUNT(*) AS doctor_count
         FROM doctors
         GROUP BY specialization
         ORDER BY specialization",
    )
    .fetch_all(pool)
    .await?
    .iter()
    .map(|row| {
        Ok(SpecializationCount {
            specialization: row.try_get("specialization")?,
            doctor_count: row.try_get("doctor_count")?,
        })
    })
    .collect::<HmsResult<Vec<_>>>()?;

    Ok(Reports {
        top_doctors,
        appointments_by_status,
        specializations,
    })
}
