//! Database operations for the `reports` table.

use chrono::{DateTime, Utc};
use sqlx::PgPool;

use crate::DbError;

/// A row from the `reports` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct ReportRow {
    pub id: String,
    pub video_id: i64,
    pub video_url: String,
    pub results: serde_json::Value,
    pub product_id: Option<String>,
    pub product_name: Option<String>,
    pub product_category: Option<String>,
    pub company: Option<String>,
    pub verdict: String,
    pub image_url: Option<String>,
    pub image_status: String,
    pub created_at: DateTime<Utc>,
}

/// One extracted product report about to be persisted.
///
/// `id` is derived by the orchestrator as `"{video db id}_{product index}"`
/// so a single video can own several report rows.
#[derive(Debug, Clone)]
pub struct NewReport {
    pub id: String,
    pub video_id: i64,
    pub video_url: String,
    pub results: serde_json::Value,
    pub product_id: Option<String>,
    pub product_name: Option<String>,
    pub product_category: Option<String>,
    pub company: Option<String>,
    pub verdict: &'static str,
}

/// Outcome of the image-enrichment step for one report.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageStatus {
    Pending,
    Completed,
    Failed,
}

impl ImageStatus {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            ImageStatus::Pending => "pending",
            ImageStatus::Completed => "completed",
            ImageStatus::Failed => "failed",
        }
    }
}

/// Inserts one report row with `image_status = 'pending'`.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the insert fails.
pub async fn insert_report(pool: &PgPool, report: &NewReport) -> Result<(), DbError> {
    sqlx::query(
        "INSERT INTO reports \
             (id, video_id, video_url, results, product_id, product_name, \
              product_category, company, verdict, image_status) \
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, 'pending')",
    )
    .bind(&report.id)
    .bind(report.video_id)
    .bind(&report.video_url)
    .bind(&report.results)
    .bind(&report.product_id)
    .bind(&report.product_name)
    .bind(&report.product_category)
    .bind(&report.company)
    .bind(report.verdict)
    .execute(pool)
    .await?;

    Ok(())
}

/// Records the enrichment outcome for one report: the found image URL with
/// `completed`, or no URL with `failed`. Written exactly once per report.
///
/// # Errors
///
/// Returns [`DbError::NotFound`] if no report exists with the given id, or
/// [`DbError::Sqlx`] if the update fails.
pub async fn set_report_image(
    pool: &PgPool,
    report_id: &str,
    status: ImageStatus,
    image_url: Option<&str>,
) -> Result<(), DbError> {
    let result = sqlx::query(
        "UPDATE reports SET image_status = $1, image_url = $2 WHERE id = $3",
    )
    .bind(status.as_str())
    .bind(image_url)
    .bind(report_id)
    .execute(pool)
    .await?;

    if result.rows_affected() == 0 {
        return Err(DbError::NotFound);
    }

    Ok(())
}
