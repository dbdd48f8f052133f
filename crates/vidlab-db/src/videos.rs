//! Database operations for the `videos` table.
//!
//! Status transitions are guarded by `WHERE status = …` clauses; a mutation
//! that matches zero rows surfaces as [`DbError::InvalidVideoTransition`]
//! instead of silently succeeding. The state machine owns all transitions:
//! `pending → updating → {completed, failed}`.

use chrono::{DateTime, Utc};
use sqlx::PgPool;

use crate::DbError;

/// A row from the `videos` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct VideoRow {
    pub id: i64,
    pub video_id: String,
    pub video_url: String,
    pub channel_id: String,
    pub published_at: DateTime<Utc>,
    pub status: String,
    pub retry_count: i32,
    pub last_attempt_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

/// A discovered video about to be inserted as `pending`.
#[derive(Debug, Clone)]
pub struct NewVideo {
    pub video_id: String,
    pub video_url: String,
    pub channel_id: String,
    pub published_at: DateTime<Utc>,
}

/// Inserts a discovered video with `status = 'pending'`.
///
/// Conflicts on `video_id` are ignored so discovery stays idempotent; the
/// returned bool reports whether a row was actually written.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the insert fails.
pub async fn insert_video(pool: &PgPool, video: &NewVideo) -> Result<bool, DbError> {
    let result = sqlx::query(
        "INSERT INTO videos (video_id, video_url, channel_id, published_at, status) \
         VALUES ($1, $2, $3, $4, 'pending') \
         ON CONFLICT (video_id) DO NOTHING",
    )
    .bind(&video.video_id)
    .bind(&video.video_url)
    .bind(&video.channel_id)
    .bind(video.published_at)
    .execute(pool)
    .await?;

    Ok(result.rows_affected() > 0)
}

/// Returns which of the given external video ids are already stored.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn existing_video_ids(
    pool: &PgPool,
    video_ids: &[String],
) -> Result<Vec<String>, DbError> {
    let rows = sqlx::query_scalar::<_, String>(
        "SELECT video_id FROM videos WHERE video_id = ANY($1)",
    )
    .bind(video_ids)
    .fetch_all(pool)
    .await?;

    Ok(rows)
}

/// Fetches the single pending video with the most recent `published_at`,
/// or `None` when nothing is pending.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn next_pending_video(pool: &PgPool) -> Result<Option<VideoRow>, DbError> {
    let row = sqlx::query_as::<_, VideoRow>(
        "SELECT id, video_id, video_url, channel_id, published_at, \
                status, retry_count, last_attempt_at, created_at \
         FROM videos \
         WHERE status = 'pending' \
         ORDER BY published_at DESC \
         LIMIT 1",
    )
    .fetch_optional(pool)
    .await?;

    Ok(row)
}

/// Claims a pending video for processing: sets `status = 'updating'`, stamps
/// `last_attempt_at = NOW()`, and increments `retry_count`.
///
/// # Errors
///
/// Returns [`DbError::InvalidVideoTransition`] if the video is not `pending`,
/// or [`DbError::Sqlx`] if the update fails.
pub async fn mark_video_updating(pool: &PgPool, id: i64) -> Result<(), DbError> {
    let result = sqlx::query(
        "UPDATE videos \
         SET status = 'updating', last_attempt_at = NOW(), retry_count = retry_count + 1 \
         WHERE id = $1 AND status = 'pending'",
    )
    .bind(id)
    .execute(pool)
    .await?;

    if result.rows_affected() == 0 {
        return Err(DbError::InvalidVideoTransition {
            id,
            expected_status: "pending",
        });
    }

    Ok(())
}

/// Marks a video as `completed` after all of its reports were processed.
///
/// # Errors
///
/// Returns [`DbError::InvalidVideoTransition`] if the video is not
/// `updating`, or [`DbError::Sqlx`] if the update fails.
pub async fn mark_video_completed(pool: &PgPool, id: i64) -> Result<(), DbError> {
    let result = sqlx::query(
        "UPDATE videos SET status = 'completed' \
         WHERE id = $1 AND status = 'updating'",
    )
    .bind(id)
    .execute(pool)
    .await?;

    if result.rows_affected() == 0 {
        return Err(DbError::InvalidVideoTransition {
            id,
            expected_status: "updating",
        });
    }

    Ok(())
}

/// Marks a video as `failed`. Valid from either `pending` or `updating`
/// so the best-effort cleanup path can run no matter how far processing got.
///
/// # Errors
///
/// Returns [`DbError::InvalidVideoTransition`] if the video is already in a
/// terminal state, or [`DbError::Sqlx`] if the update fails.
pub async fn mark_video_failed(pool: &PgPool, id: i64) -> Result<(), DbError> {
    let result = sqlx::query(
        "UPDATE videos SET status = 'failed' \
         WHERE id = $1 AND status IN ('pending', 'updating')",
    )
    .bind(id)
    .execute(pool)
    .await?;

    if result.rows_affected() == 0 {
        return Err(DbError::InvalidVideoTransition {
            id,
            expected_status: "pending or updating",
        });
    }

    Ok(())
}
