//! The per-video processing state machine.
//!
//! One invocation claims at most one pending video and drives it through
//! `pending → updating → {completed, failed}`. Failures are isolated per
//! report: a report that cannot be stored or enriched is logged and skipped,
//! and only claim/generation/completion failures fail the video itself.

use vidlab_core::summarize_report;
use vidlab_db::{
    retry_with_backoff, DbError, ImageStatus, NewReport, RetrySettings, VideoRow,
};
use vidlab_gemini::{GeminiError, ReportGenerator, ReportPayload};
use vidlab_imagesearch::{ImageSearchClient, ImageSearchError};

/// Store operations the state machine needs. Implemented for the real
/// Postgres-backed store and for in-memory fakes in tests.
pub(crate) trait VideoStore {
    async fn next_pending(&self) -> Result<Option<VideoRow>, DbError>;
    async fn mark_updating(&self, id: i64) -> Result<(), DbError>;
    async fn mark_completed(&self, id: i64) -> Result<(), DbError>;
    async fn mark_failed(&self, id: i64) -> Result<(), DbError>;
    async fn insert_report(&self, report: &NewReport) -> Result<(), DbError>;
    async fn set_report_image(
        &self,
        report_id: &str,
        status: ImageStatus,
        image_url: Option<&str>,
    ) -> Result<(), DbError>;
}

/// Produces report payloads for a video URL.
pub(crate) trait ReportSource {
    async fn generate(&self, video_url: &str) -> Result<Vec<ReportPayload>, GeminiError>;
}

/// Looks up a product image for a search query.
pub(crate) trait ImageSource {
    async fn find_image(&self, query: &str) -> Result<Option<String>, ImageSearchError>;
}

/// The Postgres-backed store used in production.
pub(crate) struct PgStore {
    pool: sqlx::PgPool,
}

impl PgStore {
    pub(crate) fn new(pool: sqlx::PgPool) -> Self {
        Self { pool }
    }
}

impl VideoStore for PgStore {
    async fn next_pending(&self) -> Result<Option<VideoRow>, DbError> {
        vidlab_db::next_pending_video(&self.pool).await
    }

    async fn mark_updating(&self, id: i64) -> Result<(), DbError> {
        vidlab_db::mark_video_updating(&self.pool, id).await
    }

    async fn mark_completed(&self, id: i64) -> Result<(), DbError> {
        vidlab_db::mark_video_completed(&self.pool, id).await
    }

    async fn mark_failed(&self, id: i64) -> Result<(), DbError> {
        vidlab_db::mark_video_failed(&self.pool, id).await
    }

    async fn insert_report(&self, report: &NewReport) -> Result<(), DbError> {
        vidlab_db::insert_report(&self.pool, report).await
    }

    async fn set_report_image(
        &self,
        report_id: &str,
        status: ImageStatus,
        image_url: Option<&str>,
    ) -> Result<(), DbError> {
        vidlab_db::set_report_image(&self.pool, report_id, status, image_url).await
    }
}

impl ReportSource for ReportGenerator {
    async fn generate(&self, video_url: &str) -> Result<Vec<ReportPayload>, GeminiError> {
        ReportGenerator::generate(self, video_url).await
    }
}

impl ImageSource for ImageSearchClient {
    async fn find_image(&self, query: &str) -> Result<Option<String>, ImageSearchError> {
        self.find_product_image(query).await
    }
}

/// What one processing run did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ProcessOutcome {
    /// No pending video existed.
    Idle,
    Completed {
        video_id: i64,
        reports: usize,
        skipped: usize,
    },
    Failed {
        video_id: i64,
    },
}

/// Claims the next pending video and processes it to a terminal state.
///
/// # Errors
///
/// Only the initial pending lookup propagates an error; everything after a
/// video is claimed resolves to [`ProcessOutcome::Completed`] or
/// [`ProcessOutcome::Failed`].
pub(crate) async fn process_next_pending<S, R, I>(
    store: &S,
    reports: &R,
    images: &I,
    retry: RetrySettings,
) -> Result<ProcessOutcome, DbError>
where
    S: VideoStore,
    R: ReportSource,
    I: ImageSource,
{
    let Some(video) = store.next_pending().await? else {
        tracing::info!("no pending videos");
        return Ok(ProcessOutcome::Idle);
    };

    tracing::info!(
        video_id = video.id,
        external_id = %video.video_id,
        "processing video"
    );

    if let Err(e) = retry_with_backoff(retry, || store.mark_updating(video.id)).await {
        tracing::error!(video_id = video.id, error = %e, "failed to claim video");
        fail_video_best_effort(store, video.id).await;
        return Ok(ProcessOutcome::Failed { video_id: video.id });
    }

    let payloads = match reports.generate(&video.video_url).await {
        Ok(payloads) => payloads,
        Err(e) => {
            tracing::error!(video_id = video.id, error = %e, "report generation failed");
            fail_video_best_effort(store, video.id).await;
            return Ok(ProcessOutcome::Failed { video_id: video.id });
        }
    };

    let mut stored = 0usize;
    let mut skipped = 0usize;

    for (index, payload) in payloads.iter().enumerate() {
        let report_id = format!("{}_{index}", video.id);
        match store_report(store, &video, &report_id, payload, retry).await {
            Ok(()) => stored += 1,
            Err(e) => {
                tracing::warn!(report_id, error = %e, "skipping report — insert failed");
                skipped += 1;
                continue;
            }
        }
        enrich_report_image(store, images, &report_id, payload, retry).await;
    }

    if let Err(e) = retry_with_backoff(retry, || store.mark_completed(video.id)).await {
        tracing::error!(video_id = video.id, error = %e, "failed to complete video");
        fail_video_best_effort(store, video.id).await;
        return Ok(ProcessOutcome::Failed { video_id: video.id });
    }

    tracing::info!(video_id = video.id, stored, skipped, "video completed");
    Ok(ProcessOutcome::Completed {
        video_id: video.id,
        reports: stored,
        skipped,
    })
}

/// Derives the summary columns and inserts one report row.
async fn store_report<S: VideoStore>(
    store: &S,
    video: &VideoRow,
    report_id: &str,
    payload: &ReportPayload,
    retry: RetrySettings,
) -> Result<(), DbError> {
    let summary = summarize_report(payload);
    let report = NewReport {
        id: report_id.to_owned(),
        video_id: video.id,
        video_url: video.video_url.clone(),
        results: serde_json::Value::Object(payload.clone()),
        product_id: summary.product_id,
        product_name: summary.product_name,
        product_category: summary.product_category,
        company: summary.company,
        verdict: summary.verdict.as_str(),
    };
    retry_with_backoff(retry, || store.insert_report(&report)).await
}

/// Finds and records a product image for one stored report. Every failure in
/// here is logged and absorbed; image enrichment never fails the video.
async fn enrich_report_image<S: VideoStore, I: ImageSource>(
    store: &S,
    images: &I,
    report_id: &str,
    payload: &ReportPayload,
    retry: RetrySettings,
) {
    let query = summarize_report(payload).product_name.unwrap_or_default();

    let (status, image_url) = match images.find_image(&query).await {
        Ok(Some(url)) => (ImageStatus::Completed, Some(url)),
        Ok(None) => {
            tracing::info!(report_id, "no image result");
            (ImageStatus::Failed, None)
        }
        Err(e) => {
            tracing::warn!(report_id, error = %e, "image lookup failed");
            (ImageStatus::Failed, None)
        }
    };

    if let Err(e) = retry_with_backoff(retry, || {
        store.set_report_image(report_id, status, image_url.as_deref())
    })
    .await
    {
        tracing::warn!(report_id, error = %e, "failed to record image status");
    }
}

/// Moves a video to `failed`, logging rather than propagating any error so
/// the cleanup path itself cannot fail the caller.
async fn fail_video_best_effort<S: VideoStore>(store: &S, video_id: i64) {
    if let Err(e) = store.mark_failed(video_id).await {
        tracing::error!(video_id, error = %e, "failed to mark video as failed");
    }
}

#[cfg(test)]
#[path = "process_test.rs"]
mod tests;
