//! Discovery command handlers: find new long-form uploads on the configured
//! channel and queue them as pending videos.

use vidlab_core::AppConfig;
use vidlab_db::{retry_with_backoff, NewVideo, RetrySettings};
use vidlab_youtube::{DiscoveredVideo, YoutubeClient};

/// Checks the channel's most recent uploads and queues the newest unknown
/// long-form videos, up to `discover_batch_size` per run.
///
/// # Errors
///
/// Returns an error if the channel cannot be resolved, the upload search
/// fails, or the known-id lookup fails. Per-video insert failures are logged
/// and skipped, not propagated.
pub(crate) async fn check_new_videos(
    pool: &sqlx::PgPool,
    youtube: &YoutubeClient,
    config: &AppConfig,
    retry: RetrySettings,
) -> anyhow::Result<usize> {
    let channel_id = youtube.resolve_channel_id(&config.channel_handle).await?;
    let candidates = youtube
        .recent_long_form(
            &channel_id,
            config.discover_search_window,
            config.short_form_threshold_secs,
        )
        .await?;

    let unknown = filter_unknown(pool, candidates).await?;
    let batch: Vec<DiscoveredVideo> =
        unknown.into_iter().take(config.discover_batch_size).collect();

    let inserted = insert_batch(pool, &batch, retry).await;
    println!("queued {inserted} new videos");
    Ok(inserted)
}

/// Queues every long-form upload on the channel that is not yet stored.
/// Used once to seed the database with the channel's back catalog.
///
/// # Errors
///
/// Returns an error if the channel cannot be resolved, pagination fails, or
/// the known-id lookup fails. Per-video insert failures are logged and
/// skipped, not propagated.
pub(crate) async fn backfill_videos(
    pool: &sqlx::PgPool,
    youtube: &YoutubeClient,
    config: &AppConfig,
    retry: RetrySettings,
) -> anyhow::Result<usize> {
    let channel_id = youtube.resolve_channel_id(&config.channel_handle).await?;
    let candidates = youtube
        .all_long_form(&channel_id, config.short_form_threshold_secs)
        .await?;
    let total = candidates.len();

    let unknown = filter_unknown(pool, candidates).await?;
    let inserted = insert_batch(pool, &unknown, retry).await;
    println!("queued {inserted} videos out of {total} long-form uploads");
    Ok(inserted)
}

/// Drops candidates whose external id is already stored, preserving order.
async fn filter_unknown(
    pool: &sqlx::PgPool,
    candidates: Vec<DiscoveredVideo>,
) -> anyhow::Result<Vec<DiscoveredVideo>> {
    if candidates.is_empty() {
        return Ok(candidates);
    }

    let ids: Vec<String> = candidates.iter().map(|v| v.video_id.clone()).collect();
    let known = vidlab_db::existing_video_ids(pool, &ids).await?;

    Ok(candidates
        .into_iter()
        .filter(|v| !known.contains(&v.video_id))
        .collect())
}

async fn insert_batch(
    pool: &sqlx::PgPool,
    batch: &[DiscoveredVideo],
    retry: RetrySettings,
) -> usize {
    let mut inserted = 0usize;
    for video in batch {
        let new_video = NewVideo {
            video_id: video.video_id.clone(),
            video_url: video.video_url.clone(),
            channel_id: video.channel_id.clone(),
            published_at: video.published_at,
        };
        match retry_with_backoff(retry, || vidlab_db::insert_video(pool, &new_video)).await {
            Ok(true) => {
                tracing::info!(video_id = %video.video_id, "queued video");
                inserted += 1;
            }
            Ok(false) => {
                tracing::debug!(video_id = %video.video_id, "video already stored");
            }
            Err(e) => {
                tracing::warn!(video_id = %video.video_id, error = %e, "skipping video — insert failed");
            }
        }
    }
    inserted
}
