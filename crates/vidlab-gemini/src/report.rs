//! Report generation pipeline: usage accounting, prompt, model call,
//! extraction.

use crate::client::{GeminiClient, GenerationConfig};
use crate::error::GeminiError;
use crate::extract::{extract_reports, ReportPayload};
use crate::prompt::build_report_prompt;
use crate::usage::{UsageCounter, CRITICAL_THRESHOLD, DAILY_LIMIT, WARN_THRESHOLD};

/// Produces structured lab-analysis reports for a video URL.
pub struct ReportGenerator {
    client: GeminiClient,
    usage: UsageCounter,
    config: GenerationConfig,
}

impl ReportGenerator {
    pub fn new(client: GeminiClient, usage: UsageCounter) -> Self {
        Self {
            client,
            usage,
            config: GenerationConfig::default(),
        }
    }

    pub fn with_config(mut self, config: GenerationConfig) -> Self {
        self.config = config;
        self
    }

    /// Generates the reports for one video.
    ///
    /// The usage counter is incremented before the model call so that failed
    /// calls still count against the daily quota. Counter I/O failures are
    /// logged and never abort generation.
    ///
    /// # Errors
    ///
    /// Propagates [`GeminiError`] from the model call or from extraction.
    pub async fn generate(&self, video_url: &str) -> Result<Vec<ReportPayload>, GeminiError> {
        match self.usage.increment() {
            Ok(count) => log_usage_tier(count),
            Err(e) => {
                tracing::warn!(path = %self.usage.path().display(), error = %e, "failed to update usage counter");
            }
        }

        let prompt = build_report_prompt(video_url);
        let text = self.client.generate_content(&prompt, self.config).await?;
        let reports = extract_reports(&text)?;

        tracing::info!(video_url, reports = reports.len(), "extracted reports");
        Ok(reports)
    }
}

/// Advisory severity for a daily usage count. Purely informational: no tier
/// blocks a call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum UsageTier {
    Normal,
    Approaching,
    Critical,
    LimitReached,
}

fn usage_tier(count: u32) -> UsageTier {
    if count >= DAILY_LIMIT {
        UsageTier::LimitReached
    } else if count >= CRITICAL_THRESHOLD {
        UsageTier::Critical
    } else if count >= WARN_THRESHOLD {
        UsageTier::Approaching
    } else {
        UsageTier::Normal
    }
}

fn log_usage_tier(count: u32) {
    match usage_tier(count) {
        UsageTier::LimitReached => {
            tracing::warn!(count, limit = DAILY_LIMIT, "daily model usage limit reached");
        }
        UsageTier::Critical => {
            tracing::warn!(count, limit = DAILY_LIMIT, "daily model usage near the limit");
        }
        UsageTier::Approaching => {
            tracing::warn!(
                count,
                limit = DAILY_LIMIT,
                "daily model usage approaching the limit"
            );
        }
        UsageTier::Normal => {
            tracing::debug!(count, limit = DAILY_LIMIT, "daily model usage");
        }
    }
}
