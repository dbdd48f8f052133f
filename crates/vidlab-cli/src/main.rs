use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use vidlab_db::RetrySettings;
use vidlab_gemini::{GeminiClient, ReportGenerator, UsageCounter};
use vidlab_imagesearch::ImageSearchClient;
use vidlab_youtube::YoutubeClient;

mod discover;
mod process;

#[derive(Debug, Parser)]
#[command(name = "vidlab-cli")]
#[command(about = "Channel video ingestion and lab-report pipeline")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Check the channel for new long-form uploads and queue them.
    Discover {
        /// Queue the channel's entire long-form back catalog instead of
        /// only the most recent uploads.
        #[arg(long)]
        backfill: bool,
    },
    /// Process the next pending video: generate reports, store them, and
    /// fetch product images.
    Process,
    /// Process the next pending video, then check for new uploads, as a
    /// single cron-friendly invocation.
    Run,
    /// Apply pending database migrations.
    Migrate,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = vidlab_core::load_app_config()?;

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(&config.log_level)),
        )
        .init();

    let pool = vidlab_db::connect_pool(
        &config.database_url,
        vidlab_db::PoolConfig::from_app_config(&config),
    )
    .await?;
    let retry = RetrySettings::from_app_config(&config);

    match cli.command {
        Commands::Discover { backfill } => {
            let youtube = build_youtube(&config)?;
            if backfill {
                discover::backfill_videos(&pool, &youtube, &config, retry).await?;
            } else {
                discover::check_new_videos(&pool, &youtube, &config, retry).await?;
            }
        }
        Commands::Process => {
            run_process(&pool, &config, retry).await?;
        }
        Commands::Run => {
            let youtube = build_youtube(&config)?;
            run_process(&pool, &config, retry).await?;
            discover::check_new_videos(&pool, &youtube, &config, retry).await?;
        }
        Commands::Migrate => {
            vidlab_db::run_migrations(&pool).await?;
            println!("migrations applied");
        }
    }

    Ok(())
}

fn build_youtube(config: &vidlab_core::AppConfig) -> anyhow::Result<YoutubeClient> {
    YoutubeClient::new(&config.youtube_api_key, config.http_request_timeout_secs)
        .map_err(|e| anyhow::anyhow!("failed to build YouTube client: {e}"))
}

async fn run_process(
    pool: &sqlx::PgPool,
    config: &vidlab_core::AppConfig,
    retry: RetrySettings,
) -> anyhow::Result<()> {
    let gemini = GeminiClient::new(
        &config.gemini_api_key,
        &config.gemini_model,
        config.gemini_request_timeout_secs,
    )
    .map_err(|e| anyhow::anyhow!("failed to build Gemini client: {e}"))?;
    let generator = ReportGenerator::new(gemini, UsageCounter::new(&config.usage_file));

    let images = ImageSearchClient::new(
        &config.image_search_api_key,
        &config.image_search_engine_id,
        config.http_request_timeout_secs,
    )
    .map_err(|e| anyhow::anyhow!("failed to build image search client: {e}"))?;

    let store = process::PgStore::new(pool.clone());
    let outcome = process::process_next_pending(&store, &generator, &images, retry).await?;

    match outcome {
        process::ProcessOutcome::Idle => println!("no pending videos"),
        process::ProcessOutcome::Completed {
            video_id,
            reports,
            skipped,
        } => println!("video {video_id} completed: {reports} reports stored, {skipped} skipped"),
        process::ProcessOutcome::Failed { video_id } => {
            println!("video {video_id} failed");
        }
    }

    Ok(())
}
