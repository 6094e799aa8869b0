use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use humanosync_pipeline::{PipelineSettings, StatusStore};
use humanosync_store::VideoArtifacts;

/// Extract pose, object and action annotations from one video.
#[derive(Parser, Debug)]
#[command(name = "humanosync-process", version)]
struct Args {
    /// Video file to process.
    #[arg(long, value_name = "PATH")]
    video: PathBuf,

    /// Directory for pose.json, objects.json, actions.json and summary.json.
    #[arg(long, value_name = "DIR", default_value = "output")]
    output: PathBuf,

    /// Log every stage at debug level.
    #[arg(long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let args = Args::parse();

    let default_filter = if args.verbose {
        "humanosync_pipeline=debug,humanosync_store=debug"
    } else {
        "humanosync_pipeline=info"
    };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    if !args.video.exists() {
        bail!("video file not found: {}", args.video.display());
    }

    let settings = PipelineSettings::from_env().context("invalid pipeline configuration")?;
    tracing::info!(
        video = %args.video.display(),
        output = %args.output.display(),
        source = settings.detection.as_str(),
        classifier = settings.classifier.as_str(),
        "Processing video",
    );

    let video_id = args
        .video
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "video".to_string());
    let artifacts = VideoArtifacts::new(&args.output);
    let status = Arc::new(StatusStore::new());

    let output = settings
        .build_job()
        .run(&video_id, &args.video, &artifacts, &status)
        .await
        .with_context(|| format!("failed to process {}", args.video.display()))?;

    let summary = serde_json::to_string_pretty(&output.summary)?;
    tracing::info!(%summary, "Processing complete");
    Ok(())
}
