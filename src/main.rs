use clap::Parser;
use dotenvy::dotenv;
use s3_zip_uploader::infrastructure::storage;
use s3_zip_uploader::{RunRequest, UploaderConfig, ZipUploader};
use tokio::signal;
use tokio_util::sync::CancellationToken;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use url::Url;

/// Downloads a ZIP archive, extracts it and uploads every file to an S3 bucket.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// URL of the ZIP archive to upload
    #[arg(long)]
    zip_archive_url: Url,

    /// Destination bucket; a unique name is generated when omitted
    #[arg(long)]
    bucket_name: Option<String>,

    /// Maximum number of concurrent uploads
    #[arg(
        long,
        default_value_t = 10,
        value_parser = clap::builder::RangedU64ValueParser::<usize>::new().range(1..)
    )]
    concurrency: usize,

    /// Enable info-level logging
    #[arg(long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();
    let args = Args::parse();

    let default_level = if args.verbose { "info" } else { "warn" };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| format!("s3_zip_uploader={}", default_level).into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("🚀 Starting S3 ZIP uploader...");

    let config = UploaderConfig::from_env();
    let storage = storage::setup_storage(&config).await;

    let cancel = CancellationToken::new();
    tokio::spawn(cancel_on_signal(cancel.clone()));

    let uploader = ZipUploader::new(storage, config)?.with_cancellation(cancel);
    let summary = uploader
        .run(RunRequest {
            source: args.zip_archive_url,
            bucket_name: args.bucket_name,
            concurrency: args.concurrency,
        })
        .await?;

    info!(
        "✅ Done: {} files ({} bytes) from archive sha256:{} in bucket '{}' (region: {})",
        summary.files_uploaded,
        summary.bytes_uploaded,
        summary.archive_sha256,
        summary.bucket.name,
        summary.bucket.region.as_deref().unwrap_or("default")
    );
    println!("{}", summary.bucket.name);
    Ok(())
}

async fn cancel_on_signal(cancel: CancellationToken) {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::warn!("⌨️  Ctrl+C received, cancelling uploads...");
        },
        _ = terminate => {
            tracing::warn!("💤 SIGTERM received, cancelling uploads...");
        },
    }
    cancel.cancel();
}
