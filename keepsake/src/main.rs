use std::sync::Arc;

use clap::Parser;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use keepsake::api::{create_router, AppState};
use keepsake::cdn::CdnClient;
use keepsake::config::Config;
use keepsake::store::{BlobStore, HttpBlobStore, MemoryBlobStore};
use keepsake::verify::VerificationClient;

#[derive(Parser)]
#[command(name = "keepsake")]
#[command(about = "Self-hostable memorial tribute service")]
struct Args {
    /// Run an index repair pass before serving requests
    #[arg(long)]
    repair_index: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "keepsake=info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env();

    if config.server.curator_passwords.is_empty() {
        tracing::warn!(
            "KEEPSAKE_CURATOR_PASSWORDS is not set — curator mode and /api/admin/* routes are locked."
        );
    }

    let blob: Arc<dyn BlobStore> = if config.blob.base_url.starts_with("memory:") {
        tracing::info!("Using the in-memory blob store — data does not survive a restart");
        Arc::new(MemoryBlobStore::new(config.blob.list_page_size as usize))
    } else {
        tracing::info!("Connecting to blob store at {}", config.blob.base_url);
        if config.blob.write_token.is_none() {
            tracing::warn!("BLOB_WRITE_TOKEN is not set — all writes will fail");
        }
        Arc::new(HttpBlobStore::new(&config.blob)?)
    };

    let cdn = CdnClient::new(&config.cdn)?;
    if !cdn.is_configured() {
        tracing::warn!("Image CDN credentials not configured — photo cleanup on delete will fail open");
    }

    let verifier = VerificationClient::new(&config.verification)?;
    if !verifier.is_configured() {
        tracing::warn!("VERIFY_SECRET is not set — anti-bot verification passes open");
    }

    let state = AppState::new(config.clone(), blob, cdn, verifier);

    if args.repair_index {
        tracing::info!("Running index repair before startup...");
        let report = state.janitor.run_once().await?;
        tracing::info!(
            "Index repair finished: {} repaired out of {} scanned",
            report.repaired,
            report.scanned
        );
    }

    let cancel_token = CancellationToken::new();

    tracing::info!(
        "Starting index janitor... (interval={}s)",
        state.janitor.interval_secs()
    );
    let janitor = state.janitor.clone();
    let token = cancel_token.child_token();
    tokio::spawn(async move {
        loop {
            tokio::select! {
                _ = token.cancelled() => {
                    tracing::info!("Index janitor shutting down...");
                    break;
                }
                _ = tokio::time::sleep(tokio::time::Duration::from_secs(janitor.interval_secs())) => {
                    if let Err(e) = janitor.run_once().await {
                        tracing::error!("Index janitor error: {}", e);
                    }
                }
            }
        }
    });

    let app = create_router(state);

    let addr = format!("{}:{}", config.server.host, config.server.port);
    tracing::info!("Keepsake starting on http://{}", addr);
    tracing::info!("  Health check: http://{}/api/health", addr);
    tracing::info!("  API docs:     http://{}/api/docs", addr);
    tracing::info!("  OpenAPI spec: http://{}/api/openapi.json", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(cancel_token))
        .await?;

    Ok(())
}

async fn shutdown_signal(cancel_token: CancellationToken) {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received, cancelling background tasks...");
    cancel_token.cancel();
}
