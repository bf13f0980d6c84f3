//! Textract Gateway - HTTP wrapper around `textract` and `tesseract`.

mod config;
mod engine;
mod error;
mod gateway;
mod languages;
mod routes;
mod schema;
mod scratch;

use config::GatewayConfig;
use engine::{tesseract::TesseractCli, textract::TextractCli};
use gateway::Gateway;
use routes::AppState;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| "textract_gateway=debug,tower_http=debug".into()))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = GatewayConfig::from_env()?;
    info!(
        "Engines: textract={}, tesseract={}, timeout={:?}",
        config.textract_bin, config.tesseract_bin, config.extraction_timeout
    );

    let gateway = Gateway::new(
        Arc::new(TextractCli::new(config.textract_bin.clone())),
        Arc::new(TesseractCli::new(config.tesseract_bin.clone())),
    )
    .with_scratch_dir(config.scratch_dir.clone())
    .with_timeout(config.extraction_timeout);

    let app = routes::router(AppState { gateway }, &config)?;

    // Run server
    let addr = config.bind_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("Server listening on http://{}", addr);
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}

/// Resolves on Ctrl-C or SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl-C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to listen for SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received");
}
