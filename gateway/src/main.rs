// gateway/src/main.rs

//! Watermark gateway binary.
//!
//! This binary exposes a small demonstration HTTP API on top of the
//! `auroraa-core` crate:
//!
//! - `GET /health`
//! - `POST /watermark/upload`
//! - `POST /watermark/verify`
//! - `POST /watermark/embed/doc`
//! - `POST /watermark/verify/doc`
//!
//! It embeds a `DefaultImageWatermarkService` and
//! `DefaultDocumentWatermarkService` (in-memory repository and plain-text
//! document codec), and runs a Prometheus metrics exporter on `/metrics`
//! both inline and on a standalone port.

mod config;
mod routes;
mod state;

use std::sync::Arc;

use axum::{
    Router,
    routing::{get, post},
};
use tokio::signal;

use auroraa_core::MetricsRegistry;
use config::GatewayConfig;
use routes::{doc, health, metrics as metrics_route, upload, verify};
use state::{AppState, SharedState};

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            std::env::var("RUST_LOG")
                .unwrap_or_else(|_| "auroraa_gateway=info,auroraa_core=info".to_string()),
        )
        .init();

    if let Err(e) = run().await {
        eprintln!("fatal error: {e}");
        std::process::exit(1);
    }
}

async fn run() -> Result<(), String> {
    let gateway_cfg =
        GatewayConfig::from_env().map_err(|e| format!("failed to load gateway config: {e}"))?;

    // ---------------------------
    // Metrics
    // ---------------------------

    let metrics = Arc::new(
        MetricsRegistry::new().map_err(|e| format!("failed to initialise metrics registry: {e}"))?,
    );

    {
        let metrics_clone = metrics.clone();
        let addr = gateway_cfg.metrics_addr;
        tokio::spawn(async move {
            if let Err(e) = auroraa_core::run_prometheus_http_server(metrics_clone, addr).await {
                eprintln!("metrics HTTP server error: {e}");
            }
        });
        tracing::info!("metrics exporter listening on http://{}/metrics", addr);
    }

    // ---------------------------
    // Shared state
    // ---------------------------

    let app_state: SharedState = Arc::new(AppState::new(&gateway_cfg, metrics));

    // ---------------------------
    // HTTP router
    // ---------------------------

    let app = Router::new()
        .route("/health", get(health::health))
        .route("/metrics", get(metrics_route::metrics))
        .route("/watermark/upload", post(upload::upload))
        .route("/watermark/verify", post(verify::verify))
        .route("/watermark/embed/doc", post(doc::embed_doc))
        .route("/watermark/verify/doc", post(doc::verify_doc))
        .with_state(app_state);

    tracing::info!(
        "watermark gateway listening on http://{}",
        gateway_cfg.listen_addr
    );

    let listener = tokio::net::TcpListener::bind(gateway_cfg.listen_addr)
        .await
        .map_err(|e| format!("failed to bind {}: {e}", gateway_cfg.listen_addr))?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| format!("gateway server error: {e}"))?;

    Ok(())
}

/// Waits for Ctrl-C and returns, used for graceful shutdown.
async fn shutdown_signal() {
    let _ = signal::ctrl_c().await;
    tracing::info!("shutdown signal received");
}
