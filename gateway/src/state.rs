//! Shared application state.

use std::sync::Arc;

use auroraa_core::{
    DefaultDocumentWatermarkService, DefaultImageWatermarkService, InMemoryWatermarkRepository,
    MetricsRegistry, PlainTextDocumentCodec, StaticIdentityLookup, WatermarkTunables,
};

use crate::config::GatewayConfig;

/// Shared state held by background tasks and request handlers.
///
/// Wrapped in an [`Arc`] and passed to request handlers via Axum's `State`
/// extractor.
pub struct AppState {
    /// Image watermark embed/verify/revoke orchestration.
    pub image_service: DefaultImageWatermarkService,
    /// Document watermark embed/verify orchestration.
    pub document_service: DefaultDocumentWatermarkService,
    /// Owner display-name lookup, standing in for an HTTP-backed identity
    /// service.
    pub identity: StaticIdentityLookup,
    /// Metrics registry shared between the embed/verify handlers and the
    /// `/metrics` exporter.
    pub metrics: Arc<MetricsRegistry>,
}

impl AppState {
    pub fn new(config: &GatewayConfig, metrics: Arc<MetricsRegistry>) -> Self {
        let image_service = DefaultImageWatermarkService::new(
            config.secret.clone(),
            WatermarkTunables::default(),
            InMemoryWatermarkRepository::new(),
        );
        let document_service =
            DefaultDocumentWatermarkService::new(config.secret.clone(), PlainTextDocumentCodec::new());

        Self {
            image_service,
            document_service,
            identity: StaticIdentityLookup::new(),
            metrics,
        }
    }
}

/// Thread-safe alias for `AppState`.
pub type SharedState = Arc<AppState>;
