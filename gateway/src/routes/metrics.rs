use axum::extract::State;
use axum::http::{StatusCode, header};
use axum::response::{IntoResponse, Response};

use crate::state::SharedState;

/// `GET /metrics` — Prometheus text exposition, served inline on the main
/// router in addition to the standalone exporter in [`auroraa_core::metrics`].
pub async fn metrics(State(state): State<SharedState>) -> Response {
    let body = state.metrics.gather_text();
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        body,
    )
        .into_response()
}
