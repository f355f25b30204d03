use axum::extract::{Multipart, State};
use axum::http::{HeaderMap, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};

use crate::routes::{self, ErrorBody};
use crate::state::SharedState;

/// `POST /watermark/upload` — multipart file, authenticated via the demo
/// `X-Owner-Id` header. Returns the watermarked JPEG body with
/// `X-Watermark-ID`, `X-Owner-ID`, and `X-Watermark-Epoch` headers.
pub async fn upload(
    State(state): State<SharedState>,
    headers: HeaderMap,
    mut multipart: Multipart,
) -> Response {
    let owner_id = match routes::require_owner(&headers) {
        Ok(id) => id,
        Err(err) => return err.into_response(),
    };

    let mut bytes: Option<Vec<u8>> = None;
    let mut mime_type = "application/octet-stream".to_string();

    while let Ok(Some(field)) = multipart.next_field().await {
        if let Some(ct) = field.content_type() {
            mime_type = ct.to_string();
        }
        match field.bytes().await {
            Ok(b) => bytes = Some(b.to_vec()),
            Err(e) => {
                return (
                    StatusCode::BAD_REQUEST,
                    axum::Json(ErrorBody {
                        error: format!("failed to read upload field: {e}"),
                    }),
                )
                    .into_response();
            }
        }
    }

    let Some(bytes) = bytes else {
        return (
            StatusCode::BAD_REQUEST,
            axum::Json(ErrorBody {
                error: "no file field in multipart body".to_string(),
            }),
        )
            .into_response();
    };

    let timer = state.metrics.watermark.embed_seconds.start_timer();
    let result = tokio::task::spawn_blocking({
        let state = state.clone();
        move || state.image_service.embed(&bytes, &owner_id, &mime_type)
    })
    .await;
    timer.observe_duration();

    let outcome = match result {
        Ok(Ok(outcome)) => outcome,
        Ok(Err(core_err)) => {
            state.metrics.watermark.embed_failures_total.inc();
            let (status, body) = routes::core_error_response(core_err);
            return (status, body).into_response();
        }
        Err(join_err) => {
            state.metrics.watermark.embed_failures_total.inc();
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                axum::Json(ErrorBody {
                    error: format!("embed task panicked: {join_err}"),
                }),
            )
                .into_response();
        }
    };

    let mut response = (StatusCode::OK, outcome.jpeg_bytes).into_response();
    let response_headers = response.headers_mut();
    response_headers.insert("content-type", HeaderValue::from_static("image/jpeg"));
    if let Ok(v) = HeaderValue::from_str(&outcome.watermark_id) {
        response_headers.insert("X-Watermark-ID", v);
    }
    if let Ok(v) = HeaderValue::from_str(&outcome.owner_id) {
        response_headers.insert("X-Owner-ID", v);
    }
    if let Ok(v) = HeaderValue::from_str(&outcome.epoch) {
        response_headers.insert("X-Watermark-Epoch", v);
    }
    response
}
