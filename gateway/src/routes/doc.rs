use axum::Json;
use axum::extract::{Multipart, State};
use axum::http::{HeaderMap, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use serde::Serialize;

use crate::routes::{self, ErrorBody};
use crate::state::SharedState;

const ALGORITHM_VERSION: &str = auroraa_core::ALGORITHM_VERSION;

#[derive(Serialize)]
pub struct DocVerifyResponse {
    pub verified: bool,
    pub confidence: f32,
    pub watermark_id: Option<String>,
}

async fn read_single_field(multipart: &mut Multipart) -> Result<Vec<u8>, Response> {
    while let Ok(Some(field)) = multipart.next_field().await {
        if let Ok(b) = field.bytes().await {
            return Ok(b.to_vec());
        }
    }
    Err((
        StatusCode::BAD_REQUEST,
        Json(ErrorBody {
            error: "no file field in multipart body".to_string(),
        }),
    )
        .into_response())
}

/// `POST /watermark/embed/doc` — multipart PDF or DOCX (modeled here as
/// plain text via [`auroraa_core::PlainTextDocumentCodec`]). Returns the
/// modified document with `X-Watermark-ID` and `X-Algorithm-Version`.
pub async fn embed_doc(
    State(state): State<SharedState>,
    headers: HeaderMap,
    mut multipart: Multipart,
) -> Response {
    let owner_id = match routes::require_owner(&headers) {
        Ok(id) => id,
        Err(err) => return err.into_response(),
    };
    let bytes = match read_single_field(&mut multipart).await {
        Ok(b) => b,
        Err(resp) => return resp,
    };

    let result = tokio::task::spawn_blocking({
        let state = state.clone();
        move || {
            state
                .document_service
                .embed_doc(&bytes, &owner_id, ALGORITHM_VERSION)
        }
    })
    .await;

    let outcome = match result {
        Ok(Ok(outcome)) => outcome,
        Ok(Err(core_err)) => {
            let (status, body) = routes::core_error_response(core_err);
            return (status, body).into_response();
        }
        Err(join_err) => {
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorBody {
                    error: format!("document embed task panicked: {join_err}"),
                }),
            )
                .into_response();
        }
    };

    let mut response = (StatusCode::OK, outcome.bytes).into_response();
    let response_headers = response.headers_mut();
    response_headers.insert("content-type", HeaderValue::from_static("text/plain"));
    if let Ok(v) = HeaderValue::from_str(&outcome.watermark_id) {
        response_headers.insert("X-Watermark-ID", v);
    }
    if let Ok(v) = HeaderValue::from_str(&outcome.algorithm_version) {
        response_headers.insert("X-Algorithm-Version", v);
    }
    response
}

/// `POST /watermark/verify/doc` — multipart PDF or DOCX. Returns
/// `{verified, confidence, watermark_id}`.
pub async fn verify_doc(
    State(state): State<SharedState>,
    headers: HeaderMap,
    mut multipart: Multipart,
) -> Response {
    let owner_id = match routes::require_owner(&headers) {
        Ok(id) => id,
        Err(err) => return err.into_response(),
    };
    let bytes = match read_single_field(&mut multipart).await {
        Ok(b) => b,
        Err(resp) => return resp,
    };

    let result = tokio::task::spawn_blocking({
        let state = state.clone();
        move || {
            state
                .document_service
                .verify_doc(&bytes, &owner_id, ALGORITHM_VERSION)
        }
    })
    .await;

    let outcome = match result {
        Ok(Ok(outcome)) => outcome,
        Ok(Err(core_err)) => {
            let (status, body) = routes::core_error_response(core_err);
            return (status, body).into_response();
        }
        Err(join_err) => {
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorBody {
                    error: format!("document verify task panicked: {join_err}"),
                }),
            )
                .into_response();
        }
    };

    Json(DocVerifyResponse {
        verified: outcome.verified,
        confidence: outcome.confidence,
        watermark_id: outcome.watermark_id,
    })
    .into_response()
}
