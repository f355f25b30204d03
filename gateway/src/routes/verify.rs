use axum::Json;
use axum::extract::{Multipart, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use serde::Serialize;

use auroraa_core::VerificationStatus;

use crate::routes::{self, ErrorBody};
use crate::state::SharedState;

#[derive(Serialize)]
pub struct MessageBody {
    pub label: &'static str,
    pub message: &'static str,
}

#[derive(Serialize)]
pub struct OwnerBody {
    pub id: String,
}

#[derive(Serialize)]
pub struct VerifyResponse {
    pub verified: bool,
    pub confidence: f32,
    pub status: &'static str,
    pub message: MessageBody,
    pub issued_on: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub owner: Option<OwnerBody>,
}

fn status_label(status: VerificationStatus) -> (&'static str, &'static str, &'static str) {
    match status {
        VerificationStatus::Verified => (
            "verified",
            "verified",
            "The watermark signal correlates strongly with the claimed owner.",
        ),
        VerificationStatus::Most => (
            "most",
            "most_likely_genuine",
            "The watermark signal correlates well with the claimed owner.",
        ),
        VerificationStatus::Likely => (
            "likely",
            "likely_genuine",
            "The watermark signal shows a weak but positive correlation.",
        ),
        VerificationStatus::NotVerified => (
            "not_verified",
            "not_verified",
            "No watermark signal matching the claimed owner was found.",
        ),
    }
}

/// `POST /watermark/verify` — multipart file, authenticated. Never returns
/// a non-2xx status on a low-confidence candidate; only a structurally
/// undecodable candidate image surfaces as an error.
pub async fn verify(
    State(state): State<SharedState>,
    headers: HeaderMap,
    mut multipart: Multipart,
) -> Response {
    let owner_id = match routes::require_owner(&headers) {
        Ok(id) => id,
        Err(err) => return err.into_response(),
    };

    let mut bytes: Option<Vec<u8>> = None;
    while let Ok(Some(field)) = multipart.next_field().await {
        if let Ok(b) = field.bytes().await {
            bytes = Some(b.to_vec());
        }
    }

    let Some(bytes) = bytes else {
        return (
            StatusCode::BAD_REQUEST,
            Json(ErrorBody {
                error: "no file field in multipart body".to_string(),
            }),
        )
            .into_response();
    };

    let timer = state.metrics.watermark.verify_seconds.start_timer();
    let result = tokio::task::spawn_blocking({
        let state = state.clone();
        move || state.image_service.verify(&bytes, &owner_id)
    })
    .await;
    timer.observe_duration();

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
                    error: format!("verify task panicked: {join_err}"),
                }),
            )
                .into_response();
        }
    };

    let (status_key, label, message) = status_label(outcome.status);
    state
        .metrics
        .watermark
        .verify_outcomes_total
        .with_label_values(&[status_key])
        .inc();

    let owner = outcome.owner_id.map(|id| OwnerBody { id });

    Json(VerifyResponse {
        verified: outcome.verified,
        confidence: outcome.confidence,
        status: status_key,
        message: MessageBody { label, message },
        // The image pipeline regenerates the expected signal from the
        // owner id and epoch alone; a successful self-verification does
        // not require looking up the originating record, so no issuance
        // timestamp is available here.
        issued_on: None,
        owner,
    })
    .into_response()
}
