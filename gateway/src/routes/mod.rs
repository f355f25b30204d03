pub mod doc;
pub mod health;
pub mod metrics;
pub mod upload;
pub mod verify;

use axum::Json;
use axum::http::{HeaderMap, StatusCode};
use serde::Serialize;

use auroraa_core::{CoreError, ErrorKind};

/// Demo stand-in for a real session/auth layer: the caller's identity is
/// taken verbatim from the `X-Owner-Id` header. Not a production
/// authentication mechanism.
pub const OWNER_HEADER: &str = "X-Owner-Id";

#[derive(Serialize)]
pub struct ErrorBody {
    pub error: String,
}

/// Extracts the demo owner header, or a 401 if absent/empty.
///
/// Routed through [`CoreError::Auth`] and [`core_error_response`] rather
/// than building its own status/body pair, so every error path in the
/// gateway maps through the same `ErrorKind` table.
pub fn require_owner(headers: &HeaderMap) -> Result<String, (StatusCode, Json<ErrorBody>)> {
    headers
        .get(OWNER_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .ok_or_else(|| {
            core_error_response(CoreError::Auth(format!(
                "missing or empty {OWNER_HEADER} header"
            )))
        })
}

/// Maps a [`CoreError`] to an HTTP response per the error-kind table.
pub fn core_error_response(err: CoreError) -> (StatusCode, Json<ErrorBody>) {
    let status = match err.kind() {
        ErrorKind::Decode | ErrorKind::UnsupportedMime => StatusCode::BAD_REQUEST,
        ErrorKind::Auth => StatusCode::UNAUTHORIZED,
        ErrorKind::Encode
        | ErrorKind::Capacity
        | ErrorKind::Repository
        | ErrorKind::Config
        | ErrorKind::Extraction => StatusCode::INTERNAL_SERVER_ERROR,
    };
    (status, Json(ErrorBody { error: err.to_string() }))
}
