//! The `WatermarkRecord` data model, owned by the external store but
//! read/written by the core through the [`crate::ports::WatermarkRepository`]
//! port.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Content type a watermark record was created for.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentType {
    Image,
    Video,
    Audio,
    Document,
}

/// Lifecycle status of a [`WatermarkRecord`]. Transitions only
/// `Active -> Revoked`.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecordStatus {
    Active,
    Revoked,
}

/// A persisted watermark record.
///
/// `id` and `owner_id` are immutable once created. `algorithm_version` is
/// pinned at creation time and never migrated in place. `content_hash` and
/// `signature_hash` are vestigial fields from an earlier exact-match LSB
/// approach and are unused (always `None`) by the current algorithm.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct WatermarkRecord {
    pub id: String,
    pub owner_id: String,
    pub content_type: ContentType,
    pub mime_type: String,
    pub algorithm_version: String,
    pub status: RecordStatus,
    pub created_at: DateTime<Utc>,
    pub content_hash: Option<String>,
    pub signature_hash: Option<String>,
}

impl WatermarkRecord {
    /// Builds a new, active record with a fresh UUID v4 identifier and the
    /// current UTC timestamp.
    pub fn new(owner_id: impl Into<String>, content_type: ContentType, mime_type: impl Into<String>, algorithm_version: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            owner_id: owner_id.into(),
            content_type,
            mime_type: mime_type.into(),
            algorithm_version: algorithm_version.into(),
            status: RecordStatus::Active,
            created_at: Utc::now(),
            content_hash: None,
            signature_hash: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_record_is_active_with_36_char_id() {
        let rec = WatermarkRecord::new("u1", ContentType::Image, "image/png", "v3-continuous");
        assert_eq!(rec.status, RecordStatus::Active);
        assert_eq!(rec.id.len(), 36);
        assert!(rec.content_hash.is_none());
    }
}
