//! Image service orchestration (C9): composes the key schedule, transform
//! pipeline, embedder, extractor, verifier, and epoch policy with the
//! repository port, applying the compensating-write discipline described
//! in the concurrency model.

use crate::config::{AuroraaSecret, WatermarkTunables};
use crate::embedder;
use crate::epoch;
use crate::error::CoreError;
use crate::ports::WatermarkRepository;
use crate::record::{ContentType, RecordStatus, WatermarkRecord};
use crate::verifier::{self, VerificationOutcome};

/// Result of a successful embed call.
pub struct EmbedOutcome {
    pub jpeg_bytes: Vec<u8>,
    pub watermark_id: String,
    pub owner_id: String,
    pub epoch: String,
}

/// Algorithm version tag recorded on every [`WatermarkRecord`] this
/// service creates.
pub const ALGORITHM_VERSION: &str = "v3-continuous";

/// Ties the image watermarking algorithm to a [`WatermarkRepository`].
///
/// Generic over the repository implementation so tests and the demo
/// gateway can share the same orchestration logic against either the
/// in-memory adapter or a future SQL-backed one.
pub struct ImageWatermarkService<R: WatermarkRepository> {
    secret: AuroraaSecret,
    tunables: WatermarkTunables,
    repository: R,
}

impl<R: WatermarkRepository> ImageWatermarkService<R> {
    pub fn new(secret: AuroraaSecret, tunables: WatermarkTunables, repository: R) -> Self {
        Self {
            secret,
            tunables,
            repository,
        }
    }

    /// Embeds an identity watermark into `bytes` for `owner_id`.
    ///
    /// Applies the compensating-write discipline: a `WatermarkRecord`
    /// with `status = active` is inserted *before* the transform runs; if
    /// the transform fails, the record is deleted before the error is
    /// returned, so callers are guaranteed that either a valid
    /// watermarked artifact is returned or no record persists.
    pub fn embed(
        &self,
        bytes: &[u8],
        owner_id: &str,
        mime_type: &str,
    ) -> Result<EmbedOutcome, CoreError> {
        if !mime_type.starts_with("image/") {
            return Err(CoreError::UnsupportedMime(mime_type.to_string()));
        }

        let epoch = epoch::current_epoch();

        let record = WatermarkRecord::new(
            owner_id,
            ContentType::Image,
            mime_type,
            ALGORITHM_VERSION,
        );
        let watermark_id = record.id.clone();

        self.repository
            .insert(record)
            .map_err(|e| CoreError::Repository(e.to_string()))?;

        match embedder::embed(bytes, owner_id, &epoch, &self.secret, &self.tunables) {
            Ok(jpeg_bytes) => {
                tracing::info!(
                    watermark_id = %watermark_id,
                    owner_id = %owner_id,
                    epoch = %epoch,
                    "embedded watermark"
                );
                Ok(EmbedOutcome {
                    jpeg_bytes,
                    watermark_id,
                    owner_id: owner_id.to_string(),
                    epoch,
                })
            }
            Err(embed_err) => {
                if let Err(delete_err) = self.repository.delete(&watermark_id) {
                    tracing::warn!(
                        watermark_id = %watermark_id,
                        error = %delete_err,
                        "failed to compensate watermark record after embed failure"
                    );
                }
                tracing::warn!(owner_id = %owner_id, error = %embed_err, "embed failed");
                Err(embed_err)
            }
        }
    }

    /// Verifies `bytes` against `owner_id`'s identity signal.
    ///
    /// Never raises on low confidence (returns `not_verified`); only
    /// raises on a structural failure of the *candidate* image itself
    /// (e.g. undecodable bytes), which the HTTP layer surfaces as 400.
    pub fn verify(&self, bytes: &[u8], owner_id: &str) -> Result<VerificationOutcome, CoreError> {
        let outcome = verifier::verify(bytes, owner_id, &self.secret, &self.tunables)?;
        if !outcome.verified {
            tracing::info!(
                owner_id = %owner_id,
                confidence = outcome.confidence,
                "verification did not meet threshold"
            );
        }
        Ok(outcome)
    }

    /// Marks a watermark record revoked without touching embedded content.
    pub fn revoke(&self, watermark_id: &str) -> Result<(), CoreError> {
        let mut record = self
            .repository
            .find_by(watermark_id)
            .map_err(|e| CoreError::Repository(e.to_string()))?
            .ok_or_else(|| CoreError::Repository("record not found".to_string()))?;
        record.status = RecordStatus::Revoked;
        self.repository
            .delete(watermark_id)
            .map_err(|e| CoreError::Repository(e.to_string()))?;
        self.repository
            .insert(record)
            .map_err(|e| CoreError::Repository(e.to_string()))?;
        Ok(())
    }
}
