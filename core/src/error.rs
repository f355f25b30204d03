//! Error types surfaced by the watermarking core.
//!
//! All fallible operations in this crate return [`CoreError`]. Callers that
//! need to pick an HTTP status code (or otherwise branch on error class)
//! should match on [`CoreError::kind`] rather than the variant itself, since
//! new variants may be added within an existing [`ErrorKind`].

use thiserror::Error;

/// Coarse-grained classification of a [`CoreError`], used by callers (e.g.
/// the HTTP gateway) to decide how to respond without matching on every
/// concrete variant.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ErrorKind {
    /// Secret missing or malformed at startup. Not locally recoverable.
    Config,
    /// Input bytes could not be decoded as an image.
    Decode,
    /// The transformed image could not be re-encoded.
    Encode,
    /// Canonical image is too small to hold `L * R` blocks.
    Capacity,
    /// Fewer than `L * R` coefficient deltas were recovered.
    Extraction,
    /// The watermark repository failed an insert/delete/lookup.
    Repository,
    /// Missing or invalid caller credentials.
    Auth,
    /// Content type not supported by this service.
    UnsupportedMime,
}

/// Errors produced by the key schedule, transform pipeline, embedder,
/// extractor, verifier, document channel, and image service orchestration.
#[derive(Error, Debug)]
pub enum CoreError {
    /// The process-wide HMAC secret is absent or shorter than 32 bytes.
    #[error("watermark secret is missing or too short: {0}")]
    Config(String),

    /// Input bytes are not a decodable image in any format supported by
    /// the underlying `image` crate.
    #[error("could not decode input as an image: {0}")]
    Decode(String),

    /// Re-encoding the reconstructed image as JPEG failed.
    #[error("failed to encode watermarked image: {0}")]
    Encode(String),

    /// The canonical image does not have enough 8x8 blocks across the
    /// active sub-bands to hold `L * R` repetition-coded signal bits.
    #[error("image too small: need at least {needed} blocks across active bands, found {available}")]
    Capacity {
        /// Blocks required (`L * R`).
        needed: usize,
        /// Blocks actually available across the active sub-bands.
        available: usize,
    },

    /// Fewer than `L * R` coefficient deltas were recovered from the
    /// candidate image during extraction.
    #[error("insufficient coefficient deltas recovered: needed {needed}, got {got}")]
    Extraction {
        /// Deltas required (`L * R`).
        needed: usize,
        /// Deltas actually recovered.
        got: usize,
    },

    /// The watermark repository failed to insert, delete, or look up a
    /// record.
    #[error("watermark repository error: {0}")]
    Repository(String),

    /// Caller credentials were missing or invalid.
    #[error("authentication failed: {0}")]
    Auth(String),

    /// The declared MIME type is not one this service handles.
    #[error("unsupported content type: {0}")]
    UnsupportedMime(String),

    /// The document envelope's HMAC signature did not verify.
    #[error("document signature mismatch")]
    BadSignature,

    /// The document envelope's `uid` did not match the claimed owner.
    #[error("document owner mismatch")]
    OwnerMismatch,

    /// The document envelope's `alg` did not match the expected algorithm
    /// version.
    #[error("document algorithm version mismatch")]
    VersionMismatch,

    /// No `"WM1|"` frame magic was found in the decoded bit stream.
    #[error("no watermark frame found in document")]
    NoFrame,

    /// The frame's declared payload length was out of the accepted range
    /// or did not match the recovered byte count.
    #[error("invalid watermark frame length: {0}")]
    BadLength(String),

    /// The recovered frame bytes were not valid UTF-8.
    #[error("watermark frame payload was not valid UTF-8")]
    BadUtf8,
}

impl CoreError {
    /// Returns the coarse [`ErrorKind`] for this error, for status-code
    /// mapping at the HTTP layer.
    pub fn kind(&self) -> ErrorKind {
        match self {
            CoreError::Config(_) => ErrorKind::Config,
            CoreError::Decode(_) => ErrorKind::Decode,
            CoreError::Encode(_) => ErrorKind::Encode,
            CoreError::Capacity { .. } => ErrorKind::Capacity,
            CoreError::Extraction { .. } => ErrorKind::Extraction,
            CoreError::Repository(_) => ErrorKind::Repository,
            CoreError::Auth(_) => ErrorKind::Auth,
            CoreError::UnsupportedMime(_) => ErrorKind::UnsupportedMime,
            CoreError::BadSignature
            | CoreError::OwnerMismatch
            | CoreError::VersionMismatch
            | CoreError::NoFrame
            | CoreError::BadLength(_)
            | CoreError::BadUtf8 => ErrorKind::Decode,
        }
    }
}

/// Reason a document watermark failed verification, exposed to callers as
/// `VerificationOutcome::reason` (see [`crate::document::DocVerificationOutcome`]).
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum DocRejectReason {
    NoFrame,
    BadLength,
    BadUtf8,
    BadSignature,
    OwnerMismatch,
    VersionMismatch,
}

impl std::fmt::Display for DocRejectReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            DocRejectReason::NoFrame => "NoFrame",
            DocRejectReason::BadLength => "BadLength",
            DocRejectReason::BadUtf8 => "BadUtf8",
            DocRejectReason::BadSignature => "BadSignature",
            DocRejectReason::OwnerMismatch => "OwnerMismatch",
            DocRejectReason::VersionMismatch => "VersionMismatch",
        };
        f.write_str(s)
    }
}

impl TryFrom<&CoreError> for DocRejectReason {
    type Error = ();

    fn try_from(e: &CoreError) -> Result<Self, Self::Error> {
        match e {
            CoreError::NoFrame => Ok(DocRejectReason::NoFrame),
            CoreError::BadLength(_) => Ok(DocRejectReason::BadLength),
            CoreError::BadUtf8 => Ok(DocRejectReason::BadUtf8),
            CoreError::BadSignature => Ok(DocRejectReason::BadSignature),
            CoreError::OwnerMismatch => Ok(DocRejectReason::OwnerMismatch),
            CoreError::VersionMismatch => Ok(DocRejectReason::VersionMismatch),
            _ => Err(()),
        }
    }
}
