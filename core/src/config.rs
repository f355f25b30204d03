//! Top-level configuration for the watermarking core.
//!
//! This module aggregates:
//!
//! - the process-wide HMAC secret (`AuroraaSecret`), loaded once at startup;
//! - tunable algorithm parameters (`WatermarkTunables`), which are code
//!   constants with a `Default` impl but may be overridden for tests.
//!
//! Absence or malformation of the secret is treated as a fatal startup
//! error, mirroring the "absence is fatal" posture of a node's own
//! configuration loading.

use crate::error::CoreError;

/// Minimum number of bytes the watermark secret must have to be accepted.
pub const MIN_SECRET_LEN: usize = 32;

/// Environment variable that holds the watermark HMAC secret.
pub const SECRET_ENV_VAR: &str = "AURORAA_WATERMARK_SECRET";

/// The process-wide HMAC key `K` used to parameterise all keyed
/// derivations (signal generation, block permutation seeding, document
/// envelope signing).
///
/// This type never implements `Debug` or `Display` so the secret cannot
/// accidentally end up in a log line or error message.
#[derive(Clone)]
pub struct AuroraaSecret(Vec<u8>);

impl AuroraaSecret {
    /// Builds a secret from raw bytes, rejecting anything shorter than
    /// [`MIN_SECRET_LEN`].
    pub fn new(bytes: impl Into<Vec<u8>>) -> Result<Self, CoreError> {
        let bytes = bytes.into();
        if bytes.len() < MIN_SECRET_LEN {
            return Err(CoreError::Config(format!(
                "watermark secret must be at least {MIN_SECRET_LEN} bytes, got {}",
                bytes.len()
            )));
        }
        Ok(Self(bytes))
    }

    /// Loads the secret from [`SECRET_ENV_VAR`].
    ///
    /// Absence of the variable, or a value shorter than [`MIN_SECRET_LEN`]
    /// bytes, is a fatal [`CoreError::Config`].
    pub fn from_env() -> Result<Self, CoreError> {
        let raw = std::env::var(SECRET_ENV_VAR).map_err(|_| {
            CoreError::Config(format!("{SECRET_ENV_VAR} is not set"))
        })?;
        Self::new(raw.into_bytes())
    }

    /// Returns the raw secret bytes, for use by [`crate::key_schedule`] only.
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

/// Tunable algorithm parameters for the image watermarking pipeline.
///
/// These are code constants in the distilled design (see
/// [`WatermarkTunables::default`]) but are represented as a struct so
/// tests can construct smaller/faster variants without touching call
/// sites.
#[derive(Clone, Copy, Debug)]
pub struct WatermarkTunables {
    /// Canonical square side length images are resized to before any
    /// transform runs.
    pub canonical_dim: u32,
    /// Minimum source (pre-resize) dimension; images smaller than this on
    /// either axis are rejected with `CapacityError` before any transform
    /// work is attempted.
    ///
    /// The default is half of `canonical_dim`: the resize to
    /// `canonical_dim` is unconditional, so without this floor a tiny
    /// source would be silently upscaled into an artifact with plenty of
    /// nominal block capacity but no real signal to carry it.
    pub min_source_dim: u32,
    /// Identity signal length `L`.
    pub signal_len: usize,
    /// Repetition factor `R`: number of blocks each signal element is
    /// spread across.
    pub repeat: usize,
    /// Base modulation strength `S`, applied to the `LL` sub-band.
    pub strength: f32,
    /// Score at or above which the verifier reports `verified`.
    pub threshold_verified: f32,
    /// Score at or above which the verifier reports `most`.
    pub threshold_most: f32,
    /// Score at or above which the verifier reports `likely`.
    pub threshold_likely: f32,
    /// Number of epochs (current plus prior) the verifier searches.
    pub epoch_window: usize,
}

impl Default for WatermarkTunables {
    fn default() -> Self {
        Self {
            canonical_dim: 1024,
            min_source_dim: 512,
            signal_len: 128,
            repeat: 40,
            strength: 50.0,
            threshold_verified: 0.85,
            threshold_most: 0.70,
            threshold_likely: 0.55,
            epoch_window: 4,
        }
    }
}

impl WatermarkTunables {
    /// Total coefficient deltas required across all active sub-bands
    /// (`L * R`).
    pub fn required_blocks(&self) -> usize {
        self.signal_len * self.repeat
    }
}

/// Repetition factor for the document channel's bit-level redundancy
/// coding, independent of the image pipeline's `R`.
pub const DOC_REPEAT: usize = 6;

/// Frame magic prefix for the document channel.
pub const DOC_FRAME_MAGIC: &str = "WM1|";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn secret_rejects_short_input() {
        let err = AuroraaSecret::new(vec![0u8; 16]).unwrap_err();
        assert_eq!(err.kind(), crate::error::ErrorKind::Config);
    }

    #[test]
    fn secret_accepts_32_bytes() {
        assert!(AuroraaSecret::new(vec![0u8; 32]).is_ok());
    }

    #[test]
    fn default_tunables_satisfy_default_capacity() {
        let t = WatermarkTunables::default();
        assert_eq!(t.required_blocks(), 128 * 40);
    }
}
