//! Verifier (C5): repetition-averages extractor deltas, normalizes, and
//! correlates against the regenerated expected signal for each epoch in
//! the search window, reporting the best-scoring epoch.

use crate::config::{AuroraaSecret, WatermarkTunables};
use crate::epoch;
use crate::error::CoreError;
use crate::extractor;
use crate::key_schedule;

/// Four-valued ordinal verification status, derived from the correlation
/// score via monotone thresholds.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum VerificationStatus {
    Verified,
    Most,
    Likely,
    NotVerified,
}

/// Result of a single verification call.
#[derive(Clone, Debug)]
pub struct VerificationOutcome {
    pub verified: bool,
    /// Cosine-similarity confidence in `[0, 1]`.
    pub confidence: f32,
    pub status: VerificationStatus,
    /// Present only when `status == Verified` (self-verification claim).
    pub owner_id: Option<String>,
    pub watermark_id: Option<String>,
    /// The best-scoring epoch in the search window, if any candidate
    /// produced usable deltas.
    pub epoch: Option<String>,
    pub reason: Option<String>,
}

/// Verifies `image_bytes` against the identity signal for `owner_id`,
/// searching `tunables.epoch_window` epochs starting from the current
/// one.
///
/// Never raises on low confidence: a candidate image that decodes but
/// does not correlate returns `NotVerified` with the measured score, not
/// an error. Only a structurally undecodable candidate image raises
/// [`CoreError::Decode`].
pub fn verify(
    image_bytes: &[u8],
    owner_id: &str,
    secret: &AuroraaSecret,
    tunables: &WatermarkTunables,
) -> Result<VerificationOutcome, CoreError> {
    let candidates = epoch::previous_epochs(tunables.epoch_window);

    let mut best_score = 0.0f32;
    let mut best_epoch: Option<String> = None;

    for candidate_epoch in &candidates {
        let score = score_epoch(image_bytes, owner_id, candidate_epoch, secret, tunables)?;
        if best_epoch.is_none() || score > best_score {
            best_score = score;
            best_epoch = Some(candidate_epoch.clone());
        }
    }

    let status = status_for_score(best_score, tunables);
    let verified = status != VerificationStatus::NotVerified;

    Ok(VerificationOutcome {
        verified,
        confidence: best_score,
        status,
        owner_id: if status == VerificationStatus::Verified {
            Some(owner_id.to_string())
        } else {
            None
        },
        watermark_id: None,
        epoch: best_epoch,
        reason: None,
    })
}

/// Decode failure for the *candidate image itself* is surfaced here as an
/// error (the 400 path at the HTTP layer); a failure to recover enough
/// deltas for one particular epoch is scored as 0 and does not propagate.
fn score_epoch(
    image_bytes: &[u8],
    owner_id: &str,
    candidate_epoch: &str,
    secret: &AuroraaSecret,
    tunables: &WatermarkTunables,
) -> Result<f32, CoreError> {
    let deltas = match extractor::extract_deltas(
        image_bytes,
        owner_id,
        candidate_epoch,
        secret,
        tunables,
    ) {
        Ok(d) => d,
        Err(CoreError::Decode(msg)) => return Err(CoreError::Decode(msg)),
        Err(CoreError::Capacity { needed, available }) => {
            return Err(CoreError::Capacity { needed, available });
        }
        Err(_) => return Ok(0.0),
    };

    let band_len = tunables.required_blocks();
    let mut per_band_decoded: Vec<Vec<f32>> = Vec::new();
    for chunk in deltas.chunks(band_len) {
        if chunk.len() < band_len {
            continue;
        }
        per_band_decoded.push(average_groups(chunk, tunables.repeat));
    }

    if per_band_decoded.is_empty() {
        return Ok(0.0);
    }

    let l = tunables.signal_len;
    let mut decoded = vec![0f32; l];
    for band in &per_band_decoded {
        for i in 0..l {
            decoded[i] += band[i];
        }
    }
    for v in decoded.iter_mut() {
        *v /= per_band_decoded.len() as f32;
    }

    let expected = key_schedule::derive_signal(secret, owner_id, candidate_epoch, l)?;

    let score = cosine_similarity(&normalize(&decoded), &normalize(&expected));
    Ok(score.clamp(-1.0, 1.0).max(0.0))
}

/// Averages a flat slice of length `len * repeat` into `len` groups of
/// `repeat` elements each.
fn average_groups(deltas: &[f32], repeat: usize) -> Vec<f32> {
    deltas
        .chunks(repeat)
        .map(|group| group.iter().sum::<f32>() / group.len() as f32)
        .collect()
}

/// Zero-mean, unit-variance normalization with an epsilon-stabilized
/// denominator.
fn normalize(v: &[f32]) -> Vec<f32> {
    const EPS: f32 = 1e-6;
    let mean = v.iter().sum::<f32>() / v.len() as f32;
    let variance = v.iter().map(|x| (x - mean).powi(2)).sum::<f32>() / v.len() as f32;
    let std_dev = variance.sqrt();
    v.iter().map(|x| (x - mean) / (std_dev + EPS)).collect()
}

fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    const EPS: f32 = 1e-6;
    let dot: f32 = a.iter().zip(b).map(|(x, y)| x * y).sum();
    let norm_a = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b = b.iter().map(|x| x * x).sum::<f32>().sqrt();
    dot / (norm_a * norm_b + EPS)
}

fn status_for_score(score: f32, tunables: &WatermarkTunables) -> VerificationStatus {
    if score >= tunables.threshold_verified {
        VerificationStatus::Verified
    } else if score >= tunables.threshold_most {
        VerificationStatus::Most
    } else if score >= tunables.threshold_likely {
        VerificationStatus::Likely
    } else {
        VerificationStatus::NotVerified
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::embedder;

    fn secret() -> AuroraaSecret {
        AuroraaSecret::new(vec![9u8; 32]).unwrap()
    }

    fn tunables() -> WatermarkTunables {
        WatermarkTunables {
            canonical_dim: 128,
            min_source_dim: 16,
            signal_len: 16,
            repeat: 8,
            strength: 50.0,
            epoch_window: 4,
            ..WatermarkTunables::default()
        }
    }

    fn solid_png(dim: u32, shade: u8) -> Vec<u8> {
        let mut img = image::RgbImage::new(dim, dim);
        for px in img.pixels_mut() {
            *px = image::Rgb([shade, shade, shade]);
        }
        let mut out = Vec::new();
        let mut cursor = std::io::Cursor::new(&mut out);
        image::DynamicImage::ImageRgb8(img)
            .write_to(&mut cursor, image::ImageFormat::Png)
            .unwrap();
        out
    }

    #[test]
    fn self_verify_succeeds() {
        let t = tunables();
        let s = secret();
        let embedded = embedder::embed(&solid_png(128, 128), "u1", "2025-Q1", &s, &t).unwrap();
        let outcome = verify(&embedded, "u1", &s, &t).unwrap();
        assert!(
            matches!(outcome.status, VerificationStatus::Verified | VerificationStatus::Most),
            "status was {:?}, confidence {}",
            outcome.status,
            outcome.confidence
        );
        assert!(outcome.confidence >= 0.70);
    }

    #[test]
    fn wrong_owner_is_not_verified() {
        let t = tunables();
        let s = secret();
        let embedded = embedder::embed(&solid_png(128, 128), "u1", "2025-Q1", &s, &t).unwrap();
        let outcome = verify(&embedded, "u2", &s, &t).unwrap();
        assert_eq!(outcome.status, VerificationStatus::NotVerified);
        assert!(outcome.confidence < 0.55);
    }

    #[test]
    fn verified_status_surfaces_owner_id() {
        let t = tunables();
        let s = secret();
        let embedded = embedder::embed(&solid_png(128, 128), "u1", "2025-Q1", &s, &t).unwrap();
        let outcome = verify(&embedded, "u1", &s, &t).unwrap();
        if outcome.status == VerificationStatus::Verified {
            assert_eq!(outcome.owner_id.as_deref(), Some("u1"));
        } else {
            assert!(outcome.owner_id.is_none());
        }
    }

    #[test]
    fn decode_failure_on_candidate_propagates_as_error() {
        let t = tunables();
        let s = secret();
        let err = verify(b"not an image", "u1", &s, &t).unwrap_err();
        assert_eq!(err.kind(), crate::error::ErrorKind::Decode);
    }
}
