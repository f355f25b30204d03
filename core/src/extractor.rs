//! Extractor (C4): re-runs the transform pipeline and samples the same
//! permuted blocks as the embedder to recover coefficient deltas.
//!
//! The extractor is agnostic to the expected signal; it has no notion of
//! "correct" or "incorrect" and simply reports what it measured. Scoring
//! against an expected signal is the verifier's job (C5).

use crate::config::{AuroraaSecret, WatermarkTunables};
use crate::error::CoreError;
use crate::key_schedule;
use crate::transform::{self, dct, dwt};

/// Recovers the sequence of `DCT[3,3] - DCT[2,4]` coefficient deltas from
/// `image_bytes`, sampling the same `(owner_id, epoch)`-seeded block
/// permutation the embedder used.
///
/// Returns `ExtractionError` if fewer than `L * R` deltas were collected
/// across all three active sub-bands.
pub fn extract_deltas(
    image_bytes: &[u8],
    owner_id: &str,
    epoch: &str,
    secret: &AuroraaSecret,
    tunables: &WatermarkTunables,
) -> Result<Vec<f32>, CoreError> {
    let canon = transform::decode_and_normalize(
        image_bytes,
        tunables.canonical_dim,
        tunables.min_source_dim,
    )?;

    let bands = dwt::forward_haar(&canon.luma, canon.dim as usize);
    let band_dim = bands.dim as u32;

    let seed = key_schedule::derive_seed(secret, owner_id, epoch)?;
    let permutation = key_schedule::permute_blocks(band_dim, band_dim, seed)?;
    let band_dim = band_dim as usize;

    let cap = tunables.signal_len * tunables.repeat * 3;
    let needed = tunables.required_blocks();

    let mut deltas = Vec::new();
    for plane in [&bands.ll, &bands.lh, &bands.hl] {
        for &(i, j) in &permutation {
            if deltas.len() == cap {
                break;
            }
            let (i, j) = (i as usize, j as usize);
            let mut block = [[0f32; 8]; 8];
            for y in 0..8 {
                for x in 0..8 {
                    block[y][x] = plane[(i + y) * band_dim + (j + x)];
                }
            }
            let coeffs = dct::dct2d(&block);
            deltas.push(coeffs[3][3] - coeffs[2][4]);
        }
    }

    if deltas.len() < needed {
        return Err(CoreError::Extraction {
            needed,
            got: deltas.len(),
        });
    }

    Ok(deltas)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::embedder;

    fn secret() -> AuroraaSecret {
        AuroraaSecret::new(vec![3u8; 32]).unwrap()
    }

    fn small_tunables() -> WatermarkTunables {
        WatermarkTunables {
            canonical_dim: 64,
            min_source_dim: 16,
            signal_len: 8,
            repeat: 4,
            strength: 50.0,
            ..WatermarkTunables::default()
        }
    }

    fn solid_png(dim: u32) -> Vec<u8> {
        let mut img = image::RgbImage::new(dim, dim);
        for px in img.pixels_mut() {
            *px = image::Rgb([90, 100, 110]);
        }
        let mut out = Vec::new();
        let mut cursor = std::io::Cursor::new(&mut out);
        image::DynamicImage::ImageRgb8(img)
            .write_to(&mut cursor, image::ImageFormat::Png)
            .unwrap();
        out
    }

    #[test]
    fn extraction_recovers_at_least_required_deltas_from_embedded_image() {
        let t = small_tunables();
        let s = secret();
        let embedded = embedder::embed(&solid_png(64), "u1", "2025-Q1", &s, &t).unwrap();
        let deltas = extract_deltas(&embedded, "u1", "2025-Q1", &s, &t).unwrap();
        assert!(deltas.len() >= t.required_blocks());
    }

    #[test]
    fn extraction_fails_when_capacity_too_low() {
        let mut t = small_tunables();
        let s = secret();
        // Inflate the requirement far past what a 64x64 canonical image can hold.
        t.signal_len = 10_000;
        t.repeat = 10_000;
        let err = extract_deltas(&solid_png(64), "u1", "2025-Q1", &s, &t).unwrap_err();
        assert_eq!(err.kind(), crate::error::ErrorKind::Extraction);
    }
}
