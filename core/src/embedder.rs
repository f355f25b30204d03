//! Embedder (C3): modulates the identity signal into mid-frequency DCT
//! coefficients of permuted 8x8 blocks across the `LL`, `LH`, and `HL`
//! Haar sub-bands, then re-encodes as JPEG.

use crate::config::{AuroraaSecret, WatermarkTunables};
use crate::error::CoreError;
use crate::key_schedule;
use crate::transform::{self, dct, dwt};

/// Embeds the identity signal for `(owner_id, epoch)` into `image_bytes`,
/// returning baseline JPEG bytes at quality 92.
///
/// Deterministic: the same inputs always produce byte-identical output.
pub fn embed(
    image_bytes: &[u8],
    owner_id: &str,
    epoch: &str,
    secret: &AuroraaSecret,
    tunables: &WatermarkTunables,
) -> Result<Vec<u8>, CoreError> {
    let canon = transform::decode_and_normalize(
        image_bytes,
        tunables.canonical_dim,
        tunables.min_source_dim,
    )?;

    let mut bands = dwt::forward_haar(&canon.luma, canon.dim as usize);
    let band_dim = bands.dim as u32;

    let signal = key_schedule::derive_signal(secret, owner_id, epoch, tunables.signal_len)?;
    let seed = key_schedule::derive_seed(secret, owner_id, epoch)?;
    let permutation = key_schedule::permute_blocks(band_dim, band_dim, seed)?;

    let needed = tunables.required_blocks();
    let available = permutation.len() * 3;
    if available < needed {
        return Err(CoreError::Capacity { needed, available });
    }

    let band_dim = band_dim as usize;
    let mut b = 0usize;
    let mut r = 0usize;

    'bands: for (plane, strength) in [
        (&mut bands.ll, tunables.strength),
        (&mut bands.lh, tunables.strength * 0.7),
        (&mut bands.hl, tunables.strength * 0.7),
    ] {
        for &(i, j) in &permutation {
            if b == tunables.signal_len {
                break 'bands;
            }

            let (i, j) = (i as usize, j as usize);
            let mut block = [[0f32; 8]; 8];
            for y in 0..8 {
                for x in 0..8 {
                    block[y][x] = plane[(i + y) * band_dim + (j + x)];
                }
            }

            let mut coeffs = dct::dct2d(&block);
            let s = signal[b];
            coeffs[3][3] += strength * s;
            coeffs[2][4] -= strength * s;
            let spatial = dct::idct2d(&coeffs);

            for y in 0..8 {
                for x in 0..8 {
                    plane[(i + y) * band_dim + (j + x)] = spatial[y][x];
                }
            }

            r += 1;
            if r == tunables.repeat {
                r = 0;
                b += 1;
            }
        }
    }

    let luma = dwt::inverse_haar(&bands);
    transform::reconstruct_and_encode(&canon, &luma)
}
