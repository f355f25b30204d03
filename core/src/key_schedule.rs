//! Key schedule: derives per-owner, per-epoch signals and block
//! permutations from the process-wide secret.
//!
//! Every derivation here is a pure function of `(secret, owner_id, epoch)`
//! (and, for permutations, the sub-band dimensions). Nothing is cached or
//! persisted: callers recompute on demand.

use hmac::{Hmac, Mac};
use rand::SeedableRng;
use rand::seq::SliceRandom;
use rand_chacha::ChaCha8Rng;
use sha2::Sha256;

use crate::config::AuroraaSecret;
use crate::error::CoreError;

type HmacSha256 = Hmac<Sha256>;

/// Derives the bipolar (-1/+1) identity signal for `(owner_id, epoch)`.
///
/// `digest = HMAC-SHA256(K, "AURORAA|" || owner_id || "|" || epoch)` is
/// treated as an MSB-first bit stream. When `length` exceeds 256 bits, the
/// label is counter-extended (`"AURORAA|owner|epoch|" || counter`) and
/// HMAC is re-run to produce more bits.
pub fn derive_signal(
    secret: &AuroraaSecret,
    owner_id: &str,
    epoch: &str,
    length: usize,
) -> Result<Vec<f32>, CoreError> {
    require_non_empty(owner_id, epoch)?;

    let mut bits = Vec::with_capacity(length);
    let mut counter: u32 = 0;

    while bits.len() < length {
        let label = if counter == 0 {
            format!("AURORAA|{owner_id}|{epoch}")
        } else {
            format!("AURORAA|{owner_id}|{epoch}|{counter}")
        };
        let digest = hmac_digest(secret, &label);
        for byte in digest {
            for bit_index in (0..8).rev() {
                if bits.len() == length {
                    break;
                }
                let bit = (byte >> bit_index) & 1;
                bits.push(if bit == 1 { 1.0f32 } else { -1.0f32 });
            }
        }
        counter += 1;
    }

    Ok(bits)
}

/// Derives the 64-bit block-permutation seed for `(owner_id, epoch)`.
///
/// `digest = HMAC-SHA256(K, "SHUFFLE|" || owner_id || "|" || epoch)`; the
/// first 8 bytes are interpreted big-endian.
pub fn derive_seed(secret: &AuroraaSecret, owner_id: &str, epoch: &str) -> Result<u64, CoreError> {
    require_non_empty(owner_id, epoch)?;
    let label = format!("SHUFFLE|{owner_id}|{epoch}");
    let digest = hmac_digest(secret, &label);
    let mut seed_bytes = [0u8; 8];
    seed_bytes.copy_from_slice(&digest[..8]);
    Ok(u64::from_be_bytes(seed_bytes))
}

/// Enumerates every 8x8 block coordinate inside a `h x w` plane, in
/// row-major order, then deterministically shuffles them using a
/// `ChaCha8`-seeded Fisher-Yates pass.
///
/// The exact PRNG and shuffle algorithm are fixed by this function's
/// contract, not left to the caller: embed and extract must produce the
/// identical sequence for the same seed.
pub fn permute_blocks(h: u32, w: u32, seed: u64) -> Result<Vec<(u32, u32)>, CoreError> {
    if h < 8 || w < 8 {
        return Err(CoreError::Capacity {
            needed: 1,
            available: 0,
        });
    }

    let mut coords = Vec::new();
    let mut i = 0u32;
    while i + 8 <= h {
        let mut j = 0u32;
        while j + 8 <= w {
            coords.push((i, j));
            j += 8;
        }
        i += 8;
    }

    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    coords.shuffle(&mut rng);
    Ok(coords)
}

fn hmac_digest(secret: &AuroraaSecret, label: &str) -> [u8; 32] {
    let mut mac =
        HmacSha256::new_from_slice(secret.as_bytes()).expect("HMAC accepts keys of any length");
    mac.update(label.as_bytes());
    mac.finalize().into_bytes().into()
}

fn require_non_empty(owner_id: &str, epoch: &str) -> Result<(), CoreError> {
    if owner_id.is_empty() || epoch.is_empty() {
        return Err(CoreError::Config(
            "owner_id and epoch must be non-empty".to_string(),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn secret() -> AuroraaSecret {
        AuroraaSecret::new(vec![7u8; 32]).unwrap()
    }

    #[test]
    fn signal_is_deterministic_and_bipolar() {
        let s1 = derive_signal(&secret(), "u1", "2025-Q1", 128).unwrap();
        let s2 = derive_signal(&secret(), "u1", "2025-Q1", 128).unwrap();
        assert_eq!(s1, s2);
        assert_eq!(s1.len(), 128);
        assert!(s1.iter().all(|&v| v == 1.0 || v == -1.0));
    }

    #[test]
    fn signal_differs_by_owner() {
        let a = derive_signal(&secret(), "u1", "2025-Q1", 128).unwrap();
        let b = derive_signal(&secret(), "u2", "2025-Q1", 128).unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn signal_extends_past_256_bits() {
        let s = derive_signal(&secret(), "u1", "2025-Q1", 512).unwrap();
        assert_eq!(s.len(), 512);
    }

    #[test]
    fn seed_is_deterministic() {
        let a = derive_seed(&secret(), "u1", "2025-Q1").unwrap();
        let b = derive_seed(&secret(), "u1", "2025-Q1").unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn permutation_is_deterministic_for_fixed_seed() {
        let a = permute_blocks(64, 64, 42).unwrap();
        let b = permute_blocks(64, 64, 42).unwrap();
        assert_eq!(a, b);
        assert_eq!(a.len(), 64);
    }

    #[test]
    fn permutation_rejects_undersized_plane() {
        assert!(permute_blocks(4, 64, 1).is_err());
    }

    #[test]
    fn permutation_covers_every_block_exactly_once() {
        let coords = permute_blocks(32, 16, 1).unwrap();
        let mut sorted = coords.clone();
        sorted.sort();
        sorted.dedup();
        assert_eq!(sorted.len(), coords.len());
    }
}
