//! 8x8 block DCT-II / inverse DCT-III, implemented as a fixed separable
//! transform (row pass then column pass) over a precomputed cosine basis.
//!
//! This is the one piece of "real DSP" hand-rolled in this crate, in the
//! same spirit as the corpus's hand-rolled elliptic-curve and hashing
//! primitives: no general-purpose DCT crate is in the dependency graph,
//! and the exact coefficient layout (including the `(3,3)`/`(2,4)`
//! mid-frequency pair used by the embedder) must match between forward
//! and inverse passes bit-for-bit.

use once_cell::sync::Lazy;

const N: usize = 8;

/// `cos[(2x+1) * u * PI / 16]` precomputed for every `(x, u)` pair.
static COS_TABLE: Lazy<[[f32; N]; N]> = Lazy::new(|| {
    let mut table = [[0f32; N]; N];
    for (x, row) in table.iter_mut().enumerate() {
        for (u, cell) in row.iter_mut().enumerate() {
            *cell = (((2 * x + 1) as f32 * u as f32 * std::f32::consts::PI) / 16.0).cos();
        }
    }
    table
});

fn alpha(u: usize) -> f32 {
    if u == 0 { 1.0 / std::f32::consts::SQRT_2 } else { 1.0 }
}

/// An 8x8 block of DCT coefficients (or pixel values), row-major.
pub type Block8 = [[f32; N]; N];

/// Forward DCT-II of an 8x8 block (separable: rows then columns).
pub fn dct2d(input: &Block8) -> Block8 {
    let mut tmp = [[0f32; N]; N];
    // Row pass: transform each row.
    for (y, row) in input.iter().enumerate() {
        for u in 0..N {
            let mut sum = 0f32;
            for (x, &val) in row.iter().enumerate() {
                sum += val * COS_TABLE[x][u];
            }
            tmp[y][u] = 0.5 * alpha(u) * sum;
        }
    }
    // Column pass: transform each column of the row-transformed result.
    let mut out = [[0f32; N]; N];
    for u in 0..N {
        for v in 0..N {
            let mut sum = 0f32;
            for y in 0..N {
                sum += tmp[y][u] * COS_TABLE[y][v];
            }
            out[v][u] = 0.5 * alpha(v) * sum;
        }
    }
    out
}

/// Inverse DCT-III of an 8x8 coefficient block, exactly inverting
/// [`dct2d`].
pub fn idct2d(coeffs: &Block8) -> Block8 {
    let mut tmp = [[0f32; N]; N];
    for v in 0..N {
        for x in 0..N {
            let mut sum = 0f32;
            for u in 0..N {
                sum += alpha(u) * coeffs[v][u] * COS_TABLE[x][u];
            }
            tmp[v][x] = 0.5 * sum;
        }
    }
    let mut out = [[0f32; N]; N];
    for x in 0..N {
        for y in 0..N {
            let mut sum = 0f32;
            for v in 0..N {
                sum += alpha(v) * tmp[v][x] * COS_TABLE[y][v];
            }
            out[y][x] = 0.5 * sum;
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_block() -> Block8 {
        let mut b = [[0f32; N]; N];
        for (y, row) in b.iter_mut().enumerate() {
            for (x, cell) in row.iter_mut().enumerate() {
                *cell = ((y * 8 + x) % 37) as f32 - 18.0;
            }
        }
        b
    }

    #[test]
    fn roundtrips_within_float_tolerance() {
        let block = sample_block();
        let coeffs = dct2d(&block);
        let back = idct2d(&coeffs);
        for y in 0..N {
            for x in 0..N {
                assert!((block[y][x] - back[y][x]).abs() < 1e-3);
            }
        }
    }

    #[test]
    fn constant_block_has_only_dc_energy() {
        let block = [[5.0f32; N]; N];
        let coeffs = dct2d(&block);
        for v in 0..N {
            for u in 0..N {
                if u != 0 || v != 0 {
                    assert!(coeffs[v][u].abs() < 1e-3, "({v},{u}) = {}", coeffs[v][u]);
                }
            }
        }
        assert!(coeffs[0][0].abs() > 1.0);
    }

    #[test]
    fn modulating_midband_coefficient_is_recoverable_after_roundtrip() {
        let block = sample_block();
        let mut coeffs = dct2d(&block);
        coeffs[3][3] += 50.0;
        coeffs[2][4] -= 50.0;
        let spatial = idct2d(&coeffs);
        let recovered = dct2d(&spatial);
        assert!((recovered[3][3] - coeffs[3][3]).abs() < 1e-2);
        assert!((recovered[2][4] - coeffs[2][4]).abs() < 1e-2);
    }
}
