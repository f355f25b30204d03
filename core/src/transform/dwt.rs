//! Single-level 2-D Haar discrete wavelet transform (lifting-scheme
//! implementation) producing four sub-bands `(LL, LH, HL, HH)`.

/// The four sub-bands of a single-level 2-D Haar decomposition, each of
/// size `(dim/2) x (dim/2)`.
pub struct Bands {
    pub dim: usize,
    pub ll: Vec<f32>,
    pub lh: Vec<f32>,
    pub hl: Vec<f32>,
    pub hh: Vec<f32>,
}

/// Decomposes a `dim x dim` plane (row-major, `dim` even) into four
/// `(dim/2) x (dim/2)` Haar sub-bands.
///
/// Normalization follows the standard orthonormal Haar convention:
/// `LL = (a+b+c+d)/2`, `LH = (a-b+c-d)/2`, `HL = (a+b-c-d)/2`,
/// `HH = (a-b-c+d)/2`, where `a,b,c,d` are the 2x2 pixel neighborhood
/// (top-left, top-right, bottom-left, bottom-right).
pub fn forward_haar(plane: &[f32], dim: usize) -> Bands {
    debug_assert_eq!(dim % 2, 0);
    let half = dim / 2;
    let mut ll = vec![0f32; half * half];
    let mut lh = vec![0f32; half * half];
    let mut hl = vec![0f32; half * half];
    let mut hh = vec![0f32; half * half];

    for by in 0..half {
        for bx in 0..half {
            let a = plane[(2 * by) * dim + 2 * bx];
            let b = plane[(2 * by) * dim + 2 * bx + 1];
            let c = plane[(2 * by + 1) * dim + 2 * bx];
            let d = plane[(2 * by + 1) * dim + 2 * bx + 1];

            let idx = by * half + bx;
            ll[idx] = (a + b + c + d) / 2.0;
            lh[idx] = (a - b + c - d) / 2.0;
            hl[idx] = (a + b - c - d) / 2.0;
            hh[idx] = (a - b - c + d) / 2.0;
        }
    }

    Bands { dim: half, ll, lh, hl, hh }
}

/// Inverts [`forward_haar`], reconstructing the original `dim x dim` plane
/// from its four sub-bands.
pub fn inverse_haar(bands: &Bands) -> Vec<f32> {
    let half = bands.dim;
    let dim = half * 2;
    let mut plane = vec![0f32; dim * dim];

    for by in 0..half {
        for bx in 0..half {
            let idx = by * half + bx;
            let (ll, lh, hl, hh) = (bands.ll[idx], bands.lh[idx], bands.hl[idx], bands.hh[idx]);

            let a = (ll + lh + hl + hh) / 2.0;
            let b = (ll - lh + hl - hh) / 2.0;
            let c = (ll + lh - hl - hh) / 2.0;
            let d = (ll - lh - hl + hh) / 2.0;

            plane[(2 * by) * dim + 2 * bx] = a;
            plane[(2 * by) * dim + 2 * bx + 1] = b;
            plane[(2 * by + 1) * dim + 2 * bx] = c;
            plane[(2 * by + 1) * dim + 2 * bx + 1] = d;
        }
    }

    plane
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn roundtrips_arbitrary_plane() {
        let dim = 16;
        let plane: Vec<f32> = (0..dim * dim).map(|i| (i % 97) as f32).collect();
        let bands = forward_haar(&plane, dim);
        let back = inverse_haar(&bands);
        for (a, b) in plane.iter().zip(back.iter()) {
            assert!((a - b).abs() < 1e-3);
        }
    }

    #[test]
    fn constant_plane_has_zero_detail_bands() {
        let dim = 8;
        let plane = vec![42.0f32; dim * dim];
        let bands = forward_haar(&plane, dim);
        assert!(bands.lh.iter().all(|&v| v.abs() < 1e-6));
        assert!(bands.hl.iter().all(|&v| v.abs() < 1e-6));
        assert!(bands.hh.iter().all(|&v| v.abs() < 1e-6));
        assert!(bands.ll.iter().all(|&v| (v - 84.0).abs() < 1e-6));
    }

    #[test]
    fn band_dimensions_are_halved() {
        let dim = 32;
        let plane = vec![0f32; dim * dim];
        let bands = forward_haar(&plane, dim);
        assert_eq!(bands.dim, 16);
        assert_eq!(bands.ll.len(), 16 * 16);
    }
}
