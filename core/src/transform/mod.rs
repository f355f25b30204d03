//! Forward and inverse transform pipeline shared by the embedder and
//! extractor: decode, canonical resize, color conversion, wavelet
//! decomposition, and 8x8 block DCT.
//!
//! Both directions must use bit-for-bit identical resampling and color
//! conversion, since the embedder and extractor must agree on exactly
//! which pixels back which transform coefficient.

pub mod color;
pub mod dct;
pub mod dwt;
pub mod resize;

use image::{DynamicImage, ImageFormat};

use crate::error::CoreError;

/// A decoded, canonically-resized image split into its luma plane (as
/// `f32`) and the original chroma planes needed to reconstruct a full
/// color image after the luma channel has been modified.
pub struct CanonicalImage {
    /// Side length of the canonical square (`dim x dim`), cropped to even
    /// dimensions.
    pub dim: u32,
    /// Luma plane, row-major, length `dim * dim`.
    pub luma: Vec<f32>,
    /// Cb plane, row-major, length `dim * dim`.
    pub cb: Vec<f32>,
    /// Cr plane, row-major, length `dim * dim`.
    pub cr: Vec<f32>,
}

/// Decodes arbitrary image bytes, resizes to the canonical `dim x dim`
/// square using area averaging, and splits into YCbCr planes.
///
/// `min_source_dim` rejects images whose pre-resize width or height falls
/// below the threshold, before any transform work is attempted.
pub fn decode_and_normalize(
    bytes: &[u8],
    dim: u32,
    min_source_dim: u32,
) -> Result<CanonicalImage, CoreError> {
    let img = image::load_from_memory(bytes)
        .map_err(|e| CoreError::Decode(e.to_string()))?;

    if img.width() < min_source_dim || img.height() < min_source_dim {
        return Err(CoreError::Capacity {
            needed: min_source_dim as usize,
            available: img.width().min(img.height()) as usize,
        });
    }

    let rgb = img.to_rgb8();
    let resized = resize::area_average_resize(&rgb, dim, dim);

    // Crop to even dimensions (drop last row/column if odd). `dim` is
    // controlled by configuration and is even in practice, but the crop
    // keeps the invariant explicit regardless of the chosen value.
    let even_dim = dim - (dim % 2);

    let mut luma = Vec::with_capacity((even_dim * even_dim) as usize);
    let mut cb = Vec::with_capacity((even_dim * even_dim) as usize);
    let mut cr = Vec::with_capacity((even_dim * even_dim) as usize);

    for y in 0..even_dim {
        for x in 0..even_dim {
            let px = resized.get_pixel(x, y);
            let (yy, cbv, crv) = color::rgb_to_ycbcr(px[0], px[1], px[2]);
            luma.push(yy);
            cb.push(cbv);
            cr.push(crv);
        }
    }

    Ok(CanonicalImage {
        dim: even_dim,
        luma,
        cb,
        cr,
    })
}

/// Reconstructs an RGB image from a (possibly modified) luma plane plus
/// the original chroma planes, clips to `[0, 255]`, and encodes as
/// baseline JPEG at quality 92 with default 4:2:0 chroma subsampling.
pub fn reconstruct_and_encode(img: &CanonicalImage, luma: &[f32]) -> Result<Vec<u8>, CoreError> {
    let dim = img.dim;
    let mut rgb = image::RgbImage::new(dim, dim);

    for y in 0..dim {
        for x in 0..dim {
            let idx = (y * dim + x) as usize;
            let yy = luma[idx].clamp(0.0, 255.0);
            let (r, g, b) = color::ycbcr_to_rgb(yy, img.cb[idx], img.cr[idx]);
            rgb.put_pixel(x, y, image::Rgb([r, g, b]));
        }
    }

    let mut out = Vec::new();
    let mut cursor = std::io::Cursor::new(&mut out);
    let encoder = image::codecs::jpeg::JpegEncoder::new_with_quality(&mut cursor, 92);
    DynamicImage::ImageRgb8(rgb)
        .write_with_encoder(encoder)
        .map_err(|e| CoreError::Encode(e.to_string()))?;

    Ok(out)
}
