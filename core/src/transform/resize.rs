//! Bespoke area-averaging resize.
//!
//! Both the embedder and extractor resize to the same canonical square
//! before doing anything else, so any drift in resampling kernel between
//! the two sides collapses correlation. No crate in the dependency graph
//! implements exactly this averaging contract (a box filter for
//! downscale, area-weighted blending for upscale), so it is hand-rolled
//! here and must never be swapped for `image::imageops::resize`.

use image::RgbImage;

/// Resizes `src` to `out_w x out_h` by area averaging, separably: a
/// horizontal pass followed by a vertical pass. Each output pixel is the
/// weighted mean of source pixels whose extent overlaps its corresponding
/// source-space rectangle; weights are proportional to overlap length.
pub fn area_average_resize(src: &RgbImage, out_w: u32, out_h: u32) -> RgbImage {
    let (src_w, src_h) = src.dimensions();

    // Horizontal pass: src_w -> out_w, keep src_h rows, f32 accumulation.
    let mut horiz = vec![0f32; (out_w * src_h * 3) as usize];
    let col_weights = axis_weights(src_w, out_w);
    for y in 0..src_h {
        for (ox, weights) in col_weights.iter().enumerate() {
            let mut acc = [0f32; 3];
            let mut total = 0f32;
            for &(sx, w) in weights {
                let px = src.get_pixel(sx, y);
                for c in 0..3 {
                    acc[c] += px[c] as f32 * w;
                }
                total += w;
            }
            let out_idx = ((y * out_w + ox as u32) * 3) as usize;
            for c in 0..3 {
                horiz[out_idx + c] = if total > 0.0 { acc[c] / total } else { 0.0 };
            }
        }
    }

    // Vertical pass: src_h -> out_h, over the horizontally-resized buffer.
    let row_weights = axis_weights(src_h, out_h);
    let mut out = RgbImage::new(out_w, out_h);
    for (oy, weights) in row_weights.iter().enumerate() {
        for ox in 0..out_w {
            let mut acc = [0f32; 3];
            let mut total = 0f32;
            for &(sy, w) in weights {
                let idx = ((sy * out_w + ox) * 3) as usize;
                for c in 0..3 {
                    acc[c] += horiz[idx + c] * w;
                }
                total += w;
            }
            let pixel = if total > 0.0 {
                [
                    (acc[0] / total).round().clamp(0.0, 255.0) as u8,
                    (acc[1] / total).round().clamp(0.0, 255.0) as u8,
                    (acc[2] / total).round().clamp(0.0, 255.0) as u8,
                ]
            } else {
                [0u8, 0, 0]
            };
            out.put_pixel(ox, oy as u32, image::Rgb(pixel));
        }
    }

    out
}

/// Computes, for each of `out_len` output indices along one axis, the list
/// of `(src_index, weight)` pairs contributing to it: the overlap length
/// between the output index's source-space rectangle
/// `[i * ratio, (i+1) * ratio)` and each integer source pixel cell
/// `[s, s+1)`.
fn axis_weights(src_len: u32, out_len: u32) -> Vec<Vec<(u32, f32)>> {
    let ratio = src_len as f64 / out_len as f64;
    let mut result = Vec::with_capacity(out_len as usize);

    for i in 0..out_len {
        let start = i as f64 * ratio;
        let end = ((i + 1) as f64 * ratio).max(start + f64::EPSILON);

        let s0 = start.floor() as i64;
        let s1 = (end.ceil() as i64 - 1).max(s0);

        let mut weights = Vec::new();
        for s in s0..=s1 {
            if s < 0 || s as u32 >= src_len {
                continue;
            }
            let cell_start = s as f64;
            let cell_end = s as f64 + 1.0;
            let overlap = (end.min(cell_end) - start.max(cell_start)).max(0.0);
            if overlap > 0.0 {
                weights.push((s as u32, overlap as f32));
            }
        }
        if weights.is_empty() {
            // Degenerate case (index past source bound due to rounding):
            // fall back to the nearest valid source pixel.
            let clamped = (start.floor() as i64).clamp(0, src_len as i64 - 1) as u32;
            weights.push((clamped, 1.0));
        }
        result.push(weights);
    }

    result
}
