use ndarray::{Array2, Array3};
use num_complex::Complex;

use super::transform::centered_frequency;
use crate::config::KeepFraction;
use crate::data::model::CoefficientArray;
use crate::error::{Error, Result};

// ---------------------------------------------------------------------------
// Low-pass selection
// ---------------------------------------------------------------------------

/// Zero all but the lowest spatial frequencies.
///
/// Keep-radii are `floor(H/2 · f_rows)` and `floor(W/2 · f_cols)`; a
/// centered position survives when both |row-frequency| ≤ row-radius and
/// |col-frequency| ≤ col-radius. The same mask applies to every channel.
/// A fraction of 0 keeps only the DC term; 1.0 keeps everything.
///
/// Fractions outside [0, 1] are [`Error::Parameter`].
pub fn low_pass(coeffs: &CoefficientArray, keep: KeepFraction) -> Result<CoefficientArray> {
    let (h, w, _) = coeffs.dim();
    let (fy, fx) = keep.per_axis();
    for (name, f) in [("keep_fraction.rows", fy), ("keep_fraction.cols", fx)] {
        if !(0.0..=1.0).contains(&f) || f.is_nan() {
            return Err(Error::parameter(name, f, "must be in [0, 1]"));
        }
    }
    let radius_rows = ((h / 2) as f64 * fy).floor() as i64;
    let radius_cols = ((w / 2) as f64 * fx).floor() as i64;
    Ok(apply_mask(coeffs, &low_pass_mask(h, w, radius_rows, radius_cols)))
}

/// Boolean mask over centered (row, col) positions within the keep-radii.
pub fn low_pass_mask(
    height: usize,
    width: usize,
    radius_rows: i64,
    radius_cols: i64,
) -> Array2<bool> {
    Array2::from_shape_fn((height, width), |(i, j)| {
        centered_frequency(i, height).abs() <= radius_rows
            && centered_frequency(j, width).abs() <= radius_cols
    })
}

// ---------------------------------------------------------------------------
// Top-K magnitude selection
// ---------------------------------------------------------------------------

/// Keep the K positions with the largest aggregate magnitude, zeroing the
/// rest in every channel.
///
/// Magnitude is the Euclidean norm of the per-channel coefficient vector,
/// so all channels retain identical positions and kept frequencies stay
/// spatially aligned across channels. Tie-break is deterministic: equal
/// magnitudes are kept in ascending row-major position order.
///
/// `k` greater than H·W is [`Error::Parameter`]; `k = 0` keeps nothing.
pub fn top_k(coeffs: &CoefficientArray, k: usize) -> Result<CoefficientArray> {
    let (h, w, c) = coeffs.dim();
    let total = h * w;
    if k > total {
        return Err(Error::parameter(
            "top_k",
            k,
            format!("must be in [0, {total}] for a {h}x{w} image"),
        ));
    }

    let data = coeffs.data();
    let magnitude: Vec<f64> = (0..total)
        .map(|flat| {
            let (i, j) = (flat / w, flat % w);
            (0..c).map(|ch| data[[i, j, ch]].norm_sqr()).sum::<f64>()
        })
        .collect();

    let mut order: Vec<usize> = (0..total).collect();
    order.sort_by(|&a, &b| magnitude[b].total_cmp(&magnitude[a]).then(a.cmp(&b)));

    let mut mask = Array2::from_elem((h, w), false);
    for &flat in order.iter().take(k) {
        mask[[flat / w, flat % w]] = true;
    }

    Ok(apply_mask(coeffs, &mask))
}

/// Copy coefficients where the mask is true; exact zeros elsewhere.
fn apply_mask(coeffs: &CoefficientArray, mask: &Array2<bool>) -> CoefficientArray {
    let (h, w, c) = coeffs.dim();
    let data = coeffs.data();
    let out = Array3::from_shape_fn((h, w, c), |(i, j, ch)| {
        if mask[[i, j]] {
            data[[i, j, ch]]
        } else {
            Complex::new(0.0, 0.0)
        }
    });
    CoefficientArray::from_raw(out)
}
