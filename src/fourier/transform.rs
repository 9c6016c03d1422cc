use ndarray::{s, Array3};
use num_complex::Complex;
use rustfft::{FftDirection, FftPlanner};

use crate::data::model::{CoefficientArray, FrequencyIndex, ImageArray};
use crate::error::{Error, Result};

/// Residue above this is worth a warning even when nobody asked for a
/// strict check; a well-paired forward/inverse leaves ~1e-16 per sample.
const IMAG_RESIDUE_EPSILON: f64 = 1e-6;

// ---------------------------------------------------------------------------
// Forward / inverse transform
// ---------------------------------------------------------------------------

/// Compute the centered 2D DFT of every channel.
///
/// Each channel is transformed independently (rows, then columns via a
/// transposition so both passes run on contiguous data), then the
/// quadrants are swapped so the DC term lands at `(H/2, W/2)`. The
/// transform itself is untouched by the centering; it is a reversible
/// permutation of the output array.
pub fn forward_transform(image: &ImageArray) -> CoefficientArray {
    let (h, w, c) = image.dim();
    let mut coeffs = Array3::from_elem((h, w, c), Complex::new(0.0, 0.0));

    for ch in 0..c {
        let mut buffer: Vec<Complex<f64>> = image
            .data()
            .slice(s![.., .., ch])
            .iter()
            .map(|&v| Complex::new(v, 0.0))
            .collect();
        fft_2d_buffer(h, w, &mut buffer, FftDirection::Forward);
        for i in 0..h {
            for j in 0..w {
                coeffs[[i, j, ch]] = buffer[i * w + j];
            }
        }
    }

    CoefficientArray::from_raw(fftshift(&coeffs))
}

/// Reconstruct a real-valued image from centered coefficients.
///
/// Reverses the centering, applies the inverse DFT per channel with the
/// 1/(H·W) normalization, and discards the imaginary residue left by
/// floating-point rounding. The residue is measured anyway: anything
/// above a small epsilon gets a warning, since a large residue usually
/// means the coefficients were not produced by [`forward_transform`].
///
/// No clipping happens here; truncated coefficients ring (Gibbs), and
/// the writer clips at materialization time.
pub fn inverse_transform(coeffs: &CoefficientArray) -> ImageArray {
    let (image, residue) = inverse_transform_with_residue(coeffs);
    if residue > IMAG_RESIDUE_EPSILON {
        log::warn!(
            "inverse transform discarded imaginary residue up to {residue:.3e}; \
             coefficients may not come from a matching forward transform"
        );
    }
    image
}

/// Like [`inverse_transform`], but fail when the imaginary residue
/// exceeds `tolerance` instead of discarding it silently.
pub fn inverse_transform_strict(coeffs: &CoefficientArray, tolerance: f64) -> Result<ImageArray> {
    let (image, residue) = inverse_transform_with_residue(coeffs);
    if residue > tolerance {
        return Err(Error::input(format!(
            "imaginary residue {residue:.3e} exceeds tolerance {tolerance:.3e}; \
             mis-paired forward/inverse transform or corrupted coefficients"
        )));
    }
    Ok(image)
}

/// Inverse transform returning the maximum absolute imaginary component
/// that was discarded, for callers that want to inspect it.
pub fn inverse_transform_with_residue(coeffs: &CoefficientArray) -> (ImageArray, f64) {
    let (h, w, c) = coeffs.dim();
    let natural = ifftshift(coeffs.data());
    let scale = 1.0 / (h * w) as f64;

    let mut out = Array3::zeros((h, w, c));
    let mut residue = 0.0f64;
    for ch in 0..c {
        let mut buffer: Vec<Complex<f64>> =
            natural.slice(s![.., .., ch]).iter().copied().collect();
        fft_2d_buffer(h, w, &mut buffer, FftDirection::Inverse);
        for i in 0..h {
            for j in 0..w {
                let v = buffer[i * w + j] * scale;
                residue = residue.max(v.im.abs());
                out[[i, j, ch]] = v.re;
            }
        }
    }

    (ImageArray::from_raw(out), residue)
}

// ---------------------------------------------------------------------------
// Centering permutation and frequency indexing
// ---------------------------------------------------------------------------

/// Swap quadrants so the DC term moves from `(0, 0)` to `(H/2, W/2)`.
///
/// Valid for odd lengths too: the shift amount is `ceil(N/2)` per axis,
/// which [`ifftshift`] undoes exactly.
pub fn fftshift(data: &Array3<Complex<f64>>) -> Array3<Complex<f64>> {
    let (h, w, _) = data.dim();
    roll(data, h - h / 2, w - w / 2)
}

/// Inverse of [`fftshift`]; differs from it when a dimension is odd.
pub fn ifftshift(data: &Array3<Complex<f64>>) -> Array3<Complex<f64>> {
    let (h, w, _) = data.dim();
    roll(data, h / 2, w / 2)
}

fn roll(data: &Array3<Complex<f64>>, dy: usize, dx: usize) -> Array3<Complex<f64>> {
    let (h, w, c) = data.dim();
    Array3::from_shape_fn((h, w, c), |(i, j, ch)| {
        data[[(i + dy) % h, (j + dx) % w, ch]]
    })
}

/// Integer cycle count held at array position `pos` along a centered axis
/// of length `len`: the natural DFT bin, reordered the same way as the
/// data, which collapses to `pos - len/2`.
pub fn centered_frequency(pos: usize, len: usize) -> i64 {
    pos as i64 - (len / 2) as i64
}

/// Frequency pair at array position `(i, j)` of a centered (H, W) array.
pub fn frequency_index_at(i: usize, j: usize, height: usize, width: usize) -> FrequencyIndex {
    FrequencyIndex {
        row: centered_frequency(i, height),
        col: centered_frequency(j, width),
    }
}

// ---------------------------------------------------------------------------
// 2D FFT over a row-major buffer
// ---------------------------------------------------------------------------

/// In-place 2D FFT of a `height`×`width` row-major buffer.
///
/// Rows are processed directly; columns are processed by transposing,
/// running the row pass, and transposing back, so the planner always
/// works on contiguous slices. Not normalized in either direction.
fn fft_2d_buffer(
    height: usize,
    width: usize,
    buffer: &mut Vec<Complex<f64>>,
    direction: FftDirection,
) {
    let mut planner = FftPlanner::new();

    let row_fft = planner.plan_fft(width, direction);
    let mut scratch = vec![Complex::default(); row_fft.get_inplace_scratch_len()];
    for row in buffer.chunks_exact_mut(width) {
        row_fft.process_with_scratch(row, &mut scratch);
    }

    let mut transposed = transpose(height, width, buffer);
    let col_fft = planner.plan_fft(height, direction);
    scratch.resize(col_fft.get_inplace_scratch_len(), Complex::default());
    for column in transposed.chunks_exact_mut(height) {
        col_fft.process_with_scratch(column, &mut scratch);
    }

    *buffer = transpose(width, height, &transposed);
}

/// Transpose a `rows`×`cols` row-major matrix into `cols`×`rows`.
fn transpose(rows: usize, cols: usize, matrix: &[Complex<f64>]) -> Vec<Complex<f64>> {
    let mut out = vec![Complex::default(); matrix.len()];
    for i in 0..rows {
        for j in 0..cols {
            out[j * rows + i] = matrix[i * cols + j];
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use ndarray::Array3;

    fn gradient_image(h: usize, w: usize, c: usize) -> ImageArray {
        let data = Array3::from_shape_fn((h, w, c), |(i, j, ch)| {
            (i as f64 * 0.31 + j as f64 * 0.17 + ch as f64 * 0.05).sin() * 0.5 + 0.5
        });
        ImageArray::new(data).unwrap()
    }

    #[test]
    fn round_trip_reconstructs_grayscale_input() {
        let img = gradient_image(8, 8, 1);
        let back = inverse_transform(&forward_transform(&img));
        for (a, b) in img.data().iter().zip(back.data().iter()) {
            assert_relative_eq!(*a, *b, epsilon = 1e-10);
        }
    }

    #[test]
    fn round_trip_reconstructs_rgb_and_odd_sizes() {
        let img = gradient_image(5, 7, 3);
        let back = inverse_transform(&forward_transform(&img));
        for (a, b) in img.data().iter().zip(back.data().iter()) {
            assert_relative_eq!(*a, *b, epsilon = 1e-10);
        }
    }

    #[test]
    fn constant_image_has_only_a_dc_coefficient() {
        let img = ImageArray::from_2d(ndarray::Array2::from_elem((8, 6), 1.0)).unwrap();
        let coeffs = forward_transform(&img);
        let (h, w, _) = coeffs.dim();
        for i in 0..h {
            for j in 0..w {
                let v = coeffs.data()[[i, j, 0]];
                if (i, j) == (h / 2, w / 2) {
                    // unnormalized DFT: DC = sum of samples
                    assert_relative_eq!(v.re, (h * w) as f64, epsilon = 1e-9);
                    assert_relative_eq!(v.im, 0.0, epsilon = 1e-9);
                } else {
                    assert!(v.norm() < 1e-9, "expected zero at ({i}, {j}), got {v}");
                }
            }
        }
    }

    #[test]
    fn shift_round_trips_for_odd_and_even_lengths() {
        for &(h, w) in &[(4, 4), (5, 5), (4, 5), (7, 6)] {
            let data = Array3::from_shape_fn((h, w, 1), |(i, j, _)| {
                Complex::new((i * w + j) as f64, 0.0)
            });
            assert_eq!(ifftshift(&fftshift(&data)), data);
            assert_eq!(fftshift(&ifftshift(&data)), data);
        }
    }

    #[test]
    fn dc_lands_at_the_geometric_center() {
        for &n in &[4usize, 5, 8, 9] {
            assert_eq!(centered_frequency(n / 2, n), 0);
        }
        // even length: range [-N/2, N/2)
        assert_eq!(centered_frequency(0, 8), -4);
        assert_eq!(centered_frequency(7, 8), 3);
        // odd length: symmetric range
        assert_eq!(centered_frequency(0, 5), -2);
        assert_eq!(centered_frequency(4, 5), 2);
    }

    #[test]
    fn strict_inverse_rejects_unpaired_coefficients() {
        // A lone off-center coefficient with no Hermitian partner cannot
        // come from a real image, so the residue is macroscopic.
        let mut data = Array3::from_elem((8, 8, 1), Complex::new(0.0, 0.0));
        data[[4, 5, 0]] = Complex::new(8.0, 0.0);
        let coeffs = CoefficientArray::from_raw(data);

        assert!(inverse_transform_strict(&coeffs, 1e-9).is_err());
        // The lenient path still returns an image.
        let (_, residue) = inverse_transform_with_residue(&coeffs);
        assert!(residue > 1e-3);
    }

    #[test]
    fn strict_inverse_accepts_a_clean_round_trip() {
        let img = gradient_image(6, 6, 1);
        let coeffs = forward_transform(&img);
        let back = inverse_transform_strict(&coeffs, 1e-9).unwrap();
        for (a, b) in img.data().iter().zip(back.data().iter()) {
            assert_relative_eq!(*a, *b, epsilon = 1e-10);
        }
    }
}
