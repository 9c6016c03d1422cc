use std::path::Path;

use image::{GrayImage, RgbImage};

use super::model::ImageArray;
use crate::error::{Error, Result};

// ---------------------------------------------------------------------------
// Output materialization: clip → quantize → encode
// ---------------------------------------------------------------------------

/// Clip a reconstructed image to [0, 1] and quantize to 0–255.
///
/// Reconstruction overshoots outside [0, 1] near discontinuities when
/// coefficients were truncated (Gibbs ringing), so clipping happens here
/// and nowhere earlier. Rounds to nearest.
pub fn quantize(image: &ImageArray) -> Vec<u8> {
    image
        .data()
        .iter()
        .map(|&v| (v.clamp(0.0, 1.0) * 255.0).round() as u8)
        .collect()
}

/// Write an [`ImageArray`] to disk as a PNG (or whatever the extension
/// names), clipping and quantizing on the way out.
///
/// A 1-channel array encodes as grayscale, a 3-channel array as RGB.
/// Write failures surface as [`Error::Output`].
pub fn save_file(path: &Path, image: &ImageArray) -> Result<()> {
    let (h, w, c) = image.dim();
    let raw = quantize(image);

    match c {
        1 => {
            // from_raw only fails on a length mismatch, which quantize rules out
            let gray = GrayImage::from_raw(w as u32, h as u32, raw)
                .ok_or_else(|| Error::input("buffer length mismatch for grayscale image"))?;
            gray.save(path).map_err(|e| Error::output(path, e))
        }
        _ => {
            let rgb = RgbImage::from_raw(w as u32, h as u32, raw)
                .ok_or_else(|| Error::input("buffer length mismatch for RGB image"))?;
            rgb.save(path).map_err(|e| Error::output(path, e))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::Array3;

    #[test]
    fn quantize_clips_to_unit_range() {
        let mut data = Array3::zeros((1, 4, 1));
        data[[0, 0, 0]] = -0.3; // Gibbs undershoot
        data[[0, 1, 0]] = 0.5;
        data[[0, 2, 0]] = 1.0;
        data[[0, 3, 0]] = 1.7; // overshoot
        let img = ImageArray::new(data).unwrap();
        assert_eq!(quantize(&img), vec![0, 128, 255, 255]);
    }

    #[test]
    fn quantize_interleaves_channels_row_major() {
        let mut data = Array3::zeros((1, 2, 3));
        data[[0, 0, 0]] = 1.0; // first pixel, red
        data[[0, 1, 2]] = 1.0; // second pixel, blue
        let img = ImageArray::new(data).unwrap();
        assert_eq!(quantize(&img), vec![255, 0, 0, 0, 0, 255]);
    }

    #[test]
    fn unwritable_sink_is_an_output_error() {
        let img = ImageArray::new(Array3::zeros((2, 2, 1))).unwrap();
        let err = save_file(Path::new("no/such/dir/out.png"), &img).unwrap_err();
        assert!(matches!(err, Error::Output { .. }));
    }
}
