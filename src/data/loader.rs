use std::path::Path;

use image::DynamicImage;
use ndarray::{Array2, Array3};

use super::model::ImageArray;
use crate::error::{Error, Result};

// ---------------------------------------------------------------------------
// Public entry-points
// ---------------------------------------------------------------------------

/// Load an image file into an [`ImageArray`].
///
/// Grayscale sources become a 1-channel array, everything else is
/// converted to RGB (3 channels). With `normalize` the 0–255 samples are
/// divided by 255 so downstream stages see values in [0, 1]; otherwise
/// they are kept integer-scaled.
///
/// Decode failures surface as [`Error::Input`].
pub fn load_file(path: &Path, normalize: bool) -> Result<ImageArray> {
    let img = image::open(path)
        .map_err(|e| Error::input(format!("cannot decode {}: {e}", path.display())))?;
    let scale = if normalize { 1.0 / 255.0 } else { 1.0 };

    let data = match img {
        DynamicImage::ImageLuma8(gray) => {
            let (w, h) = gray.dimensions();
            Array3::from_shape_fn((h as usize, w as usize, 1), |(i, j, _)| {
                gray.get_pixel(j as u32, i as u32).0[0] as f64 * scale
            })
        }
        other => {
            let rgb = other.into_rgb8();
            let (w, h) = rgb.dimensions();
            Array3::from_shape_fn((h as usize, w as usize, 3), |(i, j, c)| {
                rgb.get_pixel(j as u32, i as u32).0[c] as f64 * scale
            })
        }
    };
    ImageArray::new(data)
}

/// Ingest an in-memory (H, W, C) array directly.
///
/// Floating-point data is assumed already in its intended scale, so
/// `normalize` is *not* applied here; use [`from_integer_array`] for
/// integer-scaled buffers. Shape errors surface as [`Error::Input`].
pub fn from_array(data: Array3<f64>) -> Result<ImageArray> {
    ImageArray::new(data)
}

/// Ingest a 2-D array as a single-channel image.
pub fn from_array_2d(plane: Array2<f64>) -> Result<ImageArray> {
    ImageArray::from_2d(plane)
}

/// Ingest an integer-scaled (0–255) buffer, optionally normalizing to [0, 1].
pub fn from_integer_array(data: Array3<u8>, normalize: bool) -> Result<ImageArray> {
    let scale = if normalize { 1.0 / 255.0 } else { 1.0 };
    ImageArray::new(data.mapv(|v| v as f64 * scale))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn integer_input_is_normalized_by_255() {
        let raw = Array3::from_elem((2, 2, 1), 255u8);
        let img = from_integer_array(raw, true).unwrap();
        assert_eq!(img.data()[[0, 0, 0]], 1.0);

        let raw = Array3::from_elem((2, 2, 1), 51u8);
        let img = from_integer_array(raw, true).unwrap();
        assert!((img.data()[[1, 1, 0]] - 0.2).abs() < 1e-12);
    }

    #[test]
    fn float_input_passes_through_unscaled() {
        let raw = Array3::from_elem((2, 2, 3), 0.75);
        let img = from_array(raw).unwrap();
        assert_eq!(img.data()[[0, 1, 2]], 0.75);
    }

    #[test]
    fn missing_file_is_an_input_error() {
        let err = load_file(Path::new("no/such/image.png"), true).unwrap_err();
        assert!(matches!(err, Error::Input { .. }));
    }
}
