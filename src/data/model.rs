use std::collections::BTreeMap;
use std::fmt;

use ndarray::{Array2, Array3};
use num_complex::Complex;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

// ---------------------------------------------------------------------------
// ImageArray – a (rows, cols, channels) raster in the spatial domain
// ---------------------------------------------------------------------------

/// A real-valued image indexed (row, column, channel).
///
/// Channel count is 1 (grayscale) or 3 (RGB); height and width are
/// positive. Values are either integer-scaled (0–255) or normalized
/// (0–1) depending on how the array was ingested. Downstream stages
/// never mutate an `ImageArray` in place; each stage returns a new one.
#[derive(Debug, Clone, PartialEq)]
pub struct ImageArray {
    data: Array3<f64>,
}

impl ImageArray {
    /// Wrap a (H, W, C) array, validating the shape invariants.
    pub fn new(data: Array3<f64>) -> Result<Self> {
        let (h, w, c) = data.dim();
        if h == 0 || w == 0 {
            return Err(Error::input(format!(
                "image dimensions must be positive, got {h}x{w}"
            )));
        }
        if c != 1 && c != 3 {
            return Err(Error::input(format!(
                "expected 1 (grayscale) or 3 (RGB) channels, got {c}"
            )));
        }
        Ok(ImageArray { data })
    }

    /// Wrap an array whose invariants are upheld by construction (the
    /// frequency layer only ever produces shapes it was given).
    pub(crate) fn from_raw(data: Array3<f64>) -> Self {
        ImageArray { data }
    }

    /// Treat a 2-D array as single-channel by adding a trailing channel axis.
    pub fn from_2d(plane: Array2<f64>) -> Result<Self> {
        let (h, w) = plane.dim();
        let data = plane
            .into_shape((h, w, 1))
            .map_err(|e| Error::input(format!("cannot add channel axis: {e}")))?;
        ImageArray::new(data)
    }

    /// (height, width, channels).
    pub fn dim(&self) -> (usize, usize, usize) {
        self.data.dim()
    }

    pub fn height(&self) -> usize {
        self.data.dim().0
    }

    pub fn width(&self) -> usize {
        self.data.dim().1
    }

    pub fn channels(&self) -> usize {
        self.data.dim().2
    }

    /// Read-only view of the underlying array.
    pub fn data(&self) -> &Array3<f64> {
        &self.data
    }

    /// Consume and return the underlying array.
    pub fn into_inner(self) -> Array3<f64> {
        self.data
    }
}

// ---------------------------------------------------------------------------
// CoefficientArray – the centered frequency-domain counterpart
// ---------------------------------------------------------------------------

/// Per-channel 2D DFT coefficients with the DC term at the geometric
/// center `(H/2, W/2)` of the array.
///
/// Shape always matches the source image exactly. Produced by the forward
/// transform; the selectors and the serializer read it without mutating,
/// and the inverse transform turns it back into an [`ImageArray`].
#[derive(Debug, Clone, PartialEq)]
pub struct CoefficientArray {
    data: Array3<Complex<f64>>,
}

impl CoefficientArray {
    pub(crate) fn from_raw(data: Array3<Complex<f64>>) -> Self {
        CoefficientArray { data }
    }

    /// (height, width, channels).
    pub fn dim(&self) -> (usize, usize, usize) {
        self.data.dim()
    }

    /// Read-only view of the coefficients.
    pub fn data(&self) -> &Array3<Complex<f64>> {
        &self.data
    }

    /// Number of (row, col) positions with at least one non-zero channel.
    pub fn retained_positions(&self) -> usize {
        let (h, w, c) = self.data.dim();
        let mut count = 0;
        for i in 0..h {
            for j in 0..w {
                if (0..c).any(|ch| self.data[[i, j, ch]] != Complex::new(0.0, 0.0)) {
                    count += 1;
                }
            }
        }
        count
    }
}

// ---------------------------------------------------------------------------
// FrequencyIndex – integer cycle counts, symmetric around DC
// ---------------------------------------------------------------------------

/// An integer (row-frequency, column-frequency) pair.
///
/// Along a dimension of length `N` the values cover `[-N/2, N/2)`,
/// matching the centered coefficient layout: array position `p` holds
/// frequency `p - N/2`. `Ord` so it can key a `BTreeMap`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct FrequencyIndex {
    pub row: i64,
    pub col: i64,
}

impl fmt::Display for FrequencyIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.row, self.col)
    }
}

// ---------------------------------------------------------------------------
// SparseValue / SparseCoefficientMap – frequency-indexed export form
// ---------------------------------------------------------------------------

/// The coefficient(s) stored at one frequency pair: a single complex
/// value for grayscale input, a fixed vector of 3 for RGB.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum SparseValue {
    Gray(Complex<f64>),
    Rgb([Complex<f64>; 3]),
}

impl SparseValue {
    /// Number of channels this value carries.
    pub fn channels(&self) -> usize {
        match self {
            SparseValue::Gray(_) => 1,
            SparseValue::Rgb(_) => 3,
        }
    }

    /// Channel values in order.
    pub fn as_slice(&self) -> &[Complex<f64>] {
        match self {
            SparseValue::Gray(v) => std::slice::from_ref(v),
            SparseValue::Rgb(v) => v,
        }
    }
}

/// A sparse mapping from [`FrequencyIndex`] to coefficients, containing
/// only entries that are non-zero in at least one channel.
///
/// The map records the source shape so a dense [`CoefficientArray`] can be
/// rebuilt exactly (zeros everywhere the map has no entry). Once built it
/// is an independent snapshot, not kept in sync with the source array.
/// Backed by a `BTreeMap`, so its contents and iteration order are a pure
/// function of the array's contents, never of traversal order.
#[derive(Debug, Clone, PartialEq)]
pub struct SparseCoefficientMap {
    pub entries: BTreeMap<FrequencyIndex, SparseValue>,
    pub height: usize,
    pub width: usize,
    pub channels: usize,
}

impl SparseCoefficientMap {
    /// Number of retained frequency pairs.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether no coefficient was retained.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
