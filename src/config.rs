use serde::Deserialize;

use crate::error::{Error, Result};

// ---------------------------------------------------------------------------
// Filter configuration
// ---------------------------------------------------------------------------

/// Fraction of low frequencies to keep along each axis.
///
/// `Isotropic(f)` applies the same fraction to rows and columns;
/// `Anisotropic { rows, cols }` sets them independently.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum KeepFraction {
    Isotropic(f64),
    Anisotropic { rows: f64, cols: f64 },
}

impl KeepFraction {
    /// The (row, column) fraction pair.
    pub fn per_axis(&self) -> (f64, f64) {
        match *self {
            KeepFraction::Isotropic(f) => (f, f),
            KeepFraction::Anisotropic { rows, cols } => (rows, cols),
        }
    }
}

impl Default for KeepFraction {
    fn default() -> Self {
        KeepFraction::Isotropic(0.1)
    }
}

/// Parameters for one pipeline invocation.
///
/// Conceptually a function parameter set: nothing here persists between
/// runs, and there is no global fallback.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct FilterConfig {
    /// Low-pass keep fraction per axis, in [0, 1].
    pub keep_fraction: KeepFraction,

    /// If set, also run top-K magnitude selection with this K.
    pub top_k: Option<usize>,

    /// Divide integer-scaled (0–255) input by 255 on ingestion.
    pub normalize: bool,

    /// If set, fail reconstruction when the imaginary residue left after
    /// the inverse transform exceeds this bound. `None` discards the
    /// residue silently (a warning is still logged above a small epsilon).
    pub imag_tolerance: Option<f64>,
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            keep_fraction: KeepFraction::default(),
            top_k: None,
            normalize: true,
            imag_tolerance: None,
        }
    }
}

impl FilterConfig {
    /// Check every parameter against the image dimensions.
    ///
    /// Errors here are [`Error::Parameter`]; the pipeline calls this once
    /// before touching any coefficients.
    pub fn validate(&self, height: usize, width: usize) -> Result<()> {
        let (fy, fx) = self.keep_fraction.per_axis();
        for (name, f) in [("keep_fraction.rows", fy), ("keep_fraction.cols", fx)] {
            if !(0.0..=1.0).contains(&f) || f.is_nan() {
                return Err(Error::parameter(name, f, "must be in [0, 1]"));
            }
        }
        if let Some(k) = self.top_k {
            let max = height * width;
            if k > max {
                return Err(Error::parameter(
                    "top_k",
                    k,
                    format!("must be in [0, {max}] for a {height}x{width} image"),
                ));
            }
        }
        if let Some(tol) = self.imag_tolerance {
            if !(tol > 0.0) {
                return Err(Error::parameter(
                    "imag_tolerance",
                    tol,
                    "must be positive",
                ));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        assert!(FilterConfig::default().validate(64, 64).is_ok());
    }

    #[test]
    fn keep_fraction_out_of_range_is_rejected() {
        let mut cfg = FilterConfig::default();
        cfg.keep_fraction = KeepFraction::Isotropic(1.5);
        assert!(matches!(
            cfg.validate(8, 8),
            Err(Error::Parameter { parameter: "keep_fraction.rows", .. })
        ));

        cfg.keep_fraction = KeepFraction::Anisotropic { rows: 0.5, cols: -0.1 };
        assert!(matches!(
            cfg.validate(8, 8),
            Err(Error::Parameter { parameter: "keep_fraction.cols", .. })
        ));
    }

    #[test]
    fn top_k_beyond_pixel_count_is_rejected() {
        let mut cfg = FilterConfig::default();
        cfg.top_k = Some(65);
        assert!(cfg.validate(8, 8).is_err());
        cfg.top_k = Some(64);
        assert!(cfg.validate(8, 8).is_ok());
    }

    #[test]
    fn anisotropic_fractions_deserialize_from_pair() {
        let cfg: FilterConfig =
            serde_json::from_str(r#"{ "keep_fraction": { "rows": 0.2, "cols": 0.4 } }"#).unwrap();
        assert_eq!(cfg.keep_fraction.per_axis(), (0.2, 0.4));

        let cfg: FilterConfig = serde_json::from_str(r#"{ "keep_fraction": 0.25 }"#).unwrap();
        assert_eq!(cfg.keep_fraction.per_axis(), (0.25, 0.25));
    }
}
