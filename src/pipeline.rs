use crate::config::FilterConfig;
use crate::data::model::{CoefficientArray, ImageArray, SparseCoefficientMap};
use crate::error::Result;
use crate::fourier::{selector, sparse, transform};

// ---------------------------------------------------------------------------
// Pipeline orchestration
// ---------------------------------------------------------------------------

/// Result of one selection policy: the sparsified coefficients and the
/// image reconstructed from them.
#[derive(Debug, Clone)]
pub struct StageOutput {
    pub coefficients: CoefficientArray,
    pub reconstruction: ImageArray,
    /// (row, col) positions with at least one non-zero channel.
    pub kept_positions: usize,
}

impl StageOutput {
    /// Project the retained coefficients into a sparse map.
    pub fn sparse_map(&self) -> SparseCoefficientMap {
        sparse::from_coefficients(&self.coefficients)
    }
}

/// Everything one invocation produces.
#[derive(Debug, Clone)]
pub struct PipelineResult {
    pub low_pass: StageOutput,
    pub top_k: Option<StageOutput>,
}

impl PipelineResult {
    /// The output preferred for sparse export: top-K when it ran,
    /// otherwise the low-pass selection.
    pub fn preferred(&self) -> &StageOutput {
        self.top_k.as_ref().unwrap_or(&self.low_pass)
    }
}

/// Run the whole pipeline over an already-ingested image:
/// forward transform → selection (low-pass, plus top-K when configured)
/// → inverse transform. Stateless across calls; every stage returns a
/// fresh array.
pub fn run(config: &FilterConfig, image: &ImageArray) -> Result<PipelineResult> {
    let (h, w, c) = image.dim();
    config.validate(h, w)?;

    log::info!("forward transform: {h}x{w}, {c} channel(s)");
    let coeffs = transform::forward_transform(image);
    let total = h * w;

    let kept = selector::low_pass(&coeffs, config.keep_fraction)?;
    let low_pass = reconstruct(config, kept)?;
    log::info!(
        "low-pass kept {}/{total} frequency positions",
        low_pass.kept_positions
    );

    let top_k = match config.top_k {
        None => None,
        Some(k) => {
            let kept = selector::top_k(&coeffs, k)?;
            let stage = reconstruct(config, kept)?;
            log::info!(
                "top-{k} kept {}/{total} frequency positions",
                stage.kept_positions
            );
            Some(stage)
        }
    };

    Ok(PipelineResult { low_pass, top_k })
}

fn reconstruct(config: &FilterConfig, coefficients: CoefficientArray) -> Result<StageOutput> {
    let reconstruction = match config.imag_tolerance {
        Some(tol) => transform::inverse_transform_strict(&coefficients, tol)?,
        None => transform::inverse_transform(&coefficients),
    };
    let kept_positions = coefficients.retained_positions();
    Ok(StageOutput {
        coefficients,
        reconstruction,
        kept_positions,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::KeepFraction;
    use approx::assert_relative_eq;
    use ndarray::Array3;

    fn image() -> ImageArray {
        let data = Array3::from_shape_fn((8, 8, 3), |(i, j, ch)| {
            ((i + 2 * j + ch) % 9) as f64 / 9.0
        });
        ImageArray::new(data).unwrap()
    }

    #[test]
    fn full_pipeline_with_both_policies() {
        let config = FilterConfig {
            keep_fraction: KeepFraction::Isotropic(0.5),
            top_k: Some(16),
            normalize: true,
            imag_tolerance: Some(1e-8),
        };
        let result = run(&config, &image()).unwrap();
        assert!(result.low_pass.kept_positions > 1);
        let top_k = result.top_k.as_ref().unwrap();
        assert!(top_k.kept_positions <= 16);
        assert_eq!(result.preferred().kept_positions, top_k.kept_positions);

        // sparse branch reproduces the sparsified reconstruction exactly
        let map = top_k.sparse_map();
        let rebuilt = crate::fourier::sparse::to_coefficients(&map).unwrap();
        assert_eq!(rebuilt, top_k.coefficients);
    }

    #[test]
    fn invalid_parameters_fail_before_any_transform() {
        let config = FilterConfig {
            top_k: Some(8 * 8 + 1),
            ..FilterConfig::default()
        };
        assert!(run(&config, &image()).is_err());
    }

    #[test]
    fn keep_everything_reproduces_the_input() {
        let config = FilterConfig {
            keep_fraction: KeepFraction::Isotropic(1.0),
            ..FilterConfig::default()
        };
        let img = image();
        let result = run(&config, &img).unwrap();
        for (a, b) in img
            .data()
            .iter()
            .zip(result.low_pass.reconstruction.data().iter())
        {
            assert_relative_eq!(*a, *b, epsilon = 1e-10);
        }
    }
}
