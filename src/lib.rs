//! # Fourier Sieve
//!
//! An FFT-based image filtering and sparsification pipeline: images become
//! per-channel centered frequency-domain coefficients, coefficients are
//! discarded under a low-pass window or a global top-K magnitude policy,
//! and the survivors reconstruct an approximate image or export as a
//! sparse frequency-indexed map.
//!
//! ## Quick start
//!
//! ```no_run
//! use fourier_sieve::{data, pipeline, FilterConfig, KeepFraction};
//! use std::path::Path;
//!
//! # fn main() -> fourier_sieve::Result<()> {
//! let image = data::loader::load_file(Path::new("input.png"), true)?;
//! let config = FilterConfig {
//!     keep_fraction: KeepFraction::Isotropic(0.1),
//!     top_k: Some(5000),
//!     ..FilterConfig::default()
//! };
//! let result = pipeline::run(&config, &image)?;
//! data::writer::save_file(Path::new("recon.png"), &result.preferred().reconstruction)?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Modules
//!
//! - [`data`] – ingestion, core array types, materialization
//! - [`fourier`] – transform, selectors, sparse serializer
//! - [`pipeline`] – stage orchestration
//! - [`config`] / [`error`] – parameter set and error taxonomy

pub mod config;
pub mod data;
pub mod error;
pub mod fourier;
pub mod pipeline;

pub use config::{FilterConfig, KeepFraction};
pub use data::model::{
    CoefficientArray, FrequencyIndex, ImageArray, SparseCoefficientMap, SparseValue,
};
pub use error::{Error, Result};
pub use fourier::selector::{low_pass, top_k};
pub use fourier::transform::{forward_transform, inverse_transform, inverse_transform_strict};
pub use pipeline::{PipelineResult, StageOutput};
