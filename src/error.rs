use std::path::PathBuf;

// ---------------------------------------------------------------------------
// Error taxonomy
// ---------------------------------------------------------------------------

/// Result alias used across the crate.
pub type Result<T> = std::result::Result<T, Error>;

/// Every failure the pipeline can surface.
///
/// All three kinds are deterministic: retrying with the same input would
/// reproduce the same error, so none of them carries retry hints.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The image source could not be decoded, or an in-memory array has the
    /// wrong rank / channel count.
    #[error("input error: {reason}")]
    Input { reason: String },

    /// A filter parameter is outside its valid range.
    #[error("parameter error: {parameter} = {value} ({constraint})")]
    Parameter {
        parameter: &'static str,
        value: String,
        constraint: String,
    },

    /// The output sink could not be written.
    #[error("output error: {path}: {source}")]
    Output {
        path: PathBuf,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
}

impl Error {
    pub(crate) fn input(reason: impl Into<String>) -> Self {
        Error::Input {
            reason: reason.into(),
        }
    }

    pub(crate) fn parameter(
        parameter: &'static str,
        value: impl ToString,
        constraint: impl Into<String>,
    ) -> Self {
        Error::Parameter {
            parameter,
            value: value.to_string(),
            constraint: constraint.into(),
        }
    }

    pub(crate) fn output(
        path: impl Into<PathBuf>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Error::Output {
            path: path.into(),
            source: Box::new(source),
        }
    }
}
