//! Error taxonomy for serialization and animation.

use linedraw_pipeline::PipelineError;

/// Errors returned by [`convert`](crate::convert) and
/// [`animate`](crate::animate).
#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    /// The raster pipeline rejected its input.
    #[error(transparent)]
    Pipeline(#[from] PipelineError),

    /// An animation option is unusable.
    #[error("invalid input `{parameter}`: {reason}")]
    InvalidInput {
        /// Name of the offending parameter.
        parameter: &'static str,
        /// Human-readable description of the problem.
        reason: String,
    },

    /// The SVG text could not be parsed into an element tree.
    #[error("failed to parse SVG document: {0}")]
    Parse(String),

    /// A path `d` attribute is malformed.
    #[error("invalid path data: {0}")]
    PathData(String),
}

impl ExportError {
    /// Build an [`ExportError::InvalidInput`].
    pub fn invalid(parameter: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidInput {
            parameter,
            reason: reason.into(),
        }
    }
}
