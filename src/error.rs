use crate::series::SeriesId;
use thiserror::Error;

/// Result type for the chart-building pipeline.
pub type Result<T> = std::result::Result<T, PlotError>;

/// Errors that abort a chart build.
#[derive(Debug, Error)]
pub enum PlotError {
    /// A location could not be read, or a row in it is malformed
    #[error("failed to read {location}: {reason}")]
    SourceRead { location: String, reason: String },

    /// Two records of the same series share an input size
    #[error(
        "duplicate input size {input_size} in series '{identity}' (throughput {first} vs {second})"
    )]
    DuplicateInputSize {
        identity: SeriesId,
        input_size: f64,
        first: f64,
        second: f64,
    },

    /// No input sizes to plan an axis for
    #[error("no input sizes to plan an axis for")]
    EmptyDomain,
}

impl PlotError {
    pub(crate) fn source_read(location: impl Into<String>, reason: impl Into<String>) -> Self {
        PlotError::SourceRead {
            location: location.into(),
            reason: reason.into(),
        }
    }
}
