//! Engine error types.

use thiserror::Error;
use veil_schema::DescriptorError;

/// Errors surfaced by the batch and streaming drivers.
#[derive(Debug, Error)]
pub enum EngineError {
    /// Reading input or writing released lines failed.
    #[error("I/O error: {source}")]
    Io {
        #[from]
        source: std::io::Error,
    },

    /// A record line failed to parse; batch mode fails fast on this.
    #[error("cannot parse input line {line_number}: {source}")]
    Line {
        line_number: usize,
        #[source]
        source: DescriptorError,
    },

    /// A record could not be rendered for release.
    #[error(transparent)]
    Descriptor(#[from] DescriptorError),
}
