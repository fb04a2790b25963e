//! Error types shared by every codec in the crate.

use thiserror::Error;

/// Errors returned by the convolutional codec and its trellis engine.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    /// A scheme name that does not map to one of the supported code variants.
    #[error("unknown convolutional scheme `{0}` (expected one of v27, v29, v39, v615)")]
    UnknownScheme(String),

    /// A caller-supplied buffer is shorter than the codec requires.
    #[error("{what} buffer too short: need {expected}, got {actual}")]
    BufferLength {
        what: &'static str,
        expected: usize,
        actual: usize,
    },

    /// The trellis engine was driven outside of its create/init/update/chainback contract.
    #[error("trellis engine contract violated: {0}")]
    EngineContract(String),
}

/// Result type for codec operations
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    pub(crate) fn buffer_length(what: &'static str, expected: usize, actual: usize) -> Self {
        Error::BufferLength {
            what,
            expected,
            actual,
        }
    }
}
