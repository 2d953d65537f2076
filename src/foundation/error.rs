/// Convenience result type used across flipbook.
pub type FlipbookResult<T> = Result<T, FlipbookError>;

/// Top-level error taxonomy used by the compositor APIs.
#[derive(thiserror::Error, Debug)]
pub enum FlipbookError {
    /// The sequencer was asked to build from a workspace with no entries.
    #[error("empty input: workspace has no entries")]
    EmptyInput,

    /// An index-addressed operation was outside `[0, len)`.
    #[error("index out of range: {index} (len {len})")]
    IndexOutOfRange {
        /// Requested index.
        index: usize,
        /// Length of the addressed collection at the time of the call.
        len: usize,
    },

    /// A numeric parameter was rejected before any compositing work started.
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    /// Malformed project data or a broken sink contract.
    #[error("validation error: {0}")]
    Validation(String),

    /// Failure inside an animation encoder.
    #[error("encode error: {0}")]
    Encode(String),

    /// Wrapped lower-level error from dependencies or IO.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl FlipbookError {
    /// Build a [`FlipbookError::IndexOutOfRange`] value.
    pub fn index_out_of_range(index: usize, len: usize) -> Self {
        Self::IndexOutOfRange { index, len }
    }

    /// Build a [`FlipbookError::InvalidParameter`] value.
    pub fn invalid_parameter(msg: impl Into<String>) -> Self {
        Self::InvalidParameter(msg.into())
    }

    /// Build a [`FlipbookError::Validation`] value.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Build a [`FlipbookError::Encode`] value.
    pub fn encode(msg: impl Into<String>) -> Self {
        Self::Encode(msg.into())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
