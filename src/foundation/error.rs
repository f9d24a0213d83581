/// Convenience result type used across the codec.
pub type FractalResult<T> = Result<T, FractalError>;

/// Top-level error taxonomy used by codec APIs.
#[derive(thiserror::Error, Debug)]
pub enum FractalError {
    /// Invalid caller-provided parameters (block sizes, dimensions, contrast, iterations).
    #[error("parameter error: {0}")]
    Parameter(String),

    /// Malformed persisted data: truncated record streams, bad transform bytes, missing entries.
    #[error("format error: {0}")]
    Format(String),

    /// Inputs for which the codec has nothing meaningful to compute.
    #[error("degenerate input: {0}")]
    Degenerate(String),

    /// IO failure while reading or writing a stream.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Wrapped lower-level error from dependencies.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl FractalError {
    /// Build a [`FractalError::Parameter`] value.
    pub fn parameter(msg: impl Into<String>) -> Self {
        Self::Parameter(msg.into())
    }

    /// Build a [`FractalError::Format`] value.
    pub fn format(msg: impl Into<String>) -> Self {
        Self::Format(msg.into())
    }

    /// Build a [`FractalError::Degenerate`] value.
    pub fn degenerate(msg: impl Into<String>) -> Self {
        Self::Degenerate(msg.into())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
