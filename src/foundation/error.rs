/// Convenience result type used across mergif.
pub type MergeResult<T> = Result<T, MergeError>;

/// Top-level error taxonomy used by merger and export APIs.
#[derive(thiserror::Error, Debug)]
pub enum MergeError {
    /// Invalid user-provided data (canvas size, pixel buffers, options).
    #[error("validation error: {0}")]
    Validation(String),

    /// A source binary could not be decoded.
    #[error("decode error: {0}")]
    Decode(String),

    /// The source is well-formed but uses a feature this crate does not handle.
    #[error("unsupported format: {0}")]
    UnsupportedFormat(String),

    /// The composited output needs more distinct colors than a GIF color table holds.
    #[error("palette overflow: more than {limit} distinct colors")]
    PaletteOverflow {
        /// Maximum number of palette entries.
        limit: usize,
    },

    /// The output GIF could not be written.
    #[error("encode error: {0}")]
    Encode(String),

    /// The export was cancelled through its [`CancelToken`](crate::CancelToken).
    #[error("export cancelled")]
    Cancelled,

    /// Wrapped lower-level error from dependencies or IO.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl MergeError {
    /// Build a [`MergeError::Validation`] value.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Build a [`MergeError::Decode`] value.
    pub fn decode(msg: impl Into<String>) -> Self {
        Self::Decode(msg.into())
    }

    /// Build a [`MergeError::UnsupportedFormat`] value.
    pub fn unsupported(msg: impl Into<String>) -> Self {
        Self::UnsupportedFormat(msg.into())
    }

    /// Build a [`MergeError::Encode`] value.
    pub fn encode(msg: impl Into<String>) -> Self {
        Self::Encode(msg.into())
    }
}

impl From<gif::DecodingError> for MergeError {
    fn from(err: gif::DecodingError) -> Self {
        Self::Decode(err.to_string())
    }
}

impl From<gif::EncodingError> for MergeError {
    fn from(err: gif::EncodingError) -> Self {
        Self::Encode(err.to_string())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
