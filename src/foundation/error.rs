use std::path::PathBuf;

/// Convenience result type used across framepack.
pub type PackResult<T> = Result<T, PackError>;

/// Top-level error taxonomy used by encoder, metadata and session APIs.
#[derive(thiserror::Error, Debug)]
pub enum PackError {
    /// Input raster is not strictly two-color, or a packed frame is malformed.
    #[error("invalid frame format: {0}")]
    InvalidFrameFormat(String),

    /// Bubble locale name outside the known anchor set.
    #[error("unsupported locale: '{0}'")]
    UnsupportedLocale(String),

    /// Reading or writing a pack file failed.
    #[error("io error at '{}': {source}", path.display())]
    Io {
        /// File or directory the operation targeted.
        path: PathBuf,
        /// Underlying OS error.
        #[source]
        source: std::io::Error,
    },

    /// Invalid user-provided configuration or frame sequence.
    #[error("validation error: {0}")]
    Validation(String),

    /// The external image-processing engine is missing or failed.
    #[error("image pipeline error: {0}")]
    Pipeline(String),

    /// The pack was cancelled; `written` frames were already handed to the sink.
    #[error("pack cancelled after {written} frame(s)")]
    Cancelled {
        /// Number of frames pushed before cancellation was observed.
        written: u64,
    },

    /// Wrapped lower-level error from dependencies.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl PackError {
    /// Build a [`PackError::InvalidFrameFormat`] value.
    pub fn invalid_frame(msg: impl Into<String>) -> Self {
        Self::InvalidFrameFormat(msg.into())
    }

    /// Build a [`PackError::Validation`] value.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Build a [`PackError::Pipeline`] value.
    pub fn pipeline(msg: impl Into<String>) -> Self {
        Self::Pipeline(msg.into())
    }

    /// Build a [`PackError::Io`] value for `path`.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
