//! Error types for image normalization.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur while decoding or re-encoding the working file.
#[derive(Debug, Error)]
pub enum NormalizeError {
    /// The file could not be decoded or a re-encode raised a codec error.
    /// The message carries the underlying codec error text for diagnostics.
    #[error("unsupported image at {path}: {detail}")]
    Unsupported {
        /// Working-file path that failed.
        path: PathBuf,
        /// Codec error text.
        detail: String,
    },

    /// File system error reading or overwriting the working file.
    #[error("IO error at {path}: {source}")]
    Io {
        /// Working-file path.
        path: PathBuf,
        /// The underlying IO error.
        #[source]
        source: std::io::Error,
    },
}

impl NormalizeError {
    /// Creates an unsupported-image error carrying the codec error text.
    pub fn unsupported(path: impl Into<PathBuf>, detail: impl ToString) -> Self {
        Self::Unsupported {
            path: path.into(),
            detail: detail.to_string(),
        }
    }

    /// Creates an IO error.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
