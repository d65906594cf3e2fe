//! Error types for WAV parsing and resampling.

use thiserror::Error;

/// Result type for audio front-end operations.
pub type WavResult<T> = Result<T, WavError>;

/// Errors that can occur while reading or resampling a WAV file.
#[derive(Debug, Error)]
pub enum WavError {
    /// The `fmt ` chunk declares something other than linear PCM.
    #[error("unsupported WAV format tag {tag} (only linear PCM, tag 1, is supported)")]
    UnsupportedFormat {
        /// The format tag found in the `fmt ` chunk.
        tag: u16,
    },

    /// The stream ended before a required chunk was found.
    #[error("WAV stream has no '{chunk}' chunk")]
    MissingChunk {
        /// Identifier of the missing chunk.
        chunk: &'static str,
    },

    /// Bits per sample other than 8 or 16.
    #[error("unsupported sample width: {bits} bits per sample")]
    UnsupportedSampleWidth {
        /// The declared bits per sample.
        bits: u16,
    },

    /// Structurally invalid format parameters.
    #[error("invalid format: {message}")]
    InvalidFormat {
        /// Error message.
        message: String,
    },

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl WavError {
    /// Creates an invalid format error.
    pub fn invalid_format(message: impl Into<String>) -> Self {
        Self::InvalidFormat {
            message: message.into(),
        }
    }

    /// Returns a stable error code for reports.
    pub fn code(&self) -> &'static str {
        match self {
            WavError::UnsupportedFormat { .. } => "WAV_001",
            WavError::MissingChunk { .. } => "WAV_002",
            WavError::UnsupportedSampleWidth { .. } => "WAV_003",
            WavError::InvalidFormat { .. } => "WAV_004",
            WavError::Io(_) => "WAV_005",
        }
    }

    /// Whether the file should be skipped rather than reported as failed.
    ///
    /// A stream that simply lacks a `fmt ` or `data` chunk is not a
    /// conversion failure.
    pub fn is_skippable(&self) -> bool {
        matches!(self, WavError::MissingChunk { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_format_helper() {
        let err = WavError::invalid_format("zero channels");
        assert!(err.to_string().contains("zero channels"));
        assert_eq!(err.code(), "WAV_004");
    }

    #[test]
    fn test_unsupported_format_message_names_tag() {
        let err = WavError::UnsupportedFormat { tag: 3 };
        assert!(err.to_string().contains("tag 3"));
        assert!(!err.is_skippable());
    }

    #[test]
    fn test_missing_chunk_is_skippable() {
        let err = WavError::MissingChunk { chunk: "data" };
        assert!(err.is_skippable());
        assert_eq!(err.code(), "WAV_002");
    }
}
