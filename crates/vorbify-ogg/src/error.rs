//! Error types for the encode driver.

use thiserror::Error;

use crate::driver::DriverState;

/// Result type for encode operations.
pub type EncodeResult<T> = Result<T, EncodeError>;

/// Errors that can occur while encoding a stream.
#[derive(Debug, Error)]
pub enum EncodeError {
    /// Invalid encoder configuration.
    #[error("invalid encoder configuration: {message}")]
    InvalidConfig {
        /// Error message.
        message: String,
    },

    /// The encoder engine reported a failure.
    #[error("encoder engine error: {message}")]
    Engine {
        /// Error message.
        message: String,
    },

    /// A packet was submitted after the end-of-stream page was emitted.
    #[error("packet submitted to finished stream {serial:#010x}")]
    StreamFinished {
        /// Serial number of the finished stream.
        serial: u32,
    },

    /// A driver step was invoked out of order.
    #[error("driver is in state {found:?}, expected {expected:?}")]
    InvalidState {
        /// State the step requires.
        expected: DriverState,
        /// State the driver was in.
        found: DriverState,
    },

    /// I/O error while writing pages.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl EncodeError {
    /// Creates an invalid configuration error.
    pub fn invalid_config(message: impl Into<String>) -> Self {
        Self::InvalidConfig {
            message: message.into(),
        }
    }

    /// Creates an engine error.
    pub fn engine(message: impl Into<String>) -> Self {
        Self::Engine {
            message: message.into(),
        }
    }

    /// Returns a stable error code for reports.
    pub fn code(&self) -> &'static str {
        match self {
            EncodeError::InvalidConfig { .. } => "ENC_001",
            EncodeError::Engine { .. } => "ENC_002",
            EncodeError::StreamFinished { .. } => "ENC_003",
            EncodeError::InvalidState { .. } => "ENC_004",
            EncodeError::Io(_) => "ENC_005",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_engine_helper() {
        let err = EncodeError::engine("vorbis_analysis failed");
        assert!(err.to_string().contains("vorbis_analysis failed"));
        assert_eq!(err.code(), "ENC_002");
    }

    #[test]
    fn test_stream_finished_formats_serial() {
        let err = EncodeError::StreamFinished { serial: 0xbeef };
        assert!(err.to_string().contains("0x0000beef"));
    }

    #[test]
    fn test_invalid_state_names_both_states() {
        let err = EncodeError::InvalidState {
            expected: DriverState::HeaderEmission,
            found: DriverState::Finalized,
        };
        let message = err.to_string();
        assert!(message.contains("HeaderEmission"));
        assert!(message.contains("Finalized"));
    }
}
