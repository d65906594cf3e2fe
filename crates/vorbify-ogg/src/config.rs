//! Encoder configuration.

use vorbify_audio::{TargetFormat, WRITE_BUFFER_SIZE};

use crate::error::{EncodeError, EncodeResult};

/// Fixed variable-bitrate quality (libvorbis scale, -0.1 to 1.0).
pub const DEFAULT_QUALITY: f32 = 0.4;

/// Parameters for one encode session.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EncodeConfig {
    /// Output sample rate and channel count.
    pub target: TargetFormat,
    /// VBR quality.
    pub quality: f32,
    /// Samples per channel submitted to the encoder per step.
    pub window: usize,
}

impl Default for EncodeConfig {
    fn default() -> Self {
        Self {
            target: TargetFormat::default(),
            quality: DEFAULT_QUALITY,
            window: WRITE_BUFFER_SIZE,
        }
    }
}

impl EncodeConfig {
    /// Default configuration for the given target format.
    pub fn for_target(target: TargetFormat) -> Self {
        Self {
            target,
            ..Self::default()
        }
    }

    /// Checks the configuration before a session starts.
    pub fn validate(&self) -> EncodeResult<()> {
        if self.target.channels == 0 {
            return Err(EncodeError::invalid_config("channel count must be at least 1"));
        }
        if self.target.sample_rate == 0 {
            return Err(EncodeError::invalid_config("sample rate must be positive"));
        }
        if self.window == 0 {
            return Err(EncodeError::invalid_config("window size must be positive"));
        }
        if !(-0.1..=1.0).contains(&self.quality) {
            return Err(EncodeError::invalid_config(format!(
                "quality {} outside -0.1..=1.0",
                self.quality
            )));
        }
        Ok(())
    }
}
