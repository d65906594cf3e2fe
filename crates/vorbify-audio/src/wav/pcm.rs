//! Raw PCM payload from a `data` chunk.

use super::format::WaveFormat;

/// Raw sample bytes, interpreted according to a [`WaveFormat`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PcmPayload {
    bytes: Vec<u8>,
}

impl PcmPayload {
    /// Wraps raw `data` chunk bytes.
    pub fn new(bytes: Vec<u8>) -> Self {
        Self { bytes }
    }

    /// Returns the raw bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Payload length in bytes.
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    /// Whether the payload holds no bytes.
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Number of complete sample frames; trailing partial frames are ignored.
    pub fn frame_count(&self, format: &WaveFormat) -> usize {
        match format.frame_size() {
            0 => 0,
            frame_size => self.bytes.len() / frame_size,
        }
    }

    /// Consumes the payload and returns the bytes.
    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }
}

impl From<Vec<u8>> for PcmPayload {
    fn from(bytes: Vec<u8>) -> Self {
        Self::new(bytes)
    }
}
