//! WAV `fmt ` chunk contents.

use byteorder::{ByteOrder, LittleEndian};

use crate::error::{WavError, WavResult};

/// Format tag for linear PCM.
pub const WAVE_FORMAT_PCM: u16 = 1;

/// Size of the basic `fmt ` chunk body in bytes.
pub const FMT_CHUNK_SIZE: usize = 16;

/// Format metadata parsed from a `fmt ` chunk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WaveFormat {
    /// Format tag (1 = linear PCM).
    pub format_tag: u16,
    /// Number of interleaved channels.
    pub channels: u16,
    /// Sample rate in Hz.
    pub sample_rate: u32,
    /// Average bytes per second.
    pub avg_bytes_per_sec: u32,
    /// Bytes per sample frame.
    pub block_align: u16,
    /// Bits per sample.
    pub bits_per_sample: u16,
}

impl WaveFormat {
    /// Creates a linear PCM format with derived byte rate and block align.
    pub fn pcm(channels: u16, sample_rate: u32, bits_per_sample: u16) -> Self {
        let block_align = channels.saturating_mul(bits_per_sample / 8);
        Self {
            format_tag: WAVE_FORMAT_PCM,
            channels,
            sample_rate,
            avg_bytes_per_sec: sample_rate.saturating_mul(block_align as u32),
            block_align,
            bits_per_sample,
        }
    }

    /// Decodes the 16-byte `fmt ` body (all fields little-endian).
    pub fn from_bytes(bytes: &[u8; FMT_CHUNK_SIZE]) -> Self {
        Self {
            format_tag: LittleEndian::read_u16(&bytes[0..2]),
            channels: LittleEndian::read_u16(&bytes[2..4]),
            sample_rate: LittleEndian::read_u32(&bytes[4..8]),
            avg_bytes_per_sec: LittleEndian::read_u32(&bytes[8..12]),
            block_align: LittleEndian::read_u16(&bytes[12..14]),
            bits_per_sample: LittleEndian::read_u16(&bytes[14..16]),
        }
    }

    /// Whether this is linear PCM.
    pub fn is_pcm(&self) -> bool {
        self.format_tag == WAVE_FORMAT_PCM
    }

    /// Returns the sample width, rejecting anything but 8 or 16 bits.
    pub fn sample_width(&self) -> WavResult<SampleWidth> {
        SampleWidth::from_bits(self.bits_per_sample)
    }

    /// Checks the fields the resampler depends on.
    pub fn validate(&self) -> WavResult<()> {
        if !self.is_pcm() {
            return Err(WavError::UnsupportedFormat {
                tag: self.format_tag,
            });
        }
        if self.channels == 0 {
            return Err(WavError::invalid_format("channel count is zero"));
        }
        if self.sample_rate == 0 {
            return Err(WavError::invalid_format("sample rate is zero"));
        }
        self.sample_width().map(|_| ())
    }

    /// Bytes per full sample frame, computed from channels and width.
    ///
    /// The declared `block_align` is informational only.
    pub fn frame_size(&self) -> usize {
        self.channels as usize * (self.bits_per_sample as usize / 8)
    }

    /// Duration in seconds of a payload of `pcm_len` bytes.
    pub fn duration_seconds(&self, pcm_len: usize) -> f64 {
        let frame_size = self.frame_size();
        if frame_size == 0 || self.sample_rate == 0 {
            return 0.0;
        }
        (pcm_len / frame_size) as f64 / self.sample_rate as f64
    }
}

/// Supported PCM sample widths.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SampleWidth {
    /// Unsigned 8-bit samples centred on 128.
    Eight,
    /// Signed little-endian 16-bit samples.
    Sixteen,
}

impl SampleWidth {
    /// Maps a bits-per-sample value onto a supported width.
    pub fn from_bits(bits: u16) -> WavResult<Self> {
        match bits {
            8 => Ok(SampleWidth::Eight),
            16 => Ok(SampleWidth::Sixteen),
            _ => Err(WavError::UnsupportedSampleWidth { bits }),
        }
    }

    /// Bytes occupied by one sample of one channel.
    pub fn bytes(self) -> usize {
        match self {
            SampleWidth::Eight => 1,
            SampleWidth::Sixteen => 2,
        }
    }

    /// Normalizes the sample starting at `bytes[0]` to roughly [-1.0, 1.0].
    ///
    /// `bytes` must hold at least [`SampleWidth::bytes`] bytes.
    pub fn normalize(self, bytes: &[u8]) -> f32 {
        match self {
            SampleWidth::Eight => (bytes[0] as f32 - 128.0) / 128.0,
            SampleWidth::Sixteen => i16::from_le_bytes([bytes[0], bytes[1]]) as f32 / 32768.0,
        }
    }
}
