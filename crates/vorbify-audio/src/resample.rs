//! Duration-preserving nearest-index PCM resampling.
//!
//! Raw 8- or 16-bit interleaved PCM is converted into one normalized
//! `f32` buffer per output channel. The output length is
//! `floor(duration * target_rate)` rounded down to a multiple of the write
//! buffer size, so the trailing partial window is dropped rather than
//! padded.
//!
//! This is index mapping by sample-count ratio, not a band-limited
//! resampler: when the source and target rates differ, source frames are
//! skipped or repeated with no interpolation or anti-aliasing.
//!
//! Output channels beyond the source channel count read from channel 0's
//! position in each frame.

use log::debug;

use crate::error::{WavError, WavResult};
use crate::wav::{PcmPayload, WaveFormat};

/// Samples per encoder window; output lengths are a multiple of this.
pub const WRITE_BUFFER_SIZE: usize = 512;

/// Upper bound on resampled samples summed over all output channels
/// (4 GiB of `f32`).
pub const MAX_OUTPUT_SAMPLES: usize = 1 << 30;

/// Sample rate and channel layout to resample into.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TargetFormat {
    /// Output sample rate in Hz.
    pub sample_rate: u32,
    /// Output channel count.
    pub channels: u16,
}

impl TargetFormat {
    /// Creates a target format.
    pub fn new(sample_rate: u32, channels: u16) -> Self {
        Self {
            sample_rate,
            channels,
        }
    }

    /// Creates a mono target format.
    pub fn mono(sample_rate: u32) -> Self {
        Self::new(sample_rate, 1)
    }

    /// Creates a stereo target format.
    pub fn stereo(sample_rate: u32) -> Self {
        Self::new(sample_rate, 2)
    }

    fn validate(&self) -> WavResult<()> {
        if self.channels == 0 {
            return Err(WavError::invalid_format("target channel count is zero"));
        }
        if self.sample_rate == 0 {
            return Err(WavError::invalid_format("target sample rate is zero"));
        }
        Ok(())
    }
}

impl Default for TargetFormat {
    fn default() -> Self {
        Self::stereo(44100)
    }
}

/// Per-channel normalized samples, all channels of equal length.
#[derive(Debug, Clone, PartialEq)]
pub struct SampleBuffer {
    channels: Vec<Vec<f32>>,
    sample_rate: u32,
}

impl SampleBuffer {
    /// Allocates `num_channels` zeroed channels of `num_samples` each.
    pub fn zeroed(num_channels: usize, num_samples: usize, sample_rate: u32) -> Self {
        Self {
            channels: vec![vec![0.0; num_samples]; num_channels],
            sample_rate,
        }
    }

    /// Like [`SampleBuffer::zeroed`], but reports allocation failure as an
    /// error instead of aborting.
    pub fn try_zeroed(num_channels: usize, num_samples: usize, sample_rate: u32) -> WavResult<Self> {
        let mut channels = Vec::new();
        channels
            .try_reserve_exact(num_channels)
            .map_err(|_| WavError::invalid_format("resampled output too large"))?;
        for _ in 0..num_channels {
            let mut channel = Vec::new();
            channel
                .try_reserve_exact(num_samples)
                .map_err(|_| WavError::invalid_format("resampled output too large"))?;
            channel.resize(num_samples, 0.0);
            channels.push(channel);
        }
        Ok(Self {
            channels,
            sample_rate,
        })
    }

    /// Builds a buffer from existing channel data.
    ///
    /// Fails if the channels differ in length or there are none.
    pub fn from_channels(channels: Vec<Vec<f32>>, sample_rate: u32) -> WavResult<Self> {
        let Some(first) = channels.first() else {
            return Err(WavError::invalid_format("sample buffer has no channels"));
        };
        let len = first.len();
        if channels.iter().any(|c| c.len() != len) {
            return Err(WavError::invalid_format(
                "sample buffer channels differ in length",
            ));
        }
        Ok(Self {
            channels,
            sample_rate,
        })
    }

    /// Samples per channel.
    pub fn num_samples(&self) -> usize {
        self.channels.first().map_or(0, Vec::len)
    }

    /// Number of channels.
    pub fn num_channels(&self) -> usize {
        self.channels.len()
    }

    /// Sample rate of the buffer contents.
    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// Channel data.
    pub fn channels(&self) -> &[Vec<f32>] {
        &self.channels
    }

    /// One channel's samples.
    pub fn channel(&self, index: usize) -> Option<&[f32]> {
        self.channels.get(index).map(Vec::as_slice)
    }

    /// Duration in seconds.
    pub fn duration_seconds(&self) -> f64 {
        if self.sample_rate == 0 {
            return 0.0;
        }
        self.num_samples() as f64 / self.sample_rate as f64
    }

    /// Consumes the buffer and returns the channel data.
    pub fn into_channels(self) -> Vec<Vec<f32>> {
        self.channels
    }
}

/// Output length for `num_source` frames at the given rates.
///
/// Computes `floor(num_source / source_rate * target_rate)` in integer
/// arithmetic, then rounds down to a multiple of `granularity`.
pub fn output_sample_count(
    num_source: usize,
    source_rate: u32,
    target_rate: u32,
    granularity: usize,
) -> usize {
    if source_rate == 0 || granularity == 0 {
        return 0;
    }
    let exact = num_source as u128 * target_rate as u128 / source_rate as u128;
    let exact = usize::try_from(exact).unwrap_or(usize::MAX);
    exact - exact % granularity
}

/// Resamples `pcm` into [`WRITE_BUFFER_SIZE`]-aligned channel buffers.
pub fn resample(
    pcm: &PcmPayload,
    source: &WaveFormat,
    target: TargetFormat,
) -> WavResult<SampleBuffer> {
    resample_aligned(pcm, source, target, WRITE_BUFFER_SIZE)
}

/// Resamples `pcm` with output length aligned to `granularity` samples.
pub fn resample_aligned(
    pcm: &PcmPayload,
    source: &WaveFormat,
    target: TargetFormat,
    granularity: usize,
) -> WavResult<SampleBuffer> {
    source.validate()?;
    target.validate()?;
    if granularity == 0 {
        return Err(WavError::invalid_format("buffer granularity is zero"));
    }

    let width = source.sample_width()?;
    let width_bytes = width.bytes();
    let source_channels = source.channels as usize;
    let frame_size = source_channels * width_bytes;
    let num_source = pcm.len() / width_bytes / source_channels;

    let num_out = output_sample_count(
        num_source,
        source.sample_rate,
        target.sample_rate,
        granularity,
    );
    debug!(
        "resampling {} frames @ {} Hz -> {} samples @ {} Hz ({} ch)",
        num_source, source.sample_rate, num_out, target.sample_rate, target.channels
    );

    let total = num_out
        .checked_mul(target.channels as usize)
        .filter(|&total| total <= MAX_OUTPUT_SAMPLES);
    if total.is_none() {
        return Err(WavError::invalid_format("resampled output too large"));
    }

    let mut buffer =
        SampleBuffer::try_zeroed(target.channels as usize, num_out, target.sample_rate)?;
    if num_out == 0 {
        return Ok(buffer);
    }

    let bytes = pcm.as_bytes();
    let last_frame = num_source - 1;
    for i in 0..num_out {
        let frame = source_frame_index(i, source.sample_rate, target.sample_rate).min(last_frame);
        let base = frame * frame_size;
        for (c, channel) in buffer.channels.iter_mut().enumerate() {
            let offset = if c < source_channels {
                base + c * width_bytes
            } else {
                base
            };
            channel[i] = width.normalize(&bytes[offset..offset + width_bytes]);
        }
    }

    Ok(buffer)
}

/// Source frame used for output sample `index`.
fn source_frame_index(index: usize, source_rate: u32, target_rate: u32) -> usize {
    if source_rate == target_rate {
        return index;
    }
    (index as u128 * source_rate as u128 / target_rate as u128) as usize
}
