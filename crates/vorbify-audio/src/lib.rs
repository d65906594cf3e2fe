//! vorbify audio front end
//!
//! This crate turns WAV files into the per-channel float buffers the Ogg
//! Vorbis encode driver consumes:
//!
//! - [`wav`] - Chunked RIFF/WAVE parser (linear PCM, 8 or 16 bit)
//! - [`resample`] - Duration-preserving nearest-index resampler
//! - [`serial`] - Injectable Ogg stream serial number sources
//!
//! # Example
//!
//! ```ignore
//! use vorbify_audio::{load_samples, TargetFormat};
//!
//! let file = std::fs::File::open("input.wav")?;
//! let (format, buffer) = load_samples(std::io::BufReader::new(file), TargetFormat::stereo(44100))?;
//! println!("{} Hz source -> {} samples", format.sample_rate, buffer.num_samples());
//! ```

pub mod error;
pub mod resample;
pub mod serial;
pub mod wav;

use std::io::Read;

// Re-export main types at crate root
pub use error::{WavError, WavResult};
pub use resample::{resample, SampleBuffer, TargetFormat, MAX_OUTPUT_SAMPLES, WRITE_BUFFER_SIZE};
pub use serial::{FixedSerial, RandomSerials, SeededSerials, SerialSource};
pub use wav::{parse_wav, ParsedWav, PcmPayload, WaveFormat};

/// Parses a WAV stream and resamples its payload to `target`.
///
/// A stream without a `fmt ` or `data` chunk yields
/// [`WavError::MissingChunk`], which callers treat as "skip this file".
pub fn load_samples<R: Read>(
    reader: R,
    target: TargetFormat,
) -> WavResult<(WaveFormat, SampleBuffer)> {
    let (format, pcm) = parse_wav(reader)?.into_complete()?;
    let buffer = resample(&pcm, &format, target)?;
    Ok((format, buffer))
}
