//! RIFF/WAVE container parsing.
//!
//! This module walks a WAV byte stream chunk by chunk and extracts the
//! `fmt ` metadata and the raw `data` payload. Only linear PCM is
//! accepted; extended format fields are skipped.

mod format;
mod parser;
mod pcm;

#[cfg(test)]
mod tests;

// Re-export public API
pub use format::{SampleWidth, WaveFormat, FMT_CHUNK_SIZE, WAVE_FORMAT_PCM};
pub use parser::{
    parse_wav, read_chunk_header, ChunkHeader, ParsedWav, DATA_ID, FMT_ID, RIFF_ID, WAVE_ID,
};
pub use pcm::PcmPayload;
