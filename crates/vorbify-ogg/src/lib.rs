//! vorbify encode driver
//!
//! This crate turns a resampled [`SampleBuffer`] into an Ogg Vorbis byte
//! stream:
//!
//! - [`engine`] - The encoder engine boundary (header packets, block
//!   analysis, logical stream)
//! - [`ogg`] - Ogg page framer over libogg
//! - [`driver`] - Header/body/finalize state machine
//! - [`sink`] - Page destinations
//! - [`libvorbis`] - Production engine (feature `libvorbis`)
//! - [`fake`] - Deterministic engine for tests (feature `fake-engine`)
//!
//! # Example
//!
//! ```ignore
//! use vorbify_ogg::{encode, Comments, EncodeConfig, LibVorbisEngine, VecSink};
//!
//! let engine = LibVorbisEngine::new();
//! let (sink, stats) = encode(&engine, &buffer, EncodeConfig::default(), &Comments::new(), 0x1234, VecSink::new())?;
//! println!("{} pages, {} bytes", stats.pages, stats.bytes);
//! ```

pub mod config;
pub mod driver;
pub mod engine;
pub mod error;
pub mod ogg;
pub mod packet;
pub mod sink;

#[cfg(any(test, feature = "fake-engine"))]
pub mod fake;

#[cfg(feature = "libvorbis")]
pub mod libvorbis;

use vorbify_audio::SampleBuffer;

// Re-export main types at crate root
pub use config::{EncodeConfig, DEFAULT_QUALITY};
pub use driver::{DriverState, EncodeDriver, EncodeStats};
pub use engine::{BlockEncoder, Comments, EncoderEngine, HeaderPackets, OggStream};
pub use error::{EncodeError, EncodeResult};
pub use ogg::OggStreamState;
pub use packet::{Packet, Page};
pub use sink::{PageSink, VecSink, WriterSink};

#[cfg(feature = "fake-engine")]
pub use fake::{FakeEncoder, FakeEngine};

#[cfg(feature = "libvorbis")]
pub use libvorbis::{LibVorbisEncoder, LibVorbisEngine, LibVorbisInfo};

/// Encodes `buffer` as one logical stream with the given serial.
///
/// Runs a full [`EncodeDriver`] session and returns the sink with the
/// session counters.
pub fn encode<E: EncoderEngine, S: PageSink>(
    engine: &E,
    buffer: &SampleBuffer,
    config: EncodeConfig,
    comments: &Comments,
    serial: u32,
    sink: S,
) -> EncodeResult<(S, EncodeStats)> {
    EncodeDriver::new(engine, config, serial, sink)?.run(buffer, comments)
}
