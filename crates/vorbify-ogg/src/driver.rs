//! Encode driver state machine.
//!
//! One driver encodes one file:
//!
//! 1. `HeaderEmission` - the three header packets are submitted and the
//!    stream is force-flushed so audio starts on a fresh page.
//! 2. `BodyStreaming` - sample windows go to the encoder; after every
//!    submission all ready packets are moved into the stream, with a
//!    non-forced page flush after each packet. When the read offset
//!    reaches the end of the buffer the encoder gets end-of-stream instead.
//! 3. `Finalized` - a last forced flush releases whatever is still
//!    buffered.
//!
//! Nothing is submitted to a stream that reports itself finished.

use log::debug;
use vorbify_audio::SampleBuffer;

use crate::config::EncodeConfig;
use crate::engine::{BlockEncoder, Comments, EncoderEngine, OggStream};
use crate::error::{EncodeError, EncodeResult};
use crate::sink::PageSink;

/// Driver lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DriverState {
    /// Header packets not yet written.
    HeaderEmission,
    /// Headers flushed; audio windows are being encoded.
    BodyStreaming,
    /// Final flush done; no more output.
    Finalized,
}

/// Counters collected during one session.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EncodeStats {
    /// Sample windows submitted to the encoder.
    pub windows: usize,
    /// Packets submitted to the stream, headers included.
    pub packets: usize,
    /// Pages written to the sink.
    pub pages: usize,
    /// Bytes written to the sink.
    pub bytes: usize,
    /// Samples per channel encoded.
    pub samples: usize,
}

/// Drives one encode session from headers to the final page.
pub struct EncodeDriver<'e, E: EncoderEngine, S: PageSink> {
    engine: &'e E,
    info: E::Info,
    stream: E::Stream,
    encoder: E::Encoder,
    sink: S,
    config: EncodeConfig,
    state: DriverState,
    stats: EncodeStats,
}

impl<'e, E: EncoderEngine, S: PageSink> EncodeDriver<'e, E, S> {
    /// Sets up the engine state for a new stream with `serial`.
    pub fn new(engine: &'e E, config: EncodeConfig, serial: u32, sink: S) -> EncodeResult<Self> {
        config.validate()?;
        let info = engine.create_info(
            config.target.channels,
            config.target.sample_rate,
            config.quality,
        )?;
        let encoder = engine.new_encoder(&info)?;
        let stream = engine.new_stream(serial);
        debug!(
            "encode session {:#010x}: {} ch @ {} Hz, quality {}",
            serial, config.target.channels, config.target.sample_rate, config.quality
        );

        Ok(Self {
            engine,
            info,
            stream,
            encoder,
            sink,
            config,
            state: DriverState::HeaderEmission,
            stats: EncodeStats::default(),
        })
    }

    /// Current lifecycle state.
    pub fn state(&self) -> DriverState {
        self.state
    }

    /// Counters so far.
    pub fn stats(&self) -> EncodeStats {
        self.stats
    }

    /// The logical stream.
    pub fn stream(&self) -> &E::Stream {
        &self.stream
    }

    /// The encoder, for inspection after finalization.
    pub fn encoder_mut(&mut self) -> &mut E::Encoder {
        &mut self.encoder
    }

    /// The page sink.
    pub fn sink(&self) -> &S {
        &self.sink
    }

    /// Writes the identification, comment and setup headers.
    pub fn emit_headers(&mut self, comments: &Comments) -> EncodeResult<()> {
        self.expect_state(DriverState::HeaderEmission)?;

        let headers = self.engine.header_packets(&self.info, comments)?;
        for packet in headers.into_array() {
            self.stream.submit_packet(packet)?;
            self.stats.packets += 1;
        }
        self.flush_pages(true)?;

        self.state = DriverState::BodyStreaming;
        Ok(())
    }

    /// Encodes every window of `buffer`, then performs the final flush.
    pub fn stream_body(&mut self, buffer: &SampleBuffer) -> EncodeResult<()> {
        self.expect_state(DriverState::BodyStreaming)?;
        self.check_buffer(buffer)?;

        let total = buffer.num_samples();
        let window = self.config.window;
        let mut offset = 0;
        let mut eos_signalled = false;

        while !eos_signalled && !self.stream.is_finished() {
            if offset == total {
                self.encoder.write_end_of_stream()?;
                eos_signalled = true;
            } else {
                self.encoder.write_data(buffer.channels(), window, offset)?;
                offset += window;
                self.stats.windows += 1;
                self.stats.samples += window;
            }
            self.drain_packets()?;
        }

        self.flush_pages(true)?;
        self.state = DriverState::Finalized;
        debug!(
            "encode session {:#010x} finalized: {} windows, {} packets, {} pages",
            self.stream.serial(),
            self.stats.windows,
            self.stats.packets,
            self.stats.pages
        );
        Ok(())
    }

    /// Flushes the sink and returns it with the session counters.
    pub fn finish(mut self) -> EncodeResult<(S, EncodeStats)> {
        self.expect_state(DriverState::Finalized)?;
        self.sink.finish()?;
        Ok((self.sink, self.stats))
    }

    /// Runs the whole session: headers, body, final flush.
    pub fn run(
        mut self,
        buffer: &SampleBuffer,
        comments: &Comments,
    ) -> EncodeResult<(S, EncodeStats)> {
        self.emit_headers(comments)?;
        self.stream_body(buffer)?;
        self.finish()
    }

    fn drain_packets(&mut self) -> EncodeResult<()> {
        while !self.stream.is_finished() {
            let Some(packet) = self.encoder.packet_out()? else {
                break;
            };
            self.stream.submit_packet(packet)?;
            self.stats.packets += 1;
            self.flush_pages(false)?;
        }
        Ok(())
    }

    fn flush_pages(&mut self, force: bool) -> EncodeResult<()> {
        while let Some(page) = self.stream.page_out(force) {
            self.sink.write_page(&page)?;
            self.stats.pages += 1;
            self.stats.bytes += page.len();
        }
        Ok(())
    }

    fn check_buffer(&self, buffer: &SampleBuffer) -> EncodeResult<()> {
        let target = self.config.target;
        if buffer.num_channels() != target.channels as usize {
            return Err(EncodeError::invalid_config(format!(
                "buffer has {} channels, stream expects {}",
                buffer.num_channels(),
                target.channels
            )));
        }
        if buffer.sample_rate() != target.sample_rate {
            return Err(EncodeError::invalid_config(format!(
                "buffer is {} Hz, stream expects {} Hz",
                buffer.sample_rate(),
                target.sample_rate
            )));
        }
        if buffer.num_samples() % self.config.window != 0 {
            return Err(EncodeError::invalid_config(format!(
                "buffer length {} is not a multiple of the {}-sample window",
                buffer.num_samples(),
                self.config.window
            )));
        }
        Ok(())
    }

    fn expect_state(&self, expected: DriverState) -> EncodeResult<()> {
        if self.state != expected {
            return Err(EncodeError::InvalidState {
                expected,
                found: self.state,
            });
        }
        Ok(())
    }
}
