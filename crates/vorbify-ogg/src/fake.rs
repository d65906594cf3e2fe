//! Deterministic stand-in encoder engine.
//!
//! Produces Vorbis-shaped header packets and one audio packet per sample
//! window, with a configurable lookahead so packets lag behind the data
//! the way a real block encoder's do. Pages come from the real
//! [`OggStreamState`] framer, so output is valid Ogg.

use std::collections::VecDeque;

use crate::engine::{BlockEncoder, Comments, EncoderEngine, HeaderPackets};
use crate::error::{EncodeError, EncodeResult};
use crate::ogg::OggStreamState;
use crate::packet::Packet;

/// Header packet type bytes.
const PACKET_INFO: u8 = 1;
const PACKET_COMMENTS: u8 = 3;
const PACKET_BOOKS: u8 = 5;

/// Stream parameters recorded by [`FakeEngine::create_info`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FakeInfo {
    /// Channel count.
    pub channels: u16,
    /// Sample rate in Hz.
    pub sample_rate: u32,
    /// VBR quality.
    pub quality: f32,
}

/// Test engine.
#[derive(Debug, Clone)]
pub struct FakeEngine {
    /// Windows held back before their packet is released.
    pub lookahead: usize,
    /// Size of the fake setup header, to exercise multi-page headers.
    pub books_len: usize,
    /// Whether end-of-stream produces a packet flagged `eos`.
    pub emit_eos: bool,
    /// Ends the stream on its own after this many windows, flagging the
    /// packet of that window `eos` before any end-of-stream signal.
    pub eos_after_windows: Option<usize>,
}

impl Default for FakeEngine {
    fn default() -> Self {
        Self {
            lookahead: 1,
            books_len: 64,
            emit_eos: true,
            eos_after_windows: None,
        }
    }
}

impl FakeEngine {
    /// Creates an engine with default behavior.
    pub fn new() -> Self {
        Self::default()
    }

    fn header(kind: u8, payload: &[u8]) -> Vec<u8> {
        let mut data = Vec::with_capacity(7 + payload.len());
        data.push(kind);
        data.extend_from_slice(b"vorbis");
        data.extend_from_slice(payload);
        data
    }
}

impl EncoderEngine for FakeEngine {
    type Info = FakeInfo;
    type Stream = OggStreamState;
    type Encoder = FakeEncoder;

    fn create_info(&self, channels: u16, sample_rate: u32, quality: f32) -> EncodeResult<FakeInfo> {
        if channels == 0 || channels > 255 {
            return Err(EncodeError::engine(format!(
                "unsupported channel count {}",
                channels
            )));
        }
        Ok(FakeInfo {
            channels,
            sample_rate,
            quality,
        })
    }

    fn header_packets(&self, info: &FakeInfo, comments: &Comments) -> EncodeResult<HeaderPackets> {
        let mut id = vec![info.channels as u8];
        id.extend_from_slice(&info.sample_rate.to_le_bytes());
        id.extend_from_slice(&info.quality.to_le_bytes());

        let mut comment_bytes = Vec::new();
        for comment in comments.to_strings() {
            comment_bytes.extend_from_slice(&(comment.len() as u32).to_le_bytes());
            comment_bytes.extend_from_slice(comment.as_bytes());
        }

        let books: Vec<u8> = (0..self.books_len).map(|i| (i % 251) as u8).collect();

        Ok(HeaderPackets {
            info: Packet::new(Self::header(PACKET_INFO, &id), 0, 0).with_bos(),
            comments: Packet::new(Self::header(PACKET_COMMENTS, &comment_bytes), 0, 1),
            books: Packet::new(Self::header(PACKET_BOOKS, &books), 0, 2),
        })
    }

    fn new_stream(&self, serial: u32) -> OggStreamState {
        OggStreamState::new(serial)
    }

    fn new_encoder(&self, info: &FakeInfo) -> EncodeResult<FakeEncoder> {
        Ok(FakeEncoder {
            channels: info.channels as usize,
            lookahead: self.lookahead,
            emit_eos: self.emit_eos,
            eos_after_windows: self.eos_after_windows,
            windows: 0,
            held: VecDeque::new(),
            ready: VecDeque::new(),
            granule: 0,
            packet_no: 3,
            eos_written: false,
            finished: false,
            packets_out: 0,
        })
    }
}

/// Per-file fake analysis state.
#[derive(Debug)]
pub struct FakeEncoder {
    channels: usize,
    lookahead: usize,
    emit_eos: bool,
    eos_after_windows: Option<usize>,
    windows: usize,
    held: VecDeque<Packet>,
    ready: VecDeque<Packet>,
    granule: i64,
    packet_no: i64,
    eos_written: bool,
    finished: bool,
    packets_out: usize,
}

impl FakeEncoder {
    /// Packets released so far.
    pub fn packets_out(&self) -> usize {
        self.packets_out
    }

    /// Whether the end-of-stream packet has been released.
    pub fn is_finished(&self) -> bool {
        self.finished
    }

    /// Whether end-of-stream has been signalled.
    pub fn eos_written(&self) -> bool {
        self.eos_written
    }

    /// Sample windows accepted.
    pub fn windows(&self) -> usize {
        self.windows
    }

    /// Packets produced but not yet released.
    pub fn pending(&self) -> usize {
        self.held.len() + self.ready.len()
    }
}

impl BlockEncoder for FakeEncoder {
    fn write_data(&mut self, buffers: &[Vec<f32>], window: usize, offset: usize) -> EncodeResult<()> {
        if self.eos_written {
            return Err(EncodeError::engine("data written after end of stream"));
        }
        if buffers.len() < self.channels {
            return Err(EncodeError::engine(format!(
                "expected {} channels, got {}",
                self.channels,
                buffers.len()
            )));
        }
        let mut data = Vec::with_capacity(window * self.channels);
        for channel in &buffers[..self.channels] {
            let Some(samples) = channel.get(offset..offset + window) else {
                return Err(EncodeError::engine(format!(
                    "window {}..{} out of range for {} samples",
                    offset,
                    offset + window,
                    channel.len()
                )));
            };
            data.extend(samples.iter().map(|s| (s.clamp(-1.0, 1.0) * 127.0) as i8 as u8));
        }

        self.granule += window as i64;
        self.held
            .push_back(Packet::new(data, self.granule, self.packet_no));
        self.packet_no += 1;
        self.windows += 1;

        if self.eos_after_windows == Some(self.windows) {
            self.eos_written = true;
            self.ready.extend(self.held.drain(..));
            if let Some(last) = self.ready.back_mut() {
                last.eos = true;
            }
            return Ok(());
        }
        while self.held.len() > self.lookahead {
            if let Some(packet) = self.held.pop_front() {
                self.ready.push_back(packet);
            }
        }
        Ok(())
    }

    fn write_end_of_stream(&mut self) -> EncodeResult<()> {
        if self.eos_written {
            return Ok(());
        }
        self.eos_written = true;
        self.ready.extend(self.held.drain(..));
        if self.emit_eos {
            match self.ready.back_mut() {
                Some(last) => last.eos = true,
                None => {
                    self.ready
                        .push_back(Packet::new(Vec::new(), self.granule, self.packet_no).with_eos());
                    self.packet_no += 1;
                }
            }
        }
        Ok(())
    }

    fn packet_out(&mut self) -> EncodeResult<Option<Packet>> {
        if self.finished {
            return Ok(None);
        }
        let packet = self.ready.pop_front();
        if let Some(packet) = &packet {
            self.packets_out += 1;
            if packet.eos {
                self.finished = true;
            }
        }
        Ok(packet)
    }
}
