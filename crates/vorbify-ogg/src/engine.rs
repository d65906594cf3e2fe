//! Encoder engine boundary.
//!
//! The Vorbis bitstream encoder is an external collaborator. The encode
//! driver only talks to it through these traits, which split the engine
//! into three capabilities:
//!
//! - [`EncoderEngine`] builds stream parameters and the three header packets
//!   and hands out per-file streams and encoders.
//! - [`OggStream`] accepts packets and releases Ogg pages.
//! - [`BlockEncoder`] accepts sample windows and releases audio packets.

use crate::error::EncodeResult;
use crate::packet::{Packet, Page};

/// The three mandatory Vorbis header packets.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeaderPackets {
    /// Identification header.
    pub info: Packet,
    /// Comment header.
    pub comments: Packet,
    /// Setup header carrying the codebooks.
    pub books: Packet,
}

impl HeaderPackets {
    /// Packets in submission order.
    pub fn into_array(self) -> [Packet; 3] {
        [self.info, self.comments, self.books]
    }
}

/// User comments written to the comment header.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Comments {
    tags: Vec<(String, String)>,
}

impl Comments {
    /// Creates an empty comment list.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a `TAG=value` comment.
    pub fn with_tag(mut self, tag: impl Into<String>, value: impl Into<String>) -> Self {
        self.add_tag(tag, value);
        self
    }

    /// Adds a `TAG=value` comment in place.
    pub fn add_tag(&mut self, tag: impl Into<String>, value: impl Into<String>) {
        self.tags.push((tag.into(), value.into()));
    }

    /// Tags in insertion order.
    pub fn tags(&self) -> &[(String, String)] {
        &self.tags
    }

    /// Comments rendered as `TAG=value` strings.
    pub fn to_strings(&self) -> Vec<String> {
        self.tags
            .iter()
            .map(|(tag, value)| format!("{}={}", tag, value))
            .collect()
    }
}

/// Logical Ogg stream: packets in, pages out.
pub trait OggStream {
    /// Serial number stamped on every page.
    fn serial(&self) -> u32;

    /// Queues a packet for paging.
    ///
    /// Fails once the stream has received its end-of-stream packet.
    fn submit_packet(&mut self, packet: Packet) -> EncodeResult<()>;

    /// Releases the next page if one is ready.
    ///
    /// With `force` set, buffered data is paged out even if the page is
    /// below its natural size threshold. Call repeatedly until `None`.
    fn page_out(&mut self, force: bool) -> Option<Page>;

    /// Whether the end-of-stream page has been released.
    fn is_finished(&self) -> bool;
}

/// Per-file analysis state: sample windows in, audio packets out.
pub trait BlockEncoder {
    /// Submits `window` samples per channel starting at `offset`.
    fn write_data(&mut self, buffers: &[Vec<f32>], window: usize, offset: usize)
        -> EncodeResult<()>;

    /// Signals that no more samples follow.
    fn write_end_of_stream(&mut self) -> EncodeResult<()>;

    /// Releases the next available packet. Call repeatedly until `None`.
    fn packet_out(&mut self) -> EncodeResult<Option<Packet>>;
}

/// Factory for everything one encode session needs.
pub trait EncoderEngine {
    /// Stream parameters (channels, rate, quality).
    type Info;
    /// Stream implementation handed to the driver.
    type Stream: OggStream;
    /// Encoder implementation handed to the driver.
    type Encoder: BlockEncoder;

    /// Configures a variable-bitrate stream.
    fn create_info(&self, channels: u16, sample_rate: u32, quality: f32)
        -> EncodeResult<Self::Info>;

    /// Builds the identification, comment and setup packets.
    fn header_packets(&self, info: &Self::Info, comments: &Comments)
        -> EncodeResult<HeaderPackets>;

    /// Opens a logical stream with the given serial number.
    fn new_stream(&self, serial: u32) -> Self::Stream;

    /// Creates the analysis state for one file.
    fn new_encoder(&self, info: &Self::Info) -> EncodeResult<Self::Encoder>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_comments_render_in_order() {
        let comments = Comments::new()
            .with_tag("ENCODER", "vorbify")
            .with_tag("TITLE", "take 1");
        assert_eq!(
            comments.to_strings(),
            vec!["ENCODER=vorbify".to_string(), "TITLE=take 1".to_string()]
        );
    }

    #[test]
    fn test_header_packets_array_order() {
        let headers = HeaderPackets {
            info: Packet::new(vec![1], 0, 0).with_bos(),
            comments: Packet::new(vec![3], 0, 1),
            books: Packet::new(vec![5], 0, 2),
        };
        let [info, comments, books] = headers.into_array();
        assert_eq!(info.data, vec![1]);
        assert!(info.bos);
        assert_eq!(comments.data, vec![3]);
        assert_eq!(books.data, vec![5]);
    }
}
