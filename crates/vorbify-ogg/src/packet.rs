//! Encoder packets and Ogg pages.

use std::os::raw::c_long;

use byteorder::{ByteOrder, LittleEndian};
use ogg_next_sys::{ogg_page, ogg_page_checksum_set};

/// Four-byte capture pattern at the start of every Ogg page.
pub const OGG_MAGIC: &[u8; 4] = b"OggS";

/// Header type flag: first segment continues a packet from the previous page.
pub const FLAG_CONTINUED: u8 = 0x01;
/// Header type flag: first page of a logical stream.
pub const FLAG_BOS: u8 = 0x02;
/// Header type flag: last page of a logical stream.
pub const FLAG_EOS: u8 = 0x04;

/// Length of the fixed part of a page header, before the lacing table.
pub const PAGE_HEADER_BASE: usize = 27;

/// One encoder-produced packet.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Packet {
    /// Packet payload.
    pub data: Vec<u8>,
    /// Granule position after this packet, or -1 if unknown.
    pub granule_position: i64,
    /// Sequence number within the logical stream.
    pub packet_no: i64,
    /// First packet of the logical stream.
    pub bos: bool,
    /// Last packet of the logical stream.
    pub eos: bool,
}

impl Packet {
    /// Creates a mid-stream packet.
    pub fn new(data: Vec<u8>, granule_position: i64, packet_no: i64) -> Self {
        Self {
            data,
            granule_position,
            packet_no,
            bos: false,
            eos: false,
        }
    }

    /// Marks the packet as beginning the stream.
    pub fn with_bos(mut self) -> Self {
        self.bos = true;
        self
    }

    /// Marks the packet as ending the stream.
    pub fn with_eos(mut self) -> Self {
        self.eos = true;
        self
    }

    /// Payload length.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Whether the payload is empty.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

/// A complete Ogg page: header (including lacing table) and body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page {
    /// Header bytes, starting with `OggS`.
    pub header: Vec<u8>,
    /// Body bytes.
    pub body: Vec<u8>,
}

impl Page {
    /// Total page length.
    pub fn len(&self) -> usize {
        self.header.len() + self.body.len()
    }

    /// Whether the page carries no bytes at all.
    pub fn is_empty(&self) -> bool {
        self.header.is_empty() && self.body.is_empty()
    }

    /// Header followed by body.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.len());
        out.extend_from_slice(&self.header);
        out.extend_from_slice(&self.body);
        out
    }

    /// Whether the header starts with the capture pattern.
    pub fn has_magic(&self) -> bool {
        self.header.starts_with(OGG_MAGIC)
    }

    fn header_type(&self) -> u8 {
        self.header[5]
    }

    /// Continued-packet flag.
    pub fn is_continued(&self) -> bool {
        self.header_type() & FLAG_CONTINUED != 0
    }

    /// Beginning-of-stream flag.
    pub fn is_bos(&self) -> bool {
        self.header_type() & FLAG_BOS != 0
    }

    /// End-of-stream flag.
    pub fn is_eos(&self) -> bool {
        self.header_type() & FLAG_EOS != 0
    }

    /// Granule position of the last packet completed on this page.
    pub fn granule_position(&self) -> i64 {
        LittleEndian::read_i64(&self.header[6..14])
    }

    /// Logical stream serial number.
    pub fn serial(&self) -> u32 {
        LittleEndian::read_u32(&self.header[14..18])
    }

    /// Page sequence number.
    pub fn sequence(&self) -> u32 {
        LittleEndian::read_u32(&self.header[18..22])
    }

    /// CRC stored in the header.
    pub fn checksum(&self) -> u32 {
        LittleEndian::read_u32(&self.header[22..26])
    }

    /// Whether the stored CRC matches the one libogg computes for this page.
    pub fn has_valid_checksum(&self) -> bool {
        if self.header.len() < PAGE_HEADER_BASE {
            return false;
        }
        let mut header = self.header.clone();
        let mut body = self.body.clone();
        let mut og = ogg_page {
            header: header.as_mut_ptr(),
            header_len: header.len() as c_long,
            body: body.as_mut_ptr(),
            body_len: body.len() as c_long,
        };
        // SAFETY: both pointers cover their owned copies for the call.
        unsafe { ogg_page_checksum_set(&mut og) };
        header == self.header
    }

    /// Lacing values.
    pub fn segments(&self) -> &[u8] {
        &self.header[PAGE_HEADER_BASE..]
    }

    /// Number of packets that end on this page.
    pub fn completed_packets(&self) -> usize {
        self.segments().iter().filter(|&&lace| lace < 255).count()
    }
}
