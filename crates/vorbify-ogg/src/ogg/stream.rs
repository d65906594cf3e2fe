//! Logical stream framer backed by libogg.

use std::fmt;
use std::mem;
use std::os::raw::{c_int, c_long};
use std::slice;

use log::{debug, warn};
use ogg_next_sys::{
    ogg_packet, ogg_page, ogg_stream_clear, ogg_stream_flush, ogg_stream_init,
    ogg_stream_packetin, ogg_stream_pageout, ogg_stream_state,
};

use crate::engine::OggStream;
use crate::error::{EncodeError, EncodeResult};
use crate::packet::{Packet, Page};

/// Copies `len` bytes owned by libogg.
///
/// # Safety
/// `ptr` must point at `len` readable bytes (or be null).
unsafe fn copy_bytes(ptr: *const u8, len: c_long) -> Vec<u8> {
    if ptr.is_null() || len <= 0 {
        return Vec::new();
    }
    slice::from_raw_parts(ptr, len as usize).to_vec()
}

/// Packs packets into pages for one logical stream.
///
/// The first page carries only the first packet. Non-forced pages are
/// released once the body passes 4096 bytes on a packet boundary or the
/// segment table is full. Once an end-of-stream packet is queued every
/// call releases a page until the queue is empty; the last one is flagged
/// end-of-stream.
pub struct OggStreamState {
    raw: Box<ogg_stream_state>,
    serial: u32,
}

impl OggStreamState {
    /// Opens a stream with the given serial number.
    pub fn new(serial: u32) -> Self {
        // SAFETY: all-zero is a valid pre-init ogg_stream_state, and
        // ogg_stream_clear tolerates a failed init.
        let mut raw = Box::new(unsafe { mem::zeroed::<ogg_stream_state>() });
        // The serial field is a C int; the bit pattern is what lands on the page.
        let ret = unsafe { ogg_stream_init(&mut *raw, serial as c_int) };
        if ret != 0 {
            warn!("ogg_stream_init failed for stream {:#010x}", serial);
        }
        Self { raw, serial }
    }

    /// Number of pages released so far.
    pub fn pages_out(&self) -> u32 {
        self.raw.pageno as u32
    }

    /// Number of packets accepted so far.
    pub fn packets_in(&self) -> u64 {
        self.raw.packetno as u64
    }

    /// Body bytes waiting for a page.
    pub fn pending_bytes(&self) -> usize {
        (self.raw.body_fill - self.raw.body_returned).max(0) as usize
    }

    fn eos_queued(&self) -> bool {
        self.raw.e_o_s != 0
    }
}

impl Drop for OggStreamState {
    fn drop(&mut self) {
        unsafe { ogg_stream_clear(&mut *self.raw) };
    }
}

impl fmt::Debug for OggStreamState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OggStreamState")
            .field("serial", &self.serial)
            .field("pages_out", &self.pages_out())
            .field("packets_in", &self.packets_in())
            .field("pending_bytes", &self.pending_bytes())
            .field("eos_queued", &self.eos_queued())
            .finish()
    }
}

impl OggStream for OggStreamState {
    fn serial(&self) -> u32 {
        self.serial
    }

    fn submit_packet(&mut self, packet: Packet) -> EncodeResult<()> {
        if self.eos_queued() {
            return Err(EncodeError::StreamFinished {
                serial: self.serial,
            });
        }

        let mut data = packet.data;
        // SAFETY: libogg copies the payload during packetin.
        let mut op: ogg_packet = unsafe { mem::zeroed() };
        op.packet = data.as_mut_ptr();
        op.bytes = data.len() as c_long;
        op.b_o_s = packet.bos as c_long;
        op.e_o_s = packet.eos as c_long;
        op.granulepos = packet.granule_position;
        op.packetno = packet.packet_no;

        let ret = unsafe { ogg_stream_packetin(&mut *self.raw, &mut op) };
        if ret != 0 {
            return Err(EncodeError::engine(format!(
                "ogg_stream_packetin failed on stream {:#010x}",
                self.serial
            )));
        }
        Ok(())
    }

    fn page_out(&mut self, force: bool) -> Option<Page> {
        let mut og: ogg_page = unsafe { mem::zeroed() };
        let ret = unsafe {
            if force {
                ogg_stream_flush(&mut *self.raw, &mut og)
            } else {
                ogg_stream_pageout(&mut *self.raw, &mut og)
            }
        };
        if ret == 0 {
            return None;
        }

        // SAFETY: the page points into the stream's buffers, which stay
        // valid until the next call on the stream.
        let page = unsafe {
            Page {
                header: copy_bytes(og.header, og.header_len),
                body: copy_bytes(og.body, og.body_len),
            }
        };
        debug!(
            "page {} of stream {:#010x}: {} segments, {} body bytes, granule {}",
            page.sequence(),
            self.serial,
            page.segments().len(),
            page.body.len(),
            page.granule_position()
        );
        Some(page)
    }

    fn is_finished(&self) -> bool {
        self.eos_queued() && self.raw.lacing_fill == 0
    }
}
