//! Encoder engine backed by libvorbis (aoTuV/Lancer build).
//!
//! Vorbis analysis comes from libvorbis and pages from the libogg-backed
//! [`OggStreamState`]. Each C state object lives in its own `Box`: a block
//! points at its DSP state and a DSP state at its info. Every wrapper
//! clears its object on drop.

use std::ffi::CString;
use std::mem;
use std::os::raw::{c_int, c_long};
use std::ptr;
use std::rc::Rc;
use std::slice;

use aotuv_lancer_vorbis_sys::{
    vorbis_analysis, vorbis_analysis_blockout, vorbis_analysis_buffer, vorbis_analysis_headerout,
    vorbis_analysis_init, vorbis_analysis_wrote, vorbis_bitrate_addblock,
    vorbis_bitrate_flushpacket, vorbis_block, vorbis_block_clear, vorbis_block_init,
    vorbis_comment, vorbis_comment_add_tag, vorbis_comment_clear, vorbis_comment_init,
    vorbis_dsp_clear, vorbis_dsp_state, vorbis_encode_init_vbr, vorbis_info, vorbis_info_clear,
    vorbis_info_init,
};
use log::debug;
use ogg_next_sys::ogg_packet;

use crate::engine::{BlockEncoder, Comments, EncoderEngine, HeaderPackets};
use crate::error::{EncodeError, EncodeResult};
use crate::ogg::OggStreamState;
use crate::packet::Packet;

fn check(ret: c_int, call: &'static str) -> EncodeResult<c_int> {
    if ret < 0 {
        return Err(EncodeError::engine(format!("{} failed with code {}", call, ret)));
    }
    Ok(ret)
}

/// Copies a library-owned packet into an owned [`Packet`].
///
/// # Safety
/// `op.packet` must point at `op.bytes` readable bytes (or be null).
unsafe fn copy_packet(op: &ogg_packet) -> Packet {
    let data = if op.packet.is_null() || op.bytes <= 0 {
        Vec::new()
    } else {
        slice::from_raw_parts(op.packet, op.bytes as usize).to_vec()
    };
    Packet {
        data,
        granule_position: op.granulepos,
        packet_no: op.packetno,
        bos: op.b_o_s != 0,
        eos: op.e_o_s != 0,
    }
}

struct InfoHandle {
    raw: *mut vorbis_info,
}

impl InfoHandle {
    fn new() -> Self {
        // SAFETY: vorbis_info is plain C data; all-zero is its cleared state.
        let raw = Box::into_raw(Box::new(unsafe { mem::zeroed::<vorbis_info>() }));
        unsafe { vorbis_info_init(raw) };
        Self { raw }
    }
}

impl Drop for InfoHandle {
    fn drop(&mut self) {
        // SAFETY: raw came from Box::into_raw and is released exactly once.
        unsafe {
            vorbis_info_clear(self.raw);
            drop(Box::from_raw(self.raw));
        }
    }
}

struct CommentHandle {
    raw: Box<vorbis_comment>,
}

impl CommentHandle {
    fn new(comments: &Comments) -> EncodeResult<Self> {
        // SAFETY: all-zero is a valid pre-init vorbis_comment.
        let mut handle = Self {
            raw: Box::new(unsafe { mem::zeroed::<vorbis_comment>() }),
        };
        unsafe { vorbis_comment_init(&mut *handle.raw) };

        for (tag, value) in comments.tags() {
            let tag = CString::new(tag.as_str())
                .map_err(|_| EncodeError::engine(format!("comment tag {:?} contains NUL", tag)))?;
            let value = CString::new(value.as_str()).map_err(|_| {
                EncodeError::engine(format!("comment value {:?} contains NUL", value))
            })?;
            // SAFETY: libvorbis copies both strings.
            unsafe { vorbis_comment_add_tag(&mut *handle.raw, tag.as_ptr(), value.as_ptr()) };
        }
        Ok(handle)
    }
}

impl Drop for CommentHandle {
    fn drop(&mut self) {
        unsafe { vorbis_comment_clear(&mut *self.raw) };
    }
}

struct DspHandle {
    raw: Box<vorbis_dsp_state>,
    // The DSP state points into the info; keep it alive.
    _info: Rc<InfoHandle>,
}

impl DspHandle {
    fn new(info: &Rc<InfoHandle>) -> EncodeResult<Self> {
        // SAFETY: all-zero is a valid pre-init vorbis_dsp_state, and
        // vorbis_dsp_clear tolerates a failed init.
        let mut handle = Self {
            raw: Box::new(unsafe { mem::zeroed::<vorbis_dsp_state>() }),
            _info: Rc::clone(info),
        };
        let ret = unsafe { vorbis_analysis_init(handle.as_mut_ptr(), info.raw) };
        if ret != 0 {
            return Err(EncodeError::engine(format!(
                "vorbis_analysis_init failed with code {}",
                ret
            )));
        }
        Ok(handle)
    }

    fn as_mut_ptr(&mut self) -> *mut vorbis_dsp_state {
        &mut *self.raw
    }
}

impl Drop for DspHandle {
    fn drop(&mut self) {
        unsafe { vorbis_dsp_clear(&mut *self.raw) };
    }
}

struct BlockHandle {
    raw: Box<vorbis_block>,
}

impl BlockHandle {
    fn new(dsp: &mut DspHandle) -> EncodeResult<Self> {
        // SAFETY: all-zero is a valid pre-init vorbis_block.
        let mut handle = Self {
            raw: Box::new(unsafe { mem::zeroed::<vorbis_block>() }),
        };
        check(
            unsafe { vorbis_block_init(dsp.as_mut_ptr(), handle.as_mut_ptr()) },
            "vorbis_block_init",
        )?;
        Ok(handle)
    }

    fn as_mut_ptr(&mut self) -> *mut vorbis_block {
        &mut *self.raw
    }
}

impl Drop for BlockHandle {
    fn drop(&mut self) {
        unsafe { vorbis_block_clear(&mut *self.raw) };
    }
}

/// Configured libvorbis stream parameters.
#[derive(Clone)]
pub struct LibVorbisInfo {
    handle: Rc<InfoHandle>,
    channels: u16,
    sample_rate: u32,
}

impl LibVorbisInfo {
    /// Channel count.
    pub fn channels(&self) -> u16 {
        self.channels
    }

    /// Sample rate in Hz.
    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }
}

impl std::fmt::Debug for LibVorbisInfo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LibVorbisInfo")
            .field("channels", &self.channels)
            .field("sample_rate", &self.sample_rate)
            .finish()
    }
}

/// Production engine: libvorbis VBR analysis with libogg paging.
#[derive(Debug, Clone, Copy, Default)]
pub struct LibVorbisEngine;

impl LibVorbisEngine {
    /// Creates the engine.
    pub fn new() -> Self {
        Self
    }
}

impl EncoderEngine for LibVorbisEngine {
    type Info = LibVorbisInfo;
    type Stream = OggStreamState;
    type Encoder = LibVorbisEncoder;

    fn create_info(&self, channels: u16, sample_rate: u32, quality: f32) -> EncodeResult<LibVorbisInfo> {
        let handle = InfoHandle::new();
        check(
            unsafe {
                vorbis_encode_init_vbr(
                    handle.raw,
                    channels as c_long,
                    sample_rate as c_long,
                    quality,
                )
            },
            "vorbis_encode_init_vbr",
        )?;
        debug!(
            "libvorbis VBR init: {} ch @ {} Hz, quality {}",
            channels, sample_rate, quality
        );
        Ok(LibVorbisInfo {
            handle: Rc::new(handle),
            channels,
            sample_rate,
        })
    }

    fn header_packets(&self, info: &LibVorbisInfo, comments: &Comments) -> EncodeResult<HeaderPackets> {
        let mut dsp = DspHandle::new(&info.handle)?;
        let mut vc = CommentHandle::new(comments)?;

        // SAFETY: all-zero ogg_packets are filled in by headerout.
        let mut id: ogg_packet = unsafe { mem::zeroed() };
        let mut comm: ogg_packet = unsafe { mem::zeroed() };
        let mut code: ogg_packet = unsafe { mem::zeroed() };
        check(
            unsafe {
                vorbis_analysis_headerout(dsp.as_mut_ptr(), &mut *vc.raw, &mut id, &mut comm, &mut code)
            },
            "vorbis_analysis_headerout",
        )?;

        // The packet buffers belong to `dsp` and `vc`; copy before they drop.
        let headers = unsafe {
            HeaderPackets {
                info: copy_packet(&id),
                comments: copy_packet(&comm),
                books: copy_packet(&code),
            }
        };
        Ok(headers)
    }

    fn new_stream(&self, serial: u32) -> OggStreamState {
        OggStreamState::new(serial)
    }

    fn new_encoder(&self, info: &LibVorbisInfo) -> EncodeResult<LibVorbisEncoder> {
        let mut dsp = DspHandle::new(&info.handle)?;
        let block = BlockHandle::new(&mut dsp)?;
        Ok(LibVorbisEncoder {
            block,
            dsp,
            channels: info.channels as usize,
            in_block: false,
        })
    }
}

/// libvorbis analysis state for one file.
pub struct LibVorbisEncoder {
    // Field order matters: the block must be cleared before its DSP state.
    block: BlockHandle,
    dsp: DspHandle,
    channels: usize,
    in_block: bool,
}

impl BlockEncoder for LibVorbisEncoder {
    fn write_data(&mut self, buffers: &[Vec<f32>], window: usize, offset: usize) -> EncodeResult<()> {
        if buffers.len() < self.channels {
            return Err(EncodeError::engine(format!(
                "expected {} channels, got {}",
                self.channels,
                buffers.len()
            )));
        }
        let end = offset + window;
        if buffers[..self.channels].iter().any(|c| c.len() < end) {
            return Err(EncodeError::engine(format!(
                "window {}..{} exceeds buffer length",
                offset, end
            )));
        }

        let vals = window as c_int;
        // SAFETY: libvorbis returns `channels` pointers, each to at least
        // `window` writable floats.
        unsafe {
            let buffer = vorbis_analysis_buffer(self.dsp.as_mut_ptr(), vals);
            if buffer.is_null() {
                return Err(EncodeError::engine("vorbis_analysis_buffer returned null"));
            }
            for (c, channel) in buffers[..self.channels].iter().enumerate() {
                let dst = *buffer.add(c);
                ptr::copy_nonoverlapping(channel[offset..end].as_ptr(), dst, window);
            }
        }
        check(
            unsafe { vorbis_analysis_wrote(self.dsp.as_mut_ptr(), vals) },
            "vorbis_analysis_wrote",
        )?;
        Ok(())
    }

    fn write_end_of_stream(&mut self) -> EncodeResult<()> {
        check(
            unsafe { vorbis_analysis_wrote(self.dsp.as_mut_ptr(), 0) },
            "vorbis_analysis_wrote",
        )?;
        Ok(())
    }

    fn packet_out(&mut self) -> EncodeResult<Option<Packet>> {
        loop {
            if self.in_block {
                // SAFETY: filled in by flushpacket; the data is owned by the
                // DSP state and copied immediately.
                let mut op: ogg_packet = unsafe { mem::zeroed() };
                let ret = check(
                    unsafe { vorbis_bitrate_flushpacket(self.dsp.as_mut_ptr(), &mut op) },
                    "vorbis_bitrate_flushpacket",
                )?;
                if ret > 0 {
                    return Ok(Some(unsafe { copy_packet(&op) }));
                }
                self.in_block = false;
            }

            let ready = check(
                unsafe { vorbis_analysis_blockout(self.dsp.as_mut_ptr(), self.block.as_mut_ptr()) },
                "vorbis_analysis_blockout",
            )?;
            if ready == 0 {
                return Ok(None);
            }
            check(
                unsafe { vorbis_analysis(self.block.as_mut_ptr(), ptr::null_mut()) },
                "vorbis_analysis",
            )?;
            check(
                unsafe { vorbis_bitrate_addblock(self.block.as_mut_ptr()) },
                "vorbis_bitrate_addblock",
            )?;
            self.in_block = true;
        }
    }
}
