//! Tests for the WAV container parser.

use std::io::Cursor;

use byteorder::{LittleEndian, WriteBytesExt};
use pretty_assertions::assert_eq;

use super::format::{SampleWidth, WaveFormat, WAVE_FORMAT_PCM};
use super::parser::{parse_wav, read_chunk_header, ChunkHeader, ParsedWav};
use super::pcm::PcmPayload;
use crate::error::WavError;

// =========================================================================
// Fixture helpers
// =========================================================================

fn chunk(id: &[u8; 4], body: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(8 + body.len() + 1);
    out.extend_from_slice(id);
    out.write_u32::<LittleEndian>(body.len() as u32).unwrap();
    out.extend_from_slice(body);
    if body.len() % 2 == 1 {
        out.push(0);
    }
    out
}

fn fmt_body(tag: u16, channels: u16, sample_rate: u32, bits: u16) -> Vec<u8> {
    let block_align = channels * (bits / 8);
    let mut body = Vec::with_capacity(16);
    body.write_u16::<LittleEndian>(tag).unwrap();
    body.write_u16::<LittleEndian>(channels).unwrap();
    body.write_u32::<LittleEndian>(sample_rate).unwrap();
    body.write_u32::<LittleEndian>(sample_rate * block_align as u32)
        .unwrap();
    body.write_u16::<LittleEndian>(block_align).unwrap();
    body.write_u16::<LittleEndian>(bits).unwrap();
    body
}

fn riff(chunks: &[Vec<u8>]) -> Vec<u8> {
    let payload: Vec<u8> = chunks.concat();
    let mut out = Vec::new();
    out.extend_from_slice(b"RIFF");
    out.write_u32::<LittleEndian>(4 + payload.len() as u32)
        .unwrap();
    out.extend_from_slice(b"WAVE");
    out.extend_from_slice(&payload);
    out
}

fn parse(bytes: Vec<u8>) -> ParsedWav {
    parse_wav(Cursor::new(bytes)).expect("parse should succeed")
}

// =========================================================================
// Basic structure
// =========================================================================

#[test]
fn test_parse_minimal_pcm16_mono() {
    let pcm = vec![0x00, 0x00, 0xff, 0x7f, 0x00, 0x80];
    let bytes = riff(&[
        chunk(b"fmt ", &fmt_body(1, 1, 22050, 16)),
        chunk(b"data", &pcm),
    ]);

    let parsed = parse(bytes);
    assert_eq!(parsed.form_type, Some(*b"WAVE"));
    assert_eq!(parsed.format, Some(WaveFormat::pcm(1, 22050, 16)));
    assert_eq!(parsed.pcm, Some(PcmPayload::new(pcm)));
    assert!(parsed.is_complete());
}

#[test]
fn test_parse_empty_stream_finds_nothing() {
    let parsed = parse(Vec::new());
    assert_eq!(parsed, ParsedWav::default());
    assert!(!parsed.is_complete());
}

#[test]
fn test_parse_extended_fmt_chunk_skips_extra_fields() {
    let mut body = fmt_body(1, 2, 44100, 16);
    // cbSize plus two bytes of extension data
    body.extend_from_slice(&[2, 0, 0xaa, 0xbb]);
    let bytes = riff(&[chunk(b"fmt ", &body), chunk(b"data", &[1, 2, 3, 4])]);

    let parsed = parse(bytes);
    assert_eq!(parsed.format, Some(WaveFormat::pcm(2, 44100, 16)));
    assert_eq!(parsed.pcm.unwrap().as_bytes(), &[1, 2, 3, 4]);
}

// =========================================================================
// Unknown chunks and padding
// =========================================================================

#[test]
fn test_odd_sized_unknown_chunk_skips_pad_byte() {
    let bytes = riff(&[
        chunk(b"fmt ", &fmt_body(1, 1, 8000, 8)),
        chunk(b"LIST", &[1, 2, 3, 4, 5, 6, 7]),
        chunk(b"data", &[128, 129, 255, 0]),
    ]);

    let parsed = parse(bytes);
    assert_eq!(parsed.pcm.unwrap().as_bytes(), &[128, 129, 255, 0]);
}

#[test]
fn test_even_sized_unknown_chunk_has_no_pad() {
    let bytes = riff(&[
        chunk(b"junk", &[0; 10]),
        chunk(b"fmt ", &fmt_body(1, 1, 8000, 8)),
        chunk(b"data", &[1, 2]),
    ]);

    let parsed = parse(bytes);
    assert!(parsed.is_complete());
    assert_eq!(parsed.pcm.unwrap().as_bytes(), &[1, 2]);
}

#[test]
fn test_chunks_after_data_are_not_visited() {
    let bytes = riff(&[
        chunk(b"fmt ", &fmt_body(1, 1, 8000, 8)),
        chunk(b"data", &[10, 20]),
        // A non-PCM fmt chunk after data would fail if it were parsed.
        chunk(b"fmt ", &fmt_body(3, 1, 8000, 32)),
    ]);

    let parsed = parse(bytes);
    assert_eq!(parsed.format.unwrap().format_tag, WAVE_FORMAT_PCM);
    assert_eq!(parsed.pcm.unwrap().as_bytes(), &[10, 20]);
}

// =========================================================================
// Errors and partial streams
// =========================================================================

#[test]
fn test_non_pcm_format_tag_is_unsupported() {
    let bytes = riff(&[
        chunk(b"fmt ", &fmt_body(3, 1, 44100, 32)),
        chunk(b"data", &[0; 8]),
    ]);

    let err = parse_wav(Cursor::new(bytes)).unwrap_err();
    assert!(matches!(err, WavError::UnsupportedFormat { tag: 3 }));
}

#[test]
fn test_missing_data_chunk_is_reported_by_into_complete() {
    let bytes = riff(&[chunk(b"fmt ", &fmt_body(1, 1, 8000, 8))]);

    let parsed = parse(bytes);
    assert!(parsed.format.is_some());
    assert!(parsed.pcm.is_none());
    let err = parsed.into_complete().unwrap_err();
    assert!(matches!(err, WavError::MissingChunk { chunk: "data" }));
}

#[test]
fn test_missing_fmt_chunk_is_reported_by_into_complete() {
    let bytes = riff(&[chunk(b"data", &[1, 2, 3])]);

    let err = parse(bytes).into_complete().unwrap_err();
    assert!(matches!(err, WavError::MissingChunk { chunk: "fmt " }));
}

#[test]
fn test_truncated_data_chunk_keeps_available_bytes() {
    let mut bytes = riff(&[chunk(b"fmt ", &fmt_body(1, 1, 8000, 8))]);
    bytes.extend_from_slice(b"data");
    bytes.write_u32::<LittleEndian>(100).unwrap();
    bytes.extend_from_slice(&[5, 6, 7]);

    let parsed = parse(bytes);
    assert_eq!(parsed.pcm.unwrap().as_bytes(), &[5, 6, 7]);
}

#[test]
fn test_stream_ending_inside_chunk_header_returns_partial() {
    let mut bytes = riff(&[chunk(b"fmt ", &fmt_body(1, 1, 8000, 8))]);
    bytes.extend_from_slice(b"da");

    let parsed = parse(bytes);
    assert!(parsed.format.is_some());
    assert!(parsed.pcm.is_none());
}

#[test]
fn test_stream_ending_inside_unknown_chunk_returns_partial() {
    let mut bytes = riff(&[chunk(b"fmt ", &fmt_body(1, 1, 8000, 8))]);
    bytes.extend_from_slice(b"LIST");
    bytes.write_u32::<LittleEndian>(64).unwrap();
    bytes.extend_from_slice(&[0; 10]);

    let parsed = parse(bytes);
    assert!(parsed.format.is_some());
    assert!(parsed.pcm.is_none());
}

#[test]
fn test_headerless_stream_is_still_walked() {
    // No RIFF header at all: chunks are still recognized.
    let mut bytes = chunk(b"fmt ", &fmt_body(1, 1, 8000, 8));
    bytes.extend(chunk(b"data", &[1]));

    let parsed = parse(bytes);
    assert_eq!(parsed.form_type, None);
    assert!(parsed.is_complete());
}

// =========================================================================
// Chunk header helpers
// =========================================================================

#[test]
fn test_read_chunk_header() {
    let mut bytes = Vec::new();
    bytes.extend_from_slice(b"cue ");
    bytes.write_u32::<LittleEndian>(7).unwrap();
    let mut cursor = Cursor::new(bytes);

    let header = read_chunk_header(&mut cursor).unwrap().unwrap();
    assert_eq!(
        header,
        ChunkHeader {
            id: *b"cue ",
            size: 7
        }
    );
    assert_eq!(header.padded_size(), 8);
    assert!(read_chunk_header(&mut cursor).unwrap().is_none());
}

#[test]
fn test_padded_size_even_is_unchanged() {
    let header = ChunkHeader {
        id: *b"LIST",
        size: 12,
    };
    assert_eq!(header.padded_size(), 12);
    assert_eq!(header.id_lossy(), "LIST");
}

// =========================================================================
// Format helpers
// =========================================================================

#[test]
fn test_validate_rejects_unsupported_widths() {
    let format = WaveFormat::pcm(1, 44100, 24);
    assert!(matches!(
        format.validate(),
        Err(WavError::UnsupportedSampleWidth { bits: 24 })
    ));
}

#[test]
fn test_validate_rejects_zero_channels_and_rate() {
    let mut format = WaveFormat::pcm(1, 44100, 16);
    format.channels = 0;
    assert!(matches!(
        format.validate(),
        Err(WavError::InvalidFormat { .. })
    ));

    let format = WaveFormat::pcm(2, 0, 16);
    assert!(matches!(
        format.validate(),
        Err(WavError::InvalidFormat { .. })
    ));
}

#[test]
fn test_pcm_derived_fields_saturate() {
    let format = WaveFormat::pcm(u16::MAX, u32::MAX, 16);
    assert_eq!(format.block_align, u16::MAX);
    assert_eq!(format.avg_bytes_per_sec, u32::MAX);

    let format = WaveFormat::pcm(2, 44100, 16);
    assert_eq!(format.block_align, 4);
    assert_eq!(format.avg_bytes_per_sec, 176_400);
}

#[test]
fn test_frame_count_ignores_partial_frames() {
    let format = WaveFormat::pcm(2, 44100, 16);
    let pcm = PcmPayload::new(vec![0; 11]);
    assert_eq!(pcm.frame_count(&format), 2);
}

#[test]
fn test_duration_seconds() {
    let format = WaveFormat::pcm(1, 8000, 8);
    assert_eq!(format.duration_seconds(4000), 0.5);
}

#[test]
fn test_sample_width_normalize() {
    assert_eq!(SampleWidth::Eight.normalize(&[128]), 0.0);
    assert_eq!(SampleWidth::Eight.normalize(&[0]), -1.0);
    assert_eq!(SampleWidth::Sixteen.normalize(&[0x00, 0x80]), -1.0);
    assert_eq!(SampleWidth::Sixteen.normalize(&[0x00, 0x40]), 0.5);
}
