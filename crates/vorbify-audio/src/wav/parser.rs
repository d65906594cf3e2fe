//! Chunk-by-chunk RIFF/WAVE reader.
//!
//! The reader walks the stream sequentially and never seeks, so any
//! [`Read`] implementation works. Parsing stops at the first `data` chunk;
//! chunks after it are never visited.

use std::io::{self, Read};

use byteorder::{LittleEndian, ReadBytesExt};
use log::{debug, warn};

use super::format::{WaveFormat, FMT_CHUNK_SIZE};
use super::pcm::PcmPayload;
use crate::error::{WavError, WavResult};

/// RIFF container chunk identifier.
pub const RIFF_ID: [u8; 4] = *b"RIFF";
/// Form type expected after the RIFF header.
pub const WAVE_ID: [u8; 4] = *b"WAVE";
/// Format chunk identifier.
pub const FMT_ID: [u8; 4] = *b"fmt ";
/// Data chunk identifier.
pub const DATA_ID: [u8; 4] = *b"data";

// Declared sizes are untrusted; larger payloads grow as they are read.
const MAX_PREALLOC: usize = 16 * 1024 * 1024;

/// An 8-byte chunk header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChunkHeader {
    /// Four ASCII identifier bytes.
    pub id: [u8; 4],
    /// Declared body size, excluding any pad byte.
    pub size: u32,
}

impl ChunkHeader {
    /// Body size rounded up to the RIFF word boundary.
    pub fn padded_size(&self) -> u64 {
        (self.size as u64).div_ceil(2) * 2
    }

    /// Identifier rendered for log output.
    pub fn id_lossy(&self) -> String {
        String::from_utf8_lossy(&self.id).into_owned()
    }
}

/// Whatever the parser found before the stream ended or `data` was read.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedWav {
    /// Form type that followed the RIFF header, if one was seen.
    pub form_type: Option<[u8; 4]>,
    /// Contents of the `fmt ` chunk.
    pub format: Option<WaveFormat>,
    /// Contents of the `data` chunk.
    pub pcm: Option<PcmPayload>,
}

impl ParsedWav {
    /// Whether both a format and a payload were found.
    pub fn is_complete(&self) -> bool {
        self.format.is_some() && self.pcm.is_some()
    }

    /// Splits into format and payload, or reports the first missing chunk.
    pub fn into_complete(self) -> WavResult<(WaveFormat, PcmPayload)> {
        match (self.format, self.pcm) {
            (Some(format), Some(pcm)) => Ok((format, pcm)),
            (None, _) => Err(WavError::MissingChunk { chunk: "fmt " }),
            (Some(_), None) => Err(WavError::MissingChunk { chunk: "data" }),
        }
    }
}

/// Parses a WAV stream positioned at offset 0.
///
/// Returns the partial result when the stream ends early; only a non-PCM
/// format tag or an I/O failure other than end-of-stream is an error.
pub fn parse_wav<R: Read>(mut reader: R) -> WavResult<ParsedWav> {
    let mut parsed = ParsedWav::default();

    while let Some(header) = read_chunk_header(&mut reader)? {
        match header.id {
            RIFF_ID => {
                let Some(form_type) = read_id(&mut reader)? else {
                    break;
                };
                if form_type != WAVE_ID {
                    warn!(
                        "RIFF form type is '{}', expected 'WAVE'",
                        String::from_utf8_lossy(&form_type)
                    );
                }
                parsed.form_type = Some(form_type);
            }
            FMT_ID => {
                let mut body = [0u8; FMT_CHUNK_SIZE];
                if !read_fully(&mut reader, &mut body)? {
                    debug!("stream ended inside 'fmt ' chunk");
                    break;
                }
                let format = WaveFormat::from_bytes(&body);
                if !format.is_pcm() {
                    return Err(WavError::UnsupportedFormat {
                        tag: format.format_tag,
                    });
                }
                debug!(
                    "fmt: {} ch, {} Hz, {} bits",
                    format.channels, format.sample_rate, format.bits_per_sample
                );
                parsed.format = Some(format);

                let extra = (header.size as u64).saturating_sub(FMT_CHUNK_SIZE as u64);
                if extra > 0 && !skip(&mut reader, extra)? {
                    break;
                }
            }
            DATA_ID => {
                let mut bytes = Vec::with_capacity((header.size as usize).min(MAX_PREALLOC));
                (&mut reader)
                    .take(header.size as u64)
                    .read_to_end(&mut bytes)?;
                if bytes.len() < header.size as usize {
                    warn!(
                        "data chunk truncated: declared {} bytes, read {}",
                        header.size,
                        bytes.len()
                    );
                }
                debug!("data: {} bytes", bytes.len());
                parsed.pcm = Some(PcmPayload::new(bytes));
                break;
            }
            _ => {
                debug!(
                    "skipping '{}' chunk ({} bytes)",
                    header.id_lossy(),
                    header.size
                );
                if !skip(&mut reader, header.padded_size())? {
                    break;
                }
            }
        }
    }

    Ok(parsed)
}

/// Reads an 8-byte chunk header, or `None` at end of stream.
pub fn read_chunk_header<R: Read>(reader: &mut R) -> WavResult<Option<ChunkHeader>> {
    let Some(id) = read_id(reader)? else {
        return Ok(None);
    };
    match reader.read_u32::<LittleEndian>() {
        Ok(size) => Ok(Some(ChunkHeader { id, size })),
        Err(e) if e.kind() == io::ErrorKind::UnexpectedEof => Ok(None),
        Err(e) => Err(e.into()),
    }
}

fn read_id<R: Read>(reader: &mut R) -> WavResult<Option<[u8; 4]>> {
    let mut id = [0u8; 4];
    Ok(read_fully(reader, &mut id)?.then_some(id))
}

/// Fills `buf`, returning `false` if the stream ended first.
fn read_fully<R: Read>(reader: &mut R, buf: &mut [u8]) -> io::Result<bool> {
    match reader.read_exact(buf) {
        Ok(()) => Ok(true),
        Err(e) if e.kind() == io::ErrorKind::UnexpectedEof => Ok(false),
        Err(e) => Err(e),
    }
}

/// Discards `count` bytes, returning `false` if the stream ended first.
fn skip<R: Read>(reader: &mut R, count: u64) -> io::Result<bool> {
    let skipped = io::copy(&mut reader.by_ref().take(count), &mut io::sink())?;
    Ok(skipped == count)
}
