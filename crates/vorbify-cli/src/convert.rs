//! Single-file conversion.

use anyhow::{Context, Result};
use log::{debug, info};
use std::fs::{self, File};
use std::io::{BufReader, BufWriter};
use std::path::{Path, PathBuf};

use vorbify_audio::{load_samples, SerialSource, WaveFormat};
use vorbify_ogg::{encode, Comments, EncodeConfig, EncodeStats, EncoderEngine, WriterSink};

use crate::input::derive_output_path;

/// Settings shared by every file in a batch.
#[derive(Debug, Clone)]
pub struct ConvertOptions {
    /// Encoder settings, including the target format.
    pub config: EncodeConfig,
    /// Comment header written into every output.
    pub comments: Comments,
}

impl Default for ConvertOptions {
    fn default() -> Self {
        Self {
            config: EncodeConfig::default(),
            comments: Comments::new()
                .with_tag("ENCODER", concat!("vorbify ", env!("CARGO_PKG_VERSION"))),
        }
    }
}

/// A finished conversion.
#[derive(Debug, Clone)]
pub struct Converted {
    /// Path of the written Ogg file.
    pub output: PathBuf,
    /// Format of the source WAV.
    pub source: WaveFormat,
    /// Serial number of the logical stream.
    pub serial: u32,
    /// Encoder counters.
    pub stats: EncodeStats,
}

/// Result of handling one input path.
#[derive(Debug, Clone)]
pub enum Conversion {
    /// The file was encoded.
    Converted(Converted),
    /// The file is a WAV but lacks a chunk needed for conversion.
    Skipped(String),
    /// The path does not name a WAV file.
    Ignored,
}

/// Converts one WAV file to Ogg Vorbis next to the input.
///
/// Nothing is written unless the input parses and resamples cleanly; if
/// encoding fails afterwards the partial output is removed.
pub fn convert_file<E, S>(
    engine: &E,
    input: &Path,
    options: &ConvertOptions,
    serials: &mut S,
) -> Result<Conversion>
where
    E: EncoderEngine,
    S: SerialSource + ?Sized,
{
    let Some(output) = derive_output_path(input) else {
        debug!("ignoring {}", input.display());
        return Ok(Conversion::Ignored);
    };

    let file = File::open(input)
        .with_context(|| format!("Failed to open {}", input.display()))?;
    let (source, buffer) = match load_samples(BufReader::new(file), options.config.target) {
        Ok(loaded) => loaded,
        Err(e) if e.is_skippable() => {
            info!("skipping {}: {}", input.display(), e);
            return Ok(Conversion::Skipped(e.to_string()));
        }
        Err(e) => {
            return Err(e).with_context(|| format!("Failed to read {}", input.display()));
        }
    };
    debug!(
        "{}: {} ch @ {} Hz, {} bit -> {} samples",
        input.display(),
        source.channels,
        source.sample_rate,
        source.bits_per_sample,
        buffer.num_samples()
    );

    let serial = serials.next_serial();
    let out_file = File::create(&output)
        .with_context(|| format!("Failed to create {}", output.display()))?;
    let sink = WriterSink::new(BufWriter::new(out_file));

    let stats = match encode(
        engine,
        &buffer,
        options.config,
        &options.comments,
        serial,
        sink,
    ) {
        Ok((_, stats)) => stats,
        Err(e) => {
            if let Err(remove_err) = fs::remove_file(&output) {
                debug!("could not remove {}: {}", output.display(), remove_err);
            }
            return Err(e).with_context(|| format!("Failed to encode {}", input.display()));
        }
    };

    Ok(Conversion::Converted(Converted {
        output,
        source,
        serial,
        stats,
    }))
}
