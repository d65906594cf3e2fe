//! Batch convert command
//!
//! Converts each input in turn. A failing file is reported and the batch
//! moves on.

use anyhow::Result;
use colored::Colorize;
use serde::Serialize;
use std::path::PathBuf;
use std::process::ExitCode;

use vorbify_audio::{SerialSource, WavError};
use vorbify_ogg::{EncodeError, EncoderEngine};

use crate::convert::{convert_file, Conversion, ConvertOptions};

/// Outcome category of one input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FileStatus {
    /// Encoded successfully.
    Converted,
    /// A WAV without the chunks needed for conversion.
    Skipped,
    /// Not a WAV file.
    Ignored,
    /// Conversion failed.
    Failed,
}

/// Per-file entry of the batch report.
#[derive(Debug, Clone, Serialize)]
pub struct FileResult {
    /// Input path as given.
    pub input: String,
    /// Outcome.
    pub status: FileStatus,
    /// Written Ogg file.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output: Option<String>,
    /// Logical stream serial number.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub serial: Option<u32>,
    /// Pages written.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pages: Option<usize>,
    /// Bytes written.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bytes: Option<usize>,
    /// Encoded duration in seconds.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration_seconds: Option<f64>,
    /// Reason for a skip or failure.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    /// Stable error code for failures, when one applies.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<&'static str>,
}

impl FileResult {
    fn new(input: String, status: FileStatus) -> Self {
        Self {
            input,
            status,
            output: None,
            serial: None,
            pages: None,
            bytes: None,
            duration_seconds: None,
            message: None,
            code: None,
        }
    }
}

/// Batch report.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ConversionSummary {
    /// Files encoded.
    pub converted: usize,
    /// WAV files skipped for missing chunks.
    pub skipped: usize,
    /// Files that failed.
    pub failed: usize,
    /// One entry per input, in order.
    pub files: Vec<FileResult>,
}

impl ConversionSummary {
    /// Whether any input failed.
    pub fn has_failures(&self) -> bool {
        self.failed > 0
    }

    /// Process exit code for this batch.
    pub fn exit_code(&self) -> ExitCode {
        if self.has_failures() {
            ExitCode::from(1)
        } else {
            ExitCode::SUCCESS
        }
    }
}

fn error_code(error: &anyhow::Error) -> Option<&'static str> {
    if let Some(e) = error.downcast_ref::<WavError>() {
        return Some(e.code());
    }
    error.downcast_ref::<EncodeError>().map(EncodeError::code)
}

/// Converts every input and collects the report.
///
/// `on_result` sees each entry as soon as its file is done.
pub fn convert_batch<E, S, F>(
    engine: &E,
    files: &[PathBuf],
    options: &ConvertOptions,
    serials: &mut S,
    mut on_result: F,
) -> ConversionSummary
where
    E: EncoderEngine,
    S: SerialSource + ?Sized,
    F: FnMut(&FileResult),
{
    let mut summary = ConversionSummary::default();

    for path in files {
        let input = path.display().to_string();
        let result = match convert_file(engine, path, options, serials) {
            Ok(Conversion::Converted(done)) => {
                summary.converted += 1;
                let mut result = FileResult::new(input, FileStatus::Converted);
                result.output = Some(done.output.display().to_string());
                result.serial = Some(done.serial);
                result.pages = Some(done.stats.pages);
                result.bytes = Some(done.stats.bytes);
                result.duration_seconds = Some(
                    done.stats.samples as f64 / options.config.target.sample_rate as f64,
                );
                result
            }
            Ok(Conversion::Skipped(reason)) => {
                summary.skipped += 1;
                let mut result = FileResult::new(input, FileStatus::Skipped);
                result.message = Some(reason);
                result
            }
            Ok(Conversion::Ignored) => FileResult::new(input, FileStatus::Ignored),
            Err(e) => {
                summary.failed += 1;
                let mut result = FileResult::new(input, FileStatus::Failed);
                result.message = Some(format!("{:#}", e));
                result.code = error_code(&e);
                result
            }
        };
        on_result(&result);
        summary.files.push(result);
    }

    summary
}

fn print_result(result: &FileResult) {
    match result.status {
        FileStatus::Converted => {
            if let Some(output) = &result.output {
                println!("{}", output);
            }
        }
        FileStatus::Skipped => {
            eprintln!(
                "{} {} ({})",
                "SKIPPED".yellow().bold(),
                result.input,
                result.message.as_deref().unwrap_or("no audio")
            );
        }
        FileStatus::Failed => {
            let code = result
                .code
                .map(|c| format!("[{}] ", c))
                .unwrap_or_default();
            eprintln!(
                "{} {}: {}{}",
                "FAILED".red().bold(),
                result.input,
                code.dimmed(),
                result.message.as_deref().unwrap_or("unknown error")
            );
        }
        FileStatus::Ignored => {}
    }
}

/// Run the convert command
pub fn run<E, S>(
    engine: &E,
    files: &[PathBuf],
    options: &ConvertOptions,
    serials: &mut S,
    json: bool,
) -> Result<ExitCode>
where
    E: EncoderEngine,
    S: SerialSource + ?Sized,
{
    let summary = convert_batch(engine, files, options, serials, |result| {
        if !json {
            print_result(result);
        }
    });

    if json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else if summary.converted + summary.skipped + summary.failed > 0 {
        let failed = format!("{} failed", summary.failed);
        eprintln!(
            "\n{} {} converted, {} skipped, {}",
            "Done:".bold(),
            summary.converted.to_string().green(),
            summary.skipped,
            if summary.has_failures() {
                failed.red().to_string()
            } else {
                failed
            }
        );
    }

    Ok(summary.exit_code())
}
