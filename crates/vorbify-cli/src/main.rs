//! vorbify CLI - Convert WAV files to Ogg Vorbis
//!
//! Each `.wav` argument is converted to an `.ogg` file next to it; other
//! arguments are ignored.

use clap::Parser;
use std::path::PathBuf;
use std::process::ExitCode;

use vorbify_audio::{RandomSerials, SeededSerials, SerialSource, TargetFormat};
use vorbify_cli::commands;
use vorbify_cli::convert::ConvertOptions;
use vorbify_ogg::EncodeConfig;

/// vorbify - WAV to Ogg Vorbis converter
#[derive(Parser)]
#[command(name = "vorbify")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Input files; only names ending in .wav are converted
    files: Vec<PathBuf>,

    /// Output sample rate in Hz
    #[arg(long, default_value_t = 44100, value_parser = clap::value_parser!(u32).range(1..))]
    rate: u32,

    /// Output channel count
    #[arg(long, default_value_t = 2, value_parser = clap::value_parser!(u16).range(1..=255))]
    channels: u16,

    /// Seed for deterministic stream serial numbers
    #[arg(long)]
    serial_seed: Option<u32>,

    /// Log decoding and encoding details to stderr
    #[arg(short, long)]
    verbose: bool,

    /// Print a machine-readable JSON summary (no colored output)
    #[arg(long)]
    json: bool,
}

fn init_logging(verbose: bool) {
    let default_filter = if verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .format_timestamp(None)
        .init();
}

#[cfg(feature = "libvorbis")]
fn run(cli: Cli) -> anyhow::Result<ExitCode> {
    let options = ConvertOptions {
        config: EncodeConfig::for_target(TargetFormat::new(cli.rate, cli.channels)),
        ..ConvertOptions::default()
    };
    let mut serials: Box<dyn SerialSource> = match cli.serial_seed {
        Some(seed) => Box::new(SeededSerials::new(seed)),
        None => Box::new(RandomSerials::from_entropy()),
    };

    let engine = vorbify_ogg::LibVorbisEngine::new();
    commands::convert::run(&engine, &cli.files, &options, serials.as_mut(), cli.json)
}

#[cfg(not(feature = "libvorbis"))]
fn run(_cli: Cli) -> anyhow::Result<ExitCode> {
    anyhow::bail!("vorbify was built without an encoder engine (enable the `libvorbis` feature)")
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match run(cli) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("{}: {:#}", colored::Colorize::red("error"), e);
            ExitCode::from(1)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_defaults() {
        let cli = Cli::try_parse_from(["vorbify", "a.wav", "b.WAV"]).unwrap();
        assert_eq!(cli.files.len(), 2);
        assert_eq!(cli.rate, 44100);
        assert_eq!(cli.channels, 2);
        assert_eq!(cli.serial_seed, None);
        assert!(!cli.verbose);
        assert!(!cli.json);
    }

    #[test]
    fn test_cli_parses_options() {
        let cli = Cli::try_parse_from([
            "vorbify",
            "--rate",
            "22050",
            "--channels",
            "1",
            "--serial-seed",
            "42",
            "--json",
            "-v",
            "in.wav",
        ])
        .unwrap();
        assert_eq!(cli.rate, 22050);
        assert_eq!(cli.channels, 1);
        assert_eq!(cli.serial_seed, Some(42));
        assert!(cli.json);
        assert!(cli.verbose);
    }

    #[test]
    fn test_cli_rejects_zero_channels() {
        assert!(Cli::try_parse_from(["vorbify", "--channels", "0", "in.wav"]).is_err());
        assert!(Cli::try_parse_from(["vorbify", "--rate", "0", "in.wav"]).is_err());
    }
}
