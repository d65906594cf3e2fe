#![no_main]

use libfuzzer_sys::fuzz_target;
use vorbify_audio::{load_samples, parse_wav, TargetFormat};

fuzz_target!(|data: &[u8]| {
    // Parsing must never panic, whatever the chunk layout.
    let _ = parse_wav(data);

    // Oversized resample targets are rejected before anything is allocated.
    let _ = load_samples(data, TargetFormat::mono(8000));
});
