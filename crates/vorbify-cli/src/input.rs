//! Input path handling.

use std::path::{Path, PathBuf};

const WAV_SUFFIX: &[u8] = b".wav";

/// Whether the file name ends in `.wav`, ignoring ASCII case.
///
/// The rest of the name need not be valid UTF-8.
pub fn is_wav_path(path: &Path) -> bool {
    path.file_name()
        .map(|name| {
            let bytes = name.as_encoded_bytes();
            bytes.len() >= WAV_SUFFIX.len()
                && bytes[bytes.len() - WAV_SUFFIX.len()..].eq_ignore_ascii_case(WAV_SUFFIX)
        })
        .unwrap_or(false)
}

/// Output path for a WAV input: the trailing `.wav` swapped for `.ogg`.
///
/// Returns `None` for paths [`is_wav_path`] rejects.
pub fn derive_output_path(path: &Path) -> Option<PathBuf> {
    if !is_wav_path(path) {
        return None;
    }
    // A name that is only `.wav` has no extension, just a leading dot.
    if path.extension().is_some() {
        Some(path.with_extension("ogg"))
    } else {
        Some(path.with_file_name(".ogg"))
    }
}
