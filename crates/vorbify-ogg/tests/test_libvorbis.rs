//! Sessions against the real libvorbis engine.

#![cfg(feature = "libvorbis")]

use vorbify_audio::SampleBuffer;
use vorbify_ogg::{encode, Comments, EncodeConfig, EncoderEngine, LibVorbisEngine, VecSink};

fn tone(samples: usize) -> SampleBuffer {
    let left: Vec<f32> = (0..samples)
        .map(|i| (i as f32 * 440.0 * std::f32::consts::TAU / 44100.0).sin() * 0.4)
        .collect();
    let right: Vec<f32> = left.iter().map(|s| -s).collect();
    SampleBuffer::from_channels(vec![left, right], 44100).unwrap()
}

#[test]
fn test_header_packets_have_vorbis_signatures() {
    let engine = LibVorbisEngine::new();
    let info = engine.create_info(2, 44100, 0.4).unwrap();
    let headers = engine
        .header_packets(&info, &Comments::new().with_tag("TITLE", "tone"))
        .unwrap();

    assert!(headers.info.bos);
    assert_eq!(&headers.info.data[..7], b"\x01vorbis");
    assert_eq!(&headers.comments.data[..7], b"\x03vorbis");
    assert_eq!(&headers.books.data[..7], b"\x05vorbis");
}

#[test]
fn test_tone_encodes_to_complete_stream() {
    let buffer = tone(512 * 86);
    let engine = LibVorbisEngine::new();
    let (sink, stats) = encode(
        &engine,
        &buffer,
        EncodeConfig::default(),
        &Comments::new(),
        7,
        VecSink::new(),
    )
    .unwrap();
    let bytes = sink.into_bytes();

    assert!(bytes.starts_with(b"OggS"));
    assert_eq!(stats.windows, 86);
    assert_eq!(stats.bytes, bytes.len());
    assert!(stats.pages >= 3);
    // Last page header: EOS flag set.
    let last = bytes
        .windows(4)
        .rposition(|w| w == b"OggS")
        .unwrap();
    assert_eq!(bytes[last + 5] & 0x04, 0x04);
}
