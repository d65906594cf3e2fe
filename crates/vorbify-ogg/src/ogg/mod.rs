//! Ogg logical-stream framing.
//!
//! This module implements the page side of the encoder engine on top of
//! libogg: submitted packets are laced into segments and released as
//! pages stamped with granule position, sequence number, flags and
//! checksum.

mod stream;


// Re-export public API
pub use stream::OggStreamState;
