//! Ogg stream serial number generation.
//!
//! Every encoded file gets its own logical-stream serial number. The
//! source is injectable so tests and `--serial-seed` runs produce
//! byte-identical output, while normal runs draw from entropy.

use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

/// Supplies serial numbers for successive encode sessions.
pub trait SerialSource {
    /// Returns the serial number for the next stream.
    fn next_serial(&mut self) -> u32;
}

/// Creates a PCG32 RNG from a 32-bit seed.
///
/// The 32-bit seed is expanded to 64 bits by duplicating the value in both
/// halves.
pub fn create_rng(seed: u32) -> Pcg32 {
    let seed64 = (seed as u64) | ((seed as u64) << 32);
    Pcg32::seed_from_u64(seed64)
}

/// Derives the serial for the `index`-th stream of a seeded run.
///
/// Uses BLAKE3 over the little-endian seed and index and keeps the first
/// four bytes, so each file's serial depends only on its position.
pub fn derive_stream_serial(base_seed: u32, index: u32) -> u32 {
    let mut input = Vec::with_capacity(8);
    input.extend_from_slice(&base_seed.to_le_bytes());
    input.extend_from_slice(&index.to_le_bytes());

    let hash = blake3::hash(&input);
    let bytes = hash.as_bytes();
    u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]])
}

/// Serial numbers drawn from a PCG32 stream.
#[derive(Debug, Clone)]
pub struct RandomSerials {
    rng: Pcg32,
}

impl RandomSerials {
    /// Seeds the generator from the thread RNG.
    pub fn from_entropy() -> Self {
        Self {
            rng: create_rng(rand::thread_rng().gen()),
        }
    }

    /// Seeds the generator deterministically.
    pub fn from_seed(seed: u32) -> Self {
        Self {
            rng: create_rng(seed),
        }
    }
}

impl SerialSource for RandomSerials {
    fn next_serial(&mut self) -> u32 {
        self.rng.gen()
    }
}

/// Position-derived serial numbers for reproducible batch runs.
#[derive(Debug, Clone)]
pub struct SeededSerials {
    base_seed: u32,
    index: u32,
}

impl SeededSerials {
    /// Starts a sequence at index 0.
    pub fn new(base_seed: u32) -> Self {
        Self {
            base_seed,
            index: 0,
        }
    }
}

impl SerialSource for SeededSerials {
    fn next_serial(&mut self) -> u32 {
        let serial = derive_stream_serial(self.base_seed, self.index);
        self.index = self.index.wrapping_add(1);
        serial
    }
}

/// Always returns the same serial.
#[derive(Debug, Clone, Copy)]
pub struct FixedSerial(pub u32);

impl SerialSource for FixedSerial {
    fn next_serial(&mut self) -> u32 {
        self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_seeded_random_serials_are_reproducible() {
        let mut a = RandomSerials::from_seed(42);
        let mut b = RandomSerials::from_seed(42);

        let values_a: Vec<u32> = (0..10).map(|_| a.next_serial()).collect();
        let values_b: Vec<u32> = (0..10).map(|_| b.next_serial()).collect();
        assert_eq!(values_a, values_b);
    }

    #[test]
    fn test_different_seeds_produce_different_serials() {
        let mut a = RandomSerials::from_seed(42);
        let mut b = RandomSerials::from_seed(43);

        let values_a: Vec<u32> = (0..10).map(|_| a.next_serial()).collect();
        let values_b: Vec<u32> = (0..10).map(|_| b.next_serial()).collect();
        assert_ne!(values_a, values_b);
    }

    #[test]
    fn test_seeded_serials_follow_derivation() {
        let mut serials = SeededSerials::new(7);
        assert_eq!(serials.next_serial(), derive_stream_serial(7, 0));
        assert_eq!(serials.next_serial(), derive_stream_serial(7, 1));
    }

    #[test]
    fn test_stream_serial_derivation_distinguishes_index() {
        assert_eq!(derive_stream_serial(42, 0), derive_stream_serial(42, 0));
        assert_ne!(derive_stream_serial(42, 0), derive_stream_serial(42, 1));
        assert_ne!(derive_stream_serial(42, 0), derive_stream_serial(43, 0));
    }

    #[test]
    fn test_fixed_serial() {
        let mut serials = FixedSerial(0xdead_beef);
        assert_eq!(serials.next_serial(), 0xdead_beef);
        assert_eq!(serials.next_serial(), 0xdead_beef);
    }
}
