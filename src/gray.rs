//! Reflected-binary Gray code generation.
//!
//! A Gray code orders the integers `0..2^n` so that cyclically adjacent
//! values differ in exactly one bit. One is generated per bit count and
//! cached by [`Encoder`](crate::Encoder) until the bit count changes.

use std::fmt;

/// Hard upper bound on the bit count, driven by 32-bit code storage.
///
/// Interactive use tops out around n = 9; anything past that is still
/// correct, just enormous (the sequence has `2^n` entries).
pub const MAX_BIT_COUNT: u32 = 31;

/// Bit count outside the supported `1..=31` range.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InvalidBitCount(pub u32);

impl fmt::Display for InvalidBitCount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "bit count {} outside supported range 1..={}",
            self.0, MAX_BIT_COUNT
        )
    }
}

impl std::error::Error for InvalidBitCount {}

/// Generates the reflected-binary Gray code sequence for `bit_count` bits.
///
/// The result has length `2^bit_count`, starts at 0, and every cyclically
/// adjacent pair differs in exactly one bit. Each code uses only the low
/// `bit_count` bits.
pub fn generate(bit_count: u32) -> Result<Vec<u32>, InvalidBitCount> {
    if bit_count == 0 || bit_count > MAX_BIT_COUNT {
        return Err(InvalidBitCount(bit_count));
    }

    let mut codes = vec![0u32; 1usize << bit_count];
    codes[1] = 1;

    // Reflect-and-prefix: each pass mirrors the filled half in reverse
    // order with the next bit set, doubling the sequence.
    for plane in 1..bit_count {
        let filled = 1usize << plane;
        for i in 0..filled {
            codes[2 * filled - 1 - i] = codes[i] | (1 << plane);
        }
    }

    Ok(codes)
}
