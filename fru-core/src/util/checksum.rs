//! Modulo-256 zero-sum checksums and 8-byte block alignment.

/// Returns the byte that makes `bytes`' sum (including the returned byte) zero mod 256.
///
/// A valid area or record satisfies `checksum(all bytes including the checksum byte) == 0`,
/// so this same function both computes the checksum to append and validates one already
/// appended.
pub fn checksum(bytes: &[u8]) -> u8 {
    let sum = bytes.iter().fold(0u8, |acc, &b| acc.wrapping_add(b));
    0u8.wrapping_sub(sum)
}

/// Rounds `len` up to the next multiple of 8.
pub fn block_align(len: usize) -> usize {
    (len + 7) / 8 * 8
}
