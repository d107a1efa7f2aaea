//! Byte-level helpers shared by every codec layer (component C2).

pub mod checksum;
pub mod hex;

pub use checksum::{block_align, checksum};
pub use hex::{byte2hex, hex2byte, hexstr_to_bin, HexMode};
