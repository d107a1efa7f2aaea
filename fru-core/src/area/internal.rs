//! Internal-use area codec (component C6).
//!
//! This area has no self-described length: on encode, the file-level codec (C8)
//! pads it to the next 8-byte boundary after the version byte and opaque payload;
//! on decode, its length is inferred as the gap to the next area (or end of file),
//! which is the one place area ordering on disk matters to the decoder (spec.md
//! section 4.6).

use crate::error::FruError;
use crate::util::hex::{self, HexMode};

pub const INTERNAL_USE_VERSION: u8 = 0x01;

/// Opaque internal-use bytes, held in memory as a hex string.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct InternalUse {
    hex: String,
}

impl InternalUse {
    pub fn from_bytes(bytes: &[u8]) -> Self {
        Self {
            hex: hex::bytes_to_hex(bytes),
        }
    }

    pub fn from_hex(hex: &str) -> Result<Self, FruError> {
        hex::hexstr_to_bin(hex, HexMode::Strict)?;
        Ok(Self { hex: hex.to_string() })
    }

    pub fn hex(&self) -> &str {
        &self.hex
    }

    pub fn bytes(&self) -> Vec<u8> {
        hex::hexstr_to_bin(&self.hex, HexMode::Strict).expect("validated on construction")
    }

    /// `version byte, opaque bytes...` -- unpadded; the caller (file.rs) pads to an
    /// 8-byte boundary as part of laying out the whole file.
    pub(crate) fn encode(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(1 + self.bytes().len());
        out.push(INTERNAL_USE_VERSION);
        out.extend(self.bytes());
        out
    }

    pub(crate) fn decode(bytes: &[u8]) -> Self {
        Self::from_bytes(&bytes[1.min(bytes.len())..])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn roundtrips_through_hex() {
        let internal = InternalUse::from_bytes(&[0xDE, 0xAD, 0xBE, 0xEF]);
        let encoded = internal.encode();
        assert_eq!(encoded[0], INTERNAL_USE_VERSION);
        let decoded = InternalUse::decode(&encoded);
        assert_eq!(decoded.bytes(), vec![0xDE, 0xAD, 0xBE, 0xEF]);
    }
}
