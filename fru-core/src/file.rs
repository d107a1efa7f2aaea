//! File-level codec (component C8): the 8-byte common header and area ordering.
//!
//! The header records each area's start as an 8-byte-block offset from the start of
//! the file (0 meaning "not present"), in a fixed header-slot order. The areas'
//! *physical* order on disk is independent of that slot order -- [`Fru`](crate::model::Fru)
//! can place them in any order via `move_area` -- so the decoder works out where each
//! area actually starts and ends by sorting the offsets, not by assuming the slot
//! order matches layout order. The internal-use area has no self-described length
//! (spec.md section 4.6), so its end is inferred as the start of whichever present
//! area comes next on disk, or end-of-file if it is last.

use crate::error::{ErrorCode, FruError, Location};
use crate::io::LoadFlags;
use crate::util::checksum;

pub const HEADER_VERSION: u8 = 0x01;
pub const HEADER_LEN: usize = 8;

/// The five information-area kinds a FRU file header can point to, in their fixed
/// header-slot order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AreaType {
    Internal,
    Chassis,
    Board,
    Product,
    Multirecord,
}

impl AreaType {
    pub const ALL: [AreaType; 5] = [
        AreaType::Internal,
        AreaType::Chassis,
        AreaType::Board,
        AreaType::Product,
        AreaType::Multirecord,
    ];

    pub(crate) fn slot(self) -> usize {
        match self {
            AreaType::Internal => 0,
            AreaType::Chassis => 1,
            AreaType::Board => 2,
            AreaType::Product => 3,
            AreaType::Multirecord => 4,
        }
    }
}

/// The decoded 8-byte file header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FileHeader {
    pub version: u8,
    /// One 8-byte-block offset per [`AreaType::slot`]; `0` means absent.
    offsets: [u8; 5],
}

impl FileHeader {
    /// Builds a header from each area's *byte* offset (`None` for absent areas),
    /// validating that every present offset is 8-byte aligned and fits in a byte.
    pub fn from_byte_offsets(byte_offsets: [Option<usize>; 5]) -> Result<Self, FruError> {
        let mut offsets = [0u8; 5];
        for (slot, offset) in byte_offsets.into_iter().enumerate() {
            if let Some(offset) = offset {
                if offset % 8 != 0 {
                    return Err(FruError::simple(ErrorCode::InternalBug, Location::General));
                }
                let blocks = offset / 8;
                if blocks > u8::MAX as usize {
                    return Err(FruError::simple(ErrorCode::BufferTooBig, Location::General));
                }
                offsets[slot] = blocks as u8;
            }
        }
        Ok(Self {
            version: HEADER_VERSION,
            offsets,
        })
    }

    /// The byte offset recorded for `area`, or `None` if absent.
    pub fn byte_offset(&self, area: AreaType) -> Option<usize> {
        let blocks = self.offsets[area.slot()];
        if blocks == 0 {
            None
        } else {
            Some(blocks as usize * 8)
        }
    }

    pub fn encode(&self) -> [u8; HEADER_LEN] {
        let mut out = [0u8; HEADER_LEN];
        out[0] = self.version;
        out[1..6].copy_from_slice(&self.offsets);
        out[6] = 0;
        out[7] = checksum(&out[..7]);
        out
    }

    pub fn decode(bytes: &[u8], flags: LoadFlags) -> Result<Self, FruError> {
        if bytes.len() < HEADER_LEN {
            return Err(FruError::simple(ErrorCode::BufferTooSmall, Location::General));
        }
        let header = &bytes[..HEADER_LEN];
        let version = header[0];
        if version != HEADER_VERSION && !flags.contains(LoadFlags::IGNFVER) {
            return Err(FruError::simple(ErrorCode::BadVersion, Location::General));
        } else if version != HEADER_VERSION {
            log::warn!("file header: ignoring bad version {version:#04x}");
        }

        let sum = checksum(header);
        if sum != 0 && !flags.contains(LoadFlags::IGNFHCKSUM) {
            return Err(FruError::simple(ErrorCode::BadChecksumFileHeader, Location::General));
        } else if sum != 0 {
            log::warn!("file header: ignoring bad checksum");
        }

        let mut offsets = [0u8; 5];
        offsets.copy_from_slice(&header[1..6]);
        Ok(Self { version, offsets })
    }

    /// The present areas in ascending disk order, as `(area, byte offset)` pairs.
    pub fn disk_order(&self) -> Vec<(AreaType, usize)> {
        let mut present: Vec<(AreaType, usize)> = AreaType::ALL
            .into_iter()
            .filter_map(|area| self.byte_offset(area).map(|offset| (area, offset)))
            .collect();
        present.sort_by_key(|&(_, offset)| offset);
        present
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn header_roundtrips_and_checksums_to_zero() {
        let header = FileHeader::from_byte_offsets([Some(8), Some(16), None, Some(40), None]).unwrap();
        let bytes = header.encode();
        let sum: u8 = bytes.iter().fold(0u8, |a, &b| a.wrapping_add(b));
        assert_eq!(sum, 0);

        let decoded = FileHeader::decode(&bytes, LoadFlags::empty()).unwrap();
        assert_eq!(decoded.byte_offset(AreaType::Internal), Some(8));
        assert_eq!(decoded.byte_offset(AreaType::Chassis), Some(16));
        assert_eq!(decoded.byte_offset(AreaType::Board), None);
        assert_eq!(decoded.byte_offset(AreaType::Product), Some(40));
    }

    #[test]
    fn disk_order_reflects_physical_layout_not_slot_order() {
        // Product placed before Chassis on disk, despite Chassis having the earlier
        // header slot -- exercises that decode must sort by offset, not by slot.
        let header = FileHeader::from_byte_offsets([None, Some(24), None, Some(8), None]).unwrap();
        let order = header.disk_order();
        assert_eq!(order, vec![(AreaType::Product, 8), (AreaType::Chassis, 24)]);
    }

    #[test]
    fn bad_checksum_rejected_without_flag() {
        let header = FileHeader::from_byte_offsets([Some(8), None, None, None, None]).unwrap();
        let mut bytes = header.encode();
        bytes[7] ^= 0xFF;
        assert!(FileHeader::decode(&bytes, LoadFlags::empty()).is_err());
        assert!(FileHeader::decode(&bytes, LoadFlags::IGNFHCKSUM).is_ok());
    }
}
