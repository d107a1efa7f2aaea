//! Multirecord codec (component C7): a stream of 5-byte-header records.

use crate::error::{ErrorCode, FruError, Location};
use crate::io::LoadFlags;
use crate::util::{checksum, hex};

/// On-disk record type for a Management Access record.
pub const RECORD_TYPE_MANAGEMENT_ACCESS: u8 = 0xC0;

/// Record header version, stored in the low 3 bits of the eol/version byte.
const HEADER_VERSION: u8 = 0x02;
const EOL_BIT: u8 = 0x80;

/// A Management Access record's subtype byte, per IPMI FRU Table 18-6.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MgmtSubtype {
    SystemUrl = 1,
    SystemName = 2,
    SystemPingAddress = 3,
    ComponentUrl = 4,
    ComponentName = 5,
    ComponentPingAddress = 6,
    SystemUuid = 7,
}

impl MgmtSubtype {
    fn from_byte(b: u8) -> Option<Self> {
        Some(match b {
            1 => MgmtSubtype::SystemUrl,
            2 => MgmtSubtype::SystemName,
            3 => MgmtSubtype::SystemPingAddress,
            4 => MgmtSubtype::ComponentUrl,
            5 => MgmtSubtype::ComponentName,
            6 => MgmtSubtype::ComponentPingAddress,
            7 => MgmtSubtype::SystemUuid,
            _ => return None,
        })
    }

    fn byte(self) -> u8 {
        self as u8
    }

    /// `(min, max)` payload length in bytes, per IPMI FRU Table 18-6. The System
    /// URL bounds are normative (spec.md section 4.7); the remaining text subtypes
    /// use the table's general "variable ASCII, name/address" bounds.
    fn size_bounds(self) -> (usize, usize) {
        match self {
            MgmtSubtype::SystemUrl | MgmtSubtype::ComponentUrl => (16, 256),
            MgmtSubtype::SystemName
            | MgmtSubtype::SystemPingAddress
            | MgmtSubtype::ComponentName
            | MgmtSubtype::ComponentPingAddress => (1, 64),
            MgmtSubtype::SystemUuid => (16, 16),
        }
    }
}

/// Whether a `Raw` record's data is stored as ASCII text or as a hex string of
/// arbitrary bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RawEncoding {
    Text,
    BinaryHex,
}

/// One multirecord record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MultirecordBody {
    ManagementAccess { subtype: MgmtSubtype, value: String },
    /// Any record type not otherwise interpreted (power supply, DC output, etc. are
    /// all represented this way at this stage -- spec.md section 3).
    Raw {
        record_type: u8,
        encoding: RawEncoding,
        data: String,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MultirecordRecord {
    pub body: MultirecordBody,
}

impl MultirecordRecord {
    pub fn management_access(subtype: MgmtSubtype, value: impl Into<String>) -> Result<Self, FruError> {
        let value = value.into();
        validate_mgmt_value(subtype, &value, LoadFlags::empty())?;
        Ok(Self {
            body: MultirecordBody::ManagementAccess { subtype, value },
        })
    }

    pub fn raw(record_type: u8, encoding: RawEncoding, data: impl Into<String>) -> Self {
        Self {
            body: MultirecordBody::Raw {
                record_type,
                encoding,
                data: data.into(),
            },
        }
    }

    fn record_type_byte(&self) -> u8 {
        match &self.body {
            MultirecordBody::ManagementAccess { .. } => RECORD_TYPE_MANAGEMENT_ACCESS,
            MultirecordBody::Raw { record_type, .. } => *record_type,
        }
    }

    fn payload(&self) -> Result<Vec<u8>, FruError> {
        match &self.body {
            MultirecordBody::ManagementAccess { subtype, value } => {
                let mut out = vec![subtype.byte()];
                if matches!(subtype, MgmtSubtype::SystemUuid) {
                    out.extend_from_slice(&uuid_to_wire(value)?);
                } else {
                    out.extend_from_slice(value.as_bytes());
                }
                Ok(out)
            }
            MultirecordBody::Raw { encoding, data, .. } => match encoding {
                RawEncoding::Text => Ok(data.as_bytes().to_vec()),
                RawEncoding::BinaryHex => hex::hexstr_to_bin(data, hex::HexMode::Strict),
            },
        }
    }

    /// Encodes this record (header + payload), setting the end-of-list bit if `eol`.
    fn encode(&self, eol: bool) -> Result<Vec<u8>, FruError> {
        let payload = self.payload()?;
        if payload.len() > 255 {
            return Err(FruError::simple(ErrorCode::BufferTooBig, Location::Multirecord));
        }
        let mut header = [
            self.record_type_byte(),
            HEADER_VERSION | if eol { EOL_BIT } else { 0 },
            payload.len() as u8,
            checksum(&payload),
            0,
        ];
        header[4] = checksum(&header[..4]);

        let mut out = Vec::with_capacity(5 + payload.len());
        out.extend_from_slice(&header);
        out.extend_from_slice(&payload);
        Ok(out)
    }
}

fn validate_mgmt_value(subtype: MgmtSubtype, value: &str, flags: LoadFlags) -> Result<(), FruError> {
    let len = if matches!(subtype, MgmtSubtype::SystemUuid) {
        16
    } else {
        value.len()
    };
    let (min, max) = subtype.size_bounds();
    if (len < min || len > max) && !flags.contains(LoadFlags::IGNMRDATALEN) {
        return Err(FruError::simple(ErrorCode::SizeMismatch, Location::Multirecord));
    } else if len < min || len > max {
        log::warn!("multirecord: management-access subtype payload size out of bounds, ignoring");
    }
    Ok(())
}

/// Encodes a whole multirecord area: each record's header/payload concatenated, with
/// the end-of-list bit set on the last record.
pub(crate) fn encode_area(records: &[MultirecordRecord]) -> Result<Vec<u8>, FruError> {
    let mut out = Vec::new();
    for (i, record) in records.iter().enumerate() {
        let eol = i + 1 == records.len();
        out.extend(record.encode(eol)?);
    }
    log::debug!("encoded multirecord area: {} record(s), {} bytes", records.len(), out.len());
    Ok(out)
}

/// Decodes a whole multirecord area from `bytes` (exactly the area's bytes, no
/// trailing padding -- the multirecord area is not block-aligned internally).
pub(crate) fn decode_area(bytes: &[u8], flags: LoadFlags) -> Result<Vec<MultirecordRecord>, FruError> {
    let mut records = Vec::new();
    let mut offset = 0usize;
    let mut saw_eol = false;

    while offset < bytes.len() {
        if offset + 5 > bytes.len() {
            return Err(FruError::simple(ErrorCode::SizeMismatch, Location::Multirecord));
        }
        let header = &bytes[offset..offset + 5];
        let record_type = header[0];
        let eol_ver = header[1];
        let data_len = header[2] as usize;
        let data_checksum = header[3];
        let header_checksum = header[4];

        let version = eol_ver & 0x07;
        if version != HEADER_VERSION && !flags.contains(LoadFlags::IGNRVER) {
            return Err(FruError::simple(ErrorCode::BadVersion, Location::Multirecord));
        } else if version != HEADER_VERSION {
            log::warn!("multirecord: ignoring bad record version {version}");
        }

        let hsum = checksum(&header[..4]);
        if hsum != header_checksum && !flags.contains(LoadFlags::IGNRHCKSUM) {
            return Err(FruError::simple(ErrorCode::BadChecksumRecordHeader, Location::Multirecord));
        } else if hsum != header_checksum {
            log::warn!("multirecord: ignoring bad record-header checksum");
        }

        if offset + 5 + data_len > bytes.len() {
            return Err(FruError::simple(ErrorCode::SizeMismatch, Location::Multirecord));
        }
        let data = &bytes[offset + 5..offset + 5 + data_len];

        let expected_data_checksum = checksum(data);
        if expected_data_checksum != data_checksum && !flags.contains(LoadFlags::IGNRDCKSUM) {
            return Err(FruError::simple(ErrorCode::BadChecksumRecordData, Location::Multirecord));
        } else if expected_data_checksum != data_checksum {
            log::warn!("multirecord: ignoring bad record-data checksum");
        }

        let body = decode_body(record_type, data, flags)?;
        records.push(MultirecordRecord { body });

        offset += 5 + data_len;
        if eol_ver & EOL_BIT != 0 {
            saw_eol = true;
            break;
        }
    }

    if !saw_eol && !flags.contains(LoadFlags::IGNRNOEOL) {
        return Err(FruError::simple(ErrorCode::UnterminatedArea, Location::Multirecord));
    } else if !saw_eol {
        log::warn!("multirecord: area has no end-of-list record, continuing anyway");
    }

    Ok(records)
}

fn decode_body(record_type: u8, data: &[u8], flags: LoadFlags) -> Result<MultirecordBody, FruError> {
    if record_type == RECORD_TYPE_MANAGEMENT_ACCESS {
        if data.is_empty() {
            return Err(FruError::simple(ErrorCode::NoData, Location::Multirecord));
        }
        let subtype = MgmtSubtype::from_byte(data[0])
            .ok_or_else(|| FruError::simple(ErrorCode::BadMrManagementSubtype, Location::Multirecord))?;
        let payload = &data[1..];
        let value = if matches!(subtype, MgmtSubtype::SystemUuid) {
            if payload.len() != 16 && !flags.contains(LoadFlags::IGNMRDATALEN) {
                return Err(FruError::simple(ErrorCode::SizeMismatch, Location::Multirecord));
            }
            let mut wire = [0u8; 16];
            let n = payload.len().min(16);
            wire[..n].copy_from_slice(&payload[..n]);
            wire_to_uuid(&wire)
        } else {
            let (min, max) = subtype.size_bounds();
            if (payload.len() < min || payload.len() > max) && !flags.contains(LoadFlags::IGNMRDATALEN) {
                return Err(FruError::simple(ErrorCode::SizeMismatch, Location::Multirecord));
            } else if payload.len() < min || payload.len() > max {
                log::warn!("multirecord: management-access payload size out of bounds, ignoring");
            }
            String::from_utf8_lossy(payload).into_owned()
        };
        Ok(MultirecordBody::ManagementAccess { subtype, value })
    } else {
        let printable = !data.is_empty() && data.iter().all(|&b| (0x20..=0x7E).contains(&b));
        if printable {
            Ok(MultirecordBody::Raw {
                record_type,
                encoding: RawEncoding::Text,
                data: String::from_utf8_lossy(data).into_owned(),
            })
        } else {
            Ok(MultirecordBody::Raw {
                record_type,
                encoding: RawEncoding::BinaryHex,
                data: hex::bytes_to_hex(data),
            })
        }
    }
}

/// Parses a UUID given as 32 hex characters or the dashed 36-character form into the
/// 16 raw bytes in standard field order (not yet mixed-endian).
fn parse_uuid_hex(s: &str) -> Result<[u8; 16], FruError> {
    let stripped: String = s.chars().filter(|&c| c != '-').collect();
    let bytes = hex::hexstr_to_bin(&stripped, hex::HexMode::Strict)?;
    if bytes.len() != 16 {
        return Err(FruError::simple(ErrorCode::MalformedData, Location::Multirecord));
    }
    let mut out = [0u8; 16];
    out.copy_from_slice(&bytes);
    Ok(out)
}

/// Converts a UUID hex string to its 16-byte SMBIOS mixed-endian wire form:
/// `time_low`, `time_mid`, `time_hi_and_version` are little-endian; the trailing
/// `clock_seq_*`/`node` bytes stay in their original (big-endian) order.
fn uuid_to_wire(s: &str) -> Result<[u8; 16], FruError> {
    let fields = parse_uuid_hex(s)?;
    let mut wire = [0u8; 16];
    wire[0..4].copy_from_slice(&[fields[3], fields[2], fields[1], fields[0]]);
    wire[4..6].copy_from_slice(&[fields[5], fields[4]]);
    wire[6..8].copy_from_slice(&[fields[7], fields[6]]);
    wire[8..16].copy_from_slice(&fields[8..16]);
    Ok(wire)
}

/// Reverses [`uuid_to_wire`], producing a non-dashed uppercase 32-character string.
fn wire_to_uuid(wire: &[u8; 16]) -> String {
    let mut fields = [0u8; 16];
    fields[0..4].copy_from_slice(&[wire[3], wire[2], wire[1], wire[0]]);
    fields[4..6].copy_from_slice(&[wire[5], wire[4]]);
    fields[6..8].copy_from_slice(&[wire[7], wire[6]]);
    fields[8..16].copy_from_slice(&wire[8..16]);
    hex::bytes_to_hex(&fields)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn uuid_mixed_endian_matches_spec_example() {
        let wire = uuid_to_wire("00112233445566778899AABBCCDDEEFF").unwrap();
        assert_eq!(
            wire,
            [0x33, 0x22, 0x11, 0x00, 0x55, 0x44, 0x77, 0x66, 0x88, 0x99, 0xAA, 0xBB, 0xCC, 0xDD, 0xEE, 0xFF]
        );
        assert_eq!(wire_to_uuid(&wire), "00112233445566778899AABBCCDDEEFF");
    }

    #[test]
    fn uuid_accepts_dashed_input() {
        let dashed = "00112233-4455-6677-8899-AABBCCDDEEFF";
        let plain = "00112233445566778899AABBCCDDEEFF";
        assert_eq!(uuid_to_wire(dashed).unwrap(), uuid_to_wire(plain).unwrap());
    }

    #[test]
    fn management_access_record_has_eol_bit_set_when_last() {
        let record = MultirecordRecord::management_access(
            MgmtSubtype::SystemUuid,
            "00112233445566778899AABBCCDDEEFF",
        )
        .unwrap();
        let area = encode_area(std::slice::from_ref(&record)).unwrap();
        assert_eq!(area[1] & EOL_BIT, EOL_BIT);

        let decoded = decode_area(&area, LoadFlags::empty()).unwrap();
        assert_eq!(decoded.len(), 1);
        match &decoded[0].body {
            MultirecordBody::ManagementAccess { subtype, value } => {
                assert_eq!(*subtype, MgmtSubtype::SystemUuid);
                assert_eq!(value, "00112233445566778899AABBCCDDEEFF");
            }
            _ => panic!("expected management access record"),
        }
    }

    #[test]
    fn raw_record_roundtrips_text_and_binary() {
        let text = MultirecordRecord::raw(0x01, RawEncoding::Text, "hello");
        let area = encode_area(&[text]).unwrap();
        let decoded = decode_area(&area, LoadFlags::empty()).unwrap();
        match &decoded[0].body {
            MultirecordBody::Raw { data, encoding, .. } => {
                assert_eq!(data, "hello");
                assert_eq!(*encoding, RawEncoding::Text);
            }
            _ => panic!(),
        }

        let binary = MultirecordRecord::raw(0x02, RawEncoding::BinaryHex, "00FF10");
        let area = encode_area(&[binary]).unwrap();
        let decoded = decode_area(&area, LoadFlags::empty()).unwrap();
        match &decoded[0].body {
            MultirecordBody::Raw { data, encoding, .. } => {
                assert_eq!(data, "00FF10");
                assert_eq!(*encoding, RawEncoding::BinaryHex);
            }
            _ => panic!(),
        }
    }

    #[test]
    fn missing_eol_fails_without_flag() {
        let record = MultirecordRecord::raw(0x01, RawEncoding::Text, "x");
        let mut area = encode_area(std::slice::from_ref(&record)).unwrap();
        area[1] &= !EOL_BIT;
        assert!(decode_area(&area, LoadFlags::empty()).is_err());
        assert!(decode_area(&area, LoadFlags::IGNRNOEOL).is_ok());
    }
}
