//! Information-area codec (component C5) plus the internal-use area (C6).
//!
//! All three information areas (chassis, board, product) share a common
//! "header + mandatory fields + custom fields + terminator + padding + checksum"
//! layout; only the header's fixed portion and the mandatory field count differ.
//! [`encode_info_area`]/[`decode_info_fields`] implement that shared shape; each
//! area module supplies its own header bytes and mandatory-field list.

pub mod board;
pub mod chassis;
pub mod internal;
pub mod product;

use crate::error::{ErrorCode, FruError, Location};
use crate::field::{FieldValue, TERMINATOR};
use crate::io::LoadFlags;
use crate::list::RecordList;
use crate::util::{block_align, checksum};

/// The on-disk area-header version (low nibble 1, high nibble reserved 0).
pub const AREA_VERSION: u8 = 0x01;

/// Builds one information area: `version, length, extra_header..., fields..., 0xC1,
/// padding..., checksum`. `extra_header` is the board date bytes for board areas, or
/// empty for chassis/product. Returns the full area bytes, always a multiple of 8.
pub(crate) fn encode_info_area(
    type_or_lang: u8,
    extra_header: &[u8],
    mandatory: &[FieldValue],
    custom: &RecordList<FieldValue>,
) -> Result<Vec<u8>, FruError> {
    let mut fields = Vec::new();
    for field in mandatory {
        fields.extend(field.encode()?);
    }
    for field in custom.iter() {
        fields.extend(field.encode()?);
    }
    fields.push(TERMINATOR);

    let header_len = 2 + 1 + extra_header.len(); // version + length + type/lang + extra
    let unpadded_len = header_len + fields.len() + 1; // +1 for checksum byte
    let total_len = block_align(unpadded_len);
    let pad_len = total_len - unpadded_len;
    let length_blocks = (total_len / 8) as u8;

    let mut out = Vec::with_capacity(total_len);
    out.push(AREA_VERSION);
    out.push(length_blocks);
    out.push(type_or_lang);
    out.extend_from_slice(extra_header);
    out.extend_from_slice(&fields);
    out.extend(std::iter::repeat(0u8).take(pad_len));
    out.push(checksum(&out));
    log::debug!(
        "encoded info area: {} bytes ({} fields, {} custom)",
        out.len(),
        mandatory.len(),
        custom.len()
    );
    Ok(out)
}

/// Decoded common header fields shared by all information areas.
pub(crate) struct InfoHeader {
    pub type_or_lang: u8,
    pub area_len: usize,
}

/// Validates version + checksum and reads the fixed 3-byte prefix
/// (`version, length, type/lang`) plus `extra_len` extra header bytes, returning the
/// header and a slice over `extra_len` extra bytes.
pub(crate) fn decode_info_header<'a>(
    bytes: &'a [u8],
    extra_len: usize,
    location: Location,
    flags: LoadFlags,
) -> Result<(InfoHeader, &'a [u8]), FruError> {
    if bytes.len() < 3 + extra_len + 1 {
        return Err(FruError::simple(ErrorCode::BufferTooSmall, location));
    }
    let version = bytes[0];
    if version & 0x0F != AREA_VERSION && !flags.contains(LoadFlags::IGNAVER) {
        return Err(FruError::simple(ErrorCode::BadVersion, location));
    } else if version & 0x0F != AREA_VERSION {
        log::warn!("{location}: ignoring bad area version {version:#04x}");
    }

    let area_len = bytes[1] as usize * 8;
    if area_len == 0 || area_len > bytes.len() {
        return Err(FruError::simple(ErrorCode::SizeMismatch, location));
    }

    let sum = checksum(&bytes[..area_len]);
    if sum != 0 && !flags.contains(LoadFlags::IGNACKSUM) {
        return Err(FruError::simple(ErrorCode::BadChecksumAreaData, location));
    } else if sum != 0 {
        log::warn!("{location}: ignoring bad area checksum");
    }

    let type_or_lang = bytes[2];
    let extra = &bytes[3..3 + extra_len];
    Ok((InfoHeader { type_or_lang, area_len }, extra))
}

/// Reads the mandatory fields, then custom fields, up to the terminator, from the
/// field region starting at `bytes` (everything after the header, up to but not
/// including the trailing padding/checksum). Missing mandatory fields are always a
/// hard failure, even with relaxed flags; a missing terminator is controlled by
/// `LoadFlags::IGNAEOF`.
pub(crate) fn decode_info_fields(
    bytes: &[u8],
    mandatory_count: usize,
    location: Location,
    flags: LoadFlags,
) -> Result<(Vec<FieldValue>, RecordList<FieldValue>), FruError> {
    let mut mandatory = Vec::with_capacity(mandatory_count);
    let mut custom = RecordList::new();
    let mut offset = 0usize;
    let mut terminated = false;

    while offset < bytes.len() {
        match FieldValue::decode(&bytes[offset..], location)? {
            None => {
                terminated = true;
                break;
            }
            Some((field, consumed)) => {
                log::trace!("{location}: decoded field {:?} ({consumed} bytes)", field.encoding());
                if mandatory.len() < mandatory_count {
                    mandatory.push(field);
                } else {
                    custom.add(crate::list::InsertAt::Tail, field, location)?;
                }
                offset += consumed;
            }
        }
    }

    if mandatory.len() < mandatory_count {
        return Err(FruError::new(
            ErrorCode::MalformedData,
            location,
            mandatory.len() as i32,
        ));
    }

    if !terminated && !flags.contains(LoadFlags::IGNAEOF) {
        return Err(FruError::simple(ErrorCode::UnterminatedArea, location));
    } else if !terminated {
        log::warn!("{location}: area has no terminator, continuing anyway");
    }

    Ok((mandatory, custom))
}
