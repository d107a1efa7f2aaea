//! Per-field textual encodings (component C3).
//!
//! On the wire, one field is a type/length byte (top two bits = encoding tag, bottom
//! six bits = data length) followed by that many data bytes. The maximum data length
//! is 63 bytes. The byte `0xC1` (text tag, length 1) is reserved as the end-of-fields
//! terminator and is never produced as a genuine one-character text field; see
//! [`encode_text_bytes`] for how that collision is avoided.

use crate::error::{ErrorCode, FruError, Location};
use crate::util::hex::{self, HexMode};

/// Maximum data length a field can carry (six bits).
pub const MAX_FIELD_LEN: usize = 63;

/// Type/length byte reserved to mark the end of an information area's field list.
pub const TERMINATOR: u8 = 0xC1;

/// The tag a caller may request when setting a field, or that a decoded field is
/// tagged with once its real on-disk encoding has been determined.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldEncoding {
    /// Let [`FieldValue::set`] pick the most restrictive encoding the string fits.
    Auto,
    /// An explicitly empty field; promoted to `Text` with zero length on encode.
    Empty,
    /// Stored value is a hex string; on-disk bytes are the raw decoded bytes.
    BinaryHex,
    BcdPlus,
    SixBitAscii,
    Text,
    /// API-boundary-only: keep whatever real encoding the field already has, or
    /// fall back to `Auto` for a field with no prior encoding. Never stored.
    Preserve,
}

/// The four real (storable) encodings, i.e. `FieldEncoding` minus `Preserve`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Tag {
    BinaryHex = 0b00,
    BcdPlus = 0b01,
    SixBitAscii = 0b10,
    Text = 0b11,
}

impl Tag {
    fn from_bits(bits: u8) -> Self {
        match bits {
            0b00 => Tag::BinaryHex,
            0b01 => Tag::BcdPlus,
            0b10 => Tag::SixBitAscii,
            _ => Tag::Text,
        }
    }

    fn encoding(self) -> FieldEncoding {
        match self {
            Tag::BinaryHex => FieldEncoding::BinaryHex,
            Tag::BcdPlus => FieldEncoding::BcdPlus,
            Tag::SixBitAscii => FieldEncoding::SixBitAscii,
            Tag::Text => FieldEncoding::Text,
        }
    }
}

/// One mandatory or custom text field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldValue {
    encoding: FieldEncoding,
    value: String,
}

impl Default for FieldValue {
    fn default() -> Self {
        Self::empty()
    }
}

impl FieldValue {
    /// An explicitly empty field.
    pub fn empty() -> Self {
        Self {
            encoding: FieldEncoding::Empty,
            value: String::new(),
        }
    }

    /// The field's current encoding tag (possibly `Auto` or `Empty` if not yet
    /// resolved by a round through [`encode`]).
    pub fn encoding(&self) -> FieldEncoding {
        self.encoding
    }

    /// The field's string value.
    pub fn value(&self) -> &str {
        &self.value
    }

    /// Validates `value` against `encoding` (or auto-selects a real encoding when
    /// `encoding` is `Auto`), storing the result. `Preserve` reuses the field's
    /// current real encoding if it has one, else behaves like `Auto`.
    pub fn set(&mut self, encoding: FieldEncoding, value: &str) -> Result<(), FruError> {
        let resolved = match encoding {
            FieldEncoding::Preserve => match self.encoding {
                FieldEncoding::Auto | FieldEncoding::Empty | FieldEncoding::Preserve => {
                    FieldEncoding::Auto
                }
                real => real,
            },
            other => other,
        };

        if value.is_empty() {
            self.encoding = FieldEncoding::Empty;
            self.value.clear();
            return Ok(());
        }

        match resolved {
            FieldEncoding::Auto => {
                let picked = auto_select(value)?;
                self.encoding = picked;
            }
            FieldEncoding::Empty => {
                self.encoding = FieldEncoding::Empty;
            }
            FieldEncoding::BinaryHex => {
                validate_binary_hex(value)?;
                self.encoding = FieldEncoding::BinaryHex;
            }
            FieldEncoding::BcdPlus => {
                validate_bcd_plus(value)?;
                self.encoding = FieldEncoding::BcdPlus;
            }
            FieldEncoding::SixBitAscii => {
                validate_six_bit(value)?;
                self.encoding = FieldEncoding::SixBitAscii;
            }
            FieldEncoding::Text => {
                validate_text(value)?;
                self.encoding = FieldEncoding::Text;
            }
            FieldEncoding::Preserve => unreachable!("resolved above"),
        }
        self.value = value.to_string();
        Ok(())
    }

    /// Stores `bytes` as a hex string with encoding `BinaryHex`, truncating to 63
    /// bytes if needed. Returns `Ok(true)` if truncation occurred ("too big", soft).
    pub fn set_binary(&mut self, bytes: &[u8]) -> Result<bool, FruError> {
        let truncated = bytes.len() > MAX_FIELD_LEN;
        let bytes = &bytes[..bytes.len().min(MAX_FIELD_LEN)];
        self.value = hex::bytes_to_hex(bytes);
        self.encoding = FieldEncoding::BinaryHex;
        Ok(truncated)
    }

    /// Serializes this field to its on-disk type/length byte plus data bytes,
    /// resolving `Auto`/`Empty` to a concrete encoding.
    pub fn encode(&self) -> Result<Vec<u8>, FruError> {
        match self.encoding {
            FieldEncoding::Empty => Ok(vec![tagged_len(Tag::Text, 0)]),
            FieldEncoding::Auto => {
                let mut resolved = self.clone();
                resolved.set(FieldEncoding::Auto, &self.value)?;
                resolved.encode()
            }
            FieldEncoding::BinaryHex => {
                let bytes = hex::hexstr_to_bin(&self.value, HexMode::Strict)?;
                encode_fixed(Tag::BinaryHex, &bytes)
            }
            FieldEncoding::BcdPlus => encode_bcd_plus(&self.value),
            FieldEncoding::SixBitAscii => encode_six_bit(&self.value),
            FieldEncoding::Text => Ok(encode_text_bytes(&self.value)?),
            FieldEncoding::Preserve => unreachable!("never stored"),
        }
    }

    /// Decodes one field starting at `bytes[0]`, returning the field and the number
    /// of bytes consumed (type/length byte + data). Returns `None` if `bytes[0]` is
    /// the area terminator.
    pub fn decode(bytes: &[u8], location: Location) -> Result<Option<(FieldValue, usize)>, FruError> {
        if bytes.is_empty() {
            return Err(FruError::simple(ErrorCode::NoData, location));
        }
        let type_len = bytes[0];
        if type_len == TERMINATOR {
            return Ok(None);
        }
        let tag = Tag::from_bits(type_len >> 6);
        let len = (type_len & 0x3F) as usize;
        if bytes.len() < 1 + len {
            return Err(FruError::simple(ErrorCode::MalformedData, location));
        }
        let data = &bytes[1..1 + len];
        let field = match tag {
            Tag::BinaryHex => FieldValue {
                encoding: FieldEncoding::BinaryHex,
                value: hex::bytes_to_hex(data),
            },
            Tag::BcdPlus => FieldValue {
                encoding: FieldEncoding::BcdPlus,
                value: decode_bcd_plus(data),
            },
            Tag::SixBitAscii => FieldValue {
                encoding: FieldEncoding::SixBitAscii,
                value: decode_six_bit(data),
            },
            Tag::Text => FieldValue {
                encoding: FieldEncoding::Text,
                value: decode_text_bytes(data),
            },
        };
        Ok(Some((field, 1 + len)))
    }
}

fn tagged_len(tag: Tag, len: usize) -> u8 {
    ((tag as u8) << 6) | (len as u8 & 0x3F)
}

fn encode_fixed(tag: Tag, data: &[u8]) -> Result<Vec<u8>, FruError> {
    if data.len() > MAX_FIELD_LEN {
        return Err(FruError::simple(ErrorCode::BufferTooBig, Location::General));
    }
    let mut out = Vec::with_capacity(1 + data.len());
    out.push(tagged_len(tag, data.len()));
    out.extend_from_slice(data);
    Ok(out)
}

/// Encodes a validated `text`-encoded string. A one-character string is padded with
/// a trailing NUL (stored length 2) to avoid colliding with the `0xC1` terminator
/// byte, which is itself a valid-looking "text, length 1" type/length byte; see the
/// module-level Open Question resolution in `SPEC_FULL.md` section 9.
pub fn encode_text_bytes(s: &str) -> Result<Vec<u8>, FruError> {
    if s.len() > MAX_FIELD_LEN {
        return Err(FruError::simple(ErrorCode::BufferTooBig, Location::General));
    }
    if s.len() == 1 {
        let mut out = Vec::with_capacity(3);
        out.push(tagged_len(Tag::Text, 2));
        out.push(s.as_bytes()[0]);
        out.push(0);
        return Ok(out);
    }
    encode_fixed(Tag::Text, s.as_bytes())
}

/// Reverses [`encode_text_bytes`]'s one-character NUL-padding convention.
fn decode_text_bytes(data: &[u8]) -> String {
    if data.len() == 2 && data[1] == 0 {
        return String::from_utf8_lossy(&data[..1]).into_owned();
    }
    String::from_utf8_lossy(data).into_owned()
}

const BCD_ALPHABET: &[u8] = b"0123456789 -.";

fn bcd_nibble(c: u8) -> Option<u8> {
    match c {
        b'0'..=b'9' => Some(c - b'0'),
        b' ' => Some(0xA),
        b'-' => Some(0xB),
        b'.' => Some(0xC),
        _ => None,
    }
}

fn bcd_char(nibble: u8) -> Option<u8> {
    match nibble {
        0x0..=0x9 => Some(b'0' + nibble),
        0xA => Some(b' '),
        0xB => Some(b'-'),
        0xC => Some(b'.'),
        _ => None,
    }
}

fn validate_bcd_plus(s: &str) -> Result<(), FruError> {
    if s.len() > MAX_FIELD_LEN * 2 || !s.bytes().all(|c| bcd_nibble(c).is_some()) {
        return Err(FruError::simple(ErrorCode::InvalidEncoding, Location::General));
    }
    Ok(())
}

fn encode_bcd_plus(s: &str) -> Result<Vec<u8>, FruError> {
    let mut nibbles: Vec<u8> = s
        .bytes()
        .map(|c| bcd_nibble(c).expect("validated by set()"))
        .collect();
    // Pad an odd nibble count with a trailing space so decode's "strip trailing
    // spaces" rule (spec.md section 4.3/8) recovers the original string exactly.
    if nibbles.len() % 2 != 0 {
        nibbles.push(0xA);
    }
    let mut bytes = Vec::with_capacity(nibbles.len() / 2);
    for pair in nibbles.chunks_exact(2) {
        bytes.push((pair[0] << 4) | pair[1]);
    }
    encode_fixed(Tag::BcdPlus, &bytes)
}

fn decode_bcd_plus(data: &[u8]) -> String {
    let mut s = String::with_capacity(data.len() * 2);
    for &byte in data {
        let hi = byte >> 4;
        let lo = byte & 0x0F;
        s.push(bcd_char(hi).unwrap_or(b' ') as char);
        s.push(bcd_char(lo).unwrap_or(b' ') as char);
    }
    while s.ends_with(' ') {
        s.pop();
    }
    s
}

/// Maximum source-character length that still fits in 63 stored bytes: `floor(63*8/6)`.
const SIX_BIT_MAX_CHARS: usize = 84;

fn validate_six_bit(s: &str) -> Result<(), FruError> {
    if s.chars().count() > SIX_BIT_MAX_CHARS
        || !s.bytes().all(|c| (0x20..=0x5F).contains(&c))
    {
        return Err(FruError::simple(ErrorCode::InvalidEncoding, Location::General));
    }
    Ok(())
}

fn encode_six_bit(s: &str) -> Result<Vec<u8>, FruError> {
    let mut acc: u32 = 0;
    let mut bits = 0u32;
    let mut out = Vec::with_capacity((s.len() * 6 + 7) / 8);
    for c in s.bytes() {
        let code = (c - 0x20) as u32;
        acc |= code << bits;
        bits += 6;
        while bits >= 8 {
            out.push((acc & 0xFF) as u8);
            acc >>= 8;
            bits -= 8;
        }
    }
    if bits > 0 {
        out.push((acc & 0xFF) as u8);
    }
    encode_fixed(Tag::SixBitAscii, &out)
}

fn decode_six_bit(data: &[u8]) -> String {
    let char_count = data.len() * 8 / 6;
    let mut acc: u32 = 0;
    let mut bits = 0u32;
    let mut chars = Vec::with_capacity(char_count);
    for &byte in data {
        acc |= (byte as u32) << bits;
        bits += 8;
        while bits >= 6 && chars.len() < char_count {
            let code = (acc & 0x3F) as u8;
            chars.push(code + 0x20);
            acc >>= 6;
            bits -= 6;
        }
    }
    chars.truncate(char_count);
    let mut s = String::from_utf8(chars).unwrap_or_default();
    while s.ends_with(' ') {
        s.pop();
    }
    s
}

fn validate_binary_hex(s: &str) -> Result<(), FruError> {
    if s.len() > MAX_FIELD_LEN * 2 {
        return Err(FruError::simple(ErrorCode::BufferTooBig, Location::General));
    }
    hex::hexstr_to_bin(s, HexMode::Strict).map(|_| ())
}

fn validate_text(s: &str) -> Result<(), FruError> {
    if s.len() > MAX_FIELD_LEN {
        return Err(FruError::simple(ErrorCode::BufferTooBig, Location::General));
    }
    if !s.bytes().all(|c| (0x20..=0x7E).contains(&c)) {
        return Err(FruError::simple(ErrorCode::NonPrintable, Location::General));
    }
    Ok(())
}

/// Picks the most restrictive encoding `s` fits, in the order six-bit, BCD+,
/// binary-hex, text. Auto-detection of binary-hex always uses strict hex scanning
/// (never [`HexMode::Relaxed`]) so that e.g. `"11 22"` is not mistaken for hex and
/// falls through to `text`, as required by spec.md section 4.3/9.
fn auto_select(s: &str) -> Result<FieldEncoding, FruError> {
    if validate_six_bit(s).is_ok() {
        return Ok(FieldEncoding::SixBitAscii);
    }
    if validate_bcd_plus(s).is_ok() {
        return Ok(FieldEncoding::BcdPlus);
    }
    if hex::is_strict_hex(s) && s.len() <= MAX_FIELD_LEN * 2 {
        return Ok(FieldEncoding::BinaryHex);
    }
    if validate_text(s).is_ok() {
        return Ok(FieldEncoding::Text);
    }
    Err(FruError::simple(ErrorCode::AutoDetectFailed, Location::General))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn roundtrip(encoding: FieldEncoding, s: &str) -> String {
        let mut f = FieldValue::empty();
        f.set(encoding, s).unwrap();
        let bytes = f.encode().unwrap();
        let (decoded, consumed) = FieldValue::decode(&bytes, Location::General).unwrap().unwrap();
        assert_eq!(consumed, bytes.len());
        decoded.value().to_string()
    }

    #[test]
    fn text_roundtrips() {
        assert_eq!(roundtrip(FieldEncoding::Text, "ABC-001"), "ABC-001");
    }

    #[test]
    fn one_char_text_roundtrips_without_colliding_with_terminator() {
        let mut f = FieldValue::empty();
        f.set(FieldEncoding::Text, "A").unwrap();
        let bytes = f.encode().unwrap();
        assert_eq!(bytes, vec![0xC2, b'A', 0x00]);
        assert_ne!(bytes[0], TERMINATOR);
        assert_eq!(roundtrip(FieldEncoding::Text, "A"), "A");
    }

    #[test]
    fn bcd_plus_roundtrips_even_length() {
        assert_eq!(roundtrip(FieldEncoding::BcdPlus, "1996-01"), "1996-01");
    }

    #[test]
    fn bcd_plus_odd_length_strips_pad_space() {
        assert_eq!(roundtrip(FieldEncoding::BcdPlus, "123"), "123");
    }

    #[test]
    fn six_bit_roundtrips() {
        assert_eq!(roundtrip(FieldEncoding::SixBitAscii, "ABCDE"), "ABCDE");
    }

    #[test]
    fn six_bit_length_byte_matches_spec_example() {
        let mut f = FieldValue::empty();
        f.set(FieldEncoding::SixBitAscii, "ABCDE").unwrap();
        let bytes = f.encode().unwrap();
        assert_eq!(bytes[0], 0x84);
    }

    #[test]
    fn binary_hex_roundtrips() {
        assert_eq!(roundtrip(FieldEncoding::BinaryHex, "DEADBEEF"), "DEADBEEF");
    }

    #[test]
    fn empty_field_encodes_to_0xc0() {
        let f = FieldValue::empty();
        assert_eq!(f.encode().unwrap(), vec![0xC0]);
    }

    #[test]
    fn auto_prefers_six_bit_over_text() {
        let mut f = FieldValue::empty();
        f.set(FieldEncoding::Auto, "ABCDE").unwrap();
        assert_eq!(f.encoding(), FieldEncoding::SixBitAscii);
    }

    #[test]
    fn auto_does_not_mistake_spaced_hex_digits_for_hex() {
        // "de ad" would relaxed-hex-decode to [0xDE, 0xAD], but strict probing (as
        // required by spec.md section 4.3/9) rejects the embedded space, so this
        // falls through six-bit (lowercase out of range) and BCD+ (not digits) to
        // plain text instead of being misread as binary-hex.
        let mut f = FieldValue::empty();
        f.set(FieldEncoding::Auto, "de ad").unwrap();
        assert_eq!(f.encoding(), FieldEncoding::Text);
    }

    #[test]
    fn auto_picks_hex_for_pure_hex_digits() {
        let mut f = FieldValue::empty();
        // Contains characters outside the BCD+ and six-bit alphabets once lowercase
        // hex digits appear, but is valid strict hex.
        f.set(FieldEncoding::Auto, "abcdef12").unwrap();
        assert_eq!(f.encoding(), FieldEncoding::BinaryHex);
    }

    #[test]
    fn auto_detect_failure_on_non_printable() {
        let mut f = FieldValue::empty();
        assert!(f.set(FieldEncoding::Auto, "\u{0}").is_err());
    }
}
