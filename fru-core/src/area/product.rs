//! Product information area.

use super::{decode_info_fields, decode_info_header, encode_info_area};
use crate::error::{ErrorCode, FruError, Location};
use crate::field::FieldValue;
use crate::io::LoadFlags;
use crate::list::RecordList;

/// Product information area: identity of the finished product.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductInfo {
    /// IPMI language code (not validated beyond being a byte).
    pub language_code: u8,
    pub manufacturer: FieldValue,
    pub product_name: FieldValue,
    pub part_number: FieldValue,
    pub version: FieldValue,
    pub serial_number: FieldValue,
    pub asset_tag: FieldValue,
    pub fru_file_id: FieldValue,
    pub custom: RecordList<FieldValue>,
}

impl Default for ProductInfo {
    fn default() -> Self {
        Self::new()
    }
}

impl ProductInfo {
    pub fn new() -> Self {
        Self {
            language_code: 0,
            manufacturer: FieldValue::empty(),
            product_name: FieldValue::empty(),
            part_number: FieldValue::empty(),
            version: FieldValue::empty(),
            serial_number: FieldValue::empty(),
            asset_tag: FieldValue::empty(),
            fru_file_id: FieldValue::empty(),
            custom: RecordList::new(),
        }
    }

    pub fn mandatory_fields(&self) -> [&FieldValue; 7] {
        [
            &self.manufacturer,
            &self.product_name,
            &self.part_number,
            &self.version,
            &self.serial_number,
            &self.asset_tag,
            &self.fru_file_id,
        ]
    }

    pub fn mandatory_field_mut(&mut self, index: usize) -> Result<&mut FieldValue, FruError> {
        match index {
            0 => Ok(&mut self.manufacturer),
            1 => Ok(&mut self.product_name),
            2 => Ok(&mut self.part_number),
            3 => Ok(&mut self.version),
            4 => Ok(&mut self.serial_number),
            5 => Ok(&mut self.asset_tag),
            6 => Ok(&mut self.fru_file_id),
            _ => Err(FruError::new(ErrorCode::NoSuchField, Location::Product, index as i32)),
        }
    }

    pub(crate) fn encode(&self) -> Result<Vec<u8>, FruError> {
        encode_info_area(
            self.language_code,
            &[],
            &[
                self.manufacturer.clone(),
                self.product_name.clone(),
                self.part_number.clone(),
                self.version.clone(),
                self.serial_number.clone(),
                self.asset_tag.clone(),
                self.fru_file_id.clone(),
            ],
            &self.custom,
        )
    }

    pub(crate) fn decode(bytes: &[u8], flags: LoadFlags) -> Result<Self, FruError> {
        let (header, _extra) = decode_info_header(bytes, 0, Location::Product, flags)?;
        let field_region = &bytes[3..header.area_len - 1];
        let (mandatory, custom) = decode_info_fields(field_region, 7, Location::Product, flags)?;
        let mut iter = mandatory.into_iter();
        Ok(Self {
            language_code: header.type_or_lang,
            manufacturer: iter.next().unwrap(),
            product_name: iter.next().unwrap(),
            part_number: iter.next().unwrap(),
            version: iter.next().unwrap(),
            serial_number: iter.next().unwrap(),
            asset_tag: iter.next().unwrap(),
            fru_file_id: iter.next().unwrap(),
            custom,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::field::FieldEncoding;

    #[test]
    fn auto_encoding_picks_six_bit_for_product_part_number() {
        let mut product = ProductInfo::new();
        product.part_number.set(FieldEncoding::Auto, "ABCDE").unwrap();
        let bytes = product.encode().unwrap();
        // field region starts right after the 3-byte header; manufacturer is empty
        // (0xC0), so the part-number field's type/length byte is the next one.
        assert_eq!(bytes[3], 0xC0);
        assert_eq!(bytes[4], 0x84);

        let decoded = ProductInfo::decode(&bytes, LoadFlags::empty()).unwrap();
        assert_eq!(decoded.part_number.encoding(), FieldEncoding::SixBitAscii);
        assert_eq!(decoded.part_number.value(), "ABCDE");
    }
}
