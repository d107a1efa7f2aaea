//! Chassis information area.

use super::{decode_info_fields, decode_info_header, encode_info_area};
use crate::error::{FruError, Location};
use crate::field::{FieldEncoding, FieldValue};
use crate::io::LoadFlags;
use crate::list::RecordList;

/// SMBIOS "Rack Mount Chassis" type, used as the default per spec.md section 3.
pub const DEFAULT_CHASSIS_TYPE: u8 = 0x17;

/// Chassis information area: identity of the physical enclosure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChassisInfo {
    /// SMBIOS chassis-type byte. Not validated beyond being a byte (spec.md section
    /// 3: "vendors use SMBIOS values").
    pub chassis_type: u8,
    pub part_number: FieldValue,
    pub serial_number: FieldValue,
    pub custom: RecordList<FieldValue>,
}

impl Default for ChassisInfo {
    fn default() -> Self {
        Self::new()
    }
}

impl ChassisInfo {
    pub fn new() -> Self {
        Self {
            chassis_type: DEFAULT_CHASSIS_TYPE,
            part_number: FieldValue::empty(),
            serial_number: FieldValue::empty(),
            custom: RecordList::new(),
        }
    }

    /// The mandatory fields in their fixed on-disk order (part number, serial number).
    pub fn mandatory_fields(&self) -> [&FieldValue; 2] {
        [&self.part_number, &self.serial_number]
    }

    pub fn mandatory_field_mut(&mut self, index: usize) -> Result<&mut FieldValue, FruError> {
        match index {
            0 => Ok(&mut self.part_number),
            1 => Ok(&mut self.serial_number),
            _ => Err(FruError::new(
                crate::error::ErrorCode::NoSuchField,
                Location::Chassis,
                index as i32,
            )),
        }
    }

    pub(crate) fn encode(&self) -> Result<Vec<u8>, FruError> {
        encode_info_area(
            self.chassis_type,
            &[],
            &[self.part_number.clone(), self.serial_number.clone()],
            &self.custom,
        )
    }

    pub(crate) fn decode(bytes: &[u8], flags: LoadFlags) -> Result<Self, FruError> {
        let (header, _extra) = decode_info_header(bytes, 0, Location::Chassis, flags)?;
        let field_region = &bytes[3..header.area_len - 1];
        let (mandatory, custom) = decode_info_fields(field_region, 2, Location::Chassis, flags)?;
        let mut iter = mandatory.into_iter();
        Ok(Self {
            chassis_type: header.type_or_lang,
            part_number: iter.next().unwrap(),
            serial_number: iter.next().unwrap(),
            custom,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn roundtrip_preserves_fields() {
        let mut chassis = ChassisInfo::new();
        chassis.part_number.set(FieldEncoding::Text, "ABC-001").unwrap();
        chassis.serial_number.set(FieldEncoding::Text, "S/N 42").unwrap();

        let bytes = chassis.encode().unwrap();
        assert_eq!(bytes.len() % 8, 0);
        assert_eq!(bytes[0], 0x01);
        assert_eq!(bytes[2], DEFAULT_CHASSIS_TYPE);

        let decoded = ChassisInfo::decode(&bytes, LoadFlags::empty()).unwrap();
        assert_eq!(decoded.part_number.value(), "ABC-001");
        assert_eq!(decoded.serial_number.value(), "S/N 42");
        assert_eq!(decoded.chassis_type, DEFAULT_CHASSIS_TYPE);
    }

    #[test]
    fn spec_scenario_two_chassis_only() {
        let mut chassis = ChassisInfo::new();
        chassis.part_number.set(FieldEncoding::Text, "ABC-001").unwrap();
        chassis.serial_number.set(FieldEncoding::Text, "S/N 42").unwrap();
        let bytes = chassis.encode().unwrap();
        assert_eq!(bytes.len() % 8, 0);
        assert_eq!(bytes[0], 0x01);
        assert_eq!(bytes[1] as usize * 8, bytes.len());
        assert_eq!(bytes[2], 0x17);
        let sum: u8 = bytes.iter().fold(0u8, |a, &b| a.wrapping_add(b));
        assert_eq!(sum, 0);

        let decoded = ChassisInfo::decode(&bytes, LoadFlags::empty()).unwrap();
        assert_eq!(decoded.chassis_type, 0x17);
        assert_eq!(decoded.part_number.encoding(), FieldEncoding::Text);
        assert_eq!(decoded.serial_number.encoding(), FieldEncoding::Text);
    }
}
