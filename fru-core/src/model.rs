//! The in-memory FRU model (component C9): the editing surface `fru-cli` and library
//! consumers program against, sitting on top of the per-area codecs.

use crate::area::board::BoardInfo;
use crate::area::chassis::ChassisInfo;
use crate::area::internal::InternalUse;
use crate::area::product::ProductInfo;
use crate::error::{ErrorCode, FruError, Location, NO_INDEX};
use crate::field::{FieldEncoding, FieldValue};
use crate::file::{AreaType, FileHeader, HEADER_LEN};
use crate::io::LoadFlags;
use crate::list::{InsertAt, RecordList};
use crate::multirecord::{self, MultirecordRecord};
use crate::util::block_align;

/// Where to place an area being enabled or moved.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AreaPosition {
    First,
    Last,
    /// Immediately after `AreaType`, which must already be present.
    After(AreaType),
    /// Insert keeping the areas in their canonical header-slot order.
    Auto,
}

/// A complete FRU record: zero or more of the five areas, each independently
/// enabled/disabled and re-orderable on disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fru {
    internal: Option<InternalUse>,
    chassis: Option<ChassisInfo>,
    board: Option<BoardInfo>,
    product: Option<ProductInfo>,
    multirecord: Option<RecordList<MultirecordRecord>>,
    /// Disk layout order of the currently-present areas.
    order: Vec<AreaType>,
}

impl Default for Fru {
    fn default() -> Self {
        Self::new()
    }
}

impl Fru {
    /// A FRU with no areas enabled.
    pub fn new() -> Self {
        Self {
            internal: None,
            chassis: None,
            board: None,
            product: None,
            multirecord: None,
            order: Vec::new(),
        }
    }

    /// Resets to the state [`new`](Self::new) produces, discarding all areas.
    pub fn init(&mut self) {
        *self = Self::new();
    }

    /// Alias for [`init`](Self::init): discards every area.
    pub fn wipe(&mut self) {
        self.init();
    }

    pub fn is_area_enabled(&self, area: AreaType) -> bool {
        self.is_present(area)
    }

    fn is_present(&self, area: AreaType) -> bool {
        match area {
            AreaType::Internal => self.internal.is_some(),
            AreaType::Chassis => self.chassis.is_some(),
            AreaType::Board => self.board.is_some(),
            AreaType::Product => self.product.is_some(),
            AreaType::Multirecord => self.multirecord.is_some(),
        }
    }

    /// Enables `area` with default contents, inserting it at `position`. Enabling an
    /// already-enabled area is not an error: it is recorded via
    /// [`crate::error::record_info`] as [`ErrorCode::AreaAlreadyEnabled`] and left
    /// untouched.
    pub fn enable_area(&mut self, area: AreaType, position: AreaPosition) -> Result<(), FruError> {
        if self.is_present(area) {
            crate::error::record_info(ErrorCode::AreaAlreadyEnabled, area_location(area), NO_INDEX);
            return Ok(());
        }
        match area {
            AreaType::Internal => self.internal = Some(InternalUse::default()),
            AreaType::Chassis => self.chassis = Some(ChassisInfo::new()),
            AreaType::Board => self.board = Some(BoardInfo::new()),
            AreaType::Product => self.product = Some(ProductInfo::new()),
            AreaType::Multirecord => self.multirecord = Some(RecordList::new()),
        }
        self.insert_order(area, position);
        log::debug!("enabled {area:?} area");
        Ok(())
    }

    /// Disables `area`, discarding its contents. Disabling an already-absent area is
    /// recorded as [`ErrorCode::AreaAlreadyDisabled`] rather than failing.
    pub fn disable_area(&mut self, area: AreaType) -> Result<(), FruError> {
        if !self.is_present(area) {
            crate::error::record_info(ErrorCode::AreaAlreadyDisabled, area_location(area), NO_INDEX);
            return Ok(());
        }
        match area {
            AreaType::Internal => self.internal = None,
            AreaType::Chassis => self.chassis = None,
            AreaType::Board => self.board = None,
            AreaType::Product => self.product = None,
            AreaType::Multirecord => self.multirecord = None,
        }
        self.order.retain(|&a| a != area);
        Ok(())
    }

    /// Relocates an already-enabled area to `position`.
    pub fn move_area(&mut self, area: AreaType, position: AreaPosition) -> Result<(), FruError> {
        if !self.is_present(area) {
            return Err(FruError::simple(ErrorCode::Uninitialized, area_location(area)));
        }
        self.order.retain(|&a| a != area);
        self.insert_order(area, position);
        Ok(())
    }

    fn insert_order(&mut self, area: AreaType, position: AreaPosition) {
        match position {
            AreaPosition::First => self.order.insert(0, area),
            AreaPosition::Last => self.order.push(area),
            AreaPosition::After(other) => match self.order.iter().position(|&a| a == other) {
                Some(pos) => self.order.insert(pos + 1, area),
                None => self.order.push(area),
            },
            AreaPosition::Auto => {
                let slot = area.slot();
                let pos = self
                    .order
                    .iter()
                    .position(|&a| a.slot() > slot)
                    .unwrap_or(self.order.len());
                self.order.insert(pos, area);
            }
        }
    }

    pub fn chassis(&self) -> Result<&ChassisInfo, FruError> {
        self.chassis
            .as_ref()
            .ok_or_else(|| FruError::simple(ErrorCode::Uninitialized, Location::Chassis))
    }

    pub fn chassis_mut(&mut self) -> Result<&mut ChassisInfo, FruError> {
        self.chassis
            .as_mut()
            .ok_or_else(|| FruError::simple(ErrorCode::Uninitialized, Location::Chassis))
    }

    pub fn board(&self) -> Result<&BoardInfo, FruError> {
        self.board
            .as_ref()
            .ok_or_else(|| FruError::simple(ErrorCode::Uninitialized, Location::Board))
    }

    pub fn board_mut(&mut self) -> Result<&mut BoardInfo, FruError> {
        self.board
            .as_mut()
            .ok_or_else(|| FruError::simple(ErrorCode::Uninitialized, Location::Board))
    }

    pub fn product(&self) -> Result<&ProductInfo, FruError> {
        self.product
            .as_ref()
            .ok_or_else(|| FruError::simple(ErrorCode::Uninitialized, Location::Product))
    }

    pub fn product_mut(&mut self) -> Result<&mut ProductInfo, FruError> {
        self.product
            .as_mut()
            .ok_or_else(|| FruError::simple(ErrorCode::Uninitialized, Location::Product))
    }

    pub fn internal(&self) -> Result<&InternalUse, FruError> {
        self.internal
            .as_ref()
            .ok_or_else(|| FruError::simple(ErrorCode::Uninitialized, Location::Internal))
    }

    /// Sets the internal-use area's contents to `bytes`. The area must already be
    /// enabled via [`enable_area`](Self::enable_area).
    pub fn set_internal_binary(&mut self, bytes: &[u8]) -> Result<(), FruError> {
        let internal = self
            .internal
            .as_mut()
            .ok_or_else(|| FruError::simple(ErrorCode::Uninitialized, Location::Internal))?;
        *internal = InternalUse::from_bytes(bytes);
        Ok(())
    }

    /// As [`set_internal_binary`](Self::set_internal_binary), from a hex string.
    pub fn set_internal_hexstring(&mut self, hex: &str) -> Result<(), FruError> {
        let parsed = InternalUse::from_hex(hex)?;
        let internal = self
            .internal
            .as_mut()
            .ok_or_else(|| FruError::simple(ErrorCode::Uninitialized, Location::Internal))?;
        *internal = parsed;
        Ok(())
    }

    /// Disables the internal-use area, equivalent to `disable_area(AreaType::Internal)`.
    pub fn delete_internal(&mut self) -> Result<(), FruError> {
        self.disable_area(AreaType::Internal)
    }

    /// Reads the custom-field list of `area` (chassis, board, or product).
    pub fn custom_fields(&self, area: AreaType) -> Result<&RecordList<FieldValue>, FruError> {
        match area {
            AreaType::Chassis => Ok(&self.chassis()?.custom),
            AreaType::Board => Ok(&self.board()?.custom),
            AreaType::Product => Ok(&self.product()?.custom),
            _ => Err(FruError::simple(ErrorCode::InvalidAreaType, area_location(area))),
        }
    }

    fn custom_fields_mut(&mut self, area: AreaType) -> Result<&mut RecordList<FieldValue>, FruError> {
        match area {
            AreaType::Chassis => Ok(&mut self.chassis_mut()?.custom),
            AreaType::Board => Ok(&mut self.board_mut()?.custom),
            AreaType::Product => Ok(&mut self.product_mut()?.custom),
            _ => Err(FruError::simple(ErrorCode::InvalidAreaType, area_location(area))),
        }
    }

    /// Validates `value` under `encoding` and inserts it into `area`'s custom-field
    /// list at `at`, returning the resulting index.
    pub fn add_custom_field(
        &mut self,
        area: AreaType,
        at: InsertAt,
        encoding: FieldEncoding,
        value: &str,
    ) -> Result<usize, FruError> {
        let mut field = FieldValue::empty();
        field.set(encoding, value)?;
        let location = area_location(area);
        self.custom_fields_mut(area)?.add(at, field, location)
    }

    pub fn delete_custom_field(&mut self, area: AreaType, index: usize) -> Result<FieldValue, FruError> {
        let location = area_location(area);
        self.custom_fields_mut(area)?.delete(index, location)
    }

    pub fn multirecords(&self) -> &[MultirecordRecord] {
        self.multirecord.as_ref().map(RecordList::as_slice).unwrap_or(&[])
    }

    fn multirecord_list_mut(&mut self) -> Result<&mut RecordList<MultirecordRecord>, FruError> {
        self.multirecord
            .as_mut()
            .ok_or_else(|| FruError::simple(ErrorCode::Uninitialized, Location::Multirecord))
    }

    pub fn add_mr(&mut self, at: InsertAt, record: MultirecordRecord) -> Result<usize, FruError> {
        self.multirecord_list_mut()?.add(at, record, Location::Multirecord)
    }

    pub fn get_mr(&self, index: usize) -> Result<&MultirecordRecord, FruError> {
        self.multirecord
            .as_ref()
            .ok_or_else(|| FruError::simple(ErrorCode::Uninitialized, Location::Multirecord))?
            .find(index, Location::Multirecord)
    }

    /// Returns the index of the first record at or after `start` matching `predicate`,
    /// or `None` if the area is disabled or no record matches
    /// ([`ErrorCode::EndOfMr`] is the caller-facing spelling of that `None`).
    pub fn find_mr(&self, start: usize, predicate: impl Fn(&MultirecordRecord) -> bool) -> Option<usize> {
        let list = self.multirecord.as_ref()?;
        list.as_slice()
            .iter()
            .enumerate()
            .skip(start)
            .find(|(_, record)| predicate(record))
            .map(|(index, _)| index)
    }

    pub fn replace_mr(&mut self, index: usize, record: MultirecordRecord) -> Result<(), FruError> {
        *self.multirecord_list_mut()?.find_mut(index, Location::Multirecord)? = record;
        Ok(())
    }

    pub fn delete_mr(&mut self, index: usize) -> Result<MultirecordRecord, FruError> {
        self.multirecord_list_mut()?.delete(index, Location::Multirecord)
    }

    /// Encodes the whole FRU: the 8-byte file header plus each enabled area in disk
    /// order, padding the areas that have no self-described length (internal-use,
    /// and multirecord when something follows it) to an 8-byte boundary.
    pub(crate) fn encode(&self) -> Result<Vec<u8>, FruError> {
        let mut byte_offsets: [Option<usize>; 5] = [None; 5];
        let mut area_bytes: Vec<Vec<u8>> = Vec::with_capacity(self.order.len());
        let mut cursor = HEADER_LEN;

        for (i, &area) in self.order.iter().enumerate() {
            let is_last = i + 1 == self.order.len();
            let mut bytes = match area {
                AreaType::Internal => self.internal().map(InternalUse::encode)?,
                AreaType::Chassis => self.chassis()?.encode()?,
                AreaType::Board => self.board()?.encode()?,
                AreaType::Product => self.product()?.encode()?,
                AreaType::Multirecord => multirecord::encode_area(self.multirecords())?,
            };
            let needs_padding = matches!(area, AreaType::Internal)
                || (matches!(area, AreaType::Multirecord) && !is_last);
            if needs_padding {
                bytes.resize(block_align(bytes.len()), 0);
            }
            byte_offsets[area.slot()] = Some(cursor);
            cursor += bytes.len();
            area_bytes.push(bytes);
        }

        let header = FileHeader::from_byte_offsets(byte_offsets)?;
        let mut out = Vec::with_capacity(cursor);
        out.extend(header.encode());
        for bytes in area_bytes {
            out.extend(bytes);
        }
        log::debug!("encoded fru: {} area(s), {} bytes total", self.order.len(), out.len());
        Ok(out)
    }

    /// Decodes a whole FRU file image, determining each present area's byte span by
    /// sorting the header's offsets (see [`crate::file`] module docs).
    pub(crate) fn decode(bytes: &[u8], flags: LoadFlags) -> Result<Self, FruError> {
        let header = FileHeader::decode(bytes, flags)?;
        let disk_order = header.disk_order();
        let mut fru = Self::new();

        for (i, &(area, offset)) in disk_order.iter().enumerate() {
            let end = disk_order
                .get(i + 1)
                .map(|&(_, next_offset)| next_offset)
                .unwrap_or(bytes.len());
            if offset > bytes.len() || end > bytes.len() || offset > end {
                return Err(FruError::simple(ErrorCode::SizeMismatch, area_location(area)));
            }
            let region = &bytes[offset..end];
            match area {
                AreaType::Internal => fru.internal = Some(InternalUse::decode(region)),
                AreaType::Chassis => fru.chassis = Some(ChassisInfo::decode(region, flags)?),
                AreaType::Board => fru.board = Some(BoardInfo::decode(region, flags)?),
                AreaType::Product => fru.product = Some(ProductInfo::decode(region, flags)?),
                AreaType::Multirecord => {
                    let records = multirecord::decode_area(region, flags)?;
                    fru.multirecord = Some(records.into_iter().collect());
                }
            }
            fru.order.push(area);
        }

        log::debug!("decoded fru: {} area(s), {} bytes", fru.order.len(), bytes.len());
        Ok(fru)
    }
}

fn area_location(area: AreaType) -> Location {
    match area {
        AreaType::Internal => Location::Internal,
        AreaType::Chassis => Location::Chassis,
        AreaType::Board => Location::Board,
        AreaType::Product => Location::Product,
        AreaType::Multirecord => Location::Multirecord,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::multirecord::MgmtSubtype;

    #[test]
    fn empty_fru_roundtrips() {
        let fru = Fru::new();
        let bytes = fru.encode().unwrap();
        assert_eq!(bytes.len(), HEADER_LEN);
        let decoded = Fru::decode(&bytes, LoadFlags::empty()).unwrap();
        assert_eq!(decoded, fru);
    }

    #[test]
    fn enable_disable_is_idempotent() {
        let mut fru = Fru::new();
        fru.enable_area(AreaType::Chassis, AreaPosition::Last).unwrap();
        assert!(fru.is_area_enabled(AreaType::Chassis));
        // Re-enabling does not fail and does not reset existing contents.
        fru.chassis_mut()
            .unwrap()
            .part_number
            .set(FieldEncoding::Text, "X")
            .unwrap();
        fru.enable_area(AreaType::Chassis, AreaPosition::Last).unwrap();
        assert_eq!(fru.chassis().unwrap().part_number.value(), "X");

        fru.disable_area(AreaType::Chassis).unwrap();
        assert!(!fru.is_area_enabled(AreaType::Chassis));
        // Disabling an absent area is also not an error.
        fru.disable_area(AreaType::Chassis).unwrap();
    }

    #[test]
    fn move_area_changes_disk_order_but_not_contents() {
        let mut fru = Fru::new();
        fru.enable_area(AreaType::Chassis, AreaPosition::Last).unwrap();
        fru.enable_area(AreaType::Board, AreaPosition::Last).unwrap();
        fru.move_area(AreaType::Board, AreaPosition::First).unwrap();

        let bytes = fru.encode().unwrap();
        let decoded = Fru::decode(&bytes, LoadFlags::empty()).unwrap();
        assert!(decoded.is_area_enabled(AreaType::Chassis));
        assert!(decoded.is_area_enabled(AreaType::Board));

        let header = FileHeader::decode(&bytes, LoadFlags::empty()).unwrap();
        let board_offset = header.byte_offset(AreaType::Board).unwrap();
        let chassis_offset = header.byte_offset(AreaType::Chassis).unwrap();
        assert!(board_offset < chassis_offset);
    }

    #[test]
    fn multirecord_roundtrips_with_other_areas() {
        let mut fru = Fru::new();
        fru.enable_area(AreaType::Product, AreaPosition::Auto).unwrap();
        fru.enable_area(AreaType::Multirecord, AreaPosition::Auto).unwrap();
        fru.product_mut()
            .unwrap()
            .manufacturer
            .set(FieldEncoding::Text, "Acme")
            .unwrap();
        let record =
            MultirecordRecord::management_access(MgmtSubtype::SystemName, "node-1").unwrap();
        fru.add_mr(InsertAt::Tail, record).unwrap();

        let bytes = fru.encode().unwrap();
        let decoded = Fru::decode(&bytes, LoadFlags::empty()).unwrap();
        assert_eq!(decoded.product().unwrap().manufacturer.value(), "Acme");
        assert_eq!(decoded.multirecords().len(), 1);
    }

    #[test]
    fn internal_area_padding_does_not_break_following_area() {
        let mut fru = Fru::new();
        fru.enable_area(AreaType::Internal, AreaPosition::First).unwrap();
        fru.set_internal_binary(&[0xAB, 0xCD, 0xEF]).unwrap();
        fru.enable_area(AreaType::Chassis, AreaPosition::Last).unwrap();
        fru.chassis_mut()
            .unwrap()
            .serial_number
            .set(FieldEncoding::Text, "S1")
            .unwrap();

        let bytes = fru.encode().unwrap();
        let decoded = Fru::decode(&bytes, LoadFlags::empty()).unwrap();
        assert_eq!(decoded.chassis().unwrap().serial_number.value(), "S1");
    }

    #[test]
    fn accessing_disabled_area_is_uninitialized_error() {
        let fru = Fru::new();
        let err = fru.chassis().unwrap_err();
        assert_eq!(err.code, ErrorCode::Uninitialized);
    }
}
