//! Whole-file integration tests covering the six concrete end-to-end scenarios and
//! selected invariants.

use chrono::{TimeZone, Utc};
use fru_core::area::board::base_epoch;
use fru_core::io::{load_buffer, load_file, save_buffer, save_file, LoadFlags, SaveFlags};
use fru_core::{
    AreaPosition, AreaType, ErrorCode, FieldEncoding, Fru, InsertAt, MgmtSubtype, MultirecordRecord,
};

#[test]
fn scenario_1_empty_fru_save_load() {
    let fru = Fru::new();
    let bytes = save_buffer(&fru, SaveFlags::empty()).unwrap();
    assert_eq!(bytes, vec![0x01, 0, 0, 0, 0, 0, 0, 0xFF]);

    let loaded = load_buffer(&bytes, LoadFlags::empty()).unwrap();
    for area in AreaType::ALL {
        assert!(!loaded.is_area_enabled(area));
    }
}

#[test]
fn scenario_2_chassis_only_text_fields() {
    let mut fru = Fru::new();
    fru.enable_area(AreaType::Chassis, AreaPosition::Last).unwrap();
    {
        let chassis = fru.chassis_mut().unwrap();
        chassis.chassis_type = 0x17;
        chassis.part_number.set(FieldEncoding::Text, "ABC-001").unwrap();
        chassis.serial_number.set(FieldEncoding::Text, "S/N 42").unwrap();
    }

    let bytes = save_buffer(&fru, SaveFlags::empty()).unwrap();
    assert_eq!(bytes.len() % 8, 0);
    // file header (8 bytes) + chassis area.
    let area = &bytes[8..];
    assert_eq!(&area[..3], &[0x01, (area.len() / 8) as u8, 0x17]);
    let sum: u8 = area.iter().fold(0u8, |a, &b| a.wrapping_add(b));
    assert_eq!(sum, 0);

    let loaded = load_buffer(&bytes, LoadFlags::empty()).unwrap();
    let chassis = loaded.chassis().unwrap();
    assert_eq!(chassis.chassis_type, 0x17);
    assert_eq!(chassis.part_number.encoding(), FieldEncoding::Text);
    assert_eq!(chassis.part_number.value(), "ABC-001");
    assert_eq!(chassis.serial_number.encoding(), FieldEncoding::Text);
    assert_eq!(chassis.serial_number.value(), "S/N 42");
}

#[test]
fn scenario_3_auto_encoding_picks_six_bit() {
    let mut fru = Fru::new();
    fru.enable_area(AreaType::Product, AreaPosition::Last).unwrap();
    fru.product_mut()
        .unwrap()
        .part_number
        .set(FieldEncoding::Auto, "ABCDE")
        .unwrap();

    let bytes = save_buffer(&fru, SaveFlags::empty()).unwrap();
    let loaded = load_buffer(&bytes, LoadFlags::empty()).unwrap();
    let product = loaded.product().unwrap();
    assert_eq!(product.part_number.encoding(), FieldEncoding::SixBitAscii);
    assert_eq!(product.part_number.value(), "ABCDE");
}

#[test]
fn scenario_4_board_date_round_trip() {
    let mut fru = Fru::new();
    fru.enable_area(AreaType::Board, AreaPosition::Last).unwrap();
    fru.board_mut().unwrap().set_date(base_epoch()).unwrap();

    let bytes = save_buffer(&fru, SaveFlags::empty()).unwrap();
    // header (8) + board area header (version,len,lang = 3 bytes) then 3 date bytes.
    let board_area = &bytes[8..];
    assert_eq!(&board_area[3..6], &[0x01, 0x00, 0x00]);

    let mut fru_auto = Fru::new();
    fru_auto.enable_area(AreaType::Board, AreaPosition::Last).unwrap();
    fru_auto.board_mut().unwrap().auto_timestamp = true;
    let bytes = save_buffer(&fru_auto, SaveFlags::empty()).unwrap();
    let loaded = load_buffer(&bytes, LoadFlags::empty()).unwrap();
    let diff = (Utc::now() - loaded.board().unwrap().timestamp).num_seconds().abs();
    assert!(diff <= 30);
}

#[test]
fn scenario_5_multirecord_uuid() {
    let mut fru = Fru::new();
    fru.enable_area(AreaType::Multirecord, AreaPosition::Last).unwrap();
    let record =
        MultirecordRecord::management_access(MgmtSubtype::SystemUuid, "00112233445566778899AABBCCDDEEFF")
            .unwrap();
    fru.add_mr(InsertAt::Tail, record).unwrap();

    let bytes = save_buffer(&fru, SaveFlags::empty()).unwrap();
    let mr_area = &bytes[8..];
    // 5-byte record header, then subtype byte, then the 16-byte UUID payload.
    assert_eq!(mr_area[1] & 0x80, 0x80, "eol flag must be set on the only record");
    let payload = &mr_area[6..22];
    assert_eq!(
        payload,
        &[0x33, 0x22, 0x11, 0x00, 0x55, 0x44, 0x77, 0x66, 0x88, 0x99, 0xAA, 0xBB, 0xCC, 0xDD, 0xEE, 0xFF]
    );

    let loaded = load_buffer(&bytes, LoadFlags::empty()).unwrap();
    let records = loaded.multirecords();
    assert_eq!(records.len(), 1);
    match &records[0].body {
        fru_core::MultirecordBody::ManagementAccess { subtype, value } => {
            assert_eq!(*subtype, MgmtSubtype::SystemUuid);
            assert_eq!(value, "00112233445566778899AABBCCDDEEFF");
        }
        _ => panic!("expected a management access record"),
    }
}

#[test]
fn scenario_6_truncated_file_rejection() {
    let err = load_buffer(&[0, 0, 0, 0], LoadFlags::empty()).unwrap_err();
    assert_eq!(err.code, ErrorCode::BufferTooSmall);

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("oversized.fru");
    std::fs::write(&path, vec![0u8; 64 * 1024 + 1]).unwrap();
    let err = load_file(&path, LoadFlags::empty()).unwrap_err();
    assert_eq!(err.code, ErrorCode::BufferTooBig);
    // Oversized is accepted with IGNBIG, though the content is still not a valid FRU.
    assert!(matches!(
        load_file(&path, LoadFlags::IGNBIG).unwrap_err().code,
        ErrorCode::BadChecksumFileHeader | ErrorCode::BadVersion
    ));
}

#[test]
fn idempotence_of_disable() {
    let mut fru = Fru::new();
    fru.enable_area(AreaType::Chassis, AreaPosition::Last).unwrap();
    fru.disable_area(AreaType::Chassis).unwrap();
    let once = fru.clone();
    fru.disable_area(AreaType::Chassis).unwrap();
    assert_eq!(fru, once);
}

#[test]
fn order_invariant_after_enable_last_and_disable() {
    let mut fru = Fru::new();
    fru.enable_area(AreaType::Chassis, AreaPosition::Last).unwrap();
    fru.enable_area(AreaType::Board, AreaPosition::Last).unwrap();
    assert!(fru.is_area_enabled(AreaType::Board));

    fru.disable_area(AreaType::Board).unwrap();
    assert!(!fru.is_area_enabled(AreaType::Board));
    assert!(fru.is_area_enabled(AreaType::Chassis));
}

#[test]
fn relaxed_flag_subsumption_for_bad_area_checksum() {
    let mut fru = Fru::new();
    fru.enable_area(AreaType::Chassis, AreaPosition::Last).unwrap();
    let mut bytes = save_buffer(&fru, SaveFlags::empty()).unwrap();
    let last = bytes.len() - 1;
    bytes[last] ^= 0xFF;

    assert!(load_buffer(&bytes, LoadFlags::empty()).is_err());
    assert!(load_buffer(&bytes, LoadFlags::IGNACKSUM).is_ok());
}

#[test]
fn save_file_and_load_file_agree_with_buffer_api() {
    let mut fru = Fru::new();
    fru.enable_area(AreaType::Product, AreaPosition::Last).unwrap();
    fru.product_mut()
        .unwrap()
        .manufacturer
        .set(FieldEncoding::Auto, "Acme Corp")
        .unwrap();

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("product.fru");
    save_file(&fru, SaveFlags::empty(), &path).unwrap();
    let loaded = load_file(&path, LoadFlags::empty()).unwrap();
    assert_eq!(loaded, fru);
}

#[test]
fn board_date_before_epoch_is_out_of_range() {
    let mut board = fru_core::area::board::BoardInfo::new();
    let too_early = Utc.with_ymd_and_hms(1995, 12, 31, 23, 59, 0).unwrap();
    let err = board.set_date(too_early).unwrap_err();
    assert_eq!(err.code, ErrorCode::BoardDateOutOfRange);
}
