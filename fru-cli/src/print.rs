//! Human-readable and JSON rendering of a loaded FRU, plus the shared error-message
//! format described by the companion tool's design (spec.md section 7).

use fru_core::{AreaType, Fru, FruError, MultirecordBody};
use serde_json::{json, Value};

/// `"<prefix>: <strerr> in <location> (index <n>)"`, omitting the index suffix when
/// the error has none.
pub fn format_error(prefix: &str, err: &FruError) -> String {
    format!("{prefix}: {} in {}{}", err.strerr(), err.location, err.index_suffix())
}

pub fn print_human(fru: &Fru) {
    if let Ok(internal) = fru.internal() {
        println!("Internal Use Area:");
        println!("  data: {}", internal.hex());
    }
    if let Ok(chassis) = fru.chassis() {
        println!("Chassis Info Area:");
        println!("  chassis type: {:#04x}", chassis.chassis_type);
        println!("  part number:  {}", chassis.part_number.value());
        println!("  serial:       {}", chassis.serial_number.value());
        print_custom("  ", fru, AreaType::Chassis);
    }
    if let Ok(board) = fru.board() {
        println!("Board Info Area:");
        println!(
            "  mfg date:     {}",
            if board.date_set {
                board.timestamp.to_rfc3339()
            } else {
                "unspecified".to_string()
            }
        );
        println!("  manufacturer: {}", board.manufacturer.value());
        println!("  product:      {}", board.product_name.value());
        println!("  serial:       {}", board.serial_number.value());
        println!("  part number:  {}", board.part_number.value());
        println!("  fru file id:  {}", board.fru_file_id.value());
        print_custom("  ", fru, AreaType::Board);
    }
    if let Ok(product) = fru.product() {
        println!("Product Info Area:");
        println!("  manufacturer: {}", product.manufacturer.value());
        println!("  product name: {}", product.product_name.value());
        println!("  part number:  {}", product.part_number.value());
        println!("  version:      {}", product.version.value());
        println!("  serial:       {}", product.serial_number.value());
        println!("  asset tag:    {}", product.asset_tag.value());
        println!("  fru file id:  {}", product.fru_file_id.value());
        print_custom("  ", fru, AreaType::Product);
    }
    let records = fru.multirecords();
    if !records.is_empty() {
        println!("Multirecord Area ({} record(s)):", records.len());
        for (i, record) in records.iter().enumerate() {
            match &record.body {
                MultirecordBody::ManagementAccess { subtype, value } => {
                    println!("  [{i}] management access {subtype:?}: {value}");
                }
                MultirecordBody::Raw { record_type, encoding, data } => {
                    println!("  [{i}] raw type {record_type:#04x} ({encoding:?}): {data}");
                }
            }
        }
    }
}

fn print_custom(indent: &str, fru: &Fru, area: AreaType) {
    if let Ok(custom) = fru.custom_fields(area) {
        for (i, field) in custom.iter().enumerate() {
            println!("{indent}custom[{i}]: {}", field.value());
        }
    }
}

pub fn to_json(fru: &Fru) -> Value {
    let mut root = serde_json::Map::new();
    if let Ok(internal) = fru.internal() {
        root.insert("internal_use".into(), json!(internal.hex()));
    }
    if let Ok(chassis) = fru.chassis() {
        root.insert(
            "chassis".into(),
            json!({
                "chassis_type": chassis.chassis_type,
                "part_number": chassis.part_number.value(),
                "serial_number": chassis.serial_number.value(),
                "custom": custom_json(fru, AreaType::Chassis),
            }),
        );
    }
    if let Ok(board) = fru.board() {
        root.insert(
            "board".into(),
            json!({
                "date": if board.date_set { Some(board.timestamp.to_rfc3339()) } else { None },
                "manufacturer": board.manufacturer.value(),
                "product_name": board.product_name.value(),
                "serial_number": board.serial_number.value(),
                "part_number": board.part_number.value(),
                "fru_file_id": board.fru_file_id.value(),
                "custom": custom_json(fru, AreaType::Board),
            }),
        );
    }
    if let Ok(product) = fru.product() {
        root.insert(
            "product".into(),
            json!({
                "manufacturer": product.manufacturer.value(),
                "product_name": product.product_name.value(),
                "part_number": product.part_number.value(),
                "version": product.version.value(),
                "serial_number": product.serial_number.value(),
                "asset_tag": product.asset_tag.value(),
                "fru_file_id": product.fru_file_id.value(),
                "custom": custom_json(fru, AreaType::Product),
            }),
        );
    }
    let records: Vec<Value> = fru
        .multirecords()
        .iter()
        .map(|record| match &record.body {
            MultirecordBody::ManagementAccess { subtype, value } => {
                json!({"kind": "management_access", "subtype": format!("{subtype:?}"), "value": value})
            }
            MultirecordBody::Raw { record_type, encoding, data } => {
                json!({"kind": "raw", "type": record_type, "encoding": format!("{encoding:?}"), "data": data})
            }
        })
        .collect();
    if !records.is_empty() {
        root.insert("multirecord".into(), Value::Array(records));
    }
    Value::Object(root)
}

fn custom_json(fru: &Fru, area: AreaType) -> Vec<Value> {
    fru.custom_fields(area)
        .map(|list| list.iter().map(|f| json!(f.value())).collect())
        .unwrap_or_default()
}
