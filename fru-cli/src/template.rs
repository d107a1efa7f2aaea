//! JSON batch-edit template (component C12).
//!
//! `fru-core` has no knowledge of this format; it is purely a `fru-cli` convenience
//! for describing a set of field/record edits as one JSON document instead of many
//! `fruutil set` invocations.

use anyhow::{anyhow, Context, Result};
use fru_core::{AreaPosition, AreaType, FieldEncoding, Fru, InsertAt, MgmtSubtype, MultirecordRecord, RawEncoding};
use serde::{Deserialize, Serialize};

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct FruTemplate {
    #[serde(default)]
    pub internal_use: Option<String>,
    #[serde(default)]
    pub chassis: Option<ChassisTemplate>,
    #[serde(default)]
    pub board: Option<BoardTemplate>,
    #[serde(default)]
    pub product: Option<ProductTemplate>,
    #[serde(default)]
    pub multirecord: Vec<MrTemplate>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct ChassisTemplate {
    pub chassis_type: Option<u8>,
    pub part_number: Option<String>,
    pub serial_number: Option<String>,
    #[serde(default)]
    pub custom: Vec<String>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct BoardTemplate {
    /// RFC 3339 timestamp; omit to leave the manufacture date unspecified.
    pub date: Option<String>,
    pub manufacturer: Option<String>,
    pub product_name: Option<String>,
    pub serial_number: Option<String>,
    pub part_number: Option<String>,
    pub fru_file_id: Option<String>,
    #[serde(default)]
    pub custom: Vec<String>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct ProductTemplate {
    pub manufacturer: Option<String>,
    pub product_name: Option<String>,
    pub part_number: Option<String>,
    pub version: Option<String>,
    pub serial_number: Option<String>,
    pub asset_tag: Option<String>,
    pub fru_file_id: Option<String>,
    #[serde(default)]
    pub custom: Vec<String>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum MrTemplate {
    ManagementAccess { subtype: String, value: String },
    Raw { #[serde(rename = "type")] record_type: u8, encoding: String, data: String },
}

/// Applies every key present in `self` to `fru`, enabling areas as needed.
pub fn apply(template: &FruTemplate, fru: &mut Fru) -> Result<()> {
    if let Some(hex) = &template.internal_use {
        fru.enable_area(AreaType::Internal, AreaPosition::Auto)
            .context("enabling internal-use area")?;
        fru.set_internal_hexstring(hex).context("setting internal-use data")?;
    }

    if let Some(chassis) = &template.chassis {
        fru.enable_area(AreaType::Chassis, AreaPosition::Auto)
            .context("enabling chassis area")?;
        let info = fru.chassis_mut()?;
        if let Some(t) = chassis.chassis_type {
            info.chassis_type = t;
        }
        if let Some(v) = &chassis.part_number {
            info.part_number.set(FieldEncoding::Auto, v)?;
        }
        if let Some(v) = &chassis.serial_number {
            info.serial_number.set(FieldEncoding::Auto, v)?;
        }
        for value in &chassis.custom {
            fru.add_custom_field(AreaType::Chassis, InsertAt::Tail, FieldEncoding::Auto, value)?;
        }
    }

    if let Some(board) = &template.board {
        fru.enable_area(AreaType::Board, AreaPosition::Auto)
            .context("enabling board area")?;
        if let Some(date) = &board.date {
            let parsed = chrono::DateTime::parse_from_rfc3339(date)
                .with_context(|| format!("parsing board date {date:?}"))?
                .with_timezone(&chrono::Utc);
            fru.board_mut()?.set_date(parsed)?;
        }
        let info = fru.board_mut()?;
        if let Some(v) = &board.manufacturer {
            info.manufacturer.set(FieldEncoding::Auto, v)?;
        }
        if let Some(v) = &board.product_name {
            info.product_name.set(FieldEncoding::Auto, v)?;
        }
        if let Some(v) = &board.serial_number {
            info.serial_number.set(FieldEncoding::Auto, v)?;
        }
        if let Some(v) = &board.part_number {
            info.part_number.set(FieldEncoding::Auto, v)?;
        }
        if let Some(v) = &board.fru_file_id {
            info.fru_file_id.set(FieldEncoding::Auto, v)?;
        }
        for value in &board.custom {
            fru.add_custom_field(AreaType::Board, InsertAt::Tail, FieldEncoding::Auto, value)?;
        }
    }

    if let Some(product) = &template.product {
        fru.enable_area(AreaType::Product, AreaPosition::Auto)
            .context("enabling product area")?;
        let info = fru.product_mut()?;
        if let Some(v) = &product.manufacturer {
            info.manufacturer.set(FieldEncoding::Auto, v)?;
        }
        if let Some(v) = &product.product_name {
            info.product_name.set(FieldEncoding::Auto, v)?;
        }
        if let Some(v) = &product.part_number {
            info.part_number.set(FieldEncoding::Auto, v)?;
        }
        if let Some(v) = &product.version {
            info.version.set(FieldEncoding::Auto, v)?;
        }
        if let Some(v) = &product.serial_number {
            info.serial_number.set(FieldEncoding::Auto, v)?;
        }
        if let Some(v) = &product.asset_tag {
            info.asset_tag.set(FieldEncoding::Auto, v)?;
        }
        if let Some(v) = &product.fru_file_id {
            info.fru_file_id.set(FieldEncoding::Auto, v)?;
        }
        for value in &product.custom {
            fru.add_custom_field(AreaType::Product, InsertAt::Tail, FieldEncoding::Auto, value)?;
        }
    }

    if !template.multirecord.is_empty() {
        fru.enable_area(AreaType::Multirecord, AreaPosition::Auto)
            .context("enabling multirecord area")?;
        for entry in &template.multirecord {
            let record = match entry {
                MrTemplate::ManagementAccess { subtype, value } => {
                    MultirecordRecord::management_access(parse_subtype(subtype)?, value.clone())?
                }
                MrTemplate::Raw { record_type, encoding, data } => {
                    MultirecordRecord::raw(*record_type, parse_raw_encoding(encoding)?, data.clone())
                }
            };
            fru.add_mr(InsertAt::Tail, record)?;
        }
    }

    Ok(())
}

fn parse_subtype(s: &str) -> Result<MgmtSubtype> {
    Ok(match s {
        "system_url" => MgmtSubtype::SystemUrl,
        "system_name" => MgmtSubtype::SystemName,
        "system_ping_address" => MgmtSubtype::SystemPingAddress,
        "component_url" => MgmtSubtype::ComponentUrl,
        "component_name" => MgmtSubtype::ComponentName,
        "component_ping_address" => MgmtSubtype::ComponentPingAddress,
        "system_uuid" => MgmtSubtype::SystemUuid,
        other => return Err(anyhow!("unknown management-access subtype {other:?}")),
    })
}

fn parse_raw_encoding(s: &str) -> Result<RawEncoding> {
    match s {
        "text" => Ok(RawEncoding::Text),
        "binary_hex" => Ok(RawEncoding::BinaryHex),
        other => Err(anyhow!("unknown raw record encoding {other:?}")),
    }
}
