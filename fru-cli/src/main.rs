mod cli;
mod print;
mod template;

use std::fs;
use std::process::ExitCode;

use anyhow::{anyhow, Context, Result};
use clap::Parser;
use fru_core::{AreaPosition, AreaType, FieldEncoding, Fru, InsertAt, LoadFlags, SaveFlags};

use cli::{AreaArg, Args, Command, DumpArgs, NewArgs, SetArgs, TemplateArgs, ValidateArgs};

fn main() -> ExitCode {
    let args = Args::parse();
    simple_logger::SimpleLogger::new()
        .with_level(if args.verbose() {
            log::LevelFilter::Trace
        } else {
            log::LevelFilter::Warn
        })
        .init()
        .expect("logger already initialized");

    let result = match &args.cmd {
        Command::Dump(a) => dump(a),
        Command::New(a) => new(a),
        Command::Set(a) => set(a),
        Command::Validate(a) => return validate(a),
        Command::Template(a) => template_cmd(a),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("fruutil: {err:#}");
            ExitCode::FAILURE
        }
    }
}

fn dump(args: &DumpArgs) -> Result<()> {
    let fru = fru_core::io::load_file(&args.file, LoadFlags::empty())
        .with_context(|| format!("loading {}", args.file.display()))?;
    if args.json {
        println!("{}", serde_json::to_string_pretty(&print::to_json(&fru))?);
    } else {
        print::print_human(&fru);
    }
    Ok(())
}

fn new(args: &NewArgs) -> Result<()> {
    let fru = Fru::new();
    fru_core::io::save_file(&fru, SaveFlags::empty(), &args.file)
        .with_context(|| format!("writing {}", args.file.display()))?;
    Ok(())
}

fn set(args: &SetArgs) -> Result<()> {
    let mut fru = fru_core::io::load_file(&args.file, LoadFlags::empty())
        .with_context(|| format!("loading {}", args.file.display()))?;

    let area = match args.area {
        AreaArg::Chassis => AreaType::Chassis,
        AreaArg::Board => AreaType::Board,
        AreaArg::Product => AreaType::Product,
    };
    fru.enable_area(area, AreaPosition::Auto)?;

    let encoding: FieldEncoding = args.encoding.into();
    if let Some(index) = args.field.strip_prefix("custom:") {
        let index: usize = index
            .parse()
            .map_err(|_| anyhow!("invalid custom field index {:?}", args.field))?;
        let existing = fru.custom_fields(area)?.len();
        if index < existing {
            fru.delete_custom_field(area, index)?;
        }
        fru.add_custom_field(area, InsertAt::Index(index), encoding, &args.value)?;
    } else {
        set_mandatory_field(&mut fru, area, &args.field, &args.value, encoding)?;
    }

    fru_core::io::save_file(&fru, SaveFlags::empty(), &args.file)
        .with_context(|| format!("writing {}", args.file.display()))?;
    Ok(())
}

fn set_mandatory_field(
    fru: &mut Fru,
    area: AreaType,
    field: &str,
    value: &str,
    encoding: FieldEncoding,
) -> Result<()> {
    match area {
        AreaType::Chassis => {
            let info = fru.chassis_mut()?;
            match field {
                "chassis-type" => {
                    info.chassis_type =
                        value.parse().with_context(|| format!("parsing chassis type {value:?}"))?;
                }
                "part-number" => info.part_number.set(encoding, value)?,
                "serial-number" => info.serial_number.set(encoding, value)?,
                other => return Err(anyhow!("chassis has no field {other:?}")),
            }
        }
        AreaType::Board => {
            if field == "date" {
                let parsed = chrono::DateTime::parse_from_rfc3339(value)
                    .with_context(|| format!("parsing board date {value:?}"))?
                    .with_timezone(&chrono::Utc);
                fru.board_mut()?.set_date(parsed)?;
                return Ok(());
            }
            let info = fru.board_mut()?;
            match field {
                "manufacturer" => info.manufacturer.set(encoding, value)?,
                "product-name" => info.product_name.set(encoding, value)?,
                "serial-number" => info.serial_number.set(encoding, value)?,
                "part-number" => info.part_number.set(encoding, value)?,
                "fru-file-id" => info.fru_file_id.set(encoding, value)?,
                other => return Err(anyhow!("board has no field {other:?}")),
            }
        }
        AreaType::Product => {
            let info = fru.product_mut()?;
            match field {
                "manufacturer" => info.manufacturer.set(encoding, value)?,
                "product-name" => info.product_name.set(encoding, value)?,
                "part-number" => info.part_number.set(encoding, value)?,
                "version" => info.version.set(encoding, value)?,
                "serial-number" => info.serial_number.set(encoding, value)?,
                "asset-tag" => info.asset_tag.set(encoding, value)?,
                "fru-file-id" => info.fru_file_id.set(encoding, value)?,
                other => return Err(anyhow!("product has no field {other:?}")),
            }
        }
        _ => return Err(anyhow!("{area:?} has no mandatory fields")),
    }
    Ok(())
}

fn validate(args: &ValidateArgs) -> ExitCode {
    // Strict: no IGN* flags, so the first structural problem is surfaced as an error
    // rather than silently worked around.
    match fru_core::io::load_file(&args.file, LoadFlags::empty()) {
        Ok(_) => {
            println!("{}: ok", args.file.display());
            ExitCode::SUCCESS
        }
        Err(err) => {
            println!("{}", print::format_error(&args.file.display().to_string(), &err));
            ExitCode::FAILURE
        }
    }
}

fn template_cmd(args: &TemplateArgs) -> Result<()> {
    let mut fru = fru_core::io::load_file(&args.file, LoadFlags::empty())
        .with_context(|| format!("loading {}", args.file.display()))?;
    let json = fs::read_to_string(&args.json_path)
        .with_context(|| format!("reading {}", args.json_path.display()))?;
    let parsed: template::FruTemplate =
        serde_json::from_str(&json).with_context(|| format!("parsing {}", args.json_path.display()))?;
    template::apply(&parsed, &mut fru)?;
    fru_core::io::save_file(&fru, SaveFlags::empty(), &args.file)
        .with_context(|| format!("writing {}", args.file.display()))?;
    Ok(())
}
