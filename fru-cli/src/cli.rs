//! Command-line argument parsing (component C11).

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

#[derive(Debug, Parser)]
#[command(name = "fruutil", about = "Inspect and edit IPMI FRU files")]
pub struct Args {
    #[command(subcommand)]
    pub cmd: Command,
}

impl Args {
    pub fn verbose(&self) -> bool {
        match &self.cmd {
            Command::Dump(a) => a.verbose,
            Command::New(a) => a.verbose,
            Command::Set(a) => a.verbose,
            Command::Validate(a) => a.verbose,
            Command::Template(a) => a.verbose,
        }
    }
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Print a FRU file's contents.
    Dump(DumpArgs),
    /// Write an empty FRU file.
    New(NewArgs),
    /// Load, change one field, and save a FRU file.
    Set(SetArgs),
    /// Load with strict flags and report the first error found.
    Validate(ValidateArgs),
    /// Apply a batch of edits described by a JSON document.
    Template(TemplateArgs),
}

#[derive(Debug, clap::Args)]
pub struct DumpArgs {
    pub file: PathBuf,
    /// Print as JSON instead of human-readable text.
    #[arg(long)]
    pub json: bool,
    #[arg(short, long)]
    pub verbose: bool,
}

#[derive(Debug, clap::Args)]
pub struct NewArgs {
    pub file: PathBuf,
    #[arg(short, long)]
    pub verbose: bool,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum AreaArg {
    Chassis,
    Board,
    Product,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum EncodingArg {
    Auto,
    Text,
    BcdPlus,
    SixBit,
    BinaryHex,
}

impl From<EncodingArg> for fru_core::FieldEncoding {
    fn from(value: EncodingArg) -> Self {
        match value {
            EncodingArg::Auto => fru_core::FieldEncoding::Auto,
            EncodingArg::Text => fru_core::FieldEncoding::Text,
            EncodingArg::BcdPlus => fru_core::FieldEncoding::BcdPlus,
            EncodingArg::SixBit => fru_core::FieldEncoding::SixBitAscii,
            EncodingArg::BinaryHex => fru_core::FieldEncoding::BinaryHex,
        }
    }
}

#[derive(Debug, clap::Args)]
pub struct SetArgs {
    pub file: PathBuf,
    /// Area containing the field, e.g. `chassis`.
    #[arg(value_enum)]
    pub area: AreaArg,
    /// Mandatory field name (e.g. `part-number`) or `custom:<index>`.
    pub field: String,
    pub value: String,
    #[arg(long, value_enum, default_value = "auto")]
    pub encoding: EncodingArg,
    #[arg(short, long)]
    pub verbose: bool,
}

#[derive(Debug, clap::Args)]
pub struct ValidateArgs {
    pub file: PathBuf,
    #[arg(short, long)]
    pub verbose: bool,
}

#[derive(Debug, clap::Args)]
pub struct TemplateArgs {
    pub file: PathBuf,
    #[arg(long = "json")]
    pub json_path: PathBuf,
    #[arg(short, long)]
    pub verbose: bool,
}
