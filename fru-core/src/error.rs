//! The structured error model (component C1).
//!
//! Every fallible entry point in this crate returns `Result<T, FruError>` directly.
//! A thread-local mirror of the most recently produced error is also kept, purely as
//! a convenience for callers (namely `fru-cli`) that want to render the
//! `<prefix>: <strerr> in <location> (field/record <index>)` message described in the
//! companion tool's error format without having to thread the `Result` value around.
//! No internal logic in this crate ever branches on the thread-local value.

use std::cell::RefCell;
use std::fmt;

/// A stable reason code for a codec failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    BadVersion,
    BadChecksumFileHeader,
    BadChecksumAreaData,
    BadChecksumRecordHeader,
    BadChecksumRecordData,
    BufferTooSmall,
    BufferTooBig,
    SizeMismatch,
    NonPrintable,
    NonHex,
    OddNibbleCount,
    AutoDetectFailed,
    InvalidEncoding,
    InvalidAreaType,
    DuplicateAreaInOrder,
    UnterminatedArea,
    BoardDateOutOfRange,
    NoSuchField,
    NoSuchRecord,
    MalformedData,
    NoData,
    BadMrManagementSubtype,
    UnsupportedMrType,
    /// Informational: signals "no more records" to callers of `find_mr`, not a real failure.
    EndOfMr,
    InvalidAreaPosition,
    NonEmptyList,
    AreaAlreadyEnabled,
    AreaAlreadyDisabled,
    Uninitialized,
    InternalBug,
    /// Defers to the OS for the actual message (`io::Error`'s `Display`).
    Generic,
}

impl ErrorCode {
    /// A stable, human-readable description, independent of the variant's source location.
    pub fn strerr(self) -> &'static str {
        self.describe()
    }

    fn describe(self) -> &'static str {
        match self {
            ErrorCode::BadVersion => "bad version",
            ErrorCode::BadChecksumFileHeader => "bad file-header checksum",
            ErrorCode::BadChecksumAreaData => "bad area checksum",
            ErrorCode::BadChecksumRecordHeader => "bad record-header checksum",
            ErrorCode::BadChecksumRecordData => "bad record-data checksum",
            ErrorCode::BufferTooSmall => "buffer too small",
            ErrorCode::BufferTooBig => "buffer too big",
            ErrorCode::SizeMismatch => "size mismatch",
            ErrorCode::NonPrintable => "non-printable input",
            ErrorCode::NonHex => "non-hex input",
            ErrorCode::OddNibbleCount => "odd nibble count",
            ErrorCode::AutoDetectFailed => "could not auto-detect an encoding",
            ErrorCode::InvalidEncoding => "invalid encoding",
            ErrorCode::InvalidAreaType => "invalid area type",
            ErrorCode::DuplicateAreaInOrder => "duplicate area in order",
            ErrorCode::UnterminatedArea => "unterminated area",
            ErrorCode::BoardDateOutOfRange => "board date out of range",
            ErrorCode::NoSuchField => "no such field",
            ErrorCode::NoSuchRecord => "no such record",
            ErrorCode::MalformedData => "malformed data",
            ErrorCode::NoData => "no data",
            ErrorCode::BadMrManagementSubtype => "bad management-access subtype",
            ErrorCode::UnsupportedMrType => "unsupported multirecord type",
            ErrorCode::EndOfMr => "end of multirecord list",
            ErrorCode::InvalidAreaPosition => "invalid area position",
            ErrorCode::NonEmptyList => "list is not empty",
            ErrorCode::AreaAlreadyEnabled => "area already enabled",
            ErrorCode::AreaAlreadyDisabled => "area already disabled",
            ErrorCode::Uninitialized => "structure not initialized",
            ErrorCode::InternalBug => "internal error",
            ErrorCode::Generic => "generic error",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.describe())
    }
}

/// Which part of the FRU a [`FruError`] refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Location {
    Internal,
    Chassis,
    Board,
    Product,
    Multirecord,
    General,
    Caller,
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Location::Internal => "Internal",
            Location::Chassis => "Chassis",
            Location::Board => "Board",
            Location::Product => "Product",
            Location::Multirecord => "Multirecord",
            Location::General => "General",
            Location::Caller => "Caller",
        };
        f.write_str(s)
    }
}

/// Index into a field or record list, or `-1` when not applicable.
pub const NO_INDEX: i32 = -1;

/// A structured codec error: a reason code, the area/location it occurred in, and an
/// optional field/record index within that location.
#[derive(Debug, Clone, thiserror::Error)]
#[error("{code} in {location}")]
pub struct FruError {
    pub code: ErrorCode,
    pub location: Location,
    pub index: i32,
    /// Only populated for [`ErrorCode::Generic`]; carries the OS-provided message.
    pub detail: Option<String>,
}

impl FruError {
    pub fn new(code: ErrorCode, location: Location, index: i32) -> Self {
        Self {
            code,
            location,
            index,
            detail: None,
        }
    }

    pub fn simple(code: ErrorCode, location: Location) -> Self {
        Self::new(code, location, NO_INDEX)
    }

    pub fn generic(location: Location, err: std::io::Error) -> Self {
        Self {
            code: ErrorCode::Generic,
            location,
            index: NO_INDEX,
            detail: Some(err.to_string()),
        }
    }

    /// Human-readable reason, deferring to the OS message for [`ErrorCode::Generic`].
    pub fn strerr(&self) -> String {
        match (&self.code, &self.detail) {
            (ErrorCode::Generic, Some(detail)) => detail.clone(),
            _ => self.code.strerr().to_string(),
        }
    }

    /// `" (field/record <index>)"` suffix used by the companion tool's error format,
    /// empty when `index` is [`NO_INDEX`].
    pub fn index_suffix(&self) -> String {
        if self.index == NO_INDEX {
            String::new()
        } else {
            format!(" (index {})", self.index)
        }
    }
}

thread_local! {
    static LAST_ERROR: RefCell<Option<FruError>> = RefCell::new(None);
}

/// Records `err` in the thread-local slot and returns it, so call sites can write
/// `return Err(error::set_last(FruError::new(...)))`.
pub fn set_last(err: FruError) -> FruError {
    log::trace!("setting last error: {:?}", err);
    LAST_ERROR.with(|cell| *cell.borrow_mut() = Some(err.clone()));
    err
}

/// Records `err` without failing the current call; used for "reports but does not
/// fail" style operations such as [`crate::model::Fru::disable_area`] on an already
/// absent area.
pub fn record_info(code: ErrorCode, location: Location, index: i32) {
    set_last(FruError::new(code, location, index));
}

/// The most recently recorded error on this thread, if any.
pub fn last_error() -> Option<FruError> {
    LAST_ERROR.with(|cell| cell.borrow().clone())
}

/// Clears the thread-local error slot.
pub fn clear_last_error() {
    LAST_ERROR.with(|cell| *cell.borrow_mut() = None);
}
