//! Codec and in-memory model for IPMI FRU Information Storage Definition files.
//!
//! `fru-core` reads and writes the binary layout described by the IPMI Platform
//! Management FRU Information Storage Definition: a small file header pointing at up
//! to five areas (internal-use, chassis, board, product, multirecord), each with its
//! own field encodings and checksums. [`model::Fru`] is the editing surface; [`io`]
//! is the load/save facade most callers should start from.

pub mod area;
pub mod error;
pub mod field;
pub mod file;
pub mod io;
pub mod list;
pub mod model;
pub mod multirecord;
pub mod util;

pub use error::{ErrorCode, FruError, Location};
pub use field::{FieldEncoding, FieldValue};
pub use file::AreaType;
pub use io::{LoadFlags, SaveFlags};
pub use list::{InsertAt, RecordList};
pub use model::{AreaPosition, Fru};
pub use multirecord::{MgmtSubtype, MultirecordBody, MultirecordRecord, RawEncoding};
