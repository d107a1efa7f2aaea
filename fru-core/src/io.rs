//! Load/save facade (component C10): flag types plus the buffer/file entry points.

use std::fs;
use std::path::Path;

use bitflags::bitflags;
use memmap2::Mmap;

use crate::error::{ErrorCode, FruError, Location};
use crate::model::Fru;

bitflags! {
    /// Relaxation flags for [`load_buffer`]/[`load_file`]. Each bit downgrades one
    /// otherwise-fatal validation failure to a logged warning; see spec.md section 6.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct LoadFlags: u32 {
        /// Ignore a bad file-header version.
        const IGNFVER = 1 << 0;
        /// Ignore a bad file-header checksum.
        const IGNFHCKSUM = 1 << 1;
        /// Ignore a bad information-area version.
        const IGNAVER = 1 << 2;
        /// Ignore a bad information-area checksum.
        const IGNACKSUM = 1 << 3;
        /// Ignore a missing information-area terminator.
        const IGNAEOF = 1 << 4;
        /// Ignore a bad multirecord record version.
        const IGNRVER = 1 << 5;
        /// Ignore a bad multirecord record-header checksum.
        const IGNRHCKSUM = 1 << 6;
        /// Ignore a bad multirecord record-data checksum.
        const IGNRDCKSUM = 1 << 7;
        /// Ignore a Management Access payload outside its subtype's size bounds.
        const IGNMRDATALEN = 1 << 8;
        /// Ignore a multirecord area with no end-of-list record.
        const IGNRNOEOL = 1 << 9;
        /// Skip the 64 KiB file-size cap.
        const IGNBIG = 1 << 10;
    }
}

bitflags! {
    /// Flags for [`save_into`]/[`save_buffer`]/[`save_file`]. No bits are defined yet;
    /// this gives callers a stable type to pass even before a save-side relaxation
    /// is introduced.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct SaveFlags: u32 {
    }
}

/// Files larger than this are rejected unless [`LoadFlags::IGNBIG`] is set.
pub const MAX_FILE_SIZE: usize = 64 * 1024;

/// Parses a complete FRU file image already in memory.
pub fn load_buffer(bytes: &[u8], flags: LoadFlags) -> Result<Fru, FruError> {
    if bytes.len() > MAX_FILE_SIZE && !flags.contains(LoadFlags::IGNBIG) {
        return Err(FruError::simple(ErrorCode::BufferTooBig, Location::General));
    }
    Fru::decode(bytes, flags)
}

/// Memory-maps `path` read-only and parses it. The file is capped at
/// [`MAX_FILE_SIZE`] unless `flags` contains [`LoadFlags::IGNBIG`], checked against
/// the file's metadata before mapping so an oversized file is never mapped at all.
pub fn load_file(path: impl AsRef<Path>, flags: LoadFlags) -> Result<Fru, FruError> {
    let path = path.as_ref();
    let file = fs::File::open(path).map_err(|e| FruError::generic(Location::General, e))?;
    let len = file
        .metadata()
        .map_err(|e| FruError::generic(Location::General, e))?
        .len() as usize;
    if len > MAX_FILE_SIZE && !flags.contains(LoadFlags::IGNBIG) {
        return Err(FruError::simple(ErrorCode::BufferTooBig, Location::General));
    }
    if len == 0 {
        return Err(FruError::simple(ErrorCode::BufferTooSmall, Location::General));
    }
    // SAFETY: the file is not expected to be concurrently truncated while mapped;
    // this is the same tradeoff the mmap-based loaders in the wider example corpus
    // accept (e.g. minidump-writer, symbolic) for read-only snapshot access.
    let map = unsafe { Mmap::map(&file) }.map_err(|e| FruError::generic(Location::General, e))?;
    log::debug!("mapped {} ({} bytes)", path.display(), map.len());
    load_buffer(&map, flags)
}

/// The exact byte length [`save_into`] would write for `fru`.
pub fn encoded_len(fru: &Fru) -> Result<usize, FruError> {
    Ok(fru.encode()?.len())
}

/// Encodes `fru` into `out`, appending (never truncating `out` first).
pub fn save_into(fru: &Fru, _flags: SaveFlags, out: &mut Vec<u8>) -> Result<(), FruError> {
    out.extend(fru.encode()?);
    Ok(())
}

/// Encodes `fru` into a freshly allocated buffer.
pub fn save_buffer(fru: &Fru, flags: SaveFlags) -> Result<Vec<u8>, FruError> {
    let mut out = Vec::new();
    save_into(fru, flags, &mut out)?;
    Ok(out)
}

/// Encodes `fru` and writes it to `path`, truncating any existing file.
pub fn save_file(fru: &Fru, flags: SaveFlags, path: impl AsRef<Path>) -> Result<(), FruError> {
    let bytes = save_buffer(fru, flags)?;
    fs::write(path, &bytes).map_err(|e| FruError::generic(Location::General, e))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn load_file_roundtrips_through_save_file() {
        let fru = Fru::new();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("empty.fru");
        save_file(&fru, SaveFlags::empty(), &path).unwrap();
        let loaded = load_file(&path, LoadFlags::empty()).unwrap();
        assert_eq!(loaded, fru);
    }

    #[test]
    fn oversized_buffer_rejected_without_ignbig() {
        let big = vec![0u8; MAX_FILE_SIZE + 8];
        assert!(load_buffer(&big, LoadFlags::empty()).is_err());
    }
}
