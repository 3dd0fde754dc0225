//! End-of-central-directory discovery.
//!
//! The EOCD record is the last structure in the file, but it may be followed
//! by a comment of up to 65535 bytes, and that comment may itself contain
//! bytes that look like the EOCD signature. Candidates are therefore found
//! by scanning backwards and only accepted when the record's declared
//! comment length ends exactly at the end of the file.

use super::error::{Result, ZipError};
use super::source::read_exact_at;
use super::structures::{EndOfCentralDirectory, LFH_SIZE};
use crate::io::ReadAt;

/// Maximum ZIP comment size allowed by the format (65535 bytes).
const MAX_COMMENT_SIZE: u64 = u16::MAX as u64;

/// Tail windows tried in order: a cheap one covering short comments, then
/// one large enough for the longest possible comment.
const SCAN_WINDOWS: [u64; 2] = [
    1024,
    MAX_COMMENT_SIZE + EndOfCentralDirectory::SIZE as u64,
];

/// What the EOCD record says about the central directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirectorySummary {
    pub entry_count: u16,
    pub directory_size: u32,
    pub directory_offset: u32,
    /// Offset of the EOCD record itself.
    pub eocd_offset: u64,
    /// Archive comment (the bytes after the EOCD record).
    pub comment: Vec<u8>,
}

/// Locate and validate the end of central directory record of `source`.
pub fn locate<R: ReadAt + ?Sized>(source: &R) -> Result<DirectorySummary> {
    let size = source.size();
    if size < EndOfCentralDirectory::SIZE as u64 {
        return Err(ZipError::format(format!(
            "{size} bytes is too small to hold an end of central directory record"
        )));
    }

    // Absolute offset below which candidates have not been examined yet.
    let mut scanned_from = size;

    for window in SCAN_WINDOWS {
        let window_len = window.min(size);
        let window_start = size - window_len;
        if window_start >= scanned_from {
            continue;
        }

        let mut buf = vec![0u8; window_len as usize];
        read_exact_at(source, window_start, &mut buf, "archive tail")?;

        if let Some(rel) = rfind_eocd(&buf, window_start, scanned_from, size) {
            let eocd = EndOfCentralDirectory::from_bytes(&buf[rel..])?;
            let eocd_offset = window_start + rel as u64;
            log::debug!(
                "end of central directory at {eocd_offset} (window {window_len} bytes)"
            );
            let comment = buf[rel + EndOfCentralDirectory::SIZE..].to_vec();
            return validate(eocd, eocd_offset, comment, size);
        }

        scanned_from = window_start;
        if window_len == size {
            break;
        }
    }

    Err(ZipError::format("end of central directory record not found"))
}

/// Scan `window` backwards for the rightmost EOCD candidate whose comment
/// ends exactly at `file_end`.
///
/// Only candidates starting below `scanned_from` (absolute) are checked.
fn rfind_eocd(window: &[u8], window_start: u64, scanned_from: u64, file_end: u64) -> Option<usize> {
    let last = window.len().checked_sub(EndOfCentralDirectory::SIZE)?;
    let limit = (scanned_from - window_start).min(last as u64 + 1) as usize;

    (0..limit).rev().find(|&i| {
        if &window[i..i + 4] != EndOfCentralDirectory::SIGNATURE {
            return false;
        }
        let at = i + EndOfCentralDirectory::COMMENT_LEN_OFFSET;
        let comment_len = u16::from_le_bytes([window[at], window[at + 1]]) as u64;
        window_start + i as u64 + EndOfCentralDirectory::SIZE as u64 + comment_len == file_end
    })
}

fn validate(
    eocd: EndOfCentralDirectory,
    eocd_offset: u64,
    comment: Vec<u8>,
    size: u64,
) -> Result<DirectorySummary> {
    if eocd.is_multi_disk() {
        return Err(ZipError::unsupported(format!(
            "multi-disk archive (disk {}, directory on disk {}, {} of {} entries on this disk)",
            eocd.disk_number, eocd.disk_with_cd, eocd.disk_entries, eocd.total_entries
        )));
    }
    if eocd.is_zip64() {
        return Err(ZipError::unsupported("Zip64 end of central directory"));
    }

    let cd_offset = eocd.cd_offset as u64;
    let cd_size = eocd.cd_size as u64;

    if cd_offset + cd_size > eocd_offset {
        return Err(ZipError::format(format!(
            "central directory ({cd_size} bytes at {cd_offset}) overlaps the end record at {eocd_offset}"
        )));
    }
    if cd_offset >= size {
        return Err(ZipError::format(format!(
            "central directory offset {cd_offset} is past the end of the file"
        )));
    }
    if eocd.total_entries as u64 * LFH_SIZE as u64 > cd_offset {
        return Err(ZipError::format(format!(
            "{} entries cannot fit before the central directory at {cd_offset}",
            eocd.total_entries
        )));
    }

    Ok(DirectorySummary {
        entry_count: eocd.total_entries,
        directory_size: eocd.cd_size,
        directory_offset: eocd.cd_offset,
        eocd_offset,
        comment,
    })
}
