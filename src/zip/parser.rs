//! Central directory parsing.
//!
//! The directory is fetched with a single read and then decoded record by
//! record. Records are packed back to back, so each one must be consumed
//! exactly as declared; there is no resynchronisation after an error.
//!
//! Member names are copied into one [`NameArena`] owned by the archive and
//! referenced by [`NameSpan`]s rather than by borrowed slices.

use super::error::{Result, ZipError};
use super::locator::DirectorySummary;
use super::source::read_exact_at;
use super::structures::{
    CDFH_MIN_SIZE, CentralDirectoryHeader, CompressionMethod, FLAG_ENCRYPTED, Member,
};
use crate::io::ReadAt;

/// Location of one member name inside a [`NameArena`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NameSpan {
    start: usize,
    len: usize,
}

impl NameSpan {
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}

/// Contiguous storage for every member name of an archive.
///
/// Capacity is fixed up front from the directory size; a push that would
/// exceed it means the directory's length fields disagree with each other.
#[derive(Debug, Default)]
pub struct NameArena {
    bytes: Vec<u8>,
    budget: usize,
}

impl NameArena {
    pub fn with_budget(budget: usize) -> Self {
        Self {
            bytes: Vec::with_capacity(budget),
            budget,
        }
    }

    pub fn push(&mut self, name: &[u8]) -> Result<NameSpan> {
        let remaining = self.budget - self.bytes.len();
        if name.len() > remaining {
            return Err(ZipError::format(format!(
                "member name of {} bytes exceeds the {remaining} bytes left in the directory",
                name.len()
            )));
        }
        let span = NameSpan {
            start: self.bytes.len(),
            len: name.len(),
        };
        self.bytes.extend_from_slice(name);
        Ok(span)
    }

    pub fn get(&self, span: NameSpan) -> &[u8] {
        &self.bytes[span.start..span.start + span.len]
    }

    /// Total bytes stored; equals the sum of all pushed name lengths.
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

/// Decode the `summary.entry_count` records of the central directory.
///
/// Returned members are unresolved: their `data_offset` is still `None`.
pub fn parse_directory<R: ReadAt + ?Sized>(
    source: &R,
    summary: &DirectorySummary,
) -> Result<(Vec<Member>, NameArena)> {
    let entry_count = summary.entry_count as usize;
    let cd_size = summary.directory_size as usize;

    let budget = cd_size
        .checked_sub(entry_count * CDFH_MIN_SIZE)
        .ok_or_else(|| {
            ZipError::format(format!(
                "central directory of {cd_size} bytes cannot hold {entry_count} records"
            ))
        })?;

    // Read the entire Central Directory in one request
    // (efficient for HTTP as it's a single Range request)
    let mut cd_data = vec![0u8; cd_size];
    read_exact_at(
        source,
        summary.directory_offset as u64,
        &mut cd_data,
        "central directory",
    )?;

    let mut arena = NameArena::with_budget(budget);
    let mut members = Vec::with_capacity(entry_count);
    let mut pos = 0;

    for index in 0..entry_count {
        let (member, consumed) = parse_record(&cd_data[pos..], &mut arena)
            .map_err(|e| match e {
                ZipError::Format(msg) => ZipError::format(format!(
                    "central directory entry {index} (offset {}): {msg}",
                    summary.directory_offset as usize + pos
                )),
                other => other,
            })?;
        log::trace!(
            "entry {index}: {} bytes name, method {:?}, local header at {}",
            member.name.len(),
            member.compression_method,
            member.local_header_offset
        );
        members.push(member);
        pos += consumed;
    }

    if pos != cd_size {
        log::debug!(
            "{} trailing bytes after the last central directory record",
            cd_size - pos
        );
    }

    Ok((members, arena))
}

/// Decode one record from the front of `data`, returning the member and
/// the number of bytes the record occupies.
fn parse_record(data: &[u8], arena: &mut NameArena) -> Result<(Member, usize)> {
    let header = CentralDirectoryHeader::from_bytes(data)?;

    let record_len = CDFH_MIN_SIZE + header.variable_len();
    if data.len() < record_len {
        return Err(ZipError::format(format!(
            "record declares {record_len} bytes but only {} remain",
            data.len()
        )));
    }

    let compression_method = CompressionMethod::from_u16(header.compression_method)?;

    if header.flags & FLAG_ENCRYPTED != 0 {
        return Err(ZipError::unsupported("encrypted entry"));
    }
    if header.compressed_size == u32::MAX
        || header.uncompressed_size == u32::MAX
        || header.lfh_offset == u32::MAX
    {
        return Err(ZipError::unsupported("Zip64 entry"));
    }

    let name_end = CDFH_MIN_SIZE + header.file_name_length as usize;
    let name_bytes = &data[CDFH_MIN_SIZE..name_end];
    let name = arena.push(name_bytes)?;

    let member = Member {
        name,
        compression_method,
        compressed_size: header.compressed_size,
        uncompressed_size: header.uncompressed_size,
        crc32: header.crc32,
        flags: header.flags,
        last_mod_time: header.last_mod_time,
        last_mod_date: header.last_mod_date,
        local_header_offset: header.lfh_offset,
        // Directory entries end with '/'
        is_directory: name_bytes.last() == Some(&b'/'),
        data_offset: None,
    };

    Ok((member, record_len))
}
