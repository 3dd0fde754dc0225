//! Local header resolution.
//!
//! The central directory only records where each local header starts. The
//! member's data follows that header's own name and extra field, whose
//! lengths may differ from the directory's copy, so every header is read
//! to find the true data offset.

use super::error::{Result, ZipError};
use super::parser::NameArena;
use super::source::read_exact_at;
use super::structures::{LFH_SIZE, LocalFileHeader, Member};
use crate::io::ReadAt;

/// Compute `data_offset` for every member.
///
/// With `strict_names`, a local header whose name length differs from the
/// central directory's is a format error; otherwise it is logged and the
/// local length is used.
pub fn resolve_data_offsets<R: ReadAt + ?Sized>(
    source: &R,
    members: &mut [Member],
    arena: &NameArena,
    strict_names: bool,
) -> Result<()> {
    let size = source.size();

    for (index, member) in members.iter_mut().enumerate() {
        let lfh_offset = member.local_header_offset as u64;

        let mut lfh_buf = [0u8; LFH_SIZE];
        read_exact_at(source, lfh_offset, &mut lfh_buf, "local file header")?;
        let header = LocalFileHeader::from_bytes(&lfh_buf).map_err(|e| match e {
            ZipError::Format(msg) => {
                ZipError::format(format!("entry {index} at offset {lfh_offset}: {msg}"))
            }
            other => other,
        })?;

        let directory_len = member.name.len();
        if header.file_name_length as usize != directory_len {
            let name = String::from_utf8_lossy(arena.get(member.name));
            if strict_names {
                return Err(ZipError::format(format!(
                    "local header of {name:?} has a {} byte name, central directory has {directory_len}",
                    header.file_name_length
                )));
            }
            log::warn!(
                "local header of {name:?} has a {} byte name, central directory has {directory_len}",
                header.file_name_length
            );
        }

        // Data starts after: LFH (30 bytes) + filename + extra field
        let data_offset = lfh_offset + header.total_len();
        let data_end = data_offset + member.compressed_size as u64;
        if data_end > size {
            return Err(ZipError::format(format!(
                "entry {index} data ({} bytes at {data_offset}) runs past the end of the file",
                member.compressed_size
            )));
        }

        member.data_offset = Some(data_offset);
    }

    Ok(())
}
