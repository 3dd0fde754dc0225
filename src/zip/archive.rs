use std::borrow::Cow;

use super::error::{Result, ZipError};
use super::locator;
use super::parser::{self, NameArena};
use super::resolver;
use super::stream::MemberStream;
use super::structures::Member;
use crate::io::ReadAt;

/// Settings for [`Archive::open_with`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OpenOptions {
    /// Check each member's CRC-32 when its stream reaches the end.
    pub verify_checksums: bool,
    /// Reject local headers whose name length differs from the central
    /// directory's instead of logging a warning.
    pub strict_local_headers: bool,
}

impl Default for OpenOptions {
    fn default() -> Self {
        Self {
            verify_checksums: true,
            strict_local_headers: false,
        }
    }
}

impl OpenOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn verify_checksums(mut self, verify: bool) -> Self {
        self.verify_checksums = verify;
        self
    }

    pub fn strict_local_headers(mut self, strict: bool) -> Self {
        self.strict_local_headers = strict;
        self
    }
}

/// An opened ZIP archive: the byte source plus an immutable member index.
///
/// Pass `&source` to keep ownership of the source with the caller.
pub struct Archive<R> {
    source: R,
    members: Vec<Member>,
    names: NameArena,
    comment: Vec<u8>,
    options: OpenOptions,
}

impl<R: ReadAt> Archive<R> {
    /// Open an archive with default options.
    pub fn open(source: R) -> Result<Self> {
        Self::open_with(source, OpenOptions::default())
    }

    /// Locate the central directory, index every member and resolve each
    /// member's data offset.
    pub fn open_with(source: R, options: OpenOptions) -> Result<Self> {
        let summary = locator::locate(&source)?;
        let (mut members, names) = parser::parse_directory(&source, &summary)?;
        resolver::resolve_data_offsets(
            &source,
            &mut members,
            &names,
            options.strict_local_headers,
        )?;

        log::debug!(
            "opened archive: {} members, central directory {} bytes at {}",
            members.len(),
            summary.directory_size,
            summary.directory_offset
        );

        Ok(Self {
            source,
            members,
            names,
            comment: summary.comment,
            options,
        })
    }

    /// Members in central directory order.
    pub fn members(&self) -> &[Member] {
        &self.members
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// Raw name bytes of the member at `index`.
    pub fn name(&self, index: usize) -> Option<&[u8]> {
        self.members.get(index).map(|m| self.names.get(m.name))
    }

    /// Name of the member at `index`, with invalid UTF-8 replaced.
    pub fn name_lossy(&self, index: usize) -> Option<Cow<'_, str>> {
        self.name(index).map(String::from_utf8_lossy)
    }

    /// Index of the first member whose name is exactly `name`.
    pub fn find(&self, name: &[u8]) -> Option<usize> {
        self.members
            .iter()
            .position(|m| self.names.get(m.name) == name)
    }

    /// The archive comment, possibly empty.
    pub fn comment(&self) -> &[u8] {
        &self.comment
    }

    pub fn options(&self) -> OpenOptions {
        self.options
    }

    /// A closed stream for the member at `index`.
    pub fn stream(&self, index: usize) -> Result<MemberStream<'_, R>> {
        let member = self.members.get(index).ok_or_else(|| {
            ZipError::NotFound(format!(
                "index {index} of {} members",
                self.members.len()
            ))
        })?;
        Ok(MemberStream::new(
            &self.source,
            member,
            self.options.verify_checksums,
        ))
    }

    /// A stream for the member at `index`, already open.
    pub fn open_member(&self, index: usize) -> Result<MemberStream<'_, R>> {
        let mut stream = self.stream(index)?;
        stream.open()?;
        Ok(stream)
    }

    /// Release the index and hand the byte source back.
    pub fn into_inner(self) -> R {
        self.source
    }
}
