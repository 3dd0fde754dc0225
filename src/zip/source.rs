//! Positional reading helpers shared by the decoding passes.

use std::io::{self, Read};

use super::error::{Result, ZipError};
use crate::io::ReadAt;

/// Fill `buf` from `offset`, treating a short source as a format error.
///
/// `what` names the structure being read so a truncation can be reported.
pub(crate) fn read_exact_at<R: ReadAt + ?Sized>(
    source: &R,
    offset: u64,
    buf: &mut [u8],
    what: &str,
) -> Result<()> {
    let mut filled = 0;
    while filled < buf.len() {
        match source.read_at(offset + filled as u64, &mut buf[filled..]) {
            Ok(0) => {
                return Err(ZipError::format(format!(
                    "{what} at offset {offset} is truncated ({filled} of {} bytes)",
                    buf.len()
                )));
            }
            Ok(n) => filled += n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => {}
            Err(e) => return Err(e.into()),
        }
    }
    Ok(())
}

/// A bounded `Read` over `[position, end)` of a positional source.
///
/// Each cursor carries its own position, so any number of them can be
/// live over one source at the same time.
pub(crate) struct SourceCursor<'a, R: ?Sized> {
    source: &'a R,
    position: u64,
    end: u64,
}

impl<'a, R: ReadAt + ?Sized> SourceCursor<'a, R> {
    pub(crate) fn new(source: &'a R, start: u64, len: u64) -> Self {
        Self {
            source,
            position: start,
            end: start.saturating_add(len),
        }
    }

    pub(crate) fn remaining(&self) -> u64 {
        self.end - self.position
    }
}

impl<R: ReadAt + ?Sized> Read for SourceCursor<'_, R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let want = (buf.len() as u64).min(self.remaining()) as usize;
        if want == 0 {
            return Ok(0);
        }
        let n = self.source.read_at(self.position, &mut buf[..want])?;
        self.position += n as u64;
        Ok(n)
    }
}
