//! Per-member read streams.
//!
//! A stream is `Closed` until [`MemberStream::open`] and returns to `Closed`
//! on [`MemberStream::close`]. While open it reads only the member's own
//! `compressed_size` bytes starting at its resolved data offset, either
//! passing them through (stored) or inflating them (deflated).
//!
//! Streams track their own position and use positional reads, so several
//! streams over one archive can be open and read in any interleaving.

use flate2::Crc;
use flate2::read::DeflateDecoder;
use std::io::{self, Read};

use super::error::{Result, ZipError};
use super::source::SourceCursor;
use super::structures::{CompressionMethod, Member};
use crate::io::ReadAt;

enum Body<'a, R: ?Sized> {
    Stored(SourceCursor<'a, R>),
    Deflated(Box<DeflateDecoder<SourceCursor<'a, R>>>),
}

struct OpenState<'a, R: ?Sized> {
    body: Body<'a, R>,
    produced: u64,
    crc: Crc,
    finished: bool,
}

enum State<'a, R: ?Sized> {
    Closed,
    Open(OpenState<'a, R>),
}

/// Sequential reader over one member's uncompressed bytes.
pub struct MemberStream<'a, R: ?Sized> {
    source: &'a R,
    member: &'a Member,
    verify_checksums: bool,
    state: State<'a, R>,
}

impl<'a, R: ReadAt + ?Sized> MemberStream<'a, R> {
    pub(crate) fn new(source: &'a R, member: &'a Member, verify_checksums: bool) -> Self {
        Self {
            source,
            member,
            verify_checksums,
            state: State::Closed,
        }
    }

    pub fn member(&self) -> &'a Member {
        self.member
    }

    pub fn is_open(&self) -> bool {
        matches!(self.state, State::Open(_))
    }

    /// Position the stream at the member's first byte.
    ///
    /// Opening an already open stream restarts it.
    pub fn open(&mut self) -> Result<()> {
        let data_offset = self
            .member
            .data_offset
            .ok_or_else(|| ZipError::format("member data offset has not been resolved"))?;

        let cursor = SourceCursor::new(self.source, data_offset, self.member.compressed_size as u64);
        let body = match self.member.compression_method {
            CompressionMethod::Stored => Body::Stored(cursor),
            CompressionMethod::Deflate => Body::Deflated(Box::new(DeflateDecoder::new(cursor))),
        };

        self.state = State::Open(OpenState {
            body,
            produced: 0,
            crc: Crc::new(),
            finished: false,
        });
        Ok(())
    }

    /// Read the next chunk of uncompressed bytes; `Ok(0)` at the end of the
    /// member.
    ///
    /// When the end is reached the byte count and (unless disabled) the
    /// CRC-32 are checked against the central directory. Any error closes
    /// the stream.
    pub fn read(&mut self, buf: &mut [u8]) -> Result<usize> {
        let result = self.read_open(buf);
        if result.is_err() {
            self.close();
        }
        result
    }

    fn read_open(&mut self, buf: &mut [u8]) -> Result<usize> {
        let State::Open(open) = &mut self.state else {
            return Err(ZipError::NotOpen);
        };
        if buf.is_empty() || open.finished {
            return Ok(0);
        }

        let n = match &mut open.body {
            Body::Stored(cursor) => cursor.read(buf)?,
            Body::Deflated(decoder) => decoder.read(buf).map_err(inflate_error)?,
        };

        let member = self.member;
        open.produced += n as u64;
        if open.produced > member.uncompressed_size as u64 {
            return Err(self.mismatch(format!(
                "member produced more than its declared {} bytes",
                member.uncompressed_size
            )));
        }
        if self.verify_checksums {
            open.crc.update(&buf[..n]);
        }

        if n == 0 {
            open.finished = true;
            if open.produced != member.uncompressed_size as u64 {
                let produced = open.produced;
                return Err(self.mismatch(format!(
                    "member ended after {produced} of {} bytes",
                    member.uncompressed_size
                )));
            }
            if self.verify_checksums && open.crc.sum() != member.crc32 {
                let actual = open.crc.sum();
                return Err(self.mismatch(format!(
                    "CRC-32 {actual:#010x} does not match the directory's {:#010x}",
                    member.crc32
                )));
            }
        }

        Ok(n)
    }

    fn mismatch(&self, message: String) -> ZipError {
        match self.member.compression_method {
            CompressionMethod::Stored => ZipError::Format(message),
            CompressionMethod::Deflate => ZipError::Decompression(message),
        }
    }

    /// Release the decompressor, if any. Closing a closed stream is a no-op.
    pub fn close(&mut self) {
        self.state = State::Closed;
    }
}

fn inflate_error(err: io::Error) -> ZipError {
    match err.kind() {
        io::ErrorKind::InvalidInput | io::ErrorKind::InvalidData | io::ErrorKind::UnexpectedEof => {
            ZipError::decompression(err.to_string())
        }
        _ => ZipError::Io(err),
    }
}

impl<R: ReadAt + ?Sized> Read for MemberStream<'_, R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        MemberStream::read(self, buf).map_err(io::Error::from)
    }
}
