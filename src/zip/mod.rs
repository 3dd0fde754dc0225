//! ZIP archive decoding.
//!
//! This module reads ZIP archives from any random-access byte source
//! ([`ReadAt`](crate::io::ReadAt)). Archives are never written.
//!
//! ## Architecture
//!
//! Opening an archive runs three passes over the source, then hands out
//! independent per-member streams:
//!
//! - [`locator`]: finds and validates the End of Central Directory record
//! - [`parser`]: decodes every central directory record into a [`Member`]
//!   and copies the names into a shared [`NameArena`]
//! - [`resolver`]: reads each member's local header to find where its data
//!   actually begins
//! - [`stream`]: [`MemberStream`], a lazily opened reader that passes
//!   stored data through or inflates deflated data
//!
//! [`Archive`] ties these together and [`ZipExtractor`] writes members out.
//!
//! ## Supported Features
//!
//! - Standard ZIP format (PKZIP APPNOTE 6.3.x compatible), single disk
//! - STORED (no compression) method
//! - DEFLATE compression method
//! - Archive comments up to the format maximum of 65535 bytes
//!
//! ## Limitations
//!
//! - No ZIP64 extensions (rejected as unsupported)
//! - No encryption support
//! - No multi-disk archive support
//! - No BZIP2, LZMA, or other compression methods

mod archive;
mod error;
mod extractor;
pub mod locator;
pub mod parser;
pub mod resolver;
mod source;
pub mod stream;
mod structures;

pub use archive::{Archive, OpenOptions};
pub use error::{Result, ZipError};
pub use extractor::ZipExtractor;
pub use locator::DirectorySummary;
pub use parser::{NameArena, NameSpan};
pub use stream::MemberStream;
pub use structures::*;
