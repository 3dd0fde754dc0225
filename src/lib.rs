//! # zipdex
//!
//! A read-only ZIP decoder. An archive is opened once: its central
//! directory is located and indexed, every member's data offset is resolved
//! from its local header, and members are then read through independent
//! streams that inflate DEFLATE data on the fly.
//!
//! Any random-access source works: local files, in-memory buffers, and
//! remote files over HTTP Range requests.
//!
//! ## Features
//!
//! - Backward scan for the End of Central Directory, tolerant of comments
//!   that contain signature-like bytes
//! - Member names kept as raw bytes (no UTF-8 assumption)
//! - STORED and DEFLATE members, with CRC-32 verification
//! - Distinct errors for corrupt archives and unsupported features
//!   (ZIP64, multi-disk, encryption)
//!
//! ## Example
//!
//! ```no_run
//! use std::io::Read;
//! use std::path::Path;
//! use zipdex::{Archive, LocalFileReader};
//!
//! fn main() -> anyhow::Result<()> {
//!     let reader = LocalFileReader::new(Path::new("archive.zip"))?;
//!     let archive = Archive::open(reader)?;
//!
//!     for index in 0..archive.len() {
//!         let mut contents = Vec::new();
//!         archive.open_member(index)?.read_to_end(&mut contents)?;
//!         println!("{}: {} bytes", archive.name_lossy(index).unwrap_or_default(), contents.len());
//!     }
//!
//!     Ok(())
//! }
//! ```

pub mod cli;
pub mod io;
pub mod zip;

pub use cli::Cli;
pub use io::{HttpRangeReader, LocalFileReader, ReadAt};
pub use zip::{
    Archive, CompressionMethod, Member, MemberStream, OpenOptions, ZipError, ZipExtractor,
};
