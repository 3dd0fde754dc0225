//! Byte-level builder for synthetic ZIP archives.

#![allow(dead_code)]

use byteorder::{LittleEndian, WriteBytesExt};
use flate2::write::DeflateEncoder;
use flate2::{Compression, Crc};
use std::io::Write;

pub const METHOD_STORED: u16 = 0;
pub const METHOD_DEFLATED: u16 = 8;

/// Field offsets inside the end of central directory record.
pub const EOCD_DISK_NUMBER: usize = 4;
pub const EOCD_DISK_WITH_CD: usize = 6;
pub const EOCD_DISK_ENTRIES: usize = 8;
pub const EOCD_TOTAL_ENTRIES: usize = 10;
pub const EOCD_CD_SIZE: usize = 12;
pub const EOCD_CD_OFFSET: usize = 16;

/// Field offsets inside a central directory record.
pub const CDFH_FLAGS: usize = 8;
pub const CDFH_METHOD: usize = 10;
pub const CDFH_COMPRESSED_SIZE: usize = 20;
pub const CDFH_LFH_OFFSET: usize = 42;

pub fn crc32(data: &[u8]) -> u32 {
    let mut crc = Crc::new();
    crc.update(data);
    crc.sum()
}

pub fn deflate(data: &[u8]) -> Vec<u8> {
    let mut encoder = DeflateEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(data).unwrap();
    encoder.finish().unwrap()
}

/// One member as it will be written.
#[derive(Clone)]
pub struct EntrySpec {
    pub name: Vec<u8>,
    /// Name written into the local header, when it should differ.
    pub local_name: Option<Vec<u8>>,
    pub method: u16,
    pub plain: Vec<u8>,
    pub payload: Vec<u8>,
    pub local_extra: Vec<u8>,
    pub central_extra: Vec<u8>,
    pub central_comment: Vec<u8>,
}

impl EntrySpec {
    pub fn stored(name: &[u8], data: &[u8]) -> Self {
        Self {
            name: name.to_vec(),
            local_name: None,
            method: METHOD_STORED,
            plain: data.to_vec(),
            payload: data.to_vec(),
            local_extra: Vec::new(),
            central_extra: Vec::new(),
            central_comment: Vec::new(),
        }
    }

    pub fn deflated(name: &[u8], data: &[u8]) -> Self {
        Self {
            method: METHOD_DEFLATED,
            payload: deflate(data),
            ..Self::stored(name, data)
        }
    }
}

/// A built archive plus the offsets tests need to corrupt or check it.
pub struct Fixture {
    pub bytes: Vec<u8>,
    pub local_offsets: Vec<usize>,
    pub data_offsets: Vec<usize>,
    pub central_offsets: Vec<usize>,
    pub cd_offset: usize,
    pub eocd_offset: usize,
}

impl Fixture {
    pub fn patch_u16(&mut self, at: usize, value: u16) {
        self.bytes[at..at + 2].copy_from_slice(&value.to_le_bytes());
    }

    pub fn patch_u32(&mut self, at: usize, value: u32) {
        self.bytes[at..at + 4].copy_from_slice(&value.to_le_bytes());
    }
}

#[derive(Default)]
pub struct ZipBuilder {
    prefix: Vec<u8>,
    entries: Vec<EntrySpec>,
    comment: Vec<u8>,
}

impl ZipBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bytes placed before the first local header (e.g. an executable stub).
    pub fn prefix(mut self, bytes: &[u8]) -> Self {
        self.prefix = bytes.to_vec();
        self
    }

    pub fn entry(mut self, entry: EntrySpec) -> Self {
        self.entries.push(entry);
        self
    }

    pub fn stored(self, name: &[u8], data: &[u8]) -> Self {
        self.entry(EntrySpec::stored(name, data))
    }

    pub fn deflated(self, name: &[u8], data: &[u8]) -> Self {
        self.entry(EntrySpec::deflated(name, data))
    }

    pub fn comment(mut self, comment: &[u8]) -> Self {
        self.comment = comment.to_vec();
        self
    }

    pub fn build(self) -> Fixture {
        let mut out = self.prefix.clone();
        let mut local_offsets = Vec::new();
        let mut data_offsets = Vec::new();

        for entry in &self.entries {
            let local_name = entry.local_name.as_ref().unwrap_or(&entry.name);
            local_offsets.push(out.len());
            out.write_all(b"PK\x03\x04").unwrap();
            out.write_u16::<LittleEndian>(20).unwrap();
            out.write_u16::<LittleEndian>(0).unwrap();
            out.write_u16::<LittleEndian>(entry.method).unwrap();
            out.write_u16::<LittleEndian>(0x6000).unwrap();
            out.write_u16::<LittleEndian>(0x5621).unwrap();
            out.write_u32::<LittleEndian>(crc32(&entry.plain)).unwrap();
            out.write_u32::<LittleEndian>(entry.payload.len() as u32).unwrap();
            out.write_u32::<LittleEndian>(entry.plain.len() as u32).unwrap();
            out.write_u16::<LittleEndian>(local_name.len() as u16).unwrap();
            out.write_u16::<LittleEndian>(entry.local_extra.len() as u16).unwrap();
            out.write_all(local_name).unwrap();
            out.write_all(&entry.local_extra).unwrap();
            data_offsets.push(out.len());
            out.write_all(&entry.payload).unwrap();
        }

        let cd_offset = out.len();
        let mut central_offsets = Vec::new();
        for (entry, &lfh_offset) in self.entries.iter().zip(&local_offsets) {
            central_offsets.push(out.len());
            out.write_all(b"PK\x01\x02").unwrap();
            out.write_u16::<LittleEndian>(0x031E).unwrap();
            out.write_u16::<LittleEndian>(20).unwrap();
            out.write_u16::<LittleEndian>(0).unwrap();
            out.write_u16::<LittleEndian>(entry.method).unwrap();
            out.write_u16::<LittleEndian>(0x6000).unwrap();
            out.write_u16::<LittleEndian>(0x5621).unwrap();
            out.write_u32::<LittleEndian>(crc32(&entry.plain)).unwrap();
            out.write_u32::<LittleEndian>(entry.payload.len() as u32).unwrap();
            out.write_u32::<LittleEndian>(entry.plain.len() as u32).unwrap();
            out.write_u16::<LittleEndian>(entry.name.len() as u16).unwrap();
            out.write_u16::<LittleEndian>(entry.central_extra.len() as u16).unwrap();
            out.write_u16::<LittleEndian>(entry.central_comment.len() as u16).unwrap();
            out.write_u16::<LittleEndian>(0).unwrap();
            out.write_u16::<LittleEndian>(0).unwrap();
            out.write_u32::<LittleEndian>(0o100644 << 16).unwrap();
            out.write_u32::<LittleEndian>(lfh_offset as u32).unwrap();
            out.write_all(&entry.name).unwrap();
            out.write_all(&entry.central_extra).unwrap();
            out.write_all(&entry.central_comment).unwrap();
        }
        let cd_size = out.len() - cd_offset;

        let eocd_offset = out.len();
        out.write_all(b"PK\x05\x06").unwrap();
        out.write_u16::<LittleEndian>(0).unwrap();
        out.write_u16::<LittleEndian>(0).unwrap();
        out.write_u16::<LittleEndian>(self.entries.len() as u16).unwrap();
        out.write_u16::<LittleEndian>(self.entries.len() as u16).unwrap();
        out.write_u32::<LittleEndian>(cd_size as u32).unwrap();
        out.write_u32::<LittleEndian>(cd_offset as u32).unwrap();
        out.write_u16::<LittleEndian>(self.comment.len() as u16).unwrap();
        out.write_all(&self.comment).unwrap();

        Fixture {
            bytes: out,
            local_offsets,
            data_offsets,
            central_offsets,
            cd_offset,
            eocd_offset,
        }
    }
}
