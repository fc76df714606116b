//! In-memory ZIP archive builder for the integration tests.

#![allow(dead_code)]

use flate2::Compression;
use flate2::write::DeflateEncoder;
use std::io::Write;

/// 2010-06-15
pub const DOS_DATE: u16 = (30 << 9) | (6 << 5) | 15;
/// 12:30:00
pub const DOS_TIME: u16 = (12 << 11) | (30 << 5);

/// One local record, field by field, so tests can lie in any of them.
#[derive(Debug, Clone)]
pub struct EntrySpec {
    pub name: Vec<u8>,
    pub method: u16,
    pub flags: u16,
    pub crc32: u32,
    pub uncompressed_size: u32,
    pub payload: Vec<u8>,
    pub extra: Vec<u8>,
    pub date: u16,
    pub time: u16,
}

impl EntrySpec {
    pub fn stored(name: &str, data: &[u8]) -> Self {
        Self {
            name: name.as_bytes().to_vec(),
            method: 0,
            flags: 0,
            crc32: crc32fast::hash(data),
            uncompressed_size: data.len() as u32,
            payload: data.to_vec(),
            extra: Vec::new(),
            date: DOS_DATE,
            time: DOS_TIME,
        }
    }

    pub fn deflated(name: &str, data: &[u8]) -> Self {
        Self {
            method: 8,
            payload: deflate(data),
            ..Self::stored(name, data)
        }
    }
}

pub fn deflate(data: &[u8]) -> Vec<u8> {
    let mut encoder = DeflateEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(data).unwrap();
    encoder.finish().unwrap()
}

#[derive(Default)]
pub struct ArchiveBuilder {
    bytes: Vec<u8>,
    written: Vec<(EntrySpec, u32)>,
}

impl ArchiveBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn stored(self, name: &str, data: &[u8]) -> Self {
        self.entry(EntrySpec::stored(name, data))
    }

    pub fn deflated(self, name: &str, data: &[u8]) -> Self {
        self.entry(EntrySpec::deflated(name, data))
    }

    pub fn entry(mut self, spec: EntrySpec) -> Self {
        let offset = self.bytes.len() as u32;
        let b = &mut self.bytes;
        b.extend_from_slice(b"PK\x03\x04");
        b.extend_from_slice(&20u16.to_le_bytes());
        b.extend_from_slice(&spec.flags.to_le_bytes());
        b.extend_from_slice(&spec.method.to_le_bytes());
        b.extend_from_slice(&spec.time.to_le_bytes());
        b.extend_from_slice(&spec.date.to_le_bytes());
        b.extend_from_slice(&spec.crc32.to_le_bytes());
        b.extend_from_slice(&(spec.payload.len() as u32).to_le_bytes());
        b.extend_from_slice(&spec.uncompressed_size.to_le_bytes());
        b.extend_from_slice(&(spec.name.len() as u16).to_le_bytes());
        b.extend_from_slice(&(spec.extra.len() as u16).to_le_bytes());
        b.extend_from_slice(&spec.name);
        b.extend_from_slice(&spec.extra);
        b.extend_from_slice(&spec.payload);
        self.written.push((spec, offset));
        self
    }

    /// Offset the next record will be written at.
    pub fn position(&self) -> usize {
        self.bytes.len()
    }

    /// Local records only, no central directory.
    pub fn finish_without_directory(self) -> Vec<u8> {
        self.bytes
    }

    /// Local records followed by a central directory and its end record.
    pub fn finish(self) -> Vec<u8> {
        let mut bytes = self.bytes;
        let cd_offset = bytes.len() as u32;

        for (spec, offset) in &self.written {
            bytes.extend_from_slice(b"PK\x01\x02");
            bytes.extend_from_slice(&20u16.to_le_bytes()); // made by
            bytes.extend_from_slice(&20u16.to_le_bytes()); // needed
            bytes.extend_from_slice(&spec.flags.to_le_bytes());
            bytes.extend_from_slice(&spec.method.to_le_bytes());
            bytes.extend_from_slice(&spec.time.to_le_bytes());
            bytes.extend_from_slice(&spec.date.to_le_bytes());
            bytes.extend_from_slice(&spec.crc32.to_le_bytes());
            bytes.extend_from_slice(&(spec.payload.len() as u32).to_le_bytes());
            bytes.extend_from_slice(&spec.uncompressed_size.to_le_bytes());
            bytes.extend_from_slice(&(spec.name.len() as u16).to_le_bytes());
            bytes.extend_from_slice(&0u16.to_le_bytes()); // extra
            bytes.extend_from_slice(&0u16.to_le_bytes()); // comment
            bytes.extend_from_slice(&0u16.to_le_bytes()); // disk
            bytes.extend_from_slice(&0u16.to_le_bytes()); // internal attrs
            bytes.extend_from_slice(&0u32.to_le_bytes()); // external attrs
            bytes.extend_from_slice(&offset.to_le_bytes());
            bytes.extend_from_slice(&spec.name);
        }

        let cd_size = bytes.len() as u32 - cd_offset;
        let count = self.written.len() as u16;
        bytes.extend_from_slice(b"PK\x05\x06");
        bytes.extend_from_slice(&0u16.to_le_bytes());
        bytes.extend_from_slice(&0u16.to_le_bytes());
        bytes.extend_from_slice(&count.to_le_bytes());
        bytes.extend_from_slice(&count.to_le_bytes());
        bytes.extend_from_slice(&cd_size.to_le_bytes());
        bytes.extend_from_slice(&cd_offset.to_le_bytes());
        bytes.extend_from_slice(&0u16.to_le_bytes());
        bytes
    }
}

/// The archive used throughout: "A.txt" stored "hello", "B.bin" deflated
/// 1000 zero bytes.
pub fn two_entry_archive() -> Vec<u8> {
    ArchiveBuilder::new()
        .stored("A.txt", b"hello")
        .deflated("B.bin", &[0u8; 1000])
        .finish()
}
