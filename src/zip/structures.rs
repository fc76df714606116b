use byteorder::{ByteOrder, LittleEndian};
use std::fmt;
use time::OffsetDateTime;

use super::config::ScanConfig;
use super::dostime::decode_dos_datetime;
use super::error::{Result, ZipError};

/// Local File Header (LFH) - 30 fixed bytes
pub const LFH_SIGNATURE: &[u8; 4] = b"PK\x03\x04";
pub const LFH_SIZE: usize = 30;

/// Central Directory File Header (CDFH); seeing it ends the local scan.
pub const CDFH_SIGNATURE: &[u8; 4] = b"PK\x01\x02";

/// General purpose flag bit 3: sizes and CRC live in a trailing data descriptor.
pub const FLAG_DATA_DESCRIPTOR: u16 = 0x0008;

/// Decode a little-endian `u16` from exactly two bytes.
pub fn sixteen_bit(bytes: &[u8]) -> Result<u16> {
    if bytes.len() != 2 {
        return Err(ZipError::MalformedFixedField {
            expected: 2,
            actual: bytes.len(),
        });
    }
    Ok(LittleEndian::read_u16(bytes))
}

/// Decode a little-endian `u32` from exactly four bytes.
pub fn thirty_two_bit(bytes: &[u8]) -> Result<u32> {
    if bytes.len() != 4 {
        return Err(ZipError::MalformedFixedField {
            expected: 4,
            actual: bytes.len(),
        });
    }
    Ok(LittleEndian::read_u32(bytes))
}

/// ZIP compression methods this reader can extract
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompressionMethod {
    Stored,
    Deflate,
}

impl CompressionMethod {
    pub fn from_u16(value: u16) -> Result<Self> {
        match value {
            0 => Ok(CompressionMethod::Stored),
            8 => Ok(CompressionMethod::Deflate),
            _ => Err(ZipError::UnsupportedCompressionMethod(value)),
        }
    }
}

impl fmt::Display for CompressionMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CompressionMethod::Stored => f.write_str("stored"),
            CompressionMethod::Deflate => f.write_str("deflated"),
        }
    }
}

/// What a 30-byte record prefix turned out to be.
#[derive(Debug)]
pub enum LocalRecord {
    /// A local file header; name and payload offset are still unset.
    Entry(ZipEntry),
    /// The central directory starts here, so there are no more entries.
    CentralDirectory,
}

/// One entry found by walking the local file headers.
///
/// Entries are produced by [`ZipReader`](super::ZipReader) and are read-only
/// afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ZipEntry {
    pub(super) name: Vec<u8>,
    pub(super) version_needed: u16,
    pub(super) flags: u16,
    pub(super) compression_method: CompressionMethod,
    pub(super) last_mod_time: u16,
    pub(super) last_mod_date: u16,
    pub(super) modified: OffsetDateTime,
    pub(super) crc32: u32,
    pub(super) compressed_size: u64,
    pub(super) uncompressed_size: u64,
    pub(super) local_header_offset: u64,
    pub(super) payload_offset: u64,
}

impl ZipEntry {
    /// Validate and decode the fixed prefix of a local file header found at
    /// `offset`.
    ///
    /// The name and extra field lengths (bytes 26..30) are left to the caller,
    /// which has to consume the variable-length fields from the stream anyway.
    pub fn unpack(fixed: &[u8], offset: u64, config: &ScanConfig) -> Result<LocalRecord> {
        if fixed.len() != LFH_SIZE {
            return Err(ZipError::MalformedFixedField {
                expected: LFH_SIZE,
                actual: fixed.len(),
            });
        }

        let signature = &fixed[0..4];
        if signature != LFH_SIGNATURE {
            if signature == CDFH_SIGNATURE {
                return Ok(LocalRecord::CentralDirectory);
            }
            let mut found = [0u8; 4];
            found.copy_from_slice(signature);
            return Err(ZipError::InvalidSignature { offset, found });
        }

        let compression_method = CompressionMethod::from_u16(sixteen_bit(&fixed[8..10])?)?;
        let crc32 = thirty_two_bit(&fixed[14..18])?;
        let compressed_size = u64::from(thirty_two_bit(&fixed[18..22])?);
        let uncompressed_size = u64::from(thirty_two_bit(&fixed[22..26])?);

        let last_mod_time = sixteen_bit(&fixed[10..12])?;
        let last_mod_date = sixteen_bit(&fixed[12..14])?;
        let modified = decode_dos_datetime(last_mod_date, last_mod_time, config)?;

        Ok(LocalRecord::Entry(ZipEntry {
            name: Vec::new(),
            version_needed: sixteen_bit(&fixed[4..6])?,
            flags: sixteen_bit(&fixed[6..8])?,
            compression_method,
            last_mod_time,
            last_mod_date,
            modified,
            crc32,
            compressed_size,
            uncompressed_size,
            local_header_offset: offset,
            payload_offset: 0,
        }))
    }

    /// Raw name bytes as stored in the archive.
    pub fn name(&self) -> &[u8] {
        &self.name
    }

    /// Name decoded as UTF-8, with invalid sequences replaced.
    pub fn name_lossy(&self) -> String {
        String::from_utf8_lossy(&self.name).into_owned()
    }

    /// Directory entries end with '/'
    pub fn is_dir(&self) -> bool {
        self.name.last() == Some(&b'/')
    }

    pub fn version_needed(&self) -> u16 {
        self.version_needed
    }

    pub fn flags(&self) -> u16 {
        self.flags
    }

    pub fn has_data_descriptor(&self) -> bool {
        self.flags & FLAG_DATA_DESCRIPTOR != 0
    }

    pub fn compression_method(&self) -> CompressionMethod {
        self.compression_method
    }

    pub fn modified(&self) -> OffsetDateTime {
        self.modified
    }

    /// Packed MS-DOS (time, date) words exactly as stored.
    pub fn dos_datetime(&self) -> (u16, u16) {
        (self.last_mod_time, self.last_mod_date)
    }

    /// CRC-32 recorded in the local header.
    pub fn crc32(&self) -> u32 {
        self.crc32
    }

    pub fn compressed_size(&self) -> u64 {
        self.compressed_size
    }

    pub fn uncompressed_size(&self) -> u64 {
        self.uncompressed_size
    }

    /// Offset of the `PK\x03\x04` signature of this entry.
    pub fn local_header_offset(&self) -> u64 {
        self.local_header_offset
    }

    /// Offset of the first byte of (possibly compressed) entry data.
    pub fn payload_offset(&self) -> u64 {
        self.payload_offset
    }
}

impl fmt::Display for ZipEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} size={} compressed={} method={} modified={:04}-{:02}-{:02} {:02}:{:02}:{:02} crc32={:08x} offset={}",
            self.name_lossy(),
            self.uncompressed_size,
            self.compressed_size,
            self.compression_method,
            self.modified.year(),
            u8::from(self.modified.month()),
            self.modified.day(),
            self.modified.hour(),
            self.modified.minute(),
            self.modified.second(),
            self.crc32,
            self.payload_offset,
        )
    }
}
