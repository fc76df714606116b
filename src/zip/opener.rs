//! Entry content retrieval.
//!
//! The compressed bytes of one entry are read into memory in a single pass,
//! so memory use is bounded by the largest entry rather than the archive.
//! In paranoid mode the content is also inflated up front and checked
//! against the size and CRC-32 recorded in the local header.

use flate2::read::DeflateDecoder;
use std::io::{self, Cursor, Read, SeekFrom};

use crate::io::ArchiveSource;

use super::config::ScanConfig;
use super::error::{Result, ZipError};
use super::scanner::ZipReader;
use super::structures::{CompressionMethod, ZipEntry};

/// Readable content of one entry.
///
/// Dropping it releases the buffers and the inflate state, whether or not
/// everything was read.
pub enum EntryContent {
    /// Bytes already in final form: a stored entry, or content that was
    /// verified in paranoid mode.
    Buffered(Cursor<Vec<u8>>),
    /// Deflated data inflated lazily as it is read. Forward-only; nothing is
    /// verified.
    Inflating(DeflateDecoder<Cursor<Vec<u8>>>),
}

impl EntryContent {
    /// Whether the content is fully in memory.
    pub fn is_buffered(&self) -> bool {
        matches!(self, EntryContent::Buffered(_))
    }
}

impl Read for EntryContent {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        match self {
            EntryContent::Buffered(cursor) => cursor.read(buf),
            EntryContent::Inflating(decoder) => decoder.read(buf),
        }
    }
}

/// Seek to `entry`'s data in `source` and hand back its content.
///
/// Leaves the cursor of `source` after the entry data; use
/// [`ZipReader::open`] to keep the scan position intact.
///
/// # Errors
///
/// * [`ZipError::ShortRead`] if the stream holds fewer than
///   `compressed_size` bytes at the payload offset.
/// * In paranoid mode, [`ZipError::SizeLimitExceeded`],
///   [`ZipError::ChecksumMismatch`] or [`ZipError::SizeMismatch`] when the
///   content cannot be vouched for.
pub fn open_entry<R: ArchiveSource>(
    source: &mut R,
    entry: &ZipEntry,
    config: &ScanConfig,
) -> Result<EntryContent> {
    let limit = config.max_decompressed_size;
    if config.paranoid && entry.uncompressed_size() > limit {
        return Err(ZipError::SizeLimitExceeded {
            size: entry.uncompressed_size(),
            limit,
        });
    }

    source.seek(SeekFrom::Start(entry.payload_offset()))?;
    let mut raw = Vec::new();
    source
        .by_ref()
        .take(entry.compressed_size())
        .read_to_end(&mut raw)?;
    if (raw.len() as u64) < entry.compressed_size() {
        return Err(ZipError::ShortRead {
            context: "entry data",
            expected: entry.compressed_size(),
            actual: raw.len() as u64,
        });
    }
    log::trace!(
        "Read {} bytes of {} data for {}",
        raw.len(),
        entry.compression_method(),
        entry.name_lossy()
    );

    if !config.paranoid {
        return Ok(match entry.compression_method() {
            CompressionMethod::Stored => EntryContent::Buffered(Cursor::new(raw)),
            CompressionMethod::Deflate => {
                EntryContent::Inflating(DeflateDecoder::new(Cursor::new(raw)))
            }
        });
    }

    let content = match entry.compression_method() {
        CompressionMethod::Stored => raw,
        CompressionMethod::Deflate => inflate_bounded(&raw, entry.uncompressed_size(), limit)?,
    };
    if content.len() as u64 > limit {
        return Err(ZipError::SizeLimitExceeded {
            size: content.len() as u64,
            limit,
        });
    }

    verify(entry, &content)?;
    log::debug!(
        "Verified {} ({} bytes, crc32 {:08x})",
        entry.name_lossy(),
        content.len(),
        entry.crc32()
    );

    Ok(EntryContent::Buffered(Cursor::new(content)))
}

/// Upper bound on the output buffer reserved before inflating.
const INITIAL_INFLATE_CAPACITY: u64 = 1 << 20;

/// Inflate `raw`, reading at most one byte past `limit` so an oversized
/// stream is detected without materializing it.
///
/// The declared size is only a hint: the initial reservation is also capped
/// by the input length, so a header claiming a huge size for a tiny payload
/// does not reserve memory up front.
fn inflate_bounded(raw: &[u8], declared: u64, limit: u64) -> Result<Vec<u8>> {
    let hint = declared
        .min(limit)
        .min((raw.len() as u64).saturating_mul(4))
        .min(INITIAL_INFLATE_CAPACITY);
    let mut out = Vec::with_capacity(usize::try_from(hint).unwrap_or(0));
    DeflateDecoder::new(raw)
        .take(limit.saturating_add(1))
        .read_to_end(&mut out)?;
    Ok(out)
}

fn verify(entry: &ZipEntry, content: &[u8]) -> Result<()> {
    let actual = crc32fast::hash(content);
    if actual != entry.crc32() {
        return Err(ZipError::ChecksumMismatch {
            expected: entry.crc32(),
            actual,
        });
    }
    if content.len() as u64 != entry.uncompressed_size() {
        return Err(ZipError::SizeMismatch {
            expected: entry.uncompressed_size(),
            actual: content.len() as u64,
        });
    }
    Ok(())
}

impl<R: ArchiveSource> ZipReader<R> {
    /// Open the content of an entry previously returned by this reader.
    ///
    /// The scan cursor is restored afterwards, so entries can be opened
    /// between calls to [`next_entry()`](Self::next_entry) and in any order.
    pub fn open(&mut self, entry: &ZipEntry) -> Result<EntryContent> {
        let cursor = self.source.stream_position()?;
        let opened = open_entry(&mut self.source, entry, &self.config);
        self.source.seek(SeekFrom::Start(cursor))?;
        opened
    }
}
