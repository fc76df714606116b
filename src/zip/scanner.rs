//! Forward scanner over local file headers.
//!
//! This module walks a ZIP archive from its first byte, decoding each
//! Local File Header and skipping over the entry data that follows it,
//! until the first Central Directory File Header shows up.
//!
//! ## Scanning Strategy
//!
//! ```text
//! offset 0: [LFH 30 bytes][name][extra][data ...]
//!           [LFH 30 bytes][name][extra][data ...]
//!           ...
//!           [CDFH PK\x01\x02 ...]  <- scan stops here
//! ```
//!
//! The central directory is never parsed, so reaching entry *n* always means
//! reading past the data of entries *0..n*. Sizes declared in the local
//! headers are trusted for seeking.

use std::io::SeekFrom;
use std::iter::FusedIterator;

use crate::io::{ArchiveSource, read_fully};

use super::config::ScanConfig;
use super::error::{Result, ZipError};
use super::structures::{LFH_SIZE, LocalRecord, ZipEntry, sixteen_bit};

/// Where the scanner stands between two calls to
/// [`next_entry()`](ZipReader::next_entry).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanState {
    /// The cursor sits on the first byte of the next local header.
    Positioned,
    /// A central directory header was found; the cursor sits on it.
    ExhaustedViaDirectory,
    /// A local header with an empty name was found (lenient mode only). The
    /// cursor sits on that header. This is not a format-defined terminator
    /// and may hide a truncated or corrupted archive.
    ExhaustedViaEmptyName,
    /// The stream ended on a header boundary without any central directory
    /// (lenient mode only).
    ExhaustedAtEndOfStream,
}

impl ScanState {
    pub fn is_exhausted(&self) -> bool {
        *self != ScanState::Positioned
    }
}

/// Result of decoding one record.
enum Step {
    Entry(ZipEntry),
    CentralDirectory,
    EmptyName,
    EndOfStream,
}

/// Sequential ZIP reader.
///
/// Owns the seekable source; the source's position is the scan cursor.
/// Scanning and [`open()`](ZipReader::open) both need `&mut self`, so a
/// single reader is never driven from two places at once. Parallel consumers
/// should each build their own reader over an independent handle.
///
/// ## Example
///
/// ```no_run
/// use std::fs::File;
/// use std::io::Read;
/// use scanzip::{ScanConfig, ZipReader};
///
/// # fn main() -> scanzip::Result<()> {
/// let mut reader = ZipReader::with_config(File::open("archive.zip")?, ScanConfig::strict())?;
/// for entry in reader.headers()? {
///     let mut content = Vec::new();
///     reader.open(&entry)?.read_to_end(&mut content)?;
///     println!("{}: {} bytes", entry.name_lossy(), content.len());
/// }
/// # Ok(())
/// # }
/// ```
pub struct ZipReader<R> {
    pub(super) source: R,
    pub(super) config: ScanConfig,
    len: u64,
    state: ScanState,
}

impl<R: ArchiveSource> ZipReader<R> {
    /// Create a lenient reader positioned at the start of `source`.
    pub fn new(source: R) -> Result<Self> {
        Self::with_config(source, ScanConfig::default())
    }

    /// Create a reader with an explicit policy.
    ///
    /// # Errors
    ///
    /// Fails if the source cannot be seeked to its end and back to offset 0.
    pub fn with_config(mut source: R, config: ScanConfig) -> Result<Self> {
        let len = source.seek(SeekFrom::End(0))?;
        source.seek(SeekFrom::Start(0))?;
        log::trace!("Opened archive stream of {len} bytes");

        Ok(Self {
            source,
            config,
            len,
            state: ScanState::Positioned,
        })
    }

    pub fn config(&self) -> &ScanConfig {
        &self.config
    }

    pub fn state(&self) -> ScanState {
        self.state
    }

    /// Total length of the underlying stream in bytes.
    pub fn stream_len(&self) -> u64 {
        self.len
    }

    /// Give back the underlying source.
    pub fn into_inner(self) -> R {
        self.source
    }

    /// Move the cursor back to the start of the archive.
    pub fn rewind(&mut self) -> Result<()> {
        self.source.seek(SeekFrom::Start(0))?;
        self.state = ScanState::Positioned;
        Ok(())
    }

    /// Decode the entry at the cursor and move past its data.
    ///
    /// Returns `Ok(None)` once the end of the local headers is reached, and
    /// keeps returning it until [`rewind()`](Self::rewind) or
    /// [`headers()`](Self::headers) starts over.
    ///
    /// # Errors
    ///
    /// On failure the cursor is moved back to the start of the record that
    /// could not be decoded, so calling again reports the same error.
    pub fn next_entry(&mut self) -> Result<Option<ZipEntry>> {
        if self.state.is_exhausted() {
            return Ok(None);
        }

        let offset = self.source.stream_position()?;
        let step = match self.scan_record(offset) {
            Ok(step) => step,
            Err(err) => {
                if let Err(seek_err) = self.source.seek(SeekFrom::Start(offset)) {
                    log::debug!("Could not restore cursor to {offset}: {seek_err}");
                }
                return Err(err);
            }
        };

        match step {
            Step::Entry(entry) => {
                log::debug!("Scanned entry: {entry}");
                return Ok(Some(entry));
            }
            Step::CentralDirectory => {
                log::debug!("Central directory reached at offset {offset}");
                self.state = ScanState::ExhaustedViaDirectory;
            }
            Step::EmptyName => {
                log::warn!(
                    "Local header at offset {offset} has an empty name; treating it as the end of the archive"
                );
                self.state = ScanState::ExhaustedViaEmptyName;
            }
            Step::EndOfStream => {
                log::warn!("Archive ends at offset {offset} without a central directory");
                self.state = ScanState::ExhaustedAtEndOfStream;
                return Ok(None);
            }
        }

        // Leave the cursor on the terminating record.
        self.source.seek(SeekFrom::Start(offset))?;
        Ok(None)
    }

    /// Iterate over the remaining entries from the current cursor.
    pub fn entries(&mut self) -> Entries<'_, R> {
        Entries {
            reader: self,
            done: false,
        }
    }

    /// Rewind and scan the whole archive into a list, in stream order.
    ///
    /// The first failure is returned as is; no partial list is kept.
    pub fn headers(&mut self) -> Result<Vec<ZipEntry>> {
        self.rewind()?;
        let headers = self.entries().collect::<Result<Vec<_>>>()?;
        log::debug!("Read {} local header record(s)", headers.len());
        Ok(headers)
    }

    fn scan_record(&mut self, offset: u64) -> Result<Step> {
        let mut fixed = [0u8; LFH_SIZE];
        let n = read_fully(&mut self.source, &mut fixed)?;
        if n == 0 && !self.config.strict {
            return Ok(Step::EndOfStream);
        }
        if n < LFH_SIZE {
            return Err(ZipError::ShortRead {
                context: "local file header",
                expected: LFH_SIZE as u64,
                actual: n as u64,
            });
        }

        let mut entry = match ZipEntry::unpack(&fixed, offset, &self.config)? {
            LocalRecord::Entry(entry) => entry,
            LocalRecord::CentralDirectory => return Ok(Step::CentralDirectory),
        };

        let name_len = sixteen_bit(&fixed[26..28])?;
        let extra_len = sixteen_bit(&fixed[28..30])?;

        if name_len == 0 {
            if self.config.strict {
                return Err(ZipError::EmptyName { offset });
            }
            return Ok(Step::EmptyName);
        }

        let mut name = vec![0u8; usize::from(name_len)];
        let n = read_fully(&mut self.source, &mut name)?;
        if n < name.len() {
            return Err(ZipError::ShortRead {
                context: "file name",
                expected: u64::from(name_len),
                actual: n as u64,
            });
        }
        entry.name = name;

        let payload_offset = self.source.seek(SeekFrom::Current(i64::from(extra_len)))?;
        if payload_offset > self.len {
            return Err(ZipError::ShortRead {
                context: "extra field",
                expected: u64::from(extra_len),
                actual: u64::from(extra_len) - (payload_offset - self.len),
            });
        }
        entry.payload_offset = payload_offset;

        let next_header = payload_offset + entry.compressed_size;
        if next_header > self.len {
            return Err(ZipError::ShortRead {
                context: "entry data",
                expected: entry.compressed_size,
                actual: self.len - payload_offset,
            });
        }
        self.source.seek(SeekFrom::Start(next_header))?;
        log::trace!("Entry data at {payload_offset}..{next_header}");

        if entry.has_data_descriptor() {
            log::warn!(
                "Entry {} defers its sizes to a data descriptor; trusting the local header values",
                entry.name_lossy()
            );
        }

        Ok(Step::Entry(entry))
    }
}

/// Iterator returned by [`ZipReader::entries()`].
///
/// Stops after the end of the archive or after yielding the first error.
pub struct Entries<'a, R> {
    reader: &'a mut ZipReader<R>,
    done: bool,
}

impl<R: ArchiveSource> Iterator for Entries<'_, R> {
    type Item = Result<ZipEntry>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        match self.reader.next_entry() {
            Ok(Some(entry)) => Some(Ok(entry)),
            Ok(None) => {
                self.done = true;
                None
            }
            Err(err) => {
                self.done = true;
                Some(Err(err))
            }
        }
    }
}

impl<R: ArchiveSource> FusedIterator for Entries<'_, R> {}
