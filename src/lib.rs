//! # scanzip
//!
//! A sequential ZIP reader that walks the local file headers from the start
//! of the archive instead of reading the central directory.
//!
//! Each entry exposes its metadata (name, sizes, compression method,
//! modification time, CRC-32) and can be opened as a decompressing stream.
//! Because the central directory is never consulted, scanning works on
//! archives whose tail is missing or damaged, at the cost of reading through
//! every preceding entry's data.
//!
//! ## Features
//!
//! - Forward scanning of local file headers over any `Read + Seek` source
//! - STORED and DEFLATE entries
//! - Strict or lenient handling of malformed timestamps and odd terminators
//! - Paranoid mode verifying size and CRC-32 before content is released
//!
//! ## Example
//!
//! ```no_run
//! use std::io::Cursor;
//! use scanzip::ZipReader;
//!
//! fn main() -> scanzip::Result<()> {
//!     let bytes = std::fs::read("archive.zip")?;
//!     let mut reader = ZipReader::new(Cursor::new(bytes))?;
//!
//!     while let Some(entry) = reader.next_entry()? {
//!         println!("{} ({} bytes)", entry.name_lossy(), entry.uncompressed_size());
//!     }
//!
//!     Ok(())
//! }
//! ```

pub mod cli;
pub mod io;
pub mod zip;

pub use cli::Cli;
pub use io::{ArchiveSource, LocalArchive};
pub use zip::{
    CompressionMethod, EntryContent, Result, ScanConfig, ScanState, ZipEntry, ZipError,
    ZipExtractor, ZipReader,
};
