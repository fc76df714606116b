//! ZIP archive scanning and extraction.
//!
//! This module reads ZIP archives front to back by walking the Local File
//! Headers, without ever locating or parsing the Central Directory.
//!
//! ## Architecture
//!
//! - [`structures`]: signatures, little-endian field decoders and the
//!   [`ZipEntry`] record with its `unpack` routine
//! - [`dostime`]: MS-DOS date/time decoding with optional range checks
//! - [`scanner`]: the [`ZipReader`] state machine that steps from header to
//!   header
//! - [`opener`]: per-entry content retrieval, inflate and CRC-32 checks
//! - [`extractor`]: async, path-based extraction used by the CLI
//!
//! ## Supported Features
//!
//! - STORED (no compression) and DEFLATE entries
//! - Strict and lenient parsing policies ([`ScanConfig`])
//! - Paranoid mode: full in-memory verification of size and CRC-32
//!
//! ## Limitations
//!
//! - No Central Directory, End of Central Directory or ZIP64 handling
//! - Entries whose sizes live only in a data descriptor cannot be skipped
//! - No encryption or multi-disk support

pub mod config;
pub mod dostime;
mod error;
mod extractor;
mod opener;
mod scanner;
pub mod structures;

pub use config::{DEFAULT_MAX_DECOMPRESSED_SIZE, ScanConfig};
pub use dostime::{DosDateTime, decode_dos_datetime};
pub use error::{Result, ZipError};
pub use extractor::{ZipExtractor, sanitized_path};
pub use opener::{EntryContent, open_entry};
pub use scanner::{Entries, ScanState, ZipReader};
pub use structures::{CompressionMethod, LocalRecord, ZipEntry};
