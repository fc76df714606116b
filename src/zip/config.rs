/// Default bound for fully materialized entries: the largest byte count a
/// signed 32-bit length can express.
pub const DEFAULT_MAX_DECOMPRESSED_SIZE: u64 = i32::MAX as u64;

/// Parsing and extraction policy for one [`ZipReader`](super::ZipReader).
///
/// Lenient by default: date anomalies and a missing central directory are
/// logged and scanning carries on. Structural errors are reported in either
/// mode.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanConfig {
    /// Fail on out-of-range or future timestamps, empty names and a stream
    /// that ends without a central directory.
    pub strict: bool,
    /// Inflate entries fully in memory and verify size and CRC-32 before
    /// handing content out.
    pub paranoid: bool,
    /// Upper bound for content materialized in paranoid mode.
    pub max_decompressed_size: u64,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            strict: false,
            paranoid: false,
            max_decompressed_size: DEFAULT_MAX_DECOMPRESSED_SIZE,
        }
    }
}

impl ScanConfig {
    /// Fail fast on every anomaly and verify every entry's checksum.
    pub fn strict() -> Self {
        Self {
            strict: true,
            paranoid: true,
            ..Self::default()
        }
    }

    pub fn with_strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    pub fn with_paranoid(mut self, paranoid: bool) -> Self {
        self.paranoid = paranoid;
        self
    }

    pub fn with_max_decompressed_size(mut self, limit: u64) -> Self {
        self.max_decompressed_size = limit;
        self
    }
}
