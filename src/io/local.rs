use std::fs::File;
use std::io::{self, BufReader, Read, Seek, SeekFrom};
use std::path::Path;

/// Buffered, seekable handle onto an archive on the local filesystem.
///
/// Each handle has its own cursor, so opening the same path several times
/// gives independent sources for parallel readers.
pub struct LocalArchive {
    inner: BufReader<File>,
    size: u64,
}

impl LocalArchive {
    pub fn open(path: &Path) -> io::Result<Self> {
        let file = File::open(path)?;
        let size = file.metadata()?.len();
        Ok(Self {
            inner: BufReader::new(file),
            size,
        })
    }

    /// Size of the file when it was opened.
    pub fn size(&self) -> u64 {
        self.size
    }
}

impl Read for LocalArchive {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.inner.read(buf)
    }
}

impl Seek for LocalArchive {
    fn seek(&mut self, pos: SeekFrom) -> io::Result<u64> {
        self.inner.seek(pos)
    }
}
