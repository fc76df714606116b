mod local;

pub use local::LocalArchive;

use std::io::{self, Read, Seek};

/// A byte source the scanner can walk: anything readable and seekable.
///
/// Blanket-implemented, so `File`, `BufReader<File>` and `Cursor<Vec<u8>>`
/// all qualify.
pub trait ArchiveSource: Read + Seek {}

impl<T: Read + Seek + ?Sized> ArchiveSource for T {}

/// Read until `buf` is full or the source is exhausted.
///
/// Returns the number of bytes read; a short count means end of stream.
pub(crate) fn read_fully<R: Read + ?Sized>(source: &mut R, buf: &mut [u8]) -> io::Result<usize> {
    let mut filled = 0;
    while filled < buf.len() {
        match source.read(&mut buf[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        }
    }
    Ok(filled)
}
