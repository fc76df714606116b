//! Memory reserved while verifying a deflated entry must follow the bytes
//! actually inflated, not the size a local header claims.

mod common;

use std::alloc::{GlobalAlloc, Layout, System};
use std::io::Cursor;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use common::{ArchiveBuilder, EntrySpec};
use scanzip::zip::DEFAULT_MAX_DECOMPRESSED_SIZE;
use scanzip::{ScanConfig, ZipError, ZipReader};

struct TrackingAllocator;

static TRACKING: AtomicBool = AtomicBool::new(false);
static LARGEST: AtomicUsize = AtomicUsize::new(0);

unsafe impl GlobalAlloc for TrackingAllocator {
    unsafe fn alloc(&self, layout: Layout) -> *mut u8 {
        if TRACKING.load(Ordering::Relaxed) {
            LARGEST.fetch_max(layout.size(), Ordering::Relaxed);
        }
        unsafe { System.alloc(layout) }
    }

    unsafe fn dealloc(&self, ptr: *mut u8, layout: Layout) {
        unsafe { System.dealloc(ptr, layout) }
    }

    unsafe fn realloc(&self, ptr: *mut u8, layout: Layout, new_size: usize) -> *mut u8 {
        if TRACKING.load(Ordering::Relaxed) {
            LARGEST.fetch_max(new_size, Ordering::Relaxed);
        }
        unsafe { System.realloc(ptr, layout, new_size) }
    }
}

#[global_allocator]
static ALLOCATOR: TrackingAllocator = TrackingAllocator;

#[test]
fn inflated_size_claim_does_not_reserve_memory() {
    let mut spec = EntrySpec::deflated("liar.bin", b"x");
    spec.uncompressed_size = (DEFAULT_MAX_DECOMPRESSED_SIZE - 0xFFFF) as u32;
    let bytes = ArchiveBuilder::new().entry(spec).finish();

    let config = ScanConfig::default().with_paranoid(true);
    let mut reader = ZipReader::with_config(Cursor::new(bytes), config).unwrap();
    let entry = reader.headers().unwrap().remove(0);

    LARGEST.store(0, Ordering::Relaxed);
    TRACKING.store(true, Ordering::Relaxed);
    let opened = reader.open(&entry);
    TRACKING.store(false, Ordering::Relaxed);

    assert!(matches!(
        opened,
        Err(ZipError::SizeMismatch { actual: 1, .. })
    ));
    let largest = LARGEST.load(Ordering::Relaxed);
    assert!(largest < 8 << 20, "reserved {largest} bytes for a 1-byte entry");
}
