//! Creation and attachment of ring region files.
//!
//! A region is one file-backed mapping holding the header followed by the
//! ring bytes (see [`crate::layout`]). The producing side creates the file,
//! sizes it, and stamps a fresh header; the writer process attaches later
//! and validates what it finds. Both sides map read-write because each owns
//! one of the header cursors.

use crate::layout::{self, HEADER_BYTES, RingHeader};
use memmap2::MmapMut;
use std::fs::{File, OpenOptions};
use std::io;
use std::path::Path;
use std::ptr;

/// One mapped ring region.
///
/// Owns the file handle and the mapping; the cached base pointer stays
/// valid for the life of the value because the region is never remapped.
#[derive(Debug)]
pub struct RingRegion {
    /// Keeps the mapping valid; never used again after construction.
    _file: File,
    _map: MmapMut,
    base: *mut u8,
    len: usize,
}

// SAFETY: `base` points into the owned mapping, which lives exactly as
// long as the value. A region belongs to a single ring endpoint; it is
// moved to its owning thread, never shared (and it is !Sync).
unsafe impl Send for RingRegion {}

impl RingRegion {
    /// Creates the region file for a ring of `capacity` bytes, maps it,
    /// and stamps a fresh header with both cursors at zero.
    ///
    /// Truncates anything already at `path`. The header is in place before
    /// this returns, so a consumer may attach as soon as the file exists.
    pub fn create<P: AsRef<Path>>(path: P, capacity: usize) -> io::Result<Self> {
        assert!(
            capacity.is_power_of_two(),
            "ring capacity must be a power of 2"
        );

        let len = layout::region_bytes(capacity);
        let file = OpenOptions::new()
            .create(true)
            .read(true)
            .write(true)
            .truncate(true)
            .open(path)?;
        file.set_len(len as u64)?;

        // SAFETY: the file was just sized to `len` and stays open for the
        // life of the mapping.
        let mut map = unsafe { MmapMut::map_mut(&file)? };
        let base = map.as_mut_ptr();

        // SAFETY: the mapping is fresh, page-aligned, and at least a
        // header long; nobody can attach before this store lands because
        // we have not returned the path to anyone yet.
        unsafe { ptr::write(base as *mut RingHeader, RingHeader::new(capacity as u64)) };

        Ok(Self {
            _file: file,
            _map: map,
            base,
            len,
        })
    }

    /// Maps an existing region read-write and validates its header: the
    /// magic, the power-of-two size, and that the file length matches
    /// header + ring exactly. Anything else in the temp directory that
    /// happens to carry a ring-like name is rejected here.
    pub fn attach<P: AsRef<Path>>(path: P) -> io::Result<Self> {
        let file = OpenOptions::new().read(true).write(true).open(path)?;

        // SAFETY: held open for the life of the mapping, as in `create`.
        let mut map = unsafe { MmapMut::map_mut(&file)? };
        let base = map.as_mut_ptr();
        let len = map.len();

        if len < HEADER_BYTES {
            return Err(io::Error::new(
                io::ErrorKind::InvalidData,
                "region too small for a ring header",
            ));
        }
        // SAFETY: at least a header's worth of mapped bytes exists; the
        // validation below rejects anything that is not a slate ring.
        let header = unsafe { &*(base as *const RingHeader) };
        header
            .validate(len)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;

        Ok(Self {
            _file: file,
            _map: map,
            base,
            len,
        })
    }

    #[inline(always)]
    pub fn header(&self) -> &RingHeader {
        // SAFETY: stamped by `create` or validated by `attach`.
        unsafe { &*(self.base as *const RingHeader) }
    }

    /// Pointer to the first ring byte, just past the header.
    #[inline(always)]
    pub fn data(&self) -> *mut u8 {
        // SAFETY: the region is always at least HEADER_BYTES long.
        unsafe { self.base.add(HEADER_BYTES) }
    }

    /// Ring capacity in bytes (the region minus its header).
    #[inline(always)]
    pub fn capacity(&self) -> u64 {
        (self.len - HEADER_BYTES) as u64
    }
}
