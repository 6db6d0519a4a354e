//! Shared memory layout of the log ring.
//!
//! The region is a fixed header followed by the ring bytes. The header is
//! little-endian and `#[repr(C)]` so both processes agree on it byte for
//! byte across restarts of either side.
//!
//! # Memory Layout
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │  write │ read │ size │ reserved                  (32 B)  │
//! ├──────────────────────────────────────────────────────────┤
//! │                 ring bytes (size, power of 2)            │
//! └──────────────────────────────────────────────────────────┘
//! ```
//!
//! `write` and `read` are monotonically increasing byte counters; the byte
//! at ring offset `cursor & (size - 1)` is where that cursor currently
//! points. The producer is the sole writer of `write`, the consumer the
//! sole writer of `read`; each side reads the other's cursor with Acquire
//! and publishes its own with Release.

use std::mem::size_of;
use std::sync::atomic::AtomicU64;

/// Magic number stamped into the header's reserved word.
///
/// ASCII encoding of "SLATERNG":
/// `0x534C_4154_4552_4E47` = "SLATERNG"
///
/// Used to verify that a region file is actually a log ring and not some
/// random data left over in the temp directory.
pub const RING_MAGIC: u64 = 0x534C_4154_4552_4E47;

/// Header size in bytes. Fixed by the wire contract, not padded.
pub const HEADER_BYTES: usize = 32;

/// Header structure at the start of every ring region.
///
/// # Representation
/// Uses `#[repr(C)]` to ensure predictable field ordering and alignment.
#[repr(C)]
pub struct RingHeader {
    /// Monotonically increasing count of bytes published by the producer.
    pub write: AtomicU64,

    /// Monotonically increasing count of bytes consumed by the writer
    /// process. Never exceeds `write`; trails it by at most `size`.
    pub read: AtomicU64,

    /// Ring size in bytes. Must be a power of 2. Set once at creation.
    pub size: u64,

    /// Reserved word; carries `RING_MAGIC` for sanity checking on attach.
    pub reserved: u64,
}

impl RingHeader {
    /// Constructs a fresh header for ring creation, both cursors at zero.
    pub fn new(size: u64) -> Self {
        Self {
            write: AtomicU64::new(0),
            read: AtomicU64::new(0),
            size,
            reserved: RING_MAGIC,
        }
    }

    /// Validates the header of an attached region.
    ///
    /// Checks that:
    /// - the magic matches (this really is a slate ring)
    /// - the ring size is a power of 2
    /// - the region file is exactly header + ring bytes
    ///
    /// # Returns
    /// - `Ok(())` if all checks pass
    /// - `Err(&'static str)` with a description if any check fails
    pub fn validate(&self, region_len: usize) -> Result<(), &'static str> {
        if self.reserved != RING_MAGIC {
            return Err("bad magic");
        }
        if !(self.size as usize).is_power_of_two() {
            return Err("ring size must be a power of two");
        }
        if region_len != region_bytes(self.size as usize) {
            return Err("region length does not match header size field");
        }

        Ok(())
    }
}

/// Total bytes required for a ring region of `capacity` ring bytes.
pub fn region_bytes(capacity: usize) -> usize {
    HEADER_BYTES + capacity
}

/// Converts a byte cursor to a ring offset.
///
/// The mask is `capacity - 1`, which performs modulo arithmetic with a
/// bitwise AND. Requires that `capacity` is a power of 2.
#[inline(always)]
pub fn cursor_to_offset(cursor: u64, mask: u64) -> usize {
    (cursor & mask) as usize
}

// The header must stay exactly HEADER_BYTES: both processes index the ring
// bytes at a fixed offset past it.
const _: () = assert!(size_of::<RingHeader>() == HEADER_BYTES);
