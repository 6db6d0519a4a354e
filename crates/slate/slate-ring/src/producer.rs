//! Producer half of the log ring.
//!
//! The producer owns the `write` cursor: it is the only process that ever
//! stores it, and it keeps a local shadow copy so the hot path never loads
//! its own cursor from shared memory. The consumer's `read` cursor is
//! loaded with Acquire before every placement decision.
//!
//! # Publication protocol
//!
//! 1. Load `read` (Acquire).
//! 2. If the frame does not fit between the current offset and the end of
//!    the ring, stamp a pad byte and publish the whole tail as a skip.
//! 3. If `write - read + frame > capacity`, report [`SubmitError::RingFull`]
//!    (the caller decides how to back off).
//! 4. Copy header + payload contiguously, then publish the new `write`
//!    with Release.
//!
//! The tail skip is published as its own unit before the frame. This keeps
//! the protocol resumable: a retry after `RingFull` re-enters at step 1
//! with the cursor already sitting on a wrap boundary, so a frame as large
//! as the whole ring can still drain through offset 0 once the consumer
//! catches up.

use crate::frame::{self, Command, FRAME_HEADER_BYTES};
use crate::layout;
use crate::region::RingRegion;
use std::io;
use std::path::Path;
use std::ptr;
use std::sync::atomic::Ordering;

/// Why a submission did not happen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitError {
    /// Payload can never fit this ring; the frame was dropped.
    TooLarge,
    /// Not enough free space right now; retry after the consumer drains.
    RingFull,
}

/// The producing half of a log ring.
///
/// Creates the region file, stamps the header, and appends frames. There
/// must be exactly one `RingProducer` per region at a time.
pub struct RingProducer {
    region: RingRegion,
    /// Bitmask for fast modulo: `offset = cursor & mask`.
    mask: u64,
    /// Ring size in bytes (power of 2).
    capacity: u64,
    /// Local shadow of the write cursor. The producer is its sole writer.
    write: u64,
}

impl RingProducer {
    /// Creates a fresh ring region at `path`. `capacity` is the ring size
    /// in bytes and must be a power of 2.
    pub fn create<P: AsRef<Path>>(path: P, capacity: usize) -> io::Result<Self> {
        let region = RingRegion::create(path, capacity)?;
        Ok(Self {
            region,
            mask: (capacity as u64) - 1,
            capacity: capacity as u64,
            write: 0,
        })
    }

    /// Ring size in bytes.
    #[inline(always)]
    pub fn capacity(&self) -> usize {
        self.capacity as usize
    }

    /// Largest payload this ring accepts.
    #[inline(always)]
    pub fn max_payload(&self) -> usize {
        frame::max_payload(self.capacity as usize)
    }

    /// Bytes currently published but not yet consumed.
    #[inline(always)]
    pub fn backlog(&self) -> u64 {
        self.write - self.region.header().read.load(Ordering::Acquire)
    }

    /// Attempts to append one frame. Non-blocking: on [`SubmitError::RingFull`]
    /// nothing is copied (though a tail skip may have been published) and
    /// the caller should retry after backing off.
    pub fn try_submit(&mut self, cmd: Command, payload: &[u8]) -> Result<(), SubmitError> {
        let len = payload.len();
        if len > self.max_payload() {
            return Err(SubmitError::TooLarge);
        }
        let frame = (FRAME_HEADER_BYTES + len) as u64;
        let header = self.region.header();
        let data = self.region.data();

        let mut read = header.read.load(Ordering::Acquire);
        let mut offset = layout::cursor_to_offset(self.write, self.mask);
        let to_end = self.capacity - offset as u64;

        if frame > to_end {
            // The tail cannot hold this frame contiguously. Publish the
            // tail as a skip, marked by a single pad byte at the current
            // offset, and land on the wrap boundary.
            if self.write - read + to_end > self.capacity {
                return Err(SubmitError::RingFull);
            }
            // SAFETY: offset < capacity, and the byte at the write cursor
            // is outside the consumer's [read, write) window.
            unsafe { *data.add(offset) = frame::CMD_PAD };
            self.write += to_end;
            header.write.store(self.write, Ordering::Release);

            offset = 0;
            read = header.read.load(Ordering::Acquire);
        }

        if self.write - read + frame > self.capacity {
            return Err(SubmitError::RingFull);
        }

        // SAFETY: `offset + frame <= capacity` holds on both branches
        // above, so the copies stay inside the mapped ring bytes. The
        // consumer will not touch [write, write + frame) until the Release
        // store below publishes it.
        unsafe {
            let dst = data.add(offset);
            *dst = cmd.code();
            let len_le = (len as u32).to_le_bytes();
            ptr::copy_nonoverlapping(len_le.as_ptr(), dst.add(1), 4);
            if len > 0 {
                ptr::copy_nonoverlapping(payload.as_ptr(), dst.add(FRAME_HEADER_BYTES), len);
            }
        }

        self.write += frame;
        header.write.store(self.write, Ordering::Release);
        Ok(())
    }
}
