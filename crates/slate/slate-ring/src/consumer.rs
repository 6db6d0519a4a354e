//! Consumer half of the log ring.
//!
//! The consumer owns the `read` cursor. Frames are handed out borrowed
//! straight from the mapped region ([`Frame`]), and the cursor is only
//! republished by [`RingConsumer::commit`] after the caller has copied the
//! payload out (or written it to the file). That split is what makes a
//! writer-process restart lossless: anything not yet committed is replayed
//! to the next writer that attaches.

use crate::frame::{CMD_CLOSE, CMD_LOG_MSG, CMD_PAD, FRAME_HEADER_BYTES, FramingError, max_payload};
use crate::layout;
use crate::region::RingRegion;
use std::io;
use std::path::Path;
use std::slice;
use std::sync::atomic::Ordering;

/// One frame observed in the ring, payload borrowed from the mapping.
#[derive(Debug)]
pub enum Frame<'a> {
    LogMsg(&'a [u8]),
    Close,
}

/// The consuming half of a log ring.
pub struct RingConsumer {
    region: RingRegion,
    /// Bitmask for fast modulo.
    mask: u64,
    /// Ring size in bytes.
    capacity: u64,
    /// Local shadow of the read cursor. The consumer is its sole writer.
    read: u64,
    /// Size of the frame handed out by the last `next_frame`, applied on
    /// `commit`. Zero when nothing is pending.
    pending: u64,
}

impl RingConsumer {
    /// Attaches to an existing ring region (header validation included).
    ///
    /// The read cursor resumes from the header, so a consumer that replaces
    /// a dead one picks up exactly where the old one committed.
    pub fn attach<P: AsRef<Path>>(path: P) -> io::Result<Self> {
        let region = RingRegion::attach(path)?;
        let capacity = region.capacity();
        let read = region.header().read.load(Ordering::Acquire);

        Ok(Self {
            region,
            mask: capacity - 1,
            capacity,
            read,
            pending: 0,
        })
    }

    /// Ring size in bytes.
    #[inline(always)]
    pub fn capacity(&self) -> usize {
        self.capacity as usize
    }

    /// Bytes published by the producer but not yet committed here.
    #[inline(always)]
    pub fn backlog(&self) -> u64 {
        self.region.header().write.load(Ordering::Acquire) - self.read
    }

    /// Parses the next frame, if one is published.
    ///
    /// Pad markers are consumed and committed internally; the caller only
    /// ever sees log and close frames. The returned payload borrows the
    /// mapped region: copy it out (or write it to the sink), then call
    /// [`commit`](Self::commit).
    ///
    /// A corrupt stream (unknown command, impossible length) is fatal; the
    /// ring is not advanced past the damage.
    pub fn next_frame(&mut self) -> Result<Option<Frame<'_>>, FramingError> {
        debug_assert_eq!(self.pending, 0, "commit() must run before the next frame");

        loop {
            let header = self.region.header();
            let data = self.region.data();

            let write = header.write.load(Ordering::Acquire);
            if self.read == write {
                return Ok(None);
            }

            let offset = layout::cursor_to_offset(self.read, self.mask);
            // SAFETY: read < write, so this byte was published by the
            // producer's Release store which our Acquire load above saw.
            let cmd = unsafe { *data.add(offset) };

            if cmd == CMD_PAD {
                // The producer published the whole tail as one skip, so
                // jumping to the wrap can never pass `write`.
                self.read += self.capacity - offset as u64;
                header.read.store(self.read, Ordering::Release);
                continue;
            }

            // Frames are published whole: once the first byte is visible,
            // header and payload are too, contiguously.
            let mut len_le = [0u8; 4];
            // SAFETY: frame headers never wrap, see module docs in `frame`.
            unsafe {
                std::ptr::copy_nonoverlapping(data.add(offset + 1), len_le.as_mut_ptr(), 4)
            };
            let len = u32::from_le_bytes(len_le);

            if len as usize > max_payload(self.capacity as usize) {
                return Err(FramingError::BadLength(len));
            }

            self.pending = (FRAME_HEADER_BYTES + len as usize) as u64;
            return match cmd {
                CMD_LOG_MSG => {
                    // SAFETY: the whole frame is contiguous and published.
                    let payload = unsafe {
                        slice::from_raw_parts(
                            data.add(offset + FRAME_HEADER_BYTES) as *const u8,
                            len as usize,
                        )
                    };
                    Ok(Some(Frame::LogMsg(payload)))
                }
                CMD_CLOSE => Ok(Some(Frame::Close)),
                other => {
                    self.pending = 0;
                    Err(FramingError::BadCommand(other))
                }
            };
        }
    }

    /// Releases the frame handed out by the last [`next_frame`](Self::next_frame),
    /// republishing the read cursor so the producer can reuse the bytes.
    #[inline]
    pub fn commit(&mut self) {
        if self.pending > 0 {
            self.read += self.pending;
            self.pending = 0;
            self.region.header().read.store(self.read, Ordering::Release);
        }
    }
}
