//! Single-producer, single-consumer byte ring over shared memory.
//!
//! This is the crossing point between a logging application and its writer
//! process: the producer appends command/length/payload frames and advances
//! a monotonic `write` cursor, the consumer parses them back out and
//! advances `read`. The ring lives in a file-backed mapping
//! ([`region::RingRegion`]), enabling inter-process communication (IPC).
//!
//! # Design
//! - **Producer**: one per region. Owns the `write` cursor, publishes each
//!   frame (and each tail skip) with a Release store.
//! - **Consumer**: one per region. Owns the `read` cursor, republishes it
//!   only after the payload has been copied out, so replacing a dead
//!   consumer replays everything uncommitted.
//!
//! # Thread Safety
//! Both halves are `Send` but not `Sync`; each is a single logical
//! endpoint. Serializing multiple producer threads onto one
//! [`RingProducer`] is the caller's job.

pub mod consumer;
pub mod frame;
pub mod layout;
pub mod producer;
pub mod region;

pub use consumer::{Frame, RingConsumer};
pub use frame::{Command, FRAME_HEADER_BYTES, FramingError, max_payload};
pub use layout::{HEADER_BYTES, RING_MAGIC, RingHeader, region_bytes};
pub use producer::{RingProducer, SubmitError};
pub use region::RingRegion;
