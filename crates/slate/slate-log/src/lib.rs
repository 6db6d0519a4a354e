//! Out-of-process application logging.
//!
//! A [`Logger`] formats a line and copies it into a shared-memory ring;
//! the `slated` child process owns the log file, drains the ring through a
//! small staging buffer, and rotates size-bounded archives. The calling
//! thread never does file I/O: its only suspension point is the bounded
//! spin when the ring is full.
//!
//! ```no_run
//! use slate_log::{Logger, args};
//!
//! let mut log = Logger::new();
//! log.set_ring_size(1 << 20);
//! log.set_archive(32 * 1024 * 1024, 3);
//! log.open("/var/log/myapp.log")?;
//!
//! log.info("listening on %v (pid %v)", args!["0.0.0.0:8080", std::process::id()]);
//! log.close();
//! # Ok::<(), slate_log::OpenError>(())
//! ```
//!
//! Failure policy: everything that can fail synchronously fails in
//! [`Logger::open`]. After that, log calls never error: oversize messages
//! are dropped, a dead writer is respawned once, and past that the handle
//! silently discards until it is closed and reopened.

mod channel;
pub mod config;
mod error;
mod logger;
mod spawn;

pub use config::{ConfigError, LoggerConfig};
pub use error::OpenError;
pub use logger::{Level, Logger};
pub use slate_format::{Arg, EOL, PREFIX_BYTES};
pub use spawn::WRITER_BIN_ENV;

/// Builds the argument slice for the `%v` formatting calls.
///
/// ```
/// use slate_log::{Arg, args};
/// let level = 3u32;
/// let who = "reactor";
/// let list: &[Arg<'_>] = args![who, level, true];
/// assert_eq!(list.len(), 3);
/// ```
#[macro_export]
macro_rules! args {
    ($($a:expr),* $(,)?) => {
        &[$($crate::Arg::from($a)),*]
    };
}
