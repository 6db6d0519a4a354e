//! The public producer-side handle.

use crate::channel::Channel;
use crate::error::OpenError;
use crate::spawn::{self, SpawnSpec};
use slate_format::{Arg, EOL, PREFIX_BYTES, current_tid, format_into, write_prefix};
use slate_ring::Command;
use slate_writer::{ArchivePolicy, Target};
use std::cell::RefCell;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::warn;

/// Log severities, in ascending order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Level {
    Debug = 0,
    Info = 1,
    Warn = 2,
    Error = 3,
    Fatal = 4,
}

const LEVEL_COUNT: usize = 5;
const DEFAULT_LETTERS: [u8; LEVEL_COUNT] = [b'D', b'I', b'W', b'E', b'F'];

const DEFAULT_RING_BYTES: usize = 1 << 20;
const MIN_RING_BYTES: usize = 1 << 10;
const DEFAULT_CLOSE_TIMEOUT: Duration = Duration::from_secs(5);
const MIN_CLOSE_TIMEOUT: Duration = Duration::from_secs(2);

thread_local! {
    /// One line buffer per producing thread; the formatted line lives here
    /// only until it is copied into the ring.
    static LINE_BUF: RefCell<Vec<u8>> = RefCell::new(Vec::with_capacity(256));
}

/// A handle to one out-of-process log pipeline.
///
/// Created inert; [`open`](Logger::open) (or
/// [`open_stdout`](Logger::open_stdout)) spawns the writer process and maps
/// the shared ring. Dropping the handle closes it.
///
/// The handle may be shared across threads (`&Logger` logs through an
/// internal mutex); opening, closing, and reconfiguring need `&mut`.
/// Reopening after [`close`](Logger::close) is allowed; a second `open`
/// while already open is an error.
pub struct Logger {
    ring_bytes: usize,
    archive: Option<ArchivePolicy>,
    include_date: bool,
    letters: [u8; LEVEL_COUNT],
    close_timeout: Duration,
    writer_bin: Option<PathBuf>,
    test_prefix: Option<[u8; PREFIX_BYTES]>,
    channel: Option<Channel>,
}

impl Default for Logger {
    fn default() -> Self {
        Self::new()
    }
}

impl Logger {
    /// An inert handle with default settings: 1 MiB ring, archiving off,
    /// dated prefixes on.
    pub fn new() -> Self {
        Self {
            ring_bytes: DEFAULT_RING_BYTES,
            archive: None,
            include_date: true,
            letters: DEFAULT_LETTERS,
            close_timeout: DEFAULT_CLOSE_TIMEOUT,
            writer_bin: None,
            test_prefix: None,
            channel: None,
        }
    }

    /// Ring size in bytes. Rounded up to a power of two, clamped to at
    /// least 1 KiB. Pre-open only; ignored with a warning once open.
    pub fn set_ring_size(&mut self, bytes: usize) -> &mut Self {
        if self.reject_if_open("set_ring_size") {
            return self;
        }
        self.ring_bytes = bytes.next_power_of_two().max(MIN_RING_BYTES);
        self
    }

    /// Enables size-bounded rotation. Pre-open only.
    pub fn set_archive(&mut self, max_file_size: u64, max_archives: u32) -> &mut Self {
        if self.reject_if_open("set_archive") {
            return self;
        }
        self.archive = Some(ArchivePolicy {
            max_file_size,
            max_archives: max_archives.max(1),
        });
        self
    }

    /// Whether formatted lines carry the 42-byte dated prefix.
    pub fn set_include_date(&mut self, include: bool) -> &mut Self {
        self.include_date = include;
        self
    }

    /// Overrides the severity letter for one level.
    pub fn set_level_letter(&mut self, level: Level, letter: u8) -> &mut Self {
        self.letters[level as usize] = letter;
        self
    }

    /// How long `close` waits for the writer to drain before killing it.
    /// Clamped to at least 2 seconds.
    pub fn set_close_timeout(&mut self, timeout: Duration) -> &mut Self {
        self.close_timeout = timeout.max(MIN_CLOSE_TIMEOUT);
        self
    }

    /// Explicit path to the `slated` binary, overriding discovery.
    pub fn set_writer_bin<P: AsRef<Path>>(&mut self, bin: P) -> &mut Self {
        self.writer_bin = Some(bin.as_ref().to_path_buf());
        self
    }

    /// Pins the dated prefix to a fixed 42-byte value. Test hook: keeps
    /// formatted output byte-deterministic.
    #[doc(hidden)]
    pub fn set_test_prefix(&mut self, prefix: [u8; PREFIX_BYTES]) -> &mut Self {
        self.test_prefix = Some(prefix);
        self
    }

    fn reject_if_open(&self, what: &str) -> bool {
        if self.channel.is_some() {
            warn!("{what} ignored: logger is already open");
            true
        } else {
            false
        }
    }

    /// Starts the pipeline against a log file.
    pub fn open<P: AsRef<Path>>(&mut self, path: P) -> Result<(), OpenError> {
        self.open_target(
            Target::File(path.as_ref().to_path_buf()),
            self.archive,
        )
    }

    /// Starts the pipeline against the writer's (inherited) stdout.
    /// Rotation never applies.
    pub fn open_stdout(&mut self) -> Result<(), OpenError> {
        self.open_target(Target::Stdout, None)
    }

    fn open_target(
        &mut self,
        target: Target,
        archive: Option<ArchivePolicy>,
    ) -> Result<(), OpenError> {
        if self.channel.is_some() {
            return Err(OpenError::AlreadyOpen);
        }
        let spec = SpawnSpec {
            bin: spawn::locate_writer_bin(self.writer_bin.as_ref()),
            region: spawn::region_path(),
            target,
            archive,
        };
        self.channel = Some(Channel::open(spec, self.ring_bytes)?);
        Ok(())
    }

    /// True between a successful `open` and the matching `close`.
    pub fn is_open(&self) -> bool {
        self.channel.is_some()
    }

    /// Pid of the writer child, if open. Test hook for fault injection.
    #[doc(hidden)]
    pub fn writer_pid(&self) -> Option<u32> {
        self.channel.as_ref().map(Channel::writer_pid)
    }

    /// Submits raw bytes as one message: no prefix, no EOL, byte-exact in
    /// the file. Calls on a closed handle, and payloads that can never fit
    /// the ring, are dropped.
    pub fn log_raw(&self, bytes: &[u8]) {
        if let Some(channel) = &self.channel {
            channel.submit(Command::LogMsg, bytes);
        }
    }

    /// Formats and submits one line at the given level.
    pub fn log(&self, level: Level, fmt: &str, args: &[Arg<'_>]) {
        let Some(channel) = &self.channel else {
            return;
        };
        LINE_BUF.with(|cell| {
            let mut buf = cell.borrow_mut();
            buf.clear();
            if self.include_date {
                match &self.test_prefix {
                    Some(pinned) => buf.extend_from_slice(pinned),
                    None => write_prefix(&mut buf, self.letters[level as usize], current_tid()),
                }
            }
            format_into(&mut buf, fmt, args);
            buf.extend_from_slice(EOL);
            channel.submit(Command::LogMsg, &buf);
        });
    }

    pub fn debug(&self, fmt: &str, args: &[Arg<'_>]) {
        self.log(Level::Debug, fmt, args);
    }

    pub fn info(&self, fmt: &str, args: &[Arg<'_>]) {
        self.log(Level::Info, fmt, args);
    }

    pub fn warn(&self, fmt: &str, args: &[Arg<'_>]) {
        self.log(Level::Warn, fmt, args);
    }

    pub fn error(&self, fmt: &str, args: &[Arg<'_>]) {
        self.log(Level::Error, fmt, args);
    }

    pub fn fatal(&self, fmt: &str, args: &[Arg<'_>]) {
        self.log(Level::Fatal, fmt, args);
    }

    /// Flushes and tears the pipeline down: submits the close frame, waits
    /// (bounded) for the writer to exit, force-kills it past the deadline,
    /// and removes the region file. The handle may be reopened afterwards.
    pub fn close(&mut self) {
        if let Some(channel) = self.channel.take() {
            channel.close(self.close_timeout);
        }
    }
}

impl Drop for Logger {
    fn drop(&mut self) {
        self.close();
    }
}
