//! The writer-process side of a slate logger.
//!
//! One `Writer` owns the log file for the lifetime of the logger handle
//! that spawned it. It block-polls the ring, coalesces small payloads
//! through a fixed staging buffer, rotates size-bounded archives, and
//! watches the parent so a producer crash still drains every byte that was
//! published before it.
//!
//! States: `Starting → Running → Draining → Exited`. Draining is entered on
//! a close frame, on parent-death detection, or on a fatal error; after its
//! final flush the ring is not read again.

pub mod boot;
pub mod rotate;
pub mod sink;

pub use boot::{BootError, config_from_args};
pub use sink::{ArchivePolicy, Sink, Target};

use slate_ring::{Frame, FramingError, RingConsumer};
use std::io;
use std::path::PathBuf;
use std::time::{Duration, Instant};
use tracing::{debug, warn};

/// Staging buffer size. Small frames are coalesced into file writes of at
/// most this many bytes; larger payloads bypass it straight from the ring.
pub const STAGING_BYTES: usize = 1024;

/// How long the loop sleeps when the ring is empty.
const IDLE_SLEEP: Duration = Duration::from_millis(1);

/// How often the parent process is probed while idle.
const LIVENESS_INTERVAL: Duration = Duration::from_secs(1);

/// Everything `slated` needs to run, decoded from argv by [`boot`].
#[derive(Debug)]
pub struct WriterConfig {
    pub region: PathBuf,
    pub target: Target,
    pub archive: Option<ArchivePolicy>,
    pub parent_pid: Option<u32>,
}

#[derive(Debug, thiserror::Error)]
pub enum WriterError {
    #[error("failed to attach ring region '{path}'")]
    Attach {
        path: String,
        #[source]
        source: io::Error,
    },

    #[error("log sink I/O failed")]
    Io(#[from] io::Error),

    #[error("ring framing corrupt")]
    Framing(#[from] FramingError),

    #[error("archive rotation failed after retry")]
    Rotate(#[source] io::Error),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Starting,
    Running,
    Draining,
    Exited,
}

/// Staging buffer plus sink; the half of the writer that is not the ring.
struct Output {
    sink: Sink,
    staging: Box<[u8; STAGING_BYTES]>,
    staged: usize,
}

impl Output {
    fn append(&mut self, payload: &[u8]) -> Result<(), WriterError> {
        if payload.len() > STAGING_BYTES {
            // Oversized payloads go straight from the mapped ring to the
            // sink; staging must drain first to keep ordering.
            self.flush()?;
            return self.sink.write(payload);
        }

        let mut rest = payload;
        while !rest.is_empty() {
            let space = STAGING_BYTES - self.staged;
            if space == 0 {
                self.flush()?;
                continue;
            }
            let n = space.min(rest.len());
            self.staging[self.staged..self.staged + n].copy_from_slice(&rest[..n]);
            self.staged += n;
            rest = &rest[n..];
        }
        Ok(())
    }

    fn flush(&mut self) -> Result<(), WriterError> {
        if self.staged > 0 {
            let staged = self.staged;
            self.staged = 0;
            self.sink.write(&self.staging[..staged])?;
        }
        Ok(())
    }

    fn finish(&mut self) -> Result<(), WriterError> {
        self.flush()?;
        self.sink.finish()
    }
}

pub struct Writer {
    ring: RingConsumer,
    out: Output,
    region: PathBuf,
    parent_pid: Option<u32>,
    state: State,
}

impl Writer {
    pub fn new(cfg: WriterConfig) -> Result<Self, WriterError> {
        let ring = RingConsumer::attach(&cfg.region).map_err(|source| WriterError::Attach {
            path: cfg.region.display().to_string(),
            source,
        })?;
        let sink = Sink::open(&cfg.target, cfg.archive)?;

        Ok(Self {
            ring,
            out: Output {
                sink,
                staging: Box::new([0u8; STAGING_BYTES]),
                staged: 0,
            },
            region: cfg.region,
            parent_pid: cfg.parent_pid,
            state: State::Starting,
        })
    }

    /// Runs until a close frame, parent death, or a fatal error.
    ///
    /// Returns `Ok` for the two clean exits; a framing or I/O error is
    /// returned after a best-effort flush and becomes the process's
    /// non-zero exit status.
    pub fn run(mut self) -> Result<(), WriterError> {
        self.set_state(State::Running);
        debug!(region = %self.region.display(), "writer running");

        let mut last_liveness = Instant::now();
        loop {
            match self.ring.next_frame() {
                Ok(Some(Frame::LogMsg(payload))) => {
                    // A sink failure is as fatal as corrupt framing: enter
                    // Draining and try to save what is already staged
                    // before reporting it.
                    if let Err(e) = self.out.append(payload) {
                        self.set_state(State::Draining);
                        let _ = self.out.finish();
                        return Err(e);
                    }
                    self.ring.commit();
                }
                Ok(Some(Frame::Close)) => {
                    self.ring.commit();
                    self.set_state(State::Draining);
                    self.out.finish()?;
                    self.set_state(State::Exited);
                    return Ok(());
                }
                Ok(None) => {
                    if last_liveness.elapsed() >= LIVENESS_INTERVAL {
                        last_liveness = Instant::now();
                        if !self.parent_alive() {
                            warn!("parent process gone, draining ring and exiting");
                            break;
                        }
                    }
                    std::thread::sleep(IDLE_SLEEP);
                }
                Err(e) => {
                    self.set_state(State::Draining);
                    let _ = self.out.finish();
                    return Err(e.into());
                }
            }
        }

        self.drain_after_parent_death()
    }

    fn set_state(&mut self, next: State) {
        debug!(from = ?self.state, to = ?next, "writer state change");
        self.state = next;
    }

    fn parent_alive(&self) -> bool {
        let Some(pid) = self.parent_pid else {
            return true;
        };
        parent_alive(pid)
    }

    /// Consumes everything already published, flushes, and removes the
    /// region file: the producer is gone, so nobody else will.
    fn drain_after_parent_death(mut self) -> Result<(), WriterError> {
        self.set_state(State::Draining);
        loop {
            match self.ring.next_frame() {
                Ok(Some(Frame::LogMsg(payload))) => {
                    if let Err(e) = self.out.append(payload) {
                        let _ = self.out.finish();
                        return Err(e);
                    }
                    self.ring.commit();
                }
                Ok(Some(Frame::Close)) | Ok(None) => break,
                Err(e) => {
                    let _ = self.out.finish();
                    return Err(e.into());
                }
            }
        }
        self.out.finish()?;
        let _ = std::fs::remove_file(&self.region);
        self.set_state(State::Exited);
        Ok(())
    }
}

/// Probes a process for existence without signalling it.
#[cfg(unix)]
fn parent_alive(pid: u32) -> bool {
    // SAFETY: signal 0 performs permission and existence checks only.
    let rc = unsafe { libc::kill(pid as libc::pid_t, 0) };
    if rc == 0 {
        return true;
    }
    // EPERM still means the process exists.
    io::Error::last_os_error().raw_os_error() != Some(libc::ESRCH)
}

#[cfg(not(unix))]
fn parent_alive(_pid: u32) -> bool {
    true
}
