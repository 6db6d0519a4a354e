//! The producer-side submission channel: ring + writer child + the
//! backpressure and degradation policy.
//!
//! Submission is the only place a log call may stall. The policy, in
//! order: exponential spin (`spin_loop` hint), then yields; every so many
//! stalled rounds the child is probed, a dead child is respawned against
//! the same region exactly once (the shared cursors make the new writer
//! resume where the old one committed), and if the respawn fails the
//! channel degrades to silently discarding until close.

use crate::error::OpenError;
use crate::spawn::SpawnSpec;
use slate_ring::{Command, RingProducer, SubmitError};
use std::path::PathBuf;
use std::process::Child;
use std::sync::Mutex;
use std::time::{Duration, Instant};
use tracing::warn;

/// Spin rounds that double before the backoff falls through to yields.
const SPIN_ROUNDS: u32 = 6;

/// Stalled rounds between child-liveness probes. With the yield in
/// between this works out to roughly a probe per millisecond of stall.
const PROBE_EVERY: u32 = 512;

struct Inner {
    ring: RingProducer,
    child: Child,
    spec: SpawnSpec,
    /// One respawn is allowed per open; after that a dead writer is final.
    restarted: bool,
    /// Set once the writer is unrecoverable; all traffic is discarded.
    dead: bool,
    warned_oversize: bool,
    warned_dead: bool,
}

pub(crate) struct Channel {
    inner: Mutex<Inner>,
    region: PathBuf,
}

fn backoff(round: u32) {
    if round < SPIN_ROUNDS {
        for _ in 0..(1u32 << round) {
            std::hint::spin_loop();
        }
    } else {
        std::thread::yield_now();
    }
}

impl Channel {
    /// Creates the region, stamps the ring, and spawns the writer.
    pub fn open(spec: SpawnSpec, ring_bytes: usize) -> Result<Self, OpenError> {
        let region = spec.region.clone();
        let ring =
            RingProducer::create(&region, ring_bytes).map_err(|source| OpenError::Region {
                path: region.display().to_string(),
                source,
            })?;

        let child = match spec.spawn() {
            Ok(child) => child,
            Err(source) => {
                let _ = std::fs::remove_file(&region);
                return Err(OpenError::Spawn(source));
            }
        };

        Ok(Self {
            inner: Mutex::new(Inner {
                ring,
                child,
                spec,
                restarted: false,
                dead: false,
                warned_oversize: false,
                warned_dead: false,
            }),
            region,
        })
    }

    /// Pid of the current writer child.
    pub fn writer_pid(&self) -> u32 {
        self.lock().child.id()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Inner> {
        match self.inner.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    /// Submits one frame, blocking in the backpressure loop if the ring is
    /// full. Never reports failure to the caller.
    pub fn submit(&self, cmd: Command, payload: &[u8]) {
        let mut inner = self.lock();
        if inner.dead {
            return;
        }

        let mut round = 0u32;
        loop {
            match inner.ring.try_submit(cmd, payload) {
                Ok(()) => return,
                Err(SubmitError::TooLarge) => {
                    if !inner.warned_oversize {
                        inner.warned_oversize = true;
                        warn!(
                            len = payload.len(),
                            max = inner.ring.max_payload(),
                            "dropping oversize log message"
                        );
                    }
                    return;
                }
                Err(SubmitError::RingFull) => {
                    round = round.wrapping_add(1);
                    if round % PROBE_EVERY == 0 && !inner.revive_if_dead() {
                        return;
                    }
                    backoff(round);
                }
            }
        }
    }

    /// Called from the mutually-exclusive close path in `Logger`.
    pub fn close(self, timeout: Duration) {
        let mut inner = self.inner.into_inner().unwrap_or_else(|p| p.into_inner());
        let deadline = Instant::now() + timeout;

        if !inner.dead {
            let mut round = 0u32;
            loop {
                match inner.ring.try_submit(Command::Close, b"") {
                    Ok(()) => break,
                    Err(SubmitError::RingFull) if Instant::now() < deadline => {
                        round = round.wrapping_add(1);
                        backoff(round);
                    }
                    Err(_) => break,
                }
            }
        }

        // Bounded wait for the writer to flush and exit; force-kill past
        // the deadline, losing whatever is still in the ring.
        let exited = loop {
            match inner.child.try_wait() {
                Ok(Some(_)) => break true,
                Ok(None) if Instant::now() < deadline => {
                    std::thread::sleep(Duration::from_millis(10));
                }
                _ => break false,
            }
        };
        if !exited {
            warn!("writer did not exit in time, killing it");
            let _ = inner.child.kill();
            let _ = inner.child.wait();
        }

        let _ = std::fs::remove_file(&self.region);
    }
}

impl Inner {
    /// Returns false once the channel is (now) unrecoverable.
    fn revive_if_dead(&mut self) -> bool {
        match self.child.try_wait() {
            Ok(Some(status)) => {
                if self.restarted {
                    self.mark_dead(format!("writer died again ({status}), giving up"));
                    return false;
                }
                self.restarted = true;
                match self.spec.spawn() {
                    Ok(child) => {
                        warn!(%status, "writer process died, restarted it");
                        self.child = child;
                        true
                    }
                    Err(e) => {
                        self.mark_dead(format!("writer died ({status}) and respawn failed: {e}"));
                        false
                    }
                }
            }
            // Still running (or unknowable): keep waiting on the ring.
            _ => true,
        }
    }

    fn mark_dead(&mut self, why: String) {
        self.dead = true;
        if !self.warned_dead {
            self.warned_dead = true;
            warn!("{why}; discarding log messages until close");
        }
    }
}
