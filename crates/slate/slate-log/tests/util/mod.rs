//! Shared helpers for the slate-log integration suites.
#![allow(dead_code)]

use slate_log::Logger;
use std::path::PathBuf;
use std::sync::atomic::{AtomicU32, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

/// The writer binary cargo built alongside these tests.
pub fn writer_bin() -> &'static str {
    env!("CARGO_BIN_EXE_slated")
}

/// A logger wired to that binary (discovery would otherwise look next to
/// the test executable, which is not where cargo puts bins).
pub fn test_logger() -> Logger {
    let mut logger = Logger::new();
    logger.set_writer_bin(writer_bin());
    logger
}

/// A unique scratch path under the temp dir.
pub fn temp_path(tag: &str) -> PathBuf {
    static SERIAL: AtomicU32 = AtomicU32::new(0);
    let n = SERIAL.fetch_add(1, Ordering::Relaxed);
    let ts = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_nanos();
    std::env::temp_dir().join(format!("slate_log_{tag}_{}_{n}_{ts}", std::process::id()))
}

/// Deterministic filler: `"<seed> "` tokens with an incrementing seed, a
/// newline after every 20th token, a final newline, truncated to `len`.
pub fn make_msg(len: usize, seed: usize) -> Vec<u8> {
    let mut out = Vec::with_capacity(len + 16);
    let mut seed = seed;
    let mut tokens = 0usize;
    while out.len() < len {
        out.extend_from_slice(format!("{seed} ").as_bytes());
        seed += 1;
        tokens += 1;
        if tokens % 20 == 0 {
            out.push(b'\n');
        }
    }
    out.push(b'\n');
    out.truncate(len);
    out
}
