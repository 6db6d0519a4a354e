//! Shared helpers for the slate benches.

use std::time::{SystemTime, UNIX_EPOCH};

/// Unique temp path for a bench's ring region.
pub fn temp_ring_path(tag: &str) -> String {
    let ts = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_nanos();
    format!("/tmp/slate_bench_{tag}_{}_{ts}", std::process::id())
}

/// A typical formatted log line payload, ~90 bytes.
pub fn sample_line() -> Vec<u8> {
    let mut line =
        b"2026-01-02T03:04:05.678+0000 [I] 0000002a order accepted id=184467 venue=XNAS qty=100"
            .to_vec();
    line.push(b'\n');
    line
}
