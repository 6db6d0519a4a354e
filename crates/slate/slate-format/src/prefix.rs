//! The fixed-width dated prefix.
//!
//! A dated line starts with exactly 42 bytes:
//!
//! ```text
//! YYYY-MM-DDTHH:MM:SS.mmm±HHMM [X] tttttttt
//! 0         1         2         3         4
//! 0123456789012345678901234567890123456789012
//! ```
//!
//! (including the trailing space after the 8-hex-digit thread id). The
//! width is part of the file format: consumers that column-slice log files
//! rely on the message always starting at byte 42.
//!
//! Digits are emitted by hand rather than through `format!`; the prefix is
//! on the per-message hot path.

use chrono::{DateTime, Datelike, Local, Offset, Timelike};

/// Width of the dated prefix, trailing space included.
pub const PREFIX_BYTES: usize = 42;

#[inline(always)]
fn push2(out: &mut Vec<u8>, v: u32) {
    out.push(b'0' + (v / 10 % 10) as u8);
    out.push(b'0' + (v % 10) as u8);
}

#[inline(always)]
fn push4(out: &mut Vec<u8>, v: u32) {
    out.push(b'0' + (v / 1000 % 10) as u8);
    out.push(b'0' + (v / 100 % 10) as u8);
    out.push(b'0' + (v / 10 % 10) as u8);
    out.push(b'0' + (v % 10) as u8);
}

const HEX: &[u8; 16] = b"0123456789abcdef";

#[inline(always)]
fn push_hex8(out: &mut Vec<u8>, v: u32) {
    for shift in (0..8).rev() {
        out.push(HEX[((v >> (shift * 4)) & 0xF) as usize]);
    }
}

/// Appends the 42-byte prefix for `now` to `out`.
///
/// `letter` is the severity letter placed in the brackets, `tid` the
/// caller's thread id (see [`crate::tid::current_tid`]).
pub fn write_prefix_at(out: &mut Vec<u8>, now: &DateTime<Local>, letter: u8, tid: u32) {
    push4(out, now.year().clamp(0, 9999) as u32);
    out.push(b'-');
    push2(out, now.month());
    out.push(b'-');
    push2(out, now.day());
    out.push(b'T');
    push2(out, now.hour());
    out.push(b':');
    push2(out, now.minute());
    out.push(b':');
    push2(out, now.second());
    out.push(b'.');
    let ms = now.timestamp_subsec_millis().min(999);
    out.push(b'0' + (ms / 100) as u8);
    push2(out, ms % 100);

    let off_secs = now.offset().fix().local_minus_utc();
    out.push(if off_secs < 0 { b'-' } else { b'+' });
    let off_min = (off_secs.unsigned_abs() / 60) as u32;
    push2(out, off_min / 60);
    push2(out, off_min % 60);

    out.push(b' ');
    out.push(b'[');
    out.push(letter);
    out.push(b']');
    out.push(b' ');
    push_hex8(out, tid);
    out.push(b' ');
}

/// Appends the 42-byte prefix for the current wall-clock time.
#[inline]
pub fn write_prefix(out: &mut Vec<u8>, letter: u8, tid: u32) {
    write_prefix_at(out, &Local::now(), letter, tid);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prefix_is_exactly_42_bytes() {
        let mut out = Vec::new();
        write_prefix(&mut out, b'I', 0xdeadbeef);
        assert_eq!(out.len(), PREFIX_BYTES);
    }

    #[test]
    fn prefix_shape_is_stable() {
        let mut out = Vec::new();
        write_prefix(&mut out, b'W', 0x0000abcd);

        assert_eq!(out[4], b'-');
        assert_eq!(out[7], b'-');
        assert_eq!(out[10], b'T');
        assert_eq!(out[13], b':');
        assert_eq!(out[16], b':');
        assert_eq!(out[19], b'.');
        assert!(out[23] == b'+' || out[23] == b'-');
        assert_eq!(&out[28..33], b" [W] ");
        assert_eq!(&out[33..41], b"0000abcd");
        assert_eq!(out[41], b' ');

        // Every non-separator position is a digit.
        for &i in &[0, 1, 2, 3, 5, 6, 8, 9, 11, 12, 14, 15, 17, 18, 20, 21, 22, 24, 25, 26, 27] {
            assert!(out[i].is_ascii_digit(), "byte {i} not a digit: {}", out[i]);
        }
    }

    #[test]
    fn known_instant_formats_exactly() {
        use chrono::TimeZone;
        let fixed = chrono::FixedOffset::east_opt(5 * 3600 + 30 * 60).unwrap();
        let dt = fixed
            .with_ymd_and_hms(2026, 8, 1, 9, 5, 3)
            .unwrap()
            .with_timezone(&Local);
        // Round-trip through Local keeps the instant; re-render in Local's
        // own offset and only assert the fixed-width structure plus tid.
        let mut out = Vec::new();
        write_prefix_at(&mut out, &dt, b'E', 1);
        assert_eq!(out.len(), PREFIX_BYTES);
        assert_eq!(&out[29..32], b"[E]");
        assert_eq!(&out[33..41], b"00000001");
    }
}
