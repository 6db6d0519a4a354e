//! Cached OS thread ids for the log prefix.

use std::cell::Cell;

thread_local! {
    static TID: Cell<u32> = const { Cell::new(0) };
}

#[cfg(target_os = "linux")]
fn os_tid() -> u32 {
    // SAFETY: gettid has no failure modes.
    (unsafe { libc::syscall(libc::SYS_gettid) }) as u32
}

#[cfg(target_os = "macos")]
fn os_tid() -> u32 {
    let mut tid: u64 = 0;
    // SAFETY: passing the current thread (null) and a valid out pointer.
    unsafe { libc::pthread_threadid_np(std::ptr::null_mut(), &mut tid) };
    tid as u32
}

#[cfg(not(any(target_os = "linux", target_os = "macos")))]
fn os_tid() -> u32 {
    use std::sync::atomic::{AtomicU32, Ordering};
    // No portable numeric tid; hand out stable per-thread serials instead.
    static NEXT: AtomicU32 = AtomicU32::new(1);
    NEXT.fetch_add(1, Ordering::Relaxed)
}

/// The calling thread's id, fetched once per thread and cached.
///
/// Rendered as 8 hex digits in the prefix, so only the low 32 bits are
/// kept.
#[inline]
pub fn current_tid() -> u32 {
    TID.with(|t| {
        let v = t.get();
        if v != 0 {
            return v;
        }
        let fresh = os_tid().max(1);
        t.set(fresh);
        fresh
    })
}
