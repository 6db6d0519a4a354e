//! Dead-writer recovery: the writer is killed while idle, then enough
//! traffic is pushed to fill the ring. The stalled submit path must detect
//! the corpse, respawn the writer against the same region, and lose
//! nothing (the cursors live in the shared header, so the replacement
//! resumes exactly where the victim committed).

mod util;

#[cfg(unix)]
#[test]
fn killed_writer_is_restarted_without_losing_messages() {
    use std::fs;
    use std::time::Duration;

    let path = util::temp_path("restart");
    let mut logger = util::test_logger();
    logger.set_ring_size(4096);
    logger.open(&path).unwrap();

    let pid = logger.writer_pid().expect("open logger has a writer");
    // SAFETY: killing the child we just spawned.
    unsafe { libc::kill(pid as libc::pid_t, libc::SIGKILL) };
    // Let it die while the ring is empty, so nothing is mid-staging.
    std::thread::sleep(Duration::from_millis(200));

    // Well over one ring's worth: the submit path must hit backpressure,
    // probe the corpse, and respawn.
    let mut expected = Vec::new();
    for i in 0..600u32 {
        let line = format!("resurrected {i:04}\n");
        logger.log_raw(line.as_bytes());
        expected.extend_from_slice(line.as_bytes());
    }

    let new_pid = logger.writer_pid().expect("still open");
    assert_ne!(new_pid, pid, "writer was never restarted");

    logger.close();
    assert_eq!(fs::read(&path).unwrap(), expected);
    let _ = fs::remove_file(&path);
}
