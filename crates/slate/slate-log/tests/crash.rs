//! Producer-crash resilience: a child process opens a logger, publishes
//! lines, and exits without closing (destructors skipped). The orphaned
//! writer must notice the dead parent, drain what was published, flush,
//! and exit on its own.

mod util;

use std::env;
use std::process::Command;
use std::time::{Duration, Instant};

const ENV_ROLE: &str = "SLATE_CRASH_ROLE";
const ENV_PATH: &str = "SLATE_CRASH_PATH";

fn expected_stream() -> Vec<u8> {
    (0..50u32)
        .flat_map(|i| format!("survived the crash {i:03}\n").into_bytes())
        .collect()
}

fn run_child(path: &str) {
    let mut logger = util::test_logger();
    logger.open(path).unwrap();
    for i in 0..50u32 {
        logger.log_raw(format!("survived the crash {i:03}\n").as_bytes());
    }
    // Simulated crash: no close, no destructors.
    std::process::exit(0);
}

#[test]
fn orphaned_writer_drains_published_lines() {
    if env::var(ENV_ROLE).is_ok() {
        let path = env::var(ENV_PATH).expect("SLATE_CRASH_PATH not set");
        run_child(&path);
        return;
    }

    let path = util::temp_path("crash");
    let exe = env::current_exe().expect("failed to get current executable path");
    let status = Command::new(&exe)
        .arg("--exact")
        .arg("orphaned_writer_drains_published_lines")
        .env(ENV_ROLE, "producer")
        .env(ENV_PATH, &path)
        .status()
        .expect("failed to spawn producer process");
    assert!(status.success(), "producer child failed: {status}");

    // The writer's liveness probe runs at most every second; give it a few
    // rounds to notice, drain, and flush.
    let expected = expected_stream();
    let deadline = Instant::now() + Duration::from_secs(10);
    loop {
        if let Ok(content) = std::fs::read(&path) {
            if content == expected {
                break;
            }
        }
        assert!(
            Instant::now() < deadline,
            "orphaned writer never flushed the published lines"
        );
        std::thread::sleep(Duration::from_millis(50));
    }

    let _ = std::fs::remove_file(&path);
}
