//! Region naming and writer-process bootstrap.
//!
//! The region file name is derived from the parent pid plus a process-wide
//! nonce, so several loggers in one process (or several processes on one
//! machine) never collide. All bootstrap information reaches the child as
//! deterministic argv, defined by `slate_writer::boot`.

use slate_writer::boot;
use slate_writer::{ArchivePolicy, Target};
#[cfg(test)]
use slate_writer::WriterConfig;
use std::io;
use std::path::PathBuf;
use std::process::{Child, Command, Stdio};
use std::sync::OnceLock;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

#[cfg(windows)]
const BIN_NAME: &str = "slated.exe";
#[cfg(not(windows))]
const BIN_NAME: &str = "slated";

/// Environment override for the writer binary location.
pub const WRITER_BIN_ENV: &str = "SLATE_WRITER_BIN";

/// A fresh region file path in the temp directory.
pub(crate) fn region_path() -> PathBuf {
    static NONCE: OnceLock<AtomicU64> = OnceLock::new();
    let nonce = NONCE.get_or_init(|| {
        let seed = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_nanos() as u64)
            .unwrap_or(0);
        AtomicU64::new(seed ^ (std::process::id() as u64) << 32)
    });
    let n = nonce.fetch_add(1, Ordering::Relaxed);
    std::env::temp_dir().join(format!("slate-ring-{}-{n:016x}", std::process::id()))
}

/// Resolves the `slated` binary: explicit path, then the environment
/// override, then a sibling of the current executable, then `PATH`.
pub(crate) fn locate_writer_bin(explicit: Option<&PathBuf>) -> PathBuf {
    if let Some(p) = explicit {
        return p.clone();
    }
    if let Ok(p) = std::env::var(WRITER_BIN_ENV) {
        return PathBuf::from(p);
    }
    if let Ok(exe) = std::env::current_exe() {
        if let Some(dir) = exe.parent() {
            let sibling = dir.join(BIN_NAME);
            if sibling.exists() {
                return sibling;
            }
        }
    }
    PathBuf::from(BIN_NAME)
}

/// Everything needed to (re)spawn the writer for one open ring.
#[derive(Debug, Clone)]
pub(crate) struct SpawnSpec {
    pub bin: PathBuf,
    pub region: PathBuf,
    pub target: Target,
    pub archive: Option<ArchivePolicy>,
}

impl SpawnSpec {
    /// The `WriterConfig` the child will decode from our argv; used by
    /// tests to assert both sides agree.
    #[cfg(test)]
    fn as_writer_config(&self) -> WriterConfig {
        WriterConfig {
            region: self.region.clone(),
            target: self.target.clone(),
            archive: self.archive,
            parent_pid: Some(std::process::id()),
        }
    }

    fn argv(&self) -> Vec<String> {
        let mut argv = vec![
            boot::ARGV_MARKER.to_string(),
            boot::ARG_REGION.to_string(),
            self.region.display().to_string(),
        ];
        match &self.target {
            Target::File(path) => {
                argv.push(boot::ARG_TARGET.to_string());
                argv.push(path.display().to_string());
            }
            Target::Stdout => argv.push(boot::ARG_STDOUT.to_string()),
        }
        if let Some(policy) = &self.archive {
            argv.push(boot::ARG_ARCHIVE_SIZE.to_string());
            argv.push(policy.max_file_size.to_string());
            argv.push(boot::ARG_ARCHIVE_COUNT.to_string());
            argv.push(policy.max_archives.to_string());
        }
        argv.push(boot::ARG_PARENT_PID.to_string());
        argv.push(std::process::id().to_string());
        argv
    }

    /// Spawns the writer child. The child dissociates from our standard
    /// streams except stderr (diagnostics) and, in stdout mode, stdout.
    pub fn spawn(&self) -> io::Result<Child> {
        let stdout = match self.target {
            Target::Stdout => Stdio::inherit(),
            Target::File(_) => Stdio::null(),
        };
        Command::new(&self.bin)
            .args(self.argv())
            .stdin(Stdio::null())
            .stdout(stdout)
            .stderr(Stdio::inherit())
            .spawn()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn region_paths_never_collide() {
        let a = region_path();
        let b = region_path();
        assert_ne!(a, b);
        let name = a.file_name().unwrap().to_str().unwrap();
        assert!(name.starts_with(&format!("slate-ring-{}-", std::process::id())));
    }

    #[test]
    fn argv_round_trips_through_the_boot_parser() {
        let spec = SpawnSpec {
            bin: PathBuf::from("slated"),
            region: PathBuf::from("/tmp/slate-ring-1-2"),
            target: Target::File(PathBuf::from("/tmp/app.log")),
            archive: Some(ArchivePolicy {
                max_file_size: 4096,
                max_archives: 2,
            }),
        };
        let parsed = slate_writer::config_from_args(spec.argv().into_iter()).unwrap();
        let expect = spec.as_writer_config();
        assert_eq!(parsed.region, expect.region);
        assert_eq!(parsed.target, expect.target);
        assert_eq!(parsed.archive, expect.archive);
        assert_eq!(parsed.parent_pid, expect.parent_pid);
    }

    #[test]
    fn stdout_argv_round_trips() {
        let spec = SpawnSpec {
            bin: PathBuf::from("slated"),
            region: PathBuf::from("/tmp/slate-ring-1-3"),
            target: Target::Stdout,
            archive: None,
        };
        let parsed = slate_writer::config_from_args(spec.argv().into_iter()).unwrap();
        assert_eq!(parsed.target, Target::Stdout);
        assert_eq!(parsed.archive, None);
    }
}
