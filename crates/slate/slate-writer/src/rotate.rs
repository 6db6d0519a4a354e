//! Archive shifting for size-bounded rotation.
//!
//! Archives are `<path>.1` (most recent) through `<path>.K` (oldest).
//! Rotation deletes `.K`, shifts every younger archive up one slot, and
//! renames the base file to `.1`; the caller then reopens a fresh base.

use std::io;
use std::path::{Path, PathBuf};

/// `<base>.<index>`, keeping the base name untouched.
pub fn archive_path(base: &Path, index: u32) -> PathBuf {
    let mut os = base.as_os_str().to_owned();
    os.push(format!(".{index}"));
    PathBuf::from(os)
}

/// Performs one shift: `.K` removed, `.i → .i+1`, base `→ .1`.
///
/// Missing intermediate archives are skipped, so a freshly started log
/// rotates correctly before the chain is fully populated.
pub fn shift_archives(base: &Path, max_archives: u32) -> io::Result<()> {
    let oldest = archive_path(base, max_archives);
    if oldest.exists() {
        std::fs::remove_file(&oldest)?;
    }

    for i in (1..max_archives).rev() {
        let from = archive_path(base, i);
        if from.exists() {
            std::fs::rename(&from, archive_path(base, i + 1))?;
        }
    }

    std::fs::rename(base, archive_path(base, 1))
}
