//! The writer's output sink: the log file (with rotation) or stdout.

use crate::WriterError;
use crate::rotate::shift_archives;
use std::fs::{File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tracing::{error, info};

/// Size-bounded rotation settings. Absent means the file grows forever.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ArchivePolicy {
    /// Rotate once the base file exceeds this many bytes.
    pub max_file_size: u64,
    /// How many archives (`.1` … `.K`) to keep.
    pub max_archives: u32,
}

/// Where the writer sends drained bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Target {
    File(PathBuf),
    Stdout,
}

pub enum Sink {
    File {
        file: File,
        path: PathBuf,
        written: u64,
        archive: Option<ArchivePolicy>,
        /// Set by the flush that crossed the threshold; honored before the
        /// next write so the final flush of a session never leaves an
        /// empty base file behind.
        rotate_pending: bool,
    },
    Stdout(io::Stdout),
}

impl Sink {
    /// Opens the sink. Files are opened in append mode: reopening a logger
    /// on an existing path continues it rather than clobbering it.
    pub fn open(target: &Target, archive: Option<ArchivePolicy>) -> io::Result<Self> {
        match target {
            Target::File(path) => {
                let file = OpenOptions::new().create(true).append(true).open(path)?;
                let written = file.metadata()?.len();
                Ok(Sink::File {
                    file,
                    path: path.clone(),
                    written,
                    archive,
                    rotate_pending: false,
                })
            }
            Target::Stdout => Ok(Sink::Stdout(io::stdout())),
        }
    }

    /// Writes one flushed chunk, rotating first if the previous flush left
    /// the file over the archive threshold.
    pub fn write(&mut self, bytes: &[u8]) -> Result<(), WriterError> {
        match self {
            Sink::File {
                file,
                path,
                written,
                archive,
                rotate_pending,
            } => {
                if *rotate_pending {
                    rotate(file, path, archive.as_ref().map_or(0, |a| a.max_archives))?;
                    *written = 0;
                    *rotate_pending = false;
                }
                file.write_all(bytes)?;
                *written += bytes.len() as u64;
                if let Some(policy) = archive {
                    if *written > policy.max_file_size {
                        *rotate_pending = true;
                    }
                }
                Ok(())
            }
            Sink::Stdout(out) => {
                out.write_all(bytes)?;
                Ok(())
            }
        }
    }

    /// Final flush before exit.
    pub fn finish(&mut self) -> Result<(), WriterError> {
        match self {
            Sink::File { file, .. } => file.flush()?,
            Sink::Stdout(out) => out.flush()?,
        }
        Ok(())
    }
}

/// Closes the current base file, shifts the archive chain, and reopens a
/// fresh base. A rename failure is reported to stderr and retried once; a
/// second failure aborts the writer.
fn rotate(file: &mut File, path: &Path, max_archives: u32) -> Result<(), WriterError> {
    file.flush()?;

    if let Err(first) = shift_archives(path, max_archives) {
        error!(path = %path.display(), error = %first, "archive rotation failed, retrying");
        shift_archives(path, max_archives).map_err(WriterError::Rotate)?;
    }

    *file = OpenOptions::new()
        .create(true)
        .write(true)
        .truncate(true)
        .open(path)?;
    info!(path = %path.display(), "rotated log file");
    Ok(())
}
