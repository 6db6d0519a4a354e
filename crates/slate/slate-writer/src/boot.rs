//! The argv contract between the producing library and the `slated`
//! binary.
//!
//! The producer builds this command line deterministically; nothing here is
//! user-facing. The private marker must be the first argument, so a stray
//! invocation of the binary fails fast instead of attaching to anything.

use crate::WriterConfig;
use crate::sink::{ArchivePolicy, Target};
use std::path::PathBuf;

/// Private argv marker; must come first.
pub const ARGV_MARKER: &str = "--slate-writer";
pub const ARG_REGION: &str = "--region";
pub const ARG_TARGET: &str = "--target";
pub const ARG_STDOUT: &str = "--stdout";
pub const ARG_ARCHIVE_SIZE: &str = "--archive-size";
pub const ARG_ARCHIVE_COUNT: &str = "--archive-count";
pub const ARG_PARENT_PID: &str = "--parent-pid";

#[derive(Debug, thiserror::Error)]
pub enum BootError {
    #[error("not invoked as a slate writer (missing {ARGV_MARKER} marker)")]
    MissingMarker,
    #[error("missing value for '{0}'")]
    MissingValue(&'static str),
    #[error("invalid numeric value for '{flag}': '{value}'")]
    BadNumber { flag: &'static str, value: String },
    #[error("unknown argument '{0}'")]
    UnknownArg(String),
    #[error("no ring region given")]
    NoRegion,
    #[error("no target given (need {ARG_TARGET} or {ARG_STDOUT})")]
    NoTarget,
    #[error("{ARG_ARCHIVE_SIZE} and {ARG_ARCHIVE_COUNT} must be given together")]
    HalfArchivePolicy,
}

fn parse_u64(flag: &'static str, value: String) -> Result<u64, BootError> {
    value
        .parse()
        .map_err(|_| BootError::BadNumber { flag, value })
}

/// Parses the writer command line (without argv[0]).
pub fn config_from_args(mut args: impl Iterator<Item = String>) -> Result<WriterConfig, BootError> {
    if args.next().as_deref() != Some(ARGV_MARKER) {
        return Err(BootError::MissingMarker);
    }

    let mut region: Option<PathBuf> = None;
    let mut target: Option<Target> = None;
    let mut archive_size: Option<u64> = None;
    let mut archive_count: Option<u32> = None;
    let mut parent_pid: Option<u32> = None;

    while let Some(flag) = args.next() {
        match flag.as_str() {
            ARG_REGION => {
                let v = args.next().ok_or(BootError::MissingValue(ARG_REGION))?;
                region = Some(PathBuf::from(v));
            }
            ARG_TARGET => {
                let v = args.next().ok_or(BootError::MissingValue(ARG_TARGET))?;
                target = Some(Target::File(PathBuf::from(v)));
            }
            ARG_STDOUT => target = Some(Target::Stdout),
            ARG_ARCHIVE_SIZE => {
                let v = args.next().ok_or(BootError::MissingValue(ARG_ARCHIVE_SIZE))?;
                archive_size = Some(parse_u64(ARG_ARCHIVE_SIZE, v)?);
            }
            ARG_ARCHIVE_COUNT => {
                let v = args
                    .next()
                    .ok_or(BootError::MissingValue(ARG_ARCHIVE_COUNT))?;
                archive_count = Some(parse_u64(ARG_ARCHIVE_COUNT, v)? as u32);
            }
            ARG_PARENT_PID => {
                let v = args.next().ok_or(BootError::MissingValue(ARG_PARENT_PID))?;
                parent_pid = Some(parse_u64(ARG_PARENT_PID, v)? as u32);
            }
            other => return Err(BootError::UnknownArg(other.to_string())),
        }
    }

    let archive = match (archive_size, archive_count) {
        (Some(max_file_size), Some(max_archives)) => Some(ArchivePolicy {
            max_file_size,
            max_archives,
        }),
        (None, None) => None,
        _ => return Err(BootError::HalfArchivePolicy),
    };

    Ok(WriterConfig {
        region: region.ok_or(BootError::NoRegion)?,
        target: target.ok_or(BootError::NoTarget)?,
        archive,
        parent_pid,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Result<WriterConfig, BootError> {
        config_from_args(args.iter().map(|s| s.to_string()))
    }

    #[test]
    fn full_file_invocation() {
        let cfg = parse(&[
            ARGV_MARKER,
            ARG_REGION,
            "/tmp/ring",
            ARG_TARGET,
            "/tmp/app.log",
            ARG_ARCHIVE_SIZE,
            "1048576",
            ARG_ARCHIVE_COUNT,
            "3",
            ARG_PARENT_PID,
            "4242",
        ])
        .unwrap();

        assert_eq!(cfg.region, PathBuf::from("/tmp/ring"));
        assert_eq!(cfg.target, Target::File(PathBuf::from("/tmp/app.log")));
        assert_eq!(
            cfg.archive,
            Some(ArchivePolicy {
                max_file_size: 1048576,
                max_archives: 3
            })
        );
        assert_eq!(cfg.parent_pid, Some(4242));
    }

    #[test]
    fn stdout_invocation_has_no_archive() {
        let cfg = parse(&[ARGV_MARKER, ARG_REGION, "/tmp/ring", ARG_STDOUT]).unwrap();
        assert_eq!(cfg.target, Target::Stdout);
        assert_eq!(cfg.archive, None);
        assert_eq!(cfg.parent_pid, None);
    }

    #[test]
    fn rejects_missing_marker() {
        assert!(matches!(
            parse(&[ARG_REGION, "/tmp/ring", ARG_STDOUT]),
            Err(BootError::MissingMarker)
        ));
    }

    #[test]
    fn rejects_unknown_and_half_policies() {
        assert!(matches!(
            parse(&[ARGV_MARKER, "--bogus"]),
            Err(BootError::UnknownArg(_))
        ));
        assert!(matches!(
            parse(&[
                ARGV_MARKER,
                ARG_REGION,
                "/tmp/ring",
                ARG_STDOUT,
                ARG_ARCHIVE_SIZE,
                "1024"
            ]),
            Err(BootError::HalfArchivePolicy)
        ));
        assert!(matches!(
            parse(&[ARGV_MARKER, ARG_STDOUT]),
            Err(BootError::NoRegion)
        ));
    }
}
