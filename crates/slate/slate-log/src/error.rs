use std::io;

/// Everything that can go wrong synchronously, i.e. in `open`.
///
/// After a successful open, log calls never surface failures to the
/// caller; see the crate docs for the degradation policy.
#[derive(Debug, thiserror::Error)]
pub enum OpenError {
    #[error("logger is already open; close() it first")]
    AlreadyOpen,

    #[error("failed to create ring region '{path}'")]
    Region {
        path: String,
        #[source]
        source: io::Error,
    },

    #[error("failed to spawn the slated writer process")]
    Spawn(#[source] io::Error),
}
