//! The slate writer daemon.
//!
//! Spawned by `slate_log::Logger` with a private argv marker; never meant
//! to be run by hand. Attaches the ring region named on the command line
//! and drains it into the target until a close frame, parent death, or a
//! fatal error. Diagnostics go to stderr, which the parent leaves
//! connected.

use anyhow::Context;
use tracing_subscriber::EnvFilter;

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let config = slate_writer::config_from_args(std::env::args().skip(1))
        .context("not a valid slated invocation")?;

    let writer = slate_writer::Writer::new(config).context("failed to start writer")?;
    writer.run().context("writer terminated abnormally")?;
    Ok(())
}
