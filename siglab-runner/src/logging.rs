//! Tracing subscriber setup.

use anyhow::{Context, Result};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Install a compact global subscriber.
///
/// `verbose` enables debug events for both crates. Otherwise `RUST_LOG` is
/// honoured, defaulting to `info`. Fails if a global subscriber is already set.
pub fn init_logging(verbose: bool) -> Result<()> {
    let filter = if verbose {
        EnvFilter::new("debug,siglab_core=debug,siglab_runner=debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(false).compact())
        .with(filter)
        .try_init()
        .context("a global tracing subscriber is already installed")
}
