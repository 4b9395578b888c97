//! Log output for the binary.
//!
//! Logs go to stderr so stdout carries only the invocation result. The
//! filter comes from `RUST_LOG` and defaults to `info`:
//!
//! ```bash
//! RUST_LOG=debug gcpstorage --input request.json
//! RUST_LOG=gcpstorage_object=trace gcpstorage --input request.json
//! ```

use anyhow::Context;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, fmt};

/// Installs the global subscriber.
pub(crate) fn init_tracing() -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new("info"))
        .context("Failed to create env filter")?;

    let stderr = fmt::layer()
        .with_target(true)
        .with_level(true)
        .with_writer(std::io::stderr);

    tracing_subscriber::registry()
        .with(stderr)
        .with(filter)
        .try_init()
        .context("Failed to initialize tracing")
}
