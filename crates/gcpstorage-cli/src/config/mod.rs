//! CLI configuration management.
//!
//! ```text
//! Cli
//! ├── input: InputSource            # Request record (file or stdin)
//! └── storage: StorageConfig        # Credentials, descriptor, endpoint, timeout
//! ```
//!
//! All configuration can be provided via CLI arguments or environment variables.
//! Use `--help` to see all available options.
//!
//! # Example
//!
//! ```bash
//! # Read the request record from a file
//! gcpstorage --input request.json --credentials-file key.json
//!
//! # Or pipe it in, against a local fake GCS server
//! GCPSTORAGE_ENDPOINT=http://localhost:4443 gcpstorage < request.json
//! ```

mod input;
mod storage;

use std::process;

use anyhow::Context;
use clap::Parser;
pub use input::InputSource;
use serde::{Deserialize, Serialize};
pub use storage::StorageConfig;

use crate::{TRACING_TARGET_CONFIG, TRACING_TARGET_STARTUP};

/// Complete CLI configuration.
#[derive(Debug, Clone, Parser, Serialize, Deserialize)]
#[command(name = "gcpstorage")]
#[command(about = "Read, write or delete a Google Cloud Storage object")]
#[command(version)]
pub struct Cli {
    /// JSON record of activity inputs; `-` reads stdin.
    #[arg(short, long, default_value = "-")]
    pub input: InputSource,

    /// Storage connection and descriptor configuration.
    #[clap(flatten)]
    pub storage: StorageConfig,
}

impl Cli {
    /// Loads environment variables from .env file (if enabled) and parses CLI arguments.
    ///
    /// The .env file is loaded before clap parses arguments, so its values
    /// act as defaults for `env`-backed options.
    pub fn init() -> Self {
        Self::load_dotenv();
        Self::parse()
    }

    /// Loads environment variables from .env file if the dotenv feature is enabled.
    #[cfg(feature = "dotenv")]
    fn load_dotenv() {
        if let Err(err) = dotenvy::dotenv()
            && !err.not_found()
        {
            eprintln!("Warning: failed to load .env file: {err}");
        }
    }

    /// No-op when dotenv feature is disabled.
    #[cfg(not(feature = "dotenv"))]
    fn load_dotenv() {}

    /// Validates all configuration values.
    pub fn validate(&self) -> anyhow::Result<()> {
        self.storage
            .validate()
            .context("invalid storage configuration")?;
        Ok(())
    }

    /// Logs configuration (no credentials).
    pub fn log(&self) {
        Self::log_build_info();
        self.storage.log();

        tracing::debug!(
            target: TRACING_TARGET_CONFIG,
            input = %self.input,
            "Input source"
        );
    }

    /// Logs build information at debug level.
    fn log_build_info() {
        tracing::debug!(
            target: TRACING_TARGET_STARTUP,
            version = env!("CARGO_PKG_VERSION"),
            pid = process::id(),
            arch = std::env::consts::ARCH,
            os = std::env::consts::OS,
            features = ?Self::enabled_features(),
            "Build information"
        );
    }

    /// Returns a list of enabled compile-time features.
    fn enabled_features() -> Vec<&'static str> {
        [cfg!(feature = "dotenv").then_some("dotenv")]
            .into_iter()
            .flatten()
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let cli = Cli::try_parse_from(["gcpstorage"]).unwrap();
        assert!(matches!(cli.input, InputSource::Stdin));
        assert_eq!(cli.storage.timeout_secs, 30);
        assert!(cli.storage.endpoint.is_none());
        cli.validate().unwrap();
    }

    #[test]
    fn parses_flags() {
        let cli = Cli::try_parse_from([
            "gcpstorage",
            "--input",
            "request.json",
            "--endpoint",
            "http://localhost:4443",
            "--timeout-secs",
            "5",
        ])
        .unwrap();
        assert_eq!(cli.input.to_string(), "request.json");
        assert_eq!(cli.storage.endpoint.as_deref(), Some("http://localhost:4443"));
        assert_eq!(cli.storage.timeout_secs, 5);
    }

    #[test]
    fn rejects_out_of_range_timeout() {
        let cli = Cli::try_parse_from(["gcpstorage", "--timeout-secs", "301"]).unwrap();
        assert!(cli.validate().is_err());
    }
}
