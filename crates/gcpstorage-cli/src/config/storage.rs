//! Storage connection configuration.

use std::path::PathBuf;

use anyhow::{Context, Result as AnyhowResult, anyhow};
use clap::Args;
use gcpstorage_activity::{ActivityMetadata, GcsConnector};
use serde::{Deserialize, Serialize};

use crate::TRACING_TARGET_CONFIG;

/// Storage connection configuration.
///
/// # Environment Variables
///
/// - `GCPSTORAGE_CREDENTIALS_FILE` - Service-account key file
/// - `GCPSTORAGE_METADATA` - Activity descriptor file
/// - `GCPSTORAGE_ENDPOINT` - Storage endpoint override
/// - `GCPSTORAGE_TIMEOUT_SECS` - Request timeout in seconds (default: 30, max: 300)
#[derive(Debug, Clone, Args, Serialize, Deserialize)]
#[must_use = "config does nothing unless you use it"]
pub struct StorageConfig {
    /// Service-account key file, used when the request has no `jsonCredentials`.
    #[arg(long, env = "GCPSTORAGE_CREDENTIALS_FILE")]
    pub credentials_file: Option<PathBuf>,

    /// Activity descriptor file. Defaults to the embedded descriptor.
    #[arg(long, env = "GCPSTORAGE_METADATA")]
    pub metadata: Option<PathBuf>,

    /// Storage endpoint, e.g. a local fake GCS server.
    #[arg(long, env = "GCPSTORAGE_ENDPOINT")]
    pub endpoint: Option<String>,

    /// Per-request timeout in seconds. Valid range: 1-300 seconds.
    #[arg(long, env = "GCPSTORAGE_TIMEOUT_SECS", default_value_t = 30)]
    pub timeout_secs: u64,
}

impl StorageConfig {
    /// Validates all configuration values.
    pub fn validate(&self) -> AnyhowResult<()> {
        if self.timeout_secs == 0 || self.timeout_secs > 300 {
            return Err(anyhow!(
                "Timeout {} seconds is invalid. Must be between 1 and 300 seconds.",
                self.timeout_secs
            ));
        }

        if let Some(endpoint) = &self.endpoint
            && !(endpoint.starts_with("http://") || endpoint.starts_with("https://"))
        {
            return Err(anyhow!(
                "Endpoint '{endpoint}' is invalid. Must start with http:// or https://."
            ));
        }

        Ok(())
    }

    /// Loads the activity descriptor.
    pub fn load_metadata(&self) -> AnyhowResult<ActivityMetadata> {
        match &self.metadata {
            Some(path) => ActivityMetadata::from_path(path)
                .with_context(|| format!("failed to load descriptor {}", path.display())),
            None => ActivityMetadata::embedded().context("failed to load embedded descriptor"),
        }
    }

    /// Reads the key file, if one is configured.
    pub fn load_credentials(&self) -> AnyhowResult<Option<String>> {
        self.credentials_file
            .as_ref()
            .map(|path| {
                std::fs::read_to_string(path)
                    .with_context(|| format!("failed to read credentials {}", path.display()))
            })
            .transpose()
    }

    /// Builds the GCS connector.
    pub fn connector(&self) -> GcsConnector {
        let connector = GcsConnector::new().with_timeout_secs(self.timeout_secs);
        match &self.endpoint {
            Some(endpoint) => connector.with_endpoint(endpoint),
            None => connector,
        }
    }

    /// Logs configuration (file paths only, never their content).
    pub fn log(&self) {
        tracing::info!(
            target: TRACING_TARGET_CONFIG,
            credentials_file = ?self.credentials_file,
            metadata = ?self.metadata,
            endpoint = self.endpoint.as_deref().unwrap_or("default"),
            timeout_secs = self.timeout_secs,
            "Storage configured"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> StorageConfig {
        StorageConfig {
            credentials_file: None,
            metadata: None,
            endpoint: None,
            timeout_secs: 30,
        }
    }

    #[test]
    fn rejects_non_http_endpoint() {
        let mut config = config();
        config.endpoint = Some("localhost:4443".into());
        assert!(config.validate().is_err());

        config.endpoint = Some("http://localhost:4443".into());
        config.validate().unwrap();
    }

    #[test]
    fn embedded_metadata_is_default() {
        let metadata = config().load_metadata().unwrap();
        assert_eq!(metadata.name, "gcpstorage");
    }

    #[test]
    fn missing_credentials_file_fails() {
        let mut config = config();
        config.credentials_file = Some(PathBuf::from("/nonexistent/key.json"));
        assert!(config.load_credentials().is_err());
        assert!(self::config().load_credentials().unwrap().is_none());
    }
}
