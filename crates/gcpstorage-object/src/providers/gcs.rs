//! Google Cloud Storage provider using [`object_store::gcp::GoogleCloudStorageBuilder`].

use std::time::Duration;

use derive_more::Deref;
use object_store::ClientOptions;
use object_store::gcp::GoogleCloudStorageBuilder;
use serde::{Deserialize, Serialize};

use super::{Client, ServiceAccountKey};
use crate::TRACING_TARGET;
use crate::acl::GcsAclClient;
use crate::client::ObjectStoreClient;
use crate::types::Error;

/// Public GCS endpoint.
pub const DEFAULT_GCS_ENDPOINT: &str = "https://storage.googleapis.com";

/// Typed credentials for Google Cloud Storage.
#[derive(Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GcsCredentials {
    /// GCS bucket name.
    pub bucket: String,
    /// Service-account key JSON document.
    pub service_account_key: String,
    /// Custom endpoint URL (for testing with a fake GCS server).
    #[serde(default)]
    pub endpoint: Option<String>,
    /// Per-request timeout in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

const fn default_timeout_secs() -> u64 {
    30
}

impl GcsCredentials {
    /// Creates credentials for `bucket` with the default endpoint and timeout.
    pub fn new(bucket: impl Into<String>, service_account_key: impl Into<String>) -> Self {
        Self {
            bucket: bucket.into(),
            service_account_key: service_account_key.into(),
            endpoint: None,
            timeout_secs: default_timeout_secs(),
        }
    }

    /// Sets the custom endpoint.
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = Some(endpoint.into());
        self
    }

    /// Sets the per-request timeout.
    pub fn with_timeout_secs(mut self, timeout_secs: u64) -> Self {
        self.timeout_secs = timeout_secs;
        self
    }

    /// Effective endpoint, falling back to the public GCS endpoint.
    pub fn endpoint(&self) -> &str {
        self.endpoint.as_deref().unwrap_or(DEFAULT_GCS_ENDPOINT)
    }

    /// Per-request timeout.
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl std::fmt::Debug for GcsCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GcsCredentials")
            .field("bucket", &self.bucket)
            .field("endpoint", &self.endpoint)
            .field("timeout_secs", &self.timeout_secs)
            .finish_non_exhaustive()
    }
}

/// Google Cloud Storage-backed object client plus its ACL client.
#[derive(Debug, Deref)]
pub struct GcsProvider {
    #[deref]
    objects: ObjectStoreClient,
    acl: GcsAclClient,
}

impl GcsProvider {
    /// Splits the provider into its object and ACL clients.
    pub fn into_parts(self) -> (ObjectStoreClient, GcsAclClient) {
        (self.objects, self.acl)
    }
}

#[async_trait::async_trait]
impl Client for GcsProvider {
    type Credentials = GcsCredentials;

    const ID: &'static str = "gcs";

    async fn connect(creds: &Self::Credentials) -> Result<Self, Error> {
        let key = ServiceAccountKey::from_json(&creds.service_account_key)?;
        let key_json = key.to_json(creds.endpoint.as_deref())?;

        let mut options = ClientOptions::new().with_timeout(creds.timeout());
        if creds.endpoint().starts_with("http://") {
            options = options.with_allow_http(true);
        }

        // The builder decodes the private key; other settings are already checked.
        let store = GoogleCloudStorageBuilder::new()
            .with_bucket_name(&creds.bucket)
            .with_service_account_key(key_json)
            .with_client_options(options)
            .build()
            .map_err(|e| Error::unauthenticated(e.to_string(), Self::ID).with_source(e))?;

        let acl = GcsAclClient::new(&creds.bucket, key, creds.endpoint(), creds.timeout())?;

        tracing::debug!(
            target: TRACING_TARGET,
            bucket = %creds.bucket,
            endpoint = %creds.endpoint(),
            "gcs client created"
        );

        Ok(Self {
            objects: ObjectStoreClient::new(store),
            acl,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn credentials_defaults() {
        let creds = GcsCredentials::new("bucket", "{}");
        assert_eq!(creds.endpoint(), DEFAULT_GCS_ENDPOINT);
        assert_eq!(creds.timeout(), Duration::from_secs(30));
    }

    #[test]
    fn credentials_deserialize_camel_case() {
        let creds: GcsCredentials = serde_json::from_str(
            r#"{"bucket": "b", "serviceAccountKey": "{}", "endpoint": "http://localhost:4443"}"#,
        )
        .unwrap();
        assert_eq!(creds.endpoint(), "http://localhost:4443");
        assert_eq!(creds.timeout_secs, 30);
    }

    #[tokio::test]
    async fn connect_rejects_malformed_key() {
        let creds = GcsCredentials::new("bucket", "not json");
        let err = GcsProvider::connect(&creds).await.unwrap_err();
        assert_eq!(err.kind(), crate::ErrorKind::Unauthenticated);
    }
}
