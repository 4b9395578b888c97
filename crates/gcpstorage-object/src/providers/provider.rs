//! Client trait for creating authenticated storage connections.

use serde::de::DeserializeOwned;

use crate::types::Error;

/// Factory for creating authenticated connections to a storage service.
///
/// Implementations handle credential validation and client construction for
/// a specific provider. Construction is lazy: no request is issued until the
/// first operation runs.
#[async_trait::async_trait]
pub trait Client: Sized + Send + Sync + 'static {
    /// Strongly-typed credentials for this provider.
    type Credentials: DeserializeOwned + Send + Sync;

    /// Unique identifier (e.g. "gcs").
    const ID: &'static str;

    /// Create a connected client instance.
    async fn connect(creds: &Self::Credentials) -> Result<Self, Error>;
}
