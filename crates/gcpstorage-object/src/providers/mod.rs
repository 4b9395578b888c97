//! Client trait, service-account credentials and the GCS provider.

mod credentials;
mod gcs;
mod provider;

pub use credentials::ServiceAccountKey;
pub use gcs::{DEFAULT_GCS_ENDPOINT, GcsCredentials, GcsProvider};
pub use provider::Client;
