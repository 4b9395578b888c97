//! Authenticated bucket handles.

use std::sync::Arc;

use bytes::Bytes;
use gcpstorage_object::acl::{AclGrant, AclWriter};
use gcpstorage_object::client::{ObjectStoreClient, PutOutput};
use gcpstorage_object::providers::{Client, GcsCredentials, GcsProvider};
use object_store::PutMode;

use crate::TRACING_TARGET;
use crate::error::{Error, Result};

/// Content type recorded on written objects.
const TEXT_CONTENT_TYPE: &str = "text/plain; charset=utf-8";

/// Builds an authenticated [`Bucket`] from credentials.
#[async_trait::async_trait]
pub trait Connector: Send + Sync {
    /// Authenticates with `credentials` and resolves `bucket`.
    ///
    /// Resolution is lazy: the bucket's existence is not checked.
    async fn connect(&self, credentials: &str, bucket: &str) -> Result<Bucket>;
}

/// A bucket resolved for one invocation.
#[derive(Debug, Clone)]
pub struct Bucket {
    name: String,
    objects: ObjectStoreClient,
    acl: Arc<dyn AclWriter>,
}

impl Bucket {
    /// Creates a bucket handle from its object and ACL clients.
    pub fn new(
        name: impl Into<String>,
        objects: ObjectStoreClient,
        acl: Arc<dyn AclWriter>,
    ) -> Self {
        Self {
            name: name.into(),
            objects,
            acl,
        }
    }

    /// Bucket name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Resolves an object handle. No request is issued.
    pub fn object<'a>(&'a self, name: &'a str) -> ObjectHandle<'a> {
        ObjectHandle { bucket: self, name }
    }
}

/// A named object within a [`Bucket`].
#[derive(Debug, Clone, Copy)]
pub struct ObjectHandle<'a> {
    bucket: &'a Bucket,
    name: &'a str,
}

impl ObjectHandle<'_> {
    /// Object name.
    pub fn name(&self) -> &str {
        self.name
    }

    /// Size of the object in bytes, or `None` if it does not exist.
    pub async fn size(&self) -> Result<Option<u64>> {
        match self.bucket.objects.head(self.name).await {
            Ok(meta) => Ok(Some(meta.size)),
            Err(e) if e.is_not_found() => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Reads the whole object as UTF-8 text.
    pub async fn read(&self) -> Result<String> {
        Ok(self.bucket.objects.get_string(self.name).await?)
    }

    /// Reads the object, treating a missing object as empty.
    pub async fn read_or_empty(&self) -> Result<String> {
        match self.read().await {
            Err(e) if e.is_not_found() => Ok(String::new()),
            other => other,
        }
    }

    /// Writes `content` with the given put mode, attaching `grants` in the
    /// same request. Without grants the object client is used directly.
    ///
    /// A create-only write onto an existing object is reported as
    /// [`Error::AlreadyExists`].
    pub async fn write(
        &self,
        content: String,
        mode: PutMode,
        grants: &[AclGrant],
    ) -> Result<PutOutput> {
        let data = Bytes::from(content);
        let content_type = Some(TEXT_CONTENT_TYPE);
        let written = if grants.is_empty() {
            self.bucket.objects.put_opts(self.name, data, mode, content_type).await
        } else {
            self.bucket
                .acl
                .put_with_acl(self.name, data, mode, content_type, grants)
                .await
        };

        match written {
            Ok(output) => Ok(output),
            Err(e) if e.kind() == gcpstorage_object::ErrorKind::AlreadyExists => {
                Err(Error::AlreadyExists(self.name.to_string()))
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Deletes the object.
    pub async fn delete(&self) -> Result<()> {
        Ok(self.bucket.objects.delete(self.name).await?)
    }
}

/// Connects to Google Cloud Storage.
#[derive(Debug, Clone, Default)]
pub struct GcsConnector {
    endpoint: Option<String>,
    timeout_secs: Option<u64>,
}

impl GcsConnector {
    /// Creates a connector for the public GCS endpoint.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets a custom storage endpoint (for fake GCS servers).
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = Some(endpoint.into());
        self
    }

    /// Sets the per-request timeout.
    pub fn with_timeout_secs(mut self, timeout_secs: u64) -> Self {
        self.timeout_secs = Some(timeout_secs);
        self
    }
}

#[async_trait::async_trait]
impl Connector for GcsConnector {
    async fn connect(&self, credentials: &str, bucket: &str) -> Result<Bucket> {
        let mut creds = GcsCredentials::new(bucket, credentials);
        if let Some(endpoint) = &self.endpoint {
            creds = creds.with_endpoint(endpoint);
        }
        if let Some(timeout_secs) = self.timeout_secs {
            creds = creds.with_timeout_secs(timeout_secs);
        }

        let (objects, acl) = GcsProvider::connect(&creds).await?.into_parts();

        tracing::debug!(
            target: TRACING_TARGET,
            bucket,
            provider = GcsProvider::ID,
            "bucket resolved"
        );

        Ok(Bucket::new(bucket, objects, Arc::new(acl)))
    }
}

#[cfg(test)]
mod tests {
    use gcpstorage_object::acl::{AclEntity, AclRole};
    use object_store::memory::InMemory;

    use super::*;
    use crate::mock::RecordingAclWriter;

    fn bucket_with(
        acl: impl Fn(ObjectStoreClient) -> RecordingAclWriter,
    ) -> (Bucket, Arc<RecordingAclWriter>) {
        let objects = ObjectStoreClient::new(InMemory::new());
        let acl = Arc::new(acl(objects.clone()));
        (Bucket::new("bucket", objects, acl.clone()), acl)
    }

    fn bucket() -> (Bucket, Arc<RecordingAclWriter>) {
        bucket_with(RecordingAclWriter::new)
    }

    fn public_read() -> AclGrant {
        AclGrant::new(AclEntity::parse("allUsers").unwrap(), AclRole::Reader)
    }

    #[tokio::test]
    async fn size_distinguishes_missing_and_empty() {
        let (bucket, _) = bucket();
        let object = bucket.object("a.txt");
        assert_eq!(object.size().await.unwrap(), None);

        object.write(String::new(), PutMode::Overwrite, &[]).await.unwrap();
        assert_eq!(object.size().await.unwrap(), Some(0));

        object.write("xyz".into(), PutMode::Overwrite, &[]).await.unwrap();
        assert_eq!(object.size().await.unwrap(), Some(3));
    }

    #[tokio::test]
    async fn create_onto_existing_is_already_exists() {
        let (bucket, _) = bucket();
        let object = bucket.object("a.txt");
        object.write("first".into(), PutMode::Create, &[]).await.unwrap();

        let err = object
            .write("second".into(), PutMode::Create, &[])
            .await
            .unwrap_err();
        assert!(matches!(err, Error::AlreadyExists(ref name) if name == "a.txt"));

        let err = object
            .write("third".into(), PutMode::Create, &[public_read()])
            .await
            .unwrap_err();
        assert!(matches!(err, Error::AlreadyExists(_)));
        assert_eq!(object.read().await.unwrap(), "first");
    }

    #[tokio::test]
    async fn read_or_empty_tolerates_missing() {
        let (bucket, _) = bucket();
        assert_eq!(bucket.object("nope").read_or_empty().await.unwrap(), "");
        assert!(bucket.object("nope").read().await.unwrap_err().is_not_found());
    }

    #[tokio::test]
    async fn empty_grants_bypass_the_acl_writer() {
        let (bucket, acl) = bucket_with(RecordingAclWriter::failing);
        let object = bucket.object("a.txt");
        object.write("x".into(), PutMode::Create, &[]).await.unwrap();
        assert_eq!(object.read().await.unwrap(), "x");
        assert!(acl.granted().is_empty());
    }

    #[tokio::test]
    async fn grants_are_committed_with_the_content() {
        let (bucket, acl) = bucket();
        let object = bucket.object("a.txt");
        object
            .write("x".into(), PutMode::Create, &[public_read()])
            .await
            .unwrap();

        assert_eq!(object.read().await.unwrap(), "x");
        assert_eq!(acl.granted(), vec![("a.txt".to_string(), public_read())]);
    }

    #[tokio::test]
    async fn rejected_grants_store_nothing() {
        let (bucket, acl) = bucket_with(RecordingAclWriter::failing);
        let object = bucket.object("a.txt");
        let err = object
            .write("x".into(), PutMode::Create, &[public_read()])
            .await
            .unwrap_err();

        assert_eq!(
            err.storage_error().map(|e| e.kind()),
            Some(gcpstorage_object::ErrorKind::PermissionDenied)
        );
        assert_eq!(object.size().await.unwrap(), None);
        assert!(acl.granted().is_empty());
    }

    #[tokio::test]
    async fn gcs_connector_rejects_malformed_credentials() {
        let err = GcsConnector::new()
            .connect("<<Private Key JSON Credentials", "bucket")
            .await
            .unwrap_err();
        assert_eq!(err.kind_str(), "authentication");
    }
}
