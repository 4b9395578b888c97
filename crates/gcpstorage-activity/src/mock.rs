//! In-memory connector and ACL writer for tests.
//!
//! # Feature Flag
//!
//! This module is only available when the `test-utils` feature is enabled:
//!
//! ```toml
//! [dev-dependencies]
//! gcpstorage-activity = { version = "...", features = ["test-utils"] }
//! ```
//!
//! # Example
//!
//! ```rust,ignore
//! use gcpstorage_activity::{ActivityMetadata, MemoryConnector, StorageObjectActivity};
//!
//! let connector = MemoryConnector::new();
//! let activity = StorageObjectActivity::new(ActivityMetadata::embedded()?, connector.clone());
//! ```

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

use bytes::Bytes;
use gcpstorage_object::acl::{AclGrant, AclWriter};
use gcpstorage_object::client::{ObjectStoreClient, PutOutput};
use gcpstorage_object::providers::ServiceAccountKey;
use gcpstorage_object::{Error as StorageError, ErrorKind as StorageErrorKind};
use object_store::PutMode;
use object_store::memory::InMemory;

use crate::connector::{Bucket, Connector};
use crate::error::Result;

type GrantLog = Arc<Mutex<Vec<(String, AclGrant)>>>;

/// A [`Connector`] backed by per-bucket in-memory stores.
///
/// Credentials are still parsed as a service-account key, so malformed
/// keys fail the same way they do against GCS. Clones share state.
#[derive(Debug, Clone, Default)]
pub struct MemoryConnector {
    buckets: Arc<Mutex<HashMap<String, Arc<InMemory>>>>,
    granted: GrantLog,
    fail_acl: bool,
}

impl MemoryConnector {
    /// Creates a connector with no buckets.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a connector whose ACL writer rejects every write that
    /// carries grants. Clones share buckets with `self`.
    pub fn with_failing_acl(&self) -> Self {
        Self {
            fail_acl: true,
            ..self.clone()
        }
    }

    /// Direct access to a bucket's objects, created on first use.
    pub fn objects(&self, bucket: &str) -> ObjectStoreClient {
        ObjectStoreClient::from_arc(self.store(bucket))
    }

    /// Grants committed so far across all buckets, as `(object, grant)`
    /// pairs in call order.
    pub fn granted(&self) -> Vec<(String, AclGrant)> {
        self.granted
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn store(&self, bucket: &str) -> Arc<InMemory> {
        let mut buckets = self.buckets.lock().unwrap_or_else(PoisonError::into_inner);
        buckets
            .entry(bucket.to_string())
            .or_insert_with(|| Arc::new(InMemory::new()))
            .clone()
    }
}

#[async_trait::async_trait]
impl Connector for MemoryConnector {
    async fn connect(&self, credentials: &str, bucket: &str) -> Result<Bucket> {
        ServiceAccountKey::from_json(credentials)?;

        let objects = self.objects(bucket);
        let acl = RecordingAclWriter {
            objects: objects.clone(),
            granted: self.granted.clone(),
            fail: self.fail_acl,
        };
        Ok(Bucket::new(bucket, objects, Arc::new(acl)))
    }
}

/// An [`AclWriter`] that stores content in memory and records the grants
/// committed with it.
#[derive(Debug)]
pub struct RecordingAclWriter {
    objects: ObjectStoreClient,
    granted: GrantLog,
    fail: bool,
}

impl RecordingAclWriter {
    /// Creates a writer over `objects`.
    pub fn new(objects: ObjectStoreClient) -> Self {
        Self {
            objects,
            granted: GrantLog::default(),
            fail: false,
        }
    }

    /// Creates a writer that rejects every write with `permission_denied`
    /// and stores nothing.
    pub fn failing(objects: ObjectStoreClient) -> Self {
        Self {
            fail: true,
            ..Self::new(objects)
        }
    }

    /// Grants committed so far, as `(object, grant)` pairs in call order.
    pub fn granted(&self) -> Vec<(String, AclGrant)> {
        self.granted
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

#[async_trait::async_trait]
impl AclWriter for RecordingAclWriter {
    async fn put_with_acl(
        &self,
        object: &str,
        data: Bytes,
        mode: PutMode,
        content_type: Option<&str>,
        grants: &[AclGrant],
    ) -> Result<PutOutput, StorageError> {
        if self.fail {
            return Err(StorageError::new(
                StorageErrorKind::PermissionDenied,
                format!("acl on {object} denied"),
                "mock-acl",
            ));
        }

        let output = self.objects.put_opts(object, data, mode, content_type).await?;

        let mut granted = self.granted.lock().unwrap_or_else(PoisonError::into_inner);
        granted.extend(grants.iter().map(|grant| (object.to_string(), grant.clone())));
        Ok(output)
    }
}
