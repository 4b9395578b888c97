//! Object-store client backed by [`object_store::ObjectStore`].
//!
//! [`ObjectStoreClient`] is a thin, cloneable wrapper around
//! `Arc<dyn ObjectStore>` scoped to a single bucket. Every public method is
//! instrumented with [`tracing`].

use std::sync::Arc;

use bytes::Bytes;
use object_store::path::Path;
use object_store::{Attribute, ObjectMeta, ObjectStore, PutMode, PutOptions, PutPayload};

use crate::TRACING_TARGET;
use crate::types::Error;

mod output;

pub use output::{GetOutput, PutOutput};

/// Cloneable handle to an [`ObjectStore`] bucket.
///
/// All methods accept object names as plain strings (`/` separates path
/// segments) and convert them to [`object_store::path::Path`] internally.
#[derive(Clone, Debug)]
pub struct ObjectStoreClient(pub Arc<dyn ObjectStore>);

impl ObjectStoreClient {
    /// Wrap a concrete [`ObjectStore`] implementation.
    pub fn new(store: impl ObjectStore) -> Self {
        Self(Arc::new(store))
    }

    /// Wrap an already shared [`ObjectStore`].
    pub fn from_arc(store: Arc<dyn ObjectStore>) -> Self {
        Self(store)
    }

    /// Retrieve the raw bytes and metadata stored at `key`.
    ///
    /// The response body is fully consumed before returning.
    #[tracing::instrument(name = "object.get", skip(self))]
    pub async fn get(&self, key: &str) -> Result<GetOutput, Error> {
        let path = Path::from(key);
        let result = self.0.get(&path).await?;
        let meta = result.meta.clone();
        let data = result.bytes().await?;

        tracing::debug!(
            target: TRACING_TARGET,
            key,
            size = data.len(),
            "object read complete"
        );

        Ok(GetOutput { data, meta })
    }

    /// Retrieve the content stored at `key` as a UTF-8 string.
    pub async fn get_string(&self, key: &str) -> Result<String, Error> {
        self.get(key).await?.into_string()
    }

    /// Upload `data` to `key`, replacing any existing object.
    pub async fn put(
        &self,
        key: &str,
        data: Bytes,
        content_type: Option<&str>,
    ) -> Result<PutOutput, Error> {
        self.put_opts(key, data, PutMode::Overwrite, content_type)
            .await
    }

    /// Upload `data` to `key` with the specified [`PutMode`].
    ///
    /// [`PutMode::Create`] fails with an `already_exists` error when an
    /// object is present at `key`.
    #[tracing::instrument(name = "object.put_opts", skip(self, data), fields(size = data.len()))]
    pub async fn put_opts(
        &self,
        key: &str,
        data: Bytes,
        mode: PutMode,
        content_type: Option<&str>,
    ) -> Result<PutOutput, Error> {
        let path = Path::from(key);
        let payload = PutPayload::from(data);
        let mut opts = PutOptions {
            mode,
            ..Default::default()
        };
        if let Some(ct) = content_type {
            opts.attributes
                .insert(Attribute::ContentType, ct.to_string().into());
        }

        let result = self.0.put_opts(&path, payload, opts).await?;

        tracing::debug!(
            target: TRACING_TARGET,
            key,
            e_tag = ?result.e_tag,
            "object write complete"
        );

        Ok(result.into())
    }

    /// Get object metadata without downloading the body.
    #[tracing::instrument(name = "object.head", skip(self))]
    pub async fn head(&self, key: &str) -> Result<ObjectMeta, Error> {
        let path = Path::from(key);
        Ok(self.0.head(&path).await?)
    }

    /// Delete the object at `key`.
    #[tracing::instrument(name = "object.delete", skip(self))]
    pub async fn delete(&self, key: &str) -> Result<(), Error> {
        let path = Path::from(key);
        self.0.delete(&path).await?;

        tracing::debug!(target: TRACING_TARGET, key, "object deleted");
        Ok(())
    }
}
