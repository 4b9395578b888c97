//! Results of object reads and writes.

use bytes::Bytes;
use object_store::{ObjectMeta, PutResult};

use crate::types::Error;

/// A fully downloaded object.
#[derive(Debug, Clone)]
pub struct GetOutput {
    /// Object body.
    pub data: Bytes,
    /// Location, size and entity tag reported with the body.
    pub meta: ObjectMeta,
}

impl GetOutput {
    /// Decodes the body as UTF-8.
    pub fn into_string(self) -> Result<String, Error> {
        let location = self.meta.location;
        String::from_utf8(self.data.to_vec()).map_err(|e| {
            Error::invalid_data(format!("{location}: {e}"), "object-store").with_source(e)
        })
    }
}

/// Identity of a committed write.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PutOutput {
    /// Entity tag of the stored content.
    pub e_tag: Option<String>,
    /// Object generation (GCS) or backend version.
    pub generation: Option<String>,
}

impl From<PutResult> for PutOutput {
    fn from(result: PutResult) -> Self {
        Self {
            e_tag: result.e_tag,
            generation: result.version,
        }
    }
}
