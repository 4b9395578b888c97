//! Convenience re-exports.

pub use crate::acl::{AclEntity, AclGrant, AclWriter, AclRole, GcsAclClient};
pub use crate::client::{GetOutput, ObjectStoreClient, PutOutput};
pub use crate::providers::{Client, GcsCredentials, GcsProvider, ServiceAccountKey};
pub use crate::types::{Error, ErrorKind};
