//! Per-object access-control grants.
//!
//! A grant pairs an [`AclEntity`] (who) with an [`AclRole`] (what they may
//! do). [`AclWriter`] stores an object together with its grants in one
//! request; [`GcsAclClient`] is the Google Cloud Storage implementation.

use std::fmt;
use std::str::FromStr;

use bytes::Bytes;
use object_store::PutMode;
use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumString};

use crate::client::PutOutput;
use crate::types::Error;

mod gcs;

pub use gcs::GcsAclClient;

/// Access level granted on an object.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, AsRefStr, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "UPPERCASE", ascii_case_insensitive)]
#[serde(rename_all = "UPPERCASE")]
pub enum AclRole {
    /// May read the object and its metadata.
    Reader,
    /// May overwrite the object.
    Writer,
    /// Full control, including changing the ACL.
    Owner,
}

/// The principal an ACL grant applies to, in GCS entity notation.
///
/// Accepted forms are `allUsers`, `allAuthenticatedUsers` and
/// `{user,group,domain,project}-<id>`. A bare email address is shorthand
/// for `user-<email>`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct AclEntity(String);

impl AclEntity {
    const SPECIAL: [&'static str; 2] = ["allUsers", "allAuthenticatedUsers"];
    const PREFIXES: [&'static str; 4] = ["user-", "group-", "domain-", "project-"];

    /// Parse a principal identifier into an entity.
    pub fn parse(principal: &str) -> Result<Self, String> {
        let principal = principal.trim();
        if principal.is_empty() {
            return Err("ACL principal is empty".to_string());
        }

        if Self::SPECIAL.contains(&principal) {
            return Ok(Self(principal.to_string()));
        }

        if let Some(prefix) = Self::PREFIXES.iter().find(|p| principal.starts_with(*p)) {
            if principal.len() == prefix.len() {
                return Err(format!("ACL principal '{principal}' has no identifier"));
            }
            return Ok(Self(principal.to_string()));
        }

        if principal.contains('@') && !principal.contains(char::is_whitespace) {
            return Ok(Self(format!("user-{principal}")));
        }

        Err(format!("unrecognized ACL principal '{principal}'"))
    }

    /// The entity string as sent to the storage service.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl FromStr for AclEntity {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for AclEntity {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<AclEntity> for String {
    fn from(value: AclEntity) -> Self {
        value.0
    }
}

impl fmt::Display for AclEntity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A single (principal, role) grant.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AclGrant {
    /// Who receives the access.
    pub entity: AclEntity,
    /// The access level.
    pub role: AclRole,
}

impl AclGrant {
    /// Creates a new grant.
    pub fn new(entity: AclEntity, role: AclRole) -> Self {
        Self { entity, role }
    }
}

/// Writes objects with an initial ACL.
///
/// Content and grants are committed together: when the call fails, no
/// object is stored and an existing object is left unchanged.
#[async_trait::async_trait]
pub trait AclWriter: fmt::Debug + Send + Sync {
    /// Stores `data` at `object` under `mode`, granting each entry of `grants`.
    async fn put_with_acl(
        &self,
        object: &str,
        data: Bytes,
        mode: PutMode,
        content_type: Option<&str>,
        grants: &[AclGrant],
    ) -> Result<PutOutput, Error>;
}
