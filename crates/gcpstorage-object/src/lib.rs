#![forbid(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]
#![doc = include_str!("../README.md")]

/// ACL grant types and the GCS ACL client.
pub mod acl;
pub mod client;
/// Client trait, credentials and the GCS provider.
pub mod providers;
/// Error types.
pub mod types;

#[doc(hidden)]
pub mod prelude;

pub use types::{Error, ErrorKind};

/// Tracing target for object and ACL operations.
pub const TRACING_TARGET: &str = "gcpstorage_object";
