#![forbid(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]
#![doc = include_str!("../README.md")]

mod activity;
pub mod connector;
mod error;
mod grants;
pub mod input;
pub mod metadata;
#[cfg(any(test, feature = "test-utils"))]
#[cfg_attr(docsrs, doc(cfg(feature = "test-utils")))]
pub mod mock;
#[doc(hidden)]
pub mod prelude;
mod write_mode;

pub use activity::{ActivityOutput, StorageObjectActivity};
pub use connector::{Bucket, Connector, GcsConnector, ObjectHandle};
pub use error::{Error, ErrorKind, Result};
pub use grants::parse_acl;
pub use input::{ActivityInput, Operation};
pub use metadata::ActivityMetadata;
#[cfg(any(test, feature = "test-utils"))]
#[cfg_attr(docsrs, doc(cfg(feature = "test-utils")))]
pub use mock::{MemoryConnector, RecordingAclWriter};
pub use write_mode::WriteMode;

/// Tracing target for activity invocations.
pub const TRACING_TARGET: &str = "gcpstorage_activity";
