//! Shared types for object-store and ACL operations.

pub mod error;

pub use error::{Error, ErrorKind};
