//! Error type for object-store and ACL operations.

use std::fmt;

use strum::{AsRefStr, IntoStaticStr};

type BoxedError = Box<dyn std::error::Error + Send + Sync>;

/// Categories of storage failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, AsRefStr, IntoStaticStr)]
#[strum(serialize_all = "snake_case")]
pub enum ErrorKind {
    /// The object or bucket does not exist.
    NotFound,
    /// The caller is authenticated but not allowed to perform the operation.
    PermissionDenied,
    /// Credentials were malformed or rejected by the service.
    Unauthenticated,
    /// A create-only write found an existing object.
    AlreadyExists,
    /// A conditional request did not match the current object state.
    Precondition,
    /// The payload could not be decoded (e.g. non UTF-8 content).
    InvalidData,
    /// The client could not be built or the service could not be reached.
    Connection,
    /// Anything else reported by the storage service.
    Other,
}

/// A storage error carrying a kind, a message, an optional source and a
/// retryable flag.
#[derive(thiserror::Error)]
#[error("[{label}] {message}")]
pub struct Error {
    kind: ErrorKind,
    label: &'static str,
    message: String,
    retryable: bool,
    #[source]
    source: Option<BoxedError>,
}

impl Error {
    /// Create an error of the given kind formatted as `[{label}] {msg}`.
    pub fn new(kind: ErrorKind, msg: impl fmt::Display, label: &'static str) -> Self {
        let retryable = matches!(kind, ErrorKind::Connection | ErrorKind::Other);
        Self {
            kind,
            label,
            message: msg.to_string(),
            retryable,
            source: None,
        }
    }

    /// Create a connection error, used when a client cannot be built.
    pub fn connection(msg: impl fmt::Display, label: &'static str, retryable: bool) -> Self {
        Self::new(ErrorKind::Connection, msg, label).with_retryable(retryable)
    }

    /// Create an error for credentials that were malformed or rejected.
    pub fn unauthenticated(msg: impl fmt::Display, label: &'static str) -> Self {
        Self::new(ErrorKind::Unauthenticated, msg, label)
    }

    /// Create an error for payloads that could not be decoded.
    pub fn invalid_data(msg: impl fmt::Display, label: &'static str) -> Self {
        Self::new(ErrorKind::InvalidData, msg, label)
    }

    /// Attach a source error.
    pub fn with_source(mut self, source: impl std::error::Error + Send + Sync + 'static) -> Self {
        self.source = Some(Box::new(source));
        self
    }

    /// Override the retryable flag.
    pub fn with_retryable(mut self, retryable: bool) -> Self {
        self.retryable = retryable;
        self
    }

    /// Returns the error kind.
    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    /// Returns the error kind as a string.
    pub fn kind_str(&self) -> &'static str {
        self.kind.into()
    }

    /// Whether the object was missing.
    pub fn is_not_found(&self) -> bool {
        self.kind == ErrorKind::NotFound
    }

    /// Whether the caller should retry this operation.
    pub fn is_retryable(&self) -> bool {
        self.retryable
    }
}

impl fmt::Debug for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Error")
            .field("kind", &self.kind)
            .field("message", &self.message)
            .field("retryable", &self.retryable)
            .field("source", &self.source)
            .finish()
    }
}

impl From<object_store::Error> for Error {
    fn from(err: object_store::Error) -> Self {
        use object_store::Error as E;

        let kind = match &err {
            E::NotFound { .. } => ErrorKind::NotFound,
            E::PermissionDenied { .. } => ErrorKind::PermissionDenied,
            E::Unauthenticated { .. } => ErrorKind::Unauthenticated,
            E::AlreadyExists { .. } => ErrorKind::AlreadyExists,
            E::Precondition { .. } | E::NotModified { .. } => ErrorKind::Precondition,
            _ => ErrorKind::Other,
        };

        Self::new(kind, &err, "object-store").with_source(err)
    }
}

impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        let kind = match err.status().map(|s| s.as_u16()) {
            Some(401) => ErrorKind::Unauthenticated,
            Some(403) => ErrorKind::PermissionDenied,
            Some(404) => ErrorKind::NotFound,
            Some(409) => ErrorKind::AlreadyExists,
            Some(412) => ErrorKind::Precondition,
            Some(_) => ErrorKind::Other,
            None if err.is_connect() || err.is_timeout() => ErrorKind::Connection,
            None if err.is_decode() => ErrorKind::InvalidData,
            None => ErrorKind::Other,
        };

        Self::new(kind, &err, "gcs-json").with_source(err)
    }
}
