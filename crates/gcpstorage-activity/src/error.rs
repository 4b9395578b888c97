//! Activity error types.

use strum::{AsRefStr, IntoStaticStr};

/// Result type for activity operations.
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Categories of activity failures, reported to the host by name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, AsRefStr, IntoStaticStr)]
#[strum(serialize_all = "snake_case")]
pub enum ErrorKind {
    /// Credentials were malformed or rejected.
    Authentication,
    /// An input was missing, mistyped or structurally invalid.
    Validation,
    /// A create-only write found existing content.
    AlreadyExists,
    /// The operation selector is not one of `READ`, `WRITE`, `DELETE`.
    UnsupportedOperation,
    /// The activity descriptor could not be loaded.
    Configuration,
    /// The storage service reported a failure.
    Transport,
}

/// Errors returned by [`StorageObjectActivity`](crate::StorageObjectActivity).
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Credentials were malformed or rejected by the storage service.
    #[error("authentication failed: {0}")]
    Authentication(#[source] gcpstorage_object::Error),

    /// Input validation failed before any storage request was issued.
    #[error("invalid input: {0}")]
    Validation(String),

    /// The target object already holds content.
    #[error("object already exists: {0}")]
    AlreadyExists(String),

    /// The operation selector was not recognized.
    #[error("unsupported operation: {0}")]
    UnsupportedOperation(String),

    /// The activity descriptor is malformed.
    #[error("invalid activity metadata: {0}")]
    Configuration(String),

    /// Failure surfaced unmodified from the storage layer.
    #[error(transparent)]
    Transport(gcpstorage_object::Error),
}

impl Error {
    /// Creates a new validation error.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Creates a new configuration error.
    pub fn configuration(msg: impl Into<String>) -> Self {
        Self::Configuration(msg.into())
    }

    /// Returns the error kind.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Authentication(_) => ErrorKind::Authentication,
            Self::Validation(_) => ErrorKind::Validation,
            Self::AlreadyExists(_) => ErrorKind::AlreadyExists,
            Self::UnsupportedOperation(_) => ErrorKind::UnsupportedOperation,
            Self::Configuration(_) => ErrorKind::Configuration,
            Self::Transport(_) => ErrorKind::Transport,
        }
    }

    /// Returns the error kind as a string.
    pub fn kind_str(&self) -> &'static str {
        self.kind().into()
    }

    /// The underlying storage error, if any.
    pub fn storage_error(&self) -> Option<&gcpstorage_object::Error> {
        match self {
            Self::Authentication(e) | Self::Transport(e) => Some(e),
            _ => None,
        }
    }

    /// Whether the storage layer reported a missing object.
    pub fn is_not_found(&self) -> bool {
        self.storage_error().is_some_and(|e| e.is_not_found())
    }
}

impl From<gcpstorage_object::Error> for Error {
    fn from(err: gcpstorage_object::Error) -> Self {
        match err.kind() {
            gcpstorage_object::ErrorKind::Unauthenticated => Self::Authentication(err),
            _ => Self::Transport(err),
        }
    }
}
