//! Commonly used items from gcpstorage-activity.
//!
//! # Usage
//!
//! ```rust,ignore
//! use gcpstorage_activity::prelude::*;
//! ```

// Activity and its inputs
pub use crate::activity::{ActivityOutput, StorageObjectActivity};
pub use crate::input::{ActivityInput, Operation};
pub use crate::metadata::ActivityMetadata;
pub use crate::write_mode::WriteMode;
// Connectors
pub use crate::connector::{Connector, GcsConnector};
// In-memory connector (test-utils feature)
#[cfg(feature = "test-utils")]
#[cfg_attr(docsrs, doc(cfg(feature = "test-utils")))]
pub use crate::mock::MemoryConnector;
pub use crate::{Error, ErrorKind, Result};
