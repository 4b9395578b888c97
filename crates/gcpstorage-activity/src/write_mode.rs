//! Write policies.

use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumString};

/// Whether a write may create, must overwrite, or appends to existing
/// object content.
#[derive(
    Debug, Default, Clone, Copy, PartialEq, Eq, AsRefStr, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "UPPERCASE", ascii_case_insensitive)]
#[serde(rename_all = "UPPERCASE")]
pub enum WriteMode {
    /// Create the object; fail if it already holds content.
    #[default]
    New,
    /// Replace any existing content.
    Overwrite,
    /// Concatenate the new content onto the existing content.
    Append,
}

impl WriteMode {
    /// Maps the boolean `overwrite`/`append` contract onto a write mode.
    ///
    /// `append` only takes effect together with `overwrite`.
    pub fn from_flags(overwrite: bool, append: bool) -> Self {
        match (overwrite, append) {
            (false, _) => Self::New,
            (true, false) => Self::Overwrite,
            (true, true) => Self::Append,
        }
    }
}
