//! Typed invocation inputs.

use gcpstorage_object::acl::AclGrant;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use strum::{AsRefStr, Display, EnumString};

use crate::TRACING_TARGET;
use crate::error::{Error, Result};
use crate::grants::parse_acl;
use crate::metadata::ActivityMetadata;
use crate::write_mode::WriteMode;

/// Input and output names bound by the host.
pub mod names {
    /// Service-account key JSON.
    pub const JSON_CREDENTIALS: &str = "jsonCredentials";
    /// Bucket name.
    pub const BUCKET_NAME: &str = "bucketName";
    /// Operation selector.
    pub const OPERATION: &str = "operation";
    /// Object name, `/`-separated.
    pub const OBJECT_NAME: &str = "objectName";
    /// Content to write.
    pub const OBJECT_CONTENT: &str = "objectContent";
    /// Enumerated write mode.
    pub const WRITE_OPTION: &str = "writeOption";
    /// Boolean write mode: replace existing content.
    pub const OVERWRITE: &str = "overwrite";
    /// Boolean write mode: append to existing content.
    pub const APPEND: &str = "append";
    /// ACL grants applied on write.
    pub const ACL: &str = "acl";
    /// Content read by `READ`.
    pub const OUTPUT: &str = "output";

    /// Inputs every descriptor must declare as required.
    pub const REQUIRED: [&str; 4] = [JSON_CREDENTIALS, BUCKET_NAME, OPERATION, OBJECT_NAME];
}

/// Operation selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, AsRefStr, Display, EnumString, Serialize, Deserialize)]
#[strum(serialize_all = "UPPERCASE", ascii_case_insensitive)]
#[serde(rename_all = "UPPERCASE")]
pub enum Operation {
    /// Fetch the object's content.
    Read,
    /// Store content according to a [`WriteMode`].
    Write,
    /// Remove the object.
    Delete,
}

impl Operation {
    /// Parses an operation selector, case-insensitively.
    pub fn parse(selector: &str) -> Result<Self> {
        selector
            .trim()
            .parse()
            .map_err(|_| Error::UnsupportedOperation(selector.to_string()))
    }
}

/// A validated invocation input.
#[derive(Clone, PartialEq)]
pub struct ActivityInput {
    /// Service-account key JSON.
    pub credentials: String,
    /// Bucket name.
    pub bucket: String,
    /// Operation to perform.
    pub operation: Operation,
    /// Object name, `/`-separated.
    pub object: String,
    /// Content to write. Ignored unless writing.
    pub content: String,
    /// Write policy. Ignored unless writing.
    pub write_mode: WriteMode,
    /// Grants applied after a successful write.
    pub acl: Vec<AclGrant>,
}

impl std::fmt::Debug for ActivityInput {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ActivityInput")
            .field("bucket", &self.bucket)
            .field("operation", &self.operation)
            .field("object", &self.object)
            .field("content_len", &self.content.len())
            .field("write_mode", &self.write_mode)
            .field("acl", &self.acl)
            .finish_non_exhaustive()
    }
}

impl ActivityInput {
    /// Creates an input for `operation` on `bucket`/`object`.
    pub fn new(
        credentials: impl Into<String>,
        bucket: impl Into<String>,
        operation: Operation,
        object: impl Into<String>,
    ) -> Self {
        Self {
            credentials: credentials.into(),
            bucket: bucket.into(),
            operation,
            object: object.into(),
            content: String::new(),
            write_mode: WriteMode::default(),
            acl: Vec::new(),
        }
    }

    /// Sets the content to write.
    pub fn with_content(mut self, content: impl Into<String>) -> Self {
        self.content = content.into();
        self
    }

    /// Sets the write policy.
    pub fn with_write_mode(mut self, write_mode: WriteMode) -> Self {
        self.write_mode = write_mode;
        self
    }

    /// Sets the grants applied after writing.
    pub fn with_acl(mut self, acl: Vec<AclGrant>) -> Self {
        self.acl = acl;
        self
    }

    /// Validates raw host inputs and converts them.
    ///
    /// Every check runs before any storage request is issued.
    pub fn from_values(metadata: &ActivityMetadata, values: &Map<String, Value>) -> Result<Self> {
        metadata.validate(values)?;

        let operation = Operation::parse(&required_str(values, names::OPERATION)?)?;
        let mut input = Self::new(
            required_str(values, names::JSON_CREDENTIALS)?,
            required_str(values, names::BUCKET_NAME)?.trim(),
            operation,
            required_str(values, names::OBJECT_NAME)?,
        );

        if operation != Operation::Write {
            let ignored: Vec<_> = [
                names::OBJECT_CONTENT,
                names::WRITE_OPTION,
                names::OVERWRITE,
                names::APPEND,
                names::ACL,
            ]
            .into_iter()
            .filter(|name| present(values, name).is_some())
            .collect();

            if !ignored.is_empty() {
                tracing::debug!(
                    target: TRACING_TARGET,
                    %operation,
                    ignored = ?ignored,
                    "write inputs ignored"
                );
            }
            return Ok(input);
        }

        input.content = content(values)?;
        input.write_mode = write_mode(values)?;
        input.acl = match present(values, names::ACL) {
            Some(value) => parse_acl(value)?,
            None => Vec::new(),
        };

        Ok(input)
    }
}

fn present<'a>(values: &'a Map<String, Value>, name: &str) -> Option<&'a Value> {
    values.get(name).filter(|v| !v.is_null())
}

fn required_str(values: &Map<String, Value>, name: &str) -> Result<String> {
    match present(values, name) {
        Some(Value::String(text)) if !text.trim().is_empty() => Ok(text.clone()),
        Some(Value::String(_)) => Err(Error::validation(format!(
            "input '{name}' must not be empty"
        ))),
        Some(_) => Err(Error::validation(format!("input '{name}' must be a string"))),
        None => Err(Error::validation(format!("missing required input '{name}'"))),
    }
}

fn optional_bool(values: &Map<String, Value>, name: &str) -> Result<Option<bool>> {
    match present(values, name) {
        None => Ok(None),
        Some(Value::Bool(flag)) => Ok(Some(*flag)),
        Some(_) => Err(Error::validation(format!("input '{name}' must be a boolean"))),
    }
}

/// Stringifies scalar content; `null` or absent content is empty.
fn content(values: &Map<String, Value>) -> Result<String> {
    match present(values, names::OBJECT_CONTENT) {
        None => Ok(String::new()),
        Some(Value::String(text)) => Ok(text.clone()),
        Some(Value::Number(number)) => Ok(number.to_string()),
        Some(Value::Bool(flag)) => Ok(flag.to_string()),
        Some(_) => Err(Error::validation(format!(
            "input '{}' must be a string, number or boolean",
            names::OBJECT_CONTENT
        ))),
    }
}

/// Resolves the write policy from either the enumerated or the boolean
/// contract. Supplying both is an error; supplying neither means `NEW`.
fn write_mode(values: &Map<String, Value>) -> Result<WriteMode> {
    let option = match present(values, names::WRITE_OPTION) {
        None => None,
        Some(Value::String(text)) => Some(text.as_str()),
        Some(_) => {
            return Err(Error::validation(format!(
                "input '{}' must be a string",
                names::WRITE_OPTION
            )));
        }
    };
    let overwrite = optional_bool(values, names::OVERWRITE)?;
    let append = optional_bool(values, names::APPEND)?;

    match (option, overwrite, append) {
        (Some(_), Some(_), _) | (Some(_), _, Some(_)) => Err(Error::validation(format!(
            "'{}' cannot be combined with '{}' or '{}'",
            names::WRITE_OPTION,
            names::OVERWRITE,
            names::APPEND
        ))),
        (Some(option), None, None) => option
            .trim()
            .parse()
            .map_err(|_| Error::validation(format!("unsupported write option '{option}'"))),
        (None, overwrite, append) => Ok(WriteMode::from_flags(
            overwrite.unwrap_or(false),
            append.unwrap_or(false),
        )),
    }
}
