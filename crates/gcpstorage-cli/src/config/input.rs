//! Request record source.

use std::convert::Infallible;
use std::fmt;
use std::io::Read;
use std::path::PathBuf;
use std::str::FromStr;

use anyhow::Context;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Where the JSON record of activity inputs is read from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InputSource {
    /// Standard input.
    Stdin,
    /// A file on disk.
    File(PathBuf),
}

impl InputSource {
    /// Reads and parses the record. It must be a JSON object.
    pub fn read(&self) -> anyhow::Result<Map<String, Value>> {
        let text = match self {
            Self::Stdin => {
                let mut text = String::new();
                std::io::stdin()
                    .read_to_string(&mut text)
                    .context("failed to read request from stdin")?;
                text
            }
            Self::File(path) => std::fs::read_to_string(path)
                .with_context(|| format!("failed to read request from {}", path.display()))?,
        };

        parse_record(&text)
    }
}

/// Parses a request record.
pub fn parse_record(text: &str) -> anyhow::Result<Map<String, Value>> {
    match serde_json::from_str(text).context("request is not valid JSON")? {
        Value::Object(values) => Ok(values),
        _ => anyhow::bail!("request must be a JSON object of activity inputs"),
    }
}

impl FromStr for InputSource {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s {
            "-" => Self::Stdin,
            path => Self::File(PathBuf::from(path)),
        })
    }
}

impl fmt::Display for InputSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Stdin => f.write_str("-"),
            Self::File(path) => write!(f, "{}", path.display()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dash_means_stdin() {
        assert_eq!("-".parse::<InputSource>().unwrap(), InputSource::Stdin);
        assert_eq!(
            "req.json".parse::<InputSource>().unwrap(),
            InputSource::File(PathBuf::from("req.json"))
        );
    }

    #[test]
    fn record_must_be_an_object() {
        assert!(parse_record(r#"{"operation": "READ"}"#).is_ok());
        assert!(parse_record("[1, 2]").is_err());
        assert!(parse_record("not json").is_err());
    }
}
