//! Conversion of the `acl` input into ACL grants.
//!
//! Two shapes are accepted. The flat mapping pairs `user<N>` with `role<N>`:
//!
//! ```json
//! {"user1": "alice@example.com", "role1": "READER", "user2": "allUsers", "role2": "READER"}
//! ```
//!
//! The list form carries the pairs directly:
//!
//! ```json
//! [{"entity": "alice@example.com", "role": "READER"}]
//! ```
//!
//! A JSON document holding either shape may also be passed as a string.

use std::collections::BTreeMap;

use gcpstorage_object::acl::{AclEntity, AclGrant, AclRole};
use serde::Deserialize;
use serde_json::{Map, Value};

use crate::error::{Error, Result};

const USER_PREFIX: &str = "user";
const ROLE_PREFIX: &str = "role";

#[derive(Deserialize)]
struct GrantEntry {
    #[serde(alias = "principal", alias = "user")]
    entity: String,
    role: String,
}

#[derive(Default)]
struct Pair {
    user: Option<String>,
    role: Option<String>,
}

/// Parses an `acl` input value into an ordered list of grants.
///
/// `null` and empty collections yield no grants.
pub fn parse_acl(value: &Value) -> Result<Vec<AclGrant>> {
    match value {
        Value::Null => Ok(Vec::new()),
        Value::Object(map) => parse_mapping(map),
        Value::Array(items) => parse_list(items),
        Value::String(text) if text.trim().is_empty() => Ok(Vec::new()),
        Value::String(text) => match serde_json::from_str::<Value>(text) {
            Ok(inner @ (Value::Object(_) | Value::Array(_))) => parse_acl(&inner),
            _ => Err(Error::validation(
                "acl must be a mapping or a list of grants",
            )),
        },
        _ => Err(Error::validation(
            "acl must be a mapping or a list of grants",
        )),
    }
}

fn parse_mapping(map: &Map<String, Value>) -> Result<Vec<AclGrant>> {
    let mut pairs: BTreeMap<u32, Pair> = BTreeMap::new();

    for (key, value) in map {
        let Some(text) = value.as_str() else {
            return Err(Error::validation(format!("acl entry '{key}' must be a string")));
        };

        let (is_user, suffix) = if let Some(suffix) = key.strip_prefix(USER_PREFIX) {
            (true, suffix)
        } else if let Some(suffix) = key.strip_prefix(ROLE_PREFIX) {
            (false, suffix)
        } else {
            return Err(Error::validation(format!(
                "unrecognized acl key '{key}', expected user<N> or role<N>"
            )));
        };

        let index = Some(suffix)
            .filter(|s| !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit()))
            .and_then(|s| s.parse::<u32>().ok())
            .ok_or_else(|| {
                Error::validation(format!(
                    "acl key '{key}' must end with a number, e.g. {USER_PREFIX}1"
                ))
            })?;

        let pair = pairs.entry(index).or_default();
        let slot = if is_user { &mut pair.user } else { &mut pair.role };
        if slot.replace(text.to_string()).is_some() {
            return Err(Error::validation(format!(
                "acl key '{key}' duplicates index {index}"
            )));
        }
    }

    pairs
        .into_iter()
        .map(|(index, pair)| match (pair.user, pair.role) {
            (Some(user), Some(role)) => grant(&user, &role),
            (Some(_), None) => Err(Error::validation(format!(
                "acl {USER_PREFIX}{index} has no matching {ROLE_PREFIX}{index}"
            ))),
            (None, _) => Err(Error::validation(format!(
                "acl {ROLE_PREFIX}{index} has no matching {USER_PREFIX}{index}"
            ))),
        })
        .collect()
}

fn parse_list(items: &[Value]) -> Result<Vec<AclGrant>> {
    items
        .iter()
        .enumerate()
        .map(|(position, item)| {
            let entry = GrantEntry::deserialize(item).map_err(|e| {
                Error::validation(format!("acl entry {position} is invalid: {e}"))
            })?;
            grant(&entry.entity, &entry.role)
        })
        .collect()
}

fn grant(principal: &str, role: &str) -> Result<AclGrant> {
    let entity = AclEntity::parse(principal).map_err(Error::validation)?;
    let role: AclRole = role.trim().parse().map_err(|_| {
        Error::validation(format!(
            "unsupported acl role '{role}', expected READER, WRITER or OWNER"
        ))
    })?;
    Ok(AclGrant::new(entity, role))
}
