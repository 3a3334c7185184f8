//! Snapshot codec for persisted and exported link collections.
//!
//! # Responsibility
//! - Encode the ordered group list as a JSON array of `{id, label, links}`.
//! - Decode untrusted text with strict shape validation.
//!
//! # Invariants
//! - Decoding never partially succeeds: any bad record rejects the payload.
//! - Decoded order equals array order.
//! - Decoded ids are unique.

use crate::model::link_group::{GroupId, LinkGroup};
use serde_json::Value;
use std::collections::HashSet;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Snapshot decoding error. Every variant means the payload is malformed.
#[derive(Debug)]
pub enum SnapshotError {
    /// Payload is not valid JSON.
    Parse(serde_json::Error),
    /// Payload is JSON but not an array of link group records.
    Shape {
        index: Option<usize>,
        message: String,
    },
    /// Two records share one id.
    DuplicateId(GroupId),
}

impl Display for SnapshotError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Parse(err) => write!(f, "snapshot is not valid JSON: {err}"),
            Self::Shape {
                index: Some(index),
                message,
            } => write!(f, "snapshot record {index} is invalid: {message}"),
            Self::Shape {
                index: None,
                message,
            } => write!(f, "snapshot is invalid: {message}"),
            Self::DuplicateId(id) => write!(f, "snapshot contains duplicate id `{id}`"),
        }
    }
}

impl Error for SnapshotError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Parse(err) => Some(err),
            Self::Shape { .. } => None,
            Self::DuplicateId(_) => None,
        }
    }
}

/// Encodes groups as compact JSON for the persistence key.
pub fn encode_snapshot(groups: &[LinkGroup]) -> Result<String, serde_json::Error> {
    serde_json::to_string(groups)
}

/// Encodes groups as two-space indented JSON for export files.
pub fn encode_snapshot_pretty(groups: &[LinkGroup]) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(groups)
}

/// Decodes a snapshot payload.
///
/// Extra fields on a record are ignored; missing or non-string
/// `id`/`label`/`links` fields reject the whole payload.
pub fn decode_snapshot(text: &str) -> Result<Vec<LinkGroup>, SnapshotError> {
    let value: Value = serde_json::from_str(text).map_err(SnapshotError::Parse)?;
    let items = match value {
        Value::Array(items) => items,
        other => {
            return Err(SnapshotError::Shape {
                index: None,
                message: format!("expected an array, found {}", json_kind(&other)),
            });
        }
    };

    let mut seen = HashSet::with_capacity(items.len());
    let mut groups = Vec::with_capacity(items.len());
    for (index, item) in items.into_iter().enumerate() {
        if !item.is_object() {
            return Err(SnapshotError::Shape {
                index: Some(index),
                message: format!("expected an object, found {}", json_kind(&item)),
            });
        }
        let group: LinkGroup =
            serde_json::from_value(item).map_err(|err| SnapshotError::Shape {
                index: Some(index),
                message: err.to_string(),
            })?;
        if !seen.insert(group.id.clone()) {
            return Err(SnapshotError::DuplicateId(group.id));
        }
        groups.push(group);
    }

    Ok(groups)
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
