//! Export file naming and file-level import/export errors.
//!
//! # Responsibility
//! - Name export files with an embedded, filesystem-safe UTC timestamp.
//! - Describe failures crossing the file boundary.

use crate::store::StoreError;
use chrono::{DateTime, SecondsFormat, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use std::error::Error;
use std::fmt::{Display, Formatter};

const EXPORT_FILE_PREFIX: &str = "link_manager_data_";
const EXPORT_FILE_EXTENSION: &str = "json";

static UNSAFE_TIMESTAMP_CHARS_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[:.]").expect("valid timestamp separator regex"));

/// Error for file-level import/export operations.
#[derive(Debug)]
pub enum ExportError {
    Io(std::io::Error),
    Serialize(serde_json::Error),
    Store(StoreError),
}

impl Display for ExportError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io(err) => write!(f, "snapshot file i/o failed: {err}"),
            Self::Serialize(err) => write!(f, "snapshot serialization failed: {err}"),
            Self::Store(err) => write!(f, "{err}"),
        }
    }
}

impl Error for ExportError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io(err) => Some(err),
            Self::Serialize(err) => Some(err),
            Self::Store(err) => Some(err),
        }
    }
}

impl From<std::io::Error> for ExportError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

impl From<serde_json::Error> for ExportError {
    fn from(value: serde_json::Error) -> Self {
        Self::Serialize(value)
    }
}

impl From<StoreError> for ExportError {
    fn from(value: StoreError) -> Self {
        Self::Store(value)
    }
}

/// Builds the export file name for `now`.
///
/// Example: `link_manager_data_2024-05-01T12-30-45-123Z.json`.
pub fn export_file_name(now: DateTime<Utc>) -> String {
    let timestamp = now.to_rfc3339_opts(SecondsFormat::Millis, true);
    let safe = UNSAFE_TIMESTAMP_CHARS_RE.replace_all(&timestamp, "-");
    format!("{EXPORT_FILE_PREFIX}{safe}.{EXPORT_FILE_EXTENSION}")
}
