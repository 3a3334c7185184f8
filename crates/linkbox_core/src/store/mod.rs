//! Link collection store: the ordered group list and its persistence sync.
//!
//! # Responsibility
//! - Own the authoritative, ordered list of link groups.
//! - Mirror it to a key-value store as a full snapshot.
//! - Collect user-facing notices for the adapter's toast sink.
//!
//! # Invariants
//! - Every persisted snapshot fully replaces the previous one.
//! - Persistence failures never change or discard in-memory state.

use crate::model::link_group::GroupId;
use crate::repo::kv_store::KvError;
use crate::snapshot::SnapshotError;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::time::Duration;

mod debounce;
mod link_store;
mod notice;

pub use debounce::{Clock, DebouncedWrite, SystemClock};
pub use link_store::{ImportOutcome, LinkStore};
pub use notice::{Notice, NoticeLevel};

/// Key holding the serialized snapshot.
pub const DEFAULT_STORAGE_KEY: &str = "linkManagerData";
/// Quiet period before a debounced edit is persisted.
pub const DEFAULT_SAVE_QUIET_PERIOD: Duration = Duration::from_secs(1);

pub type StoreResult<T> = Result<T, StoreError>;

/// Store tuning knobs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreConfig {
    pub storage_key: String,
    pub save_quiet_period: Duration,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            storage_key: DEFAULT_STORAGE_KEY.to_string(),
            save_quiet_period: DEFAULT_SAVE_QUIET_PERIOD,
        }
    }
}

/// Underlying cause of a persistence failure.
#[derive(Debug)]
pub enum PersistenceFault {
    Kv(KvError),
    /// Stored snapshot exists but cannot be decoded.
    Snapshot(SnapshotError),
    Encode(serde_json::Error),
}

impl Display for PersistenceFault {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Kv(err) => write!(f, "{err}"),
            Self::Snapshot(err) => write!(f, "{err}"),
            Self::Encode(err) => write!(f, "snapshot encoding failed: {err}"),
        }
    }
}

impl Error for PersistenceFault {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Kv(err) => Some(err),
            Self::Snapshot(err) => Some(err),
            Self::Encode(err) => Some(err),
        }
    }
}

/// Store-level error.
#[derive(Debug)]
pub enum StoreError {
    /// Import payload failed to parse or failed shape validation.
    MalformedInput(SnapshotError),
    /// No group carries the given id.
    GroupNotFound(GroupId),
    /// Startup load could not read or decode the persisted snapshot.
    PersistenceReadFailure(PersistenceFault),
    /// Snapshot could not be written or removed.
    PersistenceWriteFailure(PersistenceFault),
}

impl Display for StoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MalformedInput(err) => write!(f, "malformed import: {err}"),
            Self::GroupNotFound(id) => write!(f, "link group not found: {id}"),
            Self::PersistenceReadFailure(err) => write!(f, "failed to load snapshot: {err}"),
            Self::PersistenceWriteFailure(err) => write!(f, "failed to persist snapshot: {err}"),
        }
    }
}

impl Error for StoreError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::MalformedInput(err) => Some(err),
            Self::GroupNotFound(_) => None,
            Self::PersistenceReadFailure(err) => Some(err),
            Self::PersistenceWriteFailure(err) => Some(err),
        }
    }
}
