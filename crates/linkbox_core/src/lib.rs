//! Core logic for the link box organizer.
//! This crate owns the link collection, its persistence and its search.

pub mod db;
pub mod export;
pub mod logging;
pub mod model;
pub mod repo;
pub mod search;
pub mod snapshot;
pub mod store;
pub mod transform;

pub use export::{export_file_name, ExportError};
pub use logging::{default_log_level, init_logging, logging_status, LoggingError};
pub use model::link_group::{GroupField, GroupId, LinkGroup};
pub use repo::kv_store::{KvError, KvResult, KvStore, SqliteKvStore};
pub use search::line_search::{search_groups, SearchHit, SearchOutcome};
pub use snapshot::{decode_snapshot, encode_snapshot, encode_snapshot_pretty, SnapshotError};
pub use store::{
    Clock, ImportOutcome, LinkStore, Notice, NoticeLevel, PersistenceFault, StoreConfig,
    StoreError, StoreResult, SystemClock,
};
pub use transform::append_redirect_suffix;

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::core_version;

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
