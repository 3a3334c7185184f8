//! Ordered link group list synchronized with key-value persistence.
//!
//! # Invariants
//! - `groups` order is the display, export and persistence order.
//! - Group ids are unique; minted ids skip values already in use.
//! - Structural operations write immediately and cancel any pending
//!   debounced write. Field edits only (re)schedule the debounced write.
//! - Failed reads and imports leave the list empty or unchanged.

use super::debounce::{Clock, DebouncedWrite, SystemClock};
use super::notice::Notice;
use super::{PersistenceFault, StoreConfig, StoreError, StoreResult};
use crate::export::{export_file_name, ExportError};
use crate::model::link_group::{GroupField, GroupId, LinkGroup};
use crate::repo::kv_store::KvStore;
use crate::search::line_search::{search_groups, SearchOutcome};
use crate::snapshot::{decode_snapshot, encode_snapshot, encode_snapshot_pretty};
use crate::transform::append_redirect_suffix;
use chrono::{DateTime, Utc};
use log::{debug, error, info, warn};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

const LOADED_MESSAGE: &str = "Data loaded successfully!";
const LOAD_FAILED_MESSAGE: &str = "Error loading saved data. Starting with empty state.";
const SAVE_FAILED_MESSAGE: &str = "Error saving data. Please try again.";
const IMPORTED_MESSAGE: &str = "Data imported successfully!";
const IMPORT_FAILED_MESSAGE: &str =
    "Error importing data. Please make sure the file is valid JSON.";
const EXPORTED_MESSAGE: &str = "Data exported successfully!";
const EXPORT_FAILED_MESSAGE: &str = "Error exporting data. Please try again.";
const CLEARED_MESSAGE: &str = "All data cleared successfully!";

/// Result of an import request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImportOutcome {
    /// Caller did not confirm the destructive replace; nothing changed.
    Cancelled,
    Imported { groups: usize },
}

/// In-memory link collection mirrored to a [`KvStore`].
pub struct LinkStore<K: KvStore, C: Clock = SystemClock> {
    kv: K,
    clock: C,
    config: StoreConfig,
    groups: Vec<LinkGroup>,
    next_id: u64,
    pending_save: DebouncedWrite,
    notices: Vec<Notice>,
    load_warning: Option<StoreError>,
    last_save_error: Option<StoreError>,
}

impl<K: KvStore> LinkStore<K> {
    /// Loads the persisted snapshot using the wall clock.
    pub fn load(kv: K, config: StoreConfig) -> Self {
        Self::load_with_clock(kv, config, SystemClock)
    }
}

impl<K: KvStore, C: Clock> LinkStore<K, C> {
    /// Loads the persisted snapshot, falling back to an empty list.
    ///
    /// Never fails: unreadable or malformed snapshots are reported through
    /// [`Self::load_warning`] and an error notice.
    pub fn load_with_clock(kv: K, config: StoreConfig, clock: C) -> Self {
        let pending_save = DebouncedWrite::new(config.save_quiet_period);
        let mut store = Self {
            kv,
            clock,
            config,
            groups: Vec::new(),
            next_id: 0,
            pending_save,
            notices: Vec::new(),
            load_warning: None,
            last_save_error: None,
        };

        match store.read_snapshot() {
            Ok(Some(groups)) => {
                info!(
                    "event=store_load module=store status=ok groups={}",
                    groups.len()
                );
                store.replace_groups(groups);
                store.notices.push(Notice::success(LOADED_MESSAGE));
            }
            Ok(None) => {
                info!("event=store_load module=store status=empty");
            }
            Err(err) => {
                warn!("event=store_load module=store status=error error={err}");
                store.notices.push(Notice::error(LOAD_FAILED_MESSAGE));
                store.load_warning = Some(err);
            }
        }

        store
    }

    /// Groups in display order.
    pub fn groups(&self) -> &[LinkGroup] {
        &self.groups
    }

    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    pub fn get(&self, id: &GroupId) -> Option<&LinkGroup> {
        self.groups.iter().find(|group| &group.id == id)
    }

    /// Current value of the id counter.
    pub fn id_counter(&self) -> u64 {
        self.next_id
    }

    /// Appends a new group with a freshly minted id and saves immediately.
    pub fn create(&mut self, label: impl Into<String>, links: impl Into<String>) -> LinkGroup {
        let id = self.mint_id();
        let group = LinkGroup::new(id, label, links);
        self.groups.push(group.clone());
        debug!(
            "event=group_create module=store status=ok groups={}",
            self.groups.len()
        );
        self.save_now("create");
        group
    }

    /// Removes the group with `id`. Absent ids are a no-op.
    ///
    /// Returns whether a group was removed.
    pub fn delete(&mut self, id: &GroupId) -> bool {
        let Some(index) = self.position(id) else {
            debug!("event=group_delete module=store status=absent");
            return false;
        };
        self.groups.remove(index);
        self.save_now("delete");
        true
    }

    /// Replaces one field of a group and schedules a debounced save.
    pub fn update(
        &mut self,
        id: &GroupId,
        field: GroupField,
        value: impl Into<String>,
    ) -> StoreResult<()> {
        let index = self
            .position(id)
            .ok_or_else(|| StoreError::GroupNotFound(id.clone()))?;
        self.groups[index].set_field(field, value);
        self.pending_save.schedule(self.clock.now());
        Ok(())
    }

    /// Reorders the list to follow `order`.
    ///
    /// Groups missing from `order` are dropped; unknown or repeated ids in
    /// `order` are ignored.
    pub fn reorder(&mut self, order: &[GroupId]) {
        let mut by_id: HashMap<GroupId, LinkGroup> = std::mem::take(&mut self.groups)
            .into_iter()
            .map(|group| (group.id.clone(), group))
            .collect();
        self.groups = order.iter().filter_map(|id| by_id.remove(id)).collect();
        debug!(
            "event=group_reorder module=store status=ok groups={} dropped={}",
            self.groups.len(),
            by_id.len()
        );
        self.save_now("reorder");
    }

    /// Snapshot of the full list in display order.
    pub fn export_snapshot(&self) -> Vec<LinkGroup> {
        self.groups.clone()
    }

    /// Pretty-printed snapshot, as written to export files.
    pub fn export_snapshot_json(&self) -> Result<String, serde_json::Error> {
        encode_snapshot_pretty(&self.groups)
    }

    /// Replaces the whole list with a serialized snapshot.
    ///
    /// Unconfirmed requests return [`ImportOutcome::Cancelled`] without
    /// touching state. Malformed payloads return
    /// [`StoreError::MalformedInput`] and leave the list unchanged.
    pub fn import_snapshot(&mut self, text: &str, confirmed: bool) -> StoreResult<ImportOutcome> {
        if !confirmed {
            info!("event=store_import module=store status=cancelled");
            return Ok(ImportOutcome::Cancelled);
        }

        let groups = match decode_snapshot(text) {
            Ok(groups) => groups,
            Err(err) => {
                warn!("event=store_import module=store status=error error={err}");
                self.notices.push(Notice::error(IMPORT_FAILED_MESSAGE));
                return Err(StoreError::MalformedInput(err));
            }
        };

        let count = groups.len();
        self.replace_groups(groups);
        info!("event=store_import module=store status=ok groups={count}");
        self.save_now("import");
        self.notices.push(Notice::success(IMPORTED_MESSAGE));
        Ok(ImportOutcome::Imported { groups: count })
    }

    /// Empties the list and removes the persisted key entirely.
    pub fn clear_all(&mut self) {
        self.groups.clear();
        self.next_id = 0;
        self.pending_save.cancel();

        match self.kv.remove(&self.config.storage_key) {
            Ok(existed) => {
                info!("event=store_clear module=store status=ok existed={existed}");
                self.last_save_error = None;
                self.notices.push(Notice::success(CLEARED_MESSAGE));
            }
            Err(err) => {
                error!("event=store_clear module=store status=error error={err}");
                self.notices.push(Notice::error(SAVE_FAILED_MESSAGE));
                self.last_save_error =
                    Some(StoreError::PersistenceWriteFailure(PersistenceFault::Kv(err)));
            }
        }
    }

    /// Case-insensitive search over labels and link lines.
    pub fn search(&self, query: &str) -> SearchOutcome {
        search_groups(&self.groups, query)
    }

    /// Raw link block of a group, for copying.
    pub fn links(&self, id: &GroupId) -> Option<&str> {
        self.get(id).map(|group| group.links.as_str())
    }

    /// Derived link block with the short redirect path applied.
    ///
    /// The group itself is not modified.
    pub fn transformed_links(&self, id: &GroupId) -> Option<String> {
        self.links(id).map(append_redirect_suffix)
    }

    pub fn has_pending_save(&self) -> bool {
        self.pending_save.is_pending()
    }

    /// Performs the debounced save once its quiet period elapsed.
    ///
    /// Returns whether a write was attempted.
    pub fn poll_pending_save(&mut self) -> bool {
        if !self.pending_save.take_due(self.clock.now()) {
            return false;
        }
        self.persist("debounced");
        true
    }

    /// Performs the debounced save now, if one is pending.
    pub fn flush_pending_save(&mut self) -> bool {
        if !self.pending_save.cancel() {
            return false;
        }
        self.persist("flush");
        true
    }

    /// Drains notices collected since the last call.
    pub fn take_notices(&mut self) -> Vec<Notice> {
        std::mem::take(&mut self.notices)
    }

    /// Why the startup load fell back to an empty list, if it did.
    pub fn load_warning(&self) -> Option<&StoreError> {
        self.load_warning.as_ref()
    }

    /// Error from the most recent persistence attempt, if it failed.
    pub fn last_save_error(&self) -> Option<&StoreError> {
        self.last_save_error.as_ref()
    }

    /// Whether the most recent persistence attempt failed.
    pub fn last_save_failed(&self) -> bool {
        self.last_save_error.is_some()
    }

    /// Writes the pretty snapshot to a timestamped file inside `dir`.
    pub fn export_to_dir(
        &mut self,
        dir: impl AsRef<Path>,
        now: DateTime<Utc>,
    ) -> Result<PathBuf, ExportError> {
        let path = dir.as_ref().join(export_file_name(now));
        let written = self
            .export_snapshot_json()
            .map_err(ExportError::from)
            .and_then(|payload| std::fs::write(&path, payload).map_err(ExportError::from));

        match written {
            Ok(()) => {
                info!(
                    "event=store_export module=store status=ok groups={}",
                    self.groups.len()
                );
                self.notices.push(Notice::success(EXPORTED_MESSAGE));
                Ok(path)
            }
            Err(err) => {
                error!("event=store_export module=store status=error error={err}");
                self.notices.push(Notice::error(EXPORT_FAILED_MESSAGE));
                Err(err)
            }
        }
    }

    /// Reads a snapshot file and imports it.
    ///
    /// The file is only read once the replace is confirmed. Invalid UTF-8 is
    /// decoded lossily, so such files fail as malformed JSON.
    pub fn import_from_file(
        &mut self,
        path: impl AsRef<Path>,
        confirmed: bool,
    ) -> Result<ImportOutcome, ExportError> {
        if !confirmed {
            return Ok(self.import_snapshot("", false)?);
        }

        let bytes = match std::fs::read(path.as_ref()) {
            Ok(bytes) => bytes,
            Err(err) => {
                error!("event=store_import module=store status=error error_code=file_read_failed error={err}");
                self.notices.push(Notice::error(IMPORT_FAILED_MESSAGE));
                return Err(err.into());
            }
        };
        let text = String::from_utf8_lossy(&bytes);
        Ok(self.import_snapshot(&text, true)?)
    }

    fn read_snapshot(&self) -> StoreResult<Option<Vec<LinkGroup>>> {
        let payload = self
            .kv
            .read(&self.config.storage_key)
            .map_err(|err| StoreError::PersistenceReadFailure(PersistenceFault::Kv(err)))?;
        let Some(payload) = payload else {
            return Ok(None);
        };
        let groups = decode_snapshot(&payload)
            .map_err(|err| StoreError::PersistenceReadFailure(PersistenceFault::Snapshot(err)))?;
        Ok(Some(groups))
    }

    fn write_snapshot(&self) -> StoreResult<()> {
        let payload = encode_snapshot(&self.groups)
            .map_err(|err| StoreError::PersistenceWriteFailure(PersistenceFault::Encode(err)))?;
        self.kv
            .write(&self.config.storage_key, &payload)
            .map_err(|err| StoreError::PersistenceWriteFailure(PersistenceFault::Kv(err)))
    }

    fn save_now(&mut self, trigger: &'static str) {
        self.pending_save.cancel();
        self.persist(trigger);
    }

    fn persist(&mut self, trigger: &'static str) {
        match self.write_snapshot() {
            Ok(()) => {
                debug!(
                    "event=store_save module=store status=ok trigger={trigger} groups={}",
                    self.groups.len()
                );
                self.last_save_error = None;
            }
            Err(err) => {
                error!("event=store_save module=store status=error trigger={trigger} error={err}");
                self.notices.push(Notice::error(SAVE_FAILED_MESSAGE));
                self.last_save_error = Some(err);
            }
        }
    }

    fn replace_groups(&mut self, groups: Vec<LinkGroup>) {
        self.next_id = groups.len() as u64;
        self.groups = groups;
    }

    fn mint_id(&mut self) -> GroupId {
        loop {
            self.next_id += 1;
            let id = GroupId::minted(self.next_id);
            if self.position(&id).is_none() {
                return id;
            }
        }
    }

    fn position(&self, id: &GroupId) -> Option<usize> {
        self.groups.iter().position(|group| &group.id == id)
    }
}
