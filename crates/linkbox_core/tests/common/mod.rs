#![allow(dead_code)]

use linkbox_core::{Clock, KvError, KvResult, KvStore};
use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::time::{Duration, Instant};

/// Clock advanced explicitly by tests.
pub struct ManualClock {
    now: Cell<Instant>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self {
            now: Cell::new(Instant::now()),
        }
    }

    pub fn advance(&self, by: Duration) {
        self.now.set(self.now.get() + by);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Instant {
        self.now.get()
    }
}

/// In-memory key-value store recording every write, with switchable failures.
#[derive(Default)]
pub struct RecordingKv {
    values: RefCell<HashMap<String, String>>,
    writes: RefCell<Vec<String>>,
    fail_reads: Cell<bool>,
    fail_writes: Cell<bool>,
}

impl RecordingKv {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_value(key: &str, value: &str) -> Self {
        let kv = Self::new();
        kv.values
            .borrow_mut()
            .insert(key.to_string(), value.to_string());
        kv
    }

    pub fn writes(&self) -> Vec<String> {
        self.writes.borrow().clone()
    }

    pub fn value(&self, key: &str) -> Option<String> {
        self.values.borrow().get(key).cloned()
    }

    pub fn set_fail_reads(&self, fail: bool) {
        self.fail_reads.set(fail);
    }

    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.set(fail);
    }
}

impl KvStore for RecordingKv {
    fn read(&self, key: &str) -> KvResult<Option<String>> {
        if self.fail_reads.get() {
            return Err(KvError::Rejected("read disabled".to_string()));
        }
        Ok(self.value(key))
    }

    fn write(&self, key: &str, value: &str) -> KvResult<()> {
        if self.fail_writes.get() {
            return Err(KvError::Rejected("quota exceeded".to_string()));
        }
        self.writes.borrow_mut().push(value.to_string());
        self.values
            .borrow_mut()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> KvResult<bool> {
        if self.fail_writes.get() {
            return Err(KvError::Rejected("remove disabled".to_string()));
        }
        Ok(self.values.borrow_mut().remove(key).is_some())
    }
}
