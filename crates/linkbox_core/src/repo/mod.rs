//! Persistence boundary consumed by the link store.
//!
//! # Responsibility
//! - Define the key-value contract the store persists snapshots through.
//! - Isolate SQLite query details from store orchestration.

pub mod kv_store;
