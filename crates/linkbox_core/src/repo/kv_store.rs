//! Key-value persistence contract and SQLite implementation.
//!
//! # Responsibility
//! - Provide synchronous read/write/remove of string values by key.
//! - Keep SQL details inside the persistence boundary.
//!
//! # Invariants
//! - `write` fully replaces any previous value for the key.
//! - `remove` deletes the key; a later `read` returns `None`, not `""`.

use crate::db::DbError;
use rusqlite::{params, Connection, ErrorCode, OptionalExtension};
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type KvResult<T> = Result<T, KvError>;

/// Key-value persistence error.
#[derive(Debug)]
pub enum KvError {
    Db(DbError),
    /// Backend refused the write: storage full or read-only.
    Rejected(String),
}

impl Display for KvError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "{err}"),
            Self::Rejected(message) => write!(f, "key-value write rejected: {message}"),
        }
    }
}

impl Error for KvError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            Self::Rejected(_) => None,
        }
    }
}

impl From<DbError> for KvError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for KvError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Synchronous string key-value store.
pub trait KvStore {
    fn read(&self, key: &str) -> KvResult<Option<String>>;
    fn write(&self, key: &str, value: &str) -> KvResult<()>;
    /// Returns whether a value was present.
    fn remove(&self, key: &str) -> KvResult<bool>;
}

impl<T: KvStore + ?Sized> KvStore for &T {
    fn read(&self, key: &str) -> KvResult<Option<String>> {
        (**self).read(key)
    }

    fn write(&self, key: &str, value: &str) -> KvResult<()> {
        (**self).write(key, value)
    }

    fn remove(&self, key: &str) -> KvResult<bool> {
        (**self).remove(key)
    }
}

/// SQLite-backed key-value store over the `kv_store` table.
pub struct SqliteKvStore<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteKvStore<'conn> {
    /// Creates a store from a migrated connection.
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }
}

impl KvStore for SqliteKvStore<'_> {
    fn read(&self, key: &str) -> KvResult<Option<String>> {
        let value = self
            .conn
            .query_row(
                "SELECT value FROM kv_store WHERE key = ?1;",
                params![key],
                |row| row.get::<_, String>(0),
            )
            .optional()?;
        Ok(value)
    }

    fn write(&self, key: &str, value: &str) -> KvResult<()> {
        self.conn
            .execute(
                "INSERT INTO kv_store (key, value, updated_at)
                 VALUES (?1, ?2, (strftime('%s', 'now') * 1000))
                 ON CONFLICT(key) DO UPDATE SET
                    value = excluded.value,
                    updated_at = excluded.updated_at;",
                params![key, value],
            )
            .map_err(map_write_error)?;
        Ok(())
    }

    fn remove(&self, key: &str) -> KvResult<bool> {
        let changed = self
            .conn
            .execute("DELETE FROM kv_store WHERE key = ?1;", params![key])
            .map_err(map_write_error)?;
        Ok(changed > 0)
    }
}

fn map_write_error(err: rusqlite::Error) -> KvError {
    match err.sqlite_error_code() {
        Some(ErrorCode::DiskFull) | Some(ErrorCode::ReadOnly) => {
            KvError::Rejected(err.to_string())
        }
        _ => err.into(),
    }
}
