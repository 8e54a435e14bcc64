//! Key-value slot repository contracts and implementations.
//!
//! # Responsibility
//! - Provide read/replace access to named text slots.
//! - Back slots with SQLite for real sessions and with a shared map for
//!   ephemeral sessions and tests.
//!
//! # Invariants
//! - `read_slot` on a never-written key returns `Ok(None)`.
//! - `write_slot` is last-writer-wins for the whole value.

use crate::db::{open_db, open_db_in_memory, DbError};
use rusqlite::{params, Connection, OptionalExtension};
use std::collections::BTreeMap;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::Path;
use std::sync::{Arc, Mutex, PoisonError};

pub type RepoResult<T> = Result<T, RepoError>;

/// Generic repository error for slot reads and writes.
#[derive(Debug)]
pub enum RepoError {
    Db(DbError),
    InvalidKey(String),
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "{err}"),
            Self::InvalidKey(key) => write!(f, "invalid slot key: `{key}`"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            Self::InvalidKey(_) => None,
        }
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Storage collaborator holding named text blobs.
pub trait KeyValueRepository {
    fn read_slot(&self, key: &str) -> RepoResult<Option<String>>;
    fn write_slot(&mut self, key: &str, value: &str) -> RepoResult<()>;
}

/// SQLite-backed slot repository over the `kv_slots` table.
///
/// Owns its connection so a session can keep it for its whole lifetime.
pub struct SqliteKvRepository {
    conn: Connection,
}

impl SqliteKvRepository {
    /// Wraps a connection that already has migrations applied.
    pub fn new(conn: Connection) -> Self {
        Self { conn }
    }

    /// Opens (and migrates) a database file.
    pub fn open(path: impl AsRef<Path>) -> RepoResult<Self> {
        Ok(Self::new(open_db(path)?))
    }

    /// Opens a private in-memory database.
    pub fn open_in_memory() -> RepoResult<Self> {
        Ok(Self::new(open_db_in_memory()?))
    }

    pub fn connection(&self) -> &Connection {
        &self.conn
    }
}

impl KeyValueRepository for SqliteKvRepository {
    fn read_slot(&self, key: &str) -> RepoResult<Option<String>> {
        let key = normalize_key(key)?;
        let value = self
            .conn
            .query_row(
                "SELECT value FROM kv_slots WHERE key = ?1;",
                [key],
                |row| row.get::<_, String>(0),
            )
            .optional()?;
        Ok(value)
    }

    fn write_slot(&mut self, key: &str, value: &str) -> RepoResult<()> {
        let key = normalize_key(key)?;
        self.conn.execute(
            "INSERT INTO kv_slots (key, value, updated_at)
             VALUES (?1, ?2, (strftime('%s', 'now') * 1000))
             ON CONFLICT(key) DO UPDATE SET
                value = excluded.value,
                updated_at = excluded.updated_at;",
            params![key, value],
        )?;
        Ok(())
    }
}

/// In-memory slot repository.
///
/// Clones share the same slots, which lets tests simulate a restart by
/// building a second store over a clone.
#[derive(Debug, Clone, Default)]
pub struct MemoryKvRepository {
    slots: Arc<Mutex<BTreeMap<String, String>>>,
}

impl MemoryKvRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, BTreeMap<String, String>> {
        self.slots.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl KeyValueRepository for MemoryKvRepository {
    fn read_slot(&self, key: &str) -> RepoResult<Option<String>> {
        let key = normalize_key(key)?;
        Ok(self.lock().get(key).cloned())
    }

    fn write_slot(&mut self, key: &str, value: &str) -> RepoResult<()> {
        let key = normalize_key(key)?;
        self.lock().insert(key.to_string(), value.to_string());
        Ok(())
    }
}

fn normalize_key(key: &str) -> RepoResult<&str> {
    let trimmed = key.trim();
    if trimmed.is_empty() {
        return Err(RepoError::InvalidKey(key.to_string()));
    }
    Ok(trimmed)
}

#[cfg(test)]
mod tests {
    use super::{KeyValueRepository, MemoryKvRepository, RepoError, SqliteKvRepository};

    #[test]
    fn sqlite_slot_roundtrip_and_overwrite() {
        let mut repo = SqliteKvRepository::open_in_memory().expect("open in-memory repo");
        assert_eq!(repo.read_slot("tasks").expect("read empty slot"), None);

        repo.write_slot("tasks", "[]").expect("first write");
        repo.write_slot("tasks", "[1]").expect("second write");
        assert_eq!(
            repo.read_slot("tasks").expect("read slot").as_deref(),
            Some("[1]")
        );

        let rows: i64 = repo
            .connection()
            .query_row("SELECT COUNT(*) FROM kv_slots;", [], |row| row.get(0))
            .expect("count rows");
        assert_eq!(rows, 1);
    }

    #[test]
    fn blank_key_is_rejected() {
        let mut repo = MemoryKvRepository::new();
        let err = repo.write_slot("  ", "x").expect_err("blank key must fail");
        assert!(matches!(err, RepoError::InvalidKey(_)));
        assert!(repo.is_empty());
    }

    #[test]
    fn memory_clones_share_slots() {
        let mut writer = MemoryKvRepository::new();
        let reader = writer.clone();
        writer.write_slot("tasks", "[]").expect("write slot");
        assert_eq!(reader.read_slot("tasks").expect("read").as_deref(), Some("[]"));
        assert_eq!(reader.len(), 1);
    }
}
