//! Record store: SQLite-backed persistence for users and their contributions.
//!
//! The store is deliberately thin - insert, filter-by-field queries,
//! update-by-id, delete-by-id and counts. Anything smarter (aggregation,
//! report assembly) lives in [`crate::report`].
//!
//! All access goes through a [`StoreSession`], an RAII guard over the single
//! connection: acquire it, run the queries for one request, and the lock is
//! released on every exit path when the guard drops.

pub mod innovation;
pub mod ipr;
pub mod research;
pub mod startup;
pub mod users;

use parking_lot::{Mutex, MutexGuard};
use rusqlite::Connection;
use std::ops::Deref;
use std::path::{Path, PathBuf};

#[derive(Debug)]
pub enum StoreError {
    Io(std::io::Error),
    Sql(rusqlite::Error),
    InvalidInput(&'static str),
}

impl std::fmt::Display for StoreError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io(err) => write!(f, "io: {err}"),
            Self::Sql(err) => write!(f, "sqlite: {err}"),
            Self::InvalidInput(message) => write!(f, "invalid input: {message}"),
        }
    }
}

impl std::error::Error for StoreError {}

impl From<std::io::Error> for StoreError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

impl From<rusqlite::Error> for StoreError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Sql(value)
    }
}

#[derive(Debug)]
pub struct RecordStore {
    conn: Mutex<Connection>,
    db_path: Option<PathBuf>,
}

impl RecordStore {
    /// Open (and migrate) the database at `path`, creating parent directories
    /// as needed.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let path = path.as_ref().to_path_buf();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let conn = Connection::open(&path)?;
        Self::migrate(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
            db_path: Some(path),
        })
    }

    /// Fresh in-memory database. Used by tests; state dies with the store.
    pub fn open_in_memory() -> Result<Self, StoreError> {
        let conn = Connection::open_in_memory()?;
        Self::migrate(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
            db_path: None,
        })
    }

    pub fn db_path(&self) -> Option<&Path> {
        self.db_path.as_deref()
    }

    /// Acquire an exclusive session for the duration of one request.
    pub fn session(&self) -> StoreSession<'_> {
        StoreSession {
            conn: self.conn.lock(),
        }
    }

    fn migrate(conn: &Connection) -> Result<(), StoreError> {
        conn.execute_batch(
            r#"
            PRAGMA journal_mode=WAL;
            PRAGMA synchronous=NORMAL;
            PRAGMA foreign_keys=ON;

            CREATE TABLE IF NOT EXISTS users (
              user_id         INTEGER PRIMARY KEY AUTOINCREMENT,
              name            TEXT NOT NULL,
              email           TEXT NOT NULL UNIQUE,
              role            TEXT NOT NULL DEFAULT 'user',
              scholar_id      TEXT,
              h_index         INTEGER,
              i10_index       INTEGER,
              total_citations INTEGER,
              id_card_url     TEXT,
              is_verified     INTEGER NOT NULL DEFAULT 0
            );
            CREATE INDEX IF NOT EXISTS idx_users_email ON users(email);

            CREATE TABLE IF NOT EXISTS startup (
              startup_id   INTEGER PRIMARY KEY AUTOINCREMENT,
              name         TEXT NOT NULL,
              description  TEXT,
              founder      TEXT,
              industry     TEXT,
              founded_date TEXT,
              status       TEXT,
              created_at   TEXT,
              updated_at   TEXT,
              user_id      INTEGER REFERENCES users(user_id)
            );
            CREATE INDEX IF NOT EXISTS idx_startup_user ON startup(user_id);

            CREATE TABLE IF NOT EXISTS ipr (
              ipr_id             INTEGER PRIMARY KEY AUTOINCREMENT,
              ipr_type           TEXT NOT NULL,
              title              TEXT NOT NULL,
              ipr_number         TEXT,
              filing_date        TEXT,
              status             TEXT,
              related_startup_id INTEGER REFERENCES startup(startup_id),
              created_at         TEXT,
              updated_at         TEXT,
              user_id            INTEGER NOT NULL REFERENCES users(user_id)
            );
            CREATE INDEX IF NOT EXISTS idx_ipr_user ON ipr(user_id);

            CREATE TABLE IF NOT EXISTS research_paper (
              paper_id         INTEGER PRIMARY KEY AUTOINCREMENT,
              title            TEXT NOT NULL,
              abstract         TEXT,
              authors          TEXT,
              publication_date TEXT,
              doi              TEXT,
              status           TEXT,
              created_at       TEXT,
              updated_at       TEXT,
              user_id          INTEGER NOT NULL REFERENCES users(user_id)
            );
            CREATE INDEX IF NOT EXISTS idx_research_user ON research_paper(user_id);

            CREATE TABLE IF NOT EXISTS innovation (
              innovation_id INTEGER PRIMARY KEY AUTOINCREMENT,
              title         TEXT NOT NULL,
              description   TEXT,
              domain        TEXT,
              level         TEXT,
              status        TEXT,
              submitted_on  TEXT,
              created_at    TEXT,
              updated_at    TEXT,
              user_id       INTEGER REFERENCES users(user_id)
            );
            CREATE INDEX IF NOT EXISTS idx_innovation_user ON innovation(user_id);
            "#,
        )?;
        Ok(())
    }
}

/// Exclusive handle on the store for one request. Dropping it releases the
/// underlying connection lock.
pub struct StoreSession<'a> {
    conn: MutexGuard<'a, Connection>,
}

impl Deref for StoreSession<'_> {
    type Target = Connection;

    fn deref(&self) -> &Connection {
        &self.conn
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_open_in_memory_migrates() {
        let store = RecordStore::open_in_memory().unwrap();
        let session = store.session();
        // All five tables exist after migration.
        let count: i64 = session
            .query_row(
                "SELECT COUNT(*) FROM sqlite_master WHERE type='table' AND name IN \
                 ('users','ipr','research_paper','innovation','startup')",
                [],
                |row| row.get(0),
            )
            .unwrap();
        assert_eq!(count, 5);
    }

    #[test]
    fn test_session_is_scoped() {
        let store = RecordStore::open_in_memory().unwrap();
        {
            let _session = store.session();
        }
        // Guard released: a second session can be acquired.
        let _again = store.session();
    }

    #[test]
    fn test_open_persists_across_reopen() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("riise.db");

        {
            let store = RecordStore::open(&path).unwrap();
            store
                .session()
                .insert_user("Asha Rao", "asha@riise.edu", crate::auth::Role::User)
                .unwrap();
        }

        let store = RecordStore::open(&path).unwrap();
        assert!(store
            .session()
            .user_by_email("asha@riise.edu")
            .unwrap()
            .is_some());
        assert_eq!(store.db_path(), Some(path.as_path()));
    }
}
