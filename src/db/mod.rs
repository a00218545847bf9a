//! SQLite store for punch records, staff accounts and clock settings.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use rusqlite::{Connection, TransactionBehavior};
use tracing::{debug, info};

use crate::error::AppResult;

pub mod migrations;

pub mod repositories;

const SCHEMA_SQL: &str = include_str!("schema.sql");

/// Concurrent punches from several terminals queue on the write lock for at
/// most this long before the store is reported unavailable.
const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// Handle on the time record database file.
///
/// Each call opens its own connection, so clones can be moved into threads.
#[derive(Clone, Debug)]
pub struct DbPool {
    path: PathBuf,
}

impl DbPool {
    /// Opens (or creates) the store and brings its schema up to date.
    pub fn new<P: Into<PathBuf>>(path: P) -> AppResult<Self> {
        let pool = Self { path: path.into() };
        if let Some(parent) = pool.path.parent().filter(|dir| !dir.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }

        let conn = pool.get_connection()?;
        info!(
            target: "app::db",
            db_path = %pool.path.display(),
            schema_version = migrations::schema_version(&conn)?,
            "time record store ready"
        );
        Ok(pool)
    }

    pub fn get_connection(&self) -> AppResult<Connection> {
        let conn = Connection::open(&self.path)?;
        conn.busy_timeout(BUSY_TIMEOUT)?;
        conn.pragma_update(None, "foreign_keys", &1)?;
        conn.pragma_update(None, "journal_mode", &"WAL")?;
        conn.pragma_update(None, "synchronous", &"NORMAL")?;
        conn.execute_batch(SCHEMA_SQL)?;
        migrations::run(&conn)?;
        debug!(target: "app::db", db_path = %self.path.display(), "connection opened");
        Ok(conn)
    }

    pub fn with_connection<F, T>(&self, callback: F) -> AppResult<T>
    where
        F: FnOnce(&Connection) -> AppResult<T>,
    {
        let conn = self.get_connection()?;
        callback(&conn)
    }

    /// Runs `callback` under an IMMEDIATE transaction: the write lock is held
    /// from the first statement, and nothing is committed unless it returns Ok.
    pub fn with_write_transaction<F, T>(&self, callback: F) -> AppResult<T>
    where
        F: FnOnce(&Connection) -> AppResult<T>,
    {
        let mut conn = self.get_connection()?;
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
        let value = callback(&tx)?;
        tx.commit()?;
        Ok(value)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}
