//! SQLite-backed storage engine.
//!
//! # Responsibility
//! - Open and bootstrap the shared store database for one page process.
//! - Serve namespaced key-value stores over a single connection.
//!
//! # Invariants
//! - Returned connections have the store schema applied.
//! - All engines from one factory share one connection behind a mutex.

use crate::storage::engine::{relock, validate_namespace, StorageEngine, StorageEngineFactory};
use crate::storage::StorageResult;
use log::{error, info};
use rusqlite::{params, Connection, OptionalExtension};
use std::path::Path;
use std::sync::{Arc, Mutex};
use std::time::Instant;

const STORE_SCHEMA_SQL: &str = "CREATE TABLE IF NOT EXISTS kv_entries (
    namespace TEXT NOT NULL,
    key TEXT NOT NULL,
    value TEXT NOT NULL,
    PRIMARY KEY (namespace, key)
) WITHOUT ROWID";

/// Opens the store database file and applies the schema.
///
/// # Side effects
/// - Emits `storage_open` logging events with duration and status.
pub fn open_store_db(path: impl AsRef<Path>) -> StorageResult<Connection> {
    let started_at = Instant::now();
    info!("event=storage_open module=storage status=start mode=file");

    let conn = match Connection::open(path) {
        Ok(conn) => conn,
        Err(err) => {
            error!(
                "event=storage_open module=storage status=error mode=file duration_ms={} error_code=storage_open_failed error={}",
                started_at.elapsed().as_millis(),
                err
            );
            return Err(err.into());
        }
    };

    match bootstrap_connection(&conn) {
        Ok(()) => {
            info!(
                "event=storage_open module=storage status=ok mode=file duration_ms={}",
                started_at.elapsed().as_millis()
            );
            Ok(conn)
        }
        Err(err) => {
            error!(
                "event=storage_open module=storage status=error mode=file duration_ms={} error_code=storage_bootstrap_failed error={}",
                started_at.elapsed().as_millis(),
                err
            );
            Err(err)
        }
    }
}

/// Opens an in-memory store database and applies the schema.
pub fn open_store_db_in_memory() -> StorageResult<Connection> {
    let started_at = Instant::now();
    info!("event=storage_open module=storage status=start mode=memory");

    let conn = match Connection::open_in_memory() {
        Ok(conn) => conn,
        Err(err) => {
            error!(
                "event=storage_open module=storage status=error mode=memory duration_ms={} error_code=storage_open_failed error={}",
                started_at.elapsed().as_millis(),
                err
            );
            return Err(err.into());
        }
    };

    bootstrap_connection(&conn)?;
    info!(
        "event=storage_open module=storage status=ok mode=memory duration_ms={}",
        started_at.elapsed().as_millis()
    );
    Ok(conn)
}

fn bootstrap_connection(conn: &Connection) -> StorageResult<()> {
    conn.pragma_update(None, "journal_mode", "WAL").ok();
    conn.execute_batch(STORE_SCHEMA_SQL)?;
    Ok(())
}

/// Factory serving SQLite-backed stores from one shared connection.
pub struct SqliteEngineFactory {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteEngineFactory {
    /// Opens (or creates) the database at `path`.
    pub fn open_at(path: impl AsRef<Path>) -> StorageResult<Self> {
        Ok(Self {
            conn: Arc::new(Mutex::new(open_store_db(path)?)),
        })
    }

    /// Opens a non-persistent database, useful for tests and probes.
    pub fn in_memory() -> StorageResult<Self> {
        Ok(Self {
            conn: Arc::new(Mutex::new(open_store_db_in_memory()?)),
        })
    }
}

impl StorageEngineFactory for SqliteEngineFactory {
    fn open(&self, namespace: &str) -> StorageResult<Arc<dyn StorageEngine>> {
        let namespace = validate_namespace(namespace)?;
        Ok(Arc::new(SqliteStorageEngine {
            conn: Arc::clone(&self.conn),
            namespace: namespace.to_string(),
        }))
    }
}

/// One namespaced view over the shared store database.
#[derive(Debug)]
pub struct SqliteStorageEngine {
    conn: Arc<Mutex<Connection>>,
    namespace: String,
}

impl StorageEngine for SqliteStorageEngine {
    fn get(&self, key: &str) -> StorageResult<Option<String>> {
        let conn = relock(&self.conn);
        let value = conn
            .query_row(
                "SELECT value FROM kv_entries WHERE namespace = ?1 AND key = ?2",
                params![self.namespace, key],
                |row| row.get::<_, String>(0),
            )
            .optional()?;
        Ok(value)
    }

    fn set(&self, key: &str, value: &str) -> StorageResult<()> {
        let conn = relock(&self.conn);
        conn.execute(
            "INSERT INTO kv_entries (namespace, key, value) VALUES (?1, ?2, ?3)
             ON CONFLICT (namespace, key) DO UPDATE SET value = excluded.value",
            params![self.namespace, key, value],
        )?;
        Ok(())
    }

    fn remove(&self, key: &str) -> StorageResult<()> {
        let conn = relock(&self.conn);
        conn.execute(
            "DELETE FROM kv_entries WHERE namespace = ?1 AND key = ?2",
            params![self.namespace, key],
        )?;
        Ok(())
    }

    fn clear(&self) -> StorageResult<()> {
        let conn = relock(&self.conn);
        conn.execute(
            "DELETE FROM kv_entries WHERE namespace = ?1",
            params![self.namespace],
        )?;
        Ok(())
    }

    fn len(&self) -> StorageResult<usize> {
        let conn = relock(&self.conn);
        let count: i64 = conn.query_row(
            "SELECT COUNT(*) FROM kv_entries WHERE namespace = ?1",
            params![self.namespace],
            |row| row.get(0),
        )?;
        Ok(count as usize)
    }
}
