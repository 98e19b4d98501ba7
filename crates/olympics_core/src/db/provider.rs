//! Per-operation connection provider.
//!
//! # Responsibility
//! - Open one SQLite connection per call from injected configuration.
//! - Configure pragmas and verify the catalog tables before handing it out.
//!
//! # Invariants
//! - The database file is never created here; a missing file is an error.
//! - Returned connections have `foreign_keys=ON`.

use super::config::DbConfig;
use super::schema::REQUIRED_TABLES;
use super::{DbError, DbResult};
use log::{debug, error};
use rusqlite::{Connection, OpenFlags};
use std::path::PathBuf;
use std::time::{Duration, Instant};

const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// Source of short-lived connections for repository operations.
pub trait ConnectionProvider {
    /// Opens a fresh connection. The caller drops it when the operation ends.
    fn acquire(&self) -> DbResult<Connection>;
}

impl<P: ConnectionProvider + ?Sized> ConnectionProvider for &P {
    fn acquire(&self) -> DbResult<Connection> {
        (**self).acquire()
    }
}

/// File-backed SQLite provider.
#[derive(Debug, Clone)]
pub struct SqliteConnectionProvider {
    config: DbConfig,
    path: PathBuf,
}

impl SqliteConnectionProvider {
    pub fn new(config: DbConfig) -> Self {
        let path = config.database_path();
        Self { config, path }
    }

    pub fn config(&self) -> &DbConfig {
        &self.config
    }

    pub fn database_path(&self) -> &PathBuf {
        &self.path
    }
}

impl ConnectionProvider for SqliteConnectionProvider {
    /// # Side effects
    /// - Emits `db_open` debug/error events with duration and status.
    fn acquire(&self) -> DbResult<Connection> {
        let started_at = Instant::now();
        debug!(
            "event=db_open module=db status=start database={} user={}",
            self.config.database, self.config.user
        );

        if !self.path.is_file() {
            error!(
                "event=db_open module=db status=error duration_ms={} error_code=db_missing path={}",
                started_at.elapsed().as_millis(),
                self.path.display()
            );
            return Err(DbError::DatabaseMissing(self.path.clone()));
        }

        let conn = match Connection::open_with_flags(
            &self.path,
            OpenFlags::SQLITE_OPEN_READ_WRITE | OpenFlags::SQLITE_OPEN_NO_MUTEX,
        ) {
            Ok(conn) => conn,
            Err(err) => {
                error!(
                    "event=db_open module=db status=error duration_ms={} error_code=db_open_failed error={}",
                    started_at.elapsed().as_millis(),
                    err
                );
                return Err(err.into());
            }
        };

        match bootstrap_connection(&conn) {
            Ok(()) => {
                debug!(
                    "event=db_open module=db status=ok duration_ms={}",
                    started_at.elapsed().as_millis()
                );
                Ok(conn)
            }
            Err(err) => {
                error!(
                    "event=db_open module=db status=error duration_ms={} error_code=db_bootstrap_failed error={}",
                    started_at.elapsed().as_millis(),
                    err
                );
                Err(err)
            }
        }
    }
}

fn bootstrap_connection(conn: &Connection) -> DbResult<()> {
    conn.execute_batch("PRAGMA foreign_keys = ON;")?;
    conn.busy_timeout(BUSY_TIMEOUT)?;
    for table in REQUIRED_TABLES {
        if !table_exists(conn, table)? {
            return Err(DbError::MissingTable(table));
        }
    }
    Ok(())
}

fn table_exists(conn: &Connection, table: &str) -> DbResult<bool> {
    let exists: i64 = conn.query_row(
        "SELECT EXISTS(
            SELECT 1
            FROM sqlite_master
            WHERE type = 'table' AND name = ?1
        );",
        [table],
        |row| row.get(0),
    )?;
    Ok(exists == 1)
}
