//! Storage configuration, connection bootstrap and schema provisioning.
//!
//! # Responsibility
//! - Turn externally supplied configuration into short-lived connections.
//! - Own the fixed table layout the repositories read and write.
//!
//! # Invariants
//! - Every repository operation acquires its own connection and drops it
//!   before returning; nothing here pools or caches connections.
//! - A connection is only handed out once the required tables are present.

use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::PathBuf;

pub mod config;
mod provider;
pub mod schema;

pub use config::{ConfigError, DbConfig};
pub use provider::{ConnectionProvider, SqliteConnectionProvider};

pub type DbResult<T> = Result<T, DbError>;

/// Connectivity failure: no usable connection could be produced.
#[derive(Debug)]
pub enum DbError {
    Sqlite(rusqlite::Error),
    /// The configured database file does not exist.
    DatabaseMissing(PathBuf),
    /// The database exists but lacks one of the catalog tables.
    MissingTable(&'static str),
}

impl Display for DbError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Sqlite(err) => write!(f, "{err}"),
            Self::DatabaseMissing(path) => {
                write!(f, "database file `{}` does not exist", path.display())
            }
            Self::MissingTable(table) => write!(f, "database is missing table `{table}`"),
        }
    }
}

impl Error for DbError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Sqlite(err) => Some(err),
            Self::DatabaseMissing(_) => None,
            Self::MissingTable(_) => None,
        }
    }
}

impl From<rusqlite::Error> for DbError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Sqlite(value)
    }
}
