//! Catalog table layout.
//!
//! `install_schema` is idempotent (`CREATE TABLE IF NOT EXISTS`) and keeps no
//! version history; it provisions an empty database, nothing more.

use super::config::DbConfig;
use super::DbResult;
use log::info;
use rusqlite::{Connection, OpenFlags};

const SCHEMA_SQL: &str = include_str!("schema.sql");

/// Tables every connection must expose before repositories may use it.
pub const REQUIRED_TABLES: [&str; 6] = [
    "Deporte",
    "Deportista",
    "Equipo",
    "Olimpiada",
    "Evento",
    "Participacion",
];

/// Creates any missing catalog tables on `conn`.
pub fn install_schema(conn: &Connection) -> DbResult<()> {
    conn.execute_batch(SCHEMA_SQL)?;
    Ok(())
}

/// Creates the configured database file if needed and installs the schema.
///
/// Needs write access to `config.address`.
pub fn create_database(config: &DbConfig) -> DbResult<()> {
    let path = config.database_path();
    let conn = Connection::open_with_flags(
        &path,
        OpenFlags::SQLITE_OPEN_READ_WRITE | OpenFlags::SQLITE_OPEN_CREATE,
    )?;
    install_schema(&conn)?;
    info!(
        "event=schema_install module=db status=ok path={}",
        path.display()
    );
    Ok(())
}
