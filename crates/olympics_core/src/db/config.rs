//! Database connection configuration.
//!
//! # Responsibility
//! - Parse the key-value configuration handed over by the host application.
//! - Resolve the database file for the SQLite backend.
//!
//! # Invariants
//! - The password never appears in `Debug` output or logs.
//! - The core does not read configuration files itself; callers inject the map.

use std::collections::HashMap;
use std::error::Error;
use std::fmt::{Debug, Display, Formatter};
use std::path::PathBuf;

pub const KEY_ADDRESS: &str = "address";
pub const KEY_PORT: &str = "port";
pub const KEY_DATABASE: &str = "database";
pub const KEY_USER: &str = "user";
pub const KEY_PASSWORD: &str = "password";

const DATABASE_FILE_EXTENSION: &str = "sqlite3";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    MissingKey(&'static str),
    InvalidPort(String),
    BlankValue(&'static str),
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MissingKey(key) => write!(f, "configuration key `{key}` is missing"),
            Self::InvalidPort(value) => write!(f, "configuration `port` is not a valid port: `{value}`"),
            Self::BlankValue(key) => write!(f, "configuration key `{key}` must not be blank"),
        }
    }
}

impl Error for ConfigError {}

/// Connection target and credentials.
///
/// For the SQLite backend `address` names the directory holding database
/// files and `database` the file stem; `port`, `user` and `password` are kept
/// so the same configuration can drive a networked backend.
#[derive(Clone, PartialEq, Eq)]
pub struct DbConfig {
    pub address: String,
    pub port: u16,
    pub database: String,
    pub user: String,
    pub password: String,
}

impl DbConfig {
    /// Builds a config from a loaded key-value map.
    ///
    /// # Errors
    /// - `MissingKey` when `address`, `port`, `database` or `user` is absent.
    /// - `BlankValue` when `address` or `database` is blank.
    /// - `InvalidPort` when `port` is not a `u16`.
    ///
    /// A missing `password` is treated as empty.
    pub fn from_properties(properties: &HashMap<String, String>) -> Result<Self, ConfigError> {
        let address = required(properties, KEY_ADDRESS)?;
        let database = required(properties, KEY_DATABASE)?;
        let user = properties
            .get(KEY_USER)
            .map(|value| value.trim().to_string())
            .ok_or(ConfigError::MissingKey(KEY_USER))?;
        let port_text = properties
            .get(KEY_PORT)
            .map(|value| value.trim())
            .ok_or(ConfigError::MissingKey(KEY_PORT))?;
        let port = port_text
            .parse::<u16>()
            .map_err(|_| ConfigError::InvalidPort(port_text.to_string()))?;
        let password = properties.get(KEY_PASSWORD).cloned().unwrap_or_default();

        Ok(Self {
            address,
            port,
            database,
            user,
            password,
        })
    }

    /// Config pointing at `<dir>/<database>.sqlite3` with placeholder
    /// credentials.
    pub fn for_directory(dir: impl Into<PathBuf>, database: impl Into<String>) -> Self {
        Self {
            address: dir.into().to_string_lossy().into_owned(),
            port: 0,
            database: database.into(),
            user: String::new(),
            password: String::new(),
        }
    }

    pub fn database_path(&self) -> PathBuf {
        PathBuf::from(&self.address).join(format!("{}.{DATABASE_FILE_EXTENSION}", self.database))
    }
}

impl Debug for DbConfig {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DbConfig")
            .field("address", &self.address)
            .field("port", &self.port)
            .field("database", &self.database)
            .field("user", &self.user)
            .field("password", &"<redacted>")
            .finish()
    }
}

fn required(
    properties: &HashMap<String, String>,
    key: &'static str,
) -> Result<String, ConfigError> {
    let value = properties.get(key).ok_or(ConfigError::MissingKey(key))?;
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ConfigError::BlankValue(key));
    }
    Ok(trimmed.to_string())
}
