//! Repository layer: per-entity persistence over short-lived connections.
//!
//! # Responsibility
//! - Map catalog rows to model records and back.
//! - Hydrate foreign keys into nested records through injected repositories.
//! - Report dependent-row counts so callers can decide whether a delete is safe.
//!
//! # Invariants
//! - Every operation acquires its own connection and drops it before return.
//! - Write paths call `validate()` before any SQL runs.
//! - Inserts either commit the row together with its generated key, or leave
//!   nothing behind.
//! - `try_*` methods carry the failure reason; the unprefixed methods are the
//!   soft contract (`Option`, `bool`, sentinel key) and log what they swallow.

pub mod athlete_repo;
pub mod event_repo;
pub mod olympiad_repo;
pub mod participation_repo;
pub mod sport_repo;
pub mod team_repo;

use crate::db::DbError;
use crate::model::participation::ParticipationKey;
use crate::model::validation::ValidationError;
use crate::model::EntityId;
use log::{error, warn};
use rusqlite::{Connection, ErrorCode, Params, Row};
use std::error::Error;
use std::fmt::{Debug, Display, Formatter};

pub type RepoResult<T> = Result<T, RepoError>;

/// Repository failure with its reason attached.
#[derive(Debug)]
pub enum RepoError {
    /// Connectivity or statement failure at the storage layer.
    Db(DbError),
    /// Input rejected before touching storage.
    Validation(ValidationError),
    /// Update/delete matched zero rows.
    NotFound { entity: &'static str, key: String },
    /// Stored value cannot be mapped back to the model.
    InvalidData(String),
    /// Insert reported no affected row or no storage-assigned key.
    KeyNotGenerated(&'static str),
}

impl RepoError {
    /// Returns `true` when storage rejected the statement on a constraint
    /// (foreign key, primary key or check).
    pub fn is_constraint_violation(&self) -> bool {
        matches!(
            self,
            Self::Db(DbError::Sqlite(rusqlite::Error::SqliteFailure(err, _)))
                if err.code == ErrorCode::ConstraintViolation
        )
    }

    fn not_found(entity: &'static str, key: impl Debug) -> Self {
        Self::NotFound {
            entity,
            key: format!("{key:?}"),
        }
    }
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "{err}"),
            Self::Validation(err) => write!(f, "{err}"),
            Self::NotFound { entity, key } => write!(f, "{entity} not found: {key}"),
            Self::InvalidData(message) => write!(f, "invalid persisted data: {message}"),
            Self::KeyNotGenerated(entity) => {
                write!(f, "{entity} insert produced no generated key")
            }
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            Self::Validation(err) => Some(err),
            Self::NotFound { .. } => None,
            Self::InvalidData(_) => None,
            Self::KeyNotGenerated(_) => None,
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

impl From<ValidationError> for RepoError {
    fn from(value: ValidationError) -> Self {
        Self::Validation(value)
    }
}

/// Key type returned by inserts, with a sentinel no valid row can carry.
pub trait InsertKey: Copy + Debug + PartialEq {
    const INSERT_FAILED: Self;
}

impl InsertKey for EntityId {
    const INSERT_FAILED: Self = -1;
}

impl InsertKey for ParticipationKey {
    const INSERT_FAILED: Self = ParticipationKey {
        athlete_id: -1,
        event_id: -1,
    };
}

/// Sentinel returned by the soft `insert` of integer-keyed repositories.
pub const INSERT_FAILED: EntityId = <EntityId as InsertKey>::INSERT_FAILED;

/// Persistence contract shared by the six catalog repositories.
pub trait EntityRepository {
    type Entity;
    type Key: InsertKey;

    /// Entity name used in logs and errors.
    const ENTITY: &'static str;

    /// Single-row lookup; a missing row is `Ok(None)`.
    fn try_get_by_id(&self, key: Self::Key) -> RepoResult<Option<Self::Entity>>;
    /// All rows in storage order (no ordering is applied).
    fn try_list_all(&self) -> RepoResult<Vec<Self::Entity>>;
    /// Writes a new row and returns its storage-assigned key.
    fn try_insert(&self, entity: &Self::Entity) -> RepoResult<Self::Key>;
    /// Replaces the row identified by `old` with every field of `new`.
    fn try_update(&self, old: &Self::Entity, new: &Self::Entity) -> RepoResult<()>;
    fn try_delete(&self, entity: &Self::Entity) -> RepoResult<()>;
    /// Number of rows in dependent tables that reference `entity`.
    fn dependent_count(&self, entity: &Self::Entity) -> RepoResult<u64>;

    fn get_by_id(&self, key: Self::Key) -> Option<Self::Entity> {
        soften(Self::ENTITY, "get_by_id", self.try_get_by_id(key)).flatten()
    }

    fn list_all(&self) -> Vec<Self::Entity> {
        soften(Self::ENTITY, "list_all", self.try_list_all()).unwrap_or_default()
    }

    /// Returns the generated key, or `InsertKey::INSERT_FAILED`.
    fn insert(&self, entity: &Self::Entity) -> Self::Key {
        soften(Self::ENTITY, "insert", self.try_insert(entity))
            .unwrap_or(<Self::Key as InsertKey>::INSERT_FAILED)
    }

    fn update(&self, old: &Self::Entity, new: &Self::Entity) -> bool {
        soften(Self::ENTITY, "update", self.try_update(old, new)).is_some()
    }

    /// Deletes without checking dependents; see `is_deletable`.
    fn delete(&self, entity: &Self::Entity) -> bool {
        soften(Self::ENTITY, "delete", self.try_delete(entity)).is_some()
    }

    /// `true` iff no dependent row references `entity` right now.
    fn is_deletable(&self, entity: &Self::Entity) -> bool {
        soften(Self::ENTITY, "is_deletable", self.dependent_count(entity))
            .is_some_and(|count| count == 0)
    }
}

fn soften<T>(entity: &'static str, operation: &str, result: RepoResult<T>) -> Option<T> {
    match result {
        Ok(value) => Some(value),
        Err(err @ RepoError::NotFound { .. }) => {
            warn!(
                "event=repo_{operation} module=repo entity={entity} status=not_found error={err}"
            );
            None
        }
        Err(err) => {
            error!("event=repo_{operation} module=repo entity={entity} status=error error={err}");
            None
        }
    }
}

/// Reads at most one row. Row parsers return `RepoResult` because stored
/// enum text (`sexo`, `temporada`) can fail to map, which the closures of
/// `query_row`/`query_map` cannot report.
fn query_optional<T>(
    conn: &Connection,
    sql: &str,
    params: impl Params,
    mut parse: impl FnMut(&Row<'_>) -> RepoResult<T>,
) -> RepoResult<Option<T>> {
    let mut stmt = conn.prepare(sql)?;
    let mut rows = stmt.query(params)?;
    let found = match rows.next()? {
        Some(row) => Some(parse(row)?),
        None => None,
    };
    Ok(found)
}

/// Reads every row in storage order; see `query_optional`.
fn query_all<T>(
    conn: &Connection,
    sql: &str,
    params: impl Params,
    mut parse: impl FnMut(&Row<'_>) -> RepoResult<T>,
) -> RepoResult<Vec<T>> {
    let mut stmt = conn.prepare(sql)?;
    let mut rows = stmt.query(params)?;
    let mut items = Vec::new();
    while let Some(row) = rows.next()? {
        items.push(parse(row)?);
    }
    Ok(items)
}

/// Reads back the key assigned by the insert that just ran on `conn`.
fn generated_key(conn: &Connection, changed: usize, entity: &'static str) -> RepoResult<EntityId> {
    if changed == 0 {
        return Err(RepoError::KeyNotGenerated(entity));
    }
    let id = conn.last_insert_rowid();
    if id <= 0 {
        return Err(RepoError::KeyNotGenerated(entity));
    }
    Ok(id)
}

/// Fails with `NotFound` when a keyed update/delete matched nothing.
fn ensure_changed(changed: usize, entity: &'static str, key: impl Debug) -> RepoResult<()> {
    if changed == 0 {
        return Err(RepoError::not_found(entity, key));
    }
    Ok(())
}

/// `SELECT COUNT(*) FROM <table> WHERE <column> = id`.
fn count_references(
    conn: &Connection,
    table: &str,
    column: &str,
    id: EntityId,
) -> RepoResult<u64> {
    let count: i64 = conn.query_row(
        &format!("SELECT COUNT(*) FROM {table} WHERE {column} = ?1;"),
        [id],
        |row| row.get(0),
    )?;
    u64::try_from(count)
        .map_err(|_| RepoError::InvalidData(format!("negative count {count} from {table}")))
}
