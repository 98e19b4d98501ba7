//! Sport repository over `Deporte`.
//!
//! # Invariants
//! - A sport is deletable only while no `Evento` row references it.

use super::{
    count_references, ensure_changed, generated_key, query_all, query_optional, EntityRepository,
    RepoResult,
};
use crate::db::ConnectionProvider;
use crate::model::sport::Sport;
use crate::model::EntityId;
use rusqlite::{params, Row};

const SPORT_SELECT_SQL: &str = "SELECT id_deporte, nombre FROM Deporte";

/// SQLite-backed sport repository.
#[derive(Debug, Clone)]
pub struct SqliteSportRepository<P> {
    provider: P,
}

impl<P: ConnectionProvider> SqliteSportRepository<P> {
    pub fn new(provider: P) -> Self {
        Self { provider }
    }
}

impl<P: ConnectionProvider> EntityRepository for SqliteSportRepository<P> {
    type Entity = Sport;
    type Key = EntityId;

    const ENTITY: &'static str = "sport";

    fn try_get_by_id(&self, id: EntityId) -> RepoResult<Option<Sport>> {
        let conn = self.provider.acquire()?;
        query_optional(
            &conn,
            &format!("{SPORT_SELECT_SQL} WHERE id_deporte = ?1;"),
            [id],
            parse_sport_row,
        )
    }

    fn try_list_all(&self) -> RepoResult<Vec<Sport>> {
        let conn = self.provider.acquire()?;
        query_all(&conn, SPORT_SELECT_SQL, [], parse_sport_row)
    }

    fn try_insert(&self, sport: &Sport) -> RepoResult<EntityId> {
        sport.validate()?;

        let mut conn = self.provider.acquire()?;
        let tx = conn.transaction()?;
        let changed = tx.execute(
            "INSERT INTO Deporte (nombre) VALUES (?1);",
            [sport.name.as_str()],
        )?;
        let id = generated_key(&tx, changed, Self::ENTITY)?;
        tx.commit()?;
        Ok(id)
    }

    fn try_update(&self, old: &Sport, new: &Sport) -> RepoResult<()> {
        new.validate()?;

        let conn = self.provider.acquire()?;
        let changed = conn.execute(
            "UPDATE Deporte SET nombre = ?1 WHERE id_deporte = ?2;",
            params![new.name.as_str(), old.id],
        )?;
        ensure_changed(changed, Self::ENTITY, old.id)
    }

    fn try_delete(&self, sport: &Sport) -> RepoResult<()> {
        let conn = self.provider.acquire()?;
        let changed = conn.execute("DELETE FROM Deporte WHERE id_deporte = ?1;", [sport.id])?;
        ensure_changed(changed, Self::ENTITY, sport.id)
    }

    fn dependent_count(&self, sport: &Sport) -> RepoResult<u64> {
        let conn = self.provider.acquire()?;
        count_references(&conn, "Evento", "id_deporte", sport.id)
    }
}

fn parse_sport_row(row: &Row<'_>) -> RepoResult<Sport> {
    Ok(Sport::with_id(row.get("id_deporte")?, row.get::<_, String>("nombre")?))
}
