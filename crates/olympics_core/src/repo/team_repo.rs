//! Team repository over `Equipo`.
//!
//! # Invariants
//! - A team is deletable only while no `Participacion` row references it.

use super::{
    count_references, ensure_changed, generated_key, query_all, query_optional, EntityRepository,
    RepoResult,
};
use crate::db::ConnectionProvider;
use crate::model::team::Team;
use crate::model::EntityId;
use rusqlite::{params, Row};

const TEAM_SELECT_SQL: &str = "SELECT id_equipo, nombre, iniciales FROM Equipo";

/// SQLite-backed team repository.
#[derive(Debug, Clone)]
pub struct SqliteTeamRepository<P> {
    provider: P,
}

impl<P: ConnectionProvider> SqliteTeamRepository<P> {
    pub fn new(provider: P) -> Self {
        Self { provider }
    }
}

impl<P: ConnectionProvider> EntityRepository for SqliteTeamRepository<P> {
    type Entity = Team;
    type Key = EntityId;

    const ENTITY: &'static str = "team";

    fn try_get_by_id(&self, id: EntityId) -> RepoResult<Option<Team>> {
        let conn = self.provider.acquire()?;
        query_optional(
            &conn,
            &format!("{TEAM_SELECT_SQL} WHERE id_equipo = ?1;"),
            [id],
            parse_team_row,
        )
    }

    fn try_list_all(&self) -> RepoResult<Vec<Team>> {
        let conn = self.provider.acquire()?;
        query_all(&conn, TEAM_SELECT_SQL, [], parse_team_row)
    }

    fn try_insert(&self, team: &Team) -> RepoResult<EntityId> {
        team.validate()?;

        let mut conn = self.provider.acquire()?;
        let tx = conn.transaction()?;
        let changed = tx.execute(
            "INSERT INTO Equipo (nombre, iniciales) VALUES (?1, ?2);",
            params![team.name.as_str(), team.code.as_str()],
        )?;
        let id = generated_key(&tx, changed, Self::ENTITY)?;
        tx.commit()?;
        Ok(id)
    }

    fn try_update(&self, old: &Team, new: &Team) -> RepoResult<()> {
        new.validate()?;

        let conn = self.provider.acquire()?;
        let changed = conn.execute(
            "UPDATE Equipo SET nombre = ?1, iniciales = ?2 WHERE id_equipo = ?3;",
            params![new.name.as_str(), new.code.as_str(), old.id],
        )?;
        ensure_changed(changed, Self::ENTITY, old.id)
    }

    fn try_delete(&self, team: &Team) -> RepoResult<()> {
        let conn = self.provider.acquire()?;
        let changed = conn.execute("DELETE FROM Equipo WHERE id_equipo = ?1;", [team.id])?;
        ensure_changed(changed, Self::ENTITY, team.id)
    }

    fn dependent_count(&self, team: &Team) -> RepoResult<u64> {
        let conn = self.provider.acquire()?;
        count_references(&conn, "Participacion", "id_equipo", team.id)
    }
}

fn parse_team_row(row: &Row<'_>) -> RepoResult<Team> {
    Ok(Team::with_id(
        row.get("id_equipo")?,
        row.get::<_, String>("nombre")?,
        row.get::<_, String>("iniciales")?,
    ))
}
