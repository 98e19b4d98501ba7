//! Olympiad repository over `Olimpiada`.
//!
//! # Invariants
//! - `temporada` holds exactly `Winter` or `Summer`; anything else is
//!   rejected on read instead of being guessed.
//! - An olympiad is deletable only while no `Evento` row references it.

use super::{
    count_references, ensure_changed, generated_key, query_all, query_optional, EntityRepository,
    RepoError, RepoResult,
};
use crate::db::ConnectionProvider;
use crate::model::olympiad::{Olympiad, Season};
use crate::model::EntityId;
use rusqlite::{params, Row};

const OLYMPIAD_SELECT_SQL: &str = "SELECT
    id_olimpiada,
    nombre,
    anio,
    temporada,
    ciudad
FROM Olimpiada";

/// SQLite-backed olympiad repository.
#[derive(Debug, Clone)]
pub struct SqliteOlympiadRepository<P> {
    provider: P,
}

impl<P: ConnectionProvider> SqliteOlympiadRepository<P> {
    pub fn new(provider: P) -> Self {
        Self { provider }
    }
}

impl<P: ConnectionProvider> EntityRepository for SqliteOlympiadRepository<P> {
    type Entity = Olympiad;
    type Key = EntityId;

    const ENTITY: &'static str = "olympiad";

    fn try_get_by_id(&self, id: EntityId) -> RepoResult<Option<Olympiad>> {
        let conn = self.provider.acquire()?;
        query_optional(
            &conn,
            &format!("{OLYMPIAD_SELECT_SQL} WHERE id_olimpiada = ?1;"),
            [id],
            parse_olympiad_row,
        )
    }

    fn try_list_all(&self) -> RepoResult<Vec<Olympiad>> {
        let conn = self.provider.acquire()?;
        query_all(&conn, OLYMPIAD_SELECT_SQL, [], parse_olympiad_row)
    }

    fn try_insert(&self, olympiad: &Olympiad) -> RepoResult<EntityId> {
        olympiad.validate()?;

        let mut conn = self.provider.acquire()?;
        let tx = conn.transaction()?;
        let changed = tx.execute(
            "INSERT INTO Olimpiada (nombre, anio, temporada, ciudad) VALUES (?1, ?2, ?3, ?4);",
            params![
                olympiad.name.as_str(),
                olympiad.year,
                season_to_db(olympiad.season),
                olympiad.city.as_str(),
            ],
        )?;
        let id = generated_key(&tx, changed, Self::ENTITY)?;
        tx.commit()?;
        Ok(id)
    }

    fn try_update(&self, old: &Olympiad, new: &Olympiad) -> RepoResult<()> {
        new.validate()?;

        let conn = self.provider.acquire()?;
        let changed = conn.execute(
            "UPDATE Olimpiada
             SET
                nombre = ?1,
                anio = ?2,
                temporada = ?3,
                ciudad = ?4
             WHERE id_olimpiada = ?5;",
            params![
                new.name.as_str(),
                new.year,
                season_to_db(new.season),
                new.city.as_str(),
                old.id,
            ],
        )?;
        ensure_changed(changed, Self::ENTITY, old.id)
    }

    fn try_delete(&self, olympiad: &Olympiad) -> RepoResult<()> {
        let conn = self.provider.acquire()?;
        let changed = conn.execute(
            "DELETE FROM Olimpiada WHERE id_olimpiada = ?1;",
            [olympiad.id],
        )?;
        ensure_changed(changed, Self::ENTITY, olympiad.id)
    }

    fn dependent_count(&self, olympiad: &Olympiad) -> RepoResult<u64> {
        let conn = self.provider.acquire()?;
        count_references(&conn, "Evento", "id_olimpiada", olympiad.id)
    }
}

fn parse_olympiad_row(row: &Row<'_>) -> RepoResult<Olympiad> {
    let season_text: String = row.get("temporada")?;
    let season = parse_season(&season_text).ok_or_else(|| {
        RepoError::InvalidData(format!(
            "invalid season `{season_text}` in Olimpiada.temporada"
        ))
    })?;

    Ok(Olympiad {
        id: row.get("id_olimpiada")?,
        name: row.get("nombre")?,
        year: row.get("anio")?,
        season,
        city: row.get("ciudad")?,
    })
}

fn season_to_db(season: Season) -> &'static str {
    match season {
        Season::Winter => "Winter",
        Season::Summer => "Summer",
    }
}

fn parse_season(value: &str) -> Option<Season> {
    match value {
        "Winter" => Some(Season::Winter),
        "Summer" => Some(Season::Summer),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::{parse_season, season_to_db};
    use crate::model::olympiad::Season;

    #[test]
    fn season_storage_strings_are_exact() {
        assert_eq!(season_to_db(Season::Winter), "Winter");
        assert_eq!(season_to_db(Season::Summer), "Summer");
        assert_eq!(parse_season("Summer"), Some(Season::Summer));
        assert_eq!(parse_season("summer"), None);
    }
}
