//! Event repository over `Evento`.
//!
//! # Responsibility
//! - Persist events with their olympiad/sport foreign keys.
//! - Hydrate both foreign keys through the injected repositories.
//!
//! # Invariants
//! - Hydration runs after this repository's own connection is released; each
//!   nested lookup acquires its own connection.
//! - `list_all` issues one olympiad and one sport lookup per row.
//! - A missing olympiad/sport row yields `Reference::Unresolved`.
//! - An event is deletable only while no `Participacion` row references it.

use super::{
    count_references, ensure_changed, generated_key, query_all, query_optional, EntityRepository,
    RepoResult,
};
use crate::db::ConnectionProvider;
use crate::model::event::Event;
use crate::model::olympiad::Olympiad;
use crate::model::reference::Reference;
use crate::model::sport::Sport;
use crate::model::EntityId;
use rusqlite::{params, Row};

const EVENT_SELECT_SQL: &str = "SELECT
    id_evento,
    nombre,
    id_olimpiada,
    id_deporte
FROM Evento";

/// `Evento` row before its foreign keys are hydrated.
struct EventRow {
    id: EntityId,
    name: String,
    olympiad_id: EntityId,
    sport_id: EntityId,
}

/// SQLite-backed event repository.
#[derive(Debug, Clone)]
pub struct SqliteEventRepository<P, O, S> {
    provider: P,
    olympiads: O,
    sports: S,
}

impl<P, O, S> SqliteEventRepository<P, O, S>
where
    P: ConnectionProvider,
    O: EntityRepository<Entity = Olympiad, Key = EntityId>,
    S: EntityRepository<Entity = Sport, Key = EntityId>,
{
    pub fn new(provider: P, olympiads: O, sports: S) -> Self {
        Self {
            provider,
            olympiads,
            sports,
        }
    }

    fn hydrate(&self, row: EventRow) -> RepoResult<Event> {
        let olympiad = Reference::from_lookup(
            row.olympiad_id,
            self.olympiads.try_get_by_id(row.olympiad_id)?,
        );
        let sport = Reference::from_lookup(row.sport_id, self.sports.try_get_by_id(row.sport_id)?);

        Ok(Event {
            id: row.id,
            name: row.name,
            olympiad,
            sport,
        })
    }
}

impl<P, O, S> EntityRepository for SqliteEventRepository<P, O, S>
where
    P: ConnectionProvider,
    O: EntityRepository<Entity = Olympiad, Key = EntityId>,
    S: EntityRepository<Entity = Sport, Key = EntityId>,
{
    type Entity = Event;
    type Key = EntityId;

    const ENTITY: &'static str = "event";

    fn try_get_by_id(&self, id: EntityId) -> RepoResult<Option<Event>> {
        let row = {
            let conn = self.provider.acquire()?;
            query_optional(
                &conn,
                &format!("{EVENT_SELECT_SQL} WHERE id_evento = ?1;"),
                [id],
                parse_event_row,
            )?
        };

        row.map(|row| self.hydrate(row)).transpose()
    }

    fn try_list_all(&self) -> RepoResult<Vec<Event>> {
        let rows = {
            let conn = self.provider.acquire()?;
            query_all(&conn, EVENT_SELECT_SQL, [], parse_event_row)?
        };

        rows.into_iter().map(|row| self.hydrate(row)).collect()
    }

    fn try_insert(&self, event: &Event) -> RepoResult<EntityId> {
        event.validate()?;

        let mut conn = self.provider.acquire()?;
        let tx = conn.transaction()?;
        let changed = tx.execute(
            "INSERT INTO Evento (nombre, id_olimpiada, id_deporte) VALUES (?1, ?2, ?3);",
            params![event.name.as_str(), event.olympiad.id(), event.sport.id()],
        )?;
        let id = generated_key(&tx, changed, Self::ENTITY)?;
        tx.commit()?;
        Ok(id)
    }

    fn try_update(&self, old: &Event, new: &Event) -> RepoResult<()> {
        new.validate()?;

        let conn = self.provider.acquire()?;
        let changed = conn.execute(
            "UPDATE Evento
             SET
                nombre = ?1,
                id_olimpiada = ?2,
                id_deporte = ?3
             WHERE id_evento = ?4;",
            params![
                new.name.as_str(),
                new.olympiad.id(),
                new.sport.id(),
                old.id,
            ],
        )?;
        ensure_changed(changed, Self::ENTITY, old.id)
    }

    fn try_delete(&self, event: &Event) -> RepoResult<()> {
        let conn = self.provider.acquire()?;
        let changed = conn.execute("DELETE FROM Evento WHERE id_evento = ?1;", [event.id])?;
        ensure_changed(changed, Self::ENTITY, event.id)
    }

    fn dependent_count(&self, event: &Event) -> RepoResult<u64> {
        let conn = self.provider.acquire()?;
        count_references(&conn, "Participacion", "id_evento", event.id)
    }
}

fn parse_event_row(row: &Row<'_>) -> RepoResult<EventRow> {
    Ok(EventRow {
        id: row.get("id_evento")?,
        name: row.get("nombre")?,
        olympiad_id: row.get("id_olimpiada")?,
        sport_id: row.get("id_deporte")?,
    })
}
