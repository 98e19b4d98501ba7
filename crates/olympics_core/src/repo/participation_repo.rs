//! Participation repository over `Participacion`.
//!
//! # Responsibility
//! - Persist athlete/event/team participations keyed by `(athlete, event)`.
//! - Hydrate all three foreign keys through the injected repositories.
//!
//! # Invariants
//! - The key is supplied by the caller, not generated; insert returns it only
//!   after exactly one row was written.
//! - Update may move a participation to a new `(athlete, event)` pair; the
//!   WHERE clause always uses the old pair.
//! - Nothing references a participation, so it is always deletable.

use super::{ensure_changed, query_all, query_optional, EntityRepository, RepoError, RepoResult};
use crate::db::ConnectionProvider;
use crate::model::athlete::Athlete;
use crate::model::event::Event;
use crate::model::participation::{Participation, ParticipationKey};
use crate::model::reference::Reference;
use crate::model::team::Team;
use crate::model::EntityId;
use rusqlite::{params, Row};

const PARTICIPATION_SELECT_SQL: &str = "SELECT
    id_deportista,
    id_evento,
    id_equipo,
    edad,
    medalla
FROM Participacion";
const BY_KEY_FILTER: &str = "WHERE id_deportista = ?1 AND id_evento = ?2";

struct ParticipationRow {
    athlete_id: EntityId,
    event_id: EntityId,
    team_id: EntityId,
    age: i32,
    medal: Option<String>,
}

/// SQLite-backed participation repository.
#[derive(Debug, Clone)]
pub struct SqliteParticipationRepository<P, A, E, T> {
    provider: P,
    athletes: A,
    events: E,
    teams: T,
}

impl<P, A, E, T> SqliteParticipationRepository<P, A, E, T>
where
    P: ConnectionProvider,
    A: EntityRepository<Entity = Athlete, Key = EntityId>,
    E: EntityRepository<Entity = Event, Key = EntityId>,
    T: EntityRepository<Entity = Team, Key = EntityId>,
{
    pub fn new(provider: P, athletes: A, events: E, teams: T) -> Self {
        Self {
            provider,
            athletes,
            events,
            teams,
        }
    }

    fn hydrate(&self, row: ParticipationRow) -> RepoResult<Participation> {
        let athlete =
            Reference::from_lookup(row.athlete_id, self.athletes.try_get_by_id(row.athlete_id)?);
        let event = Reference::from_lookup(row.event_id, self.events.try_get_by_id(row.event_id)?);
        let team = Reference::from_lookup(row.team_id, self.teams.try_get_by_id(row.team_id)?);

        Ok(Participation {
            athlete,
            event,
            team,
            age: row.age,
            medal: row.medal,
        })
    }
}

impl<P, A, E, T> EntityRepository for SqliteParticipationRepository<P, A, E, T>
where
    P: ConnectionProvider,
    A: EntityRepository<Entity = Athlete, Key = EntityId>,
    E: EntityRepository<Entity = Event, Key = EntityId>,
    T: EntityRepository<Entity = Team, Key = EntityId>,
{
    type Entity = Participation;
    type Key = ParticipationKey;

    const ENTITY: &'static str = "participation";

    fn try_get_by_id(&self, key: ParticipationKey) -> RepoResult<Option<Participation>> {
        let row = {
            let conn = self.provider.acquire()?;
            query_optional(
                &conn,
                &format!("{PARTICIPATION_SELECT_SQL} {BY_KEY_FILTER};"),
                params![key.athlete_id, key.event_id],
                parse_participation_row,
            )?
        };

        row.map(|row| self.hydrate(row)).transpose()
    }

    fn try_list_all(&self) -> RepoResult<Vec<Participation>> {
        let rows = {
            let conn = self.provider.acquire()?;
            query_all(&conn, PARTICIPATION_SELECT_SQL, [], parse_participation_row)?
        };

        rows.into_iter().map(|row| self.hydrate(row)).collect()
    }

    fn try_insert(&self, participation: &Participation) -> RepoResult<ParticipationKey> {
        participation.validate()?;

        let conn = self.provider.acquire()?;
        let changed = conn.execute(
            "INSERT INTO Participacion (id_deportista, id_evento, id_equipo, edad, medalla)
             VALUES (?1, ?2, ?3, ?4, ?5);",
            params![
                participation.athlete.id(),
                participation.event.id(),
                participation.team.id(),
                participation.age,
                participation.medal.as_deref(),
            ],
        )?;
        if changed == 0 {
            return Err(RepoError::KeyNotGenerated(Self::ENTITY));
        }
        Ok(participation.key())
    }

    fn try_update(&self, old: &Participation, new: &Participation) -> RepoResult<()> {
        new.validate()?;

        let old_key = old.key();
        let conn = self.provider.acquire()?;
        let changed = conn.execute(
            "UPDATE Participacion
             SET
                id_deportista = ?1,
                id_evento = ?2,
                id_equipo = ?3,
                edad = ?4,
                medalla = ?5
             WHERE id_deportista = ?6 AND id_evento = ?7;",
            params![
                new.athlete.id(),
                new.event.id(),
                new.team.id(),
                new.age,
                new.medal.as_deref(),
                old_key.athlete_id,
                old_key.event_id,
            ],
        )?;
        ensure_changed(changed, Self::ENTITY, old_key)
    }

    fn try_delete(&self, participation: &Participation) -> RepoResult<()> {
        let key = participation.key();
        let conn = self.provider.acquire()?;
        let changed = conn.execute(
            &format!("DELETE FROM Participacion {BY_KEY_FILTER};"),
            params![key.athlete_id, key.event_id],
        )?;
        ensure_changed(changed, Self::ENTITY, key)
    }

    fn dependent_count(&self, _participation: &Participation) -> RepoResult<u64> {
        Ok(0)
    }
}

fn parse_participation_row(row: &Row<'_>) -> RepoResult<ParticipationRow> {
    Ok(ParticipationRow {
        athlete_id: row.get("id_deportista")?,
        event_id: row.get("id_evento")?,
        team_id: row.get("id_equipo")?,
        age: row.get::<_, Option<i32>>("edad")?.unwrap_or_default(),
        medal: row.get("medalla")?,
    })
}
