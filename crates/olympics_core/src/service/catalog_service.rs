//! Catalog wiring and checked deletes.
//!
//! # Responsibility
//! - Build all six repositories over one connection provider, with Event
//!   and Participation receiving their dependency repositories.
//! - Provide `delete_*_checked` paths that re-count dependents immediately
//!   before deleting.
//!
//! # Invariants
//! - Checked deletes never consult an earlier `is_deletable` answer.
//! - Repository `delete` stays available and advisory; only the checked
//!   paths refuse entities that still have dependents.
//! - Athletes hydrated into participations carry no photo bytes.

use crate::db::schema::create_database;
use crate::db::{ConnectionProvider, DbConfig, DbResult, SqliteConnectionProvider};
use crate::model::athlete::Athlete;
use crate::model::event::Event;
use crate::model::olympiad::Olympiad;
use crate::model::participation::Participation;
use crate::model::sport::Sport;
use crate::model::team::Team;
use crate::repo::athlete_repo::{PhotoLoading, SqliteAthleteRepository};
use crate::repo::event_repo::SqliteEventRepository;
use crate::repo::olympiad_repo::SqliteOlympiadRepository;
use crate::repo::participation_repo::SqliteParticipationRepository;
use crate::repo::sport_repo::SqliteSportRepository;
use crate::repo::team_repo::SqliteTeamRepository;
use crate::repo::{EntityRepository, RepoError};
use log::info;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Event repository wired to the default olympiad/sport repositories.
pub type EventRepository<P> =
    SqliteEventRepository<P, SqliteOlympiadRepository<P>, SqliteSportRepository<P>>;

/// Participation repository wired to the default athlete/event/team repositories.
pub type ParticipationRepository<P> = SqliteParticipationRepository<
    P,
    SqliteAthleteRepository<P>,
    EventRepository<P>,
    SqliteTeamRepository<P>,
>;

pub type ServiceResult<T> = Result<T, ServiceError>;

/// Errors from checked catalog operations.
#[derive(Debug)]
pub enum ServiceError {
    /// Dependent rows still reference the entity.
    HasDependents {
        entity: &'static str,
        dependents: u64,
    },
    /// The entity's row no longer exists.
    NotFound { entity: &'static str, key: String },
    Repo(RepoError),
}

impl Display for ServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::HasDependents { entity, dependents } => write!(
                f,
                "{entity} is still referenced by {dependents} dependent row(s)"
            ),
            Self::NotFound { entity, key } => write!(f, "{entity} not found: {key}"),
            Self::Repo(err) => write!(f, "{err}"),
        }
    }
}

impl Error for ServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::HasDependents { .. } | Self::NotFound { .. } => None,
            Self::Repo(err) => Some(err),
        }
    }
}

impl From<RepoError> for ServiceError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::NotFound { entity, key } => Self::NotFound { entity, key },
            other => Self::Repo(other),
        }
    }
}

/// Deletes `entity` only if no dependent row references it at call time.
pub fn delete_checked<R: EntityRepository>(repo: &R, entity: &R::Entity) -> ServiceResult<()> {
    let dependents = repo.dependent_count(entity)?;
    if dependents > 0 {
        info!(
            "event=delete_checked module=service entity={} status=refused dependents={}",
            R::ENTITY,
            dependents
        );
        return Err(ServiceError::HasDependents {
            entity: R::ENTITY,
            dependents,
        });
    }
    repo.try_delete(entity)?;
    Ok(())
}

/// All catalog repositories sharing one connection provider.
pub struct CatalogService<P> {
    sports: SqliteSportRepository<P>,
    athletes: SqliteAthleteRepository<P>,
    teams: SqliteTeamRepository<P>,
    olympiads: SqliteOlympiadRepository<P>,
    events: EventRepository<P>,
    participations: ParticipationRepository<P>,
}

impl CatalogService<SqliteConnectionProvider> {
    /// Builds the catalog over the database described by `config`.
    pub fn open(config: DbConfig) -> Self {
        Self::new(SqliteConnectionProvider::new(config))
    }

    /// Creates the database file and tables if needed, then builds the catalog.
    pub fn create(config: DbConfig) -> DbResult<Self> {
        create_database(&config)?;
        Ok(Self::open(config))
    }
}

impl<P: ConnectionProvider + Clone> CatalogService<P> {
    pub fn new(provider: P) -> Self {
        let event_repo = || {
            SqliteEventRepository::new(
                provider.clone(),
                SqliteOlympiadRepository::new(provider.clone()),
                SqliteSportRepository::new(provider.clone()),
            )
        };

        Self {
            sports: SqliteSportRepository::new(provider.clone()),
            athletes: SqliteAthleteRepository::new(provider.clone()),
            teams: SqliteTeamRepository::new(provider.clone()),
            olympiads: SqliteOlympiadRepository::new(provider.clone()),
            events: event_repo(),
            participations: SqliteParticipationRepository::new(
                provider.clone(),
                SqliteAthleteRepository::new(provider.clone())
                    .with_photo_loading(PhotoLoading::OnDemand),
                event_repo(),
                SqliteTeamRepository::new(provider.clone()),
            ),
        }
    }

    pub fn sports(&self) -> &SqliteSportRepository<P> {
        &self.sports
    }

    pub fn athletes(&self) -> &SqliteAthleteRepository<P> {
        &self.athletes
    }

    pub fn teams(&self) -> &SqliteTeamRepository<P> {
        &self.teams
    }

    pub fn olympiads(&self) -> &SqliteOlympiadRepository<P> {
        &self.olympiads
    }

    pub fn events(&self) -> &EventRepository<P> {
        &self.events
    }

    pub fn participations(&self) -> &ParticipationRepository<P> {
        &self.participations
    }

    pub fn delete_sport_checked(&self, sport: &Sport) -> ServiceResult<()> {
        delete_checked(&self.sports, sport)
    }

    pub fn delete_athlete_checked(&self, athlete: &Athlete) -> ServiceResult<()> {
        delete_checked(&self.athletes, athlete)
    }

    pub fn delete_team_checked(&self, team: &Team) -> ServiceResult<()> {
        delete_checked(&self.teams, team)
    }

    pub fn delete_olympiad_checked(&self, olympiad: &Olympiad) -> ServiceResult<()> {
        delete_checked(&self.olympiads, olympiad)
    }

    pub fn delete_event_checked(&self, event: &Event) -> ServiceResult<()> {
        delete_checked(&self.events, event)
    }

    pub fn delete_participation_checked(&self, participation: &Participation) -> ServiceResult<()> {
        delete_checked(&self.participations, participation)
    }
}
