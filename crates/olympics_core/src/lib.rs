//! Data-access core for the Olympics catalog.
//! Owns the entity records, the per-entity repositories and the
//! referential-integrity checks that guard deletes.

pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;

pub use db::{ConfigError, ConnectionProvider, DbConfig, DbError, DbResult, SqliteConnectionProvider};
pub use logging::{default_log_level, init_logging, logging_status, LoggingError};
pub use model::athlete::{Athlete, Photo, Sex};
pub use model::event::Event;
pub use model::olympiad::{Olympiad, Season};
pub use model::participation::{Participation, ParticipationKey};
pub use model::reference::Reference;
pub use model::sport::Sport;
pub use model::team::Team;
pub use model::validation::ValidationError;
pub use model::{EntityId, Identified};
pub use repo::athlete_repo::{PhotoLoading, SqliteAthleteRepository};
pub use repo::event_repo::SqliteEventRepository;
pub use repo::olympiad_repo::SqliteOlympiadRepository;
pub use repo::participation_repo::SqliteParticipationRepository;
pub use repo::sport_repo::SqliteSportRepository;
pub use repo::team_repo::SqliteTeamRepository;
pub use repo::{EntityRepository, InsertKey, RepoError, RepoResult, INSERT_FAILED};
pub use service::catalog_service::{
    delete_checked, CatalogService, EventRepository, ParticipationRepository, ServiceError,
    ServiceResult,
};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
