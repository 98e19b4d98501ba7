#![allow(dead_code)]

use olympics_core::{
    Athlete, CatalogService, DbConfig, EntityRepository, Event, Olympiad, Season, Sex,
    SqliteConnectionProvider, Sport, Team,
};
use tempfile::TempDir;

pub const DATABASE_NAME: &str = "olympics";

/// Catalog over a fresh database file; the directory lives as long as the value.
pub struct TestCatalog {
    pub dir: TempDir,
    pub catalog: CatalogService<SqliteConnectionProvider>,
}

impl TestCatalog {
    pub fn config(&self) -> DbConfig {
        DbConfig::for_directory(self.dir.path(), DATABASE_NAME)
    }

    /// Connection outside the provider with foreign keys switched off, for
    /// planting rows the catalog would reject. The bundled SQLite enables
    /// foreign keys by default, so the pragma is set explicitly.
    pub fn raw_connection(&self) -> rusqlite::Connection {
        let conn = rusqlite::Connection::open(self.config().database_path()).unwrap();
        conn.execute_batch("PRAGMA foreign_keys = OFF;").unwrap();
        conn
    }
}

pub fn new_catalog() -> TestCatalog {
    let dir = tempfile::tempdir().unwrap();
    let config = DbConfig::for_directory(dir.path(), DATABASE_NAME);
    let catalog = CatalogService::create(config).unwrap();
    TestCatalog { dir, catalog }
}

pub fn saved_sport(catalog: &CatalogService<SqliteConnectionProvider>, name: &str) -> Sport {
    let id = catalog.sports().try_insert(&Sport::new(name)).unwrap();
    catalog.sports().get_by_id(id).unwrap()
}

pub fn saved_olympiad(
    catalog: &CatalogService<SqliteConnectionProvider>,
    name: &str,
    year: i32,
    season: Season,
    city: &str,
) -> Olympiad {
    let id = catalog
        .olympiads()
        .try_insert(&Olympiad::new(name, year, season, city))
        .unwrap();
    catalog.olympiads().get_by_id(id).unwrap()
}

pub fn saved_team(catalog: &CatalogService<SqliteConnectionProvider>, name: &str, code: &str) -> Team {
    let id = catalog.teams().try_insert(&Team::new(name, code)).unwrap();
    catalog.teams().get_by_id(id).unwrap()
}

pub fn saved_athlete(
    catalog: &CatalogService<SqliteConnectionProvider>,
    name: &str,
    sex: Sex,
) -> Athlete {
    let id = catalog
        .athletes()
        .try_insert(&Athlete::new(name, sex, 70, 180))
        .unwrap();
    catalog.athletes().get_by_id(id).unwrap()
}

pub fn saved_event(
    catalog: &CatalogService<SqliteConnectionProvider>,
    name: &str,
    olympiad: &Olympiad,
    sport: &Sport,
) -> Event {
    let id = catalog
        .events()
        .try_insert(&Event::new(name, olympiad.clone(), sport.clone()))
        .unwrap();
    catalog.events().get_by_id(id).unwrap()
}
