//! Command-line front end for the catalog core.
//!
//! # Responsibility
//! - Load a `key=value` properties file and hand it to the core as config.
//! - Provision the schema or dump one entity table as JSON lines.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use config::{Config, File, FileFormat};
use log::info;
use olympics_core::db::schema::create_database;
use olympics_core::{
    core_version, default_log_level, init_logging, CatalogService, DbConfig, EntityRepository,
    PhotoLoading, SqliteAthleteRepository, SqliteConnectionProvider,
};
use serde::Serialize;
use std::collections::HashMap;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

const KEY_LOG_DIR: &str = "log_dir";
const KEY_LOG_LEVEL: &str = "log_level";

#[derive(Parser, Debug)]
#[command(
    name = "olympics_cli",
    version,
    about = "Provision and inspect an Olympics catalog database"
)]
struct Cli {
    /// Properties file with address, port, database, user and password
    /// (plus optional log_dir and log_level)
    config: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug, PartialEq, Eq)]
enum Command {
    /// Create the database file and any missing tables
    InitSchema,
    /// Print every row of one table as JSON lines
    List {
        #[arg(value_enum)]
        entity: EntityKind,
    },
    /// Print the core version
    Ping,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
enum EntityKind {
    Sports,
    Athletes,
    Teams,
    Olympiads,
    Events,
    Participations,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    if cli.command == Command::Ping {
        println!("olympics_core version={}", core_version());
        return Ok(());
    }

    let properties = load_properties(&cli.config)?;
    if let Some(log_dir) = properties.get(KEY_LOG_DIR) {
        let level = properties
            .get(KEY_LOG_LEVEL)
            .map(String::as_str)
            .unwrap_or_else(|| default_log_level());
        init_logging(level, log_dir).context("failed to start logging")?;
    }
    let config = DbConfig::from_properties(&properties)
        .with_context(|| format!("invalid configuration in `{}`", cli.config.display()))?;

    info!(
        "event=cli_command module=cli status=start command={:?} database={}",
        cli.command,
        config.database_path().display()
    );

    match cli.command {
        Command::InitSchema => {
            create_database(&config).context("failed to provision the schema")?;
            println!("schema ready at {}", config.database_path().display());
        }
        Command::List { entity } => {
            let provider = SqliteConnectionProvider::new(config);
            let stdout = io::stdout();
            write_entity_rows(&provider, entity, stdout.lock())?;
        }
        Command::Ping => {}
    }
    Ok(())
}

/// Reads a flat `key=value` file; `#` and `;` start comments.
fn load_properties(path: &Path) -> Result<HashMap<String, String>> {
    Config::builder()
        .add_source(File::from(path).format(FileFormat::Ini))
        .build()
        .and_then(Config::try_deserialize)
        .with_context(|| format!("cannot read properties from `{}`", path.display()))
}

fn write_entity_rows(
    provider: &SqliteConnectionProvider,
    entity: EntityKind,
    out: impl Write,
) -> Result<usize> {
    let catalog = CatalogService::new(provider.clone());
    match entity {
        EntityKind::Sports => write_rows(catalog.sports(), out),
        EntityKind::Athletes => {
            // Photos are not serialized, so their bytes are never loaded.
            let athletes = SqliteAthleteRepository::new(provider.clone())
                .with_photo_loading(PhotoLoading::OnDemand);
            write_rows(&athletes, out)
        }
        EntityKind::Teams => write_rows(catalog.teams(), out),
        EntityKind::Olympiads => write_rows(catalog.olympiads(), out),
        EntityKind::Events => write_rows(catalog.events(), out),
        EntityKind::Participations => write_rows(catalog.participations(), out),
    }
}

fn write_rows<R>(repo: &R, mut out: impl Write) -> Result<usize>
where
    R: EntityRepository,
    R::Entity: Serialize,
{
    let rows = repo
        .try_list_all()
        .with_context(|| format!("failed to list {} rows", R::ENTITY))?;
    for row in &rows {
        serde_json::to_writer(&mut out, row)?;
        out.write_all(b"\n")?;
    }
    out.flush()?;
    Ok(rows.len())
}

#[cfg(test)]
mod tests {
    use super::{load_properties, write_entity_rows, Cli, Command, EntityKind};
    use clap::Parser;
    use olympics_core::{CatalogService, DbConfig, EntityRepository, Sport, SqliteConnectionProvider};
    use std::io::Write;

    #[test]
    fn parses_subcommands_and_entity_names() {
        let cli = Cli::try_parse_from(["olympics_cli", "db.properties", "list", "olympiads"]).unwrap();
        assert_eq!(cli.config.to_str(), Some("db.properties"));
        assert_eq!(
            cli.command,
            Command::List {
                entity: EntityKind::Olympiads
            }
        );

        let cli = Cli::try_parse_from(["olympics_cli", "db.properties", "init-schema"]).unwrap();
        assert_eq!(cli.command, Command::InitSchema);

        assert!(Cli::try_parse_from(["olympics_cli", "db.properties", "list", "medals"]).is_err());
        assert!(Cli::try_parse_from(["olympics_cli", "db.properties"]).is_err());
    }

    #[test]
    fn loads_properties_file_and_skips_comments() {
        let mut file = tempfile::Builder::new().suffix(".ini").tempfile().unwrap();
        file.write_all(
            b"# database\naddress=/var/lib/olympics\nport = 3306\n; legacy\ndatabase=olimpiadas\nuser=admin\npassword=a=b\n",
        )
        .unwrap();
        file.flush().unwrap();

        let properties = load_properties(file.path()).unwrap();
        assert_eq!(properties["address"], "/var/lib/olympics");
        assert_eq!(properties["port"], "3306");
        assert_eq!(properties["database"], "olimpiadas");
        assert_eq!(properties["password"], "a=b");
        assert_eq!(properties.len(), 5);

        let config = DbConfig::from_properties(&properties).unwrap();
        assert_eq!(config.port, 3306);
    }

    #[test]
    fn missing_properties_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(load_properties(&dir.path().join("absent.ini")).is_err());
    }

    #[test]
    fn list_writes_one_json_line_per_row() {
        let dir = tempfile::tempdir().unwrap();
        let config = DbConfig::for_directory(dir.path(), "olympics");
        let catalog = CatalogService::create(config.clone()).unwrap();
        catalog.sports().try_insert(&Sport::new("Judo")).unwrap();
        catalog.sports().try_insert(&Sport::new("Rowing")).unwrap();

        let mut out = Vec::new();
        let written = write_entity_rows(
            &SqliteConnectionProvider::new(config),
            EntityKind::Sports,
            &mut out,
        )
        .unwrap();

        assert_eq!(written, 2);
        let lines: Vec<serde_json::Value> = String::from_utf8(out)
            .unwrap()
            .lines()
            .map(|line| serde_json::from_str(line).unwrap())
            .collect();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0]["name"], "Judo");
        assert_eq!(lines[1]["name"], "Rowing");
    }
}
