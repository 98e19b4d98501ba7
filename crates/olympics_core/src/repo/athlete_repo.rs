//! Athlete repository over `Deportista`.
//!
//! # Responsibility
//! - Map `sexo` (`'M'`/`'F'`) to `Sex` and back.
//! - Move `foto` through incremental blob I/O instead of inline values.
//!
//! # Invariants
//! - Photo bytes cross the blob boundary in `PHOTO_CHUNK_BYTES` chunks, into a
//!   pre-sized zero blob, inside the same transaction as the row write.
//! - `write_photo`/`read_photo_into` hold at most one chunk in memory.
//! - With `PhotoLoading::OnDemand`, reads leave `photo` as `None` and an
//!   update whose `photo` is `None` keeps the stored bytes.
//! - An athlete is deletable only while no `Participacion` row references it.

use super::{
    count_references, ensure_changed, generated_key, query_all, query_optional, EntityRepository,
    RepoError, RepoResult,
};
use crate::db::ConnectionProvider;
use crate::model::athlete::{copy_in_chunks, Athlete, Photo, Sex};
use crate::model::EntityId;
use rusqlite::blob::ZeroBlob;
use rusqlite::{params, Connection, DatabaseName, OptionalExtension, Row};
use std::io::{Read, Write};

const ATHLETE_TABLE: &str = "Deportista";
const PHOTO_COLUMN: &str = "foto";
const ATHLETE_SELECT_SQL: &str = "SELECT
    id_deportista,
    nombre,
    sexo,
    peso,
    altura,
    length(foto) AS foto_len
FROM Deportista";

/// Whether reads materialize photo bytes into `Athlete::photo`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum PhotoLoading {
    /// Every `get_by_id`/`list_all` row carries its full photo.
    #[default]
    Eager,
    /// Rows come back without photo bytes; use `read_photo_into` to fetch them.
    OnDemand,
}

/// SQLite-backed athlete repository.
#[derive(Debug, Clone)]
pub struct SqliteAthleteRepository<P> {
    provider: P,
    photo_loading: PhotoLoading,
}

impl<P: ConnectionProvider> SqliteAthleteRepository<P> {
    pub fn new(provider: P) -> Self {
        Self {
            provider,
            photo_loading: PhotoLoading::Eager,
        }
    }

    pub fn with_photo_loading(mut self, photo_loading: PhotoLoading) -> Self {
        self.photo_loading = photo_loading;
        self
    }

    pub fn photo_loading(&self) -> PhotoLoading {
        self.photo_loading
    }

    /// Replaces the stored photo of athlete `id` with exactly `len` bytes
    /// pulled from `reader`.
    ///
    /// # Errors
    /// - `NotFound` when no athlete has `id`.
    /// - `InvalidData` when `reader` fails or yields fewer than `len` bytes;
    ///   the previous photo is kept in that case.
    pub fn try_write_photo(&self, id: EntityId, reader: impl Read, len: u64) -> RepoResult<()> {
        let placeholder = zero_blob(len)?;

        let mut conn = self.provider.acquire()?;
        let tx = conn.transaction()?;
        let changed = tx.execute(
            "UPDATE Deportista SET foto = ?1 WHERE id_deportista = ?2;",
            params![placeholder, id],
        )?;
        ensure_changed(changed, Self::ENTITY, id)?;

        if len > 0 {
            let blob = tx.blob_open(DatabaseName::Main, ATHLETE_TABLE, PHOTO_COLUMN, id, false)?;
            let copied = copy_in_chunks(reader.take(len), blob).map_err(|err| {
                RepoError::InvalidData(format!("failed to stream photo for athlete {id}: {err}"))
            })?;
            if copied != len {
                return Err(RepoError::InvalidData(format!(
                    "photo stream for athlete {id} ended after {copied} of {len} bytes"
                )));
            }
        }
        tx.commit()?;
        Ok(())
    }

    /// Streams the stored photo of athlete `id` into `writer`.
    ///
    /// Returns `Ok(None)` when the athlete has no photo, otherwise the number
    /// of bytes written.
    ///
    /// # Errors
    /// - `NotFound` when no athlete has `id`.
    pub fn try_read_photo_into(&self, id: EntityId, writer: impl Write) -> RepoResult<Option<u64>> {
        let conn = self.provider.acquire()?;
        let photo_len: Option<i64> = conn
            .query_row(
                "SELECT length(foto) FROM Deportista WHERE id_deportista = ?1;",
                [id],
                |row| row.get(0),
            )
            .optional()?
            .ok_or_else(|| RepoError::not_found(Self::ENTITY, id))?;

        match photo_len {
            None => Ok(None),
            Some(0) => Ok(Some(0)),
            Some(_) => {
                let blob =
                    conn.blob_open(DatabaseName::Main, ATHLETE_TABLE, PHOTO_COLUMN, id, true)?;
                let copied = copy_in_chunks(blob, writer).map_err(|err| {
                    RepoError::InvalidData(format!("failed to read photo for athlete {id}: {err}"))
                })?;
                Ok(Some(copied))
            }
        }
    }

    /// Sets the stored photo of athlete `id` to `NULL`.
    pub fn try_clear_photo(&self, id: EntityId) -> RepoResult<()> {
        let conn = self.provider.acquire()?;
        let changed = conn.execute(
            "UPDATE Deportista SET foto = NULL WHERE id_deportista = ?1;",
            [id],
        )?;
        ensure_changed(changed, Self::ENTITY, id)
    }

    fn load_photo(
        &self,
        conn: &Connection,
        mut athlete: Athlete,
        photo_len: Option<i64>,
    ) -> RepoResult<Athlete> {
        if self.photo_loading == PhotoLoading::OnDemand {
            return Ok(athlete);
        }
        athlete.photo = match photo_len {
            None => None,
            Some(0) => Some(Photo::default()),
            Some(_) => Some(read_photo(conn, athlete.id)?),
        };
        Ok(athlete)
    }
}

impl<P: ConnectionProvider> EntityRepository for SqliteAthleteRepository<P> {
    type Entity = Athlete;
    type Key = EntityId;

    const ENTITY: &'static str = "athlete";

    fn try_get_by_id(&self, id: EntityId) -> RepoResult<Option<Athlete>> {
        let conn = self.provider.acquire()?;
        let found = query_optional(
            &conn,
            &format!("{ATHLETE_SELECT_SQL} WHERE id_deportista = ?1;"),
            [id],
            parse_athlete_row,
        )?;

        found
            .map(|(athlete, photo_len)| self.load_photo(&conn, athlete, photo_len))
            .transpose()
    }

    fn try_list_all(&self) -> RepoResult<Vec<Athlete>> {
        let conn = self.provider.acquire()?;
        let pending = query_all(&conn, ATHLETE_SELECT_SQL, [], parse_athlete_row)?;

        pending
            .into_iter()
            .map(|(athlete, photo_len)| self.load_photo(&conn, athlete, photo_len))
            .collect()
    }

    fn try_insert(&self, athlete: &Athlete) -> RepoResult<EntityId> {
        athlete.validate()?;
        let placeholder = athlete
            .photo
            .as_ref()
            .map(|photo| zero_blob(photo.len() as u64))
            .transpose()?;

        let mut conn = self.provider.acquire()?;
        let tx = conn.transaction()?;
        let changed = tx.execute(
            "INSERT INTO Deportista (nombre, sexo, peso, altura, foto)
             VALUES (?1, ?2, ?3, ?4, ?5);",
            params![
                athlete.name.as_str(),
                sex_to_db(athlete.sex),
                athlete.weight,
                athlete.height,
                placeholder,
            ],
        )?;
        let id = generated_key(&tx, changed, Self::ENTITY)?;
        if let Some(photo) = athlete.photo.as_ref() {
            stream_photo(&tx, id, photo)?;
        }
        tx.commit()?;
        Ok(id)
    }

    fn try_update(&self, old: &Athlete, new: &Athlete) -> RepoResult<()> {
        new.validate()?;

        let mut conn = self.provider.acquire()?;
        let tx = conn.transaction()?;
        let changed = match (new.photo.as_ref(), self.photo_loading) {
            (None, PhotoLoading::OnDemand) => tx.execute(
                "UPDATE Deportista
                 SET
                    nombre = ?1,
                    sexo = ?2,
                    peso = ?3,
                    altura = ?4
                 WHERE id_deportista = ?5;",
                params![
                    new.name.as_str(),
                    sex_to_db(new.sex),
                    new.weight,
                    new.height,
                    old.id,
                ],
            )?,
            (photo, _) => tx.execute(
                "UPDATE Deportista
                 SET
                    nombre = ?1,
                    sexo = ?2,
                    peso = ?3,
                    altura = ?4,
                    foto = ?5
                 WHERE id_deportista = ?6;",
                params![
                    new.name.as_str(),
                    sex_to_db(new.sex),
                    new.weight,
                    new.height,
                    photo.map(|photo| zero_blob(photo.len() as u64)).transpose()?,
                    old.id,
                ],
            )?,
        };
        ensure_changed(changed, Self::ENTITY, old.id)?;
        if let Some(photo) = new.photo.as_ref() {
            stream_photo(&tx, old.id, photo)?;
        }
        tx.commit()?;
        Ok(())
    }

    fn try_delete(&self, athlete: &Athlete) -> RepoResult<()> {
        let conn = self.provider.acquire()?;
        let changed = conn.execute(
            "DELETE FROM Deportista WHERE id_deportista = ?1;",
            [athlete.id],
        )?;
        ensure_changed(changed, Self::ENTITY, athlete.id)
    }

    fn dependent_count(&self, athlete: &Athlete) -> RepoResult<u64> {
        let conn = self.provider.acquire()?;
        count_references(&conn, "Participacion", "id_deportista", athlete.id)
    }
}

/// Parses one row; the photo length is returned so bytes can be streamed
/// once the statement is finished.
fn parse_athlete_row(row: &Row<'_>) -> RepoResult<(Athlete, Option<i64>)> {
    let sex_text: String = row.get("sexo")?;
    let sex = parse_sex(&sex_text).ok_or_else(|| {
        RepoError::InvalidData(format!("invalid sex `{sex_text}` in Deportista.sexo"))
    })?;

    let athlete = Athlete {
        id: row.get("id_deportista")?,
        name: row.get("nombre")?,
        sex,
        weight: row.get::<_, Option<i32>>("peso")?.unwrap_or_default(),
        height: row.get::<_, Option<i32>>("altura")?.unwrap_or_default(),
        photo: None,
    };
    Ok((athlete, row.get("foto_len")?))
}

fn read_photo(conn: &Connection, athlete_id: EntityId) -> RepoResult<Photo> {
    let blob = conn.blob_open(DatabaseName::Main, ATHLETE_TABLE, PHOTO_COLUMN, athlete_id, true)?;
    Photo::from_reader(blob).map_err(|err| {
        RepoError::InvalidData(format!("unreadable photo for athlete {athlete_id}: {err}"))
    })
}

fn zero_blob(len: u64) -> RepoResult<ZeroBlob> {
    i32::try_from(len)
        .map(ZeroBlob)
        .map_err(|_| RepoError::InvalidData(format!("photo of {len} bytes is too large")))
}

fn stream_photo(conn: &Connection, athlete_id: EntityId, photo: &Photo) -> RepoResult<()> {
    if photo.is_empty() {
        return Ok(());
    }

    let blob = conn.blob_open(DatabaseName::Main, ATHLETE_TABLE, PHOTO_COLUMN, athlete_id, false)?;
    copy_in_chunks(photo.as_bytes(), blob).map_err(|err| {
        RepoError::InvalidData(format!("failed to stream photo for athlete {athlete_id}: {err}"))
    })?;
    Ok(())
}

fn sex_to_db(sex: Sex) -> &'static str {
    match sex {
        Sex::Male => "M",
        Sex::Female => "F",
    }
}

fn parse_sex(value: &str) -> Option<Sex> {
    match value {
        "M" => Some(Sex::Male),
        "F" => Some(Sex::Female),
        _ => None,
    }
}
