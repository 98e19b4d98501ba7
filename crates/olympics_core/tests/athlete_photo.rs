mod common;

use common::{new_catalog, saved_athlete, saved_event, saved_olympiad, saved_sport, saved_team};
use olympics_core::{
    Athlete, EntityRepository, Participation, Photo, PhotoLoading, RepoError, Season, Sex,
    SqliteAthleteRepository, SqliteConnectionProvider,
};
use std::io::{self, Read, Write};

const CHUNK: usize = 1024;

/// Generates `remaining` pattern bytes without ever holding them.
struct PatternReader {
    position: u64,
    remaining: u64,
}

impl PatternReader {
    fn new(len: u64) -> Self {
        Self {
            position: 0,
            remaining: len,
        }
    }
}

fn pattern_byte(position: u64) -> u8 {
    (position * 7 % 251) as u8
}

impl Read for PatternReader {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        assert!(buf.len() <= CHUNK, "asked for {} bytes at once", buf.len());
        let take = (buf.len() as u64).min(self.remaining) as usize;
        for slot in &mut buf[..take] {
            *slot = pattern_byte(self.position);
            self.position += 1;
        }
        self.remaining -= take as u64;
        Ok(take)
    }
}

/// Checks incoming bytes against the pattern and keeps only counters.
#[derive(Default)]
struct PatternCheck {
    seen: u64,
    mismatches: u64,
    largest_write: usize,
}

impl Write for PatternCheck {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.largest_write = self.largest_write.max(buf.len());
        for byte in buf {
            if *byte != pattern_byte(self.seen) {
                self.mismatches += 1;
            }
            self.seen += 1;
        }
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

fn sample_bytes(len: usize) -> Vec<u8> {
    (0..len).map(|index| (index * 31 % 256) as u8).collect()
}

#[test]
fn photo_bytes_roundtrip_across_several_chunks() {
    let test = new_catalog();
    let bytes = sample_bytes(5 * 1024 + 17);
    let athlete = Athlete::new("Carolina Marin", Sex::Female, 65, 172)
        .with_photo(Photo::from_bytes(bytes.clone()));

    let id = test.catalog.athletes().insert(&athlete);
    let loaded = test.catalog.athletes().get_by_id(id).unwrap();

    assert_eq!(loaded.photo.as_ref().unwrap().as_bytes(), bytes.as_slice());

    let listed = test.catalog.athletes().list_all();
    assert_eq!(listed[0].photo.as_ref().unwrap().len(), bytes.len());
}

#[test]
fn photo_from_file_is_stored_unchanged() {
    let test = new_catalog();
    let bytes = sample_bytes(2048 + 3);
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(&bytes).unwrap();
    file.flush().unwrap();

    let photo = Photo::from_file(file.path()).unwrap();
    let athlete = Athlete::new("Pau Gasol", Sex::Male, 113, 215).with_photo(photo);
    let id = test.catalog.athletes().try_insert(&athlete).unwrap();

    let stored: Vec<u8> = test
        .raw_connection()
        .query_row(
            "SELECT foto FROM Deportista WHERE id_deportista = ?1;",
            [id],
            |row| row.get(0),
        )
        .unwrap();
    assert_eq!(stored, bytes);
}

#[test]
fn update_replaces_and_clears_photo() {
    let test = new_catalog();
    let athletes = test.catalog.athletes();
    let original = Athlete::new("Gemma Mengual", Sex::Female, 55, 170)
        .with_photo(Photo::from_bytes(sample_bytes(4000)));
    let id = athletes.insert(&original);
    let saved = athletes.get_by_id(id).unwrap();

    let smaller = sample_bytes(10);
    let replacement = Athlete::new("Gemma Mengual", Sex::Female, 56, 170)
        .with_photo(Photo::from_bytes(smaller.clone()));
    assert!(athletes.update(&saved, &replacement));
    let reloaded = athletes.get_by_id(id).unwrap();
    assert_eq!(reloaded.weight, 56);
    assert_eq!(reloaded.photo.as_ref().unwrap().as_bytes(), smaller.as_slice());

    let without_photo = Athlete::new("Gemma Mengual", Sex::Female, 56, 170);
    assert!(athletes.update(&saved, &without_photo));
    assert!(athletes.get_by_id(id).unwrap().photo.is_none());
}

#[test]
fn empty_photo_is_kept_distinct_from_no_photo() {
    let test = new_catalog();
    let athlete =
        Athlete::new("Fermin Cacho", Sex::Male, 62, 175).with_photo(Photo::from_bytes(Vec::new()));

    let id = test.catalog.athletes().insert(&athlete);
    let loaded = test.catalog.athletes().get_by_id(id).unwrap();
    assert!(loaded.photo.unwrap().is_empty());
}

#[test]
fn photo_streams_between_reader_and_writer_in_chunks() {
    let test = new_catalog();
    let athletes = test.catalog.athletes();
    let athlete = saved_athlete(&test.catalog, "Mireia Belmonte", Sex::Female);
    let len = 64 * CHUNK as u64 + 5;

    athletes
        .try_write_photo(athlete.id, PatternReader::new(len), len)
        .unwrap();

    let mut check = PatternCheck::default();
    let written = athletes.try_read_photo_into(athlete.id, &mut check).unwrap();
    assert_eq!(written, Some(len));
    assert_eq!(check.seen, len);
    assert_eq!(check.mismatches, 0);
    assert!(check.largest_write <= CHUNK);
}

#[test]
fn short_photo_stream_keeps_previous_photo() {
    let test = new_catalog();
    let athletes = test.catalog.athletes();
    let previous = sample_bytes(300);
    let athlete = Athlete::new("David Cal", Sex::Male, 90, 185)
        .with_photo(Photo::from_bytes(previous.clone()));
    let id = athletes.try_insert(&athlete).unwrap();

    let err = athletes
        .try_write_photo(id, PatternReader::new(10), 4 * CHUNK as u64)
        .unwrap_err();
    assert!(matches!(err, RepoError::InvalidData(message) if message.contains("ended after 10")));

    let mut stored = Vec::new();
    assert_eq!(
        athletes.try_read_photo_into(id, &mut stored).unwrap(),
        Some(previous.len() as u64)
    );
    assert_eq!(stored, previous);
}

#[test]
fn photo_streaming_reports_unknown_athlete() {
    let test = new_catalog();
    let athletes = test.catalog.athletes();

    let write_err = athletes
        .try_write_photo(4040, PatternReader::new(8), 8)
        .unwrap_err();
    assert!(matches!(write_err, RepoError::NotFound { entity: "athlete", .. }));

    let read_err = athletes.try_read_photo_into(4040, io::sink()).unwrap_err();
    assert!(matches!(read_err, RepoError::NotFound { entity: "athlete", .. }));
}

#[test]
fn on_demand_repository_skips_photo_bytes_and_keeps_them_on_update() {
    let test = new_catalog();
    let bytes = sample_bytes(3 * CHUNK);
    let athlete = Athlete::new("Ruth Beitia", Sex::Female, 71, 192)
        .with_photo(Photo::from_bytes(bytes.clone()));
    let id = test.catalog.athletes().try_insert(&athlete).unwrap();

    let on_demand = SqliteAthleteRepository::new(SqliteConnectionProvider::new(test.config()))
        .with_photo_loading(PhotoLoading::OnDemand);
    let listed = on_demand.list_all();
    assert_eq!(listed.len(), 1);
    assert!(listed[0].photo.is_none());

    let mut renamed = listed[0].clone();
    renamed.name = "Ruth Beitia Vila".to_string();
    assert!(on_demand.update(&listed[0], &renamed));

    let mut stored = Vec::new();
    assert_eq!(
        on_demand.try_read_photo_into(id, &mut stored).unwrap(),
        Some(bytes.len() as u64)
    );
    assert_eq!(stored, bytes);
    assert_eq!(
        test.catalog.athletes().get_by_id(id).unwrap().name,
        "Ruth Beitia Vila"
    );

    on_demand.try_clear_photo(id).unwrap();
    assert_eq!(on_demand.try_read_photo_into(id, io::sink()).unwrap(), None);
}

#[test]
fn participations_hydrate_athletes_without_photo_bytes() {
    let test = new_catalog();
    let sport = saved_sport(&test.catalog, "Swimming");
    let olympiad = saved_olympiad(&test.catalog, "Tokyo", 2020, Season::Summer, "Tokyo");
    let event = saved_event(&test.catalog, "200m butterfly", &olympiad, &sport);
    let team = saved_team(&test.catalog, "Spain", "ESP");
    let athlete = Athlete::new("Mireia Belmonte", Sex::Female, 60, 171)
        .with_photo(Photo::from_bytes(sample_bytes(2 * CHUNK)));
    let athlete_id = test.catalog.athletes().try_insert(&athlete).unwrap();
    let athlete = test.catalog.athletes().get_by_id(athlete_id).unwrap();

    let participation = Participation::new(athlete, event, team, 29, None);
    test.catalog
        .participations()
        .try_insert(&participation)
        .unwrap();

    let loaded = test
        .catalog
        .participations()
        .get_by_id(participation.key())
        .unwrap();
    let hydrated = loaded.athlete.resolved().unwrap();
    assert_eq!(hydrated.id, athlete_id);
    assert!(hydrated.photo.is_none());
}
