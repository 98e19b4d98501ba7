//! Athlete record and its photo payload.
//!
//! # Invariants
//! - `Photo` bytes are only ever moved in fixed-size chunks when crossing a
//!   stream boundary (file or storage blob).

use super::validation::{require_non_negative, require_text, ValidationError};
use super::{identity_by_id, EntityId, UNSAVED_ID};
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};
use std::fs::File;
use std::io::{self, Read, Write};
use std::path::Path;

/// Chunk size used when streaming photo bytes.
pub const PHOTO_CHUNK_BYTES: usize = 1024;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Sex {
    Male,
    Female,
}

/// Binary photo payload stored in `Deportista.foto`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Photo {
    bytes: Vec<u8>,
}

impl Photo {
    pub fn from_bytes(bytes: Vec<u8>) -> Self {
        Self { bytes }
    }

    /// Drains `reader` in `PHOTO_CHUNK_BYTES` chunks.
    pub fn from_reader(reader: impl Read) -> io::Result<Self> {
        let mut bytes = Vec::new();
        copy_in_chunks(reader, &mut bytes)?;
        Ok(Self { bytes })
    }

    pub fn from_file(path: impl AsRef<Path>) -> io::Result<Self> {
        Self::from_reader(File::open(path)?)
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

/// Copies `reader` into `writer` one `PHOTO_CHUNK_BYTES` buffer at a time and
/// returns the byte count. Nothing beyond one chunk is held in memory.
pub(crate) fn copy_in_chunks(mut reader: impl Read, mut writer: impl Write) -> io::Result<u64> {
    let mut buffer = [0_u8; PHOTO_CHUNK_BYTES];
    let mut copied = 0_u64;
    loop {
        let read = match reader.read(&mut buffer) {
            Ok(0) => break,
            Ok(read) => read,
            Err(err) if err.kind() == io::ErrorKind::Interrupted => continue,
            Err(err) => return Err(err),
        };
        writer.write_all(&buffer[..read])?;
        copied += read as u64;
    }
    writer.flush()?;
    Ok(copied)
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Athlete {
    pub id: EntityId,
    pub name: String,
    pub sex: Sex,
    /// Kilograms.
    pub weight: i32,
    /// Centimetres.
    pub height: i32,
    /// Not serialized. `None` also when the repository was told not to load
    /// photo bytes (`PhotoLoading::OnDemand`).
    #[serde(skip)]
    pub photo: Option<Photo>,
}

identity_by_id!(Athlete);

impl Athlete {
    pub fn new(name: impl Into<String>, sex: Sex, weight: i32, height: i32) -> Self {
        Self {
            id: UNSAVED_ID,
            name: name.into(),
            sex,
            weight,
            height,
            photo: None,
        }
    }

    pub fn with_photo(mut self, photo: Photo) -> Self {
        self.photo = Some(photo);
        self
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        require_text("name", &self.name)?;
        require_non_negative("weight", self.weight)?;
        require_non_negative("height", self.height)
    }
}

impl Display for Athlete {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.name)
    }
}
