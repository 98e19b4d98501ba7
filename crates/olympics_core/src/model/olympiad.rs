//! Olympiad record.

use super::validation::{require_non_negative, require_text, ValidationError};
use super::{identity_by_id, EntityId, UNSAVED_ID};
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Season {
    Winter,
    Summer,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Olympiad {
    pub id: EntityId,
    pub name: String,
    pub year: i32,
    pub season: Season,
    pub city: String,
}

identity_by_id!(Olympiad);

impl Olympiad {
    pub fn new(
        name: impl Into<String>,
        year: i32,
        season: Season,
        city: impl Into<String>,
    ) -> Self {
        Self {
            id: UNSAVED_ID,
            name: name.into(),
            year,
            season,
            city: city.into(),
        }
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        require_text("name", &self.name)?;
        require_text("city", &self.city)?;
        require_non_negative("year", self.year)
    }
}

impl Display for Olympiad {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.name)
    }
}
