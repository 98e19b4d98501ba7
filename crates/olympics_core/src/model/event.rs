//! Event record: one competition of a sport within an olympiad.

use super::olympiad::Olympiad;
use super::reference::Reference;
use super::sport::Sport;
use super::validation::{require_text, ValidationError};
use super::{identity_by_id, EntityId, UNSAVED_ID};
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Event {
    pub id: EntityId,
    pub name: String,
    pub olympiad: Reference<Olympiad>,
    pub sport: Reference<Sport>,
}

identity_by_id!(Event);

impl Event {
    pub fn new(
        name: impl Into<String>,
        olympiad: impl Into<Reference<Olympiad>>,
        sport: impl Into<Reference<Sport>>,
    ) -> Self {
        Self {
            id: UNSAVED_ID,
            name: name.into(),
            olympiad: olympiad.into(),
            sport: sport.into(),
        }
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        require_text("name", &self.name)
    }
}

impl Display for Event {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.name)
    }
}
