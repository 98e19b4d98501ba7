//! Sport record.

use super::validation::{require_text, ValidationError};
use super::{identity_by_id, EntityId, UNSAVED_ID};
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Sport {
    pub id: EntityId,
    pub name: String,
}

identity_by_id!(Sport);

impl Sport {
    /// Creates an unsaved sport; the id is assigned on insert.
    pub fn new(name: impl Into<String>) -> Self {
        Self::with_id(UNSAVED_ID, name)
    }

    pub fn with_id(id: EntityId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
        }
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        require_text("name", &self.name)
    }
}

impl Display for Sport {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.name)
    }
}
