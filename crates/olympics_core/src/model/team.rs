//! Team record.

use super::validation::{require_max_chars, require_text, ValidationError, TEAM_CODE_MAX_CHARS};
use super::{identity_by_id, EntityId, UNSAVED_ID};
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Team {
    pub id: EntityId,
    pub name: String,
    /// National short code, e.g. `ESP`.
    pub code: String,
}

identity_by_id!(Team);

impl Team {
    pub fn new(name: impl Into<String>, code: impl Into<String>) -> Self {
        Self::with_id(UNSAVED_ID, name, code)
    }

    pub fn with_id(id: EntityId, name: impl Into<String>, code: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            code: code.into(),
        }
    }

    /// # Errors
    /// - Blank name or code.
    /// - Code longer than three characters.
    pub fn validate(&self) -> Result<(), ValidationError> {
        require_text("name", &self.name)?;
        require_text("code", &self.code)?;
        require_max_chars("code", &self.code, TEAM_CODE_MAX_CHARS)
    }
}

impl Display for Team {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.name)
    }
}

#[cfg(test)]
mod tests {
    use super::Team;

    #[test]
    fn four_letter_code_is_rejected() {
        assert!(Team::new("Spain", "ESP").validate().is_ok());
        assert!(Team::new("Spain", "ESPA").validate().is_err());
    }
}
