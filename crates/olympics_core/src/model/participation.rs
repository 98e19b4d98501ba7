//! Participation record: an athlete competing in an event for a team.
//!
//! # Invariants
//! - Identity is the `(athlete, event)` pair; team, age and medal do not
//!   take part in equality.

use super::athlete::Athlete;
use super::event::Event;
use super::reference::Reference;
use super::team::Team;
use super::validation::{
    require_max_chars, require_non_negative, ValidationError, MEDAL_MAX_CHARS,
};
use super::EntityId;
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};
use std::hash::{Hash, Hasher};

/// Medal value the source dataset uses for "no medal".
pub const NO_MEDAL: &str = "NA";

/// Composite primary key of `Participacion`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ParticipationKey {
    pub athlete_id: EntityId,
    pub event_id: EntityId,
}

impl ParticipationKey {
    pub fn new(athlete_id: EntityId, event_id: EntityId) -> Self {
        Self {
            athlete_id,
            event_id,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Participation {
    pub athlete: Reference<Athlete>,
    pub event: Reference<Event>,
    pub team: Reference<Team>,
    /// Athlete age at the time of the event.
    pub age: i32,
    pub medal: Option<String>,
}

impl Participation {
    pub fn new(
        athlete: impl Into<Reference<Athlete>>,
        event: impl Into<Reference<Event>>,
        team: impl Into<Reference<Team>>,
        age: i32,
        medal: Option<String>,
    ) -> Self {
        Self {
            athlete: athlete.into(),
            event: event.into(),
            team: team.into(),
            age,
            medal,
        }
    }

    pub fn key(&self) -> ParticipationKey {
        ParticipationKey::new(self.athlete.id(), self.event.id())
    }

    /// Returns `true` when a real medal was won (not absent, not `NA`).
    pub fn has_medal(&self) -> bool {
        self.medal
            .as_deref()
            .is_some_and(|medal| !medal.trim().is_empty() && medal != NO_MEDAL)
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        require_non_negative("age", self.age)?;
        if let Some(medal) = self.medal.as_deref() {
            require_max_chars("medal", medal, MEDAL_MAX_CHARS)?;
        }
        Ok(())
    }
}

impl PartialEq for Participation {
    fn eq(&self, other: &Self) -> bool {
        self.key() == other.key()
    }
}

impl Eq for Participation {}

impl Hash for Participation {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.key().hash(state);
    }
}

impl Display for Participation {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} @ {}", self.athlete, self.event)
    }
}

#[cfg(test)]
mod tests {
    use super::{Participation, ParticipationKey};
    use crate::model::reference::Reference;
    use std::collections::HashSet;

    fn unresolved(athlete: i64, event: i64, team: i64, medal: Option<&str>) -> Participation {
        Participation::new(
            Reference::Unresolved(athlete),
            Reference::Unresolved(event),
            Reference::Unresolved(team),
            24,
            medal.map(str::to_string),
        )
    }

    #[test]
    fn identity_ignores_team_and_medal() {
        let first = unresolved(1, 2, 3, Some("Gold"));
        let second = unresolved(1, 2, 9, None);
        assert_eq!(first, second);

        let set: HashSet<_> = [first, second].into_iter().collect();
        assert_eq!(set.len(), 1);
        assert_eq!(
            set.into_iter().next().unwrap().key(),
            ParticipationKey::new(1, 2)
        );
    }

    #[test]
    fn na_is_not_a_medal() {
        assert!(!unresolved(1, 2, 3, Some("NA")).has_medal());
        assert!(!unresolved(1, 2, 3, None).has_medal());
        assert!(unresolved(1, 2, 3, Some("Bronze")).has_medal());
    }

    #[test]
    fn medal_longer_than_six_chars_is_rejected() {
        assert!(unresolved(1, 2, 3, Some("Silver")).validate().is_ok());
        assert!(unresolved(1, 2, 3, Some("Platinum")).validate().is_err());
    }

    #[test]
    fn display_falls_back_to_ids() {
        assert_eq!(unresolved(4, 5, 6, None).to_string(), "#4 @ #5");
    }
}
