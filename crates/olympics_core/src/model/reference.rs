//! Many-to-one reference that may or may not have been hydrated.
//!
//! # Invariants
//! - The referenced id is always known, hydrated or not.
//! - A stored foreign key whose target row is gone reads back as
//!   `Unresolved`, never as a silent null.

use super::{EntityId, Identified};
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Reference<T> {
    /// Target row was loaded and embedded.
    Resolved(T),
    /// Only the foreign key is known; the target row does not exist.
    Unresolved(EntityId),
}

impl<T: Identified> Reference<T> {
    /// Builds a reference from an optional lookup result.
    pub fn from_lookup(id: EntityId, target: Option<T>) -> Self {
        match target {
            Some(value) => Self::Resolved(value),
            None => Self::Unresolved(id),
        }
    }

    pub fn id(&self) -> EntityId {
        match self {
            Self::Resolved(value) => value.id(),
            Self::Unresolved(id) => *id,
        }
    }

    pub fn resolved(&self) -> Option<&T> {
        match self {
            Self::Resolved(value) => Some(value),
            Self::Unresolved(_) => None,
        }
    }

    pub fn into_resolved(self) -> Option<T> {
        match self {
            Self::Resolved(value) => Some(value),
            Self::Unresolved(_) => None,
        }
    }

    pub fn is_resolved(&self) -> bool {
        matches!(self, Self::Resolved(_))
    }
}

impl<T> From<T> for Reference<T> {
    fn from(value: T) -> Self {
        Self::Resolved(value)
    }
}

impl<T: Identified> PartialEq for Reference<T> {
    fn eq(&self, other: &Self) -> bool {
        self.id() == other.id()
    }
}

impl<T: Identified> Eq for Reference<T> {}

impl<T: Identified + Display> Display for Reference<T> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Resolved(value) => write!(f, "{value}"),
            Self::Unresolved(id) => write!(f, "#{id}"),
        }
    }
}
