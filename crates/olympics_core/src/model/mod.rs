//! Olympics domain model.
//!
//! # Responsibility
//! - Define the six row-backed value records of the catalog.
//! - Define identity semantics shared by every record.
//!
//! # Invariants
//! - Equality and hashing consider the surrogate id only (composite key for
//!   `Participation`), never the remaining fields.
//! - Records are rebuilt from storage on every read; nothing is cached.

pub mod athlete;
pub mod event;
pub mod olympiad;
pub mod participation;
pub mod reference;
pub mod sport;
pub mod team;
pub mod validation;

/// Storage-assigned surrogate identifier shared by all single-key entities.
pub type EntityId = i64;

/// Records addressable by a numeric surrogate id.
pub trait Identified {
    fn id(&self) -> EntityId;
}

/// Implements `Identified` plus id-only `PartialEq`, `Eq` and `Hash`.
macro_rules! identity_by_id {
    ($ty:ty) => {
        impl $crate::model::Identified for $ty {
            fn id(&self) -> $crate::model::EntityId {
                self.id
            }
        }

        impl PartialEq for $ty {
            fn eq(&self, other: &Self) -> bool {
                self.id == other.id
            }
        }

        impl Eq for $ty {}

        impl std::hash::Hash for $ty {
            fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
                self.id.hash(state);
            }
        }
    };
}

pub(crate) use identity_by_id;

/// Id value carried by records that have not been persisted yet.
pub const UNSAVED_ID: EntityId = 0;
