//! Core use-case services.
//!
//! # Responsibility
//! - Wire repositories into the dependency graph the catalog needs.
//! - Offer delete paths that enforce the dependent-row check.

pub mod catalog_service;
