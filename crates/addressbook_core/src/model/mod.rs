//! Contact domain model and request schemas.
//!
//! # Responsibility
//! - Define the contact record shared by storage, service and HTTP layers.
//! - Define boundary shapes (input, patch) and their JSON validation.
//!
//! # Invariants
//! - Every stored contact is identified by a store-assigned `ContactId`.
//! - Deletion is permanent; there is no tombstone state.

pub mod contact;
pub mod schema;
