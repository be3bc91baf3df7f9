//! Repository layer abstractions and persistence implementations.
//!
//! # Responsibility
//! - Define the contact data access contract.
//! - Isolate SQLite query details from service and HTTP layers.
//!
//! # Invariants
//! - Repository APIs return semantic errors (`NotFound`) in addition to DB
//!   transport errors.

pub mod contact_repo;
