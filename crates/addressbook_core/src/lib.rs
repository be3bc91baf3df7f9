//! Core domain logic for the address book service.
//! This crate owns contact invariants, storage and request schemas.

pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;

pub use logging::{default_log_level, init_logging, logging_status};
pub use model::contact::{Contact, ContactId, ContactInput, ContactPatch, PatchField};
pub use model::schema::{parse_contact_input, parse_contact_patch, SchemaError, SchemaViolation};
pub use repo::contact_repo::{ContactRepository, RepoError, RepoResult, SqliteContactRepository};
pub use service::contact_service::ContactService;

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
