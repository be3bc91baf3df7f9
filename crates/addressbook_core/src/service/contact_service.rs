//! Contact use-case service.
//!
//! # Responsibility
//! - Provide the CRUD entry points used by the HTTP handlers.
//! - Delegate persistence to repository implementations.
//!
//! # Invariants
//! - Service APIs never bypass repository persistence contracts.
//! - Service layer remains storage-agnostic.

use crate::model::contact::{Contact, ContactId, ContactInput, ContactPatch};
use crate::repo::contact_repo::{ContactRepository, RepoResult};
use log::debug;

/// Use-case service wrapper for contact CRUD operations.
pub struct ContactService<R: ContactRepository> {
    repo: R,
}

impl<R: ContactRepository> ContactService<R> {
    /// Creates a service using the provided repository implementation.
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Persists a new contact and returns it with its assigned id.
    pub fn create_contact(&self, input: &ContactInput) -> RepoResult<Contact> {
        let contact = self.repo.create_contact(input)?;
        debug!(
            "event=contact_create module=service status=ok contact_id={}",
            contact.id
        );
        Ok(contact)
    }

    /// Gets one contact by id. Missing ids yield `RepoError::NotFound`.
    pub fn get_contact(&self, id: ContactId) -> RepoResult<Contact> {
        self.repo.get_contact(id)
    }

    pub fn list_contacts(&self) -> RepoResult<Vec<Contact>> {
        self.repo.list_contacts()
    }

    /// Applies a partial update.
    ///
    /// Returns repository-level not-found errors unchanged.
    pub fn update_contact(&self, id: ContactId, patch: &ContactPatch) -> RepoResult<Contact> {
        let contact = self.repo.update_contact(id, patch)?;
        debug!(
            "event=contact_update module=service status=ok contact_id={} fields_changed={}",
            id,
            changed_field_count(patch)
        );
        Ok(contact)
    }

    /// Permanently removes a contact.
    pub fn delete_contact(&self, id: ContactId) -> RepoResult<()> {
        self.repo.delete_contact(id)?;
        debug!("event=contact_delete module=service status=ok contact_id={id}");
        Ok(())
    }
}

fn changed_field_count(patch: &ContactPatch) -> usize {
    [
        patch.name.is_set(),
        patch.email.is_set(),
        patch.phone.is_set(),
    ]
    .into_iter()
    .filter(|set| *set)
    .count()
}
