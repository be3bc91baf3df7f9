//! Contact domain model.
//!
//! # Invariants
//! - `id` is assigned by the store and never changes afterwards.
//! - A patch only carries fields the caller explicitly supplied; an empty
//!   string is a supplied value, not an omission.

use serde::Serialize;

/// Store-assigned contact identifier.
pub type ContactId = i64;

/// Canonical contact record, also used as the public output shape.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Contact {
    pub id: ContactId,
    pub name: String,
    pub email: String,
    pub phone: String,
}

/// Creation payload. All fields are required; `id` is never accepted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContactInput {
    pub name: String,
    pub email: String,
    pub phone: String,
}

impl ContactInput {
    pub fn new(
        name: impl Into<String>,
        email: impl Into<String>,
        phone: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            email: email.into(),
            phone: phone.into(),
        }
    }
}

impl Contact {
    /// Builds the domain record once the store has assigned an id.
    pub fn from_input(id: ContactId, input: ContactInput) -> Self {
        Self {
            id,
            name: input.name,
            email: input.email,
            phone: input.phone,
        }
    }
}

/// One field of a partial update.
///
/// Distinguishes "not supplied" from any supplied value, including `""`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PatchField<T> {
    /// Field omitted by the caller; the stored value is kept.
    Unset,
    /// Field supplied by the caller; the stored value is replaced.
    Set(T),
}

impl<T> Default for PatchField<T> {
    fn default() -> Self {
        Self::Unset
    }
}

impl<T> PatchField<T> {
    pub fn is_set(&self) -> bool {
        matches!(self, Self::Set(_))
    }

    pub fn as_set(&self) -> Option<&T> {
        match self {
            Self::Set(value) => Some(value),
            Self::Unset => None,
        }
    }
}

impl<T> From<Option<T>> for PatchField<T> {
    fn from(value: Option<T>) -> Self {
        match value {
            Some(value) => Self::Set(value),
            None => Self::Unset,
        }
    }
}

/// Partial update payload for a contact.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContactPatch {
    pub name: PatchField<String>,
    pub email: PatchField<String>,
    pub phone: PatchField<String>,
}

impl ContactPatch {
    /// Returns `true` when the patch carries no field at all.
    pub fn is_empty(&self) -> bool {
        !(self.name.is_set() || self.email.is_set() || self.phone.is_set())
    }
}
