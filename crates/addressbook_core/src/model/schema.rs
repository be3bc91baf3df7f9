//! JSON schema binding for contact request bodies.
//!
//! # Responsibility
//! - Check presence and type of contact fields in decoded JSON bodies.
//! - Report every violation with a field location, not just the first one.
//!
//! # Invariants
//! - Only typing and presence are checked; values are never normalized.
//! - Unknown keys (including `id`) are ignored.
//! - `null` is never accepted for a contact field.

use crate::model::contact::{ContactInput, ContactPatch, PatchField};
use serde_json::{Map, Value};
use std::error::Error;
use std::fmt::{Display, Formatter};

const FIELD_NAME: &str = "name";
const FIELD_EMAIL: &str = "email";
const FIELD_PHONE: &str = "phone";

/// One failed schema check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchemaViolation {
    /// Path to the offending value, rooted at `body`.
    pub loc: Vec<String>,
    pub message: String,
    /// Stable machine-readable category, e.g. `missing` or `string_type`.
    pub kind: &'static str,
}

impl SchemaViolation {
    fn at_body(message: &str, kind: &'static str) -> Self {
        Self {
            loc: vec!["body".to_string()],
            message: message.to_string(),
            kind,
        }
    }

    fn at_field(field: &str, message: &str, kind: &'static str) -> Self {
        Self {
            loc: vec!["body".to_string(), field.to_string()],
            message: message.to_string(),
            kind,
        }
    }
}

/// Schema binding failure carrying all violations found in one body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchemaError {
    violations: Vec<SchemaViolation>,
}

impl SchemaError {
    pub fn violations(&self) -> &[SchemaViolation] {
        &self.violations
    }

    pub fn into_violations(self) -> Vec<SchemaViolation> {
        self.violations
    }
}

impl Display for SchemaError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        for (index, violation) in self.violations.iter().enumerate() {
            if index > 0 {
                write!(f, "; ")?;
            }
            write!(f, "{}: {}", violation.loc.join("."), violation.message)?;
        }
        Ok(())
    }
}

impl Error for SchemaError {}

/// Binds a creation body. `name`, `email` and `phone` must all be strings.
pub fn parse_contact_input(body: &Value) -> Result<ContactInput, SchemaError> {
    let object = body_object(body)?;
    let mut violations = Vec::new();

    let name = required_string(object, FIELD_NAME, &mut violations);
    let email = required_string(object, FIELD_EMAIL, &mut violations);
    let phone = required_string(object, FIELD_PHONE, &mut violations);

    match (name, email, phone) {
        (Some(name), Some(email), Some(phone)) if violations.is_empty() => {
            Ok(ContactInput { name, email, phone })
        }
        _ => Err(SchemaError { violations }),
    }
}

/// Binds a partial update body. Every field is optional, but a supplied
/// field must be a string.
pub fn parse_contact_patch(body: &Value) -> Result<ContactPatch, SchemaError> {
    let object = body_object(body)?;
    let mut violations = Vec::new();

    let patch = ContactPatch {
        name: optional_string(object, FIELD_NAME, &mut violations),
        email: optional_string(object, FIELD_EMAIL, &mut violations),
        phone: optional_string(object, FIELD_PHONE, &mut violations),
    };

    if violations.is_empty() {
        Ok(patch)
    } else {
        Err(SchemaError { violations })
    }
}

fn body_object(body: &Value) -> Result<&Map<String, Value>, SchemaError> {
    body.as_object().ok_or_else(|| SchemaError {
        violations: vec![SchemaViolation::at_body(
            "Input should be a valid JSON object",
            "model_type",
        )],
    })
}

fn required_string(
    object: &Map<String, Value>,
    field: &str,
    violations: &mut Vec<SchemaViolation>,
) -> Option<String> {
    match object.get(field) {
        None => {
            violations.push(SchemaViolation::at_field(field, "Field required", "missing"));
            None
        }
        Some(value) => string_value(field, value, violations),
    }
}

fn optional_string(
    object: &Map<String, Value>,
    field: &str,
    violations: &mut Vec<SchemaViolation>,
) -> PatchField<String> {
    match object.get(field) {
        None => PatchField::Unset,
        Some(value) => string_value(field, value, violations).into(),
    }
}

fn string_value(
    field: &str,
    value: &Value,
    violations: &mut Vec<SchemaViolation>,
) -> Option<String> {
    match value {
        Value::String(text) => Some(text.clone()),
        _ => {
            violations.push(SchemaViolation::at_field(
                field,
                "Input should be a valid string",
                "string_type",
            ));
            None
        }
    }
}
