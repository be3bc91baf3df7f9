//! Contact repository contract and SQLite implementation.
//!
//! # Responsibility
//! - Provide CRUD APIs over the `contacts` table.
//! - Keep SQL and row mapping inside the persistence boundary.
//!
//! # Invariants
//! - Missing ids surface as `RepoError::NotFound`, never as a panic.
//! - Updates only write the enumerated columns `name`, `email`, `phone`.
//! - An update's existence check, write and read-back share one transaction.

use crate::db::DbError;
use crate::model::contact::{Contact, ContactId, ContactInput, ContactPatch, PatchField};
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection, OptionalExtension, Row};
use rusqlite::{Transaction, TransactionBehavior};
use std::error::Error;
use std::fmt::{Display, Formatter};

const CONTACT_SELECT_SQL: &str = "SELECT
    id,
    name,
    email,
    phone
FROM contacts";

const CONTACT_TABLE: &str = "contacts";
const CONTACT_COLUMNS: [&str; 4] = ["id", "name", "email", "phone"];

pub type RepoResult<T> = Result<T, RepoError>;

/// Repository error for contact persistence and query operations.
#[derive(Debug)]
pub enum RepoError {
    Db(DbError),
    NotFound(ContactId),
    InvalidData(String),
    MissingRequiredTable(&'static str),
    MissingRequiredColumn {
        table: &'static str,
        column: &'static str,
    },
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "{err}"),
            Self::NotFound(id) => write!(f, "Contact {id} not found"),
            Self::InvalidData(message) => write!(f, "invalid persisted contact data: {message}"),
            Self::MissingRequiredTable(table) => write!(f, "missing required table `{table}`"),
            Self::MissingRequiredColumn { table, column } => {
                write!(f, "missing required column `{table}.{column}`")
            }
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            Self::NotFound(_)
            | Self::InvalidData(_)
            | Self::MissingRequiredTable(_)
            | Self::MissingRequiredColumn { .. } => None,
        }
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Repository interface for contact CRUD operations.
pub trait ContactRepository {
    fn create_contact(&self, input: &ContactInput) -> RepoResult<Contact>;
    fn get_contact(&self, id: ContactId) -> RepoResult<Contact>;
    /// Lists every contact in insertion order.
    fn list_contacts(&self) -> RepoResult<Vec<Contact>>;
    /// Applies only the supplied patch fields and returns the stored result.
    fn update_contact(&self, id: ContactId, patch: &ContactPatch) -> RepoResult<Contact>;
    fn delete_contact(&self, id: ContactId) -> RepoResult<()>;
}

/// SQLite-backed contact repository.
pub struct SqliteContactRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteContactRepository<'conn> {
    /// Constructs a repository from a bootstrapped connection.
    ///
    /// Fails when the `contacts` table or one of its columns is missing.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_contact_connection_ready(conn)?;
        Ok(Self { conn })
    }
}

impl ContactRepository for SqliteContactRepository<'_> {
    fn create_contact(&self, input: &ContactInput) -> RepoResult<Contact> {
        self.conn.execute(
            "INSERT INTO contacts (
                name,
                email,
                phone
            ) VALUES (?1, ?2, ?3);",
            params![
                input.name.as_str(),
                input.email.as_str(),
                input.phone.as_str()
            ],
        )?;

        let id = self.conn.last_insert_rowid();
        Ok(Contact::from_input(id, input.clone()))
    }

    fn get_contact(&self, id: ContactId) -> RepoResult<Contact> {
        fetch_contact(self.conn, id)?.ok_or(RepoError::NotFound(id))
    }

    fn list_contacts(&self) -> RepoResult<Vec<Contact>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{CONTACT_SELECT_SQL} ORDER BY id ASC;"))?;
        let mut rows = stmt.query([])?;
        let mut contacts = Vec::new();

        while let Some(row) = rows.next()? {
            contacts.push(parse_contact_row(row)?);
        }

        Ok(contacts)
    }

    fn update_contact(&self, id: ContactId, patch: &ContactPatch) -> RepoResult<Contact> {
        let tx = Transaction::new_unchecked(self.conn, TransactionBehavior::Immediate)?;
        if !contact_exists(&tx, id)? {
            return Err(RepoError::NotFound(id));
        }

        let mut assignments: Vec<String> = Vec::new();
        let mut bind_values: Vec<Value> = Vec::new();
        for (column, field) in [
            ("name", &patch.name),
            ("email", &patch.email),
            ("phone", &patch.phone),
        ] {
            if let PatchField::Set(value) = field {
                bind_values.push(Value::Text(value.clone()));
                assignments.push(format!("{column} = ?{}", bind_values.len()));
            }
        }

        if !assignments.is_empty() {
            bind_values.push(Value::Integer(id));
            let sql = format!(
                "UPDATE contacts SET {} WHERE id = ?{};",
                assignments.join(", "),
                bind_values.len()
            );
            tx.execute(&sql, params_from_iter(bind_values))?;
        }

        let updated = fetch_contact(&tx, id)?.ok_or(RepoError::NotFound(id))?;
        tx.commit()?;
        Ok(updated)
    }

    fn delete_contact(&self, id: ContactId) -> RepoResult<()> {
        let changed = self
            .conn
            .execute("DELETE FROM contacts WHERE id = ?1;", [id])?;

        if changed == 0 {
            return Err(RepoError::NotFound(id));
        }

        Ok(())
    }
}

fn fetch_contact(conn: &Connection, id: ContactId) -> RepoResult<Option<Contact>> {
    let mut stmt = conn.prepare(&format!("{CONTACT_SELECT_SQL} WHERE id = ?1;"))?;
    let mut rows = stmt.query([id])?;
    if let Some(row) = rows.next()? {
        return Ok(Some(parse_contact_row(row)?));
    }

    Ok(None)
}

fn contact_exists(conn: &Connection, id: ContactId) -> RepoResult<bool> {
    let found = conn
        .query_row("SELECT 1 FROM contacts WHERE id = ?1;", [id], |row| {
            row.get::<_, i64>(0)
        })
        .optional()?;
    Ok(found.is_some())
}

/// Maps one `contacts` row to the domain record.
fn parse_contact_row(row: &Row<'_>) -> RepoResult<Contact> {
    let id: ContactId = row.get("id")?;
    if id <= 0 {
        return Err(RepoError::InvalidData(format!(
            "invalid id value `{id}` in contacts.id"
        )));
    }

    Ok(Contact {
        id,
        name: row.get("name")?,
        email: row.get("email")?,
        phone: row.get("phone")?,
    })
}

fn ensure_contact_connection_ready(conn: &Connection) -> RepoResult<()> {
    let columns = table_columns(conn, CONTACT_TABLE)?;
    if columns.is_empty() {
        return Err(RepoError::MissingRequiredTable(CONTACT_TABLE));
    }

    if let Some(column) = CONTACT_COLUMNS
        .into_iter()
        .find(|column| !columns.iter().any(|current| current == column))
    {
        return Err(RepoError::MissingRequiredColumn {
            table: CONTACT_TABLE,
            column,
        });
    }

    Ok(())
}

/// Column names of `table`; empty when the table does not exist.
fn table_columns(conn: &Connection, table: &str) -> RepoResult<Vec<String>> {
    let mut stmt = conn.prepare(&format!("PRAGMA table_info({table});"))?;
    let columns = stmt
        .query_map([], |row| row.get::<_, String>(1))?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(columns)
}
