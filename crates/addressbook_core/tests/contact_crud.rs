use addressbook_core::db::open_db_in_memory;
use addressbook_core::{
    Contact, ContactInput, ContactPatch, ContactRepository, ContactService, PatchField,
    RepoError, SqliteContactRepository,
};
use rusqlite::Connection;
use std::collections::HashSet;

fn john() -> ContactInput {
    ContactInput::new("John Doe", "johndoe@example.com", "555-555-5555")
}

#[test]
fn create_assigns_first_id_and_echoes_fields() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteContactRepository::try_new(&conn).unwrap();

    let created = repo.create_contact(&john()).unwrap();
    assert_eq!(
        created,
        Contact {
            id: 1,
            name: "John Doe".to_string(),
            email: "johndoe@example.com".to_string(),
            phone: "555-555-5555".to_string(),
        }
    );
}

#[test]
fn create_and_get_roundtrip() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteContactRepository::try_new(&conn).unwrap();

    let created = repo.create_contact(&john()).unwrap();
    let loaded = repo.get_contact(created.id).unwrap();
    assert_eq!(loaded, created);
}

#[test]
fn created_ids_are_unique() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteContactRepository::try_new(&conn).unwrap();

    let mut ids = HashSet::new();
    for index in 0..20 {
        let input = ContactInput::new(format!("person {index}"), "p@example.com", "555");
        let created = repo.create_contact(&input).unwrap();
        assert!(ids.insert(created.id), "id {} was reused", created.id);
    }
}

#[test]
fn missing_ids_return_not_found() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteContactRepository::try_new(&conn).unwrap();

    for id in [0, 1, 42, -7, i64::MAX] {
        assert!(matches!(repo.get_contact(id), Err(RepoError::NotFound(missing)) if missing == id));
        assert!(matches!(repo.delete_contact(id), Err(RepoError::NotFound(missing)) if missing == id));
        assert!(matches!(
            repo.update_contact(id, &ContactPatch::default()),
            Err(RepoError::NotFound(missing)) if missing == id
        ));
    }
}

#[test]
fn update_applies_only_supplied_fields() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteContactRepository::try_new(&conn).unwrap();
    let created = repo.create_contact(&john()).unwrap();

    let patch = ContactPatch {
        phone: PatchField::Set("555-0000".to_string()),
        ..ContactPatch::default()
    };
    let updated = repo.update_contact(created.id, &patch).unwrap();

    assert_eq!(updated.id, created.id);
    assert_eq!(updated.name, "John Doe");
    assert_eq!(updated.email, "johndoe@example.com");
    assert_eq!(updated.phone, "555-0000");
    assert_eq!(repo.get_contact(created.id).unwrap(), updated);
}

#[test]
fn update_stores_explicit_empty_string() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteContactRepository::try_new(&conn).unwrap();
    let created = repo.create_contact(&john()).unwrap();

    let patch = ContactPatch {
        name: PatchField::Set(String::new()),
        email: PatchField::Set("jd@example.org".to_string()),
        ..ContactPatch::default()
    };
    let updated = repo.update_contact(created.id, &patch).unwrap();

    assert_eq!(updated.name, "");
    assert_eq!(updated.email, "jd@example.org");
    assert_eq!(updated.phone, "555-555-5555");
}

#[test]
fn empty_patch_returns_current_record() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteContactRepository::try_new(&conn).unwrap();
    let created = repo.create_contact(&john()).unwrap();

    let unchanged = repo
        .update_contact(created.id, &ContactPatch::default())
        .unwrap();
    assert_eq!(unchanged, created);
}

#[test]
fn update_leaves_other_contacts_untouched() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteContactRepository::try_new(&conn).unwrap();
    let first = repo.create_contact(&john()).unwrap();
    let second = repo
        .create_contact(&ContactInput::new("Jane Roe", "jane@example.com", "555-1234"))
        .unwrap();

    let patch = ContactPatch {
        name: PatchField::Set("Johnny".to_string()),
        ..ContactPatch::default()
    };
    repo.update_contact(first.id, &patch).unwrap();

    assert_eq!(repo.get_contact(second.id).unwrap(), second);
}

#[test]
fn delete_then_get_returns_not_found() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteContactRepository::try_new(&conn).unwrap();
    let created = repo.create_contact(&john()).unwrap();

    repo.delete_contact(created.id).unwrap();

    assert!(matches!(
        repo.get_contact(created.id),
        Err(RepoError::NotFound(id)) if id == created.id
    ));
    assert!(matches!(
        repo.delete_contact(created.id),
        Err(RepoError::NotFound(_))
    ));
}

#[test]
fn ids_are_not_reused_after_delete() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteContactRepository::try_new(&conn).unwrap();

    let first = repo.create_contact(&john()).unwrap();
    repo.delete_contact(first.id).unwrap();
    let second = repo.create_contact(&john()).unwrap();

    assert!(second.id > first.id);
}

#[test]
fn list_on_empty_store_is_empty() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteContactRepository::try_new(&conn).unwrap();

    assert!(repo.list_contacts().unwrap().is_empty());
}

#[test]
fn list_returns_contacts_in_insertion_order() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteContactRepository::try_new(&conn).unwrap();

    let names = ["Ada", "Grace", "Linus"];
    for name in names {
        repo.create_contact(&ContactInput::new(name, "x@example.com", "1"))
            .unwrap();
    }

    let listed: Vec<String> = repo
        .list_contacts()
        .unwrap()
        .into_iter()
        .map(|contact| contact.name)
        .collect();
    assert_eq!(listed, names);
}

#[test]
fn try_new_rejects_connection_without_contacts_table() {
    let conn = Connection::open_in_memory().unwrap();

    let err = SqliteContactRepository::try_new(&conn)
        .err()
        .expect("bare connection must be rejected");
    assert!(matches!(err, RepoError::MissingRequiredTable("contacts")));
}

#[test]
fn try_new_rejects_table_missing_a_column() {
    let conn = Connection::open_in_memory().unwrap();
    conn.execute_batch(
        "CREATE TABLE contacts (id INTEGER PRIMARY KEY, name TEXT, email TEXT);",
    )
    .unwrap();

    let err = SqliteContactRepository::try_new(&conn)
        .err()
        .expect("incomplete table must be rejected");
    assert!(matches!(
        err,
        RepoError::MissingRequiredColumn {
            table: "contacts",
            column: "phone"
        }
    ));
}

#[test]
fn try_new_accepts_table_with_extra_columns() {
    let conn = Connection::open_in_memory().unwrap();
    conn.execute_batch(
        "CREATE TABLE contacts (
            id INTEGER PRIMARY KEY,
            name TEXT NOT NULL,
            email TEXT NOT NULL,
            phone TEXT NOT NULL,
            nickname TEXT
        );",
    )
    .unwrap();

    let repo = SqliteContactRepository::try_new(&conn).unwrap();
    assert!(repo.list_contacts().unwrap().is_empty());
}

#[test]
fn service_delegates_to_repository() {
    let conn = open_db_in_memory().unwrap();
    let service = ContactService::new(SqliteContactRepository::try_new(&conn).unwrap());

    let created = service.create_contact(&john()).unwrap();
    assert_eq!(service.list_contacts().unwrap(), vec![created.clone()]);

    let patch = ContactPatch {
        email: PatchField::Set("new@example.com".to_string()),
        ..ContactPatch::default()
    };
    let updated = service.update_contact(created.id, &patch).unwrap();
    assert_eq!(service.get_contact(created.id).unwrap(), updated);

    service.delete_contact(created.id).unwrap();
    assert!(service.list_contacts().unwrap().is_empty());
}
