use vanavar_core::db::open_db_in_memory;
use vanavar_core::{
    EntryHandle, EntryRepository, EntryValidationError, RepoError, SqliteEntryRepository,
    DEFAULT_LIST_LIMIT,
};
use std::collections::HashSet;

#[test]
fn create_and_get_roundtrip() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteEntryRepository::new(&conn);

    let entry = repo.create("  first line  ").unwrap();
    assert_eq!(entry.content, "first line");

    let by_handle = repo.get(entry.handle).unwrap().unwrap();
    assert_eq!(by_handle, entry);

    let by_id = repo.get_by_id(entry.id).unwrap().unwrap();
    assert_eq!(by_id, entry);
}

#[test]
fn created_ids_are_unique() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteEntryRepository::new(&conn);

    let ids: HashSet<_> = (0..200)
        .map(|index| repo.create(&format!("line {index}")).unwrap().id)
        .collect();
    assert_eq!(ids.len(), 200);
    assert_eq!(repo.count().unwrap(), 200);
}

#[test]
fn identical_content_gets_distinct_entries() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteEntryRepository::new(&conn);

    let first = repo.create("same").unwrap();
    let second = repo.create("same").unwrap();
    assert_ne!(first.id, second.id);
    assert_ne!(first.handle, second.handle);
    assert_eq!(repo.count().unwrap(), 2);
}

#[test]
fn empty_input_is_rejected_and_count_unchanged() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteEntryRepository::new(&conn);
    repo.create("keep me").unwrap();

    for blank in ["", "   ", "\t\n"] {
        let err = repo.create(blank).unwrap_err();
        assert!(matches!(
            err,
            RepoError::InvalidInput(EntryValidationError::EmptyContent)
        ));
    }
    assert_eq!(repo.count().unwrap(), 1);
}

#[test]
fn update_preserves_identity_and_creation_time() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteEntryRepository::new(&conn);

    let entry = repo.create("foo").unwrap();
    repo.update(entry.handle, "bar").unwrap();

    let loaded = repo.get_by_id(entry.id).unwrap().unwrap();
    assert_eq!(loaded.content, "bar");
    assert_eq!(loaded.id, entry.id);
    assert_eq!(loaded.created_at, entry.created_at);
    assert_eq!(loaded.handle, entry.handle);
}

#[test]
fn update_rejects_empty_content() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteEntryRepository::new(&conn);

    let entry = repo.create("foo").unwrap();
    let err = repo.update(entry.handle, "  ").unwrap_err();
    assert!(matches!(err, RepoError::InvalidInput(_)));
    assert_eq!(repo.get(entry.handle).unwrap().unwrap().content, "foo");
}

#[test]
fn update_and_delete_after_delete_return_not_found() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteEntryRepository::new(&conn);

    let entry = repo.create("short lived").unwrap();
    repo.delete(entry.handle).unwrap();

    let update_err = repo.update(entry.handle, "again").unwrap_err();
    assert!(matches!(update_err, RepoError::NotFound(handle) if handle == entry.handle));

    let delete_err = repo.delete(entry.handle).unwrap_err();
    assert!(matches!(delete_err, RepoError::NotFound(handle) if handle == entry.handle));

    assert!(repo.get(entry.handle).unwrap().is_none());
    assert_eq!(repo.count().unwrap(), 0);
}

#[test]
fn handles_are_not_reused_after_delete() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteEntryRepository::new(&conn);

    let first = repo.create("first").unwrap();
    repo.delete(first.handle).unwrap();
    let second = repo.create("second").unwrap();

    assert_ne!(first.handle, second.handle);
    assert!(matches!(
        repo.delete(first.handle),
        Err(RepoError::NotFound(_))
    ));
}

#[test]
fn unknown_handle_is_not_found() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteEntryRepository::new(&conn);

    let missing = EntryHandle::new(9_999);
    assert!(repo.get(missing).unwrap().is_none());
    assert!(matches!(repo.delete(missing), Err(RepoError::NotFound(_))));
}

#[test]
fn list_recent_is_newest_first_and_limited() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteEntryRepository::new(&conn);

    let a = repo.create("a").unwrap();
    let b = repo.create("b").unwrap();
    let c = repo.create("c").unwrap();
    conn.execute(
        "UPDATE entries SET created_at = CASE id WHEN ?1 THEN 1000 WHEN ?2 THEN 3000 ELSE 2000 END;",
        [a.id.to_string(), b.id.to_string()],
    )
    .unwrap();

    let recent = repo.list_recent(2).unwrap();
    let contents: Vec<_> = recent.iter().map(|entry| entry.content.as_str()).collect();
    assert_eq!(contents, ["b", "c"]);

    let all = repo.list_recent(DEFAULT_LIST_LIMIT).unwrap();
    assert_eq!(all.len(), 3);
    assert_eq!(all[2].id, a.id);
    assert!(c.created_at > 0);
}

#[test]
fn list_recent_breaks_timestamp_ties_by_insertion() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteEntryRepository::new(&conn);

    repo.create("one").unwrap();
    repo.create("two").unwrap();
    conn.execute("UPDATE entries SET created_at = 42;", []).unwrap();

    let recent = repo.list_recent(10).unwrap();
    assert_eq!(recent[0].content, "two");
    assert_eq!(recent[1].content, "one");
}

#[test]
fn export_is_oldest_first_and_reflects_call_time() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteEntryRepository::new(&conn);

    let first = repo.create("first").unwrap();
    repo.create("second").unwrap();
    conn.execute(
        "UPDATE entries SET created_at = created_at + 60000 WHERE id = ?1;",
        [first.id.to_string()],
    )
    .unwrap();

    assert_eq!(repo.all_for_export().unwrap(), ["second", "first"]);

    repo.create("third").unwrap();
    let again = repo.all_for_export().unwrap();
    assert_eq!(again.len(), 3);
}

#[test]
fn snapshot_is_keyed_by_id() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteEntryRepository::new(&conn);

    let a = repo.create("alpha").unwrap();
    let b = repo.create("beta").unwrap();

    let snapshot = repo.snapshot_by_id().unwrap();
    assert_eq!(snapshot.len(), 2);
    assert_eq!(snapshot[&a.id], a.record());
    assert_eq!(snapshot[&b.id].content, "beta");
}

#[test]
fn insert_replica_keeps_given_identity() {
    let conn = open_db_in_memory().unwrap();
    let source_conn = open_db_in_memory().unwrap();
    let source = SqliteEntryRepository::new(&source_conn);
    let repo = SqliteEntryRepository::new(&conn);

    let original = source.create("copied line").unwrap();
    let copy = repo.insert_replica(original.id, &original.record()).unwrap();

    assert_eq!(copy.id, original.id);
    assert_eq!(copy.created_at, original.created_at);
    assert_eq!(copy.content, original.content);

    let duplicate = repo.insert_replica(original.id, &original.record());
    assert!(matches!(duplicate, Err(RepoError::StorageUnavailable(_))));
    assert_eq!(repo.count().unwrap(), 1);
}
