use vanavar_core::db::open_db_in_memory;
use vanavar_core::{translate, EntryRepository, MatchQuery, SqliteEntryRepository};

fn contents(entries: &[vanavar_core::Entry]) -> Vec<&str> {
    entries.iter().map(|entry| entry.content.as_str()).collect()
}

#[test]
fn prefix_term_matches_longer_token() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteEntryRepository::new(&conn);
    let entry = repo.create("alexander graham").unwrap();

    let hits = repo.get_by_predicate(&translate(["alex"])).unwrap();
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].id, entry.id);

    let exact = repo.get_by_predicate(&translate(["alex$"])).unwrap();
    assert!(exact.is_empty());
}

#[test]
fn exact_term_matches_whole_token() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteEntryRepository::new(&conn);
    let entry = repo.create("alex").unwrap();
    repo.create("alexis").unwrap();

    let hits = repo.get_by_predicate(&translate(["alex$"])).unwrap();
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].id, entry.id);
}

#[test]
fn multiple_terms_must_all_match() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteEntryRepository::new(&conn);
    let entry = repo
        .create("VSNT reporter \"Alex Sherman\" alex.sherman@versantmedia.com @sherman4949")
        .unwrap();
    repo.create("Alex from accounting").unwrap();

    let both = repo.get_by_predicate(&translate(["alex", "vsnt"])).unwrap();
    assert_eq!(both.len(), 1);
    assert_eq!(both[0].id, entry.id);

    let none = repo
        .get_by_predicate(&translate(["alex", "nomatch"]))
        .unwrap();
    assert!(none.is_empty());
}

#[test]
fn matching_is_case_insensitive() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteEntryRepository::new(&conn);
    repo.create("Project Alpha deadline").unwrap();

    let hits = repo.get_by_predicate(&MatchQuery::parse("PROJ alpha$")).unwrap();
    assert_eq!(contents(&hits), ["Project Alpha deadline"]);
}

#[test]
fn results_follow_insertion_order() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteEntryRepository::new(&conn);
    repo.create("token one").unwrap();
    repo.create("unrelated").unwrap();
    repo.create("token two").unwrap();

    let hits = repo.get_by_predicate(&translate(["tok"])).unwrap();
    assert_eq!(contents(&hits), ["token one", "token two"]);
}

#[test]
fn quoted_terms_do_not_break_query_construction() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteEntryRepository::new(&conn);
    let entry = repo.create("say \"hi\"").unwrap();

    let exact = repo.get_by_predicate(&translate(["\"hi\"$"])).unwrap();
    assert_eq!(exact.len(), 1);
    assert_eq!(exact[0].id, entry.id);

    let unbalanced = repo.get_by_predicate(&translate(["\"unterminated"])).unwrap();
    assert!(unbalanced.is_empty());
}

#[test]
fn fts_operators_in_terms_are_literal() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteEntryRepository::new(&conn);
    repo.create("alpha beta").unwrap();

    for term in ["a:b", "NOT", "AND", "(x", "x)", "NEAR(", "*", "^alpha"] {
        repo.get_by_predicate(&translate([term]))
            .unwrap_or_else(|err| panic!("term {term:?} failed: {err}"));
    }
}

#[test]
fn tiny_and_marker_only_terms_are_accepted() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteEntryRepository::new(&conn);
    repo.create("apple banana").unwrap();
    repo.create("cherry").unwrap();

    let broad = repo.get_by_predicate(&translate(["a"])).unwrap();
    assert_eq!(contents(&broad), ["apple banana"]);

    let marker_only = repo.get_by_predicate(&translate(["$"])).unwrap();
    assert!(marker_only.is_empty());

    // Next to a real term the empty phrase is dropped, not a veto.
    let with_marker = repo.get_by_predicate(&translate(["app", "$"])).unwrap();
    assert_eq!(contents(&with_marker), ["apple banana"]);
}

#[test]
fn empty_query_returns_nothing() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteEntryRepository::new(&conn);
    repo.create("anything").unwrap();

    assert!(repo.get_by_predicate(&MatchQuery::parse("   ")).unwrap().is_empty());
    assert_eq!(repo.delete_matching(&MatchQuery::parse("")).unwrap(), 0);
}

#[test]
fn search_reflects_updates_and_deletes() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteEntryRepository::new(&conn);
    let entry = repo.create("alpha text").unwrap();

    repo.update(entry.handle, "beta text").unwrap();
    assert!(repo.get_by_predicate(&translate(["alpha"])).unwrap().is_empty());
    assert_eq!(repo.get_by_predicate(&translate(["beta"])).unwrap().len(), 1);

    repo.delete(entry.handle).unwrap();
    assert!(repo.get_by_predicate(&translate(["beta"])).unwrap().is_empty());
}

#[test]
fn delete_matching_removes_all_hits() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteEntryRepository::new(&conn);
    repo.create("old note one").unwrap();
    repo.create("old note two").unwrap();
    let kept = repo.create("fresh note").unwrap();

    let removed = repo.delete_matching(&translate(["old$"])).unwrap();
    assert_eq!(removed, 2);
    assert_eq!(repo.count().unwrap(), 1);
    assert_eq!(repo.get_by_predicate(&translate(["note"])).unwrap()[0].id, kept.id);
}
