//! Integration tests for PgNoteRepository.
//!
//! Each test runs in its own schema (see `TestDatabase`), so they can run
//! in parallel against one PostgreSQL instance.

use std::sync::Arc;

use chrono::{Duration, TimeZone, Utc};

use annot_db::test_fixtures::TestDatabase;
use annot_db::{
    Error, ListNotesRequest, Note, NoteService, NoteSortField, NoteStore, ResourceRef,
    ResourceType, UserPrincipal,
};

const ORG: i32 = 1;
const OTHER_ORG: i32 = 2;

fn event_5() -> ResourceRef {
    ResourceRef::new(ResourceType::Event, 5)
}

fn note(creator_id: i32, text: &str, is_private: bool, minutes: i64) -> Note {
    let base = Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap();
    Note {
        creator_id,
        created_time: Some(base + Duration::minutes(minutes)),
        ..Note::draft(event_5(), text, is_private)
    }
}

#[tokio::test]
#[ignore] // Requires DATABASE_URL with migrated database
async fn test_insert_and_get_resolves_creator_name() {
    let test_db = TestDatabase::new().await;
    test_db.add_person(7, "Ada Lovelace").await;
    let repo = &test_db.db.notes;

    let id = repo.insert(ORG, &note(7, "hello", false, 0)).await.unwrap();
    assert!(id > 0);

    let found = repo.get_by_id(ORG, id).await.unwrap().expect("note exists");
    assert_eq!(found.id, id);
    assert_eq!(found.creator_id, 7);
    assert_eq!(found.creator.as_deref(), Some("Ada Lovelace"));
    assert_eq!(found.text, "hello");
    assert_eq!(found.resource(), event_5());
    assert!(!found.edited);
    assert!(!found.is_private);

    assert_eq!(
        repo.creator_name(7).await.unwrap().as_deref(),
        Some("Ada Lovelace")
    );
    assert_eq!(repo.creator_name(99).await.unwrap(), None);

    test_db.cleanup().await;
}

#[tokio::test]
#[ignore] // Requires DATABASE_URL with migrated database
async fn test_missing_creator_leaves_name_empty() {
    let test_db = TestDatabase::new().await;
    let repo = &test_db.db.notes;

    let id = repo.insert(ORG, &note(42, "orphan", false, 0)).await.unwrap();
    let found = repo.get_by_id(ORG, id).await.unwrap().unwrap();
    assert_eq!(found.creator, None);

    test_db.cleanup().await;
}

#[tokio::test]
#[ignore] // Requires DATABASE_URL with migrated database
async fn test_count_and_list_filter_private_and_tenant() {
    let test_db = TestDatabase::new().await;
    let repo = &test_db.db.notes;

    repo.insert(ORG, &note(7, "a public", false, 1)).await.unwrap();
    repo.insert(ORG, &note(7, "b private", true, 2)).await.unwrap();
    repo.insert(ORG, &note(8, "c public", false, 3)).await.unwrap();
    repo.insert(OTHER_ORG, &note(7, "other tenant", false, 4))
        .await
        .unwrap();
    let mut elsewhere = note(7, "other resource", false, 5);
    elsewhere.resource_id = 6;
    repo.insert(ORG, &elsewhere).await.unwrap();

    assert_eq!(repo.count(ORG, event_5(), false).await.unwrap(), 2);
    assert_eq!(repo.count(ORG, event_5(), true).await.unwrap(), 3);
    assert_eq!(repo.count(OTHER_ORG, event_5(), true).await.unwrap(), 1);

    let public = repo
        .list(ORG, event_5(), false, NoteSortField::CreatedTime, 0, 10)
        .await
        .unwrap();
    let texts: Vec<&str> = public.iter().map(|n| n.text.as_str()).collect();
    assert_eq!(texts, vec!["c public", "a public"]);

    test_db.cleanup().await;
}

#[tokio::test]
#[ignore] // Requires DATABASE_URL with migrated database
async fn test_list_sorts_ascending_and_pages() {
    let test_db = TestDatabase::new().await;
    let repo = &test_db.db.notes;

    for (i, text) in ["delta", "alpha", "charlie", "bravo"].iter().enumerate() {
        repo.insert(ORG, &note(7, text, false, i as i64)).await.unwrap();
    }

    let page = repo
        .list(ORG, event_5(), true, NoteSortField::Note, 1, 2)
        .await
        .unwrap();
    let texts: Vec<&str> = page.iter().map(|n| n.text.as_str()).collect();
    assert_eq!(texts, vec!["bravo", "charlie"]);

    test_db.cleanup().await;
}

#[tokio::test]
#[ignore] // Requires DATABASE_URL with migrated database
async fn test_update_only_touches_mutable_fields_and_latches_edited() {
    let test_db = TestDatabase::new().await;
    let repo = &test_db.db.notes;

    let original = note(7, "first", false, 0);
    let id = repo.insert(ORG, &original).await.unwrap();

    let rows = repo
        .update_mutable_fields(ORG, id, true, "second", true)
        .await
        .unwrap();
    assert_eq!(rows, 1);

    // A later write without the flag must not clear it.
    repo.update_mutable_fields(ORG, id, true, "second", false)
        .await
        .unwrap();

    let found = repo.get_by_id(ORG, id).await.unwrap().unwrap();
    assert_eq!(found.text, "second");
    assert!(found.is_private);
    assert!(found.edited);
    assert_eq!(found.creator_id, 7);
    assert_eq!(found.created_time, original.created_time);

    test_db.cleanup().await;
}

#[tokio::test]
#[ignore] // Requires DATABASE_URL with migrated database
async fn test_writes_are_scoped_to_tenant() {
    let test_db = TestDatabase::new().await;
    let repo = &test_db.db.notes;

    let id = repo.insert(ORG, &note(7, "mine", false, 0)).await.unwrap();

    assert!(repo.get_by_id(OTHER_ORG, id).await.unwrap().is_none());
    assert_eq!(
        repo.update_mutable_fields(OTHER_ORG, id, false, "stolen", true)
            .await
            .unwrap(),
        0
    );
    assert_eq!(repo.delete(OTHER_ORG, id).await.unwrap(), 0);

    assert_eq!(repo.delete(ORG, id).await.unwrap(), 1);
    assert_eq!(repo.delete(ORG, id).await.unwrap(), 0);
    assert!(repo.get_by_id(ORG, id).await.unwrap().is_none());

    test_db.cleanup().await;
}

#[tokio::test]
#[ignore] // Requires DATABASE_URL with migrated database
async fn test_service_lifecycle_against_postgres() {
    let test_db = TestDatabase::new().await;
    test_db.add_person(7, "Ada Lovelace").await;
    let service = NoteService::new(Arc::new(test_db.db.notes.clone()));

    let author = UserPrincipal::new(7, ORG).with_permissions([
        "note.create",
        "note.read",
        "note.update",
        "note.delete",
        "note.list",
    ]);
    let other = UserPrincipal::new(9, ORG).with_permissions(["note.update", "note.delete"]);

    let created = service
        .create(&author, Note::draft(event_5(), "hello", false))
        .await
        .unwrap();
    assert_eq!(created.creator.as_deref(), Some("Ada Lovelace"));

    let mut edit = created.clone();
    edit.text = "changed".into();
    assert!(matches!(
        service.update(&other, edit.clone()).await,
        Err(Error::Forbidden(_))
    ));
    let updated = service.update(&author, edit).await.unwrap();
    assert!(updated.edited);

    let page = service
        .list(&author, ListNotesRequest::new(event_5()))
        .await
        .unwrap();
    assert_eq!(page.total_results, 1);
    assert_eq!(page.results[0].text, "changed");

    assert!(matches!(
        service.delete(&other, created.id).await,
        Err(Error::Forbidden(_))
    ));
    service.delete(&author, created.id).await.unwrap();
    assert!(matches!(
        service.get(&author, created.id).await,
        Err(Error::NotFound(_))
    ));

    test_db.cleanup().await;
}
