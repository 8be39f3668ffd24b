//! Privacy and tenant-isolation tests for NoteService.

use std::sync::Arc;

use chrono::{Duration, TimeZone, Utc};

use crate::mock::MockNoteStore;
use crate::{
    Error, ListNotesRequest, Note, NoteService, NoteSortField, ResourceRef, ResourceType,
    UserPrincipal,
};

const ORG: i32 = 1;
const OTHER_ORG: i32 = 2;

fn event_5() -> ResourceRef {
    ResourceRef::new(ResourceType::Event, 5)
}

fn stored(creator_id: i32, text: &str, is_private: bool, minutes: i64) -> Note {
    let base = Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap();
    Note {
        id: 0,
        creator_id,
        creator: None,
        created_time: Some(base + Duration::minutes(minutes)),
        edited: false,
        is_private,
        resource_type: ResourceType::Event,
        resource_id: 5,
        text: text.to_string(),
    }
}

/// Three public and two private notes on event 5, plus noise elsewhere.
async fn seeded() -> (NoteService<MockNoteStore>, Arc<MockNoteStore>) {
    let store = Arc::new(MockNoteStore::new());
    store.seed(ORG, stored(7, "a public", false, 1)).await;
    store.seed(ORG, stored(7, "b private", true, 2)).await;
    store.seed(ORG, stored(8, "c public", false, 3)).await;
    store.seed(ORG, stored(8, "d private", true, 4)).await;
    store.seed(ORG, stored(9, "e public", false, 5)).await;

    let mut elsewhere = stored(7, "other resource", false, 6);
    elsewhere.resource_id = 6;
    store.seed(ORG, elsewhere).await;
    store.seed(OTHER_ORG, stored(7, "other tenant", false, 7)).await;

    (NoteService::new(Arc::clone(&store)), store)
}

fn reader(perms: &[&str]) -> UserPrincipal {
    UserPrincipal::new(7, ORG).with_permissions(perms.iter().copied())
}

#[tokio::test]
async fn test_list_without_private_permission_excludes_private_from_page_and_total() {
    let (svc, _store) = seeded().await;
    let page = svc
        .list(&reader(&["note.list"]), ListNotesRequest::new(event_5()))
        .await
        .unwrap();

    assert_eq!(page.count, 3);
    assert_eq!(page.total_results, 3);
    assert!(page.results.iter().all(|n| !n.is_private));
}

#[tokio::test]
async fn test_list_with_private_permission_includes_everything() {
    let (svc, _store) = seeded().await;
    let page = svc
        .list(
            &reader(&["note.list", "private.note.list"]),
            ListNotesRequest::new(event_5()),
        )
        .await
        .unwrap();

    assert_eq!(page.count, 5);
    assert_eq!(page.total_results, 5);
}

#[tokio::test]
async fn test_list_requires_base_permission() {
    let (svc, _store) = seeded().await;
    let err = svc
        .list(&reader(&["private.note.list"]), ListNotesRequest::new(event_5()))
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Unauthorized(_)));
}

#[tokio::test]
async fn test_list_default_sort_is_newest_first() {
    let (svc, _store) = seeded().await;
    let page = svc
        .list(&reader(&["note.list"]), ListNotesRequest::new(event_5()))
        .await
        .unwrap();
    let texts: Vec<&str> = page.results.iter().map(|n| n.text.as_str()).collect();
    assert_eq!(texts, vec!["e public", "c public", "a public"]);
}

#[tokio::test]
async fn test_list_other_fields_sort_ascending_and_paginate() {
    let (svc, _store) = seeded().await;
    let req = ListNotesRequest::new(event_5())
        .sort_by(NoteSortField::Note)
        .page(1, 2);
    let page = svc
        .list(&reader(&["note.list", "private.note.list"]), req)
        .await
        .unwrap();

    let texts: Vec<&str> = page.results.iter().map(|n| n.text.as_str()).collect();
    assert_eq!(texts, vec!["b private", "c public"]);
    assert_eq!(page.start, 1);
    assert_eq!(page.count, 2);
    assert_eq!(page.total_results, 5);
}

#[tokio::test]
async fn test_list_by_creator_puts_unknown_names_last() {
    let (svc, store) = seeded().await;
    store.add_person(8, "Bo").await;
    store.add_person(9, "Al").await;

    let req = ListNotesRequest::new(event_5()).sort_by(NoteSortField::Creator);
    let page = svc
        .list(&reader(&["note.list", "private.note.list"]), req)
        .await
        .unwrap();

    let texts: Vec<&str> = page.results.iter().map(|n| n.text.as_str()).collect();
    assert_eq!(
        texts,
        vec!["e public", "c public", "d private", "a public", "b private"]
    );
}

#[tokio::test]
async fn test_list_rejects_bad_paging() {
    let (svc, _store) = seeded().await;
    let err = svc
        .list(
            &reader(&["note.list"]),
            ListNotesRequest::new(event_5()).page(0, 0),
        )
        .await
        .unwrap_err();
    assert!(matches!(err, Error::BadRequest(_)));
}

#[tokio::test]
async fn test_private_note_direct_access_requires_escalation() {
    let (svc, store) = seeded().await;
    // Note 2 is private and authored by user 7, so ownership is not the issue.
    let caller = reader(&["note.read", "note.update", "note.delete"]);

    assert!(matches!(svc.get(&caller, 2).await, Err(Error::Unauthorized(_))));

    let (_, mut edit) = store.raw(2).await.unwrap();
    edit.text = "changed".into();
    assert!(matches!(
        svc.update(&caller, edit).await,
        Err(Error::Unauthorized(_))
    ));
    assert!(matches!(svc.delete(&caller, 2).await, Err(Error::Unauthorized(_))));
    assert_eq!(store.write_count().await, 0);
}

#[tokio::test]
async fn test_private_checked_before_ownership() {
    let (svc, _store) = seeded().await;
    // Note 4 is private and authored by user 8.
    let caller = reader(&["note.delete"]);
    assert!(matches!(svc.delete(&caller, 4).await, Err(Error::Unauthorized(_))));
}

#[tokio::test]
async fn test_public_note_readable_with_base_permission_only() {
    let (svc, _store) = seeded().await;
    let note = svc.get(&reader(&["note.read"]), 3).await.unwrap();
    assert_eq!(note.text, "c public");
}

#[tokio::test]
async fn test_notes_are_invisible_across_tenants() {
    let (svc, store) = seeded().await;
    let outsider = UserPrincipal::new(7, OTHER_ORG).with_permissions([
        "note.list",
        "note.read",
        "note.update",
        "note.delete",
        "private.note.list",
    ]);

    let page = svc
        .list(&outsider, ListNotesRequest::new(event_5()))
        .await
        .unwrap();
    assert_eq!(page.total_results, 1);
    assert_eq!(page.results[0].text, "other tenant");

    // Note 1 belongs to ORG and was authored by user 7; same user id, wrong tenant.
    assert!(matches!(svc.get(&outsider, 1).await, Err(Error::NotFound(_))));
    let (_, mut edit) = store.raw(1).await.unwrap();
    edit.text = "cross-tenant".into();
    assert!(matches!(
        svc.update(&outsider, edit).await,
        Err(Error::NotFound(_))
    ));
    assert!(matches!(svc.delete(&outsider, 1).await, Err(Error::NotFound(_))));
    assert_eq!(store.raw(1).await.unwrap().1.text, "a public");
}
