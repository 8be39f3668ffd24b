//! In-memory collaborators for tests.
//!
//! [`MockNoteStore`] implements [`NoteStore`] over a vector guarded by a
//! tokio lock, honouring tenant scoping, privacy filtering and the sort
//! contract of the real store. It also lets a test fail the next storage
//! call or make a note disappear between load and write.

use std::collections::{HashMap, HashSet};

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::error::{Error, Result};
use crate::models::*;
use crate::traits::NoteStore;

#[derive(Debug, Default)]
struct State {
    rows: Vec<(OrgId, Note)>,
    next_id: NoteId,
    people: HashMap<UserId, String>,
    vanishing: HashSet<NoteId>,
    fail_next: Option<String>,
    fail_name_lookup: Option<String>,
    writes: usize,
}

impl State {
    fn take_failure(&mut self) -> Result<()> {
        match self.fail_next.take() {
            Some(msg) => Err(Error::Storage(msg)),
            None => Ok(()),
        }
    }

    /// Drop a note a test marked as concurrently deleted. True if it was one.
    fn vanish(&mut self, id: NoteId) -> bool {
        if self.vanishing.remove(&id) {
            self.rows.retain(|(_, n)| n.id != id);
            return true;
        }
        false
    }
}

/// In-memory [`NoteStore`].
#[derive(Debug, Default)]
pub struct MockNoteStore {
    state: RwLock<State>,
}

impl MockNoteStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a display name for a user.
    pub async fn add_person(&self, user_id: UserId, name: impl Into<String>) {
        self.state.write().await.people.insert(user_id, name.into());
    }

    /// Store a note verbatim (id assigned if zero) and return its id.
    pub async fn seed(&self, org: OrgId, mut note: Note) -> NoteId {
        let mut state = self.state.write().await;
        if note.id == 0 {
            state.next_id += 1;
            note.id = state.next_id;
        } else {
            state.next_id = state.next_id.max(note.id);
        }
        let id = note.id;
        state.rows.push((org, note));
        id
    }

    /// Make the next storage call fail with `Error::Storage`.
    pub async fn fail_next(&self, msg: impl Into<String>) {
        self.state.write().await.fail_next = Some(msg.into());
    }

    /// Make every `creator_name` call fail with `Error::Storage`, leaving
    /// the other methods working.
    pub async fn fail_name_lookup(&self, msg: impl Into<String>) {
        self.state.write().await.fail_name_lookup = Some(msg.into());
    }

    /// Simulate another writer deleting `id` after it has been loaded:
    /// reads still see it, the next update or delete finds no row.
    pub async fn delete_concurrently(&self, id: NoteId) {
        self.state.write().await.vanishing.insert(id);
    }

    /// Number of successful insert/update/delete calls.
    pub async fn write_count(&self) -> usize {
        self.state.read().await.writes
    }

    /// Raw row lookup, ignoring tenant.
    pub async fn raw(&self, id: NoteId) -> Option<(OrgId, Note)> {
        self.state
            .read()
            .await
            .rows
            .iter()
            .find(|(_, n)| n.id == id)
            .cloned()
    }
}

fn is_visible(
    row: &(OrgId, Note),
    org: OrgId,
    resource: ResourceRef,
    include_private: bool,
) -> bool {
    let (row_org, n) = row;
    *row_org == org && n.resource() == resource && (include_private || !n.is_private)
}

fn compare(field: NoteSortField, a: &Note, b: &Note) -> std::cmp::Ordering {
    match field {
        NoteSortField::CreatedTime => b.created_time.cmp(&a.created_time),
        NoteSortField::Id => a.id.cmp(&b.id),
        NoteSortField::CreatorId => a.creator_id.cmp(&b.creator_id),
        // Unknown names last, as with NULLS LAST in SQL.
        NoteSortField::Creator => a
            .creator
            .is_none()
            .cmp(&b.creator.is_none())
            .then_with(|| a.creator.cmp(&b.creator)),
        NoteSortField::Edited => a.edited.cmp(&b.edited),
        NoteSortField::Private => a.is_private.cmp(&b.is_private),
        NoteSortField::Note => a.text.cmp(&b.text),
    }
}

#[async_trait]
impl NoteStore for MockNoteStore {
    async fn count(&self, org: OrgId, resource: ResourceRef, include_private: bool) -> Result<i64> {
        let mut state = self.state.write().await;
        state.take_failure()?;
        let n = state
            .rows
            .iter()
            .filter(|row| is_visible(row, org, resource, include_private))
            .count();
        Ok(n as i64)
    }

    async fn list(
        &self,
        org: OrgId,
        resource: ResourceRef,
        include_private: bool,
        sort_field: NoteSortField,
        offset: i64,
        limit: i64,
    ) -> Result<Vec<Note>> {
        let mut state = self.state.write().await;
        state.take_failure()?;
        let mut notes: Vec<Note> = state
            .rows
            .iter()
            .filter(|row| is_visible(row, org, resource, include_private))
            .map(|(_, n)| {
                let mut n = n.clone();
                n.creator = state.people.get(&n.creator_id).cloned();
                n
            })
            .collect();
        notes.sort_by(|a, b| compare(sort_field, a, b));
        Ok(notes
            .into_iter()
            .skip(offset.max(0) as usize)
            .take(limit.max(0) as usize)
            .collect())
    }

    async fn get_by_id(&self, org: OrgId, id: NoteId) -> Result<Option<Note>> {
        let mut state = self.state.write().await;
        state.take_failure()?;
        let found = state
            .rows
            .iter()
            .find(|(row_org, n)| *row_org == org && n.id == id)
            .map(|(_, n)| {
                let mut n = n.clone();
                n.creator = state.people.get(&n.creator_id).cloned();
                n
            });
        Ok(found)
    }

    async fn insert(&self, org: OrgId, note: &Note) -> Result<NoteId> {
        let mut state = self.state.write().await;
        state.take_failure()?;
        state.next_id += 1;
        let mut stored = note.clone();
        stored.id = state.next_id;
        stored.creator = None;
        state.rows.push((org, stored));
        state.writes += 1;
        Ok(state.next_id)
    }

    async fn update_mutable_fields(
        &self,
        org: OrgId,
        id: NoteId,
        is_private: bool,
        text: &str,
        mark_edited: bool,
    ) -> Result<u64> {
        let mut state = self.state.write().await;
        state.take_failure()?;
        if state.vanish(id) {
            return Ok(0);
        }
        let Some((_, note)) = state
            .rows
            .iter_mut()
            .find(|(row_org, n)| *row_org == org && n.id == id)
        else {
            return Ok(0);
        };
        note.is_private = is_private;
        note.text = text.to_string();
        if mark_edited {
            note.edited = true;
        }
        state.writes += 1;
        Ok(1)
    }

    async fn delete(&self, org: OrgId, id: NoteId) -> Result<u64> {
        let mut state = self.state.write().await;
        state.take_failure()?;
        if state.vanish(id) {
            return Ok(0);
        }
        let before = state.rows.len();
        state.rows.retain(|(row_org, n)| !(*row_org == org && n.id == id));
        let removed = (before - state.rows.len()) as u64;
        if removed > 0 {
            state.writes += 1;
        }
        Ok(removed)
    }

    async fn creator_name(&self, user_id: UserId) -> Result<Option<String>> {
        let mut state = self.state.write().await;
        state.take_failure()?;
        if let Some(msg) = &state.fail_name_lookup {
            return Err(Error::Storage(msg.clone()));
        }
        Ok(state.people.get(&user_id).cloned())
    }
}
