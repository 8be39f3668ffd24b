//! Note lifecycle coordination.
//!
//! [`NoteService`] runs each operation end to end: it loads whatever state
//! the decision needs, asks [`crate::policy`] for a verdict, and only then
//! touches the store. No write happens unless every check has passed.
//!
//! The load-check-write sequence is not atomic. A concurrent writer can
//! change or delete the note between the check and the write; a delete that
//! then finds nothing reports `NotFound`, and two overlapping updates resolve
//! last-writer-wins.

use std::sync::Arc;
use std::time::Instant;

use chrono::Utc;
use tracing::{debug, error, info, warn};

use crate::error::{Error, Result};
use crate::models::{ListNotesRequest, Note, NoteId, NotePage};
use crate::policy::{self, Operation};
use crate::principal::Principal;
use crate::traits::NoteStore;

/// Orchestrates list/read/create/update/delete against a [`NoteStore`].
pub struct NoteService<S: ?Sized> {
    store: Arc<S>,
}

impl<S: ?Sized> Clone for NoteService<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
        }
    }
}

fn not_found(id: NoteId) -> Error {
    Error::NotFound(format!("Note {} not found", id))
}

/// Log a storage failure with its context and hand it back unchanged.
fn storage_failure(op: Operation, context: String) -> impl FnOnce(Error) -> Error {
    move |err| {
        if err.is_storage_failure() {
            error!(
                subsystem = "core",
                component = "note_service",
                op = op.as_str(),
                context = %context,
                error = %err,
                "Note storage operation failed"
            );
        }
        err
    }
}

impl<S: NoteStore + ?Sized> NoteService<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    /// The underlying store.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// List one page of the notes on a resource that the caller may see.
    ///
    /// Callers without `private.note.list` get public notes only; private
    /// notes are left out of both the page and the total.
    pub async fn list(
        &self,
        principal: &impl Principal,
        req: ListNotesRequest,
    ) -> Result<NotePage> {
        let include_private = policy::authorize_list(principal)?;
        let req = req.validated()?;
        let org = principal.org_id();
        let start = Instant::now();

        let total = self
            .store
            .count(org, req.resource, include_private)
            .await
            .map_err(storage_failure(Operation::List, req.resource.to_string()))?;

        let results = self
            .store
            .list(
                org,
                req.resource,
                include_private,
                req.sort_field,
                req.start,
                req.count,
            )
            .await
            .map_err(storage_failure(Operation::List, req.resource.to_string()))?;

        debug!(
            subsystem = "core",
            component = "note_service",
            op = "list",
            org_id = org,
            resource_type = %req.resource.resource_type,
            resource_id = req.resource.resource_id,
            include_private,
            sort_field = req.sort_field.as_str(),
            result_count = results.len(),
            total,
            duration_ms = start.elapsed().as_millis() as u64,
            "Listed notes"
        );

        Ok(NotePage {
            start: req.start,
            count: results.len() as i64,
            total_results: total,
            results,
        })
    }

    /// Fetch a single note.
    pub async fn get(&self, principal: &impl Principal, id: NoteId) -> Result<Note> {
        policy::require_base(principal, Operation::Read)?;
        let note = self.load(principal, Operation::Read, id).await?;
        policy::authorize_read(principal, &note)?;
        Ok(note)
    }

    /// Create a note authored by the caller.
    ///
    /// Any id, author, timestamp or edited state on `draft` is discarded.
    pub async fn create(&self, principal: &impl Principal, draft: Note) -> Result<Note> {
        policy::require_base(principal, Operation::Create)?;
        policy::authorize_create(principal, &draft)?;

        let org = principal.org_id();
        let mut note = Note {
            id: 0,
            creator_id: principal.user_id(),
            creator: None,
            created_time: Some(Utc::now()),
            edited: false,
            ..draft
        };

        let id = self
            .store
            .insert(org, &note)
            .await
            .map_err(storage_failure(Operation::Create, note.resource().to_string()))?;
        // The row is committed; a failed name lookup only costs the display name.
        let creator = match self.store.creator_name(note.creator_id).await {
            Ok(name) => name,
            Err(err) => {
                warn!(
                    subsystem = "core",
                    component = "note_service",
                    op = "create",
                    note_id = id,
                    user_id = note.creator_id,
                    error = %err,
                    "Creator name lookup failed"
                );
                None
            }
        };
        note.id = id;
        note.creator = creator;

        info!(
            subsystem = "core",
            component = "note_service",
            op = "create",
            note_id = note.id,
            user_id = note.creator_id,
            org_id = org,
            resource_type = %note.resource_type,
            resource_id = note.resource_id,
            "Created note"
        );
        Ok(note)
    }

    /// Apply an edit to an existing note and return the merged result.
    ///
    /// Only privacy and text are taken from `proposed`; everything else is
    /// carried over from the stored note.
    pub async fn update(&self, principal: &impl Principal, proposed: Note) -> Result<Note> {
        policy::require_base(principal, Operation::Update)?;
        let existing = self.load(principal, Operation::Update, proposed.id).await?;
        policy::authorize_update(principal, &existing, &proposed)?;

        let (merged, newly_edited) = policy::merge_update(&existing, proposed);
        let org = principal.org_id();

        let rows = self
            .store
            .update_mutable_fields(org, merged.id, merged.is_private, &merged.text, newly_edited)
            .await
            .map_err(storage_failure(Operation::Update, format!("note {}", merged.id)))?;
        if rows == 0 {
            return Err(not_found(merged.id));
        }

        info!(
            subsystem = "core",
            component = "note_service",
            op = "update",
            note_id = merged.id,
            user_id = principal.user_id(),
            org_id = org,
            edited = merged.edited,
            rows_affected = rows,
            "Edited note"
        );
        Ok(merged)
    }

    /// Delete a note.
    ///
    /// Reports `NotFound` if the row is already gone by the time the delete
    /// runs, so a repeated delete is safe to treat as done.
    pub async fn delete(&self, principal: &impl Principal, id: NoteId) -> Result<()> {
        policy::require_base(principal, Operation::Delete)?;
        let existing = self.load(principal, Operation::Delete, id).await?;
        policy::authorize_delete(principal, &existing)?;

        let org = principal.org_id();
        let rows = self
            .store
            .delete(org, id)
            .await
            .map_err(storage_failure(Operation::Delete, format!("note {}", id)))?;
        if rows == 0 {
            return Err(not_found(id));
        }

        info!(
            subsystem = "core",
            component = "note_service",
            op = "delete",
            note_id = id,
            user_id = principal.user_id(),
            org_id = org,
            rows_affected = rows,
            "Deleted note"
        );
        Ok(())
    }

    /// Load a note in the caller's tenant, or `NotFound`.
    async fn load(&self, principal: &impl Principal, op: Operation, id: NoteId) -> Result<Note> {
        if id <= 0 {
            return Err(not_found(id));
        }
        self.store
            .get_by_id(principal.org_id(), id)
            .await
            .map_err(storage_failure(op, format!("note {}", id)))?
            .ok_or_else(|| not_found(id))
    }
}
