//! Core traits for annot abstractions.
//!
//! These traits define the interfaces that concrete storage backends must
//! satisfy, enabling pluggable backends and testability.

use async_trait::async_trait;

use crate::error::Result;
use crate::models::*;

// =============================================================================
// NOTE STORE
// =============================================================================

/// Persistence for notes.
///
/// Every method is scoped to the tenant passed as `org`: a note stored under
/// one organization is invisible to, and unmodifiable from, any other.
#[async_trait]
pub trait NoteStore: Send + Sync {
    /// Count notes on a resource, optionally excluding private ones.
    async fn count(&self, org: OrgId, resource: ResourceRef, include_private: bool) -> Result<i64>;

    /// Fetch one page of notes on a resource.
    ///
    /// `created_time` sorts newest first; every other field ascending.
    async fn list(
        &self,
        org: OrgId,
        resource: ResourceRef,
        include_private: bool,
        sort_field: NoteSortField,
        offset: i64,
        limit: i64,
    ) -> Result<Vec<Note>>;

    /// Fetch a note by id, with its creator display name resolved.
    async fn get_by_id(&self, org: OrgId, id: NoteId) -> Result<Option<Note>>;

    /// Insert a new note, returning the assigned id.
    ///
    /// `note.id` and `note.creator` are ignored.
    async fn insert(&self, org: OrgId, note: &Note) -> Result<NoteId>;

    /// Overwrite the mutable fields of a note.
    ///
    /// `mark_edited` only ever sets the edited flag; it never clears it.
    /// Returns rows affected.
    async fn update_mutable_fields(
        &self,
        org: OrgId,
        id: NoteId,
        is_private: bool,
        text: &str,
        mark_edited: bool,
    ) -> Result<u64>;

    /// Delete a note. Returns rows affected.
    async fn delete(&self, org: OrgId, id: NoteId) -> Result<u64>;

    /// Display name of a user, if one is on record.
    async fn creator_name(&self, user_id: UserId) -> Result<Option<String>>;
}
