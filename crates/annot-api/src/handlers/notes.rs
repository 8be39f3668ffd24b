//! Note HTTP handlers.
//!
//! Thin adapters: each handler extracts the caller, decodes its input and
//! hands off to [`annot_core::NoteService`], which makes every access
//! decision.

use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection, QueryRejection},
        Path, Query, State,
    },
    http::StatusCode,
    Json,
};
use serde::Deserialize;

use annot_core::{
    policy, ListNotesRequest, Note, NoteId, NotePage, NoteSortField, Operation, ResourceRef,
};

use crate::{auth::AuthPrincipal, ApiError, AppState};

/// Query parameters for listing notes.
#[derive(Debug, Default, Deserialize)]
pub struct ListNotesQuery {
    /// Zero-based offset (default 0).
    pub start: Option<i64>,
    /// Page size (default 10, max 100).
    pub count: Option<i64>,
    /// Sort field name (default `created_time`).
    pub sort_field: Option<String>,
    /// Target resource as `type:id`, e.g. `event:5`. Required.
    pub search: Option<String>,
}

impl ListNotesQuery {
    fn into_request(self) -> Result<ListNotesRequest, ApiError> {
        let search = self
            .search
            .filter(|s| !s.trim().is_empty())
            .ok_or_else(|| {
                ApiError::BadRequest("search is required, in the form 'type:id'".to_string())
            })?;
        let resource = ResourceRef::parse_search(&search)?;
        let sort_field: NoteSortField = self.sort_field.as_deref().unwrap_or("").parse()?;

        let defaults = ListNotesRequest::new(resource);
        Ok(defaults.sort_by(sort_field).page(
            self.start.unwrap_or(0),
            self.count.unwrap_or(annot_core::DEFAULT_PAGE_SIZE),
        ))
    }
}

/// List notes on a resource.
///
/// # Returns
/// - 200 OK with a page of notes the caller may see
/// - 400 Bad Request for a missing/malformed `search`, bad paging or sort field
/// - 401 Unauthorized without `note.list`
pub async fn list_notes(
    State(state): State<AppState>,
    auth: AuthPrincipal,
    query: Result<Query<ListNotesQuery>, QueryRejection>,
) -> Result<Json<NotePage>, ApiError> {
    // Callers without note.list learn nothing about their query.
    policy::require_base(&*auth, Operation::List)?;
    let Query(query) = query?;
    let page = state.notes.list(&*auth, query.into_request()?).await?;
    Ok(Json(page))
}

/// Get a note by id.
pub async fn get_note(
    State(state): State<AppState>,
    auth: AuthPrincipal,
    id: Result<Path<NoteId>, PathRejection>,
) -> Result<Json<Note>, ApiError> {
    let Path(id) = id?;
    let note = state.notes.get(&*auth, id).await?;
    Ok(Json(note))
}

/// Create a note. The server assigns id, creator and creation time.
///
/// # Returns
/// - 200 OK with the stored note
/// - 400 Bad Request for an invalid body or resource
/// - 401 Unauthorized without `note.create` (or `private.note.create` for a private note)
pub async fn create_note(
    State(state): State<AppState>,
    auth: AuthPrincipal,
    body: Result<Json<Note>, JsonRejection>,
) -> Result<Json<Note>, ApiError> {
    let Json(draft) = body?;
    let note = state.notes.create(&*auth, draft).await?;
    Ok(Json(note))
}

/// Update the text and privacy flag of a note identified by the body's `id`.
///
/// # Returns
/// - 200 OK with the merged note
/// - 403 Forbidden when editing another user's note without the system role
/// - 404 Not Found if the note doesn't exist
pub async fn update_note(
    State(state): State<AppState>,
    auth: AuthPrincipal,
    body: Result<Json<Note>, JsonRejection>,
) -> Result<Json<Note>, ApiError> {
    let Json(proposed) = body?;
    let note = state.notes.update(&*auth, proposed).await?;
    Ok(Json(note))
}

/// Delete a note.
pub async fn delete_note(
    State(state): State<AppState>,
    auth: AuthPrincipal,
    id: Result<Path<NoteId>, PathRejection>,
) -> Result<StatusCode, ApiError> {
    let Path(id) = id?;
    state.notes.delete(&*auth, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
