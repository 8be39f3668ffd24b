//! Note repository implementation.

use async_trait::async_trait;
use sqlx::{postgres::PgRow, Pool, Postgres, Row};
use tracing::debug;

use annot_core::{
    Error, Note, NoteId, NoteSortField, NoteStore, OrgId, ResourceRef, ResourceType, Result,
    UserId,
};

/// Columns selected for every note read. Expects `notes n` joined to `people p`.
const NOTE_COLUMNS: &str = "n.id, n.creator_id, p.name AS creator, n.created_time, n.edited, \
     n.private, n.resource_type, n.resource_id, n.note";

/// PostgreSQL implementation of NoteStore.
#[derive(Clone)]
pub struct PgNoteRepository {
    pool: Pool<Postgres>,
}

impl PgNoteRepository {
    /// Create a new PgNoteRepository with the given connection pool.
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }
}

/// Map a sort field to its ORDER BY expression.
///
/// Only whitelisted column expressions ever reach the SQL text.
fn build_order_clause(field: NoteSortField) -> &'static str {
    match field {
        NoteSortField::CreatedTime => "n.created_time DESC",
        NoteSortField::Id => "n.id ASC",
        NoteSortField::CreatorId => "n.creator_id ASC",
        NoteSortField::Creator => "p.name ASC NULLS LAST",
        NoteSortField::Edited => "n.edited ASC",
        NoteSortField::Private => "n.private ASC",
        NoteSortField::Note => "n.note ASC",
    }
}

fn map_row_to_note(row: PgRow) -> Result<Note> {
    let resource_type: String = row.try_get("resource_type").map_err(Error::Database)?;
    let resource_type: ResourceType = resource_type.parse().map_err(|_| {
        Error::Storage(format!("Unknown resource type '{}' in notes", resource_type))
    })?;

    Ok(Note {
        id: row.try_get("id").map_err(Error::Database)?,
        creator_id: row.try_get("creator_id").map_err(Error::Database)?,
        creator: row.try_get("creator").map_err(Error::Database)?,
        created_time: row.try_get("created_time").map_err(Error::Database)?,
        edited: row.try_get("edited").map_err(Error::Database)?,
        is_private: row.try_get("private").map_err(Error::Database)?,
        resource_type,
        resource_id: row.try_get("resource_id").map_err(Error::Database)?,
        text: row.try_get("note").map_err(Error::Database)?,
    })
}

#[async_trait]
impl NoteStore for PgNoteRepository {
    async fn count(&self, org: OrgId, resource: ResourceRef, include_private: bool) -> Result<i64> {
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM notes n
             WHERE n.org_id = $1 AND n.resource_type = $2 AND n.resource_id = $3
               AND ($4 OR NOT n.private)",
        )
        .bind(org)
        .bind(resource.resource_type.as_str())
        .bind(resource.resource_id)
        .bind(include_private)
        .fetch_one(&self.pool)
        .await
        .map_err(Error::Database)?;

        Ok(count)
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
        let query = format!(
            "SELECT {NOTE_COLUMNS}
             FROM notes n
             LEFT JOIN people p ON p.id = n.creator_id
             WHERE n.org_id = $1 AND n.resource_type = $2 AND n.resource_id = $3
               AND ($4 OR NOT n.private)
             ORDER BY {}, n.id ASC
             LIMIT $5 OFFSET $6",
            build_order_clause(sort_field)
        );

        let rows = sqlx::query(&query)
            .bind(org)
            .bind(resource.resource_type.as_str())
            .bind(resource.resource_id)
            .bind(include_private)
            .bind(limit)
            .bind(offset)
            .fetch_all(&self.pool)
            .await
            .map_err(Error::Database)?;

        debug!(
            subsystem = "db",
            component = "notes",
            op = "list",
            org_id = org,
            resource_type = resource.resource_type.as_str(),
            resource_id = resource.resource_id,
            sort = sort_field.as_str(),
            result_count = rows.len(),
            "Listed notes"
        );

        rows.into_iter().map(map_row_to_note).collect()
    }

    async fn get_by_id(&self, org: OrgId, id: NoteId) -> Result<Option<Note>> {
        let query = format!(
            "SELECT {NOTE_COLUMNS}
             FROM notes n
             LEFT JOIN people p ON p.id = n.creator_id
             WHERE n.id = $1 AND n.org_id = $2"
        );

        let row = sqlx::query(&query)
            .bind(id)
            .bind(org)
            .fetch_optional(&self.pool)
            .await
            .map_err(Error::Database)?;

        row.map(map_row_to_note).transpose()
    }

    async fn insert(&self, org: OrgId, note: &Note) -> Result<NoteId> {
        let id: NoteId = sqlx::query_scalar(
            "INSERT INTO notes
                (org_id, creator_id, created_time, edited, private,
                 resource_type, resource_id, note)
             VALUES ($1, $2, COALESCE($3, now()), $4, $5, $6, $7, $8)
             RETURNING id",
        )
        .bind(org)
        .bind(note.creator_id)
        .bind(note.created_time)
        .bind(note.edited)
        .bind(note.is_private)
        .bind(note.resource_type.as_str())
        .bind(note.resource_id)
        .bind(&note.text)
        .fetch_one(&self.pool)
        .await
        .map_err(Error::Database)?;

        Ok(id)
    }

    async fn update_mutable_fields(
        &self,
        org: OrgId,
        id: NoteId,
        is_private: bool,
        text: &str,
        mark_edited: bool,
    ) -> Result<u64> {
        let query = if mark_edited {
            "UPDATE notes SET private = $1, note = $2, edited = true WHERE id = $3 AND org_id = $4"
        } else {
            "UPDATE notes SET private = $1, note = $2 WHERE id = $3 AND org_id = $4"
        };

        let result = sqlx::query(query)
            .bind(is_private)
            .bind(text)
            .bind(id)
            .bind(org)
            .execute(&self.pool)
            .await
            .map_err(Error::Database)?;

        Ok(result.rows_affected())
    }

    async fn delete(&self, org: OrgId, id: NoteId) -> Result<u64> {
        let result = sqlx::query("DELETE FROM notes WHERE id = $1 AND org_id = $2")
            .bind(id)
            .bind(org)
            .execute(&self.pool)
            .await
            .map_err(Error::Database)?;

        Ok(result.rows_affected())
    }

    async fn creator_name(&self, user_id: UserId) -> Result<Option<String>> {
        let name: Option<String> = sqlx::query_scalar("SELECT name FROM people WHERE id = $1")
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(Error::Database)?;

        Ok(name)
    }
}
