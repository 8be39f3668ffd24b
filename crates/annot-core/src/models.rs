//! Data models for annot.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Note identifier (storage-assigned serial).
pub type NoteId = i32;

/// User identifier.
pub type UserId = i32;

/// Tenant (organization) identifier.
pub type OrgId = i32;

/// Default page size for note listings.
pub const DEFAULT_PAGE_SIZE: i64 = 10;

/// Largest page a caller may request.
pub const MAX_PAGE_SIZE: i64 = 100;

// =============================================================================
// RESOURCE REFERENCES
// =============================================================================

/// Kinds of entity a note may be attached to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResourceType {
    Person,
    Family,
    Ministry,
    Room,
    Equipment,
    Event,
}

impl ResourceType {
    /// Every referenceable type, in display order.
    pub const ALL: [ResourceType; 6] = [
        ResourceType::Person,
        ResourceType::Family,
        ResourceType::Ministry,
        ResourceType::Room,
        ResourceType::Equipment,
        ResourceType::Event,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ResourceType::Person => "person",
            ResourceType::Family => "family",
            ResourceType::Ministry => "ministry",
            ResourceType::Room => "room",
            ResourceType::Equipment => "equipment",
            ResourceType::Event => "event",
        }
    }
}

impl fmt::Display for ResourceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ResourceType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        ResourceType::ALL
            .into_iter()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| Error::BadRequest(format!("Unknown resource type '{}'", s)))
    }
}

/// A `(type, id)` pair naming the entity a note annotates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ResourceRef {
    pub resource_type: ResourceType,
    pub resource_id: i32,
}

impl ResourceRef {
    pub fn new(resource_type: ResourceType, resource_id: i32) -> Self {
        Self {
            resource_type,
            resource_id,
        }
    }

    /// Parse the `type:id` form used by the list endpoint's `search` parameter.
    pub fn parse_search(search: &str) -> Result<Self> {
        let (type_part, id_part) = search.trim().split_once(':').ok_or_else(|| {
            Error::BadRequest(format!(
                "search must have the form 'type:id', got '{}'",
                search
            ))
        })?;

        let resource_type = type_part.trim().parse::<ResourceType>()?;
        let resource_id = id_part.trim().parse::<i32>().map_err(|_| {
            Error::BadRequest(format!("Invalid resource id '{}'", id_part.trim()))
        })?;

        Ok(Self::new(resource_type, resource_id))
    }
}

impl fmt::Display for ResourceRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.resource_type, self.resource_id)
    }
}

// =============================================================================
// NOTE
// =============================================================================

/// A freeform annotation attached to a resource.
///
/// `id`, `creator_id`, `creator` and `created_time` are optional on the wire
/// because callers never supply them authoritatively; the lifecycle
/// coordinator stamps or copies them server-side.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Note {
    #[serde(default)]
    pub id: NoteId,
    #[serde(default)]
    pub creator_id: UserId,
    /// Denormalized display name of the creator.
    #[serde(default)]
    pub creator: Option<String>,
    #[serde(default)]
    pub created_time: Option<DateTime<Utc>>,
    #[serde(default)]
    pub edited: bool,
    #[serde(default, rename = "private")]
    pub is_private: bool,
    pub resource_type: ResourceType,
    pub resource_id: i32,
    #[serde(rename = "note")]
    pub text: String,
}

impl Note {
    /// A draft as a caller would submit it for creation.
    pub fn draft(resource: ResourceRef, text: impl Into<String>, is_private: bool) -> Self {
        Self {
            id: 0,
            creator_id: 0,
            creator: None,
            created_time: None,
            edited: false,
            is_private,
            resource_type: resource.resource_type,
            resource_id: resource.resource_id,
            text: text.into(),
        }
    }

    pub fn resource(&self) -> ResourceRef {
        ResourceRef::new(self.resource_type, self.resource_id)
    }
}

// =============================================================================
// LISTING
// =============================================================================

/// Sortable note columns.
///
/// Only these fields reach the storage layer; caller text is never
/// interpolated into a query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NoteSortField {
    /// Newest first.
    #[default]
    CreatedTime,
    Id,
    CreatorId,
    Creator,
    Edited,
    Private,
    Note,
}

impl NoteSortField {
    pub fn as_str(&self) -> &'static str {
        match self {
            NoteSortField::CreatedTime => "created_time",
            NoteSortField::Id => "id",
            NoteSortField::CreatorId => "creator_id",
            NoteSortField::Creator => "creator",
            NoteSortField::Edited => "edited",
            NoteSortField::Private => "private",
            NoteSortField::Note => "note",
        }
    }

    /// Creation time sorts descending; everything else ascending.
    pub fn is_descending(&self) -> bool {
        matches!(self, NoteSortField::CreatedTime)
    }
}

impl FromStr for NoteSortField {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim() {
            "" | "created_time" | "createdTime" => Ok(NoteSortField::CreatedTime),
            "id" => Ok(NoteSortField::Id),
            "creator_id" | "creatorId" => Ok(NoteSortField::CreatorId),
            "creator" | "name" => Ok(NoteSortField::Creator),
            "edited" => Ok(NoteSortField::Edited),
            "private" => Ok(NoteSortField::Private),
            "note" => Ok(NoteSortField::Note),
            other => Err(Error::BadRequest(format!(
                "Cannot sort notes by '{}'",
                other
            ))),
        }
    }
}

/// Request for one page of notes on a resource.
#[derive(Debug, Clone, PartialEq)]
pub struct ListNotesRequest {
    pub resource: ResourceRef,
    pub sort_field: NoteSortField,
    pub start: i64,
    pub count: i64,
}

impl ListNotesRequest {
    pub fn new(resource: ResourceRef) -> Self {
        Self {
            resource,
            sort_field: NoteSortField::default(),
            start: 0,
            count: DEFAULT_PAGE_SIZE,
        }
    }

    pub fn sort_by(mut self, field: NoteSortField) -> Self {
        self.sort_field = field;
        self
    }

    pub fn page(mut self, start: i64, count: i64) -> Self {
        self.start = start;
        self.count = count;
        self
    }

    /// Reject negative offsets and empty pages; clamp oversized pages.
    pub fn validated(mut self) -> Result<Self> {
        if self.start < 0 {
            return Err(Error::BadRequest("start must be >= 0".into()));
        }
        if self.count < 1 {
            return Err(Error::BadRequest("count must be >= 1".into()));
        }
        self.count = self.count.min(MAX_PAGE_SIZE);
        Ok(self)
    }
}

/// Paginated list envelope.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NotePage {
    pub start: i64,
    /// Notes in this page.
    pub count: i64,
    /// Notes visible to the caller across all pages.
    pub total_results: i64,
    pub results: Vec<Note>,
}
