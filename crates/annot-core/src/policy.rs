//! Note access policy.
//!
//! Pure decision logic: every function here inspects a [`Principal`] and
//! note state and either allows the operation or returns the error the caller
//! should see. Nothing in this module performs I/O.
//!
//! Checks run in a fixed order and the first failure wins:
//!
//! 1. base permission for the operation (`note.<op>`)
//! 2. privacy escalation (`private.note.<op>`) when the note is private
//! 3. resource validity (create only)
//! 4. creator identity or the `system` role (update/delete only)
//! 5. immutable-field integrity (update only)
//!
//! Existence is the coordinator's job; it runs between 1 and 2.

use tracing::warn;

use crate::error::{Error, Result};
use crate::models::Note;
use crate::principal::{Principal, SYSTEM_ROLE};

/// Operations subject to note access control.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    List,
    Read,
    Create,
    Update,
    Delete,
}

impl Operation {
    pub fn as_str(&self) -> &'static str {
        match self {
            Operation::List => "list",
            Operation::Read => "read",
            Operation::Create => "create",
            Operation::Update => "update",
            Operation::Delete => "delete",
        }
    }

    /// Permission every caller needs for this operation.
    pub fn base_permission(&self) -> &'static str {
        match self {
            Operation::List => "note.list",
            Operation::Read => "note.read",
            Operation::Create => "note.create",
            Operation::Update => "note.update",
            Operation::Delete => "note.delete",
        }
    }

    /// Additional permission required when the note involved is private.
    pub fn private_permission(&self) -> &'static str {
        match self {
            Operation::List => "private.note.list",
            Operation::Read => "private.note.read",
            Operation::Create => "private.note.create",
            Operation::Update => "private.note.update",
            Operation::Delete => "private.note.delete",
        }
    }
}

fn require_permission(principal: &impl Principal, op: Operation, permission: &str) -> Result<()> {
    if principal.has_permission(permission) {
        return Ok(());
    }
    warn!(
        subsystem = "core",
        component = "policy",
        op = op.as_str(),
        user_id = principal.user_id(),
        org_id = principal.org_id(),
        permission,
        "Permission denied"
    );
    Err(Error::Unauthorized(format!("{} permission required", permission)))
}

/// Rule 1: the caller must hold `note.<op>`.
pub fn require_base(principal: &impl Principal, op: Operation) -> Result<()> {
    require_permission(principal, op, op.base_permission())
}

/// Rule 2: private notes additionally require `private.note.<op>`.
pub fn require_privacy(principal: &impl Principal, op: Operation, is_private: bool) -> Result<()> {
    if !is_private {
        return Ok(());
    }
    require_permission(principal, op, op.private_permission())
}

/// Listing never rejects on privacy; it narrows the result set instead.
///
/// Returns whether private notes may be included.
pub fn authorize_list(principal: &impl Principal) -> Result<bool> {
    require_base(principal, Operation::List)?;
    Ok(principal.has_permission(Operation::List.private_permission()))
}

/// Privacy gate for reading an already-loaded note.
pub fn authorize_read(principal: &impl Principal, note: &Note) -> Result<()> {
    require_privacy(principal, Operation::Read, note.is_private)
}

/// Rule 3: the resource reference on a new note must be usable.
///
/// The type is already constrained to the referenceable set by
/// [`crate::ResourceType`]; only the id needs checking.
pub fn validate_resource(note: &Note) -> Result<()> {
    if note.resource_id <= 0 {
        return Err(Error::BadRequest(format!(
            "Illegal note creation requested: invalid resource {}",
            note.resource()
        )));
    }
    Ok(())
}

/// Privacy and resource checks for a proposed note.
pub fn authorize_create(principal: &impl Principal, proposed: &Note) -> Result<()> {
    require_privacy(principal, Operation::Create, proposed.is_private)?;
    validate_resource(proposed)
}

/// Rule 4: only the creator, or a system caller, may change a note.
pub fn require_owner(principal: &impl Principal, op: Operation, existing: &Note) -> Result<()> {
    if existing.creator_id == principal.user_id() || principal.has_role(SYSTEM_ROLE) {
        return Ok(());
    }
    warn!(
        subsystem = "core",
        component = "policy",
        op = op.as_str(),
        user_id = principal.user_id(),
        note_id = existing.id,
        creator_id = existing.creator_id,
        "Ownership check failed"
    );
    let verb = match op {
        Operation::Delete => "delete",
        _ => "modify",
    };
    Err(Error::Forbidden(format!("cannot {} another user's note", verb)))
}

/// Rule 5: resource type and id are write-once.
pub fn require_same_resource(existing: &Note, proposed: &Note) -> Result<()> {
    if existing.resource() != proposed.resource() {
        return Err(Error::BadRequest(format!(
            "Illegal note update requested: resource {} cannot become {}",
            existing.resource(),
            proposed.resource()
        )));
    }
    Ok(())
}

/// Privacy, identity and immutable-field checks for an update.
///
/// Privacy applies if either side is private, so a public note cannot be
/// made private without the private update permission.
pub fn authorize_update(
    principal: &impl Principal,
    existing: &Note,
    proposed: &Note,
) -> Result<()> {
    require_privacy(
        principal,
        Operation::Update,
        existing.is_private || proposed.is_private,
    )?;
    require_owner(principal, Operation::Update, existing)?;
    require_same_resource(existing, proposed)
}

/// Privacy and identity checks for a delete.
pub fn authorize_delete(principal: &impl Principal, existing: &Note) -> Result<()> {
    require_privacy(principal, Operation::Delete, existing.is_private)?;
    require_owner(principal, Operation::Delete, existing)
}

/// Build the note an update should persist.
///
/// Write-once fields come from `existing`, never from the caller. `edited`
/// latches: it is set once the text differs and never clears. The second
/// value reports whether this update is the one flipping it.
pub fn merge_update(existing: &Note, proposed: Note) -> (Note, bool) {
    let text_changed = existing.text != proposed.text;
    let merged = Note {
        id: existing.id,
        creator_id: existing.creator_id,
        creator: existing.creator.clone(),
        created_time: existing.created_time,
        edited: existing.edited || text_changed,
        is_private: proposed.is_private,
        resource_type: existing.resource_type,
        resource_id: existing.resource_id,
        text: proposed.text,
    };
    (merged, text_changed)
}
