//! Caller identity as seen by the policy engine.
//!
//! The policy engine depends only on the [`Principal`] predicates, so any
//! authentication layer (or a test fake) can stand behind it.

use std::collections::HashSet;

use crate::models::{OrgId, UserId};

/// Role that bypasses the creator-identity check on update and delete.
pub const SYSTEM_ROLE: &str = "system";

/// An authenticated caller.
pub trait Principal: Send + Sync {
    /// Id of the calling user.
    fn user_id(&self) -> UserId;

    /// Tenant every query and mutation is scoped to.
    fn org_id(&self) -> OrgId;

    /// Whether the caller was granted the named permission.
    fn has_permission(&self, name: &str) -> bool;

    /// Whether the caller holds the named role.
    fn has_role(&self, name: &str) -> bool;
}

/// Principal backed by explicit permission and role sets.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserPrincipal {
    pub user_id: UserId,
    pub org_id: OrgId,
    pub permissions: HashSet<String>,
    pub roles: HashSet<String>,
}

impl UserPrincipal {
    pub fn new(user_id: UserId, org_id: OrgId) -> Self {
        Self {
            user_id,
            org_id,
            ..Default::default()
        }
    }

    pub fn with_permissions<I, S>(mut self, permissions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.permissions
            .extend(permissions.into_iter().map(Into::into));
        self
    }

    pub fn with_roles<I, S>(mut self, roles: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.roles.extend(roles.into_iter().map(Into::into));
        self
    }
}

impl Principal for UserPrincipal {
    fn user_id(&self) -> UserId {
        self.user_id
    }

    fn org_id(&self) -> OrgId {
        self.org_id
    }

    fn has_permission(&self, name: &str) -> bool {
        self.permissions.contains(name)
    }

    fn has_role(&self, name: &str) -> bool {
        self.roles.contains(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_permissions_are_exact_match() {
        let p = UserPrincipal::new(7, 1).with_permissions(["note.read"]);
        assert!(p.has_permission("note.read"));
        assert!(!p.has_permission("private.note.read"));
        assert!(!p.has_permission("note"));
    }

    #[test]
    fn test_roles() {
        let p = UserPrincipal::new(7, 1).with_roles([SYSTEM_ROLE]);
        assert!(p.has_role("system"));
        assert!(!p.has_role("admin"));
        assert_eq!(p.user_id(), 7);
        assert_eq!(p.org_id(), 1);
    }
}
