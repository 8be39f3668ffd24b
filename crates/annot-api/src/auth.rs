//! Caller identity from gateway headers.
//!
//! Authentication happens upstream. The gateway forwards the resolved
//! principal as headers, which this extractor turns into a
//! [`UserPrincipal`]:
//!
//! - `x-user-id`: numeric user id (required)
//! - `x-org-id`: numeric tenant id (required)
//! - `x-permissions`: permission names separated by commas or whitespace
//! - `x-roles`: role names, same separators

use std::ops::Deref;

use axum::{
    extract::FromRequestParts,
    http::{request::Parts, HeaderMap},
};

use annot_core::UserPrincipal;

use crate::error::ApiError;

pub const USER_ID_HEADER: &str = "x-user-id";
pub const ORG_ID_HEADER: &str = "x-org-id";
pub const PERMISSIONS_HEADER: &str = "x-permissions";
pub const ROLES_HEADER: &str = "x-roles";

/// Extractor yielding the authenticated caller.
///
/// Rejects with 401 when either id header is absent or not a positive integer.
#[derive(Debug, Clone)]
pub struct AuthPrincipal(pub UserPrincipal);

impl Deref for AuthPrincipal {
    type Target = UserPrincipal;

    fn deref(&self) -> &UserPrincipal {
        &self.0
    }
}

fn required_id(headers: &HeaderMap, name: &str) -> Result<i32, ApiError> {
    let raw = headers
        .get(name)
        .ok_or_else(|| ApiError::Unauthorized(format!("Missing {} header", name)))?;
    raw.to_str()
        .ok()
        .and_then(|v| v.trim().parse::<i32>().ok())
        .filter(|id| *id > 0)
        .ok_or_else(|| ApiError::Unauthorized(format!("Malformed {} header", name)))
}

fn name_list(headers: &HeaderMap, name: &str) -> Vec<String> {
    headers
        .get_all(name)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(|c: char| c == ',' || c.is_whitespace()))
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

/// Build a principal from request headers.
pub fn principal_from_headers(headers: &HeaderMap) -> Result<UserPrincipal, ApiError> {
    let user_id = required_id(headers, USER_ID_HEADER)?;
    let org_id = required_id(headers, ORG_ID_HEADER)?;
    Ok(UserPrincipal::new(user_id, org_id)
        .with_permissions(name_list(headers, PERMISSIONS_HEADER))
        .with_roles(name_list(headers, ROLES_HEADER)))
}

#[axum::async_trait]
impl<S> FromRequestParts<S> for AuthPrincipal
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        principal_from_headers(&parts.headers).map(AuthPrincipal)
    }
}
