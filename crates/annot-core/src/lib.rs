//! # annot-core
//!
//! Core types, access policy, and note lifecycle for annot.
//!
//! This crate provides the note data model, the error taxonomy, the
//! [`Principal`] abstraction the policy engine decides against, the
//! [`NoteStore`] trait storage backends implement, and the [`NoteService`]
//! that ties them together.

pub mod error;
pub mod logging;
#[cfg(any(test, feature = "mock"))]
pub mod mock;
pub mod models;
pub mod policy;
pub mod principal;
pub mod service;
pub mod traits;

#[cfg(test)]
mod tests;

// Re-export commonly used types at crate root
pub use error::{Error, Result};
pub use models::*;
pub use policy::Operation;
pub use principal::{Principal, UserPrincipal, SYSTEM_ROLE};
pub use service::NoteService;
pub use traits::*;
