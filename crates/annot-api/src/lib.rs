//! annot-api - HTTP surface for annot notes
//!
//! Routes:
//!
//! | Method | Path         | Handler                     |
//! |--------|--------------|-----------------------------|
//! | GET    | `/note`      | [`handlers::notes::list_notes`]  |
//! | GET    | `/note/:id`  | [`handlers::notes::get_note`]    |
//! | POST   | `/note`      | [`handlers::notes::create_note`] |
//! | PUT    | `/note`      | [`handlers::notes::update_note`] |
//! | DELETE | `/note/:id`  | [`handlers::notes::delete_note`] |
//! | GET    | `/health`    | [`handlers::health`]             |

pub mod auth;
pub mod config;
pub mod error;
pub mod handlers;

use std::sync::Arc;

use axum::{routing::get, Router};
use tower_http::{
    limit::RequestBodyLimitLayer,
    request_id::{MakeRequestId, PropagateRequestIdLayer, RequestId, SetRequestIdLayer},
    trace::TraceLayer,
};
use uuid::Uuid;

use annot_core::{NoteService, NoteStore};

pub use auth::AuthPrincipal;
pub use config::ServerConfig;
pub use error::ApiError;

/// Maximum accepted request body size.
pub const MAX_BODY_BYTES: usize = 1024 * 1024;

// =============================================================================
// REQUEST ID (UUIDv7)
// =============================================================================

/// Generates time-ordered UUIDv7 request correlation IDs.
#[derive(Clone, Default)]
pub struct MakeRequestUuidV7;

impl MakeRequestId for MakeRequestUuidV7 {
    fn make_request_id<B>(&mut self, _request: &axum::http::Request<B>) -> Option<RequestId> {
        let id = Uuid::now_v7().to_string().parse().ok()?;
        Some(RequestId::new(id))
    }
}

// =============================================================================
// STATE AND ROUTER
// =============================================================================

/// Shared handler state.
#[derive(Clone)]
pub struct AppState {
    pub notes: NoteService<dyn NoteStore>,
}

impl AppState {
    pub fn new(store: Arc<dyn NoteStore>) -> Self {
        Self {
            notes: NoteService::new(store),
        }
    }
}

/// Build the application router with its middleware stack.
pub fn app(state: AppState) -> Router {
    use handlers::notes;

    Router::new()
        .route("/health", get(handlers::health))
        .route(
            "/note",
            get(notes::list_notes)
                .post(notes::create_note)
                .put(notes::update_note),
        )
        .route("/note/:id", get(notes::get_note).delete(notes::delete_note))
        .layer(TraceLayer::new_for_http())
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuidV7))
        .layer(RequestBodyLimitLayer::new(MAX_BODY_BYTES))
        .with_state(state)
}
