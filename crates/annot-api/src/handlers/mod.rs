//! HTTP handlers for annot-api.

pub mod notes;

use axum::Json;
use serde_json::{json, Value};

/// Liveness probe. No authentication, no storage access.
pub async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}
