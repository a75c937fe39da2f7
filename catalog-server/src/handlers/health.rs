use axum::response::Json;
use serde_json::{Value, json};

/// Liveness probe; answers without touching the database.
pub async fn health_handler() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}
