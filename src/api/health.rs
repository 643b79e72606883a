use axum::response::Json;
use serde_json::{json, Value};

/// Liveness probe
pub async fn health_check() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "service": "club-manager",
        "timestamp": chrono::Utc::now(),
    }))
}
