use axum::{extract::State, Json};
use serde_json::{json, Value};

use crate::state::AppState;

/// GET /health
/// Returns service status, version, and whether the LLM is wired up.
pub async fn health_handler(State(state): State<AppState>) -> Json<Value> {
    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
        "service": "interview-analyzer",
        "llm_enabled": state.llm.is_some(),
        "overview_cache_entries": state.overview_cache.len().await
    }))
}
