//! Health check endpoint

use axum::{Json, extract::State};

use crate::state::AppState;

pub async fn health_check(State(state): State<AppState>) -> Json<serde_json::Value> {
    let mut body = serde_json::json!({
        "status": "ok",
        "service": state.app_name,
        "version": env!("CARGO_PKG_VERSION"),
    });
    if !state.legal_entity.is_empty() {
        body["legalEntity"] = serde_json::Value::String(state.legal_entity.clone());
    }
    Json(body)
}
