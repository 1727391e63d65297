use axum::extract::State;
use axum::Json;
use serde_json::{json, Value};

use super::AppState;

pub async fn health() -> Json<Value> {
    Json(json!({"status": "ok", "service": env!("CARGO_PKG_NAME")}))
}

/// Ready once the engine has at least one symbol to quote.
pub async fn ready(State(state): State<AppState>) -> Json<Value> {
    let symbols = state.engine.prices().await.len();
    let status = if symbols > 0 { "ready" } else { "empty" };
    Json(json!({
        "status": status,
        "symbols": symbols,
        "clockMs": state.engine.clock().as_ms(),
    }))
}
