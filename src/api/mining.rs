use axum::extract::State;
use axum::Json;
use serde::Serialize;

use super::AppState;
use crate::engine::MiningStatus;
use crate::error::AppError;
use crate::orchestration::UpgradeQuote;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MiningResponse {
    #[serde(flatten)]
    pub status: MiningStatus,
    pub upgrade: UpgradeQuote,
}

pub async fn get_mining(State(state): State<AppState>) -> Json<MiningResponse> {
    Json(MiningResponse {
        status: state.engine.mining_status().await,
        upgrade: state.engine.upgrade_quote().await,
    })
}

pub async fn start_mining(State(state): State<AppState>) -> Json<MiningStatus> {
    Json(state.engine.start_mining().await)
}

pub async fn stop_mining(State(state): State<AppState>) -> Json<MiningStatus> {
    Json(state.engine.stop_mining().await)
}

pub async fn upgrade_mining(
    State(state): State<AppState>,
) -> Result<Json<MiningStatus>, AppError> {
    Ok(Json(state.engine.upgrade_mining().await?))
}
