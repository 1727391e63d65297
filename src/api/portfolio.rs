use axum::extract::{Query, State};
use axum::Json;
use serde::{Deserialize, Serialize};

use super::AppState;
use crate::domain::Order;
use crate::engine::StatsSnapshot;
use crate::orchestration::PortfolioView;

const DEFAULT_TRADES_LIMIT: usize = 50;

#[derive(Debug, Deserialize)]
pub struct TradesQuery {
    pub limit: Option<usize>,
}

#[derive(Debug, Serialize)]
pub struct TradesResponse {
    pub trades: Vec<Order>,
}

pub async fn get_portfolio(State(state): State<AppState>) -> Json<PortfolioView> {
    Json(state.engine.portfolio().await)
}

pub async fn get_stats(State(state): State<AppState>) -> Json<StatsSnapshot> {
    Json(state.engine.stats().await)
}

pub async fn get_trades(
    Query(params): Query<TradesQuery>,
    State(state): State<AppState>,
) -> Json<TradesResponse> {
    let limit = params.limit.unwrap_or(DEFAULT_TRADES_LIMIT);
    Json(TradesResponse {
        trades: state.engine.trade_history(limit).await,
    })
}
