use axum::extract::State;
use axum::Json;
use serde::Deserialize;

use super::market::parse_symbol;
use super::AppState;
use crate::domain::{Decimal, Order, Side};
use crate::error::AppError;

#[derive(Debug, Deserialize)]
pub struct OrderRequest {
    pub side: Side,
    pub symbol: String,
    pub quantity: Decimal,
}

#[derive(Debug, Deserialize)]
pub struct QuickBuyRequest {
    pub symbol: String,
}

pub async fn place_order(
    State(state): State<AppState>,
    Json(req): Json<OrderRequest>,
) -> Result<Json<Order>, AppError> {
    let symbol = parse_symbol(&req.symbol)?;
    let order = match req.side {
        Side::Buy => state.engine.buy(&symbol, req.quantity).await?,
        Side::Sell => state.engine.sell(&symbol, req.quantity).await?,
    };
    Ok(Json(order))
}

pub async fn quick_buy(
    State(state): State<AppState>,
    Json(req): Json<QuickBuyRequest>,
) -> Result<Json<Order>, AppError> {
    let symbol = parse_symbol(&req.symbol)?;
    Ok(Json(state.engine.quick_buy(&symbol).await?))
}
