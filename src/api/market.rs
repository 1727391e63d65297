use axum::extract::{Query, State};
use axum::Json;
use serde::{Deserialize, Serialize};

use super::AppState;
use crate::domain::{Symbol, TimeMs};
use crate::error::AppError;
use crate::orchestration::{PriceHistory, PriceQuote};

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PricesResponse {
    pub prices: Vec<PriceQuote>,
    pub time_ms: i64,
}

#[derive(Debug, Deserialize)]
pub struct HistoryQuery {
    pub symbol: String,
}

pub async fn get_prices(State(state): State<AppState>) -> Json<PricesResponse> {
    Json(PricesResponse {
        prices: state.engine.prices().await,
        time_ms: TimeMs::now().as_ms(),
    })
}

pub async fn get_price_history(
    Query(params): Query<HistoryQuery>,
    State(state): State<AppState>,
) -> Result<Json<PriceHistory>, AppError> {
    let symbol = parse_symbol(&params.symbol)?;
    Ok(Json(state.engine.price_history(&symbol).await?))
}

/// Manual refresh: one extra price tick.
pub async fn advance_prices(State(state): State<AppState>) -> Json<PricesResponse> {
    state.engine.advance_prices().await;
    get_prices(State(state)).await
}

pub(crate) fn parse_symbol(raw: &str) -> Result<Symbol, AppError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(AppError::BadRequest("symbol is required".to_string()));
    }
    Ok(Symbol::new(trimmed.to_uppercase()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_symbol_normalizes_case() {
        assert_eq!(parse_symbol(" btc ").unwrap(), Symbol::new("BTC"));
    }

    #[test]
    fn test_parse_symbol_rejects_empty() {
        assert!(matches!(parse_symbol("  "), Err(AppError::BadRequest(_))));
    }
}
